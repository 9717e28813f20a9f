fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let hash = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default();

    // Released builds have no local hash suffix; dev builds get `+<hash>`.
    let build = if hash.is_empty() {
        version
    } else {
        format!("{version}+{hash}")
    };
    println!("cargo:rustc-env=SNAPFILTER_BUILD={build}");
}
