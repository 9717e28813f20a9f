//! Flat-directory storage for uploaded and filtered images.
//!
//! ## Layout
//!
//! ```text
//! uploads/
//! ├── original_holiday.png     # upload resized to the canvas
//! ├── filtered_holiday.png     # result of the filter pipeline
//! └── ...
//! ```
//!
//! No subdirectories and no sidecar files: a file's own timestamp is its
//! creation time. Files are written once and never modified, so the
//! modification time stands in for creation time (it is portable, unlike
//! `birthtime`).
//!
//! ## Retention
//!
//! [`UploadStore::sweep`] keeps the `max_assets` newest files and deletes the
//! rest, oldest first. Deletion failures are logged and otherwise ignored.

use crate::config::StoreConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to write {filename}: {source}")]
    Write {
        filename: String,
        #[source]
        source: io::Error,
    },
    #[error("Invalid asset name: {0:?}")]
    InvalidName(String),
    #[error("No such asset: {0}")]
    NotFound(String),
}

/// A file held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub filename: String,
    pub created_at: SystemTime,
}

/// Filenames for one upload's pair of assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetNames {
    pub original: String,
    pub filtered: String,
}

/// Outcome of a retention sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub kept: usize,
    pub removed: Vec<String>,
    pub failed: Vec<String>,
}

pub struct UploadStore {
    config: StoreConfig,
}

impl UploadStore {
    /// Open the store, creating the directory if needed.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        fs::create_dir_all(&config.upload_dir)?;
        Ok(Self { config })
    }

    pub fn dir(&self) -> &Path {
        &self.config.upload_dir
    }

    pub fn max_assets(&self) -> usize {
        self.config.max_assets
    }

    /// Write one asset, replacing any file with the same name.
    pub fn write(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let path = self.resolve(filename)?;
        fs::write(&path, bytes).map_err(|source| StoreError::Write {
            filename: filename.to_string(),
            source,
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), "stored asset");
        Ok(path)
    }

    /// Read an asset by exact filename.
    pub fn read(&self, filename: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(filename)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(filename.to_string()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// All stored PNG assets, oldest first (ties broken by filename).
    pub fn list(&self) -> Result<Vec<StoredAsset>, StoreError> {
        let mut assets = Vec::new();
        for entry in fs::read_dir(&self.config.upload_dir)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            if !meta.is_file() {
                continue;
            }
            let Some(filename) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !filename.ends_with(".png") {
                continue;
            }
            let created_at = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            assets.push(StoredAsset {
                filename,
                created_at,
            });
        }
        sort_oldest_first(&mut assets);
        Ok(assets)
    }

    /// Delete all but the newest `max_assets` files.
    ///
    /// Names in `protect` are never deleted (they still count toward the cap),
    /// so a request cannot sweep away the files it just wrote.
    pub fn sweep(&self, protect: &[&str]) -> SweepReport {
        let assets = match self.list() {
            Ok(assets) => assets,
            Err(e) => {
                warn!(error = %e, "retention sweep could not list uploads");
                return SweepReport::default();
            }
        };
        let mut report = SweepReport {
            kept: assets.len(),
            ..SweepReport::default()
        };
        for asset in expired(&assets, self.config.max_assets, protect) {
            match fs::remove_file(self.config.upload_dir.join(&asset.filename)) {
                Ok(()) => {
                    debug!(file = %asset.filename, "swept expired asset");
                    report.kept -= 1;
                    report.removed.push(asset.filename.clone());
                }
                Err(e) => {
                    warn!(file = %asset.filename, error = %e, "failed to delete expired asset");
                    report.failed.push(asset.filename.clone());
                }
            }
        }
        report
    }

    fn resolve(&self, filename: &str) -> Result<PathBuf, StoreError> {
        if !is_plain_filename(filename) {
            return Err(StoreError::InvalidName(filename.to_string()));
        }
        Ok(self.config.upload_dir.join(filename))
    }
}

fn sort_oldest_first(assets: &mut [StoredAsset]) {
    assets.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.filename.cmp(&b.filename))
    });
}

/// Assets to delete so that at most `keep` remain. `assets` must be sorted oldest first.
fn expired<'a>(assets: &'a [StoredAsset], keep: usize, protect: &[&str]) -> Vec<&'a StoredAsset> {
    let excess = assets.len().saturating_sub(keep);
    assets
        .iter()
        .filter(|a| !protect.contains(&a.filename.as_str()))
        .take(excess)
        .collect()
}

/// A single path component with no separators or parent references.
fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Derive stored filenames from the client-supplied upload name.
///
/// Only the final path component's stem is used; characters outside
/// `[A-Za-z0-9._-]` become `_`, and an empty stem becomes `upload`.
pub fn asset_names(upload_filename: &str) -> AssetNames {
    let last = upload_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(upload_filename);
    let stem = Path::new(last)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let mut clean: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if clean.trim_matches('.').is_empty() {
        clean = "upload".to_string();
    }
    AssetNames {
        original: format!("original_{clean}.png"),
        filtered: format!("filtered_{clean}.png"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn open_store(tmp: &TempDir, max_assets: usize) -> UploadStore {
        UploadStore::open(StoreConfig {
            upload_dir: tmp.path().join("uploads"),
            max_assets,
        })
        .unwrap()
    }

    /// Write a file and pin its timestamp `secs` after a fixed base time.
    fn write_aged(store: &UploadStore, name: &str, secs: u64) {
        let path = store.write(name, b"png").unwrap();
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + secs);
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    #[test]
    fn open_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp, 10);
        assert!(store.dir().is_dir());
    }

    #[test]
    fn write_then_read() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp, 10);
        store.write("filtered_a.png", b"abc").unwrap();
        assert_eq!(store.read("filtered_a.png").unwrap(), b"abc");
    }

    #[test]
    fn read_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp, 10);
        assert!(matches!(
            store.read("nope.png"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn traversal_names_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp, 10);
        for name in ["../secret.png", "a/b.png", "..", "", "c\\d.png"] {
            assert!(
                matches!(store.read(name), Err(StoreError::InvalidName(_))),
                "{name:?} accepted"
            );
            assert!(store.write(name, b"x").is_err(), "{name:?} writable");
        }
    }

    #[test]
    fn list_sorts_oldest_first_and_skips_non_png() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp, 10);
        write_aged(&store, "b.png", 20);
        write_aged(&store, "a.png", 30);
        write_aged(&store, "c.png", 10);
        fs::write(store.dir().join("notes.txt"), "x").unwrap();
        fs::create_dir(store.dir().join("nested.png")).unwrap();

        let names: Vec<String> = store.list().unwrap().into_iter().map(|a| a.filename).collect();
        assert_eq!(names, vec!["c.png", "b.png", "a.png"]);
    }

    #[test]
    fn sweep_keeps_ten_newest_of_twelve() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp, 10);
        for i in 0..12 {
            write_aged(&store, &format!("asset_{i:02}.png"), i);
        }

        let report = store.sweep(&[]);
        assert_eq!(report.removed, vec!["asset_00.png", "asset_01.png"]);
        assert_eq!(report.kept, 10);
        assert!(report.failed.is_empty());

        let remaining: Vec<String> = store.list().unwrap().into_iter().map(|a| a.filename).collect();
        let expected: Vec<String> = (2..12).map(|i| format!("asset_{i:02}.png")).collect();
        assert_eq!(remaining, expected);
    }

    #[test]
    fn sweep_under_cap_removes_nothing() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp, 10);
        for i in 0..3 {
            write_aged(&store, &format!("asset_{i}.png"), i);
        }
        let report = store.sweep(&[]);
        assert!(report.removed.is_empty());
        assert_eq!(report.kept, 3);
    }

    #[test]
    fn sweep_spares_protected_files() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp, 2);
        write_aged(&store, "new.png", 0);
        write_aged(&store, "old_1.png", 5);
        write_aged(&store, "old_2.png", 6);

        let report = store.sweep(&["new.png"]);
        assert_eq!(report.removed, vec!["old_1.png"]);
        assert!(store.read("new.png").is_ok());
    }

    #[test]
    fn expired_with_ties_uses_filename_order() {
        let t = SystemTime::UNIX_EPOCH;
        let mut assets = vec![
            StoredAsset {
                filename: "b.png".into(),
                created_at: t,
            },
            StoredAsset {
                filename: "a.png".into(),
                created_at: t,
            },
        ];
        sort_oldest_first(&mut assets);
        let gone = expired(&assets, 1, &[]);
        assert_eq!(gone.len(), 1);
        assert_eq!(gone[0].filename, "a.png");
    }

    #[test]
    fn asset_names_follow_convention() {
        let names = asset_names("holiday.jpg");
        assert_eq!(names.original, "original_holiday.png");
        assert_eq!(names.filtered, "filtered_holiday.png");
    }

    #[test]
    fn asset_names_sanitise_client_paths() {
        assert_eq!(
            asset_names("../../etc/pass wd.jpeg").filtered,
            "filtered_pass_wd.png"
        );
        assert_eq!(
            asset_names("C:\\Users\\me\\my photo.png").original,
            "original_my_photo.png"
        );
        assert_eq!(asset_names("café.gif").original, "original_caf_.png");
    }

    #[test]
    fn asset_names_fallback_for_empty_stem() {
        assert_eq!(asset_names("").original, "original_upload.png");
        assert_eq!(asset_names("...").original, "original_upload.png");
    }
}
