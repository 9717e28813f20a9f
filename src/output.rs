//! CLI output formatting.
//!
//! Output is information-first: the primary line names what happened
//! (filters, image size), with file paths as indented context lines.
//! Formatters return `Vec<String>` so tests can assert on exact lines; the
//! `print_*` wrappers write them to stdout.
//!
//! ## Apply
//!
//! ```text
//! Sepia → Blur 15 (800x600)
//!     Source: holiday.jpg
//!     Output: holiday-sepia.png
//! ```
//!
//! ## List
//!
//! ```text
//! Uploads (4/10)
//! 001 original_cat.png
//! 002 filtered_cat.png
//! ...
//! ```

use crate::filters::FilterSpec;
use crate::store::StoredAsset;
use std::path::Path;

fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn filter_chain(specs: &[FilterSpec]) -> String {
    if specs.is_empty() {
        return "No filters".to_string();
    }
    specs
        .iter()
        .map(|s| match (s.kind, s.intensity) {
            (crate::filters::FilterKind::Blur, Some(k)) => {
                format!("{} {}", s.kind.display_name(), k)
            }
            _ => s.kind.display_name().to_string(),
        })
        .collect::<Vec<_>>()
        .join(" → ")
}

pub fn format_apply_output(
    specs: &[FilterSpec],
    width: u32,
    height: u32,
    source: &Path,
    output: &Path,
) -> Vec<String> {
    vec![
        format!("{} ({}x{})", filter_chain(specs), width, height),
        format!("{}Source: {}", indent(1), source.display()),
        format!("{}Output: {}", indent(1), output.display()),
    ]
}

pub fn print_apply_output(
    specs: &[FilterSpec],
    width: u32,
    height: u32,
    source: &Path,
    output: &Path,
) {
    for line in format_apply_output(specs, width, height, source, output) {
        println!("{}", line);
    }
}

/// Stored assets, oldest first; the oldest are the next to be swept.
pub fn format_store_listing(assets: &[StoredAsset], max_assets: usize) -> Vec<String> {
    let mut lines = vec![format!("Uploads ({}/{})", assets.len(), max_assets)];
    if assets.is_empty() {
        lines.push(format!("{}(empty)", indent(1)));
    }
    for (i, asset) in assets.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), asset.filename));
    }
    lines
}

pub fn print_store_listing(assets: &[StoredAsset], max_assets: usize) {
    for line in format_store_listing(assets, max_assets) {
        println!("{}", line);
    }
}
