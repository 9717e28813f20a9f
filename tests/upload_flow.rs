//! End-to-end upload processing with the real imaging backend.
//!
//! Drives `process_upload` exactly as the server does, minus HTTP, and checks
//! the PNGs that land on disk.

use snapfilter::config::StoreConfig;
use snapfilter::filters::{FilterKind, FilterSpec, GaussianNoise};
use snapfilter::imaging::{Channels, ImagingBackend, PixelBuffer, RustBackend};
use snapfilter::process::{ProcessError, ProcessSettings, Upload, process_upload};
use snapfilter::store::UploadStore;
use std::fs;
use tempfile::TempDir;

fn store(tmp: &TempDir, max_assets: usize) -> UploadStore {
    UploadStore::open(StoreConfig {
        upload_dir: tmp.path().to_path_buf(),
        max_assets,
    })
    .unwrap()
}

fn png_upload(name: &str, color: [u8; 3]) -> Upload {
    let bytes = RustBackend::new()
        .encode_png(&PixelBuffer::filled_rgb(40, 30, color))
        .unwrap();
    Upload {
        filename: name.to_string(),
        bytes,
    }
}

fn read_png(tmp: &TempDir, name: &str) -> PixelBuffer {
    RustBackend::new()
        .decode(&fs::read(tmp.path().join(name)).unwrap())
        .unwrap()
}

#[test]
fn solid_red_negative_becomes_cyan_canvas() {
    let tmp = TempDir::new().unwrap();
    let result = process_upload(
        &RustBackend::new(),
        &store(&tmp, 10),
        &ProcessSettings::default(),
        &png_upload("red.png", [255, 0, 0]),
        &[FilterSpec::new(FilterKind::Negative)],
        &mut GaussianNoise::seeded(0),
    )
    .unwrap();

    assert_eq!(result.filtered, "filtered_red.png");
    let filtered = read_png(&tmp, &result.filtered);
    assert_eq!((filtered.width(), filtered.height()), (800, 600));
    assert_eq!(filtered.channels(), Channels::Rgb);
    assert!(filtered.samples().chunks_exact(3).all(|px| px == [0, 255, 255]));

    let original = read_png(&tmp, &result.original);
    assert_eq!((original.width(), original.height()), (800, 600));
    assert!(original.samples().chunks_exact(3).all(|px| px == [255, 0, 0]));
}

#[test]
fn empty_filter_list_stores_identical_pair() {
    let tmp = TempDir::new().unwrap();
    let result = process_upload(
        &RustBackend::new(),
        &store(&tmp, 10),
        &ProcessSettings::default(),
        &png_upload("grey.png", [90, 90, 90]),
        &[],
        &mut GaussianNoise::seeded(0),
    )
    .unwrap();
    assert_eq!(
        read_png(&tmp, &result.original),
        read_png(&tmp, &result.filtered)
    );
}

#[test]
fn custom_canvas_is_respected() {
    let tmp = TempDir::new().unwrap();
    let settings = ProcessSettings {
        canvas_width: 64,
        canvas_height: 48,
        ..ProcessSettings::default()
    };
    let result = process_upload(
        &RustBackend::new(),
        &store(&tmp, 10),
        &settings,
        &png_upload("small.png", [10, 20, 30]),
        &[FilterSpec::new(FilterKind::Edges)],
        &mut GaussianNoise::seeded(0),
    )
    .unwrap();
    assert_eq!((result.width, result.height), (64, 48));
    // A flat image has no edges.
    let edges = read_png(&tmp, &result.filtered);
    assert!(edges.samples().iter().all(|&v| v == 0));
}

#[test]
fn seeded_vintage_uploads_match() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    let specs = [FilterSpec::new(FilterKind::Vintage)];
    for tmp in [&a, &b] {
        process_upload(
            &RustBackend::new(),
            &store(tmp, 10),
            &ProcessSettings::default(),
            &png_upload("v.png", [120, 80, 60]),
            &specs,
            &mut GaussianNoise::seeded(99),
        )
        .unwrap();
    }
    assert_eq!(
        read_png(&a, "filtered_v.png"),
        read_png(&b, "filtered_v.png")
    );
}

#[test]
fn retention_keeps_only_the_newest_pairs() {
    let tmp = TempDir::new().unwrap();
    let store = store(&tmp, 4);
    for name in ["a.png", "b.png", "c.png"] {
        process_upload(
            &RustBackend::new(),
            &store,
            &ProcessSettings::default(),
            &png_upload(name, [0, 0, 0]),
            &[],
            &mut GaussianNoise::seeded(0),
        )
        .unwrap();
    }
    let names: Vec<String> = store.list().unwrap().into_iter().map(|a| a.filename).collect();
    assert_eq!(names.len(), 4);
    assert!(names.contains(&"original_c.png".to_string()));
    assert!(names.contains(&"filtered_c.png".to_string()));
}

#[test]
fn garbage_bytes_are_a_decode_error() {
    let tmp = TempDir::new().unwrap();
    let upload = Upload {
        filename: "notes.txt".into(),
        bytes: b"definitely not an image".to_vec(),
    };
    let result = process_upload(
        &RustBackend::new(),
        &store(&tmp, 10),
        &ProcessSettings::default(),
        &upload,
        &[FilterSpec::new(FilterKind::Sepia)],
        &mut GaussianNoise::seeded(0),
    );
    assert!(matches!(result, Err(ProcessError::Decode(_))));
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
}
