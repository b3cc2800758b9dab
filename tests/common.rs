#![allow(dead_code)]

use actix_web::web;
use std::collections::HashMap;
use std::path::Path;

use railtrack_server::qr::Rgb;
use railtrack_server::{AppConfig, AppState};

pub const TEST_BASE_URL: &str = "http://certs.test:5000";

/// Build a config that stores artifacts under `uploads_dir`.
pub fn test_config(uploads_dir: &Path, extra: &[(&str, &str)]) -> AppConfig {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("PUBLIC_BASE_URL".into(), TEST_BASE_URL.into());
    vars.insert("UPLOADS_DIR".into(), uploads_dir.display().to_string());
    for (key, value) in extra {
        vars.insert(key.to_string(), value.to_string());
    }
    AppConfig::from_lookup(|key| vars.get(key).cloned()).expect("test config should be valid")
}

pub fn test_state(uploads_dir: &Path) -> web::Data<AppState> {
    let state = AppState::new(test_config(uploads_dir, &[])).expect("uploads dir should be creatable");
    web::Data::new(state)
}

/// Grey values of tightly packed RGB pixels.
pub fn rgb_to_luma(rgb: &[u8]) -> Vec<u8> {
    rgb.chunks_exact(3)
        .map(|p| Rgb([p[0], p[1], p[2]]).luma())
        .collect()
}

/// Scan a greyscale raster and return the payload of the single code in it.
pub fn scan_code(width: usize, height: usize, luma: &[u8]) -> String {
    assert_eq!(luma.len(), width * height, "raster size mismatch");
    let mut img =
        rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| luma[y * width + x]);
    let grids = img.detect_grids();
    assert_eq!(grids.len(), 1, "expected exactly one QR code");
    let (_meta, content) = grids[0].decode().expect("QR code should decode");
    content
}

/// Names of the files currently in `dir`, sorted.
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("dir should be readable")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn acme_request() -> serde_json::Value {
    serde_json::json!({
        "vendorName": "Acme Rail",
        "lotNumber": "L-2024-001",
        "itemType": "Fishplate",
        "manufactureDate": "2024-01-15",
        "supplyDate": "2024-02-01",
        "warrantyPeriod": "5 years"
    })
}
