//! Build script for storefront crate.
//!
//! Hashes the static assets the layout links to so their URLs change
//! whenever their content does (`/static/css/main.css?v={hash}`).

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Assets hashed together into `ASSET_HASH`.
const ASSETS: &[&str] = &["static/css/main.css", "static/js/app.js"];

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");

    let mut hasher = Sha256::new();
    for asset in ASSETS {
        let path = Path::new(&manifest_dir).join(asset);
        println!("cargo:rerun-if-changed={}", path.display());

        match fs::read(&path) {
            Ok(content) => hasher.update(&content),
            Err(e) => println!("cargo:warning=Could not read {asset}: {e}"),
        }
    }

    let digest = hasher.finalize();
    let short_hash = digest.iter().take(4).fold(String::new(), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    });

    println!("cargo:rustc-env=ASSET_HASH={short_hash}");
}
