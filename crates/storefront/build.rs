//! Build script for the storefront crate.
//!
//! Hashes the stylesheet and page scripts so templates can append a version
//! to their URLs and static files can be cached for a long time.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Files whose content determines the asset version.
const ASSETS: [&str; 3] = ["static/css/marche.css", "static/js/actions.js", "static/js/live.js"];

fn main() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:rustc-env=ASSET_VERSION=dev");
        return;
    };

    let mut hasher = Sha256::new();
    for asset in ASSETS {
        let path = Path::new(&manifest_dir).join(asset);
        println!("cargo:rerun-if-changed={}", path.display());
        match fs::read(&path) {
            Ok(content) => hasher.update(&content),
            Err(e) => println!("cargo:warning=Could not read {asset}: {e}"),
        }
    }

    let hash = format!("{:x}", hasher.finalize());
    println!("cargo:rustc-env=ASSET_VERSION={}", &hash[..8]);
}
