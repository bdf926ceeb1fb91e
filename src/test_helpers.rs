//! Shared test utilities.
//!
//! Manifests are built with an identity minifier so assertions can compare
//! the `css` field against the exact rule text.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let manifest = manifest_of(css, &FontConfig::default());
//! let face = find_font(&manifest, "/fonts/a.woff2");
//! assert_eq!(face.family, "Font A");
//! ```

use std::path::Path;

use crate::config::FontConfig;
use crate::fontface::FontFace;
use crate::manifest::{Manifest, generate_manifest_with};

/// Minifier that returns its input unchanged.
pub fn identity(css: &str) -> String {
    css.to_string()
}

/// Build the manifest for `css`. Panics if the stylesheet does not parse.
pub fn manifest_of(css: &str, config: &FontConfig) -> Manifest {
    generate_manifest_with(css, None, config, &identity)
        .unwrap_or_else(|err| panic!("stylesheet failed to parse: {err}"))
        .manifest
}

/// Find a font by URL. Panics if not found.
pub fn find_font<'a>(manifest: &'a Manifest, url: &str) -> &'a FontFace {
    manifest.get(url).unwrap_or_else(|| {
        let available: Vec<&str> = manifest.keys().map(String::as_str).collect();
        panic!("font '{url}' not found. Available: {available:?}")
    })
}

/// All URLs in the manifest, in key order.
pub fn urls(manifest: &Manifest) -> Vec<&str> {
    manifest.keys().map(String::as_str).collect()
}

/// Write `files` (relative path → content) under `root`, creating directories.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
    }
}
