//! Manifest generation for a single stylesheet.
//!
//! Ties the stages together:
//!
//! ```text
//! text ──parse──▶ StyleTree ─┬─ scan_family_usage ──▶ FamilyUsage ─┐
//!                            └─ extract_font_faces ─▶ candidates ──┴─ filter_unused ──▶ Manifest
//! ```
//!
//! The result is a pure function of the stylesheet text and the
//! [`FontConfig`]: the same input always produces the same manifest.

use crate::config::FontConfig;
use crate::fontface::{FontFace, Warning, extract_font_faces};
use crate::minify::{LightningMinifier, Minifier};
use crate::parser::{ParseError, parse_stylesheet};
use crate::usage::{FamilyUsage, scan_family_usage};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Font resources keyed by URL.
pub type Manifest = BTreeMap<String, FontFace>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("Malformed stylesheet {file}:{source}")]
    MalformedSource {
        file: String,
        #[source]
        source: ParseError,
    },
}

/// Everything one stylesheet produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extraction {
    pub manifest: Manifest,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

/// Generate the manifest for a stylesheet, minifying rules with lightningcss.
///
/// `from` names the stylesheet in error messages only.
pub fn generate_manifest(
    css: &str,
    from: Option<&str>,
    config: &FontConfig,
) -> Result<Extraction, ExtractError> {
    generate_manifest_with(css, from, config, &LightningMinifier)
}

/// Generate the manifest for a stylesheet with a specific minifier.
pub fn generate_manifest_with(
    css: &str,
    from: Option<&str>,
    config: &FontConfig,
    minifier: &impl Minifier,
) -> Result<Extraction, ExtractError> {
    let tree = parse_stylesheet(css).map_err(|source| ExtractError::MalformedSource {
        file: from.unwrap_or("<input>").to_string(),
        source,
    })?;

    let usage = scan_family_usage(&tree);
    let faces = extract_font_faces(&tree, config, minifier);

    Ok(Extraction {
        manifest: filter_unused(faces.candidates, &usage),
        warnings: faces.warnings,
    })
}

/// Drop font faces whose family no style rule uses.
pub fn filter_unused(candidates: BTreeMap<String, FontFace>, usage: &FamilyUsage) -> Manifest {
    candidates
        .into_iter()
        .filter(|(_, face)| !face.family.is_empty() && usage.contains(&face.family))
        .collect()
}

/// Union of several manifests; on a URL collision the later one wins.
pub fn merge_manifests(manifests: impl IntoIterator<Item = Manifest>) -> Manifest {
    manifests.into_iter().fold(Manifest::new(), |mut acc, manifest| {
        acc.extend(manifest);
        acc
    })
}
