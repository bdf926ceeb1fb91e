//! Build-output integration.
//!
//! Runs the extraction over every stylesheet in a build output directory and
//! writes one merged manifest next to them:
//!
//! ```text
//! dist/
//! ├── css/app.css?        ← scanned (query strings are ignored)
//! ├── css/vendor.css      ← scanned
//! ├── js/app.js           ← ignored
//! └── font-manifest.json  ← written
//! ```
//!
//! ## Selection
//!
//! All stylesheets are processed unless narrowed down:
//! - `assets.only` keeps stylesheets whose name contains one of the given
//!   substrings. It takes precedence over groups.
//! - a named group keeps the stylesheets listed under `[groups]` in the config.
//!
//! ## Parallel Processing
//!
//! Stylesheets are processed in parallel using [rayon](https://docs.rs/rayon).
//! Results are merged in name order, so the manifest does not depend on
//! scheduling: when two stylesheets declare the same font URL, the one whose
//! name sorts last wins. A stylesheet that fails to parse is reported and
//! skipped; it does not affect the others.

use crate::config::{Config, FontConfig};
use crate::fontface::Warning;
use crate::manifest::{ExtractError, Manifest, generate_manifest_with, merge_manifests};
use crate::minify::Minifier;
use crate::naming::is_file_of_types;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown output group: {0}")]
    UnknownGroup(String),
}

/// A stylesheet asset: its name relative to the build directory and its text.
#[derive(Debug, Clone, PartialEq)]
pub struct Stylesheet {
    pub name: String,
    pub content: String,
}

/// Progress events emitted while stylesheets are processed.
///
/// Sent from worker threads, so their order follows completion, not names.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Extracted {
        name: String,
        fonts: usize,
        warnings: Vec<Warning>,
    },
    Failed {
        name: String,
        error: String,
    },
}

/// Outcome of processing a set of stylesheets.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub manifest: Manifest,
    /// Number of stylesheets processed, including failed ones.
    pub processed: usize,
    /// Warnings, tagged with the stylesheet they came from.
    pub warnings: Vec<(String, Warning)>,
    /// Stylesheets that could not be parsed.
    pub failures: Vec<(String, ExtractError)>,
    /// Where the manifest was written, if it was.
    pub output: Option<PathBuf>,
}

/// Read every stylesheet under `root`, sorted by name.
///
/// Names use `/` separators and are relative to `root`. Bytes that are not
/// valid UTF-8 become U+FFFD, so one mis-encoded file cannot stop the build.
pub fn load_stylesheets<S: AsRef<str>>(
    root: &Path,
    extensions: &[S],
) -> Result<Vec<Stylesheet>, PipelineError> {
    let mut stylesheets = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = relative_name(root, entry.path());
        if !is_file_of_types(&name, extensions) {
            continue;
        }
        let bytes = fs::read(entry.path())?;
        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(err) => {
                log::warn!("{name} is not valid UTF-8, replacing invalid bytes");
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };
        stylesheets.push(Stylesheet { name, content });
    }
    stylesheets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(stylesheets)
}

fn relative_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Narrow the stylesheets down by include-list or output group.
pub fn select_stylesheets(
    stylesheets: Vec<Stylesheet>,
    only: &[String],
    group: Option<&str>,
    groups: &BTreeMap<String, Vec<String>>,
) -> Result<Vec<Stylesheet>, PipelineError> {
    if !only.is_empty() {
        return Ok(stylesheets
            .into_iter()
            .filter(|sheet| only.iter().any(|part| sheet.name.contains(part.as_str())))
            .collect());
    }
    let Some(group) = group else {
        return Ok(stylesheets);
    };
    let members = groups
        .get(group)
        .ok_or_else(|| PipelineError::UnknownGroup(group.to_string()))?;
    Ok(stylesheets
        .into_iter()
        .filter(|sheet| members.contains(&sheet.name))
        .collect())
}

/// Extract and merge the manifests of all `stylesheets`.
pub fn build_manifest(
    stylesheets: &[Stylesheet],
    config: &FontConfig,
    minifier: &impl Minifier,
    events: Option<Sender<PipelineEvent>>,
) -> BuildReport {
    let results: Vec<_> = stylesheets
        .par_iter()
        .map(|sheet| {
            let result =
                generate_manifest_with(&sheet.content, Some(&sheet.name), config, minifier);
            if let Some(tx) = &events {
                let event = match &result {
                    Ok(extraction) => PipelineEvent::Extracted {
                        name: sheet.name.clone(),
                        fonts: extraction.manifest.len(),
                        warnings: extraction.warnings.clone(),
                    },
                    Err(err) => PipelineEvent::Failed {
                        name: sheet.name.clone(),
                        error: err.to_string(),
                    },
                };
                tx.send(event).ok();
            }
            result
        })
        .collect();

    let mut report = BuildReport {
        processed: stylesheets.len(),
        ..BuildReport::default()
    };
    let mut manifests = Vec::new();
    for (sheet, result) in stylesheets.iter().zip(results) {
        match result {
            Ok(extraction) => {
                report.warnings.extend(
                    extraction
                        .warnings
                        .into_iter()
                        .map(|warning| (sheet.name.clone(), warning)),
                );
                manifests.push(extraction.manifest);
            }
            Err(err) => {
                log::error!("{err}");
                report.failures.push((sheet.name.clone(), err));
            }
        }
    }
    report.manifest = merge_manifests(manifests);
    report
}

/// Serialize the manifest as JSON into `dir/name`.
pub fn write_manifest(
    manifest: &Manifest,
    dir: &Path,
    name: &str,
    pretty: bool,
) -> Result<PathBuf, PipelineError> {
    fs::create_dir_all(dir)?;
    let json = if pretty {
        serde_json::to_string_pretty(manifest)?
    } else {
        serde_json::to_string(manifest)?
    };
    let path = dir.join(name);
    fs::write(&path, json)?;
    Ok(path)
}

/// Scan `root`, extract all selected stylesheets and write the manifest
/// into `root`.
pub fn build(
    root: &Path,
    config: &Config,
    group: Option<&str>,
    minifier: &impl Minifier,
    events: Option<Sender<PipelineEvent>>,
) -> Result<BuildReport, PipelineError> {
    let stylesheets = load_stylesheets(root, &config.assets.extensions)?;
    let selected = select_stylesheets(stylesheets, &config.assets.only, group, &config.groups)?;
    log::debug!("Processing {} stylesheets under {}", selected.len(), root.display());

    let mut report = build_manifest(&selected, &config.fonts, minifier, events);
    let path = write_manifest(
        &report.manifest,
        root,
        &config.assets.output,
        config.assets.pretty,
    )?;
    report.output = Some(path);
    Ok(report)
}
