//! CLI output formatting.
//!
//! Output is **font-centric, not file-centric**: the summary lists the fonts
//! that made it into the manifest, identified by family, weight and style,
//! with the URL shown after the arrow. Stylesheet names appear only in
//! progress lines and diagnostics.
//!
//! # Output Format
//!
//! ## Progress (one entry per stylesheet, in completion order)
//!
//! ```text
//! css/app.css (2 fonts)
//! css/legacy.css (0 fonts)
//!     Warning: No matching sources found for Old Face
//! css/broken.css
//!     Error: Malformed stylesheet css/broken.css:3:1: unexpected '}'
//! ```
//!
//! ## Summary
//!
//! ```text
//! Fonts
//!     Font A 400 normal → /fonts/a.woff2 (woff2)
//!     Font A 700 italic → /fonts/a-bold-italic.woff2 (woff2)
//!
//! Processed 3 stylesheets: 2 fonts, 1 warning, 1 failed
//! Wrote dist/font-manifest.json
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::fontface::FontFace;
use crate::manifest::Manifest;
use crate::pipeline::{BuildReport, PipelineEvent};

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 font`, `2 fonts`.
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Format a font line: identity first, then where it lives.
///
/// ```text
/// Font A 400 normal → /fonts/a.woff2 (woff2)
/// ```
fn font_line(face: &FontFace) -> String {
    let family = if face.family.is_empty() {
        "(unnamed)"
    } else {
        &face.family
    };
    format!(
        "{} {} {} \u{2192} {} ({})",
        family,
        face.weight,
        face.style,
        display_url(&face.url),
        face.format
    )
}

/// Data URIs are shortened to their media type.
fn display_url(url: &str) -> String {
    if crate::values::is_data_uri(url) {
        let head = url.split([',', ';']).next().unwrap_or(url);
        format!("{}…", head.trim())
    } else {
        url.to_string()
    }
}

// ============================================================================
// Progress events
// ============================================================================

/// Format a single pipeline progress event as display lines.
pub fn format_pipeline_event(event: &PipelineEvent) -> Vec<String> {
    match event {
        PipelineEvent::Extracted {
            name,
            fonts,
            warnings,
        } => {
            let mut lines = vec![format!("{} ({})", name, plural(*fonts, "font"))];
            for warning in warnings {
                lines.push(format!("{}Warning: {}", indent(1), warning));
            }
            lines
        }
        PipelineEvent::Failed { name, error } => {
            vec![name.clone(), format!("{}Error: {}", indent(1), error)]
        }
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Format the fonts of a manifest, ordered by family, weight and style.
pub fn format_manifest(manifest: &Manifest) -> Vec<String> {
    let mut faces: Vec<&FontFace> = manifest.values().collect();
    faces.sort_by(|a, b| {
        (&a.family, &a.weight, &a.style, &a.url).cmp(&(&b.family, &b.weight, &b.style, &b.url))
    });

    let mut lines = vec!["Fonts".to_string()];
    if faces.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for face in faces {
        lines.push(format!("{}{}", indent(1), font_line(face)));
    }
    lines
}

/// Format the end-of-build summary.
pub fn format_build_summary(report: &BuildReport) -> Vec<String> {
    let mut lines = format_manifest(&report.manifest);
    lines.push(String::new());

    let mut counts = vec![plural(report.manifest.len(), "font")];
    if !report.warnings.is_empty() {
        counts.push(plural(report.warnings.len(), "warning"));
    }
    if !report.failures.is_empty() {
        counts.push(format!("{} failed", report.failures.len()));
    }
    lines.push(format!(
        "Processed {}: {}",
        plural(report.processed, "stylesheet"),
        counts.join(", ")
    ));
    if let Some(path) = &report.output {
        lines.push(format!("Wrote {}", path.display()));
    }
    lines
}

/// Print the build summary to stdout.
pub fn print_build_summary(report: &BuildReport) {
    for line in format_build_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
