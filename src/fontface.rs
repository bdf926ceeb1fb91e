//! `@font-face` extraction.
//!
//! Each `@font-face` rule is reduced to a single [`FontFace`]: its family,
//! weight and style, plus the one source from its `src` list that best
//! matches the configured format preference.
//!
//! ## Source Selection
//!
//! `src` is split on top-level commas. A source is only considered when it
//! names both a URL and a format:
//!
//! ```text
//! url(/fonts/a.woff2) format('woff2')     ✓ { url: /fonts/a.woff2, format: woff2 }
//! url("a.woff") format("woff")            ✓ { url: a.woff, format: woff }
//! url(a.ttf)                              ✗ no format
//! local('Font A')                         ✗ not a url
//! ```
//!
//! Among the sources whose format is in [`FontConfig::formats`], the one
//! whose format comes first in that list wins; between sources of the same
//! format, the first one written wins.
//!
//! ## Outcomes
//!
//! Every rule ends in exactly one [`FaceOutcome`]:
//! - registered under its URL (a later rule with the same URL replaces it)
//! - skipped because no source has an accepted format (logged as a warning)
//! - skipped because the chosen source is a `data:` URI and those are disabled

use crate::config::FontConfig;
use crate::minify::Minifier;
use crate::tree::{AtRule, NameMatcher, StyleTree};
use crate::values::{comma_list, is_data_uri, strip_quotes};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

const FONT_FACE: NameMatcher = NameMatcher::new(&["font-face"]);

static SOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(["']?([\w\W]+?)["']?\)\s+format\(["']?((?-u:\w)+)["']?\)"#)
        .expect("Failed to compile font source regex")
});

/// One font resource, as it appears in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontFace {
    pub family: String,
    pub weight: String,
    pub style: String,
    pub format: String,
    pub url: String,
    /// The `src` value exactly as written.
    pub src: String,
    /// The whole `@font-face` rule, minified.
    pub css: String,
}

/// One `url(...) format(...)` entry of a `src` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAlternative {
    pub url: String,
    pub format: String,
}

/// Non-fatal problems found while extracting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A `@font-face` offered no source in any accepted format.
    NoMatchingFormat { family: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NoMatchingFormat { family } => {
                write!(f, "No matching sources found for {family}")
            }
        }
    }
}

/// Result of processing a single `@font-face` rule.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceOutcome {
    Registered(FontFace),
    NoMatchingFormat { family: String },
    DataUri { family: String, url: String },
}

/// Font faces found in a stylesheet, keyed by URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontFaces {
    pub candidates: BTreeMap<String, FontFace>,
    pub warnings: Vec<Warning>,
}

/// Parse a single `src` entry.
pub fn parse_source(source: &str) -> Option<SourceAlternative> {
    let caps = SOURCE_RE.captures(source)?;
    Some(SourceAlternative {
        url: caps[1].to_string(),
        format: caps[2].to_string(),
    })
}

/// Pick the preferred source from a raw `src` value.
pub fn select_source(src: &str, config: &FontConfig) -> Option<SourceAlternative> {
    comma_list(src)
        .into_iter()
        .filter_map(parse_source)
        .filter_map(|alt| config.rank(&alt.format).map(|rank| (rank, alt)))
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, alt)| alt)
}

/// Resolve one `@font-face` rule.
pub fn resolve_font_face(
    rule: &AtRule,
    config: &FontConfig,
    minifier: &impl Minifier,
) -> FaceOutcome {
    let family = declaration_value(rule, "font-family").to_string();
    let src = rule.last_value("src").unwrap_or_default();

    let Some(SourceAlternative { url, format }) = select_source(src, config) else {
        return FaceOutcome::NoMatchingFormat { family };
    };
    if !config.data_uris && is_data_uri(&url) {
        return FaceOutcome::DataUri { family, url };
    }

    FaceOutcome::Registered(FontFace {
        family,
        weight: declaration_or_normal(rule, "font-weight"),
        style: declaration_or_normal(rule, "font-style"),
        format,
        url,
        src: src.to_string(),
        css: minifier.minify(&rule.source),
    })
}

/// Collect every `@font-face` in the tree.
pub fn extract_font_faces(
    tree: &StyleTree,
    config: &FontConfig,
    minifier: &impl Minifier,
) -> FontFaces {
    tree.fold_at_rules(FontFaces::default(), |mut faces, rule| {
        if !FONT_FACE.matches(&rule.name) {
            return faces;
        }
        match resolve_font_face(rule, config, minifier) {
            FaceOutcome::Registered(face) => {
                faces.candidates.insert(face.url.clone(), face);
            }
            FaceOutcome::NoMatchingFormat { family } => {
                let warning = Warning::NoMatchingFormat { family };
                log::warn!("{warning}");
                faces.warnings.push(warning);
            }
            FaceOutcome::DataUri { family, url } => {
                let head = url.split(',').next().unwrap_or_default();
                log::debug!("Skipping data URI source for {family}: {head},...");
            }
        }
        faces
    })
}

/// Last value of `property`, without quotes; empty when absent.
fn declaration_value<'a>(rule: &'a AtRule, property: &str) -> &'a str {
    rule.last_value(property).map(strip_quotes).unwrap_or_default()
}

fn declaration_or_normal(rule: &AtRule, property: &str) -> String {
    match declaration_value(rule, property) {
        "" => "normal".to_string(),
        value => value.to_string(),
    }
}
