//! # Font Manifest
//!
//! Builds a manifest of the web fonts a stylesheet actually uses.
//! A font file is listed only when an `@font-face` rule declares it and some
//! style rule refers to its family. Every entry carries the minified
//! `@font-face` text, so a page generator can inline the rule or preload the
//! URL without touching the stylesheet again.
//!
//! ```text
//! @font-face { font-family: 'Font A';                 {
//!   src: url(/fonts/a.woff2) format('woff2'); }   →     "/fonts/a.woff2": {
//! body { font-family: 'Font A'; }                         "family": "Font A", "weight": "normal",
//!                                                         "style": "normal", "format": "woff2", ...
//!                                                       }
//!                                                     }
//! ```
//!
//! # Architecture: Two Passes, One Filter
//!
//! The stylesheet is parsed once into a [`tree::StyleTree`]. Two independent
//! folds run over it and their results are intersected:
//!
//! ```text
//! 1. Usage     StyleTree  →  FamilyUsage    (families named by style rules)
//! 2. Faces     StyleTree  →  candidates     (one best source per @font-face)
//! 3. Filter    candidates ∩ FamilyUsage  →  Manifest
//! ```
//!
//! Neither pass mutates the tree or shares state, so the result is a pure
//! function of the stylesheet text and the [`config::FontConfig`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`values`] | Quote stripping, data URI detection, CSS list splitting |
//! | [`naming`] | Asset filename conventions: query strings, stylesheet extensions |
//! | [`tree`] | Style tree types and read-only folds over them |
//! | [`parser`] | `cssparser`-driven builder for the style tree |
//! | [`usage`] | Family usage scanner |
//! | [`fontface`] | `@font-face` source selection and candidate extraction |
//! | [`minify`] | Minifier trait and the `lightningcss` implementation |
//! | [`manifest`] | Per-stylesheet manifest generation and merging |
//! | [`pipeline`] | Build directory discovery, parallel extraction, manifest output |
//! | [`config`] | `font-manifest.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Raw Declaration Text
//!
//! Declarations keep their value text exactly as written. The manifest
//! reports the original `src` value, and family names are compared after
//! quote stripping only, so a typed CSS object model would lose information
//! the manifest needs. `lightningcss` is used where a typed model helps:
//! minifying the `@font-face` rule text.
//!
//! ## One Source Per Face
//!
//! Browsers download the first source they support. Modern browsers all
//! support WOFF2, so the manifest records the single most preferred source
//! by [`config::FontConfig::formats`] order rather than every alternative.
//!
//! ## Data URIs Are Opt-In
//!
//! A font embedded as a `data:` URI is already part of the stylesheet, so
//! there is nothing to preload and the URL would bloat the manifest. Such
//! sources are skipped unless `data_uris` is enabled.

pub mod config;
pub mod fontface;
pub mod manifest;
pub mod minify;
pub mod naming;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod tree;
pub mod usage;
pub mod values;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::FontConfig;
pub use fontface::{FontFace, Warning};
pub use manifest::{ExtractError, Extraction, Manifest, generate_manifest, generate_manifest_with};
pub use minify::{LightningMinifier, Minifier};
