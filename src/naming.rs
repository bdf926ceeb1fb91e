//! Filename classification for build output assets.
//!
//! Bundlers commonly append a cache-busting query to emitted asset names
//! (`app.css?3f9a2c`). Every classifier here works on the *canonical*
//! filename, with that query removed, so the query never leaks into the
//! extension check:
//!
//! - `app.css?3f9a2c` → `app.css` → stylesheet
//! - `app.css.zip` → extension `.zip` → not a stylesheet
//! - `.css` → dotfile, no extension → not a stylesheet

use std::path::Path;

/// Extensions recognized as stylesheets when nothing else is configured.
pub const STYLESHEET_EXTENSIONS: &[&str] = &[".css"];

/// Return the filename without its `?query` suffix.
///
/// Everything from the first `?` onward is dropped:
/// - `"a.css?v=1"` → `"a.css"`
/// - `"a.css?v=1?x"` → `"a.css"`
/// - `"a.css"` → `"a.css"`
pub fn canonical_filename(name: &str) -> &str {
    match name.find('?') {
        Some(pos) => &name[..pos],
        None => name,
    }
}

/// Lower-cased extension of the canonical filename, including the leading dot.
///
/// Returns `None` for names without an extension and for dotfiles such as
/// `.css`, matching how path utilities treat a leading dot as part of the stem.
pub fn extension(name: &str) -> Option<String> {
    Path::new(canonical_filename(name))
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

/// Returns true if the filename's extension is one of `extensions`.
///
/// Extensions are given with their leading dot (`".css"`) and compared
/// case-insensitively.
pub fn is_file_of_types<S: AsRef<str>>(name: &str, extensions: &[S]) -> bool {
    match extension(name) {
        Some(ext) => extensions
            .iter()
            .any(|candidate| candidate.as_ref().eq_ignore_ascii_case(&ext)),
        None => false,
    }
}

/// Returns true if the filename is a stylesheet.
pub fn is_stylesheet(name: &str) -> bool {
    is_file_of_types(name, STYLESHEET_EXTENSIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_filename_drops_query() {
        assert_eq!(canonical_filename("a.css?v=1"), "a.css");
        assert_eq!(canonical_filename("/x/a.css?"), "/x/a.css");
    }

    #[test]
    fn canonical_filename_drops_from_first_question_mark() {
        assert_eq!(canonical_filename("a.css?v=1?x=2"), "a.css");
    }

    #[test]
    fn canonical_filename_without_query_is_unchanged() {
        assert_eq!(canonical_filename("/x/a.css"), "/x/a.css");
    }

    #[test]
    fn recognizes_stylesheets() {
        for name in ["a.css", "/x/a.css", "/x/a.CSS", "/x/a.css?v=1"] {
            assert!(is_stylesheet(name), "{name} should be a stylesheet");
        }
    }

    #[test]
    fn rejects_non_stylesheets() {
        for name in ["/x/a.css.zip", "/x/a.cssx", "/x/a", "/x/.css", "a.js?x.css"] {
            assert!(!is_stylesheet(name), "{name} should not be a stylesheet");
        }
    }

    #[test]
    fn extension_is_lower_cased_with_dot() {
        assert_eq!(extension("/x/A.SCSS").as_deref(), Some(".scss"));
        assert_eq!(extension("README"), None);
    }

    #[test]
    fn custom_extension_sets() {
        let extensions = vec![".css".to_string(), ".PCSS".to_string()];
        assert!(is_file_of_types("theme.pcss", &extensions));
        assert!(is_file_of_types("theme.css?x", &extensions));
        assert!(!is_file_of_types("theme.scss", &extensions));
    }
}
