//! Minification of font-face rule text.
//!
//! Every manifest entry carries a compact copy of its `@font-face` rule so a
//! consumer can inline it (e.g. in a `<style>` tag next to a preload link).
//! The minifier is passed in explicitly and must be a pure function of its
//! input: the pipeline shares one instance across worker threads.

use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{ParserOptions, StyleSheet};

/// Turns CSS text into its minified form.
pub trait Minifier: Sync {
    fn minify(&self, css: &str) -> String;
}

/// Any pure `Fn(&str) -> String` is a minifier.
impl<F> Minifier for F
where
    F: Fn(&str) -> String + Sync,
{
    fn minify(&self, css: &str) -> String {
        self(css)
    }
}

/// Minifier backed by lightningcss.
///
/// Text that lightningcss cannot handle is returned trimmed but otherwise
/// unchanged, so a manifest entry always has some rule text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LightningMinifier;

impl LightningMinifier {
    pub fn try_minify(css: &str) -> Result<String, String> {
        let sheet = StyleSheet::parse(css, ParserOptions::default()).map_err(|e| e.to_string())?;
        let printed = sheet
            .to_css(PrinterOptions {
                minify: true,
                ..PrinterOptions::default()
            })
            .map_err(|e| e.to_string())?;
        Ok(printed.code)
    }
}

impl Minifier for LightningMinifier {
    fn minify(&self, css: &str) -> String {
        match Self::try_minify(css) {
            Ok(code) => code,
            Err(err) => {
                log::debug!("Could not minify rule, keeping source text: {err}");
                css.trim().to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_minifiers() {
        let upper = |css: &str| css.to_uppercase();
        assert_eq!(upper.minify("a{}"), "A{}");
    }

    #[test]
    fn lightning_minifier_compacts_font_face() {
        let css = "@font-face {\n  font-family: 'Font A';\n  src: url(/fonts/a.woff2) format('woff2');\n}\n";
        let minified = LightningMinifier.minify(css);

        assert!(minified.starts_with("@font-face{"), "{minified}");
        assert!(minified.contains("/fonts/a.woff2"), "{minified}");
        assert!(!minified.contains('\n'), "{minified}");
        assert!(minified.len() < css.len());
    }

    #[test]
    fn lightning_minifier_is_deterministic() {
        let css = "@font-face { font-family: X; src: url(x.woff) format('woff'); }";
        assert_eq!(LightningMinifier.minify(css), LightningMinifier.minify(css));
    }

    #[test]
    fn try_minify_handles_plain_rules() {
        let minified = LightningMinifier::try_minify("a {\n  color: red;\n}").unwrap();
        assert_eq!(minified, "a{color:red}");
    }
}
