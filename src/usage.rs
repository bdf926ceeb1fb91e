//! Font family usage scanning.
//!
//! Collects the families that style rules actually ask for. Only the first
//! family of each `font` / `font-family` declaration counts, since that is
//! the one the browser will try to download; fallbacks later in the list
//! are assumed to be local or generic.
//!
//! The family token is the last whitespace-separated part of the first
//! comma segment, with quoted names kept whole:
//!
//! ```text
//! font-family: 'Open Sans', sans-serif    → Open Sans
//! font: italic bold 12px/30px "Font A"    → Font A
//! font: 12px Open Sans                    → Sans   (unquoted multi-word names misparse)
//! ```
//!
//! Declarations that are not directly inside a selector rule are ignored:
//! top-level declarations and ones placed straight inside `@media` or other
//! at-rules don't style anything.

use crate::tree::{NameMatcher, StyleTree};
use crate::values::{comma_list, space_list, strip_quotes};
use std::collections::BTreeSet;

const FONT_PROPERTIES: NameMatcher = NameMatcher::new(&["font", "font-family"]);

/// Set of font family names referenced by style rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamilyUsage {
    families: BTreeSet<String>,
}

impl FamilyUsage {
    pub fn insert(&mut self, family: impl Into<String>) {
        self.families.insert(family.into());
    }

    pub fn contains(&self, family: &str) -> bool {
        self.families.contains(family)
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.families.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FamilyUsage {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            families: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Collect the families used by selector rules in the tree.
pub fn scan_family_usage(tree: &StyleTree) -> FamilyUsage {
    tree.fold_declarations(FamilyUsage::default(), |mut usage, parent, decl| {
        if parent.is_selector_rule() && FONT_PROPERTIES.matches(&decl.property) {
            if let Some(family) = first_font_family(&decl.value) {
                usage.insert(family);
            }
        }
        usage
    })
}

/// The family a `font` or `font-family` value asks for first.
///
/// Returns `None` when the first segment of the value is empty.
pub fn first_font_family(value: &str) -> Option<&str> {
    let first = comma_list(value).into_iter().next()?;
    space_list(first).pop().map(strip_quotes)
}
