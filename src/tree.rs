//! The parsed style tree.
//!
//! A stylesheet is a list of [`Node`]s. Each node is one of three kinds,
//! mirroring the block structure of CSS rather than its semantics:
//!
//! ```text
//! @media screen {            ← AtRule { name: "media", prelude: "screen" }
//!     body {                 ← Rule { selector: "body" }
//!         font: 12px Arial;  ← Declaration { property: "font", value: "12px Arial" }
//!     }
//! }
//! ```
//!
//! Declaration values are the raw source text (trimmed, comments and
//! `!important` removed). Nothing else is normalized, so callers see what
//! the author wrote, quotes included.
//!
//! Traversal is exposed as folds: each visit receives the accumulator by
//! value and returns the next one.

/// A parsed stylesheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleTree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rule(Rule),
    AtRule(AtRule),
    Declaration(Declaration),
}

/// A qualified rule: `selector { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: String,
    pub nodes: Vec<Node>,
}

/// An at-rule: `@name prelude;` or `@name prelude { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    /// Name without the `@`.
    pub name: String,
    pub prelude: String,
    /// Child nodes, `None` for statement at-rules such as `@import`.
    pub nodes: Option<Vec<Node>>,
    /// The complete rule text as it appeared in the stylesheet.
    pub source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

/// The node directly enclosing a declaration.
#[derive(Debug, Clone, Copy)]
pub enum Parent<'a> {
    Root,
    Rule(&'a Rule),
    AtRule(&'a AtRule),
}

impl Parent<'_> {
    /// Returns true if the parent is a rule with a non-empty selector.
    pub fn is_selector_rule(&self) -> bool {
        matches!(self, Parent::Rule(rule) if !rule.selector.is_empty())
    }
}

/// A fixed set of CSS names, compared ASCII case-insensitively.
///
/// Property and at-rule names are matched against these instead of ad hoc
/// string comparisons scattered through the visitors.
#[derive(Debug, Clone, Copy)]
pub struct NameMatcher {
    names: &'static [&'static str],
}

impl NameMatcher {
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }
}

impl StyleTree {
    /// Fold over every declaration in source order, together with its parent.
    pub fn fold_declarations<'a, A, F>(&'a self, init: A, mut f: F) -> A
    where
        F: FnMut(A, Parent<'a>, &'a Declaration) -> A,
    {
        fold_declarations(&self.nodes, Parent::Root, init, &mut f)
    }

    /// Fold over every at-rule in source order, nested ones included.
    pub fn fold_at_rules<'a, A, F>(&'a self, init: A, mut f: F) -> A
    where
        F: FnMut(A, &'a AtRule) -> A,
    {
        fold_at_rules(&self.nodes, init, &mut f)
    }
}

fn fold_declarations<'a, A, F>(nodes: &'a [Node], parent: Parent<'a>, init: A, f: &mut F) -> A
where
    F: FnMut(A, Parent<'a>, &'a Declaration) -> A,
{
    let mut acc = init;
    for node in nodes {
        acc = match node {
            Node::Declaration(decl) => f(acc, parent, decl),
            Node::Rule(rule) => fold_declarations(&rule.nodes, Parent::Rule(rule), acc, f),
            Node::AtRule(at_rule) => match &at_rule.nodes {
                Some(children) => fold_declarations(children, Parent::AtRule(at_rule), acc, f),
                None => acc,
            },
        };
    }
    acc
}

fn fold_at_rules<'a, A, F>(nodes: &'a [Node], init: A, f: &mut F) -> A
where
    F: FnMut(A, &'a AtRule) -> A,
{
    let mut acc = init;
    for node in nodes {
        acc = match node {
            Node::Declaration(_) => acc,
            Node::Rule(rule) => fold_at_rules(&rule.nodes, acc, f),
            Node::AtRule(at_rule) => {
                let acc = f(acc, at_rule);
                match &at_rule.nodes {
                    Some(children) => fold_at_rules(children, acc, f),
                    None => acc,
                }
            }
        };
    }
    acc
}

impl AtRule {
    /// Direct child declarations of this at-rule.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.nodes
            .iter()
            .flatten()
            .filter_map(|node| match node {
                Node::Declaration(decl) => Some(decl),
                _ => None,
            })
    }

    /// Value of the last direct declaration of `property`, if any.
    pub fn last_value(&self, property: &str) -> Option<&str> {
        self.declarations()
            .filter(|decl| decl.property.eq_ignore_ascii_case(property))
            .last()
            .map(|decl| decl.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(property: &str, value: &str) -> Node {
        Node::Declaration(Declaration {
            property: property.to_string(),
            value: value.to_string(),
            important: false,
        })
    }

    fn sample() -> StyleTree {
        StyleTree {
            nodes: vec![
                decl("color", "red"),
                Node::Rule(Rule {
                    selector: "body".to_string(),
                    nodes: vec![decl("font-family", "Arial")],
                }),
                Node::AtRule(AtRule {
                    name: "media".to_string(),
                    prelude: "print".to_string(),
                    nodes: Some(vec![
                        decl("margin", "0"),
                        Node::AtRule(AtRule {
                            name: "font-face".to_string(),
                            prelude: String::new(),
                            nodes: Some(vec![decl("src", "url(a)"), decl("SRC", "url(b)")]),
                            source: "@font-face{src:url(a);SRC:url(b)}".to_string(),
                        }),
                    ]),
                    source: String::new(),
                }),
            ],
        }
    }

    #[test]
    fn fold_declarations_reports_parents_in_order() {
        let tree = sample();
        let seen = tree.fold_declarations(Vec::new(), |mut acc, parent, decl| {
            let kind = match parent {
                Parent::Root => "root",
                Parent::Rule(_) => "rule",
                Parent::AtRule(_) => "at-rule",
            };
            acc.push(format!("{kind}:{}", decl.property));
            acc
        });
        assert_eq!(
            seen,
            vec![
                "root:color",
                "rule:font-family",
                "at-rule:margin",
                "at-rule:src",
                "at-rule:SRC"
            ]
        );
    }

    #[test]
    fn fold_at_rules_visits_nested_rules() {
        let tree = sample();
        let names = tree.fold_at_rules(Vec::new(), |mut acc, at_rule| {
            acc.push(at_rule.name.clone());
            acc
        });
        assert_eq!(names, vec!["media", "font-face"]);
    }

    #[test]
    fn last_value_is_case_insensitive_and_last_wins() {
        let tree = sample();
        let font_face = tree.fold_at_rules(None, |found, at_rule| {
            found.or((at_rule.name == "font-face").then_some(at_rule))
        });
        assert_eq!(font_face.unwrap().last_value("src"), Some("url(b)"));
        assert_eq!(font_face.unwrap().last_value("font-family"), None);
    }

    #[test]
    fn name_matcher_is_exact_and_case_insensitive() {
        const FONT: NameMatcher = NameMatcher::new(&["font", "font-family"]);
        assert!(FONT.matches("font"));
        assert!(FONT.matches("Font-Family"));
        assert!(!FONT.matches("font-size"));
        assert!(!FONT.matches("fon"));
    }

    #[test]
    fn selector_rule_parent() {
        let rule = Rule {
            selector: "a".to_string(),
            nodes: Vec::new(),
        };
        let empty = Rule {
            selector: String::new(),
            nodes: Vec::new(),
        };
        assert!(Parent::Rule(&rule).is_selector_rule());
        assert!(!Parent::Rule(&empty).is_selector_rule());
        assert!(!Parent::Root.is_selector_rule());
    }
}
