//! Stylesheet parsing into a [`StyleTree`].
//!
//! Built on the `cssparser` tokenizer. The parser only recovers the block
//! structure of the stylesheet: rules, at-rules and declarations, with every
//! value kept as the exact source slice. It does not interpret properties,
//! so unknown or vendor-specific syntax passes through untouched.
//!
//! Any block may contain any kind of node. Declarations at the top level or
//! directly inside `@media` are kept in the tree so callers can decide what
//! to do with them.
//!
//! Input that has no sensible block structure is rejected with a
//! [`ParseError`] pointing at the offending location:
//! - a stray closing `}`, `)` or `]`
//! - text ending in `;` or end of block that is neither a rule nor
//!   `property: value`
//! - blocks nested more than [`MAX_NESTING_DEPTH`] levels deep
//!
//! Comments are dropped from declaration values, so `font-family: A /* x */`
//! has the value `A`.

use crate::tree::{AtRule, Declaration, Node, Rule, StyleTree};
use cssparser::{
    BasicParseErrorKind, ParseErrorKind, Parser, ParserInput, SourceLocation, SourcePosition,
    Token,
};
use thiserror::Error;

/// Deepest `{ ... }` nesting accepted before parsing gives up.
pub const MAX_NESTING_DEPTH: usize = 128;

/// A stylesheet that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SyntaxError {
    UnknownWord,
    InvalidProperty,
    NestingTooDeep,
}

type CssResult<'i, T> = Result<T, cssparser::ParseError<'i, SyntaxError>>;

/// Parse stylesheet text into a tree.
pub fn parse_stylesheet(css: &str) -> Result<StyleTree, ParseError> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let nodes = parse_block_contents(&mut parser, 0).map_err(ParseError::from_css)?;
    Ok(StyleTree { nodes })
}

impl ParseError {
    fn from_css(err: cssparser::ParseError<'_, SyntaxError>) -> Self {
        let message = match err.kind {
            ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
                format!("unexpected {}", describe_token(&token))
            }
            ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => {
                "unexpected end of input".to_string()
            }
            ParseErrorKind::Basic(other) => format!("{other:?}"),
            ParseErrorKind::Custom(SyntaxError::UnknownWord) => "unknown word".to_string(),
            ParseErrorKind::Custom(SyntaxError::InvalidProperty) => {
                "invalid property name".to_string()
            }
            ParseErrorKind::Custom(SyntaxError::NestingTooDeep) => {
                format!("blocks nested deeper than {MAX_NESTING_DEPTH} levels")
            }
        };
        Self {
            line: err.location.line + 1,
            column: err.location.column,
            message,
        }
    }
}

fn describe_token(token: &Token<'_>) -> String {
    match token {
        Token::CloseCurlyBracket => "`}`".to_string(),
        Token::CloseParenthesis => "`)`".to_string(),
        Token::CloseSquareBracket => "`]`".to_string(),
        other => format!("{other:?}"),
    }
}

/// Parse the contents of the stylesheet (depth 0) or of one `{ ... }` block.
fn parse_block_contents<'i>(parser: &mut Parser<'i, '_>, depth: usize) -> CssResult<'i, Vec<Node>> {
    if depth > MAX_NESTING_DEPTH {
        return Err(parser.new_custom_error(SyntaxError::NestingTooDeep));
    }
    let mut nodes = Vec::new();
    loop {
        parser.skip_whitespace();
        let start = parser.position();
        let location = parser.current_source_location();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::WhiteSpace(_)
            | Token::Comment(_)
            | Token::Semicolon
            | Token::CDO
            | Token::CDC => {}
            Token::AtKeyword(name) => {
                nodes.push(Node::AtRule(parse_at_rule(parser, start, &name, depth)?));
            }
            Token::CloseCurlyBracket | Token::CloseParenthesis | Token::CloseSquareBracket => {
                return Err(location.new_unexpected_token_error(token));
            }
            first => nodes.push(parse_rule_or_declaration(
                parser, start, location, first, depth,
            )?),
        }
    }
    Ok(nodes)
}

fn parse_at_rule<'i>(
    parser: &mut Parser<'i, '_>,
    start: SourcePosition,
    name: &str,
    depth: usize,
) -> CssResult<'i, AtRule> {
    let prelude_start = parser.position();
    let (prelude_end, nodes) = loop {
        let before = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break (before, None),
        };
        match token {
            Token::Semicolon => break (before, None),
            Token::CurlyBracketBlock => {
                let nodes = parser.parse_nested_block(|p| parse_block_contents(p, depth + 1))?;
                break (before, Some(nodes));
            }
            Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock => {
                skip_block(parser)?;
            }
            Token::CloseCurlyBracket | Token::CloseParenthesis | Token::CloseSquareBracket => {
                return Err(parser.new_unexpected_token_error(token));
            }
            _ => {}
        }
    };

    Ok(AtRule {
        name: name.to_string(),
        prelude: parser.slice(prelude_start..prelude_end).trim().to_string(),
        nodes,
        source: parser.slice_from(start).trim().to_string(),
    })
}

/// Parse a node that starts with `first`: a rule if a `{` block follows
/// before any `;`, otherwise a declaration.
fn parse_rule_or_declaration<'i>(
    parser: &mut Parser<'i, '_>,
    start: SourcePosition,
    location: SourceLocation,
    first: Token<'i>,
    depth: usize,
) -> CssResult<'i, Node> {
    // (position of the first top-level colon, position right after it)
    let mut colon = None;
    // Comment spans after the colon, dropped from the value.
    let mut comments = Vec::new();
    match first {
        Token::CurlyBracketBlock => {
            let nodes = parser.parse_nested_block(|p| parse_block_contents(p, depth + 1))?;
            return Ok(Node::Rule(Rule {
                selector: String::new(),
                nodes,
            }));
        }
        Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock => {
            skip_block(parser)?;
        }
        Token::Colon => colon = Some((start, parser.position())),
        _ => {}
    }

    let end = loop {
        let before = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break before,
        };
        match token {
            Token::CurlyBracketBlock => {
                let selector = parser.slice(start..before).trim().to_string();
                let nodes = parser.parse_nested_block(|p| parse_block_contents(p, depth + 1))?;
                return Ok(Node::Rule(Rule { selector, nodes }));
            }
            Token::Semicolon => break before,
            Token::Colon if colon.is_none() => colon = Some((before, parser.position())),
            Token::Comment(_) if colon.is_some() => comments.push((before, parser.position())),
            Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock => {
                skip_block(parser)?;
            }
            Token::CloseCurlyBracket | Token::CloseParenthesis | Token::CloseSquareBracket => {
                return Err(parser.new_unexpected_token_error(token));
            }
            _ => {}
        }
    };

    let Some((colon_start, value_start)) = colon else {
        return Err(location.new_custom_error(SyntaxError::UnknownWord));
    };
    let property = parser.slice(start..colon_start).trim();
    if property.is_empty() || property.contains(char::is_whitespace) {
        return Err(location.new_custom_error(SyntaxError::InvalidProperty));
    }
    let mut raw = String::new();
    let mut from = value_start;
    for (comment_start, comment_end) in comments {
        raw.push_str(parser.slice(from..comment_start));
        from = comment_end;
    }
    raw.push_str(parser.slice(from..end));
    let (value, important) = split_important(raw.trim());

    Ok(Node::Declaration(Declaration {
        property: property.to_string(),
        value: value.to_string(),
        important,
    }))
}

/// Consume the rest of a block whose opening token was just returned.
fn skip_block<'i>(parser: &mut Parser<'i, '_>) -> CssResult<'i, ()> {
    parser.parse_nested_block(|p| {
        while p.next_including_whitespace_and_comments().is_ok() {}
        Ok(())
    })
}

fn split_important(value: &str) -> (&str, bool) {
    if let Some(pos) = value.rfind('!') {
        if value[pos + 1..].trim().eq_ignore_ascii_case("important") {
            return (value[..pos].trim_end(), true);
        }
    }
    (value, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decl(property: &str, value: &str) -> Node {
        Node::Declaration(Declaration {
            property: property.to_string(),
            value: value.to_string(),
            important: false,
        })
    }

    #[test]
    fn parses_font_face_and_rule() {
        let css = "@font-face{font-family:'Font A';src:url(/fonts/a.woff2) format('woff2');} body{font-family:'Font A';}";
        let tree = parse_stylesheet(css).unwrap();

        assert_eq!(
            tree.nodes,
            vec![
                Node::AtRule(AtRule {
                    name: "font-face".to_string(),
                    prelude: String::new(),
                    nodes: Some(vec![
                        decl("font-family", "'Font A'"),
                        decl("src", "url(/fonts/a.woff2) format('woff2')"),
                    ]),
                    source: "@font-face{font-family:'Font A';src:url(/fonts/a.woff2) format('woff2');}"
                        .to_string(),
                }),
                Node::Rule(Rule {
                    selector: "body".to_string(),
                    nodes: vec![decl("font-family", "'Font A'")],
                }),
            ]
        );
    }

    #[test]
    fn keeps_raw_values_with_functions_and_commas() {
        let css = r#"
            @font-face {
              src: url(data:application/font-woff;base64,abcd) format('woff2'), url("a.woff") format("woff");
            }
        "#;
        let tree = parse_stylesheet(css).unwrap();
        let Node::AtRule(rule) = &tree.nodes[0] else {
            panic!("expected at-rule, got {:?}", tree.nodes[0]);
        };
        assert_eq!(
            rule.last_value("src"),
            Some(
                "url(data:application/font-woff;base64,abcd) format('woff2'), url(\"a.woff\") format(\"woff\")"
            )
        );
    }

    #[test]
    fn last_declaration_without_semicolon() {
        let tree = parse_stylesheet("p { color: red; font: 12px Arial }").unwrap();
        assert_eq!(
            tree.nodes,
            vec![Node::Rule(Rule {
                selector: "p".to_string(),
                nodes: vec![decl("color", "red"), decl("font", "12px Arial")],
            })]
        );
    }

    #[test]
    fn declarations_outside_rules_are_kept() {
        let css = "@media { font-family: 'Font A'; } font-family: 'Font A';";
        let tree = parse_stylesheet(css).unwrap();
        assert_eq!(tree.nodes.len(), 2);
        let Node::AtRule(media) = &tree.nodes[0] else {
            panic!("expected @media");
        };
        assert_eq!(media.name, "media");
        assert_eq!(media.nodes, Some(vec![decl("font-family", "'Font A'")]));
        assert_eq!(tree.nodes[1], decl("font-family", "'Font A'"));
    }

    #[test]
    fn nested_rules_inside_media() {
        let css = "@media screen and (min-width: 40em) { .a:hover, .b { font: bold 1em 'X Y' } }";
        let tree = parse_stylesheet(css).unwrap();
        let Node::AtRule(media) = &tree.nodes[0] else {
            panic!("expected @media");
        };
        assert_eq!(media.prelude, "screen and (min-width: 40em)");
        assert_eq!(
            media.nodes,
            Some(vec![Node::Rule(Rule {
                selector: ".a:hover, .b".to_string(),
                nodes: vec![decl("font", "bold 1em 'X Y'")],
            })])
        );
    }

    #[test]
    fn statement_at_rules_have_no_children() {
        let tree = parse_stylesheet("@import url(other.css) screen; a{}").unwrap();
        let Node::AtRule(import) = &tree.nodes[0] else {
            panic!("expected @import");
        };
        assert_eq!(import.prelude, "url(other.css) screen");
        assert_eq!(import.nodes, None);
        assert_eq!(import.source, "@import url(other.css) screen;");
    }

    #[test]
    fn important_flag_is_split_off() {
        let tree = parse_stylesheet("a { font-family: Arial !important; }").unwrap();
        let Node::Rule(rule) = &tree.nodes[0] else {
            panic!("expected rule");
        };
        assert_eq!(
            rule.nodes,
            vec![Node::Declaration(Declaration {
                property: "font-family".to_string(),
                value: "Arial".to_string(),
                important: true,
            })]
        );
    }

    #[test]
    fn comments_are_dropped_from_values() {
        let tree = parse_stylesheet(
            "p { font: 12px 'X' /* c */, serif; src: /* modern */ url(a.woff2) format('woff2') }",
        )
        .unwrap();
        assert_eq!(
            tree.nodes,
            vec![Node::Rule(Rule {
                selector: "p".to_string(),
                nodes: vec![
                    decl("font", "12px 'X' , serif"),
                    decl("src", "url(a.woff2) format('woff2')"),
                ],
            })]
        );
    }

    #[test]
    fn comment_before_important() {
        let tree = parse_stylesheet("a { font-family: Arial /* x */ !important }").unwrap();
        let Node::Rule(rule) = &tree.nodes[0] else {
            panic!("expected rule");
        };
        assert_eq!(
            rule.nodes,
            vec![Node::Declaration(Declaration {
                property: "font-family".to_string(),
                value: "Arial".to_string(),
                important: true,
            })]
        );
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let depth = 5000;
        let css = format!("{}{}", "a{".repeat(depth), "}".repeat(depth));
        let err = parse_stylesheet(&css).unwrap_err();
        assert!(err.message.contains("nested deeper"), "{}", err.message);
    }

    #[test]
    fn nesting_up_to_the_limit_is_accepted() {
        let css = format!(
            "{}{}",
            "a{".repeat(MAX_NESTING_DEPTH),
            "}".repeat(MAX_NESTING_DEPTH)
        );
        assert!(parse_stylesheet(&css).is_ok());
    }

    #[test]
    fn comments_are_ignored() {
        let tree = parse_stylesheet("/* a */ p { /* b */ color: red; }").unwrap();
        assert_eq!(
            tree.nodes,
            vec![Node::Rule(Rule {
                selector: "p".to_string(),
                nodes: vec![decl("color", "red")],
            })]
        );
    }

    #[test]
    fn pseudo_selector_rule() {
        let tree = parse_stylesheet(":root { --main: 'Font A' }").unwrap();
        assert_eq!(
            tree.nodes,
            vec![Node::Rule(Rule {
                selector: ":root".to_string(),
                nodes: vec![decl("--main", "'Font A'")],
            })]
        );
    }

    #[test]
    fn empty_stylesheet() {
        assert_eq!(parse_stylesheet("  \n ").unwrap(), StyleTree::default());
    }

    #[test]
    fn stray_closing_brace_is_an_error() {
        let err = parse_stylesheet("a { color: red; }\n}").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 1);
        assert!(err.message.contains('}'), "{}", err.message);
    }

    #[test]
    fn bare_word_is_an_error() {
        let err = parse_stylesheet("a { color: red; }\nnonsense;").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.message, "unknown word");
    }

    #[test]
    fn invalid_property_is_an_error() {
        let err = parse_stylesheet("a { font family: Arial; }").unwrap_err();
        assert_eq!(err.message, "invalid property name");
    }
}
