//! Stylesheet parsing into the mutable rule tree, built on `cssparser`.

use crate::types::{AtRule, AtRuleBody, CssNode, Declaration, RuleItem, StyleRule, Stylesheet, is_conditional_group};
use cssparser::AtRuleParser as CssAtRuleParser;
use cssparser::BasicParseErrorKind;
use cssparser::CowRcStr;
use cssparser::DeclarationParser as CssDeclarationParser;
use cssparser::Delimiter;
use cssparser::ParseError;
use cssparser::Parser;
use cssparser::ParserInput;
use cssparser::ParserState;
use cssparser::QualifiedRuleParser as CssQualifiedRuleParser;
use cssparser::RuleBodyItemParser as CssRuleBodyItemParser;
use cssparser::RuleBodyParser as CssRuleBodyParser;
use cssparser::StyleSheetParser;
use cssparser::Token;

/// Result of parsing a stylesheet: the tree plus descriptions of what the parser could not read.
#[derive(Clone, Debug, Default)]
pub struct ParsedStylesheet {
    /// The rule tree.
    pub sheet: Stylesheet,
    /// One message per invalid rule skipped, or unparsable rule body entry kept as written.
    pub dropped: Vec<String>,
}

/// Collapse whitespace runs to a single space outside of quoted strings and trim the ends.
///
/// Escaped characters, escaped whitespace included, are copied unchanged.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut pending_space = false;
    for ch in text.trim_start().chars() {
        if let Some(open) = quote {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == open {
                quote = None;
            }
            continue;
        }
        if escaped {
            escaped = false;
            out.push(ch);
            continue;
        }
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        if ch == '\\' {
            escaped = true;
        } else if ch == '"' || ch == '\'' {
            quote = Some(ch);
        }
        out.push(ch);
    }
    out
}

/// Parse `!important` at the end of a value, returning (`value_without_important`, `important_flag`).
fn split_important_tail(value: &str) -> (String, bool) {
    let trimmed = value.trim();
    if let Some(pos) = trimmed.rfind("!important")
        && trimmed.get(pos..).is_some_and(|tail| tail.trim_end() == "!important")
        && let Some(prefix) = trimmed.get(..pos)
    {
        return (collapse_whitespace(prefix), true);
    }
    (collapse_whitespace(trimmed), false)
}

/// Consume the rest of `input` and return its source text.
fn consume_raw<'input>(input: &mut Parser<'input, '_>) -> &'input str {
    let start = input.position();
    while input.next_including_whitespace_and_comments().is_ok() {}
    input.slice_from(start)
}

/// `@name params`, or just `@name` without params.
fn at_rule_head(name: &str, params: &str) -> String {
    if params.is_empty() {
        format!("@{name}")
    } else {
        format!("@{name} {params}")
    }
}

/// Parser for style rule bodies: declarations are parsed, nested rules kept as written.
struct BodyItemParser;

impl<'input> CssDeclarationParser<'input> for BodyItemParser {
    type Declaration = RuleItem;
    type Error = ();

    fn parse_value<'tok>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tok>,
        _decl_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'input, Self::Error>> {
        let raw = consume_raw(input);
        let (value, important) = split_important_tail(raw);
        let name = if name.starts_with("--") {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        };
        Ok(RuleItem::Declaration(Declaration {
            name,
            value,
            important,
        }))
    }
}

impl<'input> CssAtRuleParser<'input> for BodyItemParser {
    type Prelude = String;
    type AtRule = RuleItem;
    type Error = ();

    fn parse_prelude<'tok>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tok>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        let params = collapse_whitespace(consume_raw(input));
        Ok(at_rule_head(&name.to_ascii_lowercase(), &params))
    }

    fn parse_block<'tok>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, 'tok>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        let block = collapse_whitespace(consume_raw(input));
        Ok(RuleItem::Verbatim(format!("{prelude}{{{block}}}")))
    }

    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, Self::Error> {
        Ok(RuleItem::Verbatim(prelude))
    }
}

impl<'input> CssQualifiedRuleParser<'input> for BodyItemParser {
    type Prelude = String;
    type QualifiedRule = RuleItem;
    type Error = ();

    fn parse_prelude<'tok>(
        &mut self,
        input: &mut Parser<'input, 'tok>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Ok(collapse_whitespace(consume_raw(input)))
    }

    fn parse_block<'tok>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, 'tok>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        let block = collapse_whitespace(consume_raw(input));
        Ok(RuleItem::Verbatim(format!("{prelude}{{{block}}}")))
    }
}

impl CssRuleBodyItemParser<'_, RuleItem, ()> for BodyItemParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        true
    }
}

/// Prelude of an at-rule: lowercased name plus collapsed params.
struct AtPrelude {
    name: String,
    params: String,
}

/// Rule-list parser shared by the top level and conditional group blocks.
struct RuleListParser<'diag> {
    dropped: &'diag mut Vec<String>,
}

impl<'input> CssAtRuleParser<'input> for RuleListParser<'_> {
    type Prelude = AtPrelude;
    type AtRule = CssNode;
    type Error = ();

    fn parse_prelude<'tok>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tok>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        let params = collapse_whitespace(consume_raw(input));
        Ok(AtPrelude {
            name: name.to_ascii_lowercase(),
            params,
        })
    }

    fn parse_block<'tok>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, 'tok>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        let body = if is_conditional_group(&prelude.name) {
            AtRuleBody::Rules(parse_rule_list(input, self.dropped))
        } else {
            AtRuleBody::Raw(collapse_whitespace(consume_raw(input)))
        };
        Ok(CssNode::At(AtRule {
            name: prelude.name,
            params: prelude.params,
            body,
        }))
    }

    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, Self::Error> {
        Ok(CssNode::At(AtRule {
            name: prelude.name,
            params: prelude.params,
            body: AtRuleBody::Statement,
        }))
    }
}

impl<'input> CssQualifiedRuleParser<'input> for RuleListParser<'_> {
    type Prelude = String;
    type QualifiedRule = CssNode;
    type Error = ();

    fn parse_prelude<'tok>(
        &mut self,
        input: &mut Parser<'input, 'tok>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        let selector = collapse_whitespace(consume_raw(input));
        if selector.is_empty() {
            return Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid));
        }
        Ok(selector)
    }

    fn parse_block<'tok>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, 'tok>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        let items = parse_rule_items(input, &prelude, self.dropped);
        Ok(CssNode::Style(StyleRule {
            selector: prelude,
            items,
        }))
    }
}

/// Parse the entries of a style rule block.
///
/// Entries `cssparser` rejects stay in the rule as written and are reported in `dropped`.
fn parse_rule_items(block: &mut Parser, selector: &str, dropped: &mut Vec<String>) -> Vec<RuleItem> {
    let mut body = BodyItemParser;
    let mut items = Vec::new();
    for item in CssRuleBodyParser::new(block, &mut body) {
        match item {
            Ok(item) => items.push(item),
            Err((err, slice)) => {
                let collapsed = collapse_whitespace(slice);
                let text = collapsed.trim_end_matches(';').trim_end();
                if text.is_empty() {
                    continue;
                }
                let location = err.location;
                log::debug!(
                    "keeping unparsed CSS in `{selector}` at {}:{}: {text}",
                    location.line + 1,
                    location.column
                );
                dropped.push(format!(
                    "unparsed CSS in `{selector}` at {}:{} kept as written: {text}",
                    location.line + 1,
                    location.column
                ));
                items.push(RuleItem::Verbatim(text.to_owned()));
            }
        }
    }
    items
}

/// Parse a list of rules, recording a message for each rule the parser had to skip.
fn parse_rule_list<'input>(input: &mut Parser<'input, '_>, dropped: &mut Vec<String>) -> Vec<CssNode> {
    let mut rules = RuleListParser { dropped };
    let parsed: Vec<_> = StyleSheetParser::new(input, &mut rules).collect();
    let mut nodes = Vec::with_capacity(parsed.len());
    for item in parsed {
        match item {
            Ok(node) => nodes.push(node),
            Err((err, slice)) => {
                let location = err.location;
                log::debug!(
                    "dropping invalid CSS at {}:{}: {}",
                    location.line + 1,
                    location.column,
                    slice.trim()
                );
                rules.dropped.push(format!(
                    "invalid CSS at {}:{}: {}",
                    location.line + 1,
                    location.column,
                    collapse_whitespace(slice)
                ));
            }
        }
    }
    nodes
}

/// A leading `@charset` statement, which `StyleSheetParser` skips without reporting.
fn leading_charset<'input>(input: &mut Parser<'input, '_>) -> Option<CssNode> {
    input
        .try_parse(|statement| -> Result<CssNode, ParseError<'input, ()>> {
            let is_charset =
                matches!(statement.next()?, Token::AtKeyword(name) if name.eq_ignore_ascii_case("charset"));
            if !is_charset {
                return Err(statement.new_custom_error(()));
            }
            let params = statement.parse_until_after(Delimiter::Semicolon, |prelude| {
                Ok::<_, ParseError<'input, ()>>(collapse_whitespace(consume_raw(prelude)))
            })?;
            Ok(CssNode::At(AtRule {
                name: "charset".to_owned(),
                params,
                body: AtRuleBody::Statement,
            }))
        })
        .ok()
}

/// Parse a full stylesheet, keeping track of rules the parser skipped.
pub fn parse_stylesheet_with_diagnostics(css: &str) -> ParsedStylesheet {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut dropped = Vec::new();
    let mut nodes: Vec<CssNode> = leading_charset(&mut parser).into_iter().collect();
    nodes.extend(parse_rule_list(&mut parser, &mut dropped));
    ParsedStylesheet {
        sheet: Stylesheet { nodes },
        dropped,
    }
}

/// Parse a full stylesheet into a [`Stylesheet`] using cssparser.
pub fn parse_stylesheet(css: &str) -> Stylesheet {
    parse_stylesheet_with_diagnostics(css).sheet
}
