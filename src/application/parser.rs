//! Parser for brace-nested set expressions.
//!
//! ```text
//! Set   := '{' Body? '}'
//! Body  := Token (Delim Token)*
//! Token := Set | Literal | ''
//! ```
//!
//! An expression is validated in one pass by [`check_braces`], then built in a
//! second pass that keeps one frame per open group on an explicit stack.

use std::str::FromStr;

use tracing::{debug, instrument, trace};

use crate::application::configuration::Configuration;
use crate::application::converter::{ElementConverter, FromStrConverter};
use crate::application::error::{ApplicationError, ApplicationResult, BoxError, BraceBoundary};
use crate::domain::SetTree;

const OPEN: char = '{';
const CLOSE: char = '}';

/// Deepest brace nesting accepted in one expression.
///
/// Comparing, rendering and dropping a tree recurse once per level.
pub const MAX_NESTING_DEPTH: usize = 256;

pub struct SetParser<T> {
    config: Configuration,
    converter: Box<dyn ElementConverter<T>>,
}

/// A group that is open while building.
struct Frame<T> {
    tree: SetTree<T>,
    nulls: usize,
    /// A delimiter was seen, so even blank tokens count
    split: bool,
    /// The current token is a nested group that was already added
    nested: bool,
    token_start: usize,
}

impl<T> Frame<T> {
    fn new(token_start: usize) -> Self {
        Self {
            tree: SetTree::new(),
            nulls: 0,
            split: false,
            nested: false,
            token_start,
        }
    }
}

impl<T> SetParser<T>
where
    T: Ord + FromStr + 'static,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    pub fn new(config: Configuration) -> Self {
        Self::with_converter(config, FromStrConverter::<T>::new())
    }
}

impl<T: Ord> SetParser<T> {
    pub fn with_converter(
        config: Configuration,
        converter: impl ElementConverter<T> + 'static,
    ) -> Self {
        Self {
            config,
            converter: Box::new(converter),
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Parses one set expression.
    #[instrument(level = "debug", skip(self))]
    pub fn parse(&self, text: &str) -> ApplicationResult<SetTree<T>> {
        let trimmed = text.trim();
        let offset = text.len() - text.trim_start().len();
        let delimiter = self.config.field_terminator();

        if trimmed.is_empty() && !self.config.auto_wrap_braces() {
            return Err(ApplicationError::Argument {
                name: "text",
                reason: "expression is empty and auto-wrap is disabled".to_string(),
            });
        }

        let tree = if self.config.auto_wrap_braces() && !trimmed.starts_with(OPEN) {
            let wrapped = format!("{}{}{}", OPEN, trimmed, CLOSE);
            trace!(wrapped = %wrapped, "auto-wrapped expression");
            check_braces(&wrapped, delimiter, offset, OPEN.len_utf8())?;
            self.build_tree(&wrapped)?
        } else {
            check_braces(trimmed, delimiter, offset, 0)?;
            self.build_tree(trimmed)?
        };

        debug!(
            elements = tree.element_count(),
            subsets = tree.subset_count(),
            nulls = tree.info().null_element_count,
            "parsed set expression"
        );
        Ok(tree)
    }

    /// Parses every non-blank row separated by the row terminator.
    #[instrument(level = "debug", skip(self))]
    pub fn parse_rows(&self, text: &str) -> ApplicationResult<Vec<SetTree<T>>> {
        split_top_level(text, self.config.row_terminator())
            .into_iter()
            .filter(|row| !row.trim().is_empty())
            .map(|row| self.parse(row))
            .collect()
    }

    /// Parses `text` and hands the tree to `factory`.
    ///
    /// A factory failure is reported as [`ApplicationError::OperationFailed`]
    /// with the original error as its source.
    pub fn parse_into<R, E, F>(&self, text: &str, factory: F) -> ApplicationResult<R>
    where
        F: FnOnce(SetTree<T>) -> Result<R, E>,
        E: Into<BoxError>,
    {
        let tree = self.parse(text)?;
        factory(tree).map_err(|e| ApplicationError::OperationFailed {
            context: format!("build from '{}'", text.trim()),
            source: e.into(),
        })
    }

    /// Builds the tree of a group that passed [`check_braces`].
    fn build_tree(&self, group: &str) -> ApplicationResult<SetTree<T>> {
        let delimiter = self.config.field_terminator();
        let mut stack: Vec<Frame<T>> = Vec::new();
        let mut i = 0;

        while i < group.len() {
            let rest = &group[i..];
            if !delimiter.is_empty() && rest.starts_with(delimiter) {
                if let Some(frame) = stack.last_mut() {
                    let token = &group[frame.token_start..i];
                    self.finish_token(frame, token)?;
                    frame.split = true;
                    frame.nested = false;
                    frame.token_start = i + delimiter.len();
                }
                i += delimiter.len();
                continue;
            }
            let Some(c) = rest.chars().next() else {
                break;
            };
            match c {
                OPEN => stack.push(Frame::new(i + OPEN.len_utf8())),
                CLOSE => {
                    let Some(mut frame) = stack.pop() else {
                        break;
                    };
                    let token = &group[frame.token_start..i];
                    // "{}" and "{ }" have no tokens at all
                    if frame.split || frame.nested || !token.trim().is_empty() {
                        self.finish_token(&mut frame, token)?;
                    }
                    frame.tree.record_null_elements(frame.nulls);
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.nulls += frame.nulls;
                            parent.nested = true;
                            let added = parent.tree.add_subtree(frame.tree);
                            trace!(added, depth = stack.len(), "subset token");
                        }
                        None => return Ok(frame.tree),
                    }
                }
                _ => {}
            }
            i += c.len_utf8();
        }

        Err(ApplicationError::MissingBrace {
            boundary: BraceBoundary::Closing,
            fragment: group.to_string(),
        })
    }

    /// Adds the literal or empty token ending at a delimiter or `}`.
    fn finish_token(&self, frame: &mut Frame<T>, token: &str) -> ApplicationResult<()> {
        if frame.nested {
            return Ok(());
        }
        let token = token.trim();

        if token.is_empty() {
            frame.nulls += 1;
            if !self.config.ignore_empty_fields() {
                frame.tree.add_subtree(SetTree::new());
            }
            trace!("empty token");
            return Ok(());
        }

        let element = self
            .converter
            .to_element(token, &self.config)
            .map_err(|source| ApplicationError::Conversion {
                token: token.to_string(),
                source,
            })?;
        let added = frame.tree.add_element(element);
        trace!(token, added, "element token");
        Ok(())
    }
}

impl<T: Ord + std::fmt::Display> SetParser<T> {
    /// Canonical form using the configured field terminator.
    pub fn render(&self, tree: &SetTree<T>) -> String {
        tree.render(self.config.field_terminator())
    }
}

/// Checks in one pass that `group` is a single well-formed `{...}` group.
///
/// Inside the group every `{` must open a token and every nested `}` must be
/// followed by a delimiter or another `}`, so tokens are either one group or
/// a literal without braces. Nesting is limited to [`MAX_NESTING_DEPTH`].
///
/// `offset` is the position of `group` in the input and `shift` the length
/// of a synthetic opening brace, so reported positions refer to the input.
fn check_braces(
    group: &str,
    delimiter: &str,
    offset: usize,
    shift: usize,
) -> ApplicationResult<()> {
    let position = |i: usize| (offset + i).saturating_sub(shift);
    let mismatch = |i: usize, reason: String| ApplicationError::BraceMismatch {
        position: position(i),
        reason,
        fragment: group.to_string(),
    };

    if !group.starts_with(OPEN) {
        return Err(ApplicationError::MissingBrace {
            boundary: BraceBoundary::Opening,
            fragment: group.to_string(),
        });
    }

    let mut depth: usize = 0;
    let mut first_close = None;
    // only whitespace since the last '{' or delimiter
    let mut token_start = true;
    // only whitespace since the last nested '}'
    let mut after_close = false;
    let mut i = 0;
    while i < group.len() {
        let rest = &group[i..];
        let inside = depth > 0 && first_close.is_none();
        if inside && !delimiter.is_empty() && rest.starts_with(delimiter) {
            token_start = true;
            after_close = false;
            i += delimiter.len();
            continue;
        }
        let Some(c) = rest.chars().next() else {
            break;
        };
        match c {
            OPEN => {
                if inside && !token_start {
                    return Err(mismatch(i, "'{' inside element literal".to_string()));
                }
                depth += 1;
                if depth > MAX_NESTING_DEPTH {
                    return Err(mismatch(
                        i,
                        format!("nesting deeper than {} levels", MAX_NESTING_DEPTH),
                    ));
                }
                token_start = true;
                after_close = false;
            }
            CLOSE => {
                if depth == 0 {
                    return Err(mismatch(i, "unexpected '}'".to_string()));
                }
                depth -= 1;
                if depth == 0 && first_close.is_none() {
                    first_close = Some(i);
                }
                token_start = false;
                after_close = true;
            }
            c if c.is_whitespace() => {}
            _ => {
                if inside && after_close {
                    return Err(mismatch(i, "unexpected text after '}'".to_string()));
                }
                token_start = false;
            }
        }
        i += c.len_utf8();
    }

    if depth > 0 {
        return Err(ApplicationError::BraceMismatch {
            position: (offset + group.len()).saturating_sub(2 * shift),
            reason: format!("{} unclosed '{{'", depth),
            fragment: group.to_string(),
        });
    }

    // balanced, but the outer group must end at the last character
    match first_close {
        Some(i) if i + CLOSE.len_utf8() == group.len() => Ok(()),
        _ => Err(ApplicationError::MissingBrace {
            boundary: BraceBoundary::Closing,
            fragment: group.to_string(),
        }),
    }
}

/// Splits `text` on `delimiter` outside of any brace group.
fn split_top_level<'a>(text: &'a str, delimiter: &str) -> Vec<&'a str> {
    if delimiter.is_empty() {
        return vec![text];
    }
    let mut pieces = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        if depth == 0 && rest.starts_with(delimiter) {
            pieces.push(&text[start..i]);
            i += delimiter.len();
            start = i;
            continue;
        }
        let Some(c) = rest.chars().next() else {
            break;
        };
        match c {
            OPEN => depth += 1,
            CLOSE => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += c.len_utf8();
    }
    pieces.push(&text[start..]);
    pieces
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::application::converter::FnConverter;

    fn parser(auto_wrap: bool, ignore_empty: bool) -> SetParser<i64> {
        SetParser::new(Configuration::new(",", auto_wrap, ignore_empty).unwrap())
    }

    fn nested(depth: usize) -> String {
        format!("{}{}", "{".repeat(depth), "}".repeat(depth))
    }

    fn mismatch_position(err: ApplicationError) -> usize {
        match err {
            ApplicationError::BraceMismatch { position, .. } => position,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn given_nested_rows_when_splitting_then_ignores_inner_delimiters() {
        assert_eq!(
            split_top_level("1,{2,3},,4", ","),
            vec!["1", "{2,3}", "", "4"]
        );
    }

    #[test]
    fn given_multichar_delimiter_when_splitting_then_splits_on_whole_delimiter() {
        assert_eq!(
            split_top_level("a::b:c::{d::e}", "::"),
            vec!["a", "b:c", "{d::e}"]
        );
    }

    #[test]
    fn given_balanced_group_when_checking_then_ok() {
        assert!(check_braces("{}", ",", 0, 0).is_ok());
        assert!(check_braces("{1,{2,{3}}}", ",", 0, 0).is_ok());
        assert!(check_braces("{ {1} , { } ,2 }", ",", 0, 0).is_ok());
    }

    #[test]
    fn given_trailing_content_when_checking_then_reports_missing_closing_brace() {
        let err = check_braces("{1},{2}", ",", 0, 0).unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::MissingBrace {
                boundary: BraceBoundary::Closing,
                ..
            }
        ));
    }

    #[test]
    fn given_extra_closing_brace_when_checking_then_reports_position() {
        let err = check_braces("{1}}", ",", 5, 0).unwrap_err();
        assert_eq!(mismatch_position(err), 8);
    }

    #[rstest]
    #[case::brace_after_literal("{1,a{b}}", 4)]
    #[case::groups_without_delimiter("{{1}{2}}", 4)]
    #[case::text_after_group("{1,{2} 3}", 7)]
    fn given_brace_inside_token_when_checking_then_reports_position(
        #[case] group: &str,
        #[case] position: usize,
    ) {
        let err = check_braces(group, ",", 0, 0).unwrap_err();
        assert_eq!(mismatch_position(err), position);
    }

    #[test]
    fn given_nesting_at_limit_when_parsing_then_accepted() {
        let parser = parser(false, false);
        let tree = parser.parse(&nested(MAX_NESTING_DEPTH)).unwrap();

        assert_eq!(parser.render(&tree), nested(MAX_NESTING_DEPTH));
        assert_eq!(tree.clone(), tree);
    }

    #[test]
    fn given_nesting_beyond_limit_when_parsing_then_rejected_without_overflow() {
        let err = parser(false, false)
            .parse(&nested(20 * MAX_NESTING_DEPTH))
            .unwrap_err();

        match err {
            ApplicationError::BraceMismatch {
                position, reason, ..
            } => {
                assert_eq!(position, MAX_NESTING_DEPTH);
                assert!(reason.contains("nesting"), "reason was: {reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    #[case::wrapped("1}", true, 2)]
    #[case::wrapped_with_padding("  1}", true, 4)]
    #[case::wrapped_text_after_group("1,{2}x", true, 5)]
    #[case::plain_text_after_group("  {1,{2}x}", false, 8)]
    fn given_brace_error_when_parsing_then_position_refers_to_input(
        #[case] text: &str,
        #[case] auto_wrap: bool,
        #[case] position: usize,
    ) {
        let err = parser(auto_wrap, false).parse(text).unwrap_err();
        assert_eq!(mismatch_position(err), position);
    }

    #[test]
    fn given_unclosed_wrapped_input_when_parsing_then_points_at_end_of_input() {
        let err = parser(true, false).parse("1,{2").unwrap_err();
        assert_eq!(mismatch_position(err), 4);
    }

    #[test]
    fn given_whitespace_around_tokens_when_parsing_then_trims() {
        let tree = parser(false, false).parse("  { 3 , 1 ,{ 2 } } ").unwrap();
        assert_eq!(tree.to_string(), "{1,3,{2}}");
    }

    #[test]
    fn given_nested_empty_tokens_when_parsing_then_root_counts_them() {
        let tree = parser(false, false).parse("{1,{2,,},{}}").unwrap();
        let info = tree.info();
        assert_eq!(info.null_element_count, 2);
        assert!(info.has_null_elements);
        // {} from the literal group and the nested one with an empty marker
        assert_eq!(tree.to_string(), "{1,{},{2,{}}}");
    }

    #[test]
    fn given_brace_inside_literal_when_parsing_then_fails() {
        let err = parser(false, false).parse("{1,a{b}}").unwrap_err();
        assert!(err.is_brace_error());
    }

    #[test]
    fn given_unconvertible_token_when_parsing_then_reports_conversion_error() {
        let err = parser(true, false).parse("1,two,3").unwrap_err();
        match err {
            ApplicationError::Conversion { token, .. } => assert_eq!(token, "two"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn given_custom_converter_when_parsing_then_uses_it() {
        let upper = FnConverter(|token: &str, _: &Configuration| -> Result<String, BoxError> {
            Ok(token.to_uppercase())
        });
        let parser = SetParser::with_converter(Configuration::default(), upper);
        let tree = parser.parse("{b,a,B}").unwrap();
        assert_eq!(tree.to_string(), "{A,B}");
    }

    #[test]
    fn given_empty_text_when_parsing_then_depends_on_auto_wrap() {
        assert!(matches!(
            parser(false, false).parse("   "),
            Err(ApplicationError::Argument { name: "text", .. })
        ));
        assert!(parser(true, false).parse("").unwrap().is_empty());
    }
}
