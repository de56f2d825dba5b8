//! Syntax accepted by the parser but not by the rule-matching dialect.
//!
//! `regex-syntax` understands a few extensions that the dialect doesn't:
//! the `u`, `x` and `R` flags, and the special word boundaries (`\<`, `\>`,
//! `\b{start}`, ...). Rather than letting them through and changing what the
//! pattern means, [`check`] rejects them as syntax errors.

use regex_syntax::ast::{self, Assertion, AssertionKind, Ast, Flag, Flags, FlagsItemKind, GroupKind};
use thiserror::Error;

/// A construct outside the dialect, with the byte offset where it starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{construct} is not supported (at offset {offset})")]
pub struct DialectError {
    construct: &'static str,
    offset: usize,
}

impl DialectError {
    /// Description of the offending construct.
    pub fn construct(&self) -> &'static str {
        self.construct
    }

    /// Byte offset of the construct in the pattern that was checked.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Walks the whole AST and fails on the first construct outside the dialect.
pub fn check(ast: &Ast) -> Result<(), DialectError> {
    ast::visit(ast, DialectChecker)
}

struct DialectChecker;

impl DialectChecker {
    fn check_flags(flags: &Flags) -> Result<(), DialectError> {
        for item in &flags.items {
            let construct = match item.kind {
                FlagsItemKind::Negation => continue,
                FlagsItemKind::Flag(
                    Flag::CaseInsensitive
                    | Flag::MultiLine
                    | Flag::DotMatchesNewLine
                    | Flag::SwapGreed,
                ) => continue,
                FlagsItemKind::Flag(Flag::Unicode) => "flag 'u'",
                FlagsItemKind::Flag(Flag::IgnoreWhitespace) => "flag 'x'",
                FlagsItemKind::Flag(Flag::CRLF) => "flag 'R'",
            };
            return Err(DialectError {
                construct,
                offset: item.span.start.offset,
            });
        }
        Ok(())
    }

    fn check_assertion(assertion: &Assertion) -> Result<(), DialectError> {
        let construct = match assertion.kind {
            AssertionKind::StartLine
            | AssertionKind::EndLine
            | AssertionKind::StartText
            | AssertionKind::EndText
            | AssertionKind::WordBoundary
            | AssertionKind::NotWordBoundary => return Ok(()),
            AssertionKind::WordBoundaryStartAngle => r"word boundary '\<'",
            AssertionKind::WordBoundaryEndAngle => r"word boundary '\>'",
            AssertionKind::WordBoundaryStart
            | AssertionKind::WordBoundaryEnd
            | AssertionKind::WordBoundaryStartHalf
            | AssertionKind::WordBoundaryEndHalf => r"word boundary '\b{...}'",
        };
        Err(DialectError {
            construct,
            offset: assertion.span.start.offset,
        })
    }
}

impl ast::Visitor for DialectChecker {
    type Output = ();
    type Err = DialectError;

    fn finish(self) -> Result<(), DialectError> {
        Ok(())
    }

    fn visit_pre(&mut self, ast: &Ast) -> Result<(), DialectError> {
        match ast {
            Ast::Flags(set) => Self::check_flags(&set.flags),
            Ast::Group(group) => match &group.kind {
                GroupKind::NonCapturing(flags) => Self::check_flags(flags),
                GroupKind::CaptureIndex(_) | GroupKind::CaptureName { .. } => Ok(()),
            },
            Ast::Assertion(assertion) => Self::check_assertion(assertion),
            _ => Ok(()),
        }
    }
}
