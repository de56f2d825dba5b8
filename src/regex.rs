//! Types and API for compiling patterns with the restricted engine.
//!
//! This module defines the [`Config`] of the engine, the [`Builder`] used to
//! compile a pattern with it, and the compiled [`Program`]. Compilation runs
//! in three stages: parsing (plus the [`crate::dialect`] check), translation
//! to HIR, and lowering to a byte-oriented Thompson program under a memory
//! budget.

use regex_syntax::ast::parse::ParserBuilder;
use regex_syntax::hir::translate::TranslatorBuilder;
use thiserror::Error;

use crate::dialect::{self, DialectError};
use crate::thompson::bytecode::{Bytecode, CompileError, Compiler, Instruction};
use crate::util::{latin1_decode, original_offset};

/// Memory limit of the rule-matching engine, in bytes.
pub const DEFAULT_MAX_MEM: usize = 2 << 10;

/// Default bound on the nesting depth of a pattern.
pub const DEFAULT_NEST_LIMIT: u32 = 250;

/// Largest nesting depth ever allowed, whatever the config says. Lowering a
/// pattern to bytecode recurses once per level of nesting.
pub const MAX_NEST_LIMIT: u32 = 1000;

/// Why a pattern failed to compile.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The pattern isn't a valid regular expression.
    #[error(transparent)]
    Parse(#[from] regex_syntax::Error),
    /// The pattern is valid, but uses syntax outside the dialect.
    #[error(transparent)]
    Dialect(#[from] DialectError),
    /// The pattern can't be compiled to a single-byte program within the
    /// memory limit.
    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl Error {
    /// Whether compilation failed only because the program would exceed the
    /// memory limit. Every other failure is a syntax problem.
    pub fn is_size_limit_exceeded(&self) -> bool {
        matches!(self, Error::Compile(CompileError::TooLarge { .. }))
    }
}

/// Options of the engine. The encoding isn't configurable: patterns are
/// always compiled as Latin-1, one byte per character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub case_sensitive: bool,
    /// Compile groups as non-capturing ones, which makes programs smaller.
    pub never_capture: bool,
    /// Report compilation failures through `tracing`.
    pub log_errors: bool,
    /// Memory limit in bytes. Two thirds of it go to the compiled program.
    pub max_mem: usize,
    /// Capped at [`MAX_NEST_LIMIT`].
    pub nest_limit: u32,
}

impl Config {
    /// Nesting depth enforced by the parser.
    pub fn effective_nest_limit(&self) -> u32 {
        self.nest_limit.min(MAX_NEST_LIMIT)
    }

    /// Bytes the compiled program may use.
    pub fn program_budget(&self) -> usize {
        self.max_mem / 3 * 2 + self.max_mem % 3 * 2 / 3
    }
}

impl Default for Config {
    /// The configuration of the rule-matching engine.
    fn default() -> Self {
        Self {
            case_sensitive: true,
            never_capture: true,
            log_errors: false,
            max_mem: DEFAULT_MAX_MEM,
            nest_limit: DEFAULT_NEST_LIMIT,
        }
    }
}

/// A pattern compiled by the restricted engine.
#[derive(Debug, Clone)]
pub struct Program {
    bytecode: Bytecode,
    capture_count: usize,
}

impl Program {
    /// Number of explicit capturing groups kept by the compilation. Always 0
    /// when compiled with [`Config::never_capture`].
    pub fn capture_count(&self) -> usize {
        self.capture_count
    }

    /// Bytes charged for the program against the memory limit.
    pub fn memory_usage(&self) -> usize {
        self.bytecode.memory_usage
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.bytecode.instructions
    }

    pub fn len(&self) -> usize {
        self.bytecode.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytecode.instructions.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Builder<'s> {
    pattern: &'s str,
    config: Config,
}

impl<'s> Builder<'s> {
    pub fn new(pattern: &'s str) -> Self {
        Self {
            pattern,
            config: Config::default(),
        }
    }

    pub fn with_config(pattern: &'s str, config: Config) -> Self {
        Self { pattern, config }
    }

    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.config.case_sensitive = value;
        self
    }

    pub fn never_capture(mut self, value: bool) -> Self {
        self.config.never_capture = value;
        self
    }

    pub fn log_errors(mut self, value: bool) -> Self {
        self.config.log_errors = value;
        self
    }

    pub fn max_mem(mut self, value: usize) -> Self {
        self.config.max_mem = value;
        self
    }

    pub fn nest_limit(mut self, value: u32) -> Self {
        self.config.nest_limit = value;
        self
    }

    pub fn compile(self) -> Result<Program, Error> {
        let result = self.compile_internal();
        if let Err(err) = &result {
            if self.config.log_errors {
                tracing::error!(pattern = self.pattern, error = %err, "failed to compile pattern");
            }
        }
        result
    }

    fn compile_internal(&self) -> Result<Program, Error> {
        let pattern = latin1_decode(self.pattern);
        let ast = ParserBuilder::new()
            .nest_limit(self.config.effective_nest_limit())
            .build()
            .parse(&pattern)
            .map_err(regex_syntax::Error::from)?;
        dialect::check(&ast).map_err(|err| {
            let offset = original_offset(&pattern, err.offset());
            err.with_offset(offset)
        })?;
        let hir = TranslatorBuilder::new()
            .case_insensitive(!self.config.case_sensitive)
            .build()
            .translate(&pattern, &ast)
            .map_err(regex_syntax::Error::from)?;
        let capture_count = if self.config.never_capture {
            0
        } else {
            hir.properties().explicit_captures_len()
        };
        let bytecode = Compiler::compile(&hir, &self.config)?;
        Ok(Program {
            bytecode,
            capture_count,
        })
    }
}
