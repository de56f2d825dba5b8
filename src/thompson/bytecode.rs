//! A Thompson NFA represented in a bytecode format.
//!
//! This module contains the definition of [`Instruction`], a
//! bytecode format that represents a Thompson's NFA over bytes, which is
//! one possible NFA representation of a regular expression whose
//! particularities is to be linearly proportional in size to the
//! pattern. Furthermore compiling a pattern to this representation
//! take linear time. The compiler is also provided by this module,
//! see [`Compiler`].
//!
//! Every instruction has a fixed cost in bytes, and the compiler refuses to
//! grow a program past its budget. Since the cost is charged before an
//! instruction is emitted, compilation of an oversized pattern stops as soon
//! as the budget is exhausted, however large the pattern would have been.
use regex_syntax::hir::{Capture, Hir, HirKind, Literal, Look, Repetition};
use thiserror::Error;

use crate::regex::Config;
use crate::util::{ByteRange, clip_class, latin1_byte};

/// Cost of any instruction, without its out-of-line data.
pub const INSTRUCTION_SIZE: usize = 16;
/// Additional cost of every range of a [`Instruction::ConsumeClass`].
pub const CLASS_RANGE_SIZE: usize = 2;
/// Additional cost of every target of a [`Instruction::ForkN`].
pub const FORK_TARGET_SIZE: usize = 4;

/// Bytecode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Consume(u8),
    ConsumeAny,
    /// Consume one byte in any of the (inclusive) ranges. An empty class
    /// never matches.
    ConsumeClass(Box<[ByteRange]>),
    Fork2(usize, usize),
    ForkN(Box<[usize]>),
    Jmp(usize),
    WriteReg(u32),
    Assertion(Look),
    Accept,
}

impl Instruction {
    /// Number of bytes this instruction is charged against the program budget.
    pub fn memory_usage(&self) -> usize {
        match self {
            ConsumeClass(ranges) => INSTRUCTION_SIZE + CLASS_RANGE_SIZE * ranges.len(),
            ForkN(targets) => INSTRUCTION_SIZE + FORK_TARGET_SIZE * targets.len(),
            _ => INSTRUCTION_SIZE,
        }
    }
}

use Instruction::*;

/// Compilation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The program outgrew its share of the memory limit.
    #[error("pattern too large: compiled program exceeds the {max_mem}-byte memory limit")]
    TooLarge { max_mem: usize },
}

#[derive(Debug, Default, Clone)]
pub struct Bytecode {
    pub instructions: Vec<Instruction>,
    /// Sum of the [`Instruction::memory_usage`] of all instructions.
    pub memory_usage: usize,
}

/// A compiler from [`regex_syntax::hir::Hir`] to
/// this bytecode representation.
#[derive(Debug)]
pub struct Compiler {
    bytecode: Bytecode,
    budget: usize,
    max_mem: usize,
    cg: bool,
}

impl Compiler {
    /// Try to compile a regex in [`regex_syntax::hir::Hir`] form to
    /// this bytecode, within the budget given by the config.
    pub fn compile(hir: &Hir, config: &Config) -> Result<Bytecode, CompileError> {
        let mut compiler = Compiler {
            bytecode: Bytecode::default(),
            budget: config.program_budget(),
            max_mem: config.max_mem,
            cg: !config.never_capture,
        };
        if !hir.properties().look_set_prefix().contains(Look::Start) {
            compiler.push_lazy_star()?;
        }
        compiler.compile_internal(hir)?;
        compiler.push(Accept)?;
        Ok(compiler.bytecode)
    }

    /// Unanchored search: skip any prefix of the input, as lazily as possible.
    fn push_lazy_star(&mut self) -> Result<(), CompileError> {
        self.push(Fork2(3, 1))?;
        self.push(ConsumeAny)?;
        self.push(Jmp(0))
    }

    fn current_pc(&self) -> usize {
        self.bytecode.instructions.len()
    }

    fn charge(&mut self, bytes: usize) -> Result<(), CompileError> {
        let used = self.bytecode.memory_usage + bytes;
        if used > self.budget {
            tracing::trace!(used, budget = self.budget, "program budget exhausted");
            return Err(CompileError::TooLarge {
                max_mem: self.max_mem,
            });
        }
        self.bytecode.memory_usage = used;
        Ok(())
    }

    fn push(&mut self, instruction: Instruction) -> Result<(), CompileError> {
        self.charge(instruction.memory_usage())?;
        self.bytecode.instructions.push(instruction);
        Ok(())
    }

    fn fork2(a: usize, b: usize, greedy: bool) -> Instruction {
        if greedy { Fork2(a, b) } else { Fork2(b, a) }
    }

    fn compile_internal(&mut self, hir: &Hir) -> Result<(), CompileError> {
        match hir.kind() {
            HirKind::Empty => Ok(()),
            HirKind::Literal(Literal(bytes)) => {
                // Unicode mode (the dialect rejects the others) only produces UTF-8 literals
                for c in String::from_utf8_lossy(bytes).chars() {
                    match latin1_byte(c) {
                        Some(byte) => self.push(Consume(byte))?,
                        // Like a clipped class: can't match single-byte text
                        None => self.push(ConsumeClass(Box::default()))?,
                    }
                }
                Ok(())
            }
            HirKind::Class(class) => {
                let ranges = clip_class(class);
                if *ranges == [(u8::MIN, u8::MAX)] {
                    self.push(ConsumeAny)
                } else {
                    self.push(ConsumeClass(ranges))
                }
            }
            HirKind::Look(look) => self.push(Assertion(*look)),
            HirKind::Repetition(Repetition {
                min,
                max,
                greedy,
                sub,
            }) => {
                let (min, greedy) = (*min, *greedy);
                let mut last_iter_start = None;
                for i in 0..min {
                    if i == min - 1 {
                        last_iter_start = Some(self.current_pc());
                    }
                    self.compile_internal(sub)?;
                }
                match *max {
                    Some(max) => {
                        // max - min may be huge, only the budget bounds the forks pushed
                        let mut forks_pc = Vec::new();
                        for _ in min..max {
                            forks_pc.push(self.current_pc());
                            self.push(Fork2(0, 0))?;
                            self.compile_internal(sub)?;
                        }
                        let end_pc = self.current_pc();
                        for fork_pc in forks_pc {
                            self.bytecode.instructions[fork_pc] =
                                Self::fork2(fork_pc + 1, end_pc, greedy);
                        }
                        Ok(())
                    }
                    None => match last_iter_start {
                        Some(last_iter_start) => self.push(Self::fork2(
                            last_iter_start,
                            self.current_pc() + 1,
                            greedy,
                        )),
                        None => {
                            let fork_pc = self.current_pc();
                            self.push(Fork2(0, 0))?;
                            self.compile_internal(sub)?;
                            self.push(Jmp(fork_pc))?;
                            self.bytecode.instructions[fork_pc] =
                                Self::fork2(fork_pc + 1, self.current_pc(), greedy);
                            Ok(())
                        }
                    },
                }
            }
            HirKind::Capture(Capture { index, sub, .. }) => {
                if self.cg {
                    self.push(WriteReg(index * 2))?;
                    self.compile_internal(sub)?;
                    self.push(WriteReg(index * 2 + 1))
                } else {
                    self.compile_internal(sub)
                }
            }
            HirKind::Concat(hirs) => {
                for hir in hirs {
                    self.compile_internal(hir)?;
                }
                Ok(())
            }
            // In regex-syntax Alternation means e1|e2|e3, and Concat means e1e2e3.
            HirKind::Alternation(hirs) => {
                let length = hirs.len();
                let mut fork_targets = Vec::with_capacity(length);
                let mut jmps = Vec::with_capacity(length.saturating_sub(1));
                let current_pc = self.current_pc();
                // Placeholder, the targets are charged once known
                self.push(ForkN(Box::default()))?;
                for (i, hir) in hirs.iter().enumerate() {
                    fork_targets.push(self.current_pc());
                    self.compile_internal(hir)?;
                    if i < length - 1 {
                        jmps.push(self.current_pc());
                        // Patched just below
                        self.push(Jmp(0))?;
                    }
                }
                self.charge(FORK_TARGET_SIZE * fork_targets.len())?;
                self.bytecode.instructions[current_pc] = ForkN(fork_targets.into_boxed_slice());
                // Patch jumps to point to the end of the alternation
                for pc in jmps {
                    self.bytecode.instructions[pc] = Jmp(self.current_pc())
                }
                Ok(())
            }
        }
    }
}
