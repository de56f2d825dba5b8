//! Thompson NFA construction for the restricted engine.
pub mod bytecode;
