//! Lowers an analyzed Aster AST into C source code.

pub mod transpile;
pub mod types;
