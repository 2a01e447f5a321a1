//! Front-end of the Aster compiler: tokens, AST and the recursive-descent parser.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod visitor;
