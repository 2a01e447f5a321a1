//! Semantic passes run between parsing and transpiling.

pub mod analyze;
pub mod const_eval;
pub mod symbol_table;
