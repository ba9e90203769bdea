//! SQL processing module
//!
//! This module provides:
//! - `parser`: SQL lexer and parser
//! - `types`: SQL values and data types
//! - `schema`: Column and schema definitions, value conversion
//! - `table`: Tables of validated rows
//! - `plan`: Execution plan generation
//! - `executor`: Plan execution and result rendering
//! - `engine`: Statement text to result facade

pub mod engine;
pub mod executor;
pub mod parser;
pub mod plan;
pub mod schema;
pub mod table;
pub mod types;
