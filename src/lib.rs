//! minisql - a small in-memory SQL engine
//!
//! This crate provides:
//! - SQL parsing (lexer, parser, AST) for CREATE TABLE, INSERT and SELECT
//! - Query planning into scan, filter and project operations
//! - A typed in-memory table registry with JSON and binary persistence
//! - A line-oriented shell

pub mod error;
pub mod shell;
pub mod sql;
pub mod storage;
