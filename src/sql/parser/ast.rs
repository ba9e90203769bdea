use std::{cmp::Ordering, fmt::Display};

use crate::sql::{schema::Column, types::Value};

/// Abstract Syntax Tree (AST) node definitions for SQL statements
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable { name: String, columns: Vec<Column> },
    /// INSERT statement
    Insert {
        table_name: String,
        values: Vec<Value>,
    },
    /// SELECT statement
    Select {
        table_name: String,
        /// Requested columns, or `["*"]` for all of them
        columns: Vec<String>,
        where_clause: Option<WhereClause>,
    },
}

impl Statement {
    /// Name of the statement kind, used in error context
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::CreateTable { .. } => "CreateTable",
            Statement::Insert { .. } => "Insert",
            Statement::Select { .. } => "Select",
        }
    }

    pub fn table_name(&self) -> &str {
        match self {
            Statement::CreateTable { name, .. } => name,
            Statement::Insert { table_name, .. } | Statement::Select { table_name, .. } => {
                table_name
            }
        }
    }
}

/// Comparison operator of a WHERE predicate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operator {
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
}

impl Operator {
    /// Resolves an operator symbol; `<>` is an alias of `!=`
    pub fn from_str(symbol: &str) -> Option<Operator> {
        Some(match symbol {
            "=" => Operator::Equal,
            "!=" | "<>" => Operator::NotEqual,
            ">" => Operator::Greater,
            "<" => Operator::Less,
            ">=" => Operator::GreaterEqual,
            "<=" => Operator::LessEqual,
            _ => return None,
        })
    }

    pub fn to_str(&self) -> &str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::GreaterEqual => ">=",
            Operator::LessEqual => "<=",
        }
    }

    /// Supported symbols, sorted, for error messages
    pub fn symbols() -> &'static str {
        "!=, <, <=, <>, =, >, >="
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Single `column operator value` predicate of a SELECT
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
}

impl WhereClause {
    pub fn new(column: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            column: column.into(),
            operator,
            value,
        }
    }

    /// Evaluates the predicate against a row value
    ///
    /// With a Null on either side only `=` (both Null) and `!=` (exactly one
    /// Null) can hold. Values of incomparable kinds never match.
    pub fn evaluate(&self, row_value: &Value) -> bool {
        if row_value.is_null() || self.value.is_null() {
            return match self.operator {
                Operator::Equal => row_value.is_null() && self.value.is_null(),
                Operator::NotEqual => row_value.is_null() != self.value.is_null(),
                _ => false,
            };
        }

        let Some(ordering) = row_value.compare(&self.value) else {
            return false;
        };
        match self.operator {
            Operator::Equal => ordering == Ordering::Equal,
            Operator::NotEqual => ordering != Ordering::Equal,
            Operator::Greater => ordering == Ordering::Greater,
            Operator::Less => ordering == Ordering::Less,
            Operator::GreaterEqual => ordering != Ordering::Less,
            Operator::LessEqual => ordering != Ordering::Greater,
        }
    }
}

impl Display for WhereClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.column, self.operator, self.value.to_text())
    }
}
