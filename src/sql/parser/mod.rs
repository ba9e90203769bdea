use tracing::debug;

use crate::error::{Error, Result};
use crate::sql::parser::ast::{Operator, Statement, WhereClause};
use crate::sql::parser::lexer::{Keyword, Lexer, Token};
use crate::sql::schema::{duplicate_names, Column};
use crate::sql::types::{DataType, Value};

pub mod ast;
mod lexer;

/// Largest length a VARCHAR column may declare
pub const MAX_VARCHAR_LENGTH: i64 = 65535;

/// Largest float magnitude a literal may have
const MAX_FLOAT_MAGNITUDE: f64 = 1e308;

/// A token together with its byte offset in the statement text
type Spanned = (usize, Token);

/// Parses a single statement
pub fn parse(sql: &str) -> Result<Statement> {
    Parser::new(sql).parse()
}

/// SQL Parser - Converts tokens into Abstract Syntax Tree (AST)
pub struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given SQL input
    pub fn new(input: &'a str) -> Self {
        Parser {
            input,
            tokens: Vec::new(),
            pos: 0,
        }
    }

    /// Parses the input SQL statement into an AST
    ///
    /// Every failure comes back as a parse error carrying the statement text.
    pub fn parse(mut self) -> Result<Statement> {
        let sql = self.input.to_string();
        match self.parse_statement() {
            Ok(stmt) => {
                debug!(kind = stmt.kind(), table = stmt.table_name(), "parsed statement");
                Ok(stmt)
            }
            Err(Error::Parse {
                message, position, ..
            }) => Err(Error::Parse {
                message,
                sql: Some(sql),
                position,
            }),
            Err(other) => Err(Error::Parse {
                message: format!("Unexpected error during parsing: {}", other.message()),
                sql: Some(sql),
                position: None,
            }),
        }
    }

    /// Tokenizes the input and dispatches on the first keyword
    fn parse_statement(&mut self) -> Result<Statement> {
        if self.input.trim().is_empty() {
            return Err(Error::parse("Empty SQL command"));
        }
        self.tokens = Lexer::new(self.input).collect::<Result<Vec<_>>>()?;
        // A single trailing semicolon is accepted and ignored
        if matches!(self.tokens.last(), Some((_, Token::Semicolon))) {
            self.tokens.pop();
        }

        let Some((pos, first)) = self.tokens.first().cloned() else {
            return Err(Error::parse("No tokens found in SQL command"));
        };
        match first.keyword() {
            Some(Keyword::Create) => self.parse_create_table(),
            Some(Keyword::Insert) => self.parse_insert(),
            Some(Keyword::Select) => self.parse_select(),
            _ => Err(Error::parse_at(
                format!(
                    "Unsupported SQL command: {}. Supported commands are: CREATE TABLE, INSERT INTO, SELECT",
                    first.text().to_uppercase()
                ),
                pos,
            )),
        }
    }

    /// Parses `CREATE TABLE name (column_def, ...)`
    fn parse_create_table(&mut self) -> Result<Statement> {
        self.next_expect_keyword(Keyword::Create, "Expected 'CREATE'")?;
        self.next_expect_keyword(Keyword::Table, "Expected 'TABLE' after 'CREATE'")?;
        let name = self.next_identifier("table", "Missing table name in CREATE TABLE statement")?;
        self.next_expect(
            Token::OpenParen,
            "Expected '(' after table name in CREATE TABLE statement",
        )?;

        let groups = self.next_group("column definition", "CREATE TABLE statement")?;
        if groups.is_empty() {
            return Err(Error::parse(
                "No column definitions found in CREATE TABLE statement",
            ));
        }
        let columns = groups
            .iter()
            .map(|group| self.parse_column(group))
            .collect::<Result<Vec<_>>>()?;

        let duplicates = duplicate_names(columns.iter().map(|c| c.name()));
        if !duplicates.is_empty() {
            return Err(Error::parse(format!(
                "Duplicate column names found: {}",
                duplicates.join(", ")
            )));
        }

        self.expect_end("CREATE TABLE statement")?;
        Ok(Statement::CreateTable { name, columns })
    }

    /// Parses `name TYPE [NOT NULL | NULL]` or `name VARCHAR ( length ) [...]`
    fn parse_column(&self, group: &[Spanned]) -> Result<Column> {
        if group.len() < 2 {
            return Err(Error::parse_at(
                format!(
                    "Invalid column definition: '{}'. Expected: column_name data_type",
                    join(group)
                ),
                group[0].0,
            ));
        }

        let name = validate_identifier(&group[0], "column")?;
        let (type_pos, type_token) = &group[1];
        let datatype = match type_token {
            Token::Word(w) => DataType::from_name(w),
            _ => None,
        }
        .ok_or_else(|| {
            Error::parse_at(
                format!(
                    "Invalid data type: '{}'. Supported types are: {}",
                    type_token.text().to_uppercase(),
                    DataType::names()
                ),
                *type_pos,
            )
        })?;

        let mut rest = &group[2..];
        let mut max_length = None;
        if datatype == DataType::Varchar && matches!(rest.first(), Some((_, Token::OpenParen))) {
            if rest.len() < 3 || rest[2].1 != Token::CloseParen {
                return Err(Error::parse_at(
                    "Invalid VARCHAR length specification. Expected: VARCHAR ( length )",
                    rest[0].0,
                ));
            }
            max_length = Some(parse_varchar_length(&rest[1])?);
            rest = &rest[3..];
        }

        let nullable = match rest {
            [] => true,
            [(_, null)] if null.is_keyword(Keyword::Null) => true,
            [(_, not), (_, null)] if not.is_keyword(Keyword::Not) && null.is_keyword(Keyword::Null) => {
                false
            }
            [(pos, token), ..] => {
                return Err(Error::parse_at(
                    format!("Unexpected token '{}' in definition of column '{}'", token, name),
                    *pos,
                ));
            }
        };

        Column::with_options(name, datatype, nullable, max_length)
    }

    /// Parses `INSERT INTO name VALUES (value, ...)`
    fn parse_insert(&mut self) -> Result<Statement> {
        self.next_expect_keyword(Keyword::Insert, "Expected 'INSERT'")?;
        self.next_expect_keyword(Keyword::Into, "Expected 'INTO' after 'INSERT'")?;
        let table_name = self.next_identifier("table", "Missing table name in INSERT statement")?;
        self.next_expect_keyword(
            Keyword::Values,
            "Expected 'VALUES' after table name in INSERT statement",
        )?;
        self.next_expect(Token::OpenParen, "Expected '(' after 'VALUES'")?;

        let groups = self.next_group("value", "INSERT VALUES statement")?;
        if groups.is_empty() {
            return Err(Error::parse("No values found in INSERT statement"));
        }
        let values = groups
            .iter()
            .map(|group| match group.as_slice() {
                [(pos, token)] => parse_value(*pos, token),
                _ => Err(Error::parse_at(
                    format!(
                        "Invalid value: '{}'. Each value must be a single token",
                        join(group)
                    ),
                    group[0].0,
                )),
            })
            .collect::<Result<Vec<_>>>()?;

        self.expect_end("INSERT statement")?;
        Ok(Statement::Insert { table_name, values })
    }

    /// Parses `SELECT * | col, ... FROM name [WHERE col op value]`
    fn parse_select(&mut self) -> Result<Statement> {
        self.next_expect_keyword(Keyword::Select, "Expected 'SELECT'")?;

        let from = self.tokens[self.pos..]
            .iter()
            .position(|(_, t)| t.is_keyword(Keyword::From))
            .map(|offset| self.pos + offset)
            .ok_or_else(|| Error::parse("Missing 'FROM' clause in SELECT statement"))?;
        if from == self.pos {
            return Err(Error::parse_at(
                "Missing column list in SELECT statement",
                self.tokens[from].0,
            ));
        }
        let columns = parse_select_columns(&self.tokens[self.pos..from])?;
        self.pos = from + 1;

        let table_name = self.next_identifier("table", "Missing table name after 'FROM'")?;

        let where_clause = match self.next() {
            None => None,
            Some((_, token)) if token.is_keyword(Keyword::Where) => Some(self.parse_where_clause()?),
            Some((pos, token)) => {
                return Err(Error::parse_at(
                    format!("Unexpected token '{}' after table name in SELECT statement", token),
                    pos,
                ));
            }
        };

        Ok(Statement::Select {
            table_name,
            columns,
            where_clause,
        })
    }

    /// Parses the single `column operator value` predicate after WHERE
    fn parse_where_clause(&mut self) -> Result<WhereClause> {
        let tokens = self.tokens[self.pos..].to_vec();
        self.pos = self.tokens.len();

        match tokens.as_slice() {
            [] => Err(Error::parse("Missing condition after 'WHERE'")),
            [(pos, _)] | [(pos, _), _] => Err(Error::parse_at(
                "Invalid WHERE clause syntax. Expected: column operator value",
                *pos,
            )),
            [column, (op_pos, op), (value_pos, value), extra @ ..] => {
                let column = validate_identifier(column, "column")?;

                let operator = match op {
                    Token::Operator(symbol) => Operator::from_str(symbol),
                    _ => None,
                }
                .ok_or_else(|| {
                    Error::parse_at(
                        format!(
                            "Invalid operator in WHERE clause: '{}'. Supported operators are: {}",
                            op,
                            Operator::symbols()
                        ),
                        *op_pos,
                    )
                })?;

                let value = parse_value(*value_pos, value).map_err(|err| {
                    Error::parse_at(
                        format!("Invalid value in WHERE clause: {}", err.message()),
                        *value_pos,
                    )
                })?;

                if let Some((extra_pos, _)) = extra.first() {
                    return Err(Error::parse_at(
                        format!(
                            "Complex WHERE clauses not supported. Found extra tokens: {}",
                            join(extra)
                        ),
                        *extra_pos,
                    ));
                }

                Ok(WhereClause::new(column, operator, value))
            }
        }
    }

    /// Collects the comma-separated groups up to the parenthesis closing the one
    /// just consumed
    ///
    /// Parentheses nested inside a group (a VARCHAR length) stay in the group.
    fn next_group(&mut self, item: &str, statement: &str) -> Result<Vec<Vec<Spanned>>> {
        let mut groups = Vec::new();
        let mut current = Vec::new();
        let mut depth = 1;
        let mut last_comma = None;

        loop {
            let Some((pos, token)) = self.next() else {
                return Err(Error::parse(format!("Missing closing ')' in {}", statement)));
            };
            match token {
                Token::OpenParen => {
                    depth += 1;
                    current.push((pos, token));
                }
                Token::CloseParen if depth == 1 => break,
                Token::CloseParen => {
                    depth -= 1;
                    current.push((pos, token));
                }
                Token::Comma if depth == 1 => {
                    if current.is_empty() {
                        return Err(Error::parse_at(
                            format!("Invalid {} list: empty {} before comma", item, item),
                            pos,
                        ));
                    }
                    groups.push(std::mem::take(&mut current));
                    last_comma = Some(pos);
                }
                token => current.push((pos, token)),
            }
        }

        match (current.is_empty(), last_comma) {
            (false, _) => groups.push(current),
            (true, Some(pos)) => {
                return Err(Error::parse_at(
                    format!("Invalid {} list: trailing comma", item),
                    pos,
                ));
            }
            (true, None) => {}
        }
        Ok(groups)
    }

    /// Consumes and returns the next token
    fn next(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        Some(token)
    }

    /// Expects a specific token, returns error if different
    fn next_expect(&mut self, expect: Token, message: &str) -> Result<()> {
        match self.next() {
            Some((_, token)) if token == expect => Ok(()),
            Some((pos, _)) => Err(Error::parse_at(message, pos)),
            None => Err(Error::parse(message)),
        }
    }

    /// Expects a specific keyword (case-insensitive)
    fn next_expect_keyword(&mut self, keyword: Keyword, message: &str) -> Result<()> {
        match self.next() {
            Some((_, token)) if token.is_keyword(keyword) => Ok(()),
            Some((pos, _)) => Err(Error::parse_at(message, pos)),
            None => Err(Error::parse(message)),
        }
    }

    /// Expects and consumes a table or column identifier
    fn next_identifier(&mut self, kind: &str, missing: &str) -> Result<String> {
        match self.next() {
            Some(token) => validate_identifier(&token, kind),
            None => Err(Error::parse(missing)),
        }
    }

    /// Fails if any token is left over
    fn expect_end(&mut self, statement: &str) -> Result<()> {
        match self.next() {
            None => Ok(()),
            Some((pos, token)) => Err(Error::parse_at(
                format!("Unexpected token '{}' after end of {}", token, statement),
                pos,
            )),
        }
    }
}

/// Checks a table or column name against `[A-Za-z0-9_-]+`
fn validate_identifier((pos, token): &Spanned, kind: &str) -> Result<String> {
    let name = token.text();
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(Error::parse_at(
            format!(
                "Invalid {} name: '{}'. Names must contain only letters, numbers, underscores, and hyphens",
                kind, name
            ),
            *pos,
        ));
    }
    Ok(name)
}

/// Parses the column list between SELECT and FROM
fn parse_select_columns(tokens: &[Spanned]) -> Result<Vec<String>> {
    if let [(_, Token::Symbol('*'))] = tokens {
        return Ok(vec!["*".to_string()]);
    }

    let commas = tokens
        .iter()
        .filter(|(_, t)| *t == Token::Comma)
        .map(|(pos, _)| *pos)
        .collect::<Vec<_>>();
    let groups = tokens
        .split(|(_, t)| *t == Token::Comma)
        .collect::<Vec<_>>();
    let last = groups.len() - 1;

    let mut columns = Vec::new();
    for (i, group) in groups.into_iter().enumerate() {
        match group {
            [] if i == last => {
                return Err(Error::parse_at(
                    "Invalid column list: trailing comma",
                    commas[i - 1],
                ));
            }
            [] => {
                return Err(Error::parse_at(
                    "Invalid column list: empty column after comma",
                    commas[i],
                ));
            }
            [token] => columns.push(validate_identifier(token, "column")?),
            [(pos, _), ..] => {
                return Err(Error::parse_at(
                    format!(
                        "Invalid column name: '{}'. Columns must be separated by commas",
                        join(group)
                    ),
                    *pos,
                ));
            }
        }
    }

    let duplicates = duplicate_names(columns.iter().map(String::as_str));
    if !duplicates.is_empty() {
        return Err(Error::parse(format!(
            "Duplicate column names in SELECT: {}",
            duplicates.join(", ")
        )));
    }
    Ok(columns)
}

/// Parses the length token of `VARCHAR ( length )`
fn parse_varchar_length((pos, token): &Spanned) -> Result<u32> {
    let text = token.text();
    let length = match token {
        Token::Number(n) => n.parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        Error::parse_at(
            format!("Invalid VARCHAR length: '{}'. Must be a positive integer", text),
            *pos,
        )
    })?;

    if length <= 0 {
        return Err(Error::parse_at(
            format!("VARCHAR length must be positive, got: {}", length),
            *pos,
        ));
    }
    if length > MAX_VARCHAR_LENGTH {
        return Err(Error::parse_at(
            format!(
                "VARCHAR length too large (max {}), got: {}",
                MAX_VARCHAR_LENGTH, length
            ),
            *pos,
        ));
    }
    Ok(length as u32)
}

/// Turns a literal token into a value
///
/// The token's text, with quotes already stripped, becomes Null, a boolean,
/// a float (when it contains `.`), an integer, or finally text.
fn parse_value(pos: usize, token: &Token) -> Result<Value> {
    let text = token.text();

    match Keyword::from_str(&text) {
        Some(Keyword::Null) => return Ok(Value::Null),
        Some(Keyword::True) => return Ok(Value::Boolean(true)),
        Some(Keyword::False) => return Ok(Value::Boolean(false)),
        _ => {}
    }

    if text.contains('.') {
        if let Ok(value) = text.parse::<f64>() {
            if !value.is_finite() || value.abs() > MAX_FLOAT_MAGNITUDE {
                return Err(Error::parse_at(format!("Float value too large: {}", text), pos));
            }
            return Ok(Value::Float(value));
        }
    } else if is_integer_literal(&text) {
        return match text.parse::<i64>() {
            // -2^63 is rejected as well: its magnitude exceeds 2^63 - 1
            Ok(value) if value != i64::MIN => Ok(Value::Integer(value)),
            _ => Err(Error::parse_at(format!("Integer value too large: {}", text), pos)),
        };
    }

    Ok(Value::Text(text))
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn join(tokens: &[Spanned]) -> String {
    tokens
        .iter()
        .map(|(_, t)| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{parse, Parser};
    use crate::{
        error::{Error, Result},
        sql::{
            parser::ast::{Operator, Statement, WhereClause},
            schema::Column,
            types::{DataType, Value},
        },
    };

    fn parse_err(sql: &str) -> String {
        match parse(sql) {
            Err(Error::Parse { message, .. }) => message,
            other => panic!("expected parse error for {:?}, got {:?}", sql, other),
        }
    }

    #[test]
    fn test_parser_create_table() -> Result<()> {
        let stmt1 = Parser::new("CREATE TABLE users (id INT, name VARCHAR(50), age INT)").parse()?;
        assert_eq!(
            stmt1,
            Statement::CreateTable {
                name: "users".to_string(),
                columns: vec![
                    Column::new("id", DataType::Int)?,
                    Column::varchar("name", 50)?,
                    Column::new("age", DataType::Int)?,
                ],
            }
        );

        let stmt2 = parse(
            "create            table users (
                id    int,
                name varchar ( 50 ) ,
                age INT
            );",
        )?;
        assert_eq!(stmt1, stmt2);

        let stmt3 = parse("CREATE TABLE t (a varchar, b float not null, c boolean null)")?;
        assert_eq!(
            stmt3,
            Statement::CreateTable {
                name: "t".to_string(),
                columns: vec![
                    Column::new("a", DataType::Varchar)?,
                    Column::new("b", DataType::Float)?.with_nullable(false),
                    Column::new("c", DataType::Boolean)?,
                ],
            }
        );
        Ok(())
    }

    #[test]
    fn test_parser_create_table_errors() {
        assert!(parse_err("CREATE users (id INT)").contains("Expected 'TABLE'"));
        assert!(parse_err("CREATE TABLE users id INT").contains("Expected '('"));
        assert!(parse_err("CREATE TABLE users (id INT").contains("Missing closing ')'"));
        assert!(parse_err("CREATE TABLE users ()").contains("No column definitions"));
        assert!(parse_err("CREATE TABLE users (id TEXT)").contains("Invalid data type: 'TEXT'"));
        assert!(parse_err("CREATE TABLE users (id)").contains("Invalid column definition"));
        assert!(parse_err("CREATE TABLE users (id INT,)").contains("trailing comma"));
        assert!(parse_err("CREATE TABLE users (, id INT)").contains("empty"));
        assert!(parse_err("CREATE TABLE users (a INT,, b INT)").contains("empty"));
        assert!(parse_err("CREATE TABLE bad$name (id INT)").contains("Expected '(' after table name"));
        assert!(parse_err("CREATE TABLE \"bad$name\" (id INT)").contains("Invalid table name"));
        assert!(parse_err("CREATE TABLE t (n VARCHAR(0))").contains("must be positive"));
        assert!(parse_err("CREATE TABLE t (n VARCHAR(-3))").contains("must be positive"));
        assert!(parse_err("CREATE TABLE t (n VARCHAR(70000))").contains("too large"));
        assert!(parse_err("CREATE TABLE t (n VARCHAR(abc))").contains("Invalid VARCHAR length"));
        assert!(parse_err("CREATE TABLE t (n VARCHAR(10)").contains("Missing closing ')'"));
        assert!(parse_err("CREATE TABLE t (n INT(10))").contains("Unexpected token '('"));
        assert!(parse_err("CREATE TABLE t (n INT) extra").contains("Unexpected token 'extra'"));

        let message = parse_err("CREATE TABLE t (a INT, B INT, A FLOAT, b INT, c INT)");
        assert_eq!(message, "Duplicate column names found: a, b");
    }

    #[test]
    fn test_parser_insert() -> Result<()> {
        let stmt1 = parse("insert into tbl1 values (1, -2, 3.5, 'a', true, NULL, Bob, '42');")?;
        assert_eq!(
            stmt1,
            Statement::Insert {
                table_name: "tbl1".to_string(),
                values: vec![
                    Value::Integer(1),
                    Value::Integer(-2),
                    Value::Float(3.5),
                    Value::Text("a".to_string()),
                    Value::Boolean(true),
                    Value::Null,
                    Value::Text("Bob".to_string()),
                    Value::Integer(42),
                ],
            }
        );

        let stmt2 = parse("INSERT INTO t VALUES ('it''s', \"x,y\")")?;
        assert_eq!(
            stmt2,
            Statement::Insert {
                table_name: "t".to_string(),
                values: vec![Value::Text("it's".to_string()), Value::Text("x,y".to_string())],
            }
        );

        // quoted literals are typed like bare ones once the quotes are gone
        let stmt3 = parse("INSERT INTO t VALUES ('null', 'TRUE', '-7', '2.5', 'v1.x')")?;
        assert_eq!(
            stmt3,
            Statement::Insert {
                table_name: "t".to_string(),
                values: vec![
                    Value::Null,
                    Value::Boolean(true),
                    Value::Integer(-7),
                    Value::Float(2.5),
                    Value::Text("v1.x".to_string()),
                ],
            }
        );
        Ok(())
    }

    #[test]
    fn test_parser_insert_errors() {
        assert!(parse_err("INSERT t VALUES (1)").contains("Expected 'INTO'"));
        assert!(parse_err("INSERT INTO t (1)").contains("Expected 'VALUES'"));
        assert!(parse_err("INSERT INTO t VALUES 1").contains("Expected '(' after 'VALUES'"));
        assert!(parse_err("INSERT INTO t VALUES ()").contains("No values found"));
        assert!(parse_err("INSERT INTO t VALUES (1,)").contains("trailing comma"));
        assert!(parse_err("INSERT INTO t VALUES (,1)").contains("empty"));
        assert!(parse_err("INSERT INTO t VALUES (1,,2)").contains("empty"));
        assert!(parse_err("INSERT INTO t VALUES (1 2)").contains("single token"));
        assert!(parse_err("INSERT INTO t VALUES (9223372036854775808)").contains("Integer value too large"));
        assert!(parse_err("INSERT INTO t VALUES (-9223372036854775808)").contains("Integer value too large"));
        let huge = format!("INSERT INTO t VALUES (1{}.0)", "0".repeat(310));
        assert!(parse_err(&huge).contains("Float value too large"));
    }

    #[test]
    fn test_parser_insert_integer_bounds() -> Result<()> {
        assert_eq!(
            parse("INSERT INTO t VALUES (9223372036854775807, -9223372036854775807)")?,
            Statement::Insert {
                table_name: "t".to_string(),
                values: vec![Value::Integer(i64::MAX), Value::Integer(-i64::MAX)],
            }
        );
        Ok(())
    }

    #[test]
    fn test_parser_select() -> Result<()> {
        assert_eq!(
            parse("select * from tbl1;")?,
            Statement::Select {
                table_name: "tbl1".to_string(),
                columns: vec!["*".to_string()],
                where_clause: None,
            }
        );

        assert_eq!(
            parse("SELECT name, age FROM users WHERE age > 27")?,
            Statement::Select {
                table_name: "users".to_string(),
                columns: vec!["name".to_string(), "age".to_string()],
                where_clause: Some(WhereClause::new("age", Operator::Greater, Value::Integer(27))),
            }
        );

        assert_eq!(
            parse("SELECT * FROM users WHERE name <> 'Bob';")?,
            Statement::Select {
                table_name: "users".to_string(),
                columns: vec!["*".to_string()],
                where_clause: Some(WhereClause::new(
                    "name",
                    Operator::NotEqual,
                    Value::Text("Bob".to_string())
                )),
            }
        );

        assert_eq!(
            parse("SELECT id FROM t WHERE score = null")?,
            Statement::Select {
                table_name: "t".to_string(),
                columns: vec!["id".to_string()],
                where_clause: Some(WhereClause::new("score", Operator::Equal, Value::Null)),
            }
        );
        Ok(())
    }

    #[test]
    fn test_parser_select_errors() {
        assert!(parse_err("SELECT * users").contains("Missing 'FROM'"));
        assert!(parse_err("SELECT FROM users").contains("Missing column list"));
        assert!(parse_err("SELECT * FROM").contains("Missing table name"));
        assert!(parse_err("SELECT a, FROM t").contains("trailing comma"));
        assert!(parse_err("SELECT , a FROM t").contains("empty column"));
        assert!(parse_err("SELECT a,,b FROM t").contains("empty column"));
        assert!(parse_err("SELECT a b FROM t").contains("Invalid column name"));
        assert!(parse_err("SELECT *, a FROM t").contains("Invalid column name"));
        assert!(parse_err("SELECT a, A FROM t").contains("Duplicate column names in SELECT: a"));
        assert!(parse_err("SELECT * FROM t WHERE").contains("Missing condition"));
        assert!(parse_err("SELECT * FROM t WHERE a >").contains("Invalid WHERE clause syntax"));
        assert!(parse_err("SELECT * FROM t WHERE a => 1").contains("Invalid operator"));
        assert!(parse_err("SELECT * FROM t WHERE a LIKE 1").contains("Invalid operator"));
        assert!(parse_err("SELECT * FROM t WHERE a = 1 AND b = 2").contains("Complex WHERE"));
        assert!(parse_err("SELECT * FROM t LIMIT 1").contains("Unexpected token 'LIMIT'"));
    }

    #[test]
    fn test_parser_dispatch_errors() {
        let err = parse("DROP TABLE users").unwrap_err();
        match err {
            Error::Parse {
                message,
                sql,
                position,
            } => {
                assert!(message.contains("Unsupported SQL command: DROP"));
                assert_eq!(sql.as_deref(), Some("DROP TABLE users"));
                assert_eq!(position, Some(0));
            }
            other => panic!("unexpected error {:?}", other),
        }

        assert!(parse_err("   ").contains("Empty SQL command"));
        assert!(parse_err(";").contains("No tokens"));
        assert!(parse_err("'select' * from t").contains("Unsupported SQL command"));
        assert!(parse_err("SELECT * FROM t WHERE name = 'open").contains("Unterminated"));
    }

    #[test]
    fn test_parser_error_position() {
        match parse("SELECT * FROM t WHERE a = 1 OR b = 2") {
            Err(Error::Parse { position, .. }) => assert_eq!(position, Some(28)),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
