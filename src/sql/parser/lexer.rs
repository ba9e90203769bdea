//! SQL Lexer - Tokenizes SQL input text into a stream of positioned tokens

use std::{fmt::Display, iter::Peekable, str::CharIndices};

use crate::error::{Error, Result};

/// Represents a single lexical token in the SQL input
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier or keyword (letters, digits, underscore), case preserved
    Word(String),
    /// Single- or double-quoted literal, quotes stripped and doubled quotes unescaped
    String(String),
    /// Numeric literal (optional leading minus, digits, optional fraction)
    Number(String),
    /// Run of comparison symbols such as `=`, `<>` or `>=`
    Operator(String),
    OpenParen,
    CloseParen,
    Comma,
    Semicolon,
    /// Any other single non-space character, e.g. `*`
    Symbol(char),
}

impl Token {
    /// Returns the keyword this token spells, if it is an unquoted word
    pub fn keyword(&self) -> Option<Keyword> {
        match self {
            Token::Word(w) => Keyword::from_str(w),
            _ => None,
        }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.keyword() == Some(keyword)
    }

    /// The token's text without quotes
    pub fn text(&self) -> String {
        match self {
            Token::Word(v) | Token::String(v) | Token::Number(v) | Token::Operator(v) => {
                v.clone()
            }
            other => other.to_string(),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Word(v) | Token::String(v) | Token::Number(v) | Token::Operator(v) => {
                f.write_str(v)
            }
            Token::OpenParen => f.write_str("("),
            Token::CloseParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Semicolon => f.write_str(";"),
            Token::Symbol(c) => write!(f, "{}", c),
        }
    }
}

/// Reserved words recognized by the parser
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Keyword {
    Create,
    Table,
    Insert,
    Into,
    Values,
    Select,
    From,
    Where,
    Not,
    Null,
    True,
    False,
}

impl Keyword {
    /// Attempts to parse a string as a keyword (case-insensitive)
    pub fn from_str(ident: &str) -> Option<Keyword> {
        Some(match ident.to_uppercase().as_ref() {
            "CREATE" => Keyword::Create,
            "TABLE" => Keyword::Table,
            "INSERT" => Keyword::Insert,
            "INTO" => Keyword::Into,
            "VALUES" => Keyword::Values,
            "SELECT" => Keyword::Select,
            "FROM" => Keyword::From,
            "WHERE" => Keyword::Where,
            "NOT" => Keyword::Not,
            "NULL" => Keyword::Null,
            "TRUE" => Keyword::True,
            "FALSE" => Keyword::False,
            _ => return None,
        })
    }

    /// Returns the uppercase string representation of the keyword
    pub fn to_str(&self) -> &str {
        match self {
            Keyword::Create => "CREATE",
            Keyword::Table => "TABLE",
            Keyword::Insert => "INSERT",
            Keyword::Into => "INTO",
            Keyword::Values => "VALUES",
            Keyword::Select => "SELECT",
            Keyword::From => "FROM",
            Keyword::Where => "WHERE",
            Keyword::Not => "NOT",
            Keyword::Null => "NULL",
            Keyword::True => "TRUE",
            Keyword::False => "FALSE",
        }
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

/// SQL lexical analyzer (lexer/tokenizer)
///
/// Yields each token together with the byte offset where it starts.
pub struct Lexer<'a> {
    iter: Peekable<CharIndices<'a>>,
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<(usize, Token)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.scan().transpose()
    }
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given SQL text
    pub fn new(sql_text: &'a str) -> Self {
        Self {
            iter: sql_text.char_indices().peekable(),
        }
    }

    /// Consumes the next character if it satisfies the predicate
    fn next_if<F: Fn(char) -> bool>(&mut self, predicate: F) -> Option<char> {
        self.iter.peek().filter(|&(_, c)| predicate(*c))?;
        self.iter.next().map(|(_, c)| c)
    }

    /// Consumes consecutive characters while they satisfy the predicate
    fn next_while<F: Fn(char) -> bool>(&mut self, predicate: F) -> Option<String> {
        let mut value = String::new();
        while let Some(c) = self.next_if(&predicate) {
            value.push(c);
        }
        Some(value).filter(|v| !v.is_empty())
    }

    /// Looks at the character after the next one
    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.iter.clone();
        ahead.next();
        ahead.next().map(|(_, c)| c)
    }

    /// Removes whitespace from the input stream
    fn erase_whitespace(&mut self) {
        self.next_while(|c| c.is_whitespace());
    }

    /// Scans and returns the next token
    fn scan(&mut self) -> Result<Option<(usize, Token)>> {
        self.erase_whitespace();
        let Some(&(pos, c)) = self.iter.peek() else {
            return Ok(None);
        };
        let token = match c {
            '\'' | '"' => self.scan_string(pos, c)?,
            c if c.is_ascii_digit() => self.scan_number(),
            '-' if self.peek_second().is_some_and(|n| n.is_ascii_digit()) => self.scan_number(),
            '<' | '>' | '=' | '!' => Token::Operator(
                self.next_while(|c| matches!(c, '<' | '>' | '=' | '!'))
                    .unwrap_or_default(),
            ),
            c if is_word_char(c) => Token::Word(self.next_while(is_word_char).unwrap_or_default()),
            _ => self.scan_symbol(c),
        };
        Ok(Some((pos, token)))
    }

    /// Scans a quoted literal; a doubled quote stands for one literal quote
    fn scan_string(&mut self, start: usize, quote: char) -> Result<Token> {
        self.iter.next();
        let mut val = String::new();

        loop {
            match self.iter.next() {
                Some((_, c)) if c == quote => {
                    if self.next_if(|n| n == quote).is_some() {
                        val.push(quote);
                    } else {
                        break;
                    }
                }
                Some((_, c)) => val.push(c),
                None => return Err(Error::parse_at("Unterminated string literal", start)),
            }
        }
        Ok(Token::String(val))
    }

    /// Scans a numeric literal (integer or floating-point)
    ///
    /// Digits running straight into letters form a word instead, e.g. `2fa`.
    fn scan_number(&mut self) -> Token {
        let mut val = String::new();
        if let Some(sign) = self.next_if(|c| c == '-') {
            val.push(sign);
        }
        val.push_str(&self.next_while(|c| c.is_ascii_digit()).unwrap_or_default());

        if val.starts_with(|c: char| c.is_ascii_digit())
            && self.iter.peek().is_some_and(|&(_, c)| is_word_char(c))
        {
            val.push_str(&self.next_while(is_word_char).unwrap_or_default());
            return Token::Word(val);
        }

        if self.iter.peek().is_some_and(|&(_, c)| c == '.')
            && self.peek_second().is_some_and(|c| c.is_ascii_digit())
        {
            self.iter.next();
            val.push('.');
            val.push_str(&self.next_while(|c| c.is_ascii_digit()).unwrap_or_default());
        }
        Token::Number(val)
    }

    /// Scans a single-character symbol token
    fn scan_symbol(&mut self, c: char) -> Token {
        self.iter.next();
        match c {
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            other => Token::Symbol(other),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
