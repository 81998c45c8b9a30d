//! Command lexer - tokenizes one command line into a stream of tokens

use std::{fmt::Display, iter::Peekable, str::Chars};

use crate::error::{Error, Result};

/// Represents a single lexical token in the command text
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Reserved keyword
    Keyword(Keyword),
    /// Identifier such as a table name, column name or type name
    Ident(String),
    /// Quoted string literal, quotes removed
    String(String),
    /// Numeric literal (integer or decimal, optionally negative)
    Number(String),
    OpenParen,
    CloseParen,
    Comma,
    Semicolon,
    Asterisk,
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Token::Keyword(keyword) => keyword.to_str(),
            Token::Ident(ident) => ident,
            Token::String(v) => return write!(f, "{:?}", v),
            Token::Number(n) => n,
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::Asterisk => "*",
            Token::Equal => "=",
            Token::NotEqual => "!=",
            Token::Greater => ">",
            Token::GreaterEqual => ">=",
            Token::Less => "<",
            Token::LessEqual => "<=",
        })
    }
}

/// Reserved keywords
#[derive(Debug, Clone, PartialEq)]
pub enum Keyword {
    Create,
    Table,
    Drop,
    List,
    Tables,
    Insert,
    Into,
    Values,
    Select,
    From,
    Where,
    Update,
    Set,
    Delete,
    Exit,
    Help,
    True,
    False,
}

impl Keyword {
    /// Attempts to parse a string as a keyword (case-insensitive)
    pub fn from_str(ident: &str) -> Option<Keyword> {
        Some(match ident.to_uppercase().as_ref() {
            "CREATE" => Keyword::Create,
            "TABLE" => Keyword::Table,
            "DROP" => Keyword::Drop,
            "LIST" => Keyword::List,
            "TABLES" => Keyword::Tables,
            "INSERT" => Keyword::Insert,
            "INTO" => Keyword::Into,
            "VALUES" => Keyword::Values,
            "SELECT" => Keyword::Select,
            "FROM" => Keyword::From,
            "WHERE" => Keyword::Where,
            "UPDATE" => Keyword::Update,
            "SET" => Keyword::Set,
            "DELETE" => Keyword::Delete,
            "EXIT" => Keyword::Exit,
            "HELP" => Keyword::Help,
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
            Keyword::Drop => "DROP",
            Keyword::List => "LIST",
            Keyword::Tables => "TABLES",
            Keyword::Insert => "INSERT",
            Keyword::Into => "INTO",
            Keyword::Values => "VALUES",
            Keyword::Select => "SELECT",
            Keyword::From => "FROM",
            Keyword::Where => "WHERE",
            Keyword::Update => "UPDATE",
            Keyword::Set => "SET",
            Keyword::Delete => "DELETE",
            Keyword::Exit => "EXIT",
            Keyword::Help => "HELP",
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

/// Lexical analyzer over a single command line
pub struct Lexer<'a> {
    iter: Peekable<Chars<'a>>,
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.scan() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => self
                .iter
                .peek()
                .map(|c| Err(Error::Syntax(format!("unexpected character {}", c)))),
            Err(err) => Some(Err(err)),
        }
    }
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            iter: text.chars().peekable(),
        }
    }

    /// Consumes the next character if it satisfies the predicate
    fn next_if<F: Fn(char) -> bool>(&mut self, predicate: F) -> Option<char> {
        self.iter.peek().filter(|&c| predicate(*c))?;
        self.iter.next()
    }

    /// Consumes consecutive characters while they satisfy the predicate
    fn next_while<F: Fn(char) -> bool>(&mut self, predicate: F) -> Option<String> {
        let mut value = String::new();
        while let Some(c) = self.next_if(&predicate) {
            value.push(c);
        }
        Some(value).filter(|v| !v.is_empty())
    }

    fn erase_whitespace(&mut self) {
        self.next_while(|c| c.is_whitespace());
    }

    /// Scans and returns the next token
    fn scan(&mut self) -> Result<Option<Token>> {
        self.erase_whitespace();
        match self.iter.peek() {
            Some('\'') | Some('"') => self.scan_string(),
            Some('-') => self.scan_number(),
            Some(c) if c.is_ascii_digit() => self.scan_number(),
            Some(c) if c.is_alphabetic() || *c == '_' => Ok(self.scan_ident()),
            Some(_) => self.scan_symbol(),
            None => Ok(None),
        }
    }

    /// Scans a string literal enclosed in single or double quotes.
    /// A backslash takes the following character literally.
    fn scan_string(&mut self) -> Result<Option<Token>> {
        let Some(quote) = self.iter.next() else {
            return Ok(None);
        };
        let mut val = String::new();

        loop {
            match self.iter.next() {
                Some('\\') if self.iter.peek().is_some() => val.extend(self.iter.next()),
                Some(c) if c == quote => break,
                Some(c) => val.push(c),
                None => {
                    return Err(Error::Syntax(format!(
                        "unterminated string literal {}{}",
                        quote, val
                    )));
                }
            }
        }
        Ok(Some(Token::String(val)))
    }

    /// Scans a numeric literal (integer or decimal) with an optional leading minus
    fn scan_number(&mut self) -> Result<Option<Token>> {
        let mut val = String::new();
        if let Some(sign) = self.next_if(|c| c == '-') {
            val.push(sign);
        }
        match self.next_while(|c| c.is_ascii_digit()) {
            Some(digits) => val.push_str(&digits),
            None => return Err(Error::Syntax(format!("expected digits after {}", val))),
        }
        if let Some(sep) = self.next_if(|c| c == '.') {
            val.push(sep);
            while let Some(c) = self.next_if(|c| c.is_ascii_digit()) {
                val.push(c);
            }
        }
        Ok(Some(Token::Number(val)))
    }

    /// Scans an identifier or keyword
    fn scan_ident(&mut self) -> Option<Token> {
        let val = self.next_while(|c| c.is_alphanumeric() || c == '_')?;
        // Returns Keyword if matched, otherwise returns as a regular Ident
        Some(Keyword::from_str(&val).map_or(Token::Ident(val.to_lowercase()), Token::Keyword))
    }

    /// Scans a one or two character symbol token
    fn scan_symbol(&mut self) -> Result<Option<Token>> {
        let Some(c) = self.next_if(|c| "*(),;=!<>".contains(c)) else {
            return Ok(None);
        };
        let followed_by_equal = self.next_if(|c| c == '=').is_some();
        Ok(Some(match (c, followed_by_equal) {
            ('*', false) => Token::Asterisk,
            ('(', false) => Token::OpenParen,
            (')', false) => Token::CloseParen,
            (',', false) => Token::Comma,
            (';', false) => Token::Semicolon,
            ('=', false) => Token::Equal,
            ('!', true) => Token::NotEqual,
            ('>', false) => Token::Greater,
            ('>', true) => Token::GreaterEqual,
            ('<', false) => Token::Less,
            ('<', true) => Token::LessEqual,
            (c, true) => return Err(Error::Syntax(format!("unexpected symbol {}=", c))),
            (c, false) => return Err(Error::Syntax(format!("unexpected symbol {}", c))),
        }))
    }
}
