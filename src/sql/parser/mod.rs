use std::iter::Peekable;

use crate::error::{Error, Result};
use crate::sql::parser::ast::{Column, CompareOp, Condition, Literal, Projection, Statement};
use crate::sql::parser::lexer::{Keyword, Lexer, Token};
use crate::sql::types::DataType;

pub mod ast;
mod lexer;

/// Command parser - converts tokens into a `Statement`
pub struct Parser<'a> {
    lexer: Peekable<Lexer<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(input).peekable(),
        }
    }

    /// Parses exactly one command, optionally terminated by a semicolon
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = self.parse_statement()?;
        self.next_if_token(Token::Semicolon);
        // No tokens allowed after the command
        if let Some(token) = self.peek()? {
            return Err(Error::Syntax(format!("unexpected token {}", token)));
        }
        Ok(stmt)
    }

    /// Parses a statement based on the first token
    fn parse_statement(&mut self) -> Result<Statement> {
        match self.next()? {
            Token::Keyword(Keyword::Create) => self.parse_create_table(),
            Token::Keyword(Keyword::Drop) => self.parse_drop_table(),
            Token::Keyword(Keyword::List) => {
                self.next_expect(Token::Keyword(Keyword::Tables))?;
                Ok(Statement::ListTables)
            }
            Token::Keyword(Keyword::Select) => self.parse_select(),
            Token::Keyword(Keyword::Insert) => self.parse_insert(),
            Token::Keyword(Keyword::Update) => self.parse_update(),
            Token::Keyword(Keyword::Delete) => self.parse_delete(),
            Token::Keyword(Keyword::Help) => Ok(Statement::Help),
            Token::Keyword(Keyword::Exit) => Ok(Statement::Exit),
            t => Err(Error::Syntax(format!("unknown command {}", t))),
        }
    }

    /// Parses CREATE TABLE <name> (<col> <type>, ...)
    fn parse_create_table(&mut self) -> Result<Statement> {
        self.next_expect(Token::Keyword(Keyword::Table))?;
        let name = self.next_ident()?;
        self.next_expect(Token::OpenParen)?;

        let mut columns: Vec<Column> = Vec::new();
        loop {
            let column = self.parse_column()?;
            if columns.iter().any(|c| c.name == column.name) {
                return Err(Error::Syntax(format!(
                    "duplicate column {} in table {}",
                    column.name, name
                )));
            }
            columns.push(column);
            if self.next_if_token(Token::Comma).is_none() {
                break;
            }
        }
        self.next_expect(Token::CloseParen)?;
        Ok(Statement::CreateTable { name, columns })
    }

    /// Parses a column definition in CREATE TABLE
    fn parse_column(&mut self) -> Result<Column> {
        let name = self.next_ident()?;
        let datatype = match self.next()? {
            Token::Ident(type_name) => DataType::from_name(&type_name).ok_or_else(|| {
                Error::Syntax(format!(
                    "invalid data type {} for column {}, expected int, str, float or bool",
                    type_name, name
                ))
            })?,
            token => {
                return Err(Error::Syntax(format!(
                    "expected data type for column {}, got {}",
                    name, token
                )));
            }
        };
        Ok(Column { name, datatype })
    }

    fn parse_drop_table(&mut self) -> Result<Statement> {
        self.next_expect(Token::Keyword(Keyword::Table))?;
        Ok(Statement::DropTable {
            name: self.next_ident()?,
        })
    }

    /// Parses SELECT <cols|*> FROM <name> [WHERE <cond>]
    fn parse_select(&mut self) -> Result<Statement> {
        let projection = if self.next_if_token(Token::Asterisk).is_some() {
            Projection::All
        } else {
            let mut columns = Vec::new();
            loop {
                columns.push(self.next_ident()?);
                if self.next_if_token(Token::Comma).is_none() {
                    break;
                }
            }
            Projection::Columns(columns)
        };
        self.next_expect(Token::Keyword(Keyword::From))?;

        Ok(Statement::Select {
            table_name: self.next_ident()?,
            projection,
            where_clause: self.parse_where_clause()?,
        })
    }

    /// Parses INSERT INTO <name> VALUES (<lit>, ...)
    fn parse_insert(&mut self) -> Result<Statement> {
        self.next_expect(Token::Keyword(Keyword::Into))?;
        let table_name = self.next_ident()?;
        self.next_expect(Token::Keyword(Keyword::Values))?;
        self.next_expect(Token::OpenParen)?;

        let mut values = Vec::new();
        loop {
            values.push(self.parse_literal()?);
            match self.next()? {
                Token::CloseParen => break,
                Token::Comma => {}
                token => {
                    return Err(Error::Syntax(format!("unexpected token {}", token)));
                }
            }
        }
        Ok(Statement::Insert { table_name, values })
    }

    /// Parses UPDATE <name> SET <col>=<lit>[, ...] [WHERE <cond>]
    fn parse_update(&mut self) -> Result<Statement> {
        let table_name = self.next_ident()?;
        self.next_expect(Token::Keyword(Keyword::Set))?;

        let mut assignments: Vec<(String, Literal)> = Vec::new();
        loop {
            let col = self.next_ident()?;
            self.next_expect(Token::Equal)?;
            let value = self.parse_literal()?;
            // Assigning the same column twice is ambiguous
            if assignments.iter().any(|(c, _)| *c == col) {
                return Err(Error::Syntax(format!("duplicate column {} for update", col)));
            }
            assignments.push((col, value));
            if self.next_if_token(Token::Comma).is_none() {
                break;
            }
        }
        Ok(Statement::Update {
            table_name,
            assignments,
            where_clause: self.parse_where_clause()?,
        })
    }

    /// Parses DELETE FROM <name> [WHERE <cond>]
    fn parse_delete(&mut self) -> Result<Statement> {
        self.next_expect(Token::Keyword(Keyword::From))?;
        Ok(Statement::Delete {
            table_name: self.next_ident()?,
            where_clause: self.parse_where_clause()?,
        })
    }

    /// Parses a literal, left uncoerced
    fn parse_literal(&mut self) -> Result<Literal> {
        Ok(match self.next()? {
            Token::Number(n) => Literal::Number(n),
            Token::String(s) => Literal::String(s),
            Token::Keyword(Keyword::True) => Literal::Boolean(true),
            Token::Keyword(Keyword::False) => Literal::Boolean(false),
            t => return Err(Error::Syntax(format!("expected literal, got {}", t))),
        })
    }

    /// Parses an optional WHERE <column> <op> <literal>
    fn parse_where_clause(&mut self) -> Result<Option<Condition>> {
        if self.next_if_token(Token::Keyword(Keyword::Where)).is_none() {
            return Ok(None);
        }
        let column = self.next_ident()?;
        let op = match self.next()? {
            Token::Equal => CompareOp::Equal,
            Token::NotEqual => CompareOp::NotEqual,
            Token::Greater => CompareOp::Greater,
            Token::GreaterEqual => CompareOp::GreaterEqual,
            Token::Less => CompareOp::Less,
            Token::LessEqual => CompareOp::LessEqual,
            t => {
                return Err(Error::Syntax(format!(
                    "expected comparison operator, got {}",
                    t
                )));
            }
        };
        Ok(Some(Condition {
            column,
            op,
            literal: self.parse_literal()?,
        }))
    }

    /// Peeks at the next token
    fn peek(&mut self) -> Result<Option<Token>> {
        self.lexer.peek().cloned().transpose()
    }

    /// Consumes and returns the next token
    fn next(&mut self) -> Result<Token> {
        self.lexer
            .next()
            .unwrap_or_else(|| Err(Error::Syntax("unexpected end of input".to_string())))
    }

    /// Expects and consumes an identifier
    fn next_ident(&mut self) -> Result<String> {
        match self.next()? {
            Token::Ident(ident) => Ok(ident),
            token => Err(Error::Syntax(format!(
                "expected identifier, got {}",
                token
            ))),
        }
    }

    /// Expects a specific token, returns error if different
    fn next_expect(&mut self, expect: Token) -> Result<()> {
        let token = self.next()?;
        if token != expect {
            return Err(Error::Syntax(format!(
                "expected {}, got {}",
                expect, token
            )));
        }
        Ok(())
    }

    /// Consumes next token if it satisfies the predicate
    fn next_if<F: Fn(&Token) -> bool>(&mut self, predicate: F) -> Option<Token> {
        self.peek().unwrap_or(None).filter(|t| predicate(t))?;
        self.next().ok()
    }

    /// Consumes next token if it matches the given token
    fn next_if_token(&mut self, token: Token) -> Option<Token> {
        self.next_if(|t| t == &token)
    }
}

#[cfg(test)]
mod tests {
    use super::Parser;
    use crate::{
        error::{Error, Result},
        sql::{
            parser::ast::{Column, CompareOp, Condition, Literal, Projection, Statement},
            types::DataType,
        },
    };

    fn syntax_error(text: &str) -> bool {
        matches!(Parser::new(text).parse(), Err(Error::Syntax(_)))
    }

    #[test]
    fn test_parser_create_table() -> Result<()> {
        let stmt1 = Parser::new("create table users (name str, age int, score float, ok bool)")
            .parse()?;
        let stmt2 = Parser::new(
            "CREATE   TABLE users(
                name    STR ,
                age int,score Float,
                ok bool
            );",
        )
        .parse()?;
        assert_eq!(stmt1, stmt2);
        assert_eq!(
            stmt1,
            Statement::CreateTable {
                name: "users".to_string(),
                columns: vec![
                    Column { name: "name".to_string(), datatype: DataType::Str },
                    Column { name: "age".to_string(), datatype: DataType::Int },
                    Column { name: "score".to_string(), datatype: DataType::Float },
                    Column { name: "ok".to_string(), datatype: DataType::Bool },
                ],
            }
        );

        assert!(syntax_error("create table t (a text)"));
        assert!(syntax_error("create table t (a int, a str)"));
        assert!(syntax_error("create table t ()"));
        assert!(syntax_error("create table (a int)"));
        assert!(syntax_error("create table t (a int"));
        assert!(syntax_error("create table t (a)"));
        Ok(())
    }

    #[test]
    fn test_parser_drop_list_help_exit() -> Result<()> {
        assert_eq!(
            Parser::new("drop table users;").parse()?,
            Statement::DropTable { name: "users".to_string() }
        );
        assert_eq!(Parser::new("LIST TABLES").parse()?, Statement::ListTables);
        assert_eq!(Parser::new("help").parse()?, Statement::Help);
        assert_eq!(Parser::new("Exit").parse()?, Statement::Exit);
        assert!(syntax_error("list"));
        assert!(syntax_error("drop users"));
        assert!(syntax_error("exit now"));
        assert!(syntax_error(""));
        assert!(syntax_error("vacuum"));
        Ok(())
    }

    #[test]
    fn test_parser_insert() -> Result<()> {
        let stmt = Parser::new(r#"insert into tbl1 values ("John", 25, 1.5, true, 'x')"#).parse()?;
        assert_eq!(
            stmt,
            Statement::Insert {
                table_name: "tbl1".to_string(),
                values: vec![
                    Literal::String("John".to_string()),
                    Literal::Number("25".to_string()),
                    Literal::Number("1.5".to_string()),
                    Literal::Boolean(true),
                    Literal::String("x".to_string()),
                ],
            }
        );

        assert!(syntax_error("insert into t values (1, )"));
        assert!(syntax_error("insert into t values (1 2)"));
        assert!(syntax_error("insert into t values (abc)"));
        assert!(syntax_error("insert into t values ('abc)"));
        assert!(syntax_error("insert into t (1)"));
        Ok(())
    }

    #[test]
    fn test_parser_select() -> Result<()> {
        assert_eq!(
            Parser::new("select * from users;").parse()?,
            Statement::Select {
                table_name: "users".to_string(),
                projection: Projection::All,
                where_clause: None,
            }
        );
        assert_eq!(
            Parser::new("SELECT name, age FROM users WHERE age >= 18").parse()?,
            Statement::Select {
                table_name: "users".to_string(),
                projection: Projection::Columns(vec!["name".to_string(), "age".to_string()]),
                where_clause: Some(Condition {
                    column: "age".to_string(),
                    op: CompareOp::GreaterEqual,
                    literal: Literal::Number("18".to_string()),
                }),
            }
        );

        assert!(syntax_error("select from users"));
        assert!(syntax_error("select * users"));
        assert!(syntax_error("select * from users where"));
        assert!(syntax_error("select * from users where age 18"));
        assert!(syntax_error("select * from users where age > 1 and age < 3"));
        Ok(())
    }

    #[test]
    fn test_parser_update() -> Result<()> {
        let stmt = Parser::new(r#"update users set age=26, name = "Jo" where name = "John""#)
            .parse()?;
        assert_eq!(
            stmt,
            Statement::Update {
                table_name: "users".to_string(),
                assignments: vec![
                    ("age".to_string(), Literal::Number("26".to_string())),
                    ("name".to_string(), Literal::String("Jo".to_string())),
                ],
                where_clause: Some(Condition {
                    column: "name".to_string(),
                    op: CompareOp::Equal,
                    literal: Literal::String("John".to_string()),
                }),
            }
        );

        assert!(syntax_error("update users set age=1, age=2"));
        assert!(syntax_error("update users age=1"));
        assert!(syntax_error("update users set age"));
        Ok(())
    }

    #[test]
    fn test_parser_delete() -> Result<()> {
        let stmt = Parser::new("delete from users").parse()?;
        assert_eq!(
            stmt,
            Statement::Delete {
                table_name: "users".to_string(),
                where_clause: None,
            }
        );
        assert!(stmt.is_destructive());
        assert!(stmt.is_mutating());

        let stmt = Parser::new("DELETE FROM users WHERE age < -1").parse()?;
        assert_eq!(
            stmt,
            Statement::Delete {
                table_name: "users".to_string(),
                where_clause: Some(Condition {
                    column: "age".to_string(),
                    op: CompareOp::Less,
                    literal: Literal::Number("-1".to_string()),
                }),
            }
        );
        assert!(!stmt.is_destructive());
        assert!(syntax_error("delete users"));
        Ok(())
    }
}
