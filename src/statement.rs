//! Statement parsing.
//!
//! Translates one raw statement line into a structured
//! [`Request`](crate::protocol::Request) for the engine. This is the only
//! place raw statement text is interpreted; everything past this boundary
//! works with typed requests and conditions.
//!
//! Supported statements (keywords are case-insensitive, names and values are
//! case-preserving, values may be single-quoted, a trailing `;` is ignored):
//!
//! ```text
//! CREATE DATABASE <name>
//! CREATE TABLE <name> [( <col> [, <col>]* )]
//! USE [DATABASE] <name>
//! DROP DATABASE <name> | DROP TABLE <name>
//! INSERT INTO <table> VALUES ( <value> [, <value>]* )
//! SELECT * | <col> [, <col>]* FROM <table> [WHERE <condition>]
//! UPDATE <table> SET <col> = <value> [WHERE <condition>]
//! DELETE FROM <table> [WHERE <condition>]
//! ALTER TABLE <table> ADD|DROP [COLUMN] <col>
//! ```
//!
//! Conditions are comparison clauses (`==`, `!=`, `>`, `<`, `>=`, `<=`)
//! combined left-associatively with `AND`/`OR`; parentheses group.
use thiserror::Error;

use crate::{
    protocol::request::{Alteration, Request},
    storage::{Comparison, Condition},
};

/// List of possible errors raised while parsing a statement.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatementError {
    #[error("empty statement")]
    Empty,

    #[error("unsupported statement '{0}'")]
    Unsupported(String),

    #[error("expected '{expected}', found '{found}'")]
    Expected { expected: String, found: String },

    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),

    #[error("unexpected end of statement")]
    UnexpectedEnd,

    #[error("unterminated quoted value")]
    UnterminatedQuote,

    #[error("unknown comparison operator '{0}'")]
    UnknownOperator(String),
}

impl TryFrom<&str> for Request {
    type Error = StatementError;

    fn try_from(input: &str) -> Result<Self, Self::Error> {
        let mut tokens = tokenize(input)?;
        if tokens.finished() {
            return Err(StatementError::Empty);
        }

        let keyword = tokens.next()?;
        let request = match keyword.to_uppercase().as_str() {
            "CREATE" => create(&mut tokens)?,
            "USE" => use_database(&mut tokens)?,
            "DROP" => drop_structure(&mut tokens)?,
            "INSERT" => insert(&mut tokens)?,
            "SELECT" => select(&mut tokens)?,
            "UPDATE" => update(&mut tokens)?,
            "DELETE" => delete(&mut tokens)?,
            "ALTER" => alter(&mut tokens)?,
            _ => return Err(StatementError::Unsupported(keyword)),
        };

        match tokens.peek() {
            Some(extra) => Err(StatementError::UnexpectedToken(extra.to_string())),
            None => Ok(request),
        }
    }
}

fn create(tokens: &mut Tokens) -> Result<Request, StatementError> {
    let kind = tokens.next()?;
    if kind.eq_ignore_ascii_case("DATABASE") {
        Ok(Request::CreateDatabase {
            name: tokens.next()?,
        })
    } else if kind.eq_ignore_ascii_case("TABLE") {
        let name = tokens.next()?;
        let columns = if tokens.accept("(") {
            list(tokens)?
        } else {
            Vec::new()
        };
        Ok(Request::CreateTable { name, columns })
    } else {
        Err(StatementError::UnexpectedToken(kind))
    }
}

fn use_database(tokens: &mut Tokens) -> Result<Request, StatementError> {
    tokens.accept("DATABASE");
    Ok(Request::UseDatabase {
        name: tokens.next()?,
    })
}

fn drop_structure(tokens: &mut Tokens) -> Result<Request, StatementError> {
    let kind = tokens.next()?;
    let name = tokens.next()?;
    if kind.eq_ignore_ascii_case("DATABASE") {
        Ok(Request::DropDatabase { name })
    } else if kind.eq_ignore_ascii_case("TABLE") {
        Ok(Request::DropTable { name })
    } else {
        Err(StatementError::UnexpectedToken(kind))
    }
}

fn insert(tokens: &mut Tokens) -> Result<Request, StatementError> {
    tokens.keyword("INTO")?;
    let table = tokens.next()?;
    tokens.keyword("VALUES")?;
    tokens.keyword("(")?;
    let values = list(tokens)?;
    Ok(Request::Insert { table, values })
}

fn select(tokens: &mut Tokens) -> Result<Request, StatementError> {
    let columns = if tokens.accept("*") {
        None
    } else {
        let mut columns = vec![tokens.next()?];
        while tokens.accept(",") {
            columns.push(tokens.next()?);
        }
        Some(columns)
    };
    tokens.keyword("FROM")?;
    let table = tokens.next()?;
    let filter = where_clause(tokens)?;
    Ok(Request::Select {
        table,
        columns,
        filter,
    })
}

fn update(tokens: &mut Tokens) -> Result<Request, StatementError> {
    let table = tokens.next()?;
    tokens.keyword("SET")?;
    let column = tokens.next()?;
    let assign = tokens.next()?;
    if assign != "=" && assign != "==" {
        return Err(StatementError::Expected {
            expected: "=".to_string(),
            found: assign,
        });
    }
    let value = tokens.next()?;
    let filter = where_clause(tokens)?;
    Ok(Request::Update {
        table,
        column,
        value,
        filter,
    })
}

fn delete(tokens: &mut Tokens) -> Result<Request, StatementError> {
    tokens.keyword("FROM")?;
    let table = tokens.next()?;
    let filter = where_clause(tokens)?;
    Ok(Request::Delete { table, filter })
}

fn alter(tokens: &mut Tokens) -> Result<Request, StatementError> {
    tokens.keyword("TABLE")?;
    let table = tokens.next()?;
    let action = tokens.next()?;
    tokens.accept("COLUMN");
    let column = tokens.next()?;
    let alteration = if action.eq_ignore_ascii_case("ADD") {
        Alteration::Add(column)
    } else if action.eq_ignore_ascii_case("DROP") {
        Alteration::Drop(column)
    } else {
        return Err(StatementError::UnexpectedToken(action));
    };
    Ok(Request::Alter { table, alteration })
}

fn where_clause(tokens: &mut Tokens) -> Result<Option<Condition>, StatementError> {
    if tokens.accept("WHERE") {
        Ok(Some(condition(tokens)?))
    } else {
        Ok(None)
    }
}

fn condition(tokens: &mut Tokens) -> Result<Condition, StatementError> {
    let mut left = clause(tokens)?;
    loop {
        if tokens.accept("AND") {
            left = Condition::And(Box::new(left), Box::new(clause(tokens)?));
        } else if tokens.accept("OR") {
            left = Condition::Or(Box::new(left), Box::new(clause(tokens)?));
        } else {
            return Ok(left);
        }
    }
}

fn clause(tokens: &mut Tokens) -> Result<Condition, StatementError> {
    if tokens.accept("(") {
        let inner = condition(tokens)?;
        tokens.keyword(")")?;
        return Ok(inner);
    }
    let column = tokens.next()?;
    let op = comparison(&tokens.next()?)?;
    let value = tokens.next()?;
    Ok(Condition::Compare { column, op, value })
}

fn comparison(token: &str) -> Result<Comparison, StatementError> {
    match token {
        "==" | "=" => Ok(Comparison::Eq),
        "!=" => Ok(Comparison::NotEq),
        ">" => Ok(Comparison::Gt),
        "<" => Ok(Comparison::Lt),
        ">=" => Ok(Comparison::Ge),
        "<=" => Ok(Comparison::Le),
        _ => Err(StatementError::UnknownOperator(token.to_string())),
    }
}

/// Comma-separated names or values, consumed up to the closing parenthesis.
fn list(tokens: &mut Tokens) -> Result<Vec<String>, StatementError> {
    let mut items = Vec::new();
    if tokens.accept(")") {
        return Ok(items);
    }
    loop {
        items.push(tokens.next()?);
        if tokens.accept(")") {
            return Ok(items);
        }
        tokens.keyword(",")?;
    }
}

struct Tokens {
    items: Vec<String>,
    position: usize,
}

impl Tokens {
    fn next(&mut self) -> Result<String, StatementError> {
        let item = self
            .items
            .get(self.position)
            .cloned()
            .ok_or(StatementError::UnexpectedEnd)?;
        self.position += 1;
        Ok(item)
    }

    fn peek(&self) -> Option<&str> {
        self.items.get(self.position).map(String::as_str)
    }

    /// Consumes the next token if it matches `keyword` case-insensitively.
    fn accept(&mut self, keyword: &str) -> bool {
        if self.peek().is_some_and(|t| t.eq_ignore_ascii_case(keyword)) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn keyword(&mut self, expected: &str) -> Result<(), StatementError> {
        let found = self.next()?;
        if found.eq_ignore_ascii_case(expected) {
            Ok(())
        } else {
            Err(StatementError::Expected {
                expected: expected.to_string(),
                found,
            })
        }
    }

    fn finished(&self) -> bool {
        self.position >= self.items.len()
    }
}

const OPERATOR_CHARS: [char; 4] = ['=', '!', '<', '>'];

fn tokenize(input: &str) -> Result<Tokens, StatementError> {
    let mut items = Vec::new();
    let mut word = String::new();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            c if c.is_whitespace() => flush(&mut word, &mut items),
            ';' => flush(&mut word, &mut items),
            '\'' => {
                flush(&mut word, &mut items);
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => value.push(c),
                        None => return Err(StatementError::UnterminatedQuote),
                    }
                }
                items.push(value);
            }
            '(' | ')' | ',' => {
                flush(&mut word, &mut items);
                items.push(ch.to_string());
            }
            c if OPERATOR_CHARS.contains(&c) => {
                flush(&mut word, &mut items);
                let mut operator = String::from(c);
                while let Some(&next) = chars.peek() {
                    if OPERATOR_CHARS.contains(&next) {
                        operator.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                items.push(operator);
            }
            c => word.push(c),
        }
    }
    flush(&mut word, &mut items);

    Ok(Tokens { items, position: 0 })
}

fn flush(word: &mut String, items: &mut Vec<String>) {
    if !word.is_empty() {
        items.push(std::mem::take(word));
    }
}
