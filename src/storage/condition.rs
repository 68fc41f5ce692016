use std::cmp::Ordering;

use super::{error::TableError, row::Row};

/// Comparison operator of a single predicate clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    NotEq,
    Gt,
    Lt,
    Ge,
    Le,
}

/// Predicate over a single row.
///
/// Built by the statement layer from a WHERE clause; storage only ever calls
/// [`Condition::matches`]. Clauses compose with `And`/`Or`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Compare {
        column: String,
        op: Comparison,
        value: String,
    },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

impl Condition {
    /// Shorthand for an equality clause.
    pub fn equals(column: &str, value: &str) -> Self {
        Condition::Compare {
            column: column.to_string(),
            op: Comparison::Eq,
            value: value.to_string(),
        }
    }

    /// Evaluates the predicate against `row`. Referencing a column the row
    /// does not have is an error, not a non-match.
    pub fn matches(&self, row: &Row) -> Result<bool, TableError> {
        match self {
            Condition::Compare { column, op, value } => {
                Ok(compare(row.get(column)?, *op, value))
            }
            Condition::And(left, right) => Ok(left.matches(row)? && right.matches(row)?),
            Condition::Or(left, right) => Ok(left.matches(row)? || right.matches(row)?),
        }
    }
}

/// Equality is plain string equality. Ordering operators compare numerically
/// when both operands parse as numbers, byte-wise otherwise.
fn compare(stored: &str, op: Comparison, value: &str) -> bool {
    match op {
        Comparison::Eq => return stored == value,
        Comparison::NotEq => return stored != value,
        _ => {}
    }

    let ordering = match (stored.parse::<f64>(), value.parse::<f64>()) {
        (Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => stored.cmp(value),
    };

    match op {
        Comparison::Gt => ordering == Ordering::Greater,
        Comparison::Lt => ordering == Ordering::Less,
        Comparison::Ge => ordering != Ordering::Less,
        Comparison::Le => ordering != Ordering::Greater,
        Comparison::Eq | Comparison::NotEq => unreachable!("handled above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        let mut row = Row::new();
        row.add_column("name").unwrap();
        row.add_column("age").unwrap();
        row.set("name", "alice").unwrap();
        row.set("age", "30").unwrap();
        row
    }

    fn clause(column: &str, op: Comparison, value: &str) -> Condition {
        Condition::Compare {
            column: column.to_string(),
            op,
            value: value.to_string(),
        }
    }

    #[test]
    fn equality() {
        let row = row();
        assert!(Condition::equals("name", "alice").matches(&row).unwrap());
        assert!(!Condition::equals("name", "bob").matches(&row).unwrap());
        assert!(clause("name", Comparison::NotEq, "bob").matches(&row).unwrap());
    }

    #[test]
    fn numeric_ordering() {
        let row = row();
        assert!(clause("age", Comparison::Gt, "25").matches(&row).unwrap());
        // "9" < "30" numerically even though "9" sorts after "30" byte-wise.
        assert!(clause("age", Comparison::Gt, "9").matches(&row).unwrap());
        assert!(clause("age", Comparison::Ge, "30").matches(&row).unwrap());
        assert!(!clause("age", Comparison::Lt, "30").matches(&row).unwrap());
    }

    #[test]
    fn lexicographic_fallback() {
        let row = row();
        assert!(clause("name", Comparison::Lt, "bob").matches(&row).unwrap());
        assert!(clause("name", Comparison::Le, "alice").matches(&row).unwrap());
    }

    #[test]
    fn boolean_composition() {
        let row = row();
        let both = Condition::And(
            Box::new(Condition::equals("name", "alice")),
            Box::new(clause("age", Comparison::Gt, "25")),
        );
        assert!(both.matches(&row).unwrap());

        let either = Condition::Or(
            Box::new(Condition::equals("name", "bob")),
            Box::new(Condition::equals("age", "30")),
        );
        assert!(either.matches(&row).unwrap());

        let neither = Condition::And(
            Box::new(Condition::equals("name", "bob")),
            Box::new(Condition::equals("age", "30")),
        );
        assert!(!neither.matches(&row).unwrap());
    }

    #[test]
    fn unknown_column_is_an_error() {
        let row = row();
        assert_eq!(
            Condition::equals("email", "a@b.c").matches(&row),
            Err(TableError::UnknownColumn("email".to_string()))
        );
    }
}
