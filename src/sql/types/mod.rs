use std::{cmp::Ordering, fmt::Display};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    sql::parser::ast::{CompareOp, Literal},
};

/// Column data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Int,
    Float,
    Str,
    Bool,
}

impl DataType {
    /// Looks up a type by its name in a column definition
    pub fn from_name(name: &str) -> Option<DataType> {
        Some(match name.to_lowercase().as_ref() {
            "int" => DataType::Int,
            "float" => DataType::Float,
            "str" => DataType::Str,
            "bool" => DataType::Bool,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Str => "str",
            DataType::Bool => "bool",
        }
    }

    /// Whether `>`, `<`, `>=` and `<=` are defined for values of this type
    pub fn is_ordered(&self) -> bool {
        matches!(self, DataType::Int | DataType::Float)
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed scalar stored in a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Value {
    /// Converts a raw literal into a value of the `target` type.
    ///
    /// The literal's lexical form has to fit the type: only quoted strings become `str`,
    /// only `true`/`false` become `bool`, and a decimal number is never an `int`.
    /// Integer literals are accepted for `float` columns.
    pub fn coerce(literal: &Literal, target: DataType) -> Result<Value> {
        let mismatch = || Error::Type(format!("value {} cannot be cast to {}", literal, target));
        match (literal, target) {
            (Literal::String(s), DataType::Str) => Ok(Value::Str(s.clone())),
            (Literal::Boolean(b), DataType::Bool) => Ok(Value::Bool(*b)),
            (Literal::Number(n), DataType::Int) if !n.contains('.') => n
                .parse()
                .map(Value::Int)
                .map_err(|_| Error::Type(format!("value {} is out of range for int", n))),
            (Literal::Number(n), DataType::Float) => {
                n.parse().map(Value::Float).map_err(|_| mismatch())
            }
            _ => Err(mismatch()),
        }
    }

    /// Evaluates `self <op> other`.
    ///
    /// Both sides must share a type, except that `int` and `float` compare numerically.
    /// Ordering operators are only defined for numbers.
    pub fn compare(&self, other: &Value, op: CompareOp) -> Result<bool> {
        let ordering = match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Str(a), Value::Str(b)) => {
                op.check(DataType::Str)?;
                Some(a.cmp(b))
            }
            (Value::Bool(a), Value::Bool(b)) => {
                op.check(DataType::Bool)?;
                Some(a.cmp(b))
            }
            (a, b) => {
                return Err(Error::Type(format!(
                    "cannot compare {} with {}",
                    a.datatype(),
                    b.datatype()
                )));
            }
        };
        Ok(match ordering {
            Some(o) => op.matches(o),
            None => op == CompareOp::NotEqual,
        })
    }

    pub fn datatype(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Float(_) => DataType::Float,
            Value::Str(_) => DataType::Str,
            Value::Bool(_) => DataType::Bool,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl CompareOp {
    /// Fails when the operator has no meaning for values of `datatype`
    pub fn check(&self, datatype: DataType) -> Result<()> {
        if self.is_ordering() && !datatype.is_ordered() {
            return Err(Error::Type(format!(
                "operator {} is not defined for {}",
                self, datatype
            )));
        }
        Ok(())
    }

    fn matches(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Equal => ordering == Ordering::Equal,
            CompareOp::NotEqual => ordering != Ordering::Equal,
            CompareOp::Greater => ordering == Ordering::Greater,
            CompareOp::Less => ordering == Ordering::Less,
            CompareOp::GreaterEqual => ordering != Ordering::Less,
            CompareOp::LessEqual => ordering != Ordering::Greater,
        }
    }
}

/// A row holds one value per table column, in schema order
pub type Row = Vec<Value>;

#[cfg(test)]
mod tests {
    use super::{DataType, Value};
    use crate::{
        error::{Error, Result},
        sql::parser::ast::{CompareOp, Literal},
    };

    fn number(n: &str) -> Literal {
        Literal::Number(n.to_string())
    }

    #[test]
    fn test_coerce_matching_forms() -> Result<()> {
        assert_eq!(Value::coerce(&number("42"), DataType::Int)?, Value::Int(42));
        assert_eq!(Value::coerce(&number("-7"), DataType::Int)?, Value::Int(-7));
        assert_eq!(Value::coerce(&number("2.5"), DataType::Float)?, Value::Float(2.5));
        assert_eq!(Value::coerce(&number("3"), DataType::Float)?, Value::Float(3.0));
        assert_eq!(
            Value::coerce(&Literal::String("abc".into()), DataType::Str)?,
            Value::Str("abc".into())
        );
        assert_eq!(
            Value::coerce(&Literal::Boolean(false), DataType::Bool)?,
            Value::Bool(false)
        );
        Ok(())
    }

    #[test]
    fn test_coerce_mismatch() {
        let cases = vec![
            (Literal::String("abc".into()), DataType::Int),
            (Literal::String("5".into()), DataType::Int),
            (number("1.5"), DataType::Int),
            (number("1"), DataType::Str),
            (number("1"), DataType::Bool),
            (Literal::Boolean(true), DataType::Str),
            (Literal::Boolean(true), DataType::Float),
        ];
        for (literal, target) in cases {
            assert!(
                matches!(Value::coerce(&literal, target), Err(Error::Type(_))),
                "{} should not coerce to {}",
                literal,
                target
            );
        }
        assert!(matches!(
            Value::coerce(&number("99999999999999999999"), DataType::Int),
            Err(Error::Type(_))
        ));
    }

    #[test]
    fn test_compare_numbers() -> Result<()> {
        let five = Value::Int(5);
        assert!(five.compare(&Value::Int(5), CompareOp::Equal)?);
        assert!(five.compare(&Value::Int(3), CompareOp::Greater)?);
        assert!(five.compare(&Value::Int(5), CompareOp::GreaterEqual)?);
        assert!(!five.compare(&Value::Int(5), CompareOp::Less)?);
        assert!(five.compare(&Value::Int(9), CompareOp::LessEqual)?);
        assert!(five.compare(&Value::Int(9), CompareOp::NotEqual)?);
        assert!(five.compare(&Value::Float(5.5), CompareOp::Less)?);
        assert!(Value::Float(1.5).compare(&Value::Float(1.5), CompareOp::Equal)?);
        Ok(())
    }

    #[test]
    fn test_compare_strings_and_bools() -> Result<()> {
        let s = Value::Str("a".into());
        assert!(s.compare(&Value::Str("a".into()), CompareOp::Equal)?);
        assert!(s.compare(&Value::Str("b".into()), CompareOp::NotEqual)?);
        assert!(matches!(
            s.compare(&Value::Str("b".into()), CompareOp::Less),
            Err(Error::Type(_))
        ));
        assert!(Value::Bool(true).compare(&Value::Bool(true), CompareOp::Equal)?);
        assert!(matches!(
            Value::Bool(true).compare(&Value::Bool(false), CompareOp::Greater),
            Err(Error::Type(_))
        ));
        Ok(())
    }

    #[test]
    fn test_compare_mismatched_types() {
        assert!(matches!(
            Value::Int(1).compare(&Value::Str("1".into()), CompareOp::Equal),
            Err(Error::Type(_))
        ));
        assert!(matches!(
            Value::Bool(true).compare(&Value::Int(1), CompareOp::NotEqual),
            Err(Error::Type(_))
        ));
    }
}
