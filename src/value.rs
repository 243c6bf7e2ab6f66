//! Scalar values and rows handed to the encoders.
//!
//! Null is not a [`Value`]: a row stores `Option<Value>` per column, and
//! `None` is the explicit null. A column that is absent from a row is a
//! different thing (a schema error), see [`Row::lookup`].

use anyhow::{Result, anyhow, bail};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::fmt;

/// A non-null scalar.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
        }
    }

    /// Convert a JSON scalar. `null` maps to `Ok(None)`.
    ///
    /// # Errors
    /// Arrays and objects have no scalar meaning and are rejected.
    pub fn from_json(json: serde_json::Value) -> Result<Option<Value>> {
        use serde_json::Value as J;
        Ok(match json {
            J::Null => None,
            J::Bool(b) => Some(Value::Bool(b)),
            J::Number(n) => match n.as_i64() {
                Some(i) => Some(Value::Int(i)),
                None => Some(Value::Float(
                    n.as_f64()
                        .ok_or_else(|| anyhow!("number {} is not representable", n))?,
                )),
            },
            J::String(s) => Some(Value::Text(s)),
            J::Array(_) => bail!("arrays are not scalar values"),
            J::Object(_) => bail!("objects are not scalar values"),
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::Bytes(b) => f.write_str(&hex::encode_upper(b)),
            Value::Date(d) => write!(f, "{}", d),
            Value::DateTime(dt) => write!(f, "{}", dt),
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident as $conv:ty),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(<$conv>::from(v))
                }
            }
        )*
    };
}

value_from! {
    bool => Bool as bool,
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => Int as i64,
    u16 => Int as i64,
    u32 => Int as i64,
    f32 => Float as f64,
    f64 => Float as f64,
    String => Text as String,
    &str => Text as String,
    Vec<u8> => Bytes as Vec<u8>,
    &[u8] => Bytes as Vec<u8>,
    NaiveDate => Date as NaiveDate,
    NaiveDateTime => DateTime as NaiveDateTime,
}

/// One row of input: column name to value, where `None` is SQL NULL.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    values: HashMap<String, Option<Value>>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for a non-null value.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, Some(value.into()));
        self
    }

    /// Builder-style setter for an explicit null.
    pub fn with_null(mut self, column: impl Into<String>) -> Self {
        self.set(column, None);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: Option<Value>) {
        self.values.insert(column.into(), value);
    }

    /// Resolve a column.
    ///
    /// Returns `None` when the row does not mention the column at all,
    /// `Some(None)` for an explicit null and `Some(Some(v))` for a value.
    pub fn lookup(&self, column: &str) -> Option<Option<&Value>> {
        self.values.get(column).map(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a row from a JSON object.
    ///
    /// # Errors
    /// Fails when `json` is not an object or a member is not a scalar.
    pub fn from_json(json: serde_json::Value) -> Result<Row> {
        let serde_json::Value::Object(map) = json else {
            bail!("expected a JSON object per row");
        };
        let mut row = Row::new();
        for (k, v) in map {
            let value = Value::from_json(v).map_err(|e| anyhow!("column '{}': {}", k, e))?;
            row.set(k, value);
        }
        Ok(row)
    }
}

impl<K: Into<String>> FromIterator<(K, Option<Value>)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Option<Value>)>>(iter: I) -> Self {
        Row {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
