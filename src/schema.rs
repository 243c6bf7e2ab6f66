//! Table schema model: SQL type tags, per-column specs and ordered tables.
//!
//! A [`TableSchema`] is an ordered list of `(name, ColumnSpec)` pairs. Order is
//! authoritative: it fixes both the field order in the native payload and the
//! field IDs in the format file.
//!
//! Schemas can be built in code with [`TableSchema::builder`] or read from a
//! JSON object whose keys are column names, in document order:
//!
//! ```
//! use bcpnative::schema::{SqlType, TableSchema};
//!
//! let schema = TableSchema::from_json(r#"{
//!     "id":   {"type": "INT"},
//!     "name": {"type": "varchar", "max_length": 100}
//! }"#).unwrap();
//!
//! assert_eq!(schema.names().collect::<Vec<_>>(), vec!["id", "name"]);
//! assert_eq!(schema.get("name").unwrap().sql_type, SqlType::VarChar);
//! ```

use crate::error::{BcpError, BcpResult};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// The only DATETIME2 scale the native writer produces.
pub const DATETIME2_SCALE: u8 = 7;

/// Closed set of SQL Server types the native writer can encode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SqlType {
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Bit,
    Real,
    Float,
    Date,
    DateTime2,
    VarChar,
    NVarChar,
    Geometry,
}

impl SqlType {
    /// Every supported tag, in declaration order.
    pub const ALL: [SqlType; 12] = [
        SqlType::TinyInt,
        SqlType::SmallInt,
        SqlType::Int,
        SqlType::BigInt,
        SqlType::Bit,
        SqlType::Real,
        SqlType::Float,
        SqlType::Date,
        SqlType::DateTime2,
        SqlType::VarChar,
        SqlType::NVarChar,
        SqlType::Geometry,
    ];

    /// The T-SQL spelling of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Int => "INT",
            SqlType::BigInt => "BIGINT",
            SqlType::Bit => "BIT",
            SqlType::Real => "REAL",
            SqlType::Float => "FLOAT",
            SqlType::Date => "DATE",
            SqlType::DateTime2 => "DATETIME2",
            SqlType::VarChar => "VARCHAR",
            SqlType::NVarChar => "NVARCHAR",
            SqlType::Geometry => "GEOMETRY",
        }
    }

    /// Variable-length character types, which need a `max_length`.
    pub fn is_character(self) -> bool {
        matches!(self, SqlType::VarChar | SqlType::NVarChar)
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SqlType {
    type Err = BcpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_uppercase();
        SqlType::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .ok_or_else(|| BcpError::schema(format!("unsupported SQL type for bcp: {}", tag)))
    }
}

impl TryFrom<String> for SqlType {
    type Error = BcpError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SqlType> for String {
    fn from(value: SqlType) -> Self {
        value.as_str().to_string()
    }
}

/// Type and sizing of one column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    #[serde(rename = "type")]
    pub sql_type: SqlType,
    /// Declared maximum length; required for VARCHAR/NVARCHAR, absent otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Fractional-seconds scale for DATETIME2. `None` means 7.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u8>,
}

impl ColumnSpec {
    pub fn new(sql_type: SqlType) -> Self {
        Self {
            sql_type,
            max_length: None,
            scale: None,
        }
    }

    pub fn varchar(max_length: u32) -> Self {
        Self::new(SqlType::VarChar).with_max_length(max_length)
    }

    pub fn nvarchar(max_length: u32) -> Self {
        Self::new(SqlType::NVarChar).with_max_length(max_length)
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_scale(mut self, scale: u8) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Check the spec against its type's sizing rules.
    ///
    /// # Errors
    /// [`BcpError::Schema`] when `max_length` is missing (or zero) for a
    /// character type or present for any other type;
    /// [`BcpError::UnsupportedFeature`] for a DATETIME2 scale other than 7.
    pub fn validate(&self, column: &str) -> BcpResult<()> {
        if self.sql_type.is_character() {
            match self.max_length {
                None => {
                    return Err(BcpError::schema(format!(
                        "max_length is required for {} column '{}'",
                        self.sql_type, column
                    )));
                }
                Some(0) => {
                    return Err(BcpError::schema(format!(
                        "max_length must be positive for {} column '{}'",
                        self.sql_type, column
                    )));
                }
                Some(_) => {}
            }
        } else if self.max_length.is_some() {
            return Err(BcpError::schema(format!(
                "max_length is only valid for character columns, not {} column '{}'",
                self.sql_type, column
            )));
        }

        if let Some(scale) = self.scale {
            if self.sql_type != SqlType::DateTime2 {
                return Err(BcpError::schema(format!(
                    "scale is only valid for DATETIME2, not {} column '{}'",
                    self.sql_type, column
                )));
            }
            if scale != DATETIME2_SCALE {
                return Err(BcpError::unsupported(format!(
                    "DATETIME2({}) on column '{}': only scale {} is supported",
                    scale, column, DATETIME2_SCALE
                )));
            }
        }
        Ok(())
    }
}

impl From<SqlType> for ColumnSpec {
    fn from(sql_type: SqlType) -> Self {
        ColumnSpec::new(sql_type)
    }
}

/// Ordered mapping of column name to [`ColumnSpec`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableSchema {
    columns: Vec<(String, ColumnSpec)>,
}

impl TableSchema {
    /// Start a fluent builder; validation happens in [`SchemaBuilder::build`].
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Build a schema from ordered pairs and validate it.
    ///
    /// # Errors
    /// See [`TableSchema::validate`].
    pub fn from_columns<I, S>(columns: I) -> BcpResult<Self>
    where
        I: IntoIterator<Item = (S, ColumnSpec)>,
        S: Into<String>,
    {
        let schema = Self {
            columns: columns.into_iter().map(|(n, s)| (n.into(), s)).collect(),
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Parse and validate a JSON schema document.
    ///
    /// Unknown type tags and duplicate keys come back as [`BcpError::Schema`]
    /// inside the `anyhow::Error`; only malformed JSON does not.
    ///
    /// # Errors
    /// Returns an error for malformed JSON, unknown type tags, duplicate keys,
    /// or anything [`TableSchema::validate`] rejects.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let raw: RawColumns = serde_json::from_str(json)?;
        Ok(Self::from_columns(raw.into_columns()?)?)
    }

    /// Check every column spec and the uniqueness of column names.
    ///
    /// # Errors
    /// [`BcpError::Schema`] for an empty schema, duplicate names or a bad spec;
    /// [`BcpError::UnsupportedFeature`] for an unsupported DATETIME2 scale.
    pub fn validate(&self) -> BcpResult<()> {
        if self.columns.is_empty() {
            return Err(BcpError::schema("schema has no columns"));
        }
        let mut seen = HashSet::with_capacity(self.columns.len());
        for (name, spec) in &self.columns {
            if !seen.insert(name.as_str()) {
                return Err(BcpError::schema(format!("duplicate column name '{}'", name)));
            }
            spec.validate(name)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns in schema order.
    pub fn columns(&self) -> &[(String, ColumnSpec)] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnSpec)> {
        self.columns.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }
}

/// Fluent builder for [`TableSchema`].
#[derive(Clone, Debug, Default)]
pub struct SchemaBuilder {
    columns: Vec<(String, ColumnSpec)>,
}

impl SchemaBuilder {
    pub fn column(mut self, name: impl Into<String>, spec: impl Into<ColumnSpec>) -> Self {
        self.columns.push((name.into(), spec.into()));
        self
    }

    /// # Errors
    /// See [`TableSchema::validate`].
    pub fn build(self) -> BcpResult<TableSchema> {
        TableSchema::from_columns(self.columns)
    }
}

impl Serialize for TableSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, spec) in &self.columns {
            map.serialize_entry(name, spec)?;
        }
        map.end()
    }
}

/// A column entry as written in a schema document, type tag still unparsed.
#[derive(Deserialize)]
struct RawColumn {
    #[serde(rename = "type")]
    sql_type: String,
    #[serde(default)]
    max_length: Option<u32>,
    #[serde(default)]
    scale: Option<u8>,
}

/// Schema document entries in document order, duplicates included.
struct RawColumns(Vec<(String, RawColumn)>);

impl RawColumns {
    fn into_columns(self) -> BcpResult<Vec<(String, ColumnSpec)>> {
        self.0
            .into_iter()
            .map(|(name, raw)| -> BcpResult<(String, ColumnSpec)> {
                let spec = ColumnSpec {
                    sql_type: raw.sql_type.parse()?,
                    max_length: raw.max_length,
                    scale: raw.scale,
                };
                Ok((name, spec))
            })
            .collect()
    }
}

impl<'de> Deserialize<'de> for RawColumns {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ColumnsVisitor;

        impl<'de> Visitor<'de> for ColumnsVisitor {
            type Value = RawColumns;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column name to column spec")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RawColumns, A::Error> {
                let mut columns = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, RawColumn>()? {
                    columns.push(entry);
                }
                Ok(RawColumns(columns))
            }
        }

        deserializer.deserialize_map(ColumnsVisitor)
    }
}

/// Keeps document order and rejects unknown tags and duplicate names, but
/// leaves sizing rules to [`TableSchema::validate`].
impl<'de> Deserialize<'de> for TableSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let columns = RawColumns::deserialize(deserializer)?
            .into_columns()
            .map_err(<D::Error as serde::de::Error>::custom)?;
        let duplicate = {
            let mut seen = HashSet::with_capacity(columns.len());
            columns
                .iter()
                .map(|(n, _)| n.as_str())
                .find(|n| !seen.insert(*n))
                .map(str::to_string)
        };
        if let Some(name) = duplicate {
            return Err(<D::Error as serde::de::Error>::custom(format!(
                "duplicate column name '{}'",
                name
            )));
        }
        Ok(TableSchema { columns })
    }
}
