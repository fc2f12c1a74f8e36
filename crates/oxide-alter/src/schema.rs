//! Schema representation types.
//!
//! These types describe the structure of a single table: its columns,
//! indexes, foreign keys and table-level options. They are used both for
//! the introspected ("original") shape of a table and for the desired
//! ("pending") shape a caller builds up through a
//! [`TablePlanner`](crate::planner::TablePlanner).
//!
//! Every option is optional. An option left unset means "not specified",
//! which is how sparse desired definitions compare equal to fully
//! introspected ones (see [`crate::compare`]).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name of the index that denotes a table's primary key.
pub const PRIMARY_KEY: &str = "PRIMARY";

/// SQL column types understood by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Tiny integer (8-bit).
    TinyInt,
    /// Small integer (16-bit).
    SmallInt,
    /// Integer (32-bit).
    Integer,
    /// Big integer (64-bit).
    BigInt,
    /// Decimal with precision and scale.
    Decimal,
    /// Floating point (single precision).
    Float,
    /// Floating point (double precision).
    Double,
    /// Boolean.
    Boolean,
    /// Fixed-length character string.
    Char,
    /// Variable-length character string.
    Varchar,
    /// Unbounded text.
    Text,
    /// Binary large object.
    Blob,
    /// Fixed-length binary data.
    Binary,
    /// Variable-length binary data.
    VarBinary,
    /// Date only.
    Date,
    /// Time only.
    Time,
    /// Date and time.
    DateTime,
    /// Timestamp.
    Timestamp,
    /// JSON data.
    Json,
    /// UUID.
    Uuid,
}

impl ColumnType {
    /// Returns true for the integer family.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::TinyInt | Self::SmallInt | Self::Integer | Self::BigInt
        )
    }

    /// Returns true if the type carries a length (or display width).
    #[must_use]
    pub fn supports_length(&self) -> bool {
        self.is_integer()
            || matches!(
                self,
                Self::Char | Self::Varchar | Self::Binary | Self::VarBinary
            )
    }

    /// Returns true if the type carries precision and scale.
    #[must_use]
    pub fn supports_precision(&self) -> bool {
        matches!(self, Self::Decimal | Self::Float | Self::Double)
    }

    /// Returns true if the type can be unsigned.
    #[must_use]
    pub fn supports_unsigned(&self) -> bool {
        self.is_integer() || self.supports_precision()
    }

    /// Returns true if the type stores text and so has a charset/collation.
    #[must_use]
    pub fn supports_charset(&self) -> bool {
        matches!(self, Self::Char | Self::Varchar | Self::Text)
    }
}

/// Default value for a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// A literal value, quoted when rendered.
    Literal(String),
    /// SQL expression (e.g., "CURRENT_TIMESTAMP"), rendered verbatim.
    Expression(String),
}

impl DefaultValue {
    /// Returns the SQL representation of this default value.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Literal(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Expression(expr) => expr.clone(),
        }
    }
}

/// Options describing a column. Unset options are "not specified".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOptions {
    /// SQL data type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<ColumnType>,
    /// Length or display width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    /// Numeric precision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// Numeric scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    /// Whether the column allows NULL values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Whether a numeric column is unsigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsigned: Option<bool>,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    /// Whether this column auto-increments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<bool>,
    /// Column comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Character set (text columns only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    /// Collation (text columns only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
}

impl ColumnOptions {
    /// Creates options for a column of the given type.
    #[must_use]
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column_type: Some(column_type),
            ..Self::default()
        }
    }

    /// Sets the column type.
    #[must_use]
    pub fn column_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = Some(column_type);
        self
    }

    /// Sets the length.
    #[must_use]
    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets the numeric precision.
    #[must_use]
    pub fn precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Sets the numeric scale.
    #[must_use]
    pub fn scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = Some(false);
        self
    }

    /// Sets the column as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = Some(true);
        self
    }

    /// Sets the column as unsigned.
    #[must_use]
    pub fn unsigned(mut self) -> Self {
        self.unsigned = Some(true);
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets the column to auto-increment.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = Some(true);
        self
    }

    /// Sets the comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the character set.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Sets the collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Returns true if the column accepts NULL. Unspecified means nullable.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable.unwrap_or(true)
    }

    /// Returns true if the column auto-increments.
    #[must_use]
    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment.unwrap_or(false)
    }

    /// Clears every option the column type cannot carry.
    ///
    /// Options of a column without a type are left alone: a sparse change
    /// is normalized once it has been merged onto a typed column.
    pub fn normalize(&mut self) {
        let Some(column_type) = self.column_type else {
            return;
        };
        if !column_type.supports_length() {
            self.length = None;
        }
        if !column_type.supports_precision() {
            self.precision = None;
            self.scale = None;
        }
        if !column_type.supports_unsigned() {
            self.unsigned = None;
        }
        if !column_type.supports_charset() {
            self.charset = None;
            self.collation = None;
        }
        if !column_type.is_integer() {
            self.auto_increment = None;
        }
    }

    /// Returns the normalized options.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Merges `changes` over these options.
    ///
    /// Every option set in `changes` replaces the current value. When the
    /// type changes, length, precision and scale are reset first, so they
    /// only survive if `changes` supplies them again.
    pub fn merge(&mut self, changes: Self) {
        let Self {
            column_type,
            length,
            precision,
            scale,
            nullable,
            unsigned,
            default,
            auto_increment,
            comment,
            charset,
            collation,
        } = changes;

        if column_type.is_some() && column_type != self.column_type {
            self.length = None;
            self.precision = None;
            self.scale = None;
        }

        overlay(&mut self.column_type, column_type);
        overlay(&mut self.length, length);
        overlay(&mut self.precision, precision);
        overlay(&mut self.scale, scale);
        overlay(&mut self.nullable, nullable);
        overlay(&mut self.unsigned, unsigned);
        overlay(&mut self.default, default);
        overlay(&mut self.auto_increment, auto_increment);
        overlay(&mut self.comment, comment);
        overlay(&mut self.charset, charset);
        overlay(&mut self.collation, collation);

        self.normalize();
    }
}

fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Column options.
    #[serde(flatten)]
    pub options: ColumnOptions,
}

impl Column {
    /// Creates a column, normalizing its options.
    #[must_use]
    pub fn new(name: impl Into<String>, options: ColumnOptions) -> Self {
        Self {
            name: name.into(),
            options: options.normalized(),
        }
    }
}

/// Index method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMethod {
    /// B-tree index (default).
    #[default]
    BTree,
    /// Hash index.
    Hash,
    /// Full-text index.
    FullText,
    /// Spatial index.
    Spatial,
}

/// Options describing an index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Indexed columns, in index order.
    pub columns: Vec<String>,
    /// Whether the index enforces uniqueness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    /// Whether the index is the primary key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    /// Index method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<IndexMethod>,
}

impl IndexOptions {
    /// Creates options for an index over the given columns.
    #[must_use]
    pub fn on<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Makes this a unique index.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = Some(true);
        self
    }

    /// Makes this the primary key.
    #[must_use]
    pub fn primary(mut self) -> Self {
        self.primary = Some(true);
        self.unique = Some(true);
        self
    }

    /// Sets the index method.
    #[must_use]
    pub fn method(mut self, method: IndexMethod) -> Self {
        self.method = Some(method);
        self
    }
}

/// An index definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Index options.
    #[serde(flatten)]
    pub options: IndexOptions,
}

impl Index {
    /// Creates an index. The [`PRIMARY_KEY`] name forces a unique primary
    /// index.
    #[must_use]
    pub fn new(name: impl Into<String>, options: IndexOptions) -> Self {
        let name = name.into();
        let options = if name == PRIMARY_KEY {
            options.primary()
        } else {
            options
        };
        Self { name, options }
    }

    /// Returns true if this index is the primary key.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.name == PRIMARY_KEY || self.options.primary.unwrap_or(false)
    }

    /// Returns true if the index enforces a uniqueness or primary-key
    /// guarantee rather than only serving lookups.
    #[must_use]
    pub fn is_constraint(&self) -> bool {
        self.is_primary() || self.options.unique.unwrap_or(false)
    }

    /// Returns the index method, defaulting to b-tree.
    #[must_use]
    pub fn method(&self) -> IndexMethod {
        self.options.method.unwrap_or_default()
    }
}

/// Foreign key action (ON DELETE, ON UPDATE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyAction {
    /// No action (error if referenced row is deleted/updated).
    #[default]
    NoAction,
    /// Restrict (same as NoAction but checked immediately).
    Restrict,
    /// Cascade the delete/update to referencing rows.
    Cascade,
    /// Set the foreign key column to NULL.
    SetNull,
    /// Set the foreign key column to its default value.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of this action.
    #[must_use]
    pub fn to_sql(&self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// Options describing a foreign key constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyOptions {
    /// Column(s) in the referencing table.
    pub columns: Vec<String>,
    /// Referenced table name.
    pub referenced_table: String,
    /// Referenced column(s), one per local column.
    pub referenced_columns: Vec<String>,
    /// Action on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ForeignKeyAction>,
    /// Action on delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ForeignKeyAction>,
}

impl ForeignKeyOptions {
    /// Creates foreign key options referencing `table`.
    #[must_use]
    pub fn new<I, S, J, T>(columns: I, table: impl Into<String>, referenced_columns: J) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        J: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            referenced_table: table.into(),
            referenced_columns: referenced_columns.into_iter().map(Into::into).collect(),
            on_update: None,
            on_delete: None,
        }
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = Some(action);
        self
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = Some(action);
        self
    }
}

/// A foreign key definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name, shared with its supporting index.
    pub name: String,
    /// Foreign key options.
    #[serde(flatten)]
    pub options: ForeignKeyOptions,
}

impl ForeignKey {
    /// Creates a foreign key.
    #[must_use]
    pub fn new(name: impl Into<String>, options: ForeignKeyOptions) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}

/// Table-level options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    /// Storage engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Default character set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    /// Default collation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    /// Table comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl TableOptions {
    /// Creates empty table options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the storage engine.
    #[must_use]
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Sets the default character set.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Sets the default collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Sets the comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns true if no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engine.is_none()
            && self.charset.is_none()
            && self.collation.is_none()
            && self.comment.is_none()
    }

    /// Sets every option that `changes` sets.
    pub fn merge(&mut self, changes: Self) {
        overlay(&mut self.engine, changes.engine);
        overlay(&mut self.charset, changes.charset);
        overlay(&mut self.collation, changes.collation);
        overlay(&mut self.comment, changes.comment);
    }
}

/// Complete definition of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Columns in physical order, keyed by name.
    #[serde(default, with = "keyed")]
    pub columns: IndexMap<String, Column>,
    /// Indexes, keyed by name.
    #[serde(default, with = "keyed")]
    pub indexes: IndexMap<String, Index>,
    /// Foreign keys, keyed by name.
    #[serde(default, with = "keyed")]
    pub foreign_keys: IndexMap<String, ForeignKey>,
    /// Table-level options.
    #[serde(default, skip_serializing_if = "TableOptions::is_empty")]
    pub options: TableOptions,
}

impl Table {
    /// Creates a new empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a column to the table.
    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.insert(column.name.clone(), column);
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: Index) -> Self {
        self.indexes.insert(index.name.clone(), index);
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys
            .insert(foreign_key.name.clone(), foreign_key);
        self
    }

    /// Sets the table options.
    #[must_use]
    pub fn options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Gets an index by name.
    #[must_use]
    pub fn get_index(&self, name: &str) -> Option<&Index> {
        self.indexes.get(name)
    }

    /// Gets a foreign key by name.
    #[must_use]
    pub fn get_foreign_key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys.get(name)
    }

    /// Returns the primary key index, if any.
    #[must_use]
    pub fn primary_key(&self) -> Option<&Index> {
        self.indexes.values().find(|index| index.is_primary())
    }

    /// Returns column names in physical order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Returns true if the index is the supporting index of a foreign key
    /// with the same name.
    #[must_use]
    pub fn is_foreign_key_index(&self, index_name: &str) -> bool {
        self.foreign_keys.contains_key(index_name)
    }
}

/// Entities stored in a name-keyed map of a [`Table`].
pub trait Named {
    /// Returns the entity's name.
    fn name(&self) -> &str;
}

impl Named for Column {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Index {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ForeignKey {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Table {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Serializes a name-keyed map as a list of its values.
pub(crate) mod keyed {
    use indexmap::IndexMap;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Named;

    pub fn serialize<S, T>(map: &IndexMap<String, T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<IndexMap<String, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Named,
    {
        let items = Vec::<T>::deserialize(deserializer)?;
        let mut map = IndexMap::with_capacity(items.len());
        for item in items {
            let name = item.name().to_string();
            if map.insert(name.clone(), item).is_some() {
                return Err(D::Error::custom(format!("duplicate name '{name}'")));
            }
        }
        Ok(map)
    }
}
