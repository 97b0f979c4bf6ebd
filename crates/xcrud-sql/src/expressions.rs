//! CRUD message AST.
//!
//! These types mirror the decoded X protocol messages: an [`Expression`] tree
//! for every value, column, or computation, plus the payload structs of the
//! CRUD operations. Decoding from the wire happens elsewhere; this crate only
//! consumes the decoded values.
//!
//! # Variant Groups
//!
//! | Type | Cases |
//! |---|---|
//! | [`Expression`] | `Identifier`, `Literal`, `Variable`, `FunctionCall`, `Operator`, `Placeholder`, `Object`, `Array` |
//! | [`Scalar`] | `UInt`, `SInt`, `Null`, `Octets`, `String`, `Double`, `Float`, `Bool` |
//! | [`DocumentPathItem`] | `Member`, `MemberAsterisk`, `ArrayIndex`, `ArrayIndexAsterisk`, `DoubleAsterisk` |
//!
//! All three are closed enums: the generator matches them exhaustively, so a
//! new wire variant does not compile until it has a rendering.

use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "bindings")]
use ts_rs::TS;

use crate::error::{Error, Result};

/// A single decoded expression node.
///
/// ```
/// use xcrud_sql::expressions::{DocumentPathItem, Expression};
///
/// let expr = Expression::document_field("doc", [
///     DocumentPathItem::member("a"),
///     DocumentPathItem::ArrayIndex(0),
/// ]);
/// assert_eq!(expr.sql().unwrap(), "JSON_EXTRACT(`doc`,'$.a[0]')");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "bindings", ts(export))]
pub enum Expression {
    Identifier(ColumnIdentifier),
    Literal(Scalar),
    /// A session variable, rendered as `@name`
    Variable(String),
    FunctionCall(Box<FunctionCall>),
    Operator(Box<Operator>),
    /// Zero-based position into the message's bound arguments
    Placeholder(u32),
    Object(Box<Object>),
    Array(Box<Array>),
}

impl Expression {
    /// A bare column reference.
    pub fn column(name: impl Into<String>) -> Self {
        Expression::Identifier(ColumnIdentifier::new(name))
    }

    /// A column reference followed by a document path.
    pub fn document_field(
        name: impl Into<String>,
        path: impl IntoIterator<Item = DocumentPathItem>,
    ) -> Self {
        Expression::Identifier(ColumnIdentifier::new(name).with_document_path(path))
    }

    /// A document path against the implicit `doc` column.
    pub fn document_path(path: impl IntoIterator<Item = DocumentPathItem>) -> Self {
        Expression::Identifier(ColumnIdentifier {
            document_path: path.into_iter().collect(),
            ..ColumnIdentifier::default()
        })
    }

    pub fn literal(scalar: Scalar) -> Self {
        Expression::Literal(scalar)
    }

    pub fn null() -> Self {
        Expression::Literal(Scalar::Null)
    }

    pub fn uint(value: u64) -> Self {
        Expression::Literal(Scalar::UInt(value))
    }

    pub fn sint(value: i64) -> Self {
        Expression::Literal(Scalar::SInt(value))
    }

    pub fn double(value: f64) -> Self {
        Expression::Literal(Scalar::Double(value))
    }

    pub fn boolean(value: bool) -> Self {
        Expression::Literal(Scalar::Bool(value))
    }

    /// A string scalar without collation.
    pub fn string(value: impl Into<String>) -> Self {
        Expression::Literal(Scalar::string(value))
    }

    pub fn octets(value: impl Into<Vec<u8>>, content_type: ContentType) -> Self {
        Expression::Literal(Scalar::Octets(Octets::new(value, content_type)))
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    pub fn placeholder(position: u32) -> Self {
        Expression::Placeholder(position)
    }

    /// Call to an unqualified function.
    pub fn function(name: impl Into<String>, args: impl IntoIterator<Item = Expression>) -> Self {
        Expression::FunctionCall(Box::new(FunctionCall {
            name: FunctionName::new(name),
            args: args.into_iter().collect(),
        }))
    }

    pub fn operator(name: impl Into<String>, args: impl IntoIterator<Item = Expression>) -> Self {
        Expression::Operator(Box::new(Operator {
            name: name.into(),
            args: args.into_iter().collect(),
        }))
    }

    /// Build a JSON object from `(key, value)` pairs, keeping their order.
    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Expression)>) -> Self {
        Expression::Object(Box::new(Object {
            fields: fields
                .into_iter()
                .map(|(key, value)| ObjectField {
                    key: key.into(),
                    value,
                })
                .collect(),
        }))
    }

    pub fn array(elements: impl IntoIterator<Item = Expression>) -> Self {
        Expression::Array(Box::new(Array {
            elements: elements.into_iter().collect(),
        }))
    }

    /// Short name of the active case, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expression::Identifier(_) => "identifier",
            Expression::Literal(_) => "literal",
            Expression::Variable(_) => "variable",
            Expression::FunctionCall(_) => "function_call",
            Expression::Operator(_) => "operator",
            Expression::Placeholder(_) => "placeholder",
            Expression::Object(_) => "object",
            Expression::Array(_) => "array",
        }
    }

    /// Render with the default MySQL generator in document mode.
    pub fn sql(&self) -> Result<String> {
        crate::generator::Generator::new().generate(self)
    }
}

/// A possibly qualified column, optionally followed by a JSON document path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct ColumnIdentifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub document_path: Vec<DocumentPathItem>,
}

impl ColumnIdentifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table_name = Some(table.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    pub fn with_document_path(mut self, path: impl IntoIterator<Item = DocumentPathItem>) -> Self {
        self.document_path = path.into_iter().collect();
        self
    }

    /// The schema name, treating an empty string as absent.
    pub fn schema(&self) -> Option<&str> {
        non_empty(&self.schema_name)
    }

    /// The table name, treating an empty string as absent.
    pub fn table(&self) -> Option<&str> {
        non_empty(&self.table_name)
    }

    /// The column name, treating an empty string as absent.
    pub fn column(&self) -> Option<&str> {
        non_empty(&self.name)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// A scalar literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "bindings", ts(export))]
pub enum Scalar {
    UInt(u64),
    SInt(i64),
    Null,
    Octets(Octets),
    String(ScalarString),
    Double(f64),
    Float(f32),
    Bool(bool),
}

impl Scalar {
    pub fn string(value: impl Into<String>) -> Self {
        Scalar::String(ScalarString {
            value: value.into().into_bytes(),
            collation: None,
        })
    }

    /// The UTF-8 text of a string or octets scalar, if it has any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => std::str::from_utf8(&s.value).ok(),
            Scalar::Octets(o) => std::str::from_utf8(&o.value).ok(),
            _ => None,
        }
    }
}

/// A byte payload tagged with how it should be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct Octets {
    pub value: Vec<u8>,
    #[serde(default)]
    pub content_type: ContentType,
}

impl Octets {
    pub fn new(value: impl Into<Vec<u8>>, content_type: ContentType) -> Self {
        Self {
            value: value.into(),
            content_type,
        }
    }

    /// Build from a raw wire content-type tag.
    pub fn from_wire(value: impl Into<Vec<u8>>, content_type: u32) -> Result<Self> {
        Ok(Self::new(value, ContentType::try_from(content_type)?))
    }
}

/// Content type of an [`Octets`] payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "bindings", ts(export))]
pub enum ContentType {
    #[default]
    Plain,
    /// Well-known binary geometry
    Geometry,
    /// JSON text
    Json,
    /// XML text
    Xml,
}

impl ContentType {
    /// The wire tag of this content type.
    pub fn tag(self) -> u32 {
        match self {
            ContentType::Plain => 0,
            ContentType::Geometry => 1,
            ContentType::Json => 2,
            ContentType::Xml => 3,
        }
    }
}

impl TryFrom<u32> for ContentType {
    type Error = Error;

    fn try_from(tag: u32) -> Result<Self> {
        match tag {
            0 => Ok(ContentType::Plain),
            1 => Ok(ContentType::Geometry),
            2 => Ok(ContentType::Json),
            3 => Ok(ContentType::Xml),
            other => Err(Error::bad_type_value(format!(
                "Invalid content type {other} for Mysqlx::Datatypes::Scalar::Octets"
            ))),
        }
    }
}

/// A string payload with an optional collation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct ScalarString {
    pub value: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<u64>,
}

/// One step of a JSON document path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "bindings", ts(export))]
pub enum DocumentPathItem {
    /// `.name`
    Member(String),
    /// `.*`
    MemberAsterisk,
    /// `[n]`
    ArrayIndex(u32),
    /// `[*]`
    ArrayIndexAsterisk,
    /// `**`
    DoubleAsterisk,
}

impl DocumentPathItem {
    pub fn member(name: impl Into<String>) -> Self {
        DocumentPathItem::Member(name.into())
    }

    /// The path root, `$`. Only valid as the whole path.
    pub fn root() -> Self {
        DocumentPathItem::Member(String::new())
    }
}

/// Whether `path` is the lone root sentinel.
pub fn is_root_path(path: &[DocumentPathItem]) -> bool {
    matches!(path, [DocumentPathItem::Member(name)] if name.is_empty())
}

/// A function name, optionally schema-qualified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct FunctionName {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
}

impl FunctionName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema_name: None,
        }
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema_name: Some(schema.into()),
        }
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema_name {
            Some(schema) if !schema.is_empty() => write!(f, "{}.{}", schema, self.name),
            _ => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct FunctionCall {
    pub name: FunctionName,
    #[serde(default)]
    pub args: Vec<Expression>,
}

/// An operator applied to its operands, named as on the wire (`==`, `&&`, `in`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct Operator {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Expression>,
}

/// A JSON object constructor. Fields keep their wire order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct Object {
    pub fields: Vec<ObjectField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct ObjectField {
    pub key: String,
    pub value: Expression,
}

/// A JSON array constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct Array {
    pub elements: Vec<Expression>,
}

// ---------------------------------------------------------------------------
// CRUD payloads
// ---------------------------------------------------------------------------

/// The table or collection a CRUD message targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct Collection {
    #[serde(default)]
    pub schema: String,
    pub name: String,
}

impl Collection {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.schema.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.schema, self.name)
        }
    }
}

/// Whether a message addresses a document collection or a plain table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "bindings", ts(export))]
pub enum DataModel {
    #[default]
    Document,
    Table,
}

impl DataModel {
    pub fn is_relational(self) -> bool {
        self == DataModel::Table
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct TypedRow {
    pub fields: Vec<Expression>,
}

impl TypedRow {
    pub fn new(fields: impl IntoIterator<Item = Expression>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }
}

/// Decoded `Mysqlx.Crud.Insert` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct Insert {
    pub collection: Collection,
    #[serde(default)]
    pub data_model: DataModel,
    #[serde(default)]
    pub projection: Vec<String>,
    #[serde(default)]
    pub rows: Vec<TypedRow>,
    /// Values bound to `Placeholder` nodes, by position
    #[serde(default)]
    pub args: Vec<Scalar>,
}

impl Insert {
    /// A document-mode insert with no rows yet.
    pub fn document(collection: Collection) -> Self {
        Self {
            collection,
            data_model: DataModel::Document,
            projection: Vec::new(),
            rows: Vec::new(),
            args: Vec::new(),
        }
    }

    /// A table-mode insert into the given columns.
    pub fn table<S: Into<String>>(
        collection: Collection,
        projection: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            collection,
            data_model: DataModel::Table,
            projection: projection.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            args: Vec::new(),
        }
    }

    pub fn row(mut self, fields: impl IntoIterator<Item = Expression>) -> Self {
        self.rows.push(TypedRow::new(fields));
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = Scalar>) -> Self {
        self.args = args.into_iter().collect();
        self
    }
}
