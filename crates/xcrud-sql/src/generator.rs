//! Expression compiler.
//!
//! [`Generator`] renders an [`Expression`] tree, or a bare document path,
//! into a [`QueryBuilder`]. Rendering is a pure function of the node, the
//! [`GeneratorConfig`], the relational flag of the enclosing statement, and
//! the arguments bound to placeholders.
//!
//! | Node | SQL |
//! |---|---|
//! | `Identifier` | `` `s`.`t`.`c` `` or `` JSON_EXTRACT(`c`,'$.path') `` |
//! | `Literal` | `1`, `-1`, `NULL`, `'text'`, `1.5`, `TRUE`, `ST_GEOMETRYFROMWKB(...)`, `CAST(... AS JSON)` |
//! | `Variable` | `` @`name` `` |
//! | `FunctionCall` | `name(a,b)` |
//! | `Operator` | `(a = b)`, `(NOT a)`, `(a IN (b,c))`, `CAST(a AS SIGNED)`, ... |
//! | `Placeholder` | the bound argument, or `?` |
//! | `Object` | `JSON_OBJECT('k',v)` |
//! | `Array` | `JSON_ARRAY(a,b)` |

use std::fmt::Write;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expressions::{
    is_root_path, Array, ColumnIdentifier, ContentType, DocumentPathItem, Expression,
    FunctionCall, Object, Octets, Operator, Scalar, ScalarString,
};
use crate::operators::{self, OperatorForm};
use crate::query_builder::QueryBuilder;
use crate::quoting::{is_safe_identifier_name, push_json_member, IDENTIFIER_QUOTE, STRING_QUOTE};

/// Column a bare document path is applied to.
pub const DOCUMENT_COLUMN: &str = "doc";

/// Settings that control how SQL text is written.
///
/// Deserializes with missing fields taking their MySQL defaults:
///
/// ```
/// use xcrud_sql::generator::GeneratorConfig;
///
/// let config = GeneratorConfig {
///     backslash_escapes: false,
///     ..Default::default()
/// };
/// assert_eq!(config, GeneratorConfig::mysql_no_backslash_escapes());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Delimiter for quoted identifiers
    pub identifier_quote: char,
    /// Delimiter for string literals
    pub string_quote: char,
    /// Whether string literals use backslash escapes. `false` matches the
    /// server's `NO_BACKSLASH_ESCAPES` SQL mode.
    pub backslash_escapes: bool,
    /// Marker emitted for a placeholder when no arguments are bound
    pub parameter_token: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            identifier_quote: IDENTIFIER_QUOTE,
            string_quote: STRING_QUOTE,
            backslash_escapes: true,
            parameter_token: "?".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn mysql() -> Self {
        Self::default()
    }

    pub fn mysql_no_backslash_escapes() -> Self {
        Self {
            backslash_escapes: false,
            ..Self::default()
        }
    }
}

static DEFAULT_CONFIG: LazyLock<GeneratorConfig> = LazyLock::new(GeneratorConfig::default);

/// Renders expression trees to SQL.
#[derive(Debug, Clone, Copy)]
pub struct Generator<'a> {
    config: &'a GeneratorConfig,
    is_relational: bool,
    args: &'a [Scalar],
}

impl Default for Generator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator<'static> {
    /// A document-mode generator with the default MySQL config.
    pub fn new() -> Self {
        Generator::with_config(&DEFAULT_CONFIG)
    }
}

impl<'a> Generator<'a> {
    pub fn with_config(config: &'a GeneratorConfig) -> Self {
        Self {
            config,
            is_relational: false,
            args: &[],
        }
    }

    /// Set whether the enclosing statement targets a plain table.
    pub fn relational(mut self, is_relational: bool) -> Self {
        self.is_relational = is_relational;
        self
    }

    /// Bind values for `Placeholder` nodes.
    pub fn with_args(mut self, args: &'a [Scalar]) -> Self {
        self.args = args;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        self.config
    }

    pub fn is_relational(&self) -> bool {
        self.is_relational
    }

    /// Render `expr` into a fresh buffer.
    pub fn generate(&self, expr: &Expression) -> Result<String> {
        let mut qb = QueryBuilder::with_config(self.config);
        self.write_expression(&mut qb, expr)?;
        Ok(qb.finish())
    }

    /// Render a document path into a fresh buffer.
    pub fn generate_document_path(&self, path: &[DocumentPathItem]) -> Result<String> {
        let mut qb = QueryBuilder::with_config(self.config);
        self.write_document_path(&mut qb, path)?;
        Ok(qb.finish())
    }

    /// Append the rendering of `expr` to `qb`.
    pub fn write_expression(&self, qb: &mut QueryBuilder, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Identifier(ident) => self.write_identifier(qb, ident),
            Expression::Literal(scalar) => self.write_scalar(qb, scalar),
            Expression::Variable(name) => self.write_variable(qb, name),
            Expression::FunctionCall(call) => self.write_function_call(qb, call),
            Expression::Operator(op) => self.write_operator(qb, op),
            Expression::Placeholder(position) => self.write_placeholder(qb, *position),
            Expression::Object(object) => self.write_object(qb, object),
            Expression::Array(array) => self.write_array(qb, array),
        }
    }

    /// Append a JSON path string literal for `path` to `qb`.
    ///
    /// The lone root member renders as `'$'`; an empty member anywhere else is
    /// rejected.
    pub fn write_document_path(&self, qb: &mut QueryBuilder, path: &[DocumentPathItem]) -> Result<()> {
        if path.is_empty() {
            return Err(Error::bad_type_value("Empty document path"));
        }

        if is_root_path(path) {
            qb.put_string("$");
            return Ok(());
        }

        let mut token = String::from("$");
        for item in path {
            match item {
                DocumentPathItem::Member(name) => {
                    if name.is_empty() {
                        return Err(Error::bad_type_value(
                            "Invalid empty value for Mysqlx::Expr::DocumentPathItem::MEMBER",
                        ));
                    }
                    push_json_member(&mut token, name);
                }
                DocumentPathItem::MemberAsterisk => token.push_str(".*"),
                DocumentPathItem::ArrayIndex(index) => {
                    let _ = write!(token, "[{index}]");
                }
                DocumentPathItem::ArrayIndexAsterisk => token.push_str("[*]"),
                DocumentPathItem::DoubleAsterisk => token.push_str("**"),
            }
        }

        qb.put_string(&token);
        Ok(())
    }

    fn write_identifier(&self, qb: &mut QueryBuilder, ident: &ColumnIdentifier) -> Result<()> {
        let schema = ident.schema();
        let table = ident.table();
        let name = ident.column();
        let path = &ident.document_path;

        if schema.is_some() && table.is_none() {
            return Err(Error::missing_argument(
                "Table name is required if schema name is specified in ColumnIdentifier.",
            ));
        }

        if path.is_empty() && name.is_none() {
            return Err(Error::missing_argument(
                "Column name is required if no document path is specified in ColumnIdentifier.",
            ));
        }

        if !path.is_empty() && self.is_relational && name.is_none() && table.is_none() {
            return Err(Error::missing_argument(
                "Column or table name is required for a document path on a table.",
            ));
        }

        if path.is_empty() {
            self.write_column_ref(qb, schema, table, name.unwrap_or(DOCUMENT_COLUMN));
            return Ok(());
        }

        qb.put("JSON_EXTRACT(");
        self.write_column_ref(qb, schema, table, name.unwrap_or(DOCUMENT_COLUMN));
        qb.put(",");
        self.write_document_path(qb, path)?;
        qb.put(")");
        Ok(())
    }

    fn write_column_ref(
        &self,
        qb: &mut QueryBuilder,
        schema: Option<&str>,
        table: Option<&str>,
        name: &str,
    ) {
        if let Some(schema) = schema {
            qb.put_identifier(schema).put(".");
        }
        if let Some(table) = table {
            qb.put_identifier(table).put(".");
        }
        qb.put_identifier(name);
    }

    fn write_scalar(&self, qb: &mut QueryBuilder, scalar: &Scalar) -> Result<()> {
        match scalar {
            Scalar::UInt(value) => {
                qb.put_number(*value);
            }
            Scalar::SInt(value) => {
                qb.put_number(*value);
            }
            Scalar::Null => {
                qb.put("NULL");
            }
            Scalar::Octets(octets) => self.write_octets(qb, octets)?,
            Scalar::String(string) => self.write_string(qb, string)?,
            Scalar::Double(value) => {
                if !value.is_finite() {
                    return Err(Error::bad_type_value(format!(
                        "Invalid non-finite double value {value}"
                    )));
                }
                qb.put_number(*value);
            }
            Scalar::Float(value) => {
                if !value.is_finite() {
                    return Err(Error::bad_type_value(format!(
                        "Invalid non-finite float value {value}"
                    )));
                }
                qb.put_number(*value);
            }
            Scalar::Bool(value) => {
                qb.put(if *value { "TRUE" } else { "FALSE" });
            }
        }
        Ok(())
    }

    fn write_octets(&self, qb: &mut QueryBuilder, octets: &Octets) -> Result<()> {
        match octets.content_type {
            ContentType::Plain | ContentType::Xml => {
                qb.put_bytes(&octets.value);
            }
            ContentType::Geometry => {
                qb.put("ST_GEOMETRYFROMWKB(").put_bytes(&octets.value).put(")");
            }
            ContentType::Json => {
                // JSON input must be text; a hex literal would carry the binary charset.
                let text = std::str::from_utf8(&octets.value).map_err(|_| {
                    Error::bad_type_value("Invalid JSON text for Mysqlx::Datatypes::Scalar::Octets")
                })?;
                qb.put("CAST(").put_string(text).put(" AS JSON)");
            }
        }
        Ok(())
    }

    fn write_string(&self, qb: &mut QueryBuilder, string: &ScalarString) -> Result<()> {
        // How a collation maps onto a charset clause is undecided; refuse it
        // rather than emit a literal with the wrong semantics.
        if let Some(collation) = string.collation.filter(|c| *c != 0) {
            return Err(Error::unsupported(format!(
                "collation {collation} on string scalar"
            )));
        }
        qb.put_bytes(&string.value);
        Ok(())
    }

    fn write_variable(&self, qb: &mut QueryBuilder, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::bad_message("Invalid empty variable name"));
        }
        qb.put("@").put_identifier(name);
        Ok(())
    }

    fn write_function_call(&self, qb: &mut QueryBuilder, call: &FunctionCall) -> Result<()> {
        let name = &call.name;
        if name.name.is_empty() {
            return Err(Error::bad_message("Invalid empty function name"));
        }

        match name.schema_name.as_deref().filter(|s| !s.is_empty()) {
            Some(schema) => {
                qb.put_identifier(schema).put(".").put_identifier(&name.name);
            }
            None if is_safe_identifier_name(&name.name) => {
                qb.put(&name.name);
            }
            None => {
                qb.put_identifier(&name.name);
            }
        }

        qb.put("(");
        self.write_list(qb, &call.args)?;
        qb.put(")");
        Ok(())
    }

    fn write_operator(&self, qb: &mut QueryBuilder, op: &Operator) -> Result<()> {
        let args = &op.args;

        if op.name == "*" && args.is_empty() {
            qb.put("*");
            return Ok(());
        }

        let Some(form) = operators::lookup(&op.name) else {
            return Err(Error::bad_message(format!("Invalid operator {}", op.name)));
        };

        match form {
            OperatorForm::Binary(sql) => {
                expect_args(op, 2)?;
                qb.put("(");
                self.write_expression(qb, &args[0])?;
                qb.put(" ").put(sql).put(" ");
                self.write_expression(qb, &args[1])?;
                qb.put(")");
            }
            OperatorForm::Unary(sql) => {
                expect_args(op, 1)?;
                qb.put("(").put(sql);
                self.write_expression(qb, &args[0])?;
                qb.put(")");
            }
            OperatorForm::In { negated } => {
                if args.len() < 2 {
                    return Err(arity_error(op, "at least 2"));
                }
                qb.put("(");
                self.write_expression(qb, &args[0])?;
                qb.put(if negated { " NOT IN (" } else { " IN (" });
                self.write_list(qb, &args[1..])?;
                qb.put("))");
            }
            OperatorForm::Between { negated } => {
                expect_args(op, 3)?;
                qb.put("(");
                self.write_expression(qb, &args[0])?;
                qb.put(if negated { " NOT BETWEEN " } else { " BETWEEN " });
                self.write_expression(qb, &args[1])?;
                qb.put(" AND ");
                self.write_expression(qb, &args[2])?;
                qb.put(")");
            }
            OperatorForm::Like { negated } => {
                if !(2..=3).contains(&args.len()) {
                    return Err(arity_error(op, "2 or 3"));
                }
                qb.put("(");
                self.write_expression(qb, &args[0])?;
                qb.put(if negated { " NOT LIKE " } else { " LIKE " });
                self.write_expression(qb, &args[1])?;
                if let Some(escape) = args.get(2) {
                    qb.put(" ESCAPE ");
                    self.write_expression(qb, escape)?;
                }
                qb.put(")");
            }
            OperatorForm::Cast => {
                expect_args(op, 2)?;
                let target = keyword_operand(&args[1])
                    .and_then(operators::cast_target)
                    .ok_or_else(|| Error::bad_type_value("Invalid cast type"))?;
                qb.put("CAST(");
                self.write_expression(qb, &args[0])?;
                qb.put(" AS ").put(&target).put(")");
            }
            OperatorForm::DateInterval(function) => {
                expect_args(op, 3)?;
                let unit = keyword_operand(&args[2])
                    .and_then(operators::interval_unit)
                    .ok_or_else(|| Error::bad_type_value("Invalid interval unit"))?;
                qb.put(function).put("(");
                self.write_expression(qb, &args[0])?;
                qb.put(",INTERVAL ");
                self.write_expression(qb, &args[1])?;
                qb.put(" ").put(unit).put(")");
            }
            OperatorForm::Default => {
                expect_args(op, 0)?;
                qb.put("DEFAULT");
            }
        }
        Ok(())
    }

    fn write_placeholder(&self, qb: &mut QueryBuilder, position: u32) -> Result<()> {
        if self.args.is_empty() {
            qb.put(&self.config.parameter_token);
            return Ok(());
        }

        let scalar = usize::try_from(position)
            .ok()
            .and_then(|i| self.args.get(i))
            .ok_or_else(|| {
                Error::bad_message(format!("Invalid value of placeholder {position}"))
            })?;
        self.write_scalar(qb, scalar)
    }

    fn write_object(&self, qb: &mut QueryBuilder, object: &Object) -> Result<()> {
        qb.put("JSON_OBJECT(");
        qb.put_list(&object.fields, ",", |qb, field| {
            qb.put_string(&field.key).put(",");
            self.write_expression(qb, &field.value)
        })?;
        qb.put(")");
        Ok(())
    }

    fn write_array(&self, qb: &mut QueryBuilder, array: &Array) -> Result<()> {
        qb.put("JSON_ARRAY(");
        self.write_list(qb, &array.elements)?;
        qb.put(")");
        Ok(())
    }

    fn write_list(&self, qb: &mut QueryBuilder, exprs: &[Expression]) -> Result<()> {
        qb.put_list(exprs, ",", |qb, expr| self.write_expression(qb, expr))?;
        Ok(())
    }
}

fn expect_args(op: &Operator, count: usize) -> Result<()> {
    if op.args.len() == count {
        Ok(())
    } else {
        Err(arity_error(op, &count.to_string()))
    }
}

fn arity_error(op: &Operator, expected: &str) -> Error {
    Error::bad_message(format!(
        "Operator {} expects {} argument(s), got {}",
        op.name,
        expected,
        op.args.len()
    ))
}

/// Text of a literal operand that is spliced in as a keyword.
fn keyword_operand(expr: &Expression) -> Option<&str> {
    match expr {
        Expression::Literal(scalar) => scalar.as_text(),
        _ => None,
    }
}
