//! xcrud-sql - SQL generation for X protocol CRUD messages
//!
//! This library turns decoded document/CRUD protocol messages into SQL text
//! for a MySQL-compatible engine.
//!
//! # Architecture
//!
//! The library follows a pipeline architecture:
//! 1. **Expressions** - the decoded message AST
//! 2. **Generator** - compiles expression trees into a quoting-aware output buffer
//! 3. **Builders** - assemble full statements per CRUD message kind
//! 4. **Dispatcher** - runs the statement and acknowledges success
//!
//! Quoting is centralized in [`quoting`] and [`query_builder`]; nothing
//! user-controlled reaches the output except through an escaping path.

pub mod crud;
pub mod dispatcher;
pub mod error;
pub mod expressions;
pub mod generator;
mod operators;
pub mod query_builder;
pub mod quoting;

pub use crud::{build_statement, builder_for, CrudKind, CrudMessage, InsertBuilder, StatementBuilder};
pub use dispatcher::{CrudDispatcher, NoticeSender, SqlExecutor};
pub use error::{Error, Result};
pub use expressions::{
    Collection, ColumnIdentifier, ContentType, DataModel, DocumentPathItem, Expression, Insert,
    Scalar, TypedRow,
};
pub use generator::{Generator, GeneratorConfig};
pub use query_builder::QueryBuilder;

/// Compile a single expression.
///
/// # Arguments
/// * `expr` - The expression tree
/// * `is_relational` - Whether the enclosing statement targets a plain table
///
/// # Example
/// ```
/// use xcrud_sql::{compile_expression, Expression};
///
/// let sql = compile_expression(
///     &Expression::operator("==", [Expression::column("a"), Expression::uint(1)]),
///     true,
/// )
/// .unwrap();
/// assert_eq!(sql, "(`a` = 1)");
/// ```
pub fn compile_expression(expr: &Expression, is_relational: bool) -> Result<String> {
    Generator::new().relational(is_relational).generate(expr)
}

/// Compile a document path to a JSON path string literal.
pub fn compile_document_path(path: &[DocumentPathItem]) -> Result<String> {
    Generator::new().generate_document_path(path)
}

/// Build an INSERT statement with the default MySQL configuration.
pub fn build_insert(insert: &Insert) -> Result<String> {
    InsertBuilder.build_insert(insert, &GeneratorConfig::default())
}
