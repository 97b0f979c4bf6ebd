//! INSERT statement builder

use super::{mismatched_message, CrudKind, CrudMessage, StatementBuilder};
use crate::error::{Error, Result};
use crate::expressions::{Collection, Insert, TypedRow};
use crate::generator::{Generator, GeneratorConfig};
use crate::query_builder::QueryBuilder;

/// Builds `INSERT INTO ... VALUES ...` from a decoded insert message.
///
/// ```
/// use xcrud_sql::crud::InsertBuilder;
/// use xcrud_sql::expressions::{Collection, Expression, Insert};
/// use xcrud_sql::generator::GeneratorConfig;
///
/// let insert = Insert::table(Collection::new("test", "t"), ["a", "b"])
///     .row([Expression::uint(1), Expression::string("x")]);
/// let sql = InsertBuilder.build_insert(&insert, &GeneratorConfig::default()).unwrap();
/// assert_eq!(sql, "INSERT INTO `test`.`t` (`a`,`b`) VALUES (1,'x')");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertBuilder;

impl StatementBuilder for InsertBuilder {
    fn kind(&self) -> CrudKind {
        CrudKind::Insert
    }

    fn build(&self, message: &CrudMessage, config: &GeneratorConfig) -> Result<String> {
        match message {
            CrudMessage::Insert(insert) => self.build_insert(insert, config),
            other => Err(mismatched_message(CrudKind::Insert, other)),
        }
    }
}

impl InsertBuilder {
    pub fn build_insert(&self, insert: &Insert, config: &GeneratorConfig) -> Result<String> {
        let is_relational = insert.data_model.is_relational();
        let projection_size = if is_relational {
            insert.projection.len()
        } else {
            if !insert.projection.is_empty() {
                return Err(Error::bad_projection(
                    "Invalid projection for document operation",
                ));
            }
            1
        };

        let generator = Generator::with_config(config)
            .relational(is_relational)
            .with_args(&insert.args);

        let mut qb = QueryBuilder::with_config(config);
        qb.put("INSERT INTO ");
        add_collection(&mut qb, &insert.collection)?;
        add_projection(&mut qb, &insert.projection, is_relational)?;
        add_values(&mut qb, &generator, &insert.rows, projection_size)?;
        Ok(qb.finish())
    }
}

fn add_collection(qb: &mut QueryBuilder, collection: &Collection) -> Result<()> {
    if collection.name.is_empty() {
        return Err(Error::bad_table("Invalid name of table/collection"));
    }
    if !collection.schema.is_empty() {
        qb.put_identifier(&collection.schema).put(".");
    }
    qb.put_identifier(&collection.name);
    Ok(())
}

fn add_projection(qb: &mut QueryBuilder, projection: &[String], is_relational: bool) -> Result<()> {
    if !is_relational {
        qb.put(" (doc)");
        return Ok(());
    }
    if projection.is_empty() {
        return Ok(());
    }

    qb.put(" (");
    qb.put_list(projection, ",", |qb, column| {
        if column.is_empty() {
            return Err(Error::bad_projection("Invalid projection target name"));
        }
        qb.put_identifier(column);
        Ok(())
    })?;
    qb.put(")");
    Ok(())
}

/// `projection_size` of 0 means the table columns are implicit; rows must
/// then agree with the first row's width.
fn add_values(
    qb: &mut QueryBuilder,
    generator: &Generator<'_>,
    rows: &[TypedRow],
    projection_size: usize,
) -> Result<()> {
    let Some(first) = rows.first() else {
        return Err(Error::bad_insert_data("Missing row data for Insert"));
    };
    let expected = if projection_size == 0 {
        first.fields.len()
    } else {
        projection_size
    };

    qb.put(" VALUES ");
    qb.put_list(rows, ",", |qb, row| add_row(qb, generator, row, expected))?;
    Ok(())
}

fn add_row(
    qb: &mut QueryBuilder,
    generator: &Generator<'_>,
    row: &TypedRow,
    expected: usize,
) -> Result<()> {
    if row.fields.is_empty() || row.fields.len() != expected {
        return Err(Error::bad_insert_data(format!(
            "Wrong number of fields in row being inserted: expected {}, got {}",
            expected,
            row.fields.len()
        )));
    }

    qb.put("(");
    qb.put_list(&row.fields, ",", |qb, field| generator.write_expression(qb, field))?;
    qb.put(")");
    Ok(())
}
