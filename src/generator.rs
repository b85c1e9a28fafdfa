//! SQL statement generator.
//!
//! Four pure functions that turn table definitions into Redshift DDL and
//! load statements. Identifiers are emitted verbatim: no quoting or escaping
//! is performed, so callers must pass valid identifiers and locators.
//!
//! References:
//! - <https://docs.aws.amazon.com/redshift/latest/dg/r_DROP_TABLE.html>
//! - <https://docs.aws.amazon.com/redshift/latest/dg/r_CREATE_TABLE_NEW.html>
//! - <https://docs.aws.amazon.com/redshift/latest/dg/r_COPY.html>
//! - <https://docs.aws.amazon.com/redshift/latest/dg/r_INSERT_30.html>

use crate::column::Column;
use crate::error::{EtlError, EtlResult};

/// JSON field mapping that lets COPY match fields to columns by name.
pub const AUTO_JSON_PATH: &str = "auto";

/// Region used when the configuration does not name one.
pub const DEFAULT_REGION: &str = "us-west-2";

/// Joins column definitions in a CREATE TABLE body.
const SEPARATOR: &str = ",\n  ";

fn require_name(table: &str) -> EtlResult<()> {
    if table.trim().is_empty() {
        return Err(EtlError::EmptyTableName);
    }
    Ok(())
}

fn require_columns(table: &str, columns: &[Column]) -> EtlResult<()> {
    if columns.is_empty() {
        return Err(EtlError::EmptyColumns {
            table: table.to_string(),
        });
    }
    for (i, column) in columns.iter().enumerate() {
        if column.name.trim().is_empty() || column.ty.trim().is_empty() {
            return Err(EtlError::EmptyColumnField {
                table: table.to_string(),
                index: i + 1,
            });
        }
    }
    Ok(())
}

/// Generate `DROP TABLE IF EXISTS <table> CASCADE;`.
pub fn drop_statement(table: &str) -> EtlResult<String> {
    require_name(table)?;
    Ok(format!("DROP TABLE IF EXISTS {} CASCADE;", table))
}

/// Generate a `CREATE TABLE IF NOT EXISTS` statement.
///
/// Each column is rendered as `<name> <type>[ <extra>]`, one per line. When
/// `primary_keys` is given, a `PRIMARY KEY (...)` clause is appended as the
/// last entry of the body. Key names are not checked against the columns.
///
/// # Example
///
/// ```
/// use sparkify::{create_statement, Column};
///
/// let cols = [Column::new("c1", "t1").with_extra("NOT NULL"), Column::new("c2", "t2")];
/// let sql = create_statement("my_table", &cols, Some(&["c1"][..])).unwrap();
/// assert_eq!(
///     sql,
///     "CREATE TABLE IF NOT EXISTS my_table (\n  c1 t1 NOT NULL,\n  c2 t2,\n  PRIMARY KEY (c1));"
/// );
/// ```
pub fn create_statement<K: AsRef<str>>(
    table: &str,
    columns: &[Column],
    primary_keys: Option<&[K]>,
) -> EtlResult<String> {
    require_name(table)?;
    require_columns(table, columns)?;

    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n  ", table);

    let cols: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    sql.push_str(&cols.join(SEPARATOR));

    if let Some(keys) = primary_keys {
        if keys.is_empty() {
            return Err(EtlError::EmptyPrimaryKey {
                table: table.to_string(),
            });
        }
        let keys: Vec<&str> = keys.iter().map(|k| k.as_ref()).collect();
        sql.push_str(SEPARATOR);
        sql.push_str("PRIMARY KEY (");
        sql.push_str(&keys.join(", "));
        sql.push(')');
    }

    sql.push_str(");");
    Ok(sql)
}

/// Generate a JSON `COPY` statement loading `source` into `table`.
///
/// `json_path` maps source fields to columns; `None` means [`AUTO_JSON_PATH`].
/// Empty strings and blank values are loaded as NULL.
pub fn copy_statement(
    table: &str,
    source: &str,
    iam_role: &str,
    json_path: Option<&str>,
    region: &str,
) -> EtlResult<String> {
    require_name(table)?;
    if source.is_empty() {
        return Err(EtlError::EmptySource {
            table: table.to_string(),
        });
    }

    let json_path = json_path.unwrap_or(AUTO_JSON_PATH);
    Ok(format!(
        "COPY {table}\n\
         FROM '{source}'\n\
         IAM_ROLE '{iam_role}'\n\
         REGION '{region}'\n\
         FORMAT JSON AS '{json_path}'\n\
         EMPTYASNULL\n\
         BLANKSASNULL;"
    ))
}

/// Generate `INSERT INTO <table> (<columns>)\n<query>;`.
///
/// Only column names are listed, in order. Identity columns are not filtered
/// out here; leave them out of `columns` if the warehouse assigns them.
/// Surrounding whitespace and one trailing semicolon are removed from
/// `query` before the terminating semicolon is added.
pub fn insert_statement(table: &str, columns: &[Column], query: &str) -> EtlResult<String> {
    require_name(table)?;
    require_columns(table, columns)?;

    let query = query.trim();
    let query = query.strip_suffix(';').unwrap_or(query).trim_end();
    if query.is_empty() {
        return Err(EtlError::EmptyQuery {
            table: table.to_string(),
        });
    }

    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    Ok(format!(
        "INSERT INTO {} ({})\n{};",
        table,
        names.join(", "),
        query
    ))
}
