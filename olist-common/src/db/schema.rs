//! Declarative table schemas and schema introspection
//!
//! Published tables are described once, in code: column definitions drive
//! the `CREATE TABLE` statement, index definitions drive finalization.
//! Source tables are only introspected, to fail fast when a required column
//! is missing.
//!
//! # Usage
//!
//! ```rust,ignore
//! pub struct DimLocationsSchema;
//!
//! impl TableSchema for DimLocationsSchema {
//!     fn table_name() -> &'static str { "dim_locations" }
//!
//!     fn expected_columns() -> Vec<ColumnDefinition> {
//!         vec![
//!             ColumnDefinition::new("location_id", "INTEGER").primary_key(),
//!             ColumnDefinition::new("zip_code_prefix", "TEXT").not_null(),
//!         ]
//!     }
//! }
//!
//! sqlx::query(&DimLocationsSchema::create_table_sql()).execute(&mut *conn).await?;
//! ```

use crate::{Error, Result};
use sqlx::{Row, SqliteConnection};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// SQL type (e.g., "TEXT", "INTEGER", "REAL", "NUMERIC")
    pub sql_type: String,
    /// NOT NULL constraint
    pub not_null: bool,
    /// PRIMARY KEY constraint
    pub primary_key: bool,
}

impl ColumnDefinition {
    /// Create new column definition
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
        }
    }

    /// Mark column as PRIMARY KEY
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark column as NOT NULL
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Column clause for CREATE TABLE
    fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", quote_ident(&self.name), self.sql_type);
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        sql
    }
}

/// Secondary structure built after a table has been populated
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    /// Index name (unique per database)
    pub name: String,
    /// Indexed columns, in order
    pub columns: Vec<String>,
    /// UNIQUE index (acts as the table's natural-key constraint)
    pub unique: bool,
}

impl IndexDefinition {
    /// Non-unique lookup index
    pub fn lookup(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique: false,
        }
    }

    /// Unique index over the natural key
    pub fn unique(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            unique: true,
            ..Self::lookup(name, columns)
        }
    }

    /// CREATE INDEX statement for `table`
    pub fn create_sql(&self, table: &str) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE {}INDEX {} ON {} ({})",
            if self.unique { "UNIQUE " } else { "" },
            quote_ident(&self.name),
            quote_ident(table),
            columns
        )
    }
}

/// Defines the schema of a published table
pub trait TableSchema {
    /// Table name in database
    fn table_name() -> &'static str;

    /// Column definitions (order is the physical column order)
    fn expected_columns() -> Vec<ColumnDefinition>;

    /// Indexes applied once the table is populated
    fn indexes() -> Vec<IndexDefinition> {
        Vec::new()
    }

    /// CREATE TABLE statement derived from `expected_columns`
    fn create_table_sql() -> String {
        let columns = Self::expected_columns()
            .iter()
            .map(ColumnDefinition::to_sql)
            .collect::<Vec<_>>()
            .join(",\n    ");
        format!(
            "CREATE TABLE {} (\n    {}\n)",
            quote_ident(Self::table_name()),
            columns
        )
    }

    /// DROP TABLE IF EXISTS statement
    fn drop_table_sql() -> String {
        format!("DROP TABLE IF EXISTS {}", quote_ident(Self::table_name()))
    }

    /// Column names in physical order
    fn column_names() -> Vec<String> {
        Self::expected_columns().into_iter().map(|c| c.name).collect()
    }
}

/// Actual column from database introspection (PRAGMA table_info result)
#[derive(Debug, Clone)]
pub struct ActualColumn {
    /// Column ID (position in table)
    pub cid: i32,
    /// Column name
    pub name: String,
    /// SQL type from PRAGMA table_info
    pub type_name: String,
}

/// Schema introspection - read actual database schema
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// Read actual columns from database table using PRAGMA table_info
    ///
    /// Returns columns in database order (by cid); empty if the table is absent
    pub async fn introspect_table(
        conn: &mut SqliteConnection,
        table_name: &str,
    ) -> Result<Vec<ActualColumn>> {
        let query = format!("PRAGMA table_info({})", quote_ident(table_name));
        let rows = sqlx::query(&query).fetch_all(&mut *conn).await?;

        let mut columns: Vec<ActualColumn> = rows
            .iter()
            .map(|row| ActualColumn {
                cid: row.get("cid"),
                name: row.get("name"),
                type_name: row.get("type"),
            })
            .collect();

        columns.sort_by_key(|c| c.cid);

        Ok(columns)
    }

    /// Check if table exists
    pub async fn table_exists(conn: &mut SqliteConnection, table_name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM sqlite_master
                WHERE type='table' AND name = ?
            )
            "#,
        )
        .bind(table_name)
        .fetch_one(&mut *conn)
        .await?;

        Ok(exists)
    }

    /// Fail with `Error::InputShape` unless the table has every column listed
    pub async fn require_columns(
        conn: &mut SqliteConnection,
        table_name: &str,
        required: &[&str],
    ) -> Result<()> {
        let actual = Self::introspect_table(conn, table_name).await?;
        if actual.is_empty() {
            return Err(Error::InputShape {
                table: table_name.to_string(),
                column: "the whole table".to_string(),
            });
        }

        if let Some(missing) = required
            .iter()
            .find(|name| !actual.iter().any(|c| c.name == **name))
        {
            return Err(Error::InputShape {
                table: table_name.to_string(),
                column: format!("column '{}'", missing),
            });
        }

        Ok(())
    }
}

/// Quote an SQL identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
