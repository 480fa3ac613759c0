//! Structural snapshots of a database schema.
//!
//! A [`SchemaSnapshot`] is built fresh for each comparison by reading the
//! catalog of one database and is discarded once the diff is computed.
//! PostgreSQL is read through `information_schema` and `pg_indexes`;
//! SQLite (local fixtures) through `sqlite_master` and `pragma_table_info`.

use serde::Serialize;
use sqlx::{AnyConnection, AnyPool};
use sqlx::Row;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;

/// One column as declared in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub data_type: String,
    pub nullable: bool,
}

/// Columns and indexes of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub columns: BTreeMap<String, ColumnInfo>,
    pub indexes: BTreeSet<String>,
}

/// Tables of one database at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaSnapshot {
    pub tables: BTreeMap<String, TableSchema>,
}

impl SchemaSnapshot {
    pub fn table_names(&self) -> BTreeSet<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Builder used by tests and fixtures.
    pub fn with_table(
        mut self,
        name: &str,
        columns: &[(&str, &str)],
        indexes: &[&str],
    ) -> Self {
        let table = TableSchema {
            columns: columns
                .iter()
                .map(|(col, ty)| {
                    (
                        col.to_string(),
                        ColumnInfo {
                            data_type: ty.to_string(),
                            nullable: true,
                        },
                    )
                })
                .collect(),
            indexes: indexes.iter().map(|i| i.to_string()).collect(),
        };
        self.tables.insert(name.to_string(), table);
        self
    }
}

/// Which catalog dialect a connection speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    fn of(conn: &AnyConnection) -> Self {
        if conn.backend_name().eq_ignore_ascii_case("sqlite") {
            Dialect::Sqlite
        } else {
            Dialect::Postgres
        }
    }
}

const PG_TABLES: &str = r#"
    SELECT CAST(table_name AS TEXT) AS table_name
    FROM information_schema.tables
    WHERE table_schema = 'public'
      AND table_type = 'BASE TABLE'
    ORDER BY table_name
"#;

const PG_COLUMNS: &str = r#"
    SELECT CAST(column_name AS TEXT) AS column_name,
           CAST(data_type AS TEXT) AS data_type,
           CAST(is_nullable AS TEXT) AS is_nullable
    FROM information_schema.columns
    WHERE table_schema = 'public' AND CAST(table_name AS TEXT) = $1
    ORDER BY ordinal_position
"#;

const PG_INDEXES: &str = r#"
    SELECT CAST(indexname AS TEXT) AS index_name
    FROM pg_indexes
    WHERE schemaname = 'public' AND CAST(tablename AS TEXT) = $1
    ORDER BY indexname
"#;

const SQLITE_TABLES: &str = r#"
    SELECT name AS table_name
    FROM sqlite_master
    WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
    ORDER BY name
"#;

const SQLITE_COLUMNS: &str = r#"
    SELECT name AS column_name,
           type AS data_type,
           CASE WHEN "notnull" = 0 THEN 'YES' ELSE 'NO' END AS is_nullable
    FROM pragma_table_info($1)
    ORDER BY cid
"#;

const SQLITE_INDEXES: &str = r#"
    SELECT name AS index_name
    FROM sqlite_master
    WHERE type = 'index' AND tbl_name = $1 AND name NOT LIKE 'sqlite_autoindex_%'
    ORDER BY name
"#;

/// Read the schema of the database behind `pool`.
///
/// When `tables_filter` is given, only tables named in it are described.
/// One connection is held for the whole introspection and returned to the
/// pool on every exit path.
pub async fn introspect(
    pool: &AnyPool,
    tables_filter: Option<&BTreeSet<String>>,
) -> Result<SchemaSnapshot> {
    let mut conn = pool.acquire().await?;
    let dialect = Dialect::of(&conn);
    let (tables_sql, columns_sql, indexes_sql) = match dialect {
        Dialect::Postgres => (PG_TABLES, PG_COLUMNS, PG_INDEXES),
        Dialect::Sqlite => (SQLITE_TABLES, SQLITE_COLUMNS, SQLITE_INDEXES),
    };

    let table_rows = sqlx::query(tables_sql).fetch_all(&mut *conn).await?;
    let mut snapshot = SchemaSnapshot::default();

    for row in &table_rows {
        let table: String = row.try_get("table_name")?;
        if let Some(filter) = tables_filter {
            if !filter.contains(&table) {
                continue;
            }
        }

        let mut schema = TableSchema::default();

        let column_rows = sqlx::query(columns_sql)
            .bind(table.as_str())
            .fetch_all(&mut *conn)
            .await?;
        for col in &column_rows {
            let name: String = col.try_get("column_name")?;
            let data_type: String = col.try_get("data_type")?;
            let nullable: String = col.try_get("is_nullable")?;
            schema.columns.insert(
                name,
                ColumnInfo {
                    data_type,
                    nullable: nullable == "YES",
                },
            );
        }

        let index_rows = sqlx::query(indexes_sql)
            .bind(table.as_str())
            .fetch_all(&mut *conn)
            .await?;
        for idx in &index_rows {
            schema.indexes.insert(idx.try_get("index_name")?);
        }

        snapshot.tables.insert(table, schema);
    }

    tracing::debug!(
        dialect = ?dialect,
        tables = snapshot.tables.len(),
        "schema introspected"
    );
    Ok(snapshot)
}
