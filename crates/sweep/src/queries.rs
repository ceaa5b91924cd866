//! Statement execution over a single connection

use crate::sql::{self, RelationStatements};
use morphsweep_errors::Error;
use morphsweep_types::{EntityMeta, KeyValue, ScanMode};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnection};
use sqlx::Sqlite;

fn bind_key<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    key: &KeyValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match key {
        KeyValue::Int(v) => query.bind(*v),
        KeyValue::Text(v) => query.bind(v.clone()),
    }
}

/// Delete (or count, in a dry run) the rows matched by `statement`
async fn purge(
    conn: &mut SqliteConnection,
    statement: &str,
    label: Option<&str>,
    mode: ScanMode,
) -> Result<u64, Error> {
    match mode {
        ScanMode::Delete => {
            let mut query = sqlx::query(statement);
            if let Some(label) = label {
                query = query.bind(label.to_owned());
            }
            Ok(query.execute(&mut *conn).await?.rows_affected())
        }
        ScanMode::DryRun => {
            let mut query = sqlx::query_scalar::<_, i64>(statement);
            if let Some(label) = label {
                query = query.bind(label.to_owned());
            }
            let count = query.fetch_one(&mut *conn).await?;
            Ok(u64::try_from(count).unwrap_or(0))
        }
    }
}

/// Distinct type labels present in a child table
pub async fn distinct_labels(
    conn: &mut SqliteConnection,
    statements: &RelationStatements,
) -> Result<Vec<Option<String>>, Error> {
    let labels = sqlx::query_scalar::<_, Option<String>>(&statements.distinct_labels())
        .fetch_all(&mut *conn)
        .await?;
    Ok(labels)
}

/// Remove rows of `label` whose parent no longer exists in `parent`'s table
pub async fn purge_orphans(
    conn: &mut SqliteConnection,
    statements: &RelationStatements,
    parent: &EntityMeta,
    label: &str,
    mode: ScanMode,
) -> Result<u64, Error> {
    let statement = statements.orphans(parent, mode)?;
    purge(conn, &statement, Some(label), mode).await
}

/// Remove every row of `label`; `None` targets rows with a NULL label
pub async fn purge_label(
    conn: &mut SqliteConnection,
    statements: &RelationStatements,
    label: Option<&str>,
    mode: ScanMode,
) -> Result<u64, Error> {
    let statement = match label {
        Some(_) => statements.label(mode),
        None => statements.null_label(mode),
    };
    purge(conn, &statement, label, mode).await
}

/// Remove the rows owned by one parent record
pub async fn delete_dependents(
    conn: &mut SqliteConnection,
    statements: &RelationStatements,
    label: &str,
    key: &KeyValue,
) -> Result<u64, Error> {
    let statement = statements.dependents();
    let query = sqlx::query(&statement).bind(label.to_owned());
    let result = bind_key(query, key).execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

/// Remove the parent record itself
pub async fn delete_parent(
    conn: &mut SqliteConnection,
    meta: &EntityMeta,
    key: &KeyValue,
) -> Result<u64, Error> {
    let statement = sql::delete_parent(meta)?;
    let result = bind_key(sqlx::query(&statement), key)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
