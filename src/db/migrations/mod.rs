//! Schema migrations for the expenses database.
//!
//! Each migration is a pair of embedded SQL files:
//! - `migration_NN_up.sql` takes the schema from version `NN-1` to `NN`
//! - `migration_NN_down.sql` takes the schema from version `NN` back to `NN-1`

use crate::error::Res;
use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::debug;

struct Migration {
    version: i32,
    up_sql: &'static str,
    down_sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up_sql: include_str!("migration_01_up.sql"),
    down_sql: include_str!("migration_01_down.sql"),
}];

/// The schema version this build of the program expects.
pub(crate) const CURRENT_VERSION: i32 = 1;

/// Moves the schema from version `from` to version `to`, one migration at a time, in either
/// direction. Every step runs in its own transaction together with its `schema_version` update.
/// The full chain of migrations is checked before the first step runs.
pub(crate) async fn run(pool: &SqlitePool, from: i32, to: i32) -> Res<()> {
    if from == to {
        debug!("Schema is at version {to}, nothing to migrate");
        return Ok(());
    }
    check_chain(from, to)?;

    if from < to {
        for version in (from + 1)..=to {
            debug!("Applying migration {version:02} (up)");
            apply(pool, find(version)?.up_sql, version).await?;
        }
    } else {
        for version in ((to + 1)..=from).rev() {
            debug!("Applying migration {version:02} (down)");
            apply(pool, find(version)?.down_sql, version - 1).await?;
        }
    }

    debug!("Schema migrated from version {from} to {to}");
    Ok(())
}

/// Reads the current schema version, creating the `schema_version` table at version 0 if this is
/// a brand-new database.
pub(crate) async fn current_version(pool: &SqlitePool) -> Res<i32> {
    sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .execute(pool)
        .await
        .context("Unable to create the schema_version table")?;

    let row: (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Unable to read the schema version")?;

    match row.0 {
        Some(version) => Ok(version),
        None => {
            sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
                .execute(pool)
                .await
                .context("Unable to initialize the schema version")?;
            Ok(0)
        }
    }
}

fn find(version: i32) -> Res<&'static Migration> {
    MIGRATIONS
        .iter()
        .find(|m| m.version == version)
        .with_context(|| format!("Migration {version} not found"))
}

async fn apply(pool: &SqlitePool, sql: &str, new_version: i32) -> Res<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Unable to begin a migration transaction")?;

    tx.execute(sql)
        .await
        .context("Unable to execute migration SQL")?;

    sqlx::query("DELETE FROM schema_version")
        .execute(&mut *tx)
        .await
        .context("Unable to clear schema_version")?;

    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(new_version)
        .execute(&mut *tx)
        .await
        .context("Unable to record the new schema version")?;

    tx.commit()
        .await
        .context("Unable to commit the migration transaction")?;
    Ok(())
}

fn check_chain(from: i32, to: i32) -> Res<()> {
    let (low, high) = if from < to { (from, to) } else { (to, from) };
    for version in (low + 1)..=high {
        if !MIGRATIONS.iter().any(|m| m.version == version) {
            bail!("Cannot migrate from version {from} to {to}: migration {version} is missing");
        }
    }
    Ok(())
}
