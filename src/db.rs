use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug)]
pub struct Country {
    pub country_code: String,
    pub country_name: String,
}

pub async fn init(db: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS users (
  id INTEGER PRIMARY KEY,
  name TEXT NOT NULL,
  color TEXT NOT NULL,
  created_at TEXT NOT NULL
) STRICT;"#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS various_countries (
  country_code TEXT PRIMARY KEY,
  country_name TEXT NOT NULL
) STRICT;"#,
    )
    .execute(db)
    .await?;

    // One row per (user, country): repeat submissions collapse onto it.
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS visited_countries (
  id INTEGER PRIMARY KEY,
  user_id INTEGER NOT NULL REFERENCES users (id),
  country_code TEXT NOT NULL REFERENCES various_countries (country_code),
  visited_at TEXT NOT NULL,

  UNIQUE (user_id, country_code)
) STRICT;"#,
    )
    .execute(db)
    .await?;

    Ok(())
}

/// Loads `CODE,Name` lines into the reference table, skipping blank lines and
/// `#` comments. Codes already present are left untouched.
///
/// Returns the number of rows inserted.
pub async fn seed_countries(db: &SqlitePool, contents: &str) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;

    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((code, name)) = line.split_once(',') else {
            warn!(line = number + 1, "skipping malformed country entry");
            continue;
        };

        inserted += sqlx::query(
            r#"INSERT OR IGNORE INTO various_countries (country_code, country_name) VALUES (?, ?)"#,
        )
        .bind(code.trim().to_uppercase())
        .bind(name.trim())
        .execute(db)
        .await?
        .rows_affected();
    }

    Ok(inserted)
}
