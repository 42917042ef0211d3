//! Table creation and best-effort column additions

use sqlx::SqlitePool;
use tracing::{debug, info};

const CREATE_MOVIES: &str = r#"
    CREATE TABLE IF NOT EXISTS movies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        year INTEGER,
        genre TEXT,
        streaming TEXT,
        notes TEXT,
        imdb_link TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        available_now INTEGER DEFAULT 0
    )
"#;

const CREATE_TV_SHOWS: &str = r#"
    CREATE TABLE IF NOT EXISTS tv_shows (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        year INTEGER,
        genre TEXT,
        streaming TEXT,
        notes TEXT,
        imdb_link TEXT,
        active_season INTEGER DEFAULT 0,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// Columns added after the first release; older databases lack them
const ADDITIVE_COLUMNS: &[(&str, &str)] = &[
    ("movies", "streaming TEXT"),
    ("movies", "available_now INTEGER DEFAULT 0"),
    ("tv_shows", "streaming TEXT"),
    ("tv_shows", "active_season INTEGER DEFAULT 0"),
];

/// Create both watchlist tables and add any missing columns
///
/// ALTER failures ("duplicate column name") are expected on every start after
/// the first and are discarded.
pub async fn init_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_MOVIES).execute(pool).await?;
    sqlx::query(CREATE_TV_SHOWS).execute(pool).await?;

    for (table, column) in ADDITIVE_COLUMNS {
        let sql = format!("ALTER TABLE {} ADD COLUMN {}", table, column);
        if let Err(e) = sqlx::query(&sql).execute(pool).await {
            debug!(table, column, "Skipped column addition: {}", e);
        }
    }

    info!("Database tables initialized (movies, tv_shows)");
    Ok(())
}
