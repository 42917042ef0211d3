//! Persistence service for the watchlists
//!
//! One SQLite file holds both tables. [`Store`] is opened once in `main`,
//! cloned into the router state, and closed on shutdown. Each operation is a
//! single statement; write serialization is left to SQLite.

mod listings;
mod schema;

pub use listings::{Details, Kind, Listing, Movie, TvShow};

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::info;

/// Shared handle to the watchlist database
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (or create) `<data_dir>/<db_name>.db` and set up the schema
    pub async fn open(data_dir: &Path, db_name: &str) -> Result<Self> {
        std::fs::create_dir_all(data_dir).with_context(|| {
            format!("Failed to create data directory {}", data_dir.display())
        })?;

        let db_path = data_dir.join(format!("{}.db", db_name));
        info!("Database path: {}", db_path.display());

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .context("Failed to open database")?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database on a single connection
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        schema::init_tables(&pool)
            .await
            .context("Failed to create tables")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a listing and return its new id
    ///
    /// The record's own id is ignored. Title validation is the caller's job.
    pub async fn create<T: Listing>(&self, record: &T) -> sqlx::Result<i64> {
        let kind = T::KIND;
        let details = record.details();
        info!(table = kind.table(), "Adding listing: {} ({})", details.title, details.year);

        let sql = format!(
            "INSERT INTO {} (title, year, genre, streaming, notes, imdb_link, {}) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            kind.table(),
            kind.flag_column()
        );
        let result = sqlx::query(&sql)
            .bind(&details.title)
            .bind(details.year)
            .bind(&details.genre)
            .bind(&details.streaming)
            .bind(&details.notes)
            .bind(&details.imdb_link)
            .bind(i64::from(record.flag()))
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        info!(table = kind.table(), "Listing added with ID: {}", id);
        Ok(id)
    }

    /// Every row, flagged first, then newest year, then most recently added
    pub async fn list_all<T: Listing>(&self) -> sqlx::Result<Vec<T>> {
        let kind = T::KIND;
        let sql = format!(
            "{} ORDER BY {} DESC, year DESC, created_at DESC, id DESC",
            select_columns(kind),
            kind.flag_column()
        );

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(listing_from_row).collect()
    }

    /// One flagged row chosen uniformly at random, or `None` if there is none
    pub async fn random_flagged<T: Listing>(&self) -> sqlx::Result<Option<T>> {
        let kind = T::KIND;
        let sql = format!(
            "{} WHERE {} = 1 ORDER BY RANDOM() LIMIT 1",
            select_columns(kind),
            kind.flag_column()
        );

        let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;
        row.as_ref().map(listing_from_row).transpose()
    }

    /// Overwrite every field of the row with the record's id
    ///
    /// An id with no matching row is not an error; nothing changes.
    pub async fn update<T: Listing>(&self, record: &T) -> sqlx::Result<()> {
        let kind = T::KIND;
        let details = record.details();
        info!(
            table = kind.table(),
            "Updating listing with ID: {}, title: {}",
            record.id(),
            details.title
        );

        let sql = format!(
            "UPDATE {} SET title = ?, year = ?, genre = ?, streaming = ?, notes = ?, \
             imdb_link = ?, {} = ? WHERE id = ?",
            kind.table(),
            kind.flag_column()
        );
        sqlx::query(&sql)
            .bind(&details.title)
            .bind(details.year)
            .bind(&details.genre)
            .bind(&details.streaming)
            .bind(&details.notes)
            .bind(&details.imdb_link)
            .bind(i64::from(record.flag()))
            .bind(record.id())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Remove a row by id; a missing id is a no-op
    pub async fn delete<T: Listing>(&self, id: i64) -> sqlx::Result<()> {
        let table = T::KIND.table();
        info!(table, "Deleting listing with ID: {}", id);

        let sql = format!("DELETE FROM {} WHERE id = ?", table);
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn count<T: Listing>(&self) -> sqlx::Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", T::KIND.table());
        sqlx::query_scalar(&sql).fetch_one(&self.pool).await
    }

    /// Round-trip a trivial query on the pool
    pub async fn ping(&self) -> sqlx::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn select_columns(kind: Kind) -> String {
    format!(
        "SELECT id, title, year, genre, streaming, notes, imdb_link, {} AS flag FROM {}",
        kind.flag_column(),
        kind.table()
    )
}

/// NULL text reads back as empty, NULL year as 0, flag as `flag != 0`
fn listing_from_row<T: Listing>(row: &SqliteRow) -> sqlx::Result<T> {
    let text = |column: &str| -> sqlx::Result<String> {
        Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
    };

    let details = Details {
        title: text("title")?,
        year: row.try_get::<Option<i64>, _>("year")?.unwrap_or(0),
        genre: text("genre")?,
        streaming: text("streaming")?,
        notes: text("notes")?,
        imdb_link: text("imdb_link")?,
    };
    let flag = row.try_get::<Option<i64>, _>("flag")?.unwrap_or(0) != 0;

    Ok(T::from_parts(row.try_get("id")?, details, flag))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, year: i64, available_now: bool) -> Movie {
        Movie {
            id: 0,
            details: Details {
                title: title.to_string(),
                year,
                ..Details::default()
            },
            available_now,
        }
    }

    fn show(title: &str, active_season: bool) -> TvShow {
        TvShow {
            id: 0,
            details: Details {
                title: title.to_string(),
                ..Details::default()
            },
            active_season,
        }
    }

    #[tokio::test]
    async fn test_create_then_list_round_trips_every_field() {
        let store = Store::in_memory().await.unwrap();
        let input = Movie {
            id: 0,
            details: Details {
                title: "Dune".to_string(),
                year: 2021,
                genre: "Sci-Fi".to_string(),
                streaming: "HBO Max".to_string(),
                notes: "Watch in IMAX".to_string(),
                imdb_link: "https://www.imdb.com/title/tt1160419/".to_string(),
            },
            available_now: true,
        };

        let id = store.create(&input).await.unwrap();
        let movies: Vec<Movie> = store.list_all().await.unwrap();

        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0], Movie { id, ..input });
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = Store::in_memory().await.unwrap();
        let first = store.create(&movie("A", 2000, false)).await.unwrap();
        let second = store.create(&movie("B", 2000, false)).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_list_all_empty_table() {
        let store = Store::in_memory().await.unwrap();
        let shows: Vec<TvShow> = store.list_all().await.unwrap();
        assert!(shows.is_empty());
        assert_eq!(store.count::<TvShow>().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_all_orders_by_flag_then_year() {
        let store = Store::in_memory().await.unwrap();
        store.create(&movie("Old unavailable", 1990, false)).await.unwrap();
        store.create(&movie("New unavailable", 2020, false)).await.unwrap();
        store.create(&movie("Old available", 1980, true)).await.unwrap();
        store.create(&movie("New available", 2022, true)).await.unwrap();

        let titles: Vec<String> = store
            .list_all::<Movie>()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.details.title)
            .collect();

        assert_eq!(
            titles,
            vec!["New available", "Old available", "New unavailable", "Old unavailable"]
        );
    }

    async fn movie_titles(store: &Store) -> Vec<String> {
        store
            .list_all::<Movie>()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.details.title)
            .collect()
    }

    #[tokio::test]
    async fn test_ping_fails_after_close() {
        let store = Store::in_memory().await.unwrap();
        store.ping().await.unwrap();

        store.close().await;
        assert!(store.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_list_all_same_flag_and_year_newest_first() {
        let store = Store::in_memory().await.unwrap();
        store.create(&movie("First", 2001, true)).await.unwrap();
        store.create(&movie("Second", 2001, true)).await.unwrap();
        store.create(&movie("Third", 2001, true)).await.unwrap();

        assert_eq!(movie_titles(&store).await, vec!["Third", "Second", "First"]);
    }

    #[tokio::test]
    async fn test_list_all_orders_by_created_at_before_id() {
        let store = Store::in_memory().await.unwrap();
        for (title, created_at) in [
            ("Added last", "2030-01-01 00:00:00"),
            ("Added first", "2010-01-01 00:00:00"),
            ("Added middle", "2020-01-01 00:00:00"),
        ] {
            let id = store.create(&movie(title, 1999, false)).await.unwrap();
            sqlx::query("UPDATE movies SET created_at = ? WHERE id = ?")
                .bind(created_at)
                .bind(id)
                .execute(store.pool())
                .await
                .unwrap();
        }

        assert_eq!(
            movie_titles(&store).await,
            vec!["Added last", "Added middle", "Added first"]
        );
    }

    #[tokio::test]
    async fn test_random_flagged_none_without_flagged_rows() {
        let store = Store::in_memory().await.unwrap();
        assert!(store.random_flagged::<Movie>().await.unwrap().is_none());

        store.create(&movie("Not yet", 2024, false)).await.unwrap();
        assert!(store.random_flagged::<Movie>().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_random_flagged_only_returns_flagged_rows() {
        let store = Store::in_memory().await.unwrap();
        store.create(&movie("Hidden", 2001, false)).await.unwrap();
        store.create(&movie("Pick me", 2002, true)).await.unwrap();
        store.create(&movie("Or me", 2003, true)).await.unwrap();

        for _ in 0..20 {
            let pick = store.random_flagged::<Movie>().await.unwrap().unwrap();
            assert!(pick.available_now);
            assert_ne!(pick.details.title, "Hidden");
        }
    }

    #[tokio::test]
    async fn test_update_overwrites_whole_row() {
        let store = Store::in_memory().await.unwrap();
        let id = store.create(&show("Severance", true)).await.unwrap();

        let edited = TvShow {
            id,
            details: Details {
                title: "Severance".to_string(),
                year: 2022,
                genre: "Drama".to_string(),
                ..Details::default()
            },
            active_season: false,
        };
        store.update(&edited).await.unwrap();

        let shows: Vec<TvShow> = store.list_all().await.unwrap();
        assert_eq!(shows, vec![edited]);
    }

    #[tokio::test]
    async fn test_update_missing_id_is_a_no_op() {
        let store = Store::in_memory().await.unwrap();
        let id = store.create(&show("Andor", true)).await.unwrap();
        let before: Vec<TvShow> = store.list_all().await.unwrap();

        let ghost = TvShow { id: id + 100, ..show("Ghost", false) };
        store.update(&ghost).await.unwrap();

        let after: Vec<TvShow> = store.list_all().await.unwrap();
        assert_eq!(before, after);
        assert_eq!(store.count::<TvShow>().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = Store::in_memory().await.unwrap();
        let keep = store.create(&movie("Keep", 2000, false)).await.unwrap();
        let drop = store.create(&movie("Drop", 2000, false)).await.unwrap();

        store.delete::<Movie>(drop).await.unwrap();
        store.delete::<Movie>(9999).await.unwrap();

        let movies: Vec<Movie> = store.list_all().await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].id, keep);
    }

    #[tokio::test]
    async fn test_tables_are_independent() {
        let store = Store::in_memory().await.unwrap();
        store.create(&movie("Heat", 1995, true)).await.unwrap();

        assert_eq!(store.count::<Movie>().await.unwrap(), 1);
        assert_eq!(store.count::<TvShow>().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_flag_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();

        let store = Store::open(dir.path(), "watch").await.unwrap();
        store.create(&show("The Bear", true)).await.unwrap();
        store.create(&show("Lost", false)).await.unwrap();
        store.close().await;

        let store = Store::open(dir.path(), "watch").await.unwrap();
        let shows: Vec<TvShow> = store.list_all().await.unwrap();
        assert_eq!(shows.len(), 2);
        assert!(shows[0].active_season);
        assert!(!shows[1].active_season);

        let raw: i64 = sqlx::query_scalar("SELECT active_season FROM tv_shows WHERE title = 'The Bear'")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(raw, 1);
    }

    #[tokio::test]
    async fn test_legacy_table_gains_missing_columns() {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("legacy.db");

        // Movies table from before streaming services and the availability flag
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await.unwrap();
        sqlx::query(
            "CREATE TABLE movies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                year INTEGER,
                genre TEXT,
                notes TEXT,
                imdb_link TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO movies (title) VALUES ('Alien')")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        let store = Store::open(dir.path(), "legacy").await.unwrap();
        let movies: Vec<Movie> = store.list_all().await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].details.title, "Alien");
        assert_eq!(movies[0].details.year, 0);
        assert_eq!(movies[0].details.streaming, "");
        assert!(!movies[0].available_now);

        store.create(&movie("Aliens", 1986, true)).await.unwrap();
        assert_eq!(store.count::<Movie>().await.unwrap(), 2);
    }
}
