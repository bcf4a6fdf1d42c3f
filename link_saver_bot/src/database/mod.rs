use std::{future::Future, str::FromStr};

use chrono::Utc;
pub use sqlx::Error;
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Executor, Row, Sqlite,
};
use teloxide::types::UserId;

use crate::{
    config::Config,
    types::{Link, Tag, TagSet},
};

type Pool = sqlx::Pool<Sqlite>;

/// Per-owner storage of saved links. Every operation only ever sees
/// the links of the given owner.
pub trait LinkStore: Send + Sync {
    /// Store a new link and return it as stored.
    fn save(
        &self,
        owner: UserId,
        url: &str,
        tags: &TagSet,
    ) -> impl Future<Output = Result<Link, Error>> + Send;

    /// All links of the owner, oldest first.
    fn list_all(&self, owner: UserId) -> impl Future<Output = Result<Vec<Link>, Error>> + Send;

    /// Every tag the owner has used on any link.
    fn list_tags(&self, owner: UserId) -> impl Future<Output = Result<TagSet, Error>> + Send;

    /// Links of the owner that have this tag, oldest first.
    fn find_by_tag(
        &self,
        owner: UserId,
        tag: &Tag,
    ) -> impl Future<Output = Result<Vec<Link>, Error>> + Send;
}

pub struct Database {
    pool: Pool,
}

#[allow(clippy::cast_possible_wrap)]
fn owner_to_db(owner: UserId) -> i64 {
    owner.0 as i64
}

#[allow(clippy::cast_sign_loss)]
fn link_from_row(row: SqliteRow) -> Result<Link, Error> {
    let tags: String = row.try_get("tags")?;
    let tags: Vec<String> =
        serde_json::from_str(&tags).map_err(|e| Error::Decode(Box::new(e)))?;

    Ok(Link {
        id: row.try_get("id")?,
        owner: UserId(row.try_get::<i64, _>("owner_id")? as u64),
        url: row.try_get("url")?,
        tags: tags.iter().filter_map(|tag| Tag::new(tag)).collect(),
        created_at: row.try_get("created_at")?,
    })
}

impl Database {
    /// Connect to the database at the configured URL, creating it
    /// and its tables if they don't exist yet.
    pub async fn connect(config: &Config) -> Result<Database, Error> {
        let url = config.database_url.as_str();
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            log::info!("Creating a new database at {url}");
            Sqlite::create_database(url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(32)
            .acquire_timeout(config.storage_timeout)
            .connect_with(
                SqliteConnectOptions::from_str(url)?
                    .pragma("cache_size", "-32768")
                    .busy_timeout(config.storage_timeout),
            )
            .await?;

        Self::from_pool(pool).await
    }

    /// A fresh database that lives only as long as this object.
    #[cfg(test)]
    pub async fn connect_in_memory() -> Result<Database, Error> {
        // Every connection to ":memory:" is its own database, so keep exactly one alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
            .await?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: Pool) -> Result<Database, Error> {
        // LINKS:
        // id (key, i64, also insertion order)
        // owner_id (i64 because sqlite doesn't support u64)
        // url (string, verbatim as sent by the user)
        // tags (JSON array of lowercase strings without "#")
        // created_at (date+time in UTC)
        pool.execute(sqlx::query(
            "CREATE TABLE IF NOT EXISTS links (
                id INTEGER PRIMARY KEY NOT NULL,
                owner_id INTEGER NOT NULL,
                url TEXT NOT NULL,
                tags TEXT NOT NULL,
                created_at TEXT NOT NULL
            ) STRICT;",
        ))
        .await?;

        pool.execute(sqlx::query(
            "CREATE INDEX IF NOT EXISTS links_owner_created ON links(owner_id, created_at);",
        ))
        .await?;

        Ok(Database { pool })
    }

    /// Close all connections. Any further operation fails.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl LinkStore for Database {
    async fn save(&self, owner: UserId, url: &str, tags: &TagSet) -> Result<Link, Error> {
        let created_at = Utc::now();
        let tags_json = serde_json::to_string(&tags.iter().map(Tag::as_str).collect::<Vec<_>>())
            .expect("Serializing a list of strings never fails");

        let id = sqlx::query(
            "INSERT INTO links(owner_id, url, tags, created_at)
            VALUES (?, ?, ?, ?);",
        )
        .bind(owner_to_db(owner))
        .bind(url)
        .bind(&tags_json)
        .bind(created_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(Link {
            id,
            owner,
            url: url.to_string(),
            tags: tags.clone(),
            created_at,
        })
    }

    async fn list_all(&self, owner: UserId) -> Result<Vec<Link>, Error> {
        sqlx::query(
            "SELECT id, owner_id, url, tags, created_at FROM links
            WHERE owner_id=?
            ORDER BY created_at ASC, id ASC;",
        )
        .bind(owner_to_db(owner))
        .try_map(link_from_row)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_tags(&self, owner: UserId) -> Result<TagSet, Error> {
        let tags: Vec<String> = sqlx::query(
            "SELECT DISTINCT tag.value AS tag FROM links, json_each(links.tags) AS tag
            WHERE links.owner_id=?;",
        )
        .bind(owner_to_db(owner))
        .try_map(|row: SqliteRow| row.try_get::<String, _>("tag"))
        .fetch_all(&self.pool)
        .await?;

        Ok(tags.iter().filter_map(|tag| Tag::new(tag)).collect())
    }

    async fn find_by_tag(&self, owner: UserId, tag: &Tag) -> Result<Vec<Link>, Error> {
        // Stored tags are lowercase, and so is `tag`.
        sqlx::query(
            "SELECT id, owner_id, url, tags, created_at FROM links
            WHERE owner_id=? AND EXISTS (
                SELECT 1 FROM json_each(links.tags) WHERE json_each.value=?
            )
            ORDER BY created_at ASC, id ASC;",
        )
        .bind(owner_to_db(owner))
        .bind(tag.as_str())
        .try_map(link_from_row)
        .fetch_all(&self.pool)
        .await
    }
}
