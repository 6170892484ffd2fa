//! Persistent store backed by a file-resident SQLite database.
//!
//! The database runs in WAL mode with `synchronous = FULL`. On open the
//! schema is migrated, the default collection is (re)written, and the WAL
//! is checkpointed into the main file. Callers should invoke
//! [`ArchiveStore::flush`] periodically to keep the WAL short.

use std::path::Path;
use std::time::Duration;

use archive_core::error::CoreError;
use archive_core::pagination::{PageWindow, ResultPage};
use archive_core::types::{DbId, DEFAULT_COLLECTION_ID, DEFAULT_COLLECTION_NAME};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePoolOptions,
    SqliteSynchronous,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};

use crate::error::StoreError;
use crate::models::collection::{Collection, CollectionParams};
use crate::models::entry::{Entry, EntryParams, SearchFilter};
use crate::store::{ensure_collection_deletable, ArchiveStore};

/// Embedded schema migrations from `crates/db/migrations`.
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Upper bound on pooled connections. SQLite serializes writers anyway.
const MAX_CONNECTIONS: u32 = 8;

/// How long a writer waits for the database lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Column list for `entry` queries.
const ENTRY_COLUMNS: &str = "\
    id, title, description, donor, year_created, colour, size, collection_id, \
    physical_location, media_type, image, accession_number, date_added, \
    date_last_modified";

/// Column list for `entry` queries joined against `collection` (aliased `e`).
const ENTRY_COLUMNS_JOINED: &str = "\
    e.id AS id, e.title AS title, e.description AS description, e.donor AS donor, \
    e.year_created AS year_created, e.colour AS colour, e.size AS size, \
    e.collection_id AS collection_id, e.physical_location AS physical_location, \
    e.media_type AS media_type, e.image AS image, \
    e.accession_number AS accession_number, e.date_added AS date_added, \
    e.date_last_modified AS date_last_modified";

/// Column list for `collection` queries.
const COLLECTION_COLUMNS: &str = "id, name, date_created";

/// SQLite-backed [`ArchiveStore`].
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if necessary) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        run_migrations(&pool).await?;
        ensure_default_collection(&pool).await?;

        let store = Self { pool };
        store.flush().await?;
        Ok(store)
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection, checkpointing the WAL on the way out.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Begin a transaction that holds the write lock from its first statement.
    ///
    /// A deferred transaction that reads before writing cannot upgrade its
    /// lock while another connection has written since the read began; SQLite
    /// fails that upgrade with `SQLITE_BUSY` without waiting. `BEGIN IMMEDIATE`
    /// instead waits up to [`BUSY_TIMEOUT`] for the lock.
    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin_with("BEGIN IMMEDIATE").await
    }
}

/// Apply any pending schema migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Insert the default collection, or rename it back to its canonical name.
async fn ensure_default_collection(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO collection (id, name, date_created) VALUES ($1, $2, $3) \
         ON CONFLICT (id) DO UPDATE SET name = excluded.name",
    )
    .bind(DEFAULT_COLLECTION_ID)
    .bind(DEFAULT_COLLECTION_NAME)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared query helpers
// ---------------------------------------------------------------------------

async fn collection_exists(conn: &mut SqliteConnection, id: DbId) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM collection WHERE id = $1")
        .bind(id)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

async fn entry_exists(conn: &mut SqliteConnection, id: DbId) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entry WHERE id = $1")
        .bind(id)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

async fn require_collection(conn: &mut SqliteConnection, id: DbId) -> Result<(), StoreError> {
    if collection_exists(conn, id).await? {
        Ok(())
    } else {
        Err(CoreError::UnknownReference {
            entity: "Collection",
            id,
        }
        .into())
    }
}

/// Append `AND instr(column, value) > 0` for every non-empty filter field.
///
/// `instr` is used instead of `LIKE` because it is case-sensitive and
/// treats `%` and `_` in user input literally.
fn push_search_conditions<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filter: &'a SearchFilter) {
    let fields = [
        ("e.title", &filter.title),
        ("e.description", &filter.description),
        ("e.donor", &filter.donor),
        ("e.media_type", &filter.media_type),
        ("c.name", &filter.collection),
    ];
    for (column, value) in fields {
        if value.is_empty() {
            continue;
        }
        qb.push(" AND instr(")
            .push(column)
            .push(", ")
            .push_bind(value.as_str())
            .push(") > 0");
    }
}

#[async_trait]
impl ArchiveStore for SqliteStore {
    async fn create_entry(&self, params: &EntryParams) -> Result<Entry, StoreError> {
        params.validate()?;

        let mut tx = self.begin_write().await?;
        require_collection(&mut tx, params.collection_id).await?;

        let now = Utc::now();
        let query = format!(
            "INSERT INTO entry (title, description, donor, year_created, colour, size, \
                 collection_id, physical_location, media_type, image, accession_number, \
                 date_added, date_last_modified) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {ENTRY_COLUMNS}"
        );
        let entry = sqlx::query_as::<_, Entry>(&query)
            .bind(&params.title)
            .bind(&params.description)
            .bind(&params.donor)
            .bind(&params.year_created)
            .bind(&params.colour)
            .bind(&params.size)
            .bind(params.collection_id)
            .bind(&params.physical_location)
            .bind(&params.media_type)
            .bind(params.image_or_empty())
            .bind(params.accession_number.as_deref())
            .bind(now)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(entry)
    }

    async fn edit_entry(&self, id: DbId, params: &EntryParams) -> Result<Entry, StoreError> {
        params.validate()?;

        let mut tx = self.begin_write().await?;
        if !entry_exists(&mut tx, id).await? {
            return Err(CoreError::NotFound { entity: "Entry", id }.into());
        }
        require_collection(&mut tx, params.collection_id).await?;

        let query = format!(
            "UPDATE entry SET \
                 title = $2, description = $3, donor = $4, year_created = $5, \
                 colour = $6, size = $7, collection_id = $8, physical_location = $9, \
                 media_type = $10, image = $11, accession_number = $12, \
                 date_last_modified = $13 \
             WHERE id = $1 \
             RETURNING {ENTRY_COLUMNS}"
        );
        let entry = sqlx::query_as::<_, Entry>(&query)
            .bind(id)
            .bind(&params.title)
            .bind(&params.description)
            .bind(&params.donor)
            .bind(&params.year_created)
            .bind(&params.colour)
            .bind(&params.size)
            .bind(params.collection_id)
            .bind(&params.physical_location)
            .bind(&params.media_type)
            .bind(params.image_or_empty())
            .bind(params.accession_number.as_deref())
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(entry)
    }

    async fn delete_entry(&self, id: DbId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM entry WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_entry(&self, id: DbId) -> Result<Option<Entry>, StoreError> {
        let query = format!("SELECT {ENTRY_COLUMNS} FROM entry WHERE id = $1");
        let entry = sqlx::query_as::<_, Entry>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    async fn get_entries(
        &self,
        count: Option<i64>,
        offset: Option<i64>,
    ) -> Result<ResultPage<Entry>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entry")
            .fetch_one(&mut *tx)
            .await?;
        let window = PageWindow::clamp(total, count, offset);

        let query = format!("SELECT {ENTRY_COLUMNS} FROM entry ORDER BY id LIMIT $1 OFFSET $2");
        let entries = sqlx::query_as::<_, Entry>(&query)
            .bind(window.count)
            .bind(window.offset)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ResultPage::new(total, window, entries))
    }

    async fn search_entries(
        &self,
        filter: &SearchFilter,
        count: Option<i64>,
        offset: Option<i64>,
    ) -> Result<ResultPage<Entry>, StoreError> {
        const FROM_JOINED: &str =
            " FROM entry e INNER JOIN collection c ON c.id = e.collection_id WHERE 1 = 1";

        // Every entry references an existing collection, so the join only
        // matters when some field constrains the result.
        if filter.is_empty() {
            return self.get_entries(count, offset).await;
        }

        let mut tx = self.pool.begin().await?;

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*)");
        count_qb.push(FROM_JOINED);
        push_search_conditions(&mut count_qb, filter);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&mut *tx)
            .await?;
        let window = PageWindow::clamp(total, count, offset);

        let mut page_qb = QueryBuilder::<Sqlite>::new("SELECT ");
        page_qb.push(ENTRY_COLUMNS_JOINED).push(FROM_JOINED);
        push_search_conditions(&mut page_qb, filter);
        page_qb
            .push(" ORDER BY e.id LIMIT ")
            .push_bind(window.count)
            .push(" OFFSET ")
            .push_bind(window.offset);
        let entries = page_qb
            .build_query_as::<Entry>()
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ResultPage::new(total, window, entries))
    }

    async fn get_entries_by_collection(
        &self,
        collection_id: DbId,
        count: Option<i64>,
        offset: Option<i64>,
    ) -> Result<ResultPage<Entry>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entry WHERE collection_id = $1")
            .bind(collection_id)
            .fetch_one(&mut *tx)
            .await?;
        let window = PageWindow::clamp(total, count, offset);

        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM entry WHERE collection_id = $1 \
             ORDER BY id LIMIT $2 OFFSET $3"
        );
        let entries = sqlx::query_as::<_, Entry>(&query)
            .bind(collection_id)
            .bind(window.count)
            .bind(window.offset)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ResultPage::new(total, window, entries))
    }

    async fn create_collection(
        &self,
        params: &CollectionParams,
    ) -> Result<Collection, StoreError> {
        params.validate()?;

        let query = format!(
            "INSERT INTO collection (name, date_created) VALUES ($1, $2) \
             RETURNING {COLLECTION_COLUMNS}"
        );
        let collection = sqlx::query_as::<_, Collection>(&query)
            .bind(&params.name)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        Ok(collection)
    }

    async fn edit_collection(
        &self,
        id: DbId,
        params: &CollectionParams,
    ) -> Result<Collection, StoreError> {
        params.validate()?;

        let query = format!(
            "UPDATE collection SET name = $2 WHERE id = $1 RETURNING {COLLECTION_COLUMNS}"
        );
        sqlx::query_as::<_, Collection>(&query)
            .bind(id)
            .bind(&params.name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "Collection",
                    id,
                }
                .into()
            })
    }

    async fn delete_collection(&self, id: DbId) -> Result<(), StoreError> {
        ensure_collection_deletable(id)?;

        let mut tx = self.begin_write().await?;
        let reassigned = sqlx::query("UPDATE entry SET collection_id = $1 WHERE collection_id = $2")
            .bind(DEFAULT_COLLECTION_ID)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM collection WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if reassigned > 0 {
            tracing::debug!(collection_id = id, reassigned, "Entries moved to default collection");
        }
        Ok(())
    }

    async fn get_collection(&self, id: DbId) -> Result<Option<Collection>, StoreError> {
        let query = format!("SELECT {COLLECTION_COLUMNS} FROM collection WHERE id = $1");
        let collection = sqlx::query_as::<_, Collection>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(collection)
    }

    async fn get_collections(
        &self,
        count: Option<i64>,
        offset: Option<i64>,
    ) -> Result<ResultPage<Collection>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM collection")
            .fetch_one(&mut *tx)
            .await?;
        let window = PageWindow::clamp(total, count, offset);

        let query = format!(
            "SELECT {COLLECTION_COLUMNS} FROM collection ORDER BY id LIMIT $1 OFFSET $2"
        );
        let collections = sqlx::query_as::<_, Collection>(&query)
            .bind(window.count)
            .bind(window.offset)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ResultPage::new(total, window, collections))
    }

    /// Checkpoint the WAL into the main database file.
    async fn flush(&self) -> Result<(), StoreError> {
        let (busy, log_frames, checkpointed): (i64, i64, i64) =
            sqlx::query_as("PRAGMA wal_checkpoint(RESTART)")
                .fetch_one(&self.pool)
                .await?;
        tracing::debug!(busy, log_frames, checkpointed, "WAL checkpoint");
        Ok(())
    }
}
