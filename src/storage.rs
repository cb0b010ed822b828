//! SQLite storage layer for campusnet.
//!
//! Every entity of the core maps to one table here. The uniqueness rules the
//! rest of the crate relies on for correctness under concurrent requests
//! (one like per actor and subject, one interest per candidate and gig, one
//! accepted interest per gig, one connection row per unordered pair, one
//! review per reviewer and gig) are declared in the schema itself, so they
//! hold even when several handles write to the same database file.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{
    params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How long a writer waits for a competing writer before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Whether the failure was a UNIQUE / PRIMARY KEY violation.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation
                    && (err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        )
    }
}

/// A status column held a value no variant recognises.
#[derive(Debug, Error)]
#[error("unknown {kind} status: {value}")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

// ---------------------------------------------------------------------------
// Status enums
// ---------------------------------------------------------------------------

/// Stored lifecycle of a connection row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Connected,
    Rejected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ConnectionStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ConnectionStatus::Pending),
            "connected" => Ok(ConnectionStatus::Connected),
            "rejected" => Ok(ConnectionStatus::Rejected),
            other => Err(ParseStatusError {
                kind: "connection",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle of a gig listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GigStatus {
    Active,
    Closed,
    Completed,
}

impl GigStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GigStatus::Active => "Active",
            GigStatus::Closed => "Closed",
            GigStatus::Completed => "Completed",
        }
    }
}

impl FromStr for GigStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(GigStatus::Active),
            "Closed" => Ok(GigStatus::Closed),
            "Completed" => Ok(GigStatus::Completed),
            other => Err(ParseStatusError {
                kind: "gig",
                value: other.to_string(),
            }),
        }
    }
}

/// State of one candidate's interest in a gig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InterestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterestStatus::Pending => "pending",
            InterestStatus::Accepted => "accepted",
            InterestStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for InterestStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InterestStatus::Pending),
            "accepted" => Ok(InterestStatus::Accepted),
            "rejected" => Ok(InterestStatus::Rejected),
            other => Err(ParseStatusError {
                kind: "interest",
                value: other.to_string(),
            }),
        }
    }
}

/// Store status enums as their text form.
macro_rules! text_column {
    ($($ty:ty),+) => {$(
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    )+};
}

text_column!(ConnectionStatus, GigStatus, InterestStatus);

/// Which kind of subject a like fact points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Post(i64),
    Comment(i64),
}

impl LikeTarget {
    pub fn id(&self) -> i64 {
        match self {
            LikeTarget::Post(id) | LikeTarget::Comment(id) => *id,
        }
    }

    pub fn kind(&self) -> LikeKind {
        match self {
            LikeTarget::Post(_) => LikeKind::Post,
            LikeTarget::Comment(_) => LikeKind::Comment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeKind {
    Post,
    Comment,
}

impl LikeKind {
    fn table(&self) -> &'static str {
        match self {
            LikeKind::Post => "post_likes",
            LikeKind::Comment => "comment_likes",
        }
    }

    fn subject_column(&self) -> &'static str {
        match self {
            LikeKind::Post => "post_id",
            LikeKind::Comment => "comment_id",
        }
    }
}

/// Which side of a gig is confirming completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmFlag {
    Provider,
    Worker,
}

/// Monotonic gig counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GigCounter {
    Views,
    Responses,
}

/// Outcome of accepting or rejecting a gig interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterestChange {
    /// The candidate has no interest row for the gig.
    Missing,
    /// The gig is completed; nothing was written.
    GigCompleted,
    /// Written. `swept` counts competitors rejected alongside.
    Applied { swept: usize },
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// Directory entry maintained by the external registration system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_photo: Option<String>,
    pub major: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRow {
    pub id: i64,
    pub from_username: String,
    pub to_username: String,
    pub status: ConnectionStatus,
    pub requested_at: u64,
    pub responded_at: Option<u64>,
}

/// A post together with its hashtags and ordered media references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRow {
    pub id: i64,
    pub username: String,
    pub text: String,
    pub created_at: u64,
    pub hashtags: Vec<String>,
    pub image_urls: Vec<String>,
    pub video_urls: Vec<String>,
}

/// Input for [`Storage::insert_post`].
#[derive(Debug, Clone, Default)]
pub struct NewPostRow {
    pub username: String,
    pub text: String,
    pub created_at: u64,
    /// Already normalised and deduplicated.
    pub hashtags: Vec<String>,
    pub image_urls: Vec<String>,
    pub video_urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub username: String,
    pub text: String,
    pub parent_id: Option<i64>,
    pub created_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GigRow {
    pub id: i64,
    pub username: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub location: String,
    pub duration: String,
    pub skills_required: Option<String>,
    pub status: GigStatus,
    pub views: u32,
    pub responses: u32,
    pub rating: f64,
    pub provider_confirmed_completion: bool,
    pub worker_confirmed_completion: bool,
    pub created_at: u64,
}

/// Editable descriptive fields of a gig.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GigDetails {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub skills_required: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GigInterestRow {
    pub gig_id: i64,
    pub username: String,
    pub status: InterestStatus,
    pub created_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRow {
    pub id: i64,
    pub gig_id: i64,
    pub reviewer_username: String,
    pub reviewee_username: String,
    pub rating: u8,
    pub communication_rating: u8,
    pub quality_rating: u8,
    pub value_rating: u8,
    pub reliability_rating: u8,
    pub comment: String,
    pub is_worker_review: bool,
    pub created_at: u64,
}

// ---------------------------------------------------------------------------
// Storage handle
// ---------------------------------------------------------------------------

/// Main storage handle wrapping a SQLite connection.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open or create a database at the given path. Creates schema if needed.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let storage = Self::connect(path)?;
        storage.conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        storage.create_schema()?;
        Ok(storage)
    }

    /// Open another handle on a database that [`Storage::open`] already
    /// initialised. Handles share nothing in memory.
    pub fn connect(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let storage = Self { conn };
        storage.create_schema()?;
        Ok(storage)
    }

    fn create_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                username        TEXT PRIMARY KEY,
                first_name      TEXT NOT NULL DEFAULT '',
                last_name       TEXT NOT NULL DEFAULT '',
                profile_photo   TEXT,
                major           TEXT
            );

            CREATE TABLE IF NOT EXISTS connections (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                from_username   TEXT NOT NULL,
                to_username     TEXT NOT NULL,
                status          TEXT NOT NULL DEFAULT 'pending',
                requested_at    INTEGER NOT NULL,
                responded_at    INTEGER
            );

            -- One row per unordered pair, whatever its status.
            CREATE UNIQUE INDEX IF NOT EXISTS idx_connections_pair
                ON connections(min(from_username, to_username), max(from_username, to_username));
            CREATE INDEX IF NOT EXISTS idx_connections_to
                ON connections(to_username, status);
            CREATE INDEX IF NOT EXISTS idx_connections_from
                ON connections(from_username, status);

            CREATE TABLE IF NOT EXISTS posts (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                username        TEXT NOT NULL,
                text            TEXT NOT NULL DEFAULT '',
                created_at      INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_posts_author
                ON posts(username, created_at);

            CREATE TABLE IF NOT EXISTS post_media (
                post_id         INTEGER NOT NULL REFERENCES posts(id),
                kind            TEXT NOT NULL,
                position        INTEGER NOT NULL,
                reference       TEXT NOT NULL,
                PRIMARY KEY (post_id, kind, position)
            );

            CREATE TABLE IF NOT EXISTS hashtags (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS post_hashtags (
                post_id         INTEGER NOT NULL REFERENCES posts(id),
                hashtag_id      INTEGER NOT NULL REFERENCES hashtags(id),
                PRIMARY KEY (post_id, hashtag_id)
            );

            CREATE TABLE IF NOT EXISTS post_likes (
                post_id         INTEGER NOT NULL REFERENCES posts(id),
                username        TEXT NOT NULL,
                created_at      INTEGER NOT NULL,
                PRIMARY KEY (post_id, username)
            );

            CREATE INDEX IF NOT EXISTS idx_post_likes_user
                ON post_likes(username);

            CREATE TABLE IF NOT EXISTS comments (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id         INTEGER NOT NULL REFERENCES posts(id),
                username        TEXT NOT NULL,
                text            TEXT NOT NULL,
                parent_id       INTEGER,
                created_at      INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_comments_post
                ON comments(post_id, created_at);

            CREATE TABLE IF NOT EXISTS comment_likes (
                comment_id      INTEGER NOT NULL REFERENCES comments(id),
                username        TEXT NOT NULL,
                created_at      INTEGER NOT NULL,
                PRIMARY KEY (comment_id, username)
            );

            CREATE INDEX IF NOT EXISTS idx_comment_likes_user
                ON comment_likes(username);

            CREATE TABLE IF NOT EXISTS gigs (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                username            TEXT NOT NULL,
                title               TEXT NOT NULL,
                description         TEXT NOT NULL DEFAULT '',
                category            TEXT NOT NULL DEFAULT '',
                price               REAL NOT NULL DEFAULT 0,
                location            TEXT NOT NULL DEFAULT '',
                duration            TEXT NOT NULL DEFAULT '',
                skills_required     TEXT,
                status              TEXT NOT NULL DEFAULT 'Active',
                views               INTEGER NOT NULL DEFAULT 0,
                responses           INTEGER NOT NULL DEFAULT 0,
                rating              REAL NOT NULL DEFAULT 0,
                provider_confirmed  INTEGER NOT NULL DEFAULT 0,
                worker_confirmed    INTEGER NOT NULL DEFAULT 0,
                created_at          INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_gigs_owner
                ON gigs(username);
            CREATE INDEX IF NOT EXISTS idx_gigs_category
                ON gigs(category);

            CREATE TABLE IF NOT EXISTS gig_interests (
                gig_id          INTEGER NOT NULL REFERENCES gigs(id),
                username        TEXT NOT NULL,
                status          TEXT NOT NULL DEFAULT 'pending',
                created_at      INTEGER NOT NULL,
                PRIMARY KEY (gig_id, username)
            );

            -- At most one accepted worker per gig.
            CREATE UNIQUE INDEX IF NOT EXISTS idx_gig_interests_accepted
                ON gig_interests(gig_id) WHERE status = 'accepted';
            CREATE INDEX IF NOT EXISTS idx_gig_interests_user
                ON gig_interests(username, status);

            CREATE TABLE IF NOT EXISTS reviews (
                id                      INTEGER PRIMARY KEY AUTOINCREMENT,
                gig_id                  INTEGER NOT NULL,
                reviewer_username       TEXT NOT NULL,
                reviewee_username       TEXT NOT NULL,
                rating                  INTEGER NOT NULL,
                communication_rating    INTEGER NOT NULL,
                quality_rating          INTEGER NOT NULL,
                value_rating            INTEGER NOT NULL,
                reliability_rating      INTEGER NOT NULL,
                comment                 TEXT NOT NULL DEFAULT '',
                is_worker_review        INTEGER NOT NULL,
                created_at              INTEGER NOT NULL,
                UNIQUE (gig_id, reviewer_username)
            );

            CREATE INDEX IF NOT EXISTS idx_reviews_reviewee
                ON reviews(reviewee_username);
            ",
        )?;
        Ok(())
    }

    /// Begin a transaction that takes the write lock up front, so competing
    /// writers queue on the busy timeout instead of failing on lock upgrade.
    fn write_transaction(&self) -> Result<Transaction<'_>, StorageError> {
        Ok(Transaction::new_unchecked(
            &self.conn,
            TransactionBehavior::Immediate,
        )?)
    }

    /// Cheap round-trip used by the health endpoint.
    pub fn ping(&self) -> Result<(), StorageError> {
        self.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    pub fn upsert_user(&self, row: &UserRow) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO users (username, first_name, last_name, profile_photo, major)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                row.username,
                row.first_name,
                row.last_name,
                row.profile_photo,
                row.major,
            ],
        )?;
        Ok(())
    }

    pub fn get_user(&self, username: &str) -> Result<Option<UserRow>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT username, first_name, last_name, profile_photo, major
                 FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(UserRow {
                        username: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                        profile_photo: row.get(3)?,
                        major: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    // -----------------------------------------------------------------------
    // Connections
    // -----------------------------------------------------------------------

    /// Insert a pending request. Fails with a unique violation when any row
    /// already exists for the unordered pair.
    pub fn insert_connection(
        &self,
        from_username: &str,
        to_username: &str,
        requested_at: u64,
    ) -> Result<ConnectionRow, StorageError> {
        self.conn.execute(
            "INSERT INTO connections (from_username, to_username, status, requested_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                from_username,
                to_username,
                ConnectionStatus::Pending,
                requested_at,
            ],
        )?;
        Ok(ConnectionRow {
            id: self.conn.last_insert_rowid(),
            from_username: from_username.to_string(),
            to_username: to_username.to_string(),
            status: ConnectionStatus::Pending,
            requested_at,
            responded_at: None,
        })
    }

    /// Find the row in exactly the `from -> to` direction.
    pub fn find_connection(
        &self,
        from_username: &str,
        to_username: &str,
    ) -> Result<Option<ConnectionRow>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, from_username, to_username, status, requested_at, responded_at
                 FROM connections WHERE from_username = ?1 AND to_username = ?2",
                params![from_username, to_username],
                connection_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Find the row for the unordered pair, in either direction.
    pub fn find_connection_between(
        &self,
        a: &str,
        b: &str,
    ) -> Result<Option<ConnectionRow>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, from_username, to_username, status, requested_at, responded_at
                 FROM connections
                 WHERE (from_username = ?1 AND to_username = ?2)
                    OR (from_username = ?2 AND to_username = ?1)",
                params![a, b],
                connection_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Reset an existing row to a fresh pending request in the given direction.
    pub fn reopen_connection(
        &self,
        id: i64,
        from_username: &str,
        to_username: &str,
        requested_at: u64,
    ) -> Result<ConnectionRow, StorageError> {
        self.conn.execute(
            "UPDATE connections
             SET from_username = ?1, to_username = ?2, status = ?3,
                 requested_at = ?4, responded_at = NULL
             WHERE id = ?5",
            params![
                from_username,
                to_username,
                ConnectionStatus::Pending,
                requested_at,
                id,
            ],
        )?;
        Ok(ConnectionRow {
            id,
            from_username: from_username.to_string(),
            to_username: to_username.to_string(),
            status: ConnectionStatus::Pending,
            requested_at,
            responded_at: None,
        })
    }

    /// Move a pending `from -> to` row to `status`. Returns false when no
    /// pending row exists in that direction.
    pub fn respond_to_connection(
        &self,
        from_username: &str,
        to_username: &str,
        status: ConnectionStatus,
        responded_at: u64,
    ) -> Result<bool, StorageError> {
        let affected = self.conn.execute(
            "UPDATE connections SET status = ?1, responded_at = ?2
             WHERE from_username = ?3 AND to_username = ?4 AND status = ?5",
            params![
                status,
                responded_at,
                from_username,
                to_username,
                ConnectionStatus::Pending,
            ],
        )?;
        Ok(affected > 0)
    }

    /// Delete every row for the unordered pair. Returns the number removed.
    pub fn delete_connections_between(&self, a: &str, b: &str) -> Result<usize, StorageError> {
        let affected = self.conn.execute(
            "DELETE FROM connections
             WHERE (from_username = ?1 AND to_username = ?2)
                OR (from_username = ?2 AND to_username = ?1)",
            params![a, b],
        )?;
        Ok(affected)
    }

    /// Handles on the other side of every connected row touching `username`,
    /// oldest connection first.
    pub fn list_connected_usernames(&self, username: &str) -> Result<Vec<String>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT CASE WHEN from_username = ?1 THEN to_username ELSE from_username END
             FROM connections
             WHERE (from_username = ?1 OR to_username = ?1) AND status = ?2
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![username, ConnectionStatus::Connected], |row| {
            row.get(0)
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Pending rows addressed to `username`, oldest request first.
    pub fn list_pending_requests_to(
        &self,
        username: &str,
    ) -> Result<Vec<ConnectionRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, from_username, to_username, status, requested_at, responded_at
             FROM connections WHERE to_username = ?1 AND status = ?2
             ORDER BY requested_at, id",
        )?;
        let rows = stmt.query_map(
            params![username, ConnectionStatus::Pending],
            connection_from_row,
        )?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    // -----------------------------------------------------------------------
    // Posts
    // -----------------------------------------------------------------------

    /// Insert a post with its media and hashtag links in one transaction.
    /// Hashtags are looked up by name and created on first use.
    pub fn insert_post(&self, post: &NewPostRow) -> Result<i64, StorageError> {
        let tx = self.write_transaction()?;

        tx.execute(
            "INSERT INTO posts (username, text, created_at) VALUES (?1, ?2, ?3)",
            params![post.username, post.text, post.created_at],
        )?;
        let post_id = tx.last_insert_rowid();

        for (kind, refs) in [("image", &post.image_urls), ("video", &post.video_urls)] {
            for (position, reference) in refs.iter().enumerate() {
                tx.execute(
                    "INSERT INTO post_media (post_id, kind, position, reference)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![post_id, kind, position, reference],
                )?;
            }
        }

        for name in &post.hashtags {
            tx.execute(
                "INSERT OR IGNORE INTO hashtags (name) VALUES (?1)",
                params![name],
            )?;
            let hashtag_id: i64 = tx.query_row(
                "SELECT id FROM hashtags WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )?;
            tx.execute(
                "INSERT OR IGNORE INTO post_hashtags (post_id, hashtag_id) VALUES (?1, ?2)",
                params![post_id, hashtag_id],
            )?;
        }

        tx.commit()?;
        Ok(post_id)
    }

    pub fn post_exists(&self, post_id: i64) -> Result<bool, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE id = ?1",
            params![post_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn get_post(&self, post_id: i64) -> Result<Option<PostRow>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, username, text, created_at FROM posts WHERE id = ?1",
                params![post_id],
                post_from_row,
            )
            .optional()?;
        match row {
            Some(mut post) => {
                self.load_post_extras(&mut post)?;
                Ok(Some(post))
            }
            None => Ok(None),
        }
    }

    /// Posts written by any of `usernames`, newest first (ties: newest id
    /// first).
    pub fn list_posts_by_authors(&self, usernames: &[String]) -> Result<Vec<PostRow>, StorageError> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; usernames.len()].join(", ");
        let sql = format!(
            "SELECT id, username, text, created_at FROM posts
             WHERE username IN ({placeholders})
             ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(usernames.iter()), post_from_row)?;
        let mut result = Vec::new();
        for row in rows {
            let mut post = row?;
            self.load_post_extras(&mut post)?;
            result.push(post);
        }
        Ok(result)
    }

    /// Ids of posts linked to the (normalised) hashtag, newest first.
    pub fn list_post_ids_with_hashtag(&self, name: &str) -> Result<Vec<i64>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id FROM posts p
             JOIN post_hashtags ph ON ph.post_id = p.id
             JOIN hashtags h ON h.id = ph.hashtag_id
             WHERE h.name = ?1
             ORDER BY p.created_at DESC, p.id DESC",
        )?;
        let rows = stmt.query_map(params![name], |row| row.get(0))?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    fn load_post_extras(&self, post: &mut PostRow) -> Result<(), StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, reference FROM post_media WHERE post_id = ?1 ORDER BY kind, position",
        )?;
        let rows = stmt.query_map(params![post.id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (kind, reference) = row?;
            match kind.as_str() {
                "video" => post.video_urls.push(reference),
                _ => post.image_urls.push(reference),
            }
        }

        let mut stmt = self.conn.prepare(
            "SELECT h.name FROM hashtags h
             JOIN post_hashtags ph ON ph.hashtag_id = h.id
             WHERE ph.post_id = ?1 ORDER BY h.name",
        )?;
        let rows = stmt.query_map(params![post.id], |row| row.get(0))?;
        for row in rows {
            post.hashtags.push(row?);
        }
        Ok(())
    }

    /// Delete a post and everything hanging off it in one transaction.
    /// Returns false if the post did not exist.
    pub fn delete_post(&self, post_id: i64) -> Result<bool, StorageError> {
        let tx = self.write_transaction()?;
        purge_comments(&tx, post_id)?;
        tx.execute("DELETE FROM post_likes WHERE post_id = ?1", params![post_id])?;
        tx.execute("DELETE FROM post_media WHERE post_id = ?1", params![post_id])?;
        tx.execute(
            "DELETE FROM post_hashtags WHERE post_id = ?1",
            params![post_id],
        )?;
        let affected = tx.execute("DELETE FROM posts WHERE id = ?1", params![post_id])?;
        tx.commit()?;
        Ok(affected > 0)
    }

    // -----------------------------------------------------------------------
    // Likes
    // -----------------------------------------------------------------------

    /// Insert a like fact. A second like from the same actor trips the
    /// primary key and surfaces as a unique violation.
    pub fn insert_like(
        &self,
        target: LikeTarget,
        username: &str,
        created_at: u64,
    ) -> Result<(), StorageError> {
        let kind = target.kind();
        let sql = format!(
            "INSERT INTO {} ({}, username, created_at) VALUES (?1, ?2, ?3)",
            kind.table(),
            kind.subject_column()
        );
        self.conn
            .execute(&sql, params![target.id(), username, created_at])?;
        Ok(())
    }

    pub fn delete_like(&self, target: LikeTarget, username: &str) -> Result<bool, StorageError> {
        let kind = target.kind();
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1 AND username = ?2",
            kind.table(),
            kind.subject_column()
        );
        let affected = self.conn.execute(&sql, params![target.id(), username])?;
        Ok(affected > 0)
    }

    pub fn count_likes(&self, target: LikeTarget) -> Result<u32, StorageError> {
        let kind = target.kind();
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?1",
            kind.table(),
            kind.subject_column()
        );
        let count: u32 = self
            .conn
            .query_row(&sql, params![target.id()], |row| row.get(0))?;
        Ok(count)
    }

    pub fn list_liked_ids(&self, kind: LikeKind, username: &str) -> Result<Vec<i64>, StorageError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE username = ?1 ORDER BY created_at, {}",
            kind.subject_column(),
            kind.table(),
            kind.subject_column()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![username], |row| row.get(0))?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    // -----------------------------------------------------------------------
    // Comments
    // -----------------------------------------------------------------------

    pub fn insert_comment(
        &self,
        post_id: i64,
        username: &str,
        text: &str,
        parent_id: Option<i64>,
        created_at: u64,
    ) -> Result<CommentRow, StorageError> {
        self.conn.execute(
            "INSERT INTO comments (post_id, username, text, parent_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![post_id, username, text, parent_id, created_at],
        )?;
        Ok(CommentRow {
            id: self.conn.last_insert_rowid(),
            post_id,
            username: username.to_string(),
            text: text.to_string(),
            parent_id,
            created_at,
        })
    }

    pub fn get_comment(&self, comment_id: i64) -> Result<Option<CommentRow>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, post_id, username, text, parent_id, created_at
                 FROM comments WHERE id = ?1",
                params![comment_id],
                comment_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// All comments and replies on a post, oldest first.
    pub fn list_comments(&self, post_id: i64) -> Result<Vec<CommentRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, post_id, username, text, parent_id, created_at
             FROM comments WHERE post_id = ?1
             ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map(params![post_id], comment_from_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Remove comment likes, then comments, for one post. Returns the number
    /// of comments removed.
    pub fn delete_comments_for_post(&self, post_id: i64) -> Result<usize, StorageError> {
        let tx = self.write_transaction()?;
        let removed = purge_comments(&tx, post_id)?;
        tx.commit()?;
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Gigs
    // -----------------------------------------------------------------------

    pub fn insert_gig(
        &self,
        owner: &str,
        details: &GigDetails,
        created_at: u64,
    ) -> Result<i64, StorageError> {
        self.conn.execute(
            "INSERT INTO gigs
             (username, title, description, category, price, location, duration,
              skills_required, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                owner,
                details.title,
                details.description,
                details.category,
                details.price,
                details.location,
                details.duration,
                details.skills_required,
                GigStatus::Active,
                created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_gig(&self, gig_id: i64) -> Result<Option<GigRow>, StorageError> {
        let sql = format!("SELECT {GIG_COLUMNS} FROM gigs WHERE id = ?1");
        let row = self
            .conn
            .query_row(&sql, params![gig_id], gig_from_row)
            .optional()?;
        Ok(row)
    }

    /// Every gig, newest first.
    pub fn list_gigs(&self) -> Result<Vec<GigRow>, StorageError> {
        self.query_gigs("1 = 1", params![])
    }

    pub fn list_gigs_by_owner(&self, username: &str) -> Result<Vec<GigRow>, StorageError> {
        self.query_gigs("username = ?1", params![username])
    }

    pub fn list_gigs_by_category(&self, category: &str) -> Result<Vec<GigRow>, StorageError> {
        self.query_gigs("category = ?1", params![category])
    }

    /// Gigs whose title or description contains `term`.
    pub fn search_gigs(&self, term: &str) -> Result<Vec<GigRow>, StorageError> {
        self.query_gigs(
            "instr(title, ?1) > 0 OR instr(description, ?1) > 0",
            params![term],
        )
    }

    pub fn list_gigs_by_ids(&self, ids: &[i64]) -> Result<Vec<GigRow>, StorageError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT {GIG_COLUMNS} FROM gigs WHERE id IN ({placeholders})
             ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(ids.iter()), gig_from_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    fn query_gigs(
        &self,
        condition: &str,
        bind: &[&dyn ToSql],
    ) -> Result<Vec<GigRow>, StorageError> {
        let sql = format!(
            "SELECT {GIG_COLUMNS} FROM gigs WHERE {condition} ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(bind, gig_from_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn update_gig(
        &self,
        gig_id: i64,
        details: &GigDetails,
        status: GigStatus,
    ) -> Result<bool, StorageError> {
        let affected = self.conn.execute(
            "UPDATE gigs
             SET title = ?1, description = ?2, category = ?3, price = ?4,
                 location = ?5, duration = ?6, skills_required = ?7, status = ?8
             WHERE id = ?9",
            params![
                details.title,
                details.description,
                details.category,
                details.price,
                details.location,
                details.duration,
                details.skills_required,
                status,
                gig_id,
            ],
        )?;
        Ok(affected > 0)
    }

    /// Delete a gig and its interests. Reviews are kept as history.
    pub fn delete_gig(&self, gig_id: i64) -> Result<bool, StorageError> {
        let tx = self.write_transaction()?;
        tx.execute(
            "DELETE FROM gig_interests WHERE gig_id = ?1",
            params![gig_id],
        )?;
        let affected = tx.execute("DELETE FROM gigs WHERE id = ?1", params![gig_id])?;
        tx.commit()?;
        Ok(affected > 0)
    }

    pub fn increment_gig_counter(
        &self,
        gig_id: i64,
        counter: GigCounter,
    ) -> Result<bool, StorageError> {
        let sql = match counter {
            GigCounter::Views => "UPDATE gigs SET views = views + 1 WHERE id = ?1",
            GigCounter::Responses => "UPDATE gigs SET responses = responses + 1 WHERE id = ?1",
        };
        let affected = self.conn.execute(sql, params![gig_id])?;
        Ok(affected > 0)
    }

    /// Raise one confirmation flag and, in the same statement, flip the gig
    /// to Completed if the other flag is already raised.
    pub fn confirm_gig_completion(
        &self,
        gig_id: i64,
        flag: ConfirmFlag,
    ) -> Result<bool, StorageError> {
        let sql = match flag {
            ConfirmFlag::Provider => {
                "UPDATE gigs SET provider_confirmed = 1,
                     status = CASE WHEN worker_confirmed = 1 THEN ?2 ELSE status END
                 WHERE id = ?1"
            }
            ConfirmFlag::Worker => {
                "UPDATE gigs SET worker_confirmed = 1,
                     status = CASE WHEN provider_confirmed = 1 THEN ?2 ELSE status END
                 WHERE id = ?1"
            }
        };
        let affected = self
            .conn
            .execute(sql, params![gig_id, GigStatus::Completed])?;
        Ok(affected > 0)
    }

    // -----------------------------------------------------------------------
    // Gig interests
    // -----------------------------------------------------------------------

    /// Insert a pending interest. A duplicate surfaces as a unique violation.
    pub fn insert_interest(
        &self,
        gig_id: i64,
        username: &str,
        created_at: u64,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO gig_interests (gig_id, username, status, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![gig_id, username, InterestStatus::Pending, created_at],
        )?;
        Ok(())
    }

    pub fn delete_interest(&self, gig_id: i64, username: &str) -> Result<bool, StorageError> {
        let affected = self.conn.execute(
            "DELETE FROM gig_interests WHERE gig_id = ?1 AND username = ?2",
            params![gig_id, username],
        )?;
        Ok(affected > 0)
    }

    /// Interests in a gig, oldest first.
    pub fn list_interests_for_gig(&self, gig_id: i64) -> Result<Vec<GigInterestRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT gig_id, username, status, created_at
             FROM gig_interests WHERE gig_id = ?1
             ORDER BY created_at, rowid",
        )?;
        let rows = stmt.query_map(params![gig_id], interest_from_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn count_interests(&self, gig_id: i64) -> Result<u32, StorageError> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM gig_interests WHERE gig_id = ?1",
            params![gig_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn list_interested_gig_ids(&self, username: &str) -> Result<Vec<i64>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT gig_id FROM gig_interests WHERE username = ?1 ORDER BY created_at, gig_id",
        )?;
        let rows = stmt.query_map(params![username], |row| row.get(0))?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Gig status and the candidate's interest status, read inside `tx`.
    /// `Err` carries the outcome to report without writing.
    fn interest_guard(
        tx: &Transaction<'_>,
        gig_id: i64,
        username: &str,
    ) -> Result<Result<InterestStatus, InterestChange>, StorageError> {
        let gig_status: Option<GigStatus> = tx
            .query_row(
                "SELECT status FROM gigs WHERE id = ?1",
                params![gig_id],
                |row| row.get(0),
            )
            .optional()?;
        if gig_status == Some(GigStatus::Completed) {
            return Ok(Err(InterestChange::GigCompleted));
        }
        let current: Option<InterestStatus> = tx
            .query_row(
                "SELECT status FROM gig_interests WHERE gig_id = ?1 AND username = ?2",
                params![gig_id, username],
                |row| row.get(0),
            )
            .optional()?;
        Ok(current.ok_or(InterestChange::Missing))
    }

    /// Accept one candidate and reject every competing non-rejected interest
    /// in a single transaction. A newly accepted worker starts unconfirmed,
    /// so the gig's worker flag is cleared whenever the candidate was not
    /// already the accepted one.
    pub fn accept_interest_exclusive(
        &self,
        gig_id: i64,
        username: &str,
    ) -> Result<InterestChange, StorageError> {
        let tx = self.write_transaction()?;
        let current = match Self::interest_guard(&tx, gig_id, username)? {
            Ok(status) => status,
            Err(outcome) => return Ok(outcome),
        };

        // Competitors go first so the accepted-per-gig index never sees two.
        let swept = tx.execute(
            "UPDATE gig_interests SET status = ?1
             WHERE gig_id = ?2 AND username != ?3 AND status != ?1",
            params![InterestStatus::Rejected, gig_id, username],
        )?;
        tx.execute(
            "UPDATE gig_interests SET status = ?1 WHERE gig_id = ?2 AND username = ?3",
            params![InterestStatus::Accepted, gig_id, username],
        )?;
        if current != InterestStatus::Accepted {
            tx.execute(
                "UPDATE gigs SET worker_confirmed = 0 WHERE id = ?1",
                params![gig_id],
            )?;
        }

        tx.commit()?;
        Ok(InterestChange::Applied { swept })
    }

    /// Reject one candidate. Rejecting the accepted worker also withdraws
    /// that worker's completion confirmation.
    pub fn reject_interest(
        &self,
        gig_id: i64,
        username: &str,
    ) -> Result<InterestChange, StorageError> {
        let tx = self.write_transaction()?;
        let current = match Self::interest_guard(&tx, gig_id, username)? {
            Ok(status) => status,
            Err(outcome) => return Ok(outcome),
        };

        tx.execute(
            "UPDATE gig_interests SET status = ?1 WHERE gig_id = ?2 AND username = ?3",
            params![InterestStatus::Rejected, gig_id, username],
        )?;
        if current == InterestStatus::Accepted {
            tx.execute(
                "UPDATE gigs SET worker_confirmed = 0 WHERE id = ?1",
                params![gig_id],
            )?;
        }

        tx.commit()?;
        Ok(InterestChange::Applied { swept: 0 })
    }

    pub fn list_accepted_usernames(&self, gig_id: i64) -> Result<Vec<String>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT username FROM gig_interests WHERE gig_id = ?1 AND status = ?2",
        )?;
        let rows = stmt.query_map(params![gig_id, InterestStatus::Accepted], |row| row.get(0))?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn list_accepted_gig_ids(&self, username: &str) -> Result<Vec<i64>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT gig_id FROM gig_interests WHERE username = ?1 AND status = ?2",
        )?;
        let rows = stmt.query_map(params![username, InterestStatus::Accepted], |row| row.get(0))?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    // -----------------------------------------------------------------------
    // Reviews
    // -----------------------------------------------------------------------

    /// Insert a review, recompute the reviewee's average rating and copy it
    /// onto every gig the reviewee owns, all in one transaction.
    pub fn insert_review_and_rerate(&self, review: &ReviewRow) -> Result<ReviewRow, StorageError> {
        let tx = self.write_transaction()?;

        tx.execute(
            "INSERT INTO reviews
             (gig_id, reviewer_username, reviewee_username, rating, communication_rating,
              quality_rating, value_rating, reliability_rating, comment, is_worker_review,
              created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                review.gig_id,
                review.reviewer_username,
                review.reviewee_username,
                review.rating,
                review.communication_rating,
                review.quality_rating,
                review.value_rating,
                review.reliability_rating,
                review.comment,
                review.is_worker_review,
                review.created_at,
            ],
        )?;
        let id = tx.last_insert_rowid();

        let average: f64 = tx.query_row(
            "SELECT AVG(rating) FROM reviews WHERE reviewee_username = ?1",
            params![review.reviewee_username],
            |row| row.get(0),
        )?;
        tx.execute(
            "UPDATE gigs SET rating = ?1 WHERE username = ?2",
            params![average, review.reviewee_username],
        )?;

        tx.commit()?;
        Ok(ReviewRow {
            id,
            ..review.clone()
        })
    }

    pub fn has_review(&self, gig_id: i64, reviewer: &str) -> Result<bool, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM reviews WHERE gig_id = ?1 AND reviewer_username = ?2",
            params![gig_id, reviewer],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Reviews received by `username`, newest first.
    pub fn list_reviews_for_reviewee(&self, username: &str) -> Result<Vec<ReviewRow>, StorageError> {
        self.query_reviews("reviewee_username = ?1", params![username])
    }

    pub fn list_reviews_for_gig(&self, gig_id: i64) -> Result<Vec<ReviewRow>, StorageError> {
        self.query_reviews("gig_id = ?1", params![gig_id])
    }

    fn query_reviews(
        &self,
        condition: &str,
        bind: &[&dyn ToSql],
    ) -> Result<Vec<ReviewRow>, StorageError> {
        let sql = format!(
            "SELECT id, gig_id, reviewer_username, reviewee_username, rating,
                    communication_rating, quality_rating, value_rating, reliability_rating,
                    comment, is_worker_review, created_at
             FROM reviews WHERE {condition} ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(bind, |row| {
            Ok(ReviewRow {
                id: row.get(0)?,
                gig_id: row.get(1)?,
                reviewer_username: row.get(2)?,
                reviewee_username: row.get(3)?,
                rating: row.get(4)?,
                communication_rating: row.get(5)?,
                quality_rating: row.get(6)?,
                value_rating: row.get(7)?,
                reliability_rating: row.get(8)?,
                comment: row.get(9)?,
                is_worker_review: row.get(10)?,
                created_at: row.get(11)?,
            })
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Average rating (None when unreviewed) and review count for a reviewee.
    pub fn review_stats(&self, username: &str) -> Result<(Option<f64>, u32), StorageError> {
        let (average, count): (Option<f64>, u32) = self.conn.query_row(
            "SELECT AVG(rating), COUNT(*) FROM reviews WHERE reviewee_username = ?1",
            params![username],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok((average, count))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const GIG_COLUMNS: &str = "id, username, title, description, category, price, location, \
    duration, skills_required, status, views, responses, rating, provider_confirmed, \
    worker_confirmed, created_at";

fn connection_from_row(row: &Row<'_>) -> rusqlite::Result<ConnectionRow> {
    Ok(ConnectionRow {
        id: row.get(0)?,
        from_username: row.get(1)?,
        to_username: row.get(2)?,
        status: row.get(3)?,
        requested_at: row.get(4)?,
        responded_at: row.get(5)?,
    })
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        username: row.get(1)?,
        text: row.get(2)?,
        created_at: row.get(3)?,
        hashtags: Vec::new(),
        image_urls: Vec::new(),
        video_urls: Vec::new(),
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        post_id: row.get(1)?,
        username: row.get(2)?,
        text: row.get(3)?,
        parent_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn gig_from_row(row: &Row<'_>) -> rusqlite::Result<GigRow> {
    Ok(GigRow {
        id: row.get(0)?,
        username: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        price: row.get(5)?,
        location: row.get(6)?,
        duration: row.get(7)?,
        skills_required: row.get(8)?,
        status: row.get(9)?,
        views: row.get(10)?,
        responses: row.get(11)?,
        rating: row.get(12)?,
        provider_confirmed_completion: row.get(13)?,
        worker_confirmed_completion: row.get(14)?,
        created_at: row.get(15)?,
    })
}

fn interest_from_row(row: &Row<'_>) -> rusqlite::Result<GigInterestRow> {
    Ok(GigInterestRow {
        gig_id: row.get(0)?,
        username: row.get(1)?,
        status: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Comment likes first, then the comments themselves.
fn purge_comments(conn: &Connection, post_id: i64) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM comment_likes
         WHERE comment_id IN (SELECT id FROM comments WHERE post_id = ?1)",
        params![post_id],
    )?;
    let removed = conn.execute("DELETE FROM comments WHERE post_id = ?1", params![post_id])?;
    Ok(removed)
}

/// Resolve the database path: `{data_dir}/campusnet.db`.
pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("campusnet.db")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
