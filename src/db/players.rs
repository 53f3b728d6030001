//! Player repository.
//!
//! Load/save for the persisted account records the onboarding flow works
//! against. A missing record is data ("no such player"), never an error.

use super::DbError;
use sqlx::SqlitePool;

/// A persisted player account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    pub id: i64,
    /// Display-cased name ("Alice").
    pub name: String,
    /// Case-folded identity key ("alice").
    pub folded: String,
    pub surname: String,
    /// Argon2 hash; plaintext is never stored.
    pub password_hash: String,
    /// Account flags such as `blocked` and `need_new_name`.
    pub flags: Vec<String>,
    pub created_at: i64,
    pub last_login_at: i64,
}

/// Repository for player operations.
pub struct PlayerRepository<'a> {
    pool: &'a SqlitePool,
}

type PlayerRow = (i64, String, String, String, String, String, i64, i64);

fn record_from_row(row: PlayerRow) -> PlayerRecord {
    let (id, name, folded, surname, password_hash, flags, created_at, last_login_at) = row;
    PlayerRecord {
        id,
        name,
        folded,
        surname,
        password_hash,
        flags: split_flags(&flags),
        created_at,
        last_login_at,
    }
}

fn split_flags(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(String::from).collect()
}

fn join_flags(flags: &[String]) -> String {
    flags.join(" ")
}

impl<'a> PlayerRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up a player by folded name. `None` means no such player.
    pub async fn find_by_folded(&self, folded: &str) -> Result<Option<PlayerRecord>, DbError> {
        let row = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT id, name, folded, surname, password_hash, flags, created_at, last_login_at
            FROM players WHERE folded = ?
            "#,
        )
        .bind(folded)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(record_from_row))
    }

    /// Whether a record exists for the folded name.
    pub async fn exists(&self, folded: &str) -> Result<bool, DbError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM players WHERE folded = ?")
            .bind(folded)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Create a new player record.
    ///
    /// The UNIQUE constraint on `folded` backs the last line of defense
    /// against a name racing into the store between availability checks.
    pub async fn create(
        &self,
        name: &str,
        folded: &str,
        surname: &str,
        password_hash: &str,
        flags: &[String],
    ) -> Result<PlayerRecord, DbError> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO players (folded, name, surname, password_hash, flags, created_at, last_login_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(folded)
        .bind(name)
        .bind(surname)
        .bind(password_hash)
        .bind(join_flags(flags))
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return DbError::PlayerExists(name.to_string());
            }
            DbError::from(e)
        })?;

        Ok(PlayerRecord {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            folded: folded.to_string(),
            surname: surname.to_string(),
            password_hash: password_hash.to_string(),
            flags: flags.to_vec(),
            created_at: now,
            last_login_at: now,
        })
    }

    /// Persist the mutable parts of a record (surname and flags).
    pub async fn update_profile(
        &self,
        folded: &str,
        surname: &str,
        flags: &[String],
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE players SET surname = ?, flags = ? WHERE folded = ?")
            .bind(surname)
            .bind(join_flags(flags))
            .bind(folded)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Record a successful login.
    pub async fn touch_last_login(&self, folded: &str) -> Result<(), DbError> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query("UPDATE players SET last_login_at = ? WHERE folded = ?")
            .bind(now)
            .bind(folded)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{Database, DbError};

    #[tokio::test]
    async fn find_missing_player_is_none() {
        let db = Database::new(":memory:").await.unwrap();
        assert!(db.players().find_by_folded("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_and_find_roundtrip() {
        let db = Database::new(":memory:").await.unwrap();
        db.players()
            .create("Alice", "alice", "", "hash", &["blocked".to_string()])
            .await
            .unwrap();

        let rec = db
            .players()
            .find_by_folded("alice")
            .await
            .unwrap()
            .expect("record should exist");
        assert_eq!(rec.name, "Alice");
        assert_eq!(rec.flags, vec!["blocked"]);
        assert!(rec.surname.is_empty());
    }

    #[tokio::test]
    async fn duplicate_create_is_player_exists() {
        let db = Database::new(":memory:").await.unwrap();
        db.players().create("Alice", "alice", "", "h", &[]).await.unwrap();
        let err = db
            .players()
            .create("Alice", "alice", "", "h", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::PlayerExists(_)));
    }

    #[tokio::test]
    async fn update_profile_persists_surname_and_flags() {
        let db = Database::new(":memory:").await.unwrap();
        db.players().create("Alice", "alice", "", "h", &[]).await.unwrap();

        db.players()
            .update_profile("alice", "Stone", &[])
            .await
            .unwrap();

        let rec = db.players().find_by_folded("alice").await.unwrap().unwrap();
        assert_eq!(rec.surname, "Stone");
        assert!(rec.flags.is_empty());
    }
}
