use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use tagging::{Session, SessionStore};

pub fn app_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| std::env::temp_dir());
    base.join("live_sports_tagger")
}

pub fn default_db_path() -> PathBuf { app_data_dir().join("sessions.db") }

pub struct SessionDb {
    conn: Connection,
    path: PathBuf,
}

impl SessionDb {
    pub fn open_or_create(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() { fs::create_dir_all(dir)?; }
        let conn = Connection::open(path).with_context(|| format!("opening {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", &"WAL")?;
        conn.pragma_update(None, "synchronous", &"NORMAL")?;
        apply_migrations(&conn)?;
        Ok(Self { conn, path: path.to_path_buf() })
    }

    pub fn connection(&self) -> &Connection { &self.conn }

    pub fn path(&self) -> &Path { &self.path }

    /// Newest first; rows that no longer parse are skipped.
    pub fn list_sessions(&self) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, body_json FROM sessions ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        let mut out = Vec::new();
        for r in rows {
            let (id, body) = r?;
            match serde_json::from_str::<Session>(&body) {
                Ok(s) => out.push(s),
                Err(err) => tracing::warn!(session_id = %id, error = %err, "skipping unreadable session"),
            }
        }
        Ok(out)
    }

    pub fn get_session(&self, id: &str) -> Result<Option<Session>> {
        let body: Option<String> = self
            .conn
            .query_row("SELECT body_json FROM sessions WHERE id = ?1", params![id], |row| row.get(0))
            .optional()?;
        match body {
            Some(b) => Ok(Some(serde_json::from_str(&b).with_context(|| format!("decoding session {}", id))?)),
            None => Ok(None),
        }
    }

    /// Insert or replace by id.
    pub fn save_session(&self, session: &Session) -> Result<()> {
        let body = serde_json::to_string(session)?;
        let now = chrono::Utc::now().timestamp();
        self.conn.execute(
            "INSERT INTO sessions(id, created_at, sport, match_title, tag_count, body_json, updated_at) \
             VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             ON CONFLICT(id) DO UPDATE SET sport = excluded.sport, match_title = excluded.match_title, \
             tag_count = excluded.tag_count, body_json = excluded.body_json, updated_at = excluded.updated_at",
            params![
                session.id,
                session.created_at,
                session.settings.sport.name(),
                session.settings.match_title,
                session.tags.len() as i64,
                body,
                now
            ],
        )?;
        Ok(())
    }

    /// Returns whether a row was removed.
    pub fn delete_session(&self, id: &str) -> Result<bool> {
        let n = self.conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    /// Puts back a session removed with `delete_session`, keeping its id and log.
    pub fn restore_session(&self, session: &Session) -> Result<()> { self.save_session(session) }

    /// Copies the setup of `id` into a new, empty session.
    pub fn duplicate_session(&self, id: &str) -> Result<Option<Session>> {
        let Some(original) = self.get_session(id)? else { return Ok(None); };
        let copy = original.duplicate(chrono::Utc::now().timestamp_millis());
        self.save_session(&copy)?;
        Ok(Some(copy))
    }
}

impl SessionStore for SessionDb {
    fn load_session(&self, id: &str) -> Result<Option<Session>> { self.get_session(id) }

    fn save_session(&self, session: &Session) -> Result<()> { SessionDb::save_session(self, session) }
}

fn apply_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(include_str!("../migrations/V0001__sessions.sql"))?;
    conn.execute(
        "INSERT OR IGNORE INTO migrations(name, applied_at) VALUES(?1, strftime('%s','now'))",
        params!["V0001__sessions"],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagging::{SessionSettings, Sport, TagContext, TagFactory, TeamSide};

    fn open() -> (tempfile::TempDir, SessionDb) {
        let dir = tempfile::tempdir().unwrap();
        let db = SessionDb::open_or_create(&dir.path().join("nested").join("sessions.db")).unwrap();
        (dir, db)
    }

    fn session(title: &str, created_at: i64) -> Session {
        let mut settings = SessionSettings::for_sport(Sport::Afl);
        settings.match_title = title.into();
        Session::new(settings, created_at)
    }

    #[test]
    fn lists_newest_first() {
        let (_dir, db) = open();
        db.save_session(&session("Round 1", 1_000)).unwrap();
        db.save_session(&session("Round 2", 2_000)).unwrap();
        let titles: Vec<_> = db.list_sessions().unwrap().into_iter().map(|s| s.settings.match_title).collect();
        assert_eq!(titles, ["Round 2", "Round 1"]);
    }

    #[test]
    fn lists_every_session() {
        let (_dir, db) = open();
        for i in 0..1_005 {
            db.save_session(&session(&format!("Round {}", i), i)).unwrap();
        }
        let all = db.list_sessions().unwrap();
        assert_eq!(all.len(), 1_005);
        assert_eq!(all.last().map(|s| s.settings.match_title.as_str()), Some("Round 0"));
    }

    #[test]
    fn save_is_an_upsert_with_tags() {
        let (_dir, db) = open();
        let mut s = session("Grand Final", 5);
        db.save_session(&s).unwrap();
        let ctx = TagContext {
            absolute_ms: 4_500,
            period_index: 1,
            period_name: "Q1".into(),
            game_clock: "00:04".into(),
            created_at: String::new(),
        };
        let tag = TagFactory::new(&s.settings).build(&ctx, "Goal", TeamSide::TeamA, Some("long range"));
        s.tags.prepend(tag.clone());
        db.save_session(&s).unwrap();

        assert_eq!(db.list_sessions().unwrap().len(), 1);
        let loaded = db.get_session(&s.id).unwrap().unwrap();
        assert_eq!(loaded, s);
        assert_eq!(loaded.tags.latest(), Some(&tag));
        let count: i64 = db
            .connection()
            .query_row("SELECT tag_count FROM sessions WHERE id = ?1", params![s.id], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn delete_restore_and_duplicate() {
        let (_dir, db) = open();
        let s = session("Derby", 10);
        db.save_session(&s).unwrap();
        assert!(db.delete_session(&s.id).unwrap());
        assert!(!db.delete_session(&s.id).unwrap());
        assert!(db.get_session(&s.id).unwrap().is_none());

        db.restore_session(&s).unwrap();
        assert_eq!(db.get_session(&s.id).unwrap(), Some(s.clone()));

        let copy = db.duplicate_session(&s.id).unwrap().unwrap();
        assert_ne!(copy.id, s.id);
        assert_eq!(copy.settings, s.settings);
        assert!(copy.tags.is_empty());
        assert!(db.duplicate_session("missing").unwrap().is_none());
    }

    #[test]
    fn reopening_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.db");
        let s = session("Persisted", 1);
        SessionDb::open_or_create(&path).unwrap().save_session(&s).unwrap();
        let db = SessionDb::open_or_create(&path).unwrap();
        assert_eq!(db.load_session(&s.id).unwrap(), Some(s));
    }
}
