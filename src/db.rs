use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::error::{DojoError, Result};
use crate::ids;
use crate::models::{
    AttemptResult, Belt, BeltHistoryEntry, ProgressionRecord, Promotion, StatusReport,
};
use crate::requirements::{next_grade, requirement_for};

// A quiz counts as passed at or above this score.
pub const PASS_THRESHOLD: f64 = 70.0;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS progressions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                topic_name TEXT NOT NULL,
                belt TEXT NOT NULL DEFAULT 'white' CHECK(belt IN ('white', 'blue', 'purple', 'brown', 'black')),
                stripe INTEGER NOT NULL DEFAULT 0 CHECK(stripe BETWEEN 0 AND 4),
                total_quizzes INTEGER NOT NULL DEFAULT 0,
                successful_quizzes INTEGER NOT NULL DEFAULT 0,
                current_accuracy REAL NOT NULL DEFAULT 0.0,
                council_readiness REAL NOT NULL DEFAULT 0.0,
                advancement_progress TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(user_id, topic_name)
            );

            -- Append-only promotion log, one row per grade change.
            CREATE TABLE IF NOT EXISTS belt_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                progression_id TEXT NOT NULL,
                belt TEXT NOT NULL,
                stripe INTEGER NOT NULL,
                topic_name TEXT NOT NULL,
                promoted_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (progression_id) REFERENCES progressions(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_progressions_user ON progressions(user_id);
            CREATE INDEX IF NOT EXISTS idx_progressions_belt ON progressions(belt);
            CREATE INDEX IF NOT EXISTS idx_belt_history_progression ON belt_history(progression_id);
            "#,
        )?;

        Ok(())
    }

    fn validate_key(user_id: &str, topic_name: &str) -> Result<()> {
        if user_id.trim().is_empty() {
            return Err(DojoError::MissingIdentifier("user_id"));
        }
        if topic_name.trim().is_empty() {
            return Err(DojoError::MissingIdentifier("topic_name"));
        }
        Ok(())
    }

    // Ensure exactly one record exists for (user, topic), at white stripe 0.
    // A second call is a no-op; either way the record's id comes back.
    pub fn enroll(&self, user_id: &str, topic_name: &str) -> Result<String> {
        Self::validate_key(user_id, topic_name)?;

        let now = Utc::now();
        self.conn.execute(
            "INSERT OR IGNORE INTO progressions (id, user_id, topic_name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![ids::hex_id("prog"), user_id, topic_name, now.to_rfc3339()],
        )?;

        let id = self.conn.query_row(
            "SELECT id FROM progressions WHERE user_id = ?1 AND topic_name = ?2",
            params![user_id, topic_name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    // Fold one scored attempt (0-100) into the record's rolling statistics,
    // then evaluate advancement against the requirement table.
    pub fn record_quiz_attempt(
        &self,
        user_id: &str,
        topic_name: &str,
        score: f64,
    ) -> Result<AttemptResult> {
        Self::validate_key(user_id, topic_name)?;
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            return Err(DojoError::ScoreOutOfRange(score));
        }

        self.enroll(user_id, topic_name)?;

        let accuracy = score / 100.0;
        let now = Utc::now();

        // Single statement: every SET expression reads the row's pre-update
        // values, so the mean folds the new sample against the same count it
        // was computed over even with concurrent writers on this key.
        self.conn.execute(
            r#"
            UPDATE progressions
            SET current_accuracy = (current_accuracy * total_quizzes + ?1) / (total_quizzes + 1),
                total_quizzes = total_quizzes + 1,
                successful_quizzes = successful_quizzes + (CASE WHEN ?2 >= ?3 THEN 1 ELSE 0 END),
                advancement_progress = json_set(
                    advancement_progress,
                    '$.last_quiz_score', ?2,
                    '$.last_quiz_date', ?4,
                    '$.quizzes_completed',
                    COALESCE(json_extract(advancement_progress, '$.quizzes_completed'), 0) + 1
                )
            WHERE user_id = ?5 AND topic_name = ?6
            "#,
            params![
                accuracy,
                score,
                PASS_THRESHOLD,
                now.to_rfc3339(),
                user_id,
                topic_name
            ],
        )?;

        let promoted_to = self.check_advancement(user_id, topic_name)?;

        Ok(AttemptResult {
            accuracy,
            passed: score >= PASS_THRESHOLD,
            promoted_to,
        })
    }

    // Promote if the next grade's requirements are all met. Evaluation and
    // commit share a transaction, and the commit is conditional on the grade
    // we evaluated, so two racing attempts cannot both promote.
    pub fn check_advancement(&self, user_id: &str, topic_name: &str) -> Result<Option<Promotion>> {
        let tx = self.conn.unchecked_transaction()?;

        let row = tx
            .query_row(
                r#"
                SELECT id, belt, stripe, total_quizzes, current_accuracy, council_readiness
                FROM progressions
                WHERE user_id = ?1 AND topic_name = ?2
                "#,
                params![user_id, topic_name],
                |row| {
                    let belt_str: String = row.get(1)?;
                    Ok((
                        row.get::<_, String>(0)?,
                        belt_str,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, f64>(4)?,
                        row.get::<_, f64>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((prog_id, belt_str, stripe, total_quizzes, accuracy, readiness)) = row else {
            return Ok(None);
        };
        let belt = Belt::from_str(&belt_str).unwrap_or(Belt::White);

        let Some((next_belt, next_stripe)) = next_grade(belt, stripe) else {
            return Ok(None); // terminal grade
        };
        let Some(req) = requirement_for(next_belt, next_stripe) else {
            return Ok(None);
        };

        // Conjunctive gate: all three legs, >= on each.
        let met = total_quizzes >= req.min_quizzes
            && accuracy >= req.min_accuracy
            && readiness >= req.min_council_readiness;
        if !met {
            return Ok(None);
        }

        let now = Utc::now();

        // Compare-and-swap on the grade we evaluated. A concurrent promoter
        // that committed first leaves this matching zero rows.
        let changed = tx.execute(
            r#"
            UPDATE progressions
            SET belt = ?1, stripe = ?2,
                total_quizzes = 0, successful_quizzes = 0,
                current_accuracy = 0.0, advancement_progress = '{}'
            WHERE user_id = ?3 AND topic_name = ?4 AND belt = ?5 AND stripe = ?6
            "#,
            params![
                next_belt.as_str(),
                next_stripe,
                user_id,
                topic_name,
                belt.as_str(),
                stripe
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }

        tx.execute(
            "INSERT INTO belt_history (progression_id, belt, stripe, topic_name, promoted_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![prog_id, next_belt.as_str(), next_stripe, topic_name, now.to_rfc3339()],
        )?;
        tx.commit()?;

        Ok(Some(Promotion {
            belt: next_belt,
            stripe: next_stripe,
        }))
    }

    // Write path for the externally maintained readiness gate. Never
    // evaluates advancement; returns whether a record was found.
    pub fn set_council_readiness(
        &self,
        user_id: &str,
        topic_name: &str,
        score: f64,
    ) -> Result<bool> {
        Self::validate_key(user_id, topic_name)?;
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(DojoError::ReadinessOutOfRange(score));
        }

        let rows = self.conn.execute(
            "UPDATE progressions SET council_readiness = ?1 WHERE user_id = ?2 AND topic_name = ?3",
            params![score, user_id, topic_name],
        )?;
        Ok(rows > 0)
    }

    pub fn get_progression(
        &self,
        user_id: &str,
        topic_name: &str,
    ) -> Result<Option<ProgressionRecord>> {
        let record = self
            .conn
            .query_row(
                r#"
                SELECT id, user_id, topic_name, belt, stripe, total_quizzes, successful_quizzes,
                       current_accuracy, council_readiness, advancement_progress, created_at
                FROM progressions
                WHERE user_id = ?1 AND topic_name = ?2
                "#,
                params![user_id, topic_name],
                Self::row_to_record,
            )
            .optional()?;

        match record {
            Some(mut r) => {
                r.belt_history = self.history_for(&r.id)?;
                Ok(Some(r))
            }
            None => Ok(None),
        }
    }

    pub fn get_belt_history(
        &self,
        user_id: &str,
        topic_name: &str,
    ) -> Result<Option<Vec<BeltHistoryEntry>>> {
        Ok(self
            .get_progression(user_id, topic_name)?
            .map(|r| r.belt_history))
    }

    pub fn get_status(&self, user_id: &str, topic_name: &str) -> Result<Option<StatusReport>> {
        Ok(self.get_progression(user_id, topic_name)?.map(|r| StatusReport {
            user_id: r.user_id,
            topic_name: r.topic_name,
            belt: r.belt,
            stripe: r.stripe,
            total_quizzes: r.total_quizzes,
            successful_quizzes: r.successful_quizzes,
            accuracy_pct: r.current_accuracy * 100.0,
            council_readiness_pct: r.council_readiness_score * 100.0,
            history: r.belt_history,
        }))
    }

    pub fn list_progressions(&self, user_filter: Option<&str>) -> Result<Vec<ProgressionRecord>> {
        let mut records: Vec<ProgressionRecord> = if let Some(user) = user_filter {
            let mut stmt = self.conn.prepare(
                r#"
                SELECT id, user_id, topic_name, belt, stripe, total_quizzes, successful_quizzes,
                       current_accuracy, council_readiness, advancement_progress, created_at
                FROM progressions
                WHERE user_id = ?1
                ORDER BY user_id, topic_name
                "#,
            )?;
            let rows = stmt.query_map(params![user], Self::row_to_record)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        } else {
            let mut stmt = self.conn.prepare(
                r#"
                SELECT id, user_id, topic_name, belt, stripe, total_quizzes, successful_quizzes,
                       current_accuracy, council_readiness, advancement_progress, created_at
                FROM progressions
                ORDER BY user_id, topic_name
                "#,
            )?;
            let rows = stmt.query_map([], Self::row_to_record)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        for record in &mut records {
            record.belt_history = self.history_for(&record.id)?;
        }

        Ok(records)
    }

    pub fn get_recent_promotions(&self, limit: i64) -> Result<Vec<(BeltHistoryEntry, String)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT h.belt, h.stripe, h.topic_name, h.promoted_at, p.user_id
            FROM belt_history h
            JOIN progressions p ON h.progression_id = p.id
            ORDER BY h.id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit], |row| {
            let belt_str: String = row.get(0)?;
            Ok((
                BeltHistoryEntry {
                    belt: Belt::from_str(&belt_str).unwrap_or(Belt::White),
                    stripe: row.get(1)?,
                    topic_name: row.get(2)?,
                    promoted_at: row.get(3)?,
                },
                row.get::<_, String>(4)?,
            ))
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_belt_distribution(&self) -> Result<Vec<(Belt, i64)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT belt, COUNT(*) FROM progressions GROUP BY belt")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let counts = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        let mut distribution = Vec::with_capacity(5);
        for belt in [Belt::White, Belt::Blue, Belt::Purple, Belt::Brown, Belt::Black] {
            let count = counts
                .iter()
                .find(|(name, _)| name == belt.as_str())
                .map(|(_, n)| *n)
                .unwrap_or(0);
            distribution.push((belt, count));
        }
        Ok(distribution)
    }

    pub fn get_stats(&self) -> Result<Stats> {
        let total_progressions: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM progressions", [], |row| row.get(0))?;

        let total_promotions: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM belt_history", [], |row| row.get(0))?;

        let black_belts: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM progressions WHERE belt = 'black'",
            [],
            |row| row.get(0),
        )?;

        let avg_accuracy: f64 = self.conn.query_row(
            "SELECT COALESCE(AVG(current_accuracy), 0) FROM progressions",
            [],
            |row| row.get(0),
        )?;

        let avg_readiness: f64 = self.conn.query_row(
            "SELECT COALESCE(AVG(council_readiness), 0) FROM progressions",
            [],
            |row| row.get(0),
        )?;

        Ok(Stats {
            total_progressions,
            total_promotions,
            black_belts,
            avg_accuracy,
            avg_readiness,
        })
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<ProgressionRecord> {
        let belt_str: String = row.get(3)?;
        let progress_json: String = row.get(9)?;
        Ok(ProgressionRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            topic_name: row.get(2)?,
            belt: Belt::from_str(&belt_str).unwrap_or(Belt::White),
            stripe: row.get(4)?,
            total_quizzes: row.get(5)?,
            successful_quizzes: row.get(6)?,
            current_accuracy: row.get(7)?,
            council_readiness_score: row.get(8)?,
            advancement_progress: serde_json::from_str(&progress_json).unwrap_or_default(),
            created_at: row.get(10)?,
            belt_history: vec![],
        })
    }

    fn history_for(&self, progression_id: &str) -> Result<Vec<BeltHistoryEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT belt, stripe, topic_name, promoted_at
            FROM belt_history
            WHERE progression_id = ?1
            ORDER BY id ASC
            "#,
        )?;

        let rows = stmt.query_map(params![progression_id], |row| {
            let belt_str: String = row.get(0)?;
            Ok(BeltHistoryEntry {
                belt: Belt::from_str(&belt_str).unwrap_or(Belt::White),
                stripe: row.get(1)?,
                topic_name: row.get(2)?,
                promoted_at: row.get(3)?,
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

#[derive(Debug, Clone)]
pub struct Stats {
    pub total_progressions: i64,
    pub total_promotions: i64,
    pub black_belts: i64,
    pub avg_accuracy: f64,
    pub avg_readiness: f64,
}
