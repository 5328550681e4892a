//! SQLite-backed feedback store

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, Row};

use super::{
    ground_truth, FeedbackLabel, FeedbackRecord, FeedbackStore, FeedbackStoreError, LabelFilter,
    Verdict,
};

pub struct SqliteFeedbackStore {
    conn: Mutex<Connection>,
}

impl SqliteFeedbackStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FeedbackStoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, FeedbackStoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, FeedbackStoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS feedback_records (
                id TEXT PRIMARY KEY,
                verdict TEXT NOT NULL,
                confidence REAL NOT NULL,
                anomaly_score REAL NOT NULL,
                label TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<FeedbackRecord> {
        let verdict: String = row.get(1)?;
        let label: Option<String> = row.get(4)?;
        let created_at: String = row.get(5)?;

        Ok(FeedbackRecord {
            id: row.get(0)?,
            verdict: Verdict::parse(&verdict).unwrap_or(Verdict::Uncertain),
            confidence: row.get(2)?,
            anomaly_score: row.get(3)?,
            label: label.as_deref().and_then(FeedbackLabel::parse),
            created_at: created_at
                .parse::<DateTime<Utc>>()
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

impl FeedbackStore for SqliteFeedbackStore {
    fn append(&self, record: FeedbackRecord) -> Result<(), FeedbackStoreError> {
        if !record.confidence.is_finite() || !record.anomaly_score.is_finite() {
            return Err(FeedbackStoreError::InvalidRecord(
                "non-finite confidence or anomaly score".to_string(),
            ));
        }

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO feedback_records (id, verdict, confidence, anomaly_score, label, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.verdict.as_str(),
                record.confidence,
                record.anomaly_score,
                record.label.map(|l| l.as_str()),
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn list_labeled_records(
        &self,
        filter: LabelFilter,
    ) -> Result<Vec<FeedbackRecord>, FeedbackStoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, verdict, confidence, anomaly_score, label, created_at
             FROM feedback_records WHERE label IS NOT NULL ORDER BY created_at",
        )?;
        let rows = stmt.query_map([], Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            let record = row?;
            let keep = match filter {
                LabelFilter::AnyLabel => true,
                LabelFilter::GroundTruthOnly => ground_truth(&record).is_some(),
            };
            if keep {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn list_demonstrable_records(
        &self,
        limit: usize,
    ) -> Result<Vec<FeedbackRecord>, FeedbackStoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, verdict, confidence, anomaly_score, label, created_at
             FROM feedback_records
             WHERE label IN ('correct', 'incorrect')
             ORDER BY created_at LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn record_count(&self) -> Result<usize, FeedbackStoreError> {
        let conn = self.conn.lock();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM feedback_records", [], |r| r.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let store = SqliteFeedbackStore::open_in_memory().unwrap();
        let record = FeedbackRecord::new(Verdict::Fake, 0.85, 0.72, Some(FeedbackLabel::Correct));
        let id = record.id.clone();
        store.append(record).unwrap();

        let loaded = store.list_labeled_records(LabelFilter::AnyLabel).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, id);
        assert_eq!(loaded[0].verdict, Verdict::Fake);
        assert_eq!(loaded[0].label, Some(FeedbackLabel::Correct));
        assert!((loaded[0].anomaly_score - 0.72).abs() < 1e-6);
    }

    #[test]
    fn test_filters_and_limit() {
        let store = SqliteFeedbackStore::open_in_memory().unwrap();
        store
            .append(FeedbackRecord::new(Verdict::Authentic, 0.9, 0.1, None))
            .unwrap();
        store
            .append(FeedbackRecord::new(Verdict::Fake, 0.9, 0.8, Some(FeedbackLabel::Uncertain)))
            .unwrap();
        for _ in 0..3 {
            store
                .append(FeedbackRecord::new(Verdict::Fake, 0.9, 0.8, Some(FeedbackLabel::Incorrect)))
                .unwrap();
        }

        assert_eq!(store.record_count().unwrap(), 5);
        assert_eq!(store.list_labeled_records(LabelFilter::AnyLabel).unwrap().len(), 4);
        assert_eq!(
            store.list_labeled_records(LabelFilter::GroundTruthOnly).unwrap().len(),
            3
        );
        assert_eq!(store.list_demonstrable_records(2).unwrap().len(), 2);
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let store = SqliteFeedbackStore::open_in_memory().unwrap();
        let mut record = FeedbackRecord::new(Verdict::Fake, 0.9, 0.8, None);
        record.anomaly_score = f32::NAN;
        assert!(matches!(
            store.append(record),
            Err(FeedbackStoreError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_file_backed_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.db");
        {
            let store = SqliteFeedbackStore::open(&path).unwrap();
            store
                .append(FeedbackRecord::new(Verdict::Authentic, 0.7, 0.3, Some(FeedbackLabel::Correct)))
                .unwrap();
        }
        let reopened = SqliteFeedbackStore::open(&path).unwrap();
        assert_eq!(reopened.record_count().unwrap(), 1);
    }
}
