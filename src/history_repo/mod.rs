// SQLite record store. Serves as the fetch side of the chart pipeline:
// raw load and ping records in, time-ordered raw records out.

use crate::models::{LoadMetric, LoadRecord, PingRecord, TimeSeriesRecord, from_millis};
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

pub struct HistoryRepo {
    pool: SqlitePool,
    retention_ms: i64,
}

fn metric_columns() -> String {
    LoadMetric::ALL
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl HistoryRepo {
    pub async fn connect(
        path: &str,
        max_pool_size: u32,
        retention_hours: u32,
    ) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        let retention_ms = (retention_hours as i64) * 60 * 60 * 1000;
        Ok(Self { pool, retention_ms })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        let metric_defs = LoadMetric::ALL
            .iter()
            .map(|m| format!("{} REAL", m.as_str()))
            .collect::<Vec<_>>()
            .join(",\n                ");
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS load_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client TEXT NOT NULL,
                time INTEGER NOT NULL,
                {}
            )
            "#,
            metric_defs
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_load_client_time ON load_records(client, time)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ping_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id INTEGER NOT NULL,
                client TEXT NOT NULL,
                time INTEGER NOT NULL,
                value REAL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_ping_task_time ON ping_records(task_id, time)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self, records), fields(repo = "history", operation = "save_load_records", records_count = records.len()))]
    pub async fn save_load_records(&self, records: &[LoadRecord]) -> anyhow::Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let placeholders = vec!["?"; LoadMetric::ALL.len() + 2].join(", ");
        let sql = format!(
            "INSERT INTO load_records (client, time, {}) VALUES ({})",
            metric_columns(),
            placeholders
        );
        let mut tx = self.pool.begin().await?;
        for r in records {
            let mut query = sqlx::query(&sql)
                .bind(&r.client)
                .bind(r.time.timestamp_millis());
            for m in LoadMetric::ALL {
                query = query.bind(r.metric(&m));
            }
            query.execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Load records for `client` at or after `since`. Order: ascending by time.
    #[instrument(skip(self), fields(repo = "history", operation = "get_load_records"))]
    pub async fn get_load_records(
        &self,
        client: &str,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<LoadRecord>> {
        let sql = format!(
            "SELECT client, time, {} FROM load_records WHERE client = $1 AND time >= $2 ORDER BY time ASC",
            metric_columns()
        );
        let rows = sqlx::query(&sql)
            .bind(client)
            .bind(since.timestamp_millis())
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(Self::parse_load_row(&row)?);
        }
        Ok(out)
    }

    #[instrument(skip(self, records), fields(repo = "history", operation = "save_ping_records", records_count = records.len()))]
    pub async fn save_ping_records(&self, records: &[PingRecord]) -> anyhow::Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for r in records {
            sqlx::query(
                "INSERT INTO ping_records (task_id, client, time, value) VALUES ($1, $2, $3, $4)",
            )
            .bind(r.task_id as i64)
            .bind(&r.client)
            .bind(r.time.timestamp_millis())
            .bind(r.value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Ping records of `task_id` across all nodes at or after `since`. Order: ascending by time.
    #[instrument(skip(self), fields(repo = "history", operation = "get_ping_records"))]
    pub async fn get_ping_records(
        &self,
        task_id: u32,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<PingRecord>> {
        let rows = sqlx::query(
            "SELECT task_id, client, time, value FROM ping_records
             WHERE task_id = $1 AND time >= $2 ORDER BY time ASC",
        )
        .bind(task_id as i64)
        .bind(since.timestamp_millis())
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let task_id: i64 = row.try_get("task_id")?;
            out.push(PingRecord {
                task_id: u32::try_from(task_id)?,
                client: row.try_get("client")?,
                time: from_millis(row.try_get("time")?)?,
                value: row.try_get("value")?,
            });
        }
        Ok(out)
    }

    /// Deletes records older than the retention window. Returns rows removed.
    #[instrument(skip(self), fields(repo = "history", operation = "prune_old_data"))]
    pub async fn prune_old_data(&self) -> anyhow::Result<u64> {
        let cutoff = Utc::now().timestamp_millis() - self.retention_ms;
        self.prune_before(cutoff).await
    }

    /// Deletes records with time < `cutoff_ms` from both tables.
    pub async fn prune_before(&self, cutoff_ms: i64) -> anyhow::Result<u64> {
        let load = sqlx::query("DELETE FROM load_records WHERE time < $1")
            .bind(cutoff_ms)
            .execute(&self.pool)
            .await?;
        let ping = sqlx::query("DELETE FROM ping_records WHERE time < $1")
            .bind(cutoff_ms)
            .execute(&self.pool)
            .await?;
        Ok(load.rows_affected() + ping.rows_affected())
    }

    fn parse_load_row(row: &SqliteRow) -> anyhow::Result<LoadRecord> {
        let client: String = row.try_get("client")?;
        let time = from_millis(row.try_get("time")?)?;
        let mut record = LoadRecord::empty(client, time);
        for m in LoadMetric::ALL {
            if let Some(slot) = record.metric_mut(&m) {
                *slot = row.try_get(m.as_str())?;
            }
        }
        Ok(record)
    }
}
