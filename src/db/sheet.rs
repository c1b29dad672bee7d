//! Sheet repository: loads the cell table and persists record writes.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;

use crate::errors::AppError;
use crate::mapper::{
    extract_records, format_timestamp, normalize_header, upsert_record, CellWrite, Table,
    UpsertMode,
};
use crate::models::{Rsvp, RsvpList, WriteResult};

/// Repository over the single RSVP sheet.
pub struct SheetRepository {
    pool: SqlitePool,
    /// Serializes find-or-insert so two submissions for one name cannot
    /// both append a row.
    write_lock: Mutex<()>,
}

impl SheetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }

    /// Load every stored cell into a table.
    pub async fn load_table(&self) -> Result<Table, AppError> {
        let rows = sqlx::query("SELECT row_idx, col_idx, value FROM sheet_cells")
            .fetch_all(&self.pool)
            .await?;

        Ok(Table::from_cells(rows.iter().map(|row| {
            let row_idx: i64 = row.get("row_idx");
            let col_idx: i64 = row.get("col_idx");
            (row_idx as usize, col_idx as usize, row.get("value"))
        })))
    }

    /// Time of the last write to the sheet.
    pub async fn last_modified(&self) -> Result<String, AppError> {
        let row = sqlx::query("SELECT last_modified FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("last_modified"))
    }

    /// All records with a non-blank name, in sheet order.
    pub async fn get_rsvps(&self) -> Result<RsvpList, AppError> {
        let table = self.load_table().await?;
        let rsvps = extract_records(&table, Utc::now());
        let headers = table
            .header()
            .iter()
            .map(|label| normalize_header(label))
            .collect();

        Ok(RsvpList {
            rsvps,
            last_modified: self.last_modified().await?,
            headers,
        })
    }

    /// Update the row for this name, or append one.
    pub async fn add_rsvp(&self, record: &Rsvp) -> Result<WriteResult, AppError> {
        self.write_record(record, UpsertMode::Upsert).await
    }

    /// Update the row for this name; `NotFound` if there is none.
    pub async fn update_rsvp(&self, record: &Rsvp) -> Result<WriteResult, AppError> {
        self.write_record(record, UpsertMode::UpdateOnly).await
    }

    async fn write_record(&self, record: &Rsvp, mode: UpsertMode) -> Result<WriteResult, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut table = self.load_table().await?;
        let outcome = upsert_record(&mut table, record, mode, Utc::now())?;
        self.persist(&outcome.writes).await?;

        tracing::info!(
            "RSVP for {} {:?} at row {}",
            record.name.trim(),
            outcome.action,
            outcome.row_number
        );

        Ok(WriteResult {
            success: true,
            rsvp_id: outcome.rsvp_id,
            row_index: outcome.row_number,
            action: outcome.action,
        })
    }

    /// Replace the whole sheet with `rows` (row 0 is the header).
    pub async fn replace_rows(&self, rows: &[Vec<String>]) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM sheet_cells")
            .execute(&mut *tx)
            .await?;
        for (row_idx, cells) in rows.iter().enumerate() {
            for (col_idx, value) in cells.iter().enumerate() {
                sqlx::query("INSERT INTO sheet_cells (row_idx, col_idx, value) VALUES (?, ?, ?)")
                    .bind(row_idx as i64)
                    .bind(col_idx as i64)
                    .bind(value)
                    .execute(&mut *tx)
                    .await?;
            }
        }
        touch_meta(&mut tx).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn persist(&self, writes: &[CellWrite]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for write in writes {
            sqlx::query(
                "INSERT INTO sheet_cells (row_idx, col_idx, value) VALUES (?, ?, ?) \
                 ON CONFLICT(row_idx, col_idx) DO UPDATE SET value = excluded.value",
            )
            .bind(write.row as i64)
            .bind(write.col as i64)
            .bind(&write.value)
            .execute(&mut *tx)
            .await?;
        }
        touch_meta(&mut tx).await?;

        tx.commit().await?;
        Ok(())
    }
}

async fn touch_meta(tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>) -> Result<(), AppError> {
    let now = format_timestamp(Utc::now());
    sqlx::query("UPDATE meta SET revision_id = revision_id + 1, last_modified = ? WHERE id = 1")
        .bind(&now)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::WriteAction;
    use tempfile::TempDir;

    async fn repo() -> (SheetRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("sheet.sqlite"))
            .await
            .unwrap();
        (SheetRepository::new(pool), temp_dir)
    }

    fn rsvp(name: &str, attendance: &str) -> Rsvp {
        Rsvp {
            name: name.into(),
            attendance: attendance.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_sheet_has_no_rsvps() {
        let (repo, _dir) = repo().await;
        let list = repo.get_rsvps().await.unwrap();
        assert!(list.rsvps.is_empty());
        assert!(list.headers.is_empty());
    }

    #[tokio::test]
    async fn test_add_then_update_same_name() {
        let (repo, _dir) = repo().await;

        let first = repo.add_rsvp(&rsvp("Alex", "Yes")).await.unwrap();
        assert_eq!(first.rsvp_id, "row-2");
        assert_eq!(first.action, WriteAction::Added);

        let second = repo.add_rsvp(&rsvp("Alex", "No")).await.unwrap();
        assert_eq!(second.row_index, 2);
        assert_eq!(second.action, WriteAction::Updated);

        let list = repo.get_rsvps().await.unwrap();
        assert_eq!(list.rsvps.len(), 1);
        assert_eq!(list.rsvps[0].attendance, "No");
        assert_eq!(list.headers[0], "name");
    }

    #[tokio::test]
    async fn test_update_unknown_name_is_not_found() {
        let (repo, _dir) = repo().await;
        repo.add_rsvp(&rsvp("Sam", "Maybe")).await.unwrap();
        let err = repo.update_rsvp(&rsvp("Zoe", "Yes")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_adds_for_one_name_make_one_row() {
        let (repo, _dir) = repo().await;
        let repo = std::sync::Arc::new(repo);

        let mut handles = Vec::new();
        for attendance in ["Yes", "No", "Maybe", "Yes"] {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.add_rsvp(&rsvp("Jordan", attendance)).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let list = repo.get_rsvps().await.unwrap();
        assert_eq!(list.rsvps.len(), 1);
    }

    #[tokio::test]
    async fn test_replace_rows_and_last_modified_moves() {
        let (repo, _dir) = repo().await;
        let before = repo.last_modified().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        repo.replace_rows(&[
            vec!["Guest".into(), "RSVP".into()],
            vec!["Casey".into(), "".into()],
        ])
        .await
        .unwrap();

        let list = repo.get_rsvps().await.unwrap();
        assert_eq!(list.rsvps.len(), 1);
        assert_eq!(list.rsvps[0].name, "Casey");
        assert!(list.rsvps[0].is_unanswered());
        assert!(list.last_modified > before);
    }
}
