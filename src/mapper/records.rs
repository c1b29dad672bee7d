//! Row extraction and name-keyed upserts over a [`Table`].

use chrono::{DateTime, Utc};

use super::columns::{default_header, ColumnMap, Field};
use super::table::{CellWrite, Table};
use super::{format_timestamp, parse_timestamp};
use crate::errors::AppError;
use crate::models::{Rsvp, WriteAction};

/// Fields rewritten when an existing row is updated. Name is the key and
/// never changes; email is handled separately.
const UPDATABLE_FIELDS: [Field; 5] = [
    Field::Attendance,
    Field::NeedPumpkin,
    Field::Bringing,
    Field::PumpkinPatch,
    Field::PatchDates,
];

/// Whether a missing name may fall through to an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertMode {
    /// Update the row with this name, or append one.
    Upsert,
    /// Update the row with this name, or fail with `NotFound`.
    UpdateOnly,
}

/// Result of [`upsert_record`]: where the record landed and which cells changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// 1-based sheet row number
    pub row_number: u32,
    pub rsvp_id: String,
    pub action: WriteAction,
    pub writes: Vec<CellWrite>,
}

/// Turn every data row with a non-blank name into a record.
///
/// `now` stands in for rows without a parseable timestamp.
pub fn extract_records(table: &Table, now: DateTime<Utc>) -> Vec<Rsvp> {
    if table.len() <= 1 {
        return Vec::new();
    }

    let columns = ColumnMap::resolve(table.header());
    let Some(name_col) = columns.get(Field::Name) else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for row in 1..table.len() {
        let name = table.cell(row, name_col).trim();
        if name.is_empty() {
            continue;
        }

        let value = |field: Field| {
            columns
                .get(field)
                .map(|col| table.cell(row, col).trim().to_string())
                .unwrap_or_default()
        };

        let timestamp = columns
            .get(Field::Timestamp)
            .and_then(|col| parse_timestamp(table.cell(row, col)))
            .unwrap_or(now);

        let row_number = (row + 1) as u32;
        records.push(Rsvp {
            id: Rsvp::row_id(row_number),
            row_index: Some(row_number),
            name: name.to_string(),
            email: value(Field::Email),
            attendance: value(Field::Attendance),
            need_pumpkin: value(Field::NeedPumpkin),
            bringing: value(Field::Bringing),
            pumpkin_patch: value(Field::PumpkinPatch),
            patch_dates: value(Field::PatchDates),
            timestamp: format_timestamp(timestamp),
        });
    }

    records
}

/// Find the first data row whose trimmed name equals `name` (0-based).
pub fn find_row_by_name(table: &Table, name: &str) -> Option<usize> {
    let name_col = ColumnMap::resolve(table.header()).get(Field::Name)?;
    (1..table.len()).find(|&row| table.cell(row, name_col).trim() == name)
}

/// Write `record` into the row matching its name, appending one if allowed.
///
/// The table is modified in place; the returned `writes` list the same
/// changes so a backing store can persist exactly those cells.
pub fn upsert_record(
    table: &mut Table,
    record: &Rsvp,
    mode: UpsertMode,
    now: DateTime<Utc>,
) -> Result<UpsertOutcome, AppError> {
    let name = record.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }

    let mut writes = Vec::new();
    let timestamp = format_timestamp(parse_timestamp(&record.timestamp).unwrap_or(now));

    let (row, action) = match find_row_by_name(table, name) {
        Some(row) => {
            let columns = ColumnMap::resolve(table.header());
            for field in UPDATABLE_FIELDS {
                if let Some(col) = columns.get(field) {
                    stage(table, &mut writes, row, col, field_value(record, field));
                }
            }
            if let Some(col) = columns.get(Field::Email) {
                if !record.email.trim().is_empty() {
                    stage(table, &mut writes, row, col, record.email.trim());
                }
            }
            if let Some(col) = columns.get(Field::Timestamp) {
                stage(table, &mut writes, row, col, &timestamp);
            }
            (row, WriteAction::Updated)
        }
        None if mode == UpsertMode::UpdateOnly => {
            return Err(AppError::NotFound(format!(
                "RSVP not found for name: {}",
                name
            )));
        }
        None => {
            if table.lacks_header() {
                for (col, label) in default_header().iter().enumerate() {
                    stage(table, &mut writes, 0, col, label);
                }
            }

            let mut columns = ColumnMap::resolve(table.header());
            if columns.get(Field::Name).is_none() {
                let col = table.header().len();
                stage(table, &mut writes, 0, col, Field::Name.header_label());
                columns.set(Field::Name, col);
            }

            let row = table.len();
            let mut values = vec![String::new(); table.header().len()];
            for field in Field::ALL {
                if let Some(col) = columns.get(field) {
                    values[col] = match field {
                        Field::Name => name.to_string(),
                        Field::Timestamp => timestamp.clone(),
                        _ => field_value(record, field).to_string(),
                    };
                }
            }
            for (col, value) in values.iter().enumerate() {
                stage(table, &mut writes, row, col, value);
            }
            (row, WriteAction::Added)
        }
    };

    let row_number = (row + 1) as u32;
    Ok(UpsertOutcome {
        row_number,
        rsvp_id: Rsvp::row_id(row_number),
        action,
        writes,
    })
}

fn field_value(record: &Rsvp, field: Field) -> &str {
    match field {
        Field::Name => record.name.trim(),
        Field::Email => record.email.trim(),
        Field::Attendance => record.attendance.trim(),
        Field::NeedPumpkin => record.need_pumpkin.trim(),
        Field::Bringing => record.bringing.trim(),
        Field::PumpkinPatch => record.pumpkin_patch.trim(),
        Field::PatchDates => record.patch_dates.trim(),
        Field::Timestamp => record.timestamp.trim(),
    }
}

fn stage(table: &mut Table, writes: &mut Vec<CellWrite>, row: usize, col: usize, value: &str) {
    let write = CellWrite {
        row,
        col,
        value: value.to_string(),
    };
    table.apply(&write);
    writes.push(write);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 25, 12, 0, 0).unwrap()
    }

    fn table(rows: &[&[&str]]) -> Table {
        Table::new(
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
    }

    fn rsvp(name: &str, attendance: &str) -> Rsvp {
        Rsvp {
            name: name.to_string(),
            attendance: attendance.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_extract_uses_tolerant_headers() {
        let sheet = table(&[
            &["Timestamp", " GUEST ", "Coming", "Notes", "E-Mail"],
            &["2025-10-20T18:30:00Z", "Alex", "Yes", "Pie", "alex@example.com"],
        ]);
        let records = extract_records(&sheet, now());
        assert_eq!(records.len(), 1);
        let alex = &records[0];
        assert_eq!(alex.id, "row-2");
        assert_eq!(alex.row_index, Some(2));
        assert_eq!(alex.name, "Alex");
        assert_eq!(alex.attendance, "Yes");
        assert_eq!(alex.bringing, "Pie");
        assert_eq!(alex.email, "alex@example.com");
        assert_eq!(alex.timestamp, "2025-10-20T18:30:00.000Z");
        // no need-pumpkin column at all
        assert_eq!(alex.need_pumpkin, "");
    }

    #[test]
    fn test_extract_skips_blank_names_and_keeps_row_numbers() {
        let sheet = table(&[
            &["Name", "Attendance"],
            &["", "Yes"],
            &["   ", "No"],
            &["Sam", "Maybe"],
        ]);
        let records = extract_records(&sheet, now());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Sam");
        assert_eq!(records[0].id, "row-4");
    }

    #[test]
    fn test_extract_without_name_column_is_empty() {
        let sheet = table(&[&["Attendance"], &["Yes"]]);
        assert!(extract_records(&sheet, now()).is_empty());
        assert!(extract_records(&table(&[&["Name"]]), now()).is_empty());
    }

    #[test]
    fn test_extract_defaults_timestamp_to_now() {
        let sheet = table(&[
            &["Name", "Timestamp"],
            &["Jordan", ""],
            &["Taylor", "not a date"],
        ]);
        let records = extract_records(&sheet, now());
        assert_eq!(records[0].timestamp, "2025-10-25T12:00:00.000Z");
        assert_eq!(records[1].timestamp, "2025-10-25T12:00:00.000Z");
    }

    #[test]
    fn test_insert_into_empty_table_writes_default_header() {
        let mut sheet = Table::default();
        let outcome =
            upsert_record(&mut sheet, &rsvp("Alex", "Yes"), UpsertMode::Upsert, now()).unwrap();
        assert_eq!(outcome.action, WriteAction::Added);
        assert_eq!(outcome.row_number, 2);
        assert_eq!(outcome.rsvp_id, "row-2");
        assert_eq!(sheet.header(), default_header().as_slice());
        assert_eq!(sheet.cell(1, 0), "Alex");
        assert_eq!(sheet.cell(1, 2), "Yes");
        assert_eq!(sheet.cell(1, 7), "2025-10-25T12:00:00.000Z");
    }

    #[test]
    fn test_upsert_is_idempotent_on_name() {
        let mut sheet = Table::default();
        upsert_record(&mut sheet, &rsvp("Alex", "Yes"), UpsertMode::Upsert, now()).unwrap();
        let second =
            upsert_record(&mut sheet, &rsvp(" Alex ", "No"), UpsertMode::Upsert, now()).unwrap();
        assert_eq!(second.action, WriteAction::Updated);
        assert_eq!(second.row_number, 2);

        let records = extract_records(&sheet, now());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].attendance, "No");
    }

    #[test]
    fn test_update_only_fails_for_unknown_name() {
        let mut sheet = table(&[&["Name", "Attendance"], &["Sam", "Maybe"]]);
        let err = upsert_record(&mut sheet, &rsvp("Zoe", "Yes"), UpsertMode::UpdateOnly, now())
            .unwrap_err();
        assert_eq!(err, AppError::NotFound("RSVP not found for name: Zoe".into()));
        assert_eq!(sheet.len(), 2);
    }

    #[test]
    fn test_update_keeps_name_and_blank_email() {
        let mut sheet = table(&[
            &["Name", "Email", "Attendance"],
            &["Sam", "sam@example.com", "Maybe"],
        ]);
        let outcome =
            upsert_record(&mut sheet, &rsvp("Sam", "Yes"), UpsertMode::UpdateOnly, now()).unwrap();
        assert_eq!(outcome.row_number, 2);
        assert_eq!(sheet.cell(1, 0), "Sam");
        assert_eq!(sheet.cell(1, 1), "sam@example.com");
        assert_eq!(sheet.cell(1, 2), "Yes");

        let mut with_email = rsvp("Sam", "Yes");
        with_email.email = "sam@new.example".into();
        upsert_record(&mut sheet, &with_email, UpsertMode::UpdateOnly, now()).unwrap();
        assert_eq!(sheet.cell(1, 1), "sam@new.example");
    }

    #[test]
    fn test_insert_respects_existing_column_order() {
        let mut sheet = table(&[&["Bringing", "Status", "Guest"]]);
        let mut record = rsvp("Casey", "Maybe");
        record.bringing = "Cider".into();
        record.need_pumpkin = "Yes".into();
        let outcome = upsert_record(&mut sheet, &record, UpsertMode::Upsert, now()).unwrap();
        assert_eq!(outcome.row_number, 2);
        assert_eq!(sheet.rows()[1], vec!["Cider", "Maybe", "Casey"]);
        // need-pumpkin has no column and is dropped, no new column is added
        assert_eq!(sheet.header().len(), 3);
    }

    #[test]
    fn test_insert_creates_missing_name_column() {
        let mut sheet = table(&[&["Attendance"], &["Yes"]]);
        let outcome =
            upsert_record(&mut sheet, &rsvp("Drew", "No"), UpsertMode::Upsert, now()).unwrap();
        assert_eq!(sheet.header(), ["Attendance".to_string(), "Name".to_string()]);
        assert_eq!(outcome.row_number, 3);
        assert_eq!(sheet.cell(2, 1), "Drew");
        assert_eq!(sheet.cell(2, 0), "No");
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let mut sheet = Table::default();
        let err = upsert_record(&mut sheet, &rsvp("  ", "Yes"), UpsertMode::Upsert, now())
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_writes_mirror_table_changes() {
        let mut sheet = table(&[&["Name", "Attendance", "Timestamp"], &["Alex", "Yes", ""]]);
        let mut record = rsvp("Alex", "No");
        record.timestamp = "2025-10-26T09:15:00.000Z".into();
        let outcome = upsert_record(&mut sheet, &record, UpsertMode::Upsert, now()).unwrap();

        let mut replayed = table(&[&["Name", "Attendance", "Timestamp"], &["Alex", "Yes", ""]]);
        for write in &outcome.writes {
            replayed.apply(write);
        }
        assert_eq!(replayed, sheet);
        assert_eq!(sheet.cell(1, 2), "2025-10-26T09:15:00.000Z");
    }
}
