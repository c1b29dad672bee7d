//! Tolerant header resolution.
//!
//! Sheet columns are found by label, never by position. Each logical field
//! has an ordered list of accepted spellings; the first spelling present in
//! the header row wins.

/// Logical RSVP fields stored in the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Attendance,
    NeedPumpkin,
    Bringing,
    PumpkinPatch,
    PatchDates,
    Timestamp,
}

/// Accepted header spellings per field, in priority order.
const FIELD_ALIASES: [(Field, &[&str]); 8] = [
    (Field::Name, &["name", "guest", "person"]),
    (Field::Email, &["email", "e-mail", "mail", "contact"]),
    (Field::Attendance, &["attendance", "coming", "status", "rsvp"]),
    (Field::NeedPumpkin, &["need pumpkin", "needpumpkin", "pumpkin"]),
    (Field::Bringing, &["bringing", "notes", "comment", "details"]),
    (Field::PumpkinPatch, &["pumpkin patch", "pumpkinpatch", "patch"]),
    (Field::PatchDates, &["patch dates", "patchdates", "dates", "available dates"]),
    (Field::Timestamp, &["timestamp", "date", "submitted", "created"]),
];

impl Field {
    /// Every field, in default header order.
    pub const ALL: [Field; 8] = [
        Field::Name,
        Field::Email,
        Field::Attendance,
        Field::NeedPumpkin,
        Field::Bringing,
        Field::PumpkinPatch,
        Field::PatchDates,
        Field::Timestamp,
    ];

    pub fn aliases(self) -> &'static [&'static str] {
        FIELD_ALIASES
            .iter()
            .find(|(field, _)| *field == self)
            .map(|(_, aliases)| *aliases)
            .unwrap_or(&[])
    }

    /// Label written when this field's column has to be created.
    pub fn header_label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Attendance => "Attendance",
            Field::NeedPumpkin => "Need Pumpkin",
            Field::Bringing => "Bringing",
            Field::PumpkinPatch => "Pumpkin Patch",
            Field::PatchDates => "Patch Dates",
            Field::Timestamp => "Timestamp",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Header row written into an empty sheet.
pub fn default_header() -> Vec<String> {
    Field::ALL
        .iter()
        .map(|field| field.header_label().to_string())
        .collect()
}

/// Lowercase and trim a header label for comparison.
pub fn normalize_header(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Find the column whose label matches one of `candidates`.
///
/// Candidates are tried in order and the first one present wins, so
/// `["name", "guest"]` picks a `Name` column over an earlier `Guest` column.
pub fn resolve_column<S: AsRef<str>>(header: &[S], candidates: &[&str]) -> Option<usize> {
    let normalized: Vec<String> = header
        .iter()
        .map(|label| normalize_header(label.as_ref()))
        .collect();

    candidates.iter().find_map(|candidate| {
        let wanted = normalize_header(candidate);
        normalized.iter().position(|label| *label == wanted)
    })
}

/// Resolved column index for every field of one header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [Option<usize>; 8],
}

impl ColumnMap {
    pub fn resolve<S: AsRef<str>>(header: &[S]) -> Self {
        let mut map = Self::default();
        for field in Field::ALL {
            map.indices[field.slot()] = resolve_column(header, field.aliases());
        }
        map
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        self.indices[field.slot()]
    }

    pub fn set(&mut self, field: Field, column: usize) {
        self.indices[field.slot()] = Some(column);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_case_and_space_insensitive() {
        let header = ["  NAME ", "Coming", "Need Pumpkin"];
        assert_eq!(resolve_column(&header, Field::Name.aliases()), Some(0));
        assert_eq!(resolve_column(&header, Field::Attendance.aliases()), Some(1));
        assert_eq!(resolve_column(&header, Field::NeedPumpkin.aliases()), Some(2));
    }

    #[test]
    fn test_first_candidate_wins_over_column_order() {
        let header = ["Guest", "Name"];
        assert_eq!(resolve_column(&header, Field::Name.aliases()), Some(1));
        let header = ["Guest", "Person"];
        assert_eq!(resolve_column(&header, Field::Name.aliases()), Some(0));
    }

    #[test]
    fn test_missing_field_is_none() {
        let header = ["Name", "Attendance"];
        assert_eq!(resolve_column(&header, Field::Email.aliases()), None);
        let empty: [&str; 0] = [];
        assert_eq!(resolve_column(&empty, Field::Name.aliases()), None);
    }

    #[test]
    fn test_match_is_exact_not_substring() {
        // "dates" belongs to patch dates, "date" to timestamp
        let header = ["Name", "Dates", "Date"];
        let map = ColumnMap::resolve(&header);
        assert_eq!(map.get(Field::PatchDates), Some(1));
        assert_eq!(map.get(Field::Timestamp), Some(2));
        // "Pumpkin Patch" must not satisfy need-pumpkin's "pumpkin"
        let header = ["Name", "Pumpkin Patch"];
        let map = ColumnMap::resolve(&header);
        assert_eq!(map.get(Field::NeedPumpkin), None);
        assert_eq!(map.get(Field::PumpkinPatch), Some(1));
    }

    #[test]
    fn test_default_header_resolves_every_field() {
        let map = ColumnMap::resolve(&default_header());
        for (i, field) in Field::ALL.into_iter().enumerate() {
            assert_eq!(map.get(field), Some(i));
        }
    }
}
