//! Attendance filter and display ordering for the guest list.

use std::str::FromStr;

use crate::errors::AppError;
use crate::models::Rsvp;

/// Which guests to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    Everyone,
    Going,
    Maybe,
    No,
    NotResponded,
}

impl Filter {
    pub const ALL: [Filter; 5] = [
        Filter::Everyone,
        Filter::Going,
        Filter::Maybe,
        Filter::No,
        Filter::NotResponded,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Filter::Everyone => "Everyone",
            Filter::Going => "Going",
            Filter::Maybe => "Maybe",
            Filter::No => "No",
            Filter::NotResponded => "Not Responded",
        }
    }

    /// Whether a record belongs in this view.
    pub fn matches(&self, rsvp: &Rsvp) -> bool {
        let attendance = rsvp.attendance.trim();
        match self {
            Filter::Everyone => true,
            Filter::Going => attendance == "Yes",
            Filter::Maybe => attendance == "Maybe",
            Filter::No => attendance == "No",
            Filter::NotResponded => attendance.is_empty(),
        }
    }
}

impl FromStr for Filter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|filter| filter.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::Validation(format!("Unknown filter: {}", s)))
    }
}

/// Yes, then Maybe, then No, then everything else.
pub fn attendance_priority(attendance: &str) -> u8 {
    match attendance.trim() {
        "Yes" => 1,
        "Maybe" => 2,
        "No" => 3,
        _ => 4,
    }
}

/// Records matching `filter`, ordered by attendance priority and then by
/// case-insensitive name. Ties keep their input order.
pub fn filter_rsvps<'a, I>(records: I, filter: Filter) -> Vec<Rsvp>
where
    I: IntoIterator<Item = &'a Rsvp>,
{
    let mut view: Vec<Rsvp> = records
        .into_iter()
        .filter(|rsvp| filter.matches(rsvp))
        .cloned()
        .collect();
    view.sort_by_cached_key(|rsvp| {
        (
            attendance_priority(&rsvp.attendance),
            rsvp.name.to_lowercase(),
        )
    });
    view
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest(name: &str, attendance: &str) -> Rsvp {
        Rsvp {
            name: name.into(),
            attendance: attendance.into(),
            ..Default::default()
        }
    }

    fn names(view: &[Rsvp]) -> Vec<&str> {
        view.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_everyone_sorted_by_priority_then_name() {
        let records = vec![guest("Bob", "No"), guest("Amy", "Yes"), guest("Zed", "Maybe")];
        let view = filter_rsvps(&records, Filter::Everyone);
        assert_eq!(names(&view), vec!["Amy", "Zed", "Bob"]);
    }

    #[test]
    fn test_not_responded_goes_last() {
        let records = vec![
            guest("casey", ""),
            guest("Taylor", "No"),
            guest("alex", "Yes"),
            guest("Blake", "Yes"),
            guest("Dana", "Sometimes"),
        ];
        let view = filter_rsvps(&records, Filter::Everyone);
        assert_eq!(names(&view), vec!["alex", "Blake", "Taylor", "casey", "Dana"]);
    }

    #[test]
    fn test_filters_select_by_attendance() {
        let records = vec![
            guest("Amy", "Yes"),
            guest("Bob", "No"),
            guest("Cat", " Maybe "),
            guest("Dee", ""),
            guest("Eve", "  "),
        ];
        assert_eq!(names(&filter_rsvps(&records, Filter::Going)), vec!["Amy"]);
        assert_eq!(names(&filter_rsvps(&records, Filter::No)), vec!["Bob"]);
        assert_eq!(names(&filter_rsvps(&records, Filter::Maybe)), vec!["Cat"]);
        assert_eq!(
            names(&filter_rsvps(&records, Filter::NotResponded)),
            vec!["Dee", "Eve"]
        );
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let mut first = guest("Sam", "Yes");
        first.email = "first@example.com".into();
        let mut second = guest("sam", "Yes");
        second.email = "second@example.com".into();
        let view = filter_rsvps(&[first, second], Filter::Going);
        assert_eq!(view[0].email, "first@example.com");
        assert_eq!(view[1].email, "second@example.com");
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("Everyone".parse::<Filter>().unwrap(), Filter::Everyone);
        assert_eq!("not responded".parse::<Filter>().unwrap(), Filter::NotResponded);
        assert!(matches!("Later".parse::<Filter>(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_priorities() {
        assert_eq!(attendance_priority("Yes"), 1);
        assert_eq!(attendance_priority(" Maybe"), 2);
        assert_eq!(attendance_priority("No"), 3);
        assert_eq!(attendance_priority(""), 4);
        assert_eq!(attendance_priority("yes"), 4);
    }
}
