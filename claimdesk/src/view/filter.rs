//! Free-text search over a display field and the row id.

use crate::models::Record;

/// Search settings of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    /// Field (or dotted path) the term is matched against, e.g. `"name"`.
    pub display_field: String,
}

impl SearchFilter {
    pub fn on(display_field: impl Into<String>) -> Self {
        Self { display_field: display_field.into() }
    }

    /// Case-insensitive substring of the display field, or substring of the id.
    ///
    /// A blank term matches every row.
    pub fn matches(&self, record: &Record, term: &str) -> bool {
        if term.trim().is_empty() {
            return true;
        }
        let term = term.to_lowercase();

        let in_display = record.display(&self.display_field).to_lowercase().contains(&term);
        let in_id = record.id().is_some_and(|id| id.contains(&term));

        in_display || in_id
    }

    pub fn apply<'a>(&self, rows: &'a [Record], term: &str) -> Vec<&'a Record> {
        rows.iter().filter(|r| self.matches(r, term)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn people() -> Vec<Record> {
        vec![
            Record::from_value(json!({ "id": 1, "name": "John Doe" })).unwrap(),
            Record::from_value(json!({ "id": 2, "name": "Jane Smith" })).unwrap(),
            Record::from_value(json!({ "id": 12, "name": "Ravi Kumar" })).unwrap(),
        ]
    }

    #[test]
    fn test_name_search() {
        let rows = people();
        let hits = SearchFilter::on("name").apply(&rows, "jane");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id().as_deref(), Some("2"));
    }

    #[test]
    fn test_id_search() {
        let rows = people();
        let hits = SearchFilter::on("name").apply(&rows, "2");
        let ids: Vec<_> = hits.iter().filter_map(|r| r.id()).collect();
        assert_eq!(ids, vec!["2", "12"]);
    }

    #[test]
    fn test_blank_term_matches_all() {
        let rows = people();
        assert_eq!(SearchFilter::on("name").apply(&rows, "   ").len(), 3);
    }

    #[test]
    fn test_term_is_not_trimmed() {
        let rows = vec![
            Record::from_value(json!({ "id": 1, "name": "John Doe" })).unwrap(),
            Record::from_value(json!({ "id": 2, "name": "Doemann" })).unwrap(),
        ];
        let hits = SearchFilter::on("name").apply(&rows, " doe");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id().as_deref(), Some("1"));
    }

    #[test]
    fn test_missing_display_field() {
        let rows = people();
        assert!(SearchFilter::on("city").apply(&rows, "pune").is_empty());
    }
}
