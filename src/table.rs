use crate::columns::{CellValue, ColumnDescriptor, ColumnRegistry, FilterPredicate};
use crate::domain::{EngineError, Submission, SubmissionStatus};

pub const COL_ID: &str = "id";
pub const COL_SUBMITTER: &str = "submitter";
pub const COL_LANGUAGE: &str = "language";
pub const COL_SCORE: &str = "score";
pub const COL_STATUS: &str = "status";
pub const COL_SUBMITTED: &str = "submitted";

/// Column registry of the submission review table. The id and submitter
/// columns take text filters, status drives the facet filter, score and
/// submitted-at are sortable.
pub fn submission_columns(max_score: u32) -> Result<ColumnRegistry<Submission>, EngineError> {
    ColumnRegistry::new(vec![
        ColumnDescriptor::new(COL_ID, "ID", |s: &Submission| CellValue::Int(s.id as i64))
            .with_filter(FilterPredicate::Substring)
            .sortable(),
        ColumnDescriptor::new(COL_SUBMITTER, "Submitter name", |s: &Submission| {
            CellValue::Text(s.submitter_name.clone())
        })
        .with_filter(FilterPredicate::Substring)
        .sortable(),
        ColumnDescriptor::new(COL_LANGUAGE, "Language", |s: &Submission| {
            CellValue::Text(s.language.clone())
        }),
        ColumnDescriptor::new(COL_SCORE, "Score", |s: &Submission| CellValue::Int(s.score as i64))
            .with_render(move |v| format!("{}/{}", v.canonical(), max_score))
            .sortable(),
        ColumnDescriptor::new(COL_STATUS, "Status", |s: &Submission| {
            CellValue::Text(s.status.as_str().to_string())
        })
        .with_render(|v| {
            let wire = v.canonical();
            match SubmissionStatus::ALL.iter().find(|s| s.as_str() == wire) {
                Some(status) => format!("{} {}", status.marker(), status.label()),
                None => wire,
            }
        })
        .faceted(),
        ColumnDescriptor::new(COL_SUBMITTED, "Submitted at", |s: &Submission| {
            CellValue::Time(s.submitted_at)
        })
        .with_render(|v| match v {
            // Mirrors the dashboard's "d MMM yy pp" date format
            CellValue::Time(t) => t.format("%-d %b %y %-I:%M:%S %p").to_string(),
            other => other.canonical(),
        })
        .sortable(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn submission() -> Submission {
        Submission {
            id: 42,
            submitter_name: "Ada Lovelace".to_string(),
            submitter_profile_url: String::new(),
            language: "Rust".to_string(),
            score: 8,
            status: SubmissionStatus::Completed,
            submitted_at: Utc.with_ymd_and_hms(2026, 8, 5, 14, 30, 15).unwrap(),
        }
    }

    #[test]
    fn renders_the_original_column_layout() {
        let registry = submission_columns(10).unwrap();
        assert_eq!(
            registry.render_row(&submission()),
            vec![
                "42",
                "Ada Lovelace",
                "Rust",
                "8/10",
                "✓ Passed",
                "5 Aug 26 2:30:15 PM",
            ]
        );
    }

    #[test]
    fn status_is_the_only_facetable_column() {
        let registry = submission_columns(10).unwrap();
        let facetable: Vec<&str> = registry
            .iter()
            .filter(|c| c.facetable())
            .map(|c| c.key())
            .collect();
        assert_eq!(facetable, vec![COL_STATUS]);
    }

    #[test]
    fn language_is_not_sortable() {
        let registry = submission_columns(10).unwrap();
        assert!(registry.column(COL_LANGUAGE).unwrap().comparator().is_none());
        assert!(registry.column(COL_SCORE).unwrap().comparator().is_some());
    }

    #[test]
    fn incompleted_renders_as_failed() {
        let registry = submission_columns(100).unwrap();
        let mut failed = submission();
        failed.status = SubmissionStatus::Incompleted;
        assert_eq!(registry.render_row(&failed)[4], "✗ Failed");
    }
}
