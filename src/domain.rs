use chrono::{DateTime, Utc};
use ratatui::crossterm::event::KeyEvent;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors of the view engine. All of these indicate a
/// misconfigured table and are surfaced immediately, never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("duplicate column key \"{0}\"")]
    DuplicateColumnKey(String),
    #[error("unknown column \"{0}\"")]
    UnknownColumn(String),
    #[error("column \"{0}\" is not sortable")]
    NotSortable(String),
    #[error("column \"{0}\" is not facetable")]
    NotFacetable(String),
    #[error("invalid page size {0}")]
    InvalidPageSize(usize),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed submission file: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Todo,
    Grading,
    Incompleted,
    Completed,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 4] = [
        SubmissionStatus::Todo,
        SubmissionStatus::Grading,
        SubmissionStatus::Incompleted,
        SubmissionStatus::Completed,
    ];

    /// Wire value, as stored in submission files and used as facet key.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Todo => "TODO",
            SubmissionStatus::Grading => "GRADING",
            SubmissionStatus::Incompleted => "INCOMPLETED",
            SubmissionStatus::Completed => "COMPLETED",
        }
    }

    /// Display label shown to reviewers.
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionStatus::Todo => "Todo",
            SubmissionStatus::Grading => "Grading",
            SubmissionStatus::Incompleted => "Failed",
            SubmissionStatus::Completed => "Passed",
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            SubmissionStatus::Todo => "○",
            SubmissionStatus::Grading => "◐",
            SubmissionStatus::Incompleted => "✗",
            SubmissionStatus::Completed => "✓",
        }
    }

    pub fn label_for(wire: &str) -> &'static str {
        SubmissionStatus::ALL
            .iter()
            .find(|s| s.as_str() == wire)
            .map(|s| s.label())
            .unwrap_or("?")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: u64,
    pub submitter_name: String,
    #[serde(default)]
    pub submitter_profile_url: String,
    pub language: String,
    pub score: u32,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub name: String,
    pub max_score: u32,
}

impl Default for Assignment {
    fn default() -> Self {
        Assignment {
            name: "???".to_string(),
            max_score: 0,
        }
    }
}

/// One query result: the assignment header plus its submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionBatch {
    pub assignment: Assignment,
    pub submissions: Vec<Submission>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub event_poll_time: u64,
    pub page_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    NextPage,
    PrevPage,
    GrowPageSize,
    ShrinkPageSize,
    SortAscending,
    SortDescending,
    Facet,
    FilterBySubmitter,
    FilterById,
    ResetFilters,
    Help,
    Enter,
    Exit,
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
 Submission review keys

 j/k, Down/Up   move row cursor
 h/l, Left/Right  move column cursor
 n/p            next/previous page
 +/-            grow/shrink page size
 s/S            sort selected column ascending/descending
 f              status facet filter (Enter toggles, Esc closes)
 /              filter by submitter name
 i              filter by id
 r              reset all filters
 ?              this help
 Esc            leave facet/help/input
 q              quit
";
