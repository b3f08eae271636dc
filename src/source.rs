use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::domain::{AppError, SubmissionBatch};

/// Load one submission batch (assignment header plus rows) from a JSON
/// file. The caller treats a failure as "no data", never as a crash.
pub fn load_batch(path: &Path) -> Result<SubmissionBatch, AppError> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(AppError::Io(std::io::Error::new(
            ErrorKind::InvalidInput,
            format!("{} is not a file", path.display()),
        )));
    }
    debug!("Reading {} ({} bytes)", path.display(), metadata.len());

    let text = fs::read_to_string(path)?;
    let batch: SubmissionBatch = serde_json::from_str(&text)?;
    info!(
        "Loaded {} submissions for assignment \"{}\"",
        batch.submissions.len(),
        batch.assignment.name
    );
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SubmissionStatus;

    const BATCH: &str = r#"{
        "assignment": { "name": "Sorting 101", "maxScore": 10 },
        "submissions": [
            {
                "id": 1,
                "submitterName": "Ada",
                "submitterProfileUrl": "https://example.org/ada.png",
                "language": "Rust",
                "score": 10,
                "status": "COMPLETED",
                "submittedAt": "2026-08-05T14:30:15Z"
            },
            {
                "id": 2,
                "submitterName": "Grace",
                "language": "Go",
                "score": 0,
                "status": "TODO",
                "submittedAt": "2026-08-06T09:00:00Z"
            }
        ]
    }"#;

    #[test]
    fn parses_the_wire_format() {
        let batch: SubmissionBatch = serde_json::from_str(BATCH).unwrap();
        assert_eq!(batch.assignment.max_score, 10);
        assert_eq!(batch.submissions.len(), 2);
        assert_eq!(batch.submissions[0].status, SubmissionStatus::Completed);
        // profile url is optional on the wire
        assert_eq!(batch.submissions[1].submitter_profile_url, "");
    }

    #[test]
    fn rejects_unknown_status_values() {
        let broken = BATCH.replace("\"TODO\"", "\"WAITING\"");
        assert!(serde_json::from_str::<SubmissionBatch>(&broken).is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_batch(Path::new("/no/such/submissions.json")).err();
        assert!(matches!(err, Some(AppError::Io(_))));
    }
}
