//! Debug artifact: the mapped record persisted as pretty JSON for inspection.
//!
//! Writing it is fire-and-forget. [`persist_best_effort`] logs failures and
//! reports them as a stage warning; it never returns an error, so an
//! unwritable working directory cannot fail a run.

use crate::model::CanonicalResumeRecord;
use crate::progress::{ProgressCallback, Stage};
use std::path::Path;
use tracing::{debug, warn};

/// Serialise `record` to `path`.
pub async fn persist_record(record: &CanonicalResumeRecord, path: &Path) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    tokio::fs::write(path, json).await
}

/// Persist the record, swallowing (but logging) any failure.
///
/// Returns `true` when the artifact was written.
pub async fn persist_best_effort(
    record: &CanonicalResumeRecord,
    path: &Path,
    progress: Option<&ProgressCallback>,
) -> bool {
    match persist_record(record, path).await {
        Ok(()) => {
            debug!("Wrote debug artifact {}", path.display());
            true
        }
        Err(e) => {
            let msg = format!("could not write debug artifact {}: {}", path.display(), e);
            warn!("{}", msg);
            if let Some(cb) = progress {
                cb.on_stage_warning(Stage::Map, &msg);
            }
            false
        }
    }
}
