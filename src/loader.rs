use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::{config::SelectionPolicy, types::PullRequestRecord};

/// Reads every data row of a statistics CSV. The first line must be the
/// header; columns are matched by name.
pub fn load_records(path: &Path) -> Result<Vec<PullRequestRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open statistics file {}", path.display()))?;

    let mut records = Vec::new();
    for (index, row) in reader.deserialize().enumerate() {
        let record: PullRequestRecord = row.with_context(|| {
            format!(
                "Failed to parse row {} of statistics file {}",
                index + 1,
                path.display()
            )
        })?;
        records.push(record);
    }

    debug!(path = %path.display(), rows = records.len(), "Loaded statistics file");
    Ok(records)
}

/// Applies the selection policy. An empty input is an error under every
/// policy.
pub fn select_records(
    records: Vec<PullRequestRecord>,
    policy: SelectionPolicy,
) -> Result<Vec<PullRequestRecord>> {
    if records.is_empty() {
        anyhow::bail!("No pull request rows found in statistics file");
    }

    let selected: Vec<PullRequestRecord> = match policy {
        SelectionPolicy::First => records.into_iter().take(1).collect(),
        SelectionPolicy::All => records,
    };

    debug!(policy = ?policy, selected = selected.len(), "Selected rows");
    Ok(selected)
}
