// Console flows behind the two command-line switches. Results go to
// stdout; the spinner and log output go to stderr.

use crate::api::{HostClient, UploadResult};
use crate::store::StateStore;
use crate::sweeper::{Outcome, SweepReport, Sweeper};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Upload `path`, record it in the state file and print the id and link.
/// A failure to record is reported as a failed upload even though the
/// host already has the file.
pub fn upload(client: &HostClient, store: &StateStore, path: &Path) -> Result<UploadResult> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(format!("Uploading {}...", path.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = client.upload(path);
    spinner.finish_and_clear();

    let result = result.with_context(|| format!("Error uploading file {}", path.display()))?;
    store.update(&result.id, result.uploaded_at).with_context(|| {
        format!(
            "Uploaded as {} but could not record it in {}",
            result.id,
            store.path().display()
        )
    })?;

    println!("File uploaded successfully. File ID: {}", result.id);
    println!("View link: {}", result.link);
    Ok(result)
}

/// Run one keepalive sweep and print a line per recorded file.
pub fn keepalive(client: &HostClient, store: &StateStore, interval_days: u32) -> Result<()> {
    let report = Sweeper::new(client, store, interval_days)
        .sweep()
        .context("Keepalive finished but the state file could not be written")?;
    for line in report_lines(&report, store.path()) {
        println!("{line}");
    }
    Ok(())
}

/// Human-readable status lines for a sweep.
pub fn report_lines(report: &SweepReport, state_file: &Path) -> Vec<String> {
    match report {
        SweepReport::NoState => vec![format!(
            "No {} found. Please upload a file first.",
            state_file.display()
        )],
        SweepReport::Corrupted { .. } => vec![format!(
            "JSON file {} is empty or corrupted.",
            state_file.display()
        )],
        SweepReport::Unavailable { reason } => vec![format!(
            "JSON file {} could not be read: {}",
            state_file.display(),
            reason
        )],
        SweepReport::Swept { entries, saved } => {
            let mut lines: Vec<String> = entries
                .iter()
                .map(|e| match &e.outcome {
                    Outcome::Visited => format!("Successfully visited {}", e.url),
                    Outcome::Skipped { last_visit } => {
                        format!("Skipped {} (Last visit: {})", e.id, last_visit.to_rfc3339())
                    }
                    Outcome::Failed { reason } => format!("Failed to visit {}: {}", e.url, reason),
                })
                .collect();
            if *saved {
                lines.push(format!(
                    "Updated JSON file after keepalive: {}",
                    state_file.display()
                ));
            }
            lines
        }
    }
}
