//! Rendering a completed `ProcessedJobData` for the audit output stream.
//!
//! `JobSink` is a seam, not a feature: the processor emits through the trait
//! so a future machine-readable sink can be swapped in without touching the
//! reducer. The only implementation shipped here is the human-readable
//! textual dump written to standard output.

use crate::model::ProcessedJobData;
use std::io::Write;

/// Receives completed job summaries as the processor finalizes them.
pub trait JobSink: Send + Sync {
    fn emit(&self, job: &ProcessedJobData);
}

/// Writes the human-readable job summary dump to a `Write` target.
/// `StdoutSink` wraps this with `std::io::stdout()`; tests use an
/// in-memory buffer so assertions don't depend on process stdout.
pub struct StdoutSink;

impl JobSink for StdoutSink {
    fn emit(&self, job: &ProcessedJobData) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = render(&mut out, job) {
            tracing::error!("failed to write job summary: {e}");
        }
    }
}

/// Renders `job` in the textual summary format to `out`. Set iteration order
/// is unspecified, so reads/writes/executes print in whatever order the
/// underlying `HashSet` yields them.
fn render(out: &mut impl Write, job: &ProcessedJobData) -> std::io::Result<()> {
    writeln!(out, "=== job {} / {} ===", job.job_id, job.cluster_name)?;
    writeln!(out, "job_name:   {}", job.job_name)?;
    writeln!(out, "path:       {}", job.path)?;
    writeln!(out, "start_time: {}", job.start_time)?;
    writeln!(out, "end_time:   {}", job.end_time)?;

    for exec in &job.exec_prov_data_queue {
        writeln!(out)?;
        writeln!(out, "--- exec {} ---", exec.step_name)?;
        writeln!(out, "start_time: {}", exec.start_time)?;
        writeln!(out, "end_time:   {}", exec.end_time)?;
        write_set(out, "reads", &exec.prov_data.reads)?;
        write_set(out, "writes", &exec.prov_data.writes)?;
        write_set(out, "executes", &exec.prov_data.executes)?;

        if !exec.rename_map.is_empty() {
            writeln!(out, "rename_map:")?;
            for (new, original) in &exec.rename_map {
                writeln!(out, "  {new} <- {original}")?;
            }
        }
        if !exec.symlink_map.is_empty() {
            writeln!(out, "symlink_map:")?;
            for (link, target) in &exec.symlink_map {
                writeln!(out, "  {link} -> {target}")?;
            }
        }
    }
    writeln!(out)
}

fn write_set(
    out: &mut impl Write,
    label: &str,
    set: &std::collections::HashSet<String>,
) -> std::io::Result<()> {
    if set.is_empty() {
        return writeln!(out, "{label}: {{}}");
    }
    writeln!(out, "{label}:")?;
    for path in set {
        writeln!(out, "  {path}")?;
    }
    Ok(())
}
