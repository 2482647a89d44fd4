//! Conversion and copying of classified files into the output directory.
use crate::error::RecodeError;
use crate::progress::ProgressReporter;
use crate::types::*;
use crate::utils::counter::Counter;
use crate::utils::encoding::{decode_to_string, encode_string};
use crate::utils::files::write_file;
use crate::utils::threadpool::ThreadPool;
use anyhow::Context;
use std::fs;
use std::sync::Arc;
use tracing::{info, warn};

fn convert_entry(
    entry: &FileEntry,
    options: &RunOptions,
    counter: &Counter,
) -> anyhow::Result<Outcome> {
    let dest = options.output_dir.join(entry.file_name());
    if entry.detected_encoding == options.target_encoding {
        if !options.copy_unchanged {
            return Ok(Outcome::Skipped);
        }
        if let Err(e) = fs::copy(&entry.source_path, &dest) {
            let _ = fs::remove_file(&dest);
            return Err(e).context("Failed to copy file");
        }
        return Ok(Outcome::Copied { dest });
    }
    let data = fs::read(&entry.source_path).context("Failed to read file")?;
    let body = data.get(entry.bom_len..).unwrap_or_default();
    let text = decode_to_string(entry.detected_encoding, body)?;
    let out = encode_string(options.target_encoding, &text, !options.lossy, counter)?;
    write_file(&dest, &out).context("Failed to write file")?;
    Ok(Outcome::Converted {
        from: entry.detected_encoding,
        to: options.target_encoding,
        dest,
    })
}

/// Converts or copies one entry. Failures are turned into [Outcome::Failed].
pub fn process_entry(entry: &FileEntry, options: &RunOptions, counter: &Counter) -> Outcome {
    match convert_entry(entry, options, counter) {
        Ok(outcome) => outcome,
        Err(e) => {
            let err = RecodeError::conversion(entry.source_path.clone(), e);
            warn!("{}", err);
            Outcome::Failed(err)
        }
    }
}

fn finish_entry(
    entry: &FileEntry,
    outcome: Outcome,
    progress: &dyn ProgressReporter,
    counter: &Counter,
) -> Option<ProcessedFile> {
    counter.inc(&outcome);
    progress.advance(entry, &outcome);
    outcome.into_processed()
}

/// Counts jobs which were submitted but produced no result, i.e. panicked, as errors.
fn record_lost_jobs(submitted: usize, finished: usize, counter: &Counter) {
    let lost = submitted.saturating_sub(finished);
    if lost > 0 {
        warn!("{} files were not processed because a worker panicked", lost);
        for _ in 0..lost {
            counter.inc_error();
        }
    }
}

/// Processes all entries on a pool of `options.jobs` workers and waits for all of them.
///
/// A failing entry is logged and counted and the others still run.
/// The returned files are sorted by path.
pub fn process(
    entries: Vec<FileEntry>,
    options: &RunOptions,
    progress: Arc<dyn ProgressReporter>,
    counter: Arc<Counter>,
) -> Vec<ProcessedFile> {
    progress.start(entries.len() as u64);
    let workers = options.jobs.clamp(1, entries.len().max(1));
    let mut processed = match ThreadPool::new(workers, "subenc-worker-") {
        Ok(pool) => {
            info!("Processing {} files on {} workers", entries.len(), pool.size());
            let options = Arc::new(options.clone());
            let mut submitted = 0;
            for entry in entries {
                let job_options = Arc::clone(&options);
                let job_progress = Arc::clone(&progress);
                let job_counter = Arc::clone(&counter);
                let job = move || {
                    let outcome = process_entry(&entry, &job_options, &job_counter);
                    finish_entry(&entry, outcome, job_progress.as_ref(), &job_counter)
                };
                match pool.execute(job) {
                    Ok(()) => submitted += 1,
                    Err(e) => {
                        warn!("{}", e);
                        counter.inc_error();
                    }
                }
            }
            let results = pool.into_results();
            record_lost_jobs(submitted, results.len(), &counter);
            results.into_iter().flatten().collect::<Vec<_>>()
        }
        Err(e) => {
            info!("Falling back to sequential processing: {}", e);
            entries
                .iter()
                .filter_map(|entry| {
                    let outcome = process_entry(entry, options, &counter);
                    finish_entry(entry, outcome, progress.as_ref(), &counter)
                })
                .collect()
        }
    };
    progress.finish();
    processed.sort();
    processed
}
