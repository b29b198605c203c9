use crate::config::SiftOptions;
use crate::counting::FrequencyTable;
use crate::dedupe::SqlDeduplicator;
use crate::fields::{extract_log_fields, CSV_HEADERS};
use crate::lines::for_each_line_with_progress_cfg;
use crate::paths::{
    plan_inputs, total_input_size, InputJob, DEFAULT_LOG_DIR, DEFAULT_SQL_DIR, DEFAULT_UID_DIR, ID_INPUT_PATTERN,
    LOG_INPUT_PATTERN,
};
use crate::progress::maybe_progress;
use crate::report::write_uid_report;
use crate::sql_log::extract_embedded_sql_with;
use crate::stitch::{part_name_for_job, stitch_csv_parts_to_file};
use crate::util::{create_with_backoff, init_tracing_once, remove_with_backoff, replace_file_atomic_backoff};
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use parking_lot::Mutex;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Entry point for the file-level jobs. Configure with the builder methods, then run one of
/// [`Sift::logs_to_csv`], [`Sift::dedup_sql`] or [`Sift::dedup_uids`].
#[derive(Clone, Debug, Default)]
pub struct Sift {
    pub(crate) opts: SiftOptions,
}

/// Input file that could not be processed.
#[derive(Clone, Debug, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Failure writing one of the run's own outputs. Input failures skip a file; this aborts.
#[derive(Debug)]
struct OutputError {
    path: PathBuf,
    source: io::Error,
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "write {}", self.path.display())
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

fn output_error(path: &Path, source: impl Into<io::Error>) -> anyhow::Error {
    OutputError { path: path.to_path_buf(), source: source.into() }.into()
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct LogRunStats {
    pub files_planned: usize,
    pub lines_read: u64,
    pub rows_written: u64,
    pub failed: Vec<FileFailure>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SqlRunStats {
    pub files_planned: usize,
    pub lines_read: u64,
    pub statements_found: u64,
    pub unique_written: u64,
    pub duplicates_dropped: u64,
    pub failed: Vec<FileFailure>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DuplicateExample {
    pub uid: String,
    pub count: u64,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct UidRunStats {
    pub files_planned: usize,
    pub identifiers_read: u64,
    pub distinct: usize,
    pub unique: usize,
    pub duplicate: usize,
    pub examples: Vec<DuplicateExample>,
    pub failed: Vec<FileFailure>,
}

impl Sift {
    pub fn new() -> Self {
        Self { opts: SiftOptions::default() }
    }

    pub fn with_options(opts: SiftOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &SiftOptions {
        &self.opts
    }

    // -------- Builder methods --------
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn work_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_work_dir(dir); self }
    pub fn file_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_file_concurrency(n); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn io_read_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_read_buffer(bytes); self }
    pub fn io_write_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_write_buffer(bytes); self }
    pub fn input_pattern(mut self, re: impl Into<String>) -> Self { self.opts = self.opts.with_input_pattern(re); self }
    pub fn input_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_input_dir(dir); self }
    pub fn sql_marker(mut self, marker: impl Into<String>) -> Self { self.opts = self.opts.with_sql_marker(marker); self }
    pub fn sql_escaped_quotes(mut self, yes: bool) -> Self { self.opts = self.opts.with_sql_escaped_quotes(yes); self }
    pub fn example_limit(mut self, n: usize) -> Self { self.opts = self.opts.with_example_limit(n); self }

    fn init_runtime(&self) {
        init_tracing_once();
        if let Some(n) = self.opts.parallelism {
            if n > 0 { rayon::ThreadPoolBuilder::new().num_threads(n).build_global().ok(); }
        }
    }

    fn plan(&self, inputs: &[PathBuf], default_pattern: &str, default_dir: &str) -> Result<Vec<InputJob>> {
        let pattern = self.opts.input_pattern.as_deref().unwrap_or(default_pattern);
        let re = Regex::new(pattern).with_context(|| format!("invalid input pattern {pattern:?}"))?;
        let dir = self.opts.input_dir.clone().unwrap_or_else(|| PathBuf::from(default_dir));
        let jobs = plan_inputs(inputs, &re, &dir)?;
        if jobs.is_empty() {
            tracing::warn!("No input files found. Check the input paths and pattern.");
        } else {
            tracing::info!("Planned {} files for processing.", jobs.len());
        }
        Ok(jobs)
    }

    fn progress_bar(&self, jobs: &[InputJob]) -> Option<ProgressBar> {
        maybe_progress(self.opts.progress, total_input_size(jobs), self.opts.progress_label.as_deref())
    }

    /// Extract the 13 log fields of every non-blank line into one CSV (header + one row per
    /// valid record). Files run `file_concurrency` at a time into part files that are stitched
    /// in input order. Unreadable files are logged, listed in the stats, and skipped; a failed
    /// write aborts the run. With no `inputs` the input dir (default `logs/`) is scanned.
    pub fn logs_to_csv(&self, inputs: &[PathBuf], out_csv: &Path) -> Result<LogRunStats> {
        self.init_runtime();
        let jobs = self.plan(inputs, LOG_INPUT_PATTERN, DEFAULT_LOG_DIR)?;

        let parts_dir = match &self.opts.work_dir {
            Some(d) => d.join("log_parts"),
            None => sibling_work_dir(out_csv, "parts"),
        };
        fs::create_dir_all(&parts_dir).with_context(|| format!("create {}", parts_dir.display()))?;

        let pb = self.progress_bar(&jobs);
        let read_buf = self.opts.read_buffer_bytes;
        let write_buf = self.opts.write_buffer_bytes;

        let lines_read = AtomicU64::new(0);
        let rows_written = AtomicU64::new(0);
        let failed = Mutex::new(Vec::<FileFailure>::new());

        crate::concurrency::for_each_file_limited(&jobs, self.opts.file_concurrency, |job| {
            let part = parts_dir.join(part_name_for_job(job));
            match extract_job_to_part(job, &part, read_buf, write_buf, pb.as_ref()) {
                Ok((lines, rows)) => {
                    lines_read.fetch_add(lines, Ordering::Relaxed);
                    rows_written.fetch_add(rows, Ordering::Relaxed);
                }
                Err(e) if e.is::<OutputError>() => return Err(e),
                Err(e) => {
                    tracing::warn!(path=%job.path.display(), error=%format!("{e:#}"), "skipping log file");
                    let _ = remove_with_backoff(&part, 4, 25);
                    failed.lock().push(FileFailure { path: job.path.clone(), error: format!("{e:#}") });
                }
            }
            Ok(())
        })?;

        if let Some(pb) = pb { pb.finish_with_message("done"); }

        let parts: Vec<PathBuf> = jobs.iter().map(|j| parts_dir.join(part_name_for_job(j))).collect();
        let tmp_out = in_progress_path(out_csv);
        stitch_csv_parts_to_file(&CSV_HEADERS, &parts, &tmp_out, write_buf)?;
        replace_file_atomic_backoff(&tmp_out, out_csv)?;
        let _ = fs::remove_dir_all(&parts_dir);

        let mut failed = failed.into_inner();
        failed.sort_by(|a, b| a.path.cmp(&b.path));
        let stats = LogRunStats {
            files_planned: jobs.len(),
            lines_read: lines_read.into_inner(),
            rows_written: rows_written.into_inner(),
            failed,
        };
        tracing::info!(rows = stats.rows_written, lines = stats.lines_read, out=%out_csv.display(), "log extraction finished");
        Ok(stats)
    }

    /// Scan logs for embedded SQL and keep the first statement of every shape, in input order,
    /// one per line. One dedupe state spans all inputs of this call. A statement only counts as
    /// kept once it has been written. With no `inputs` the input dir (default `sqlFile/`) is scanned.
    pub fn dedup_sql(&self, inputs: &[PathBuf], out: &Path) -> Result<SqlRunStats> {
        self.init_runtime();
        let jobs = self.plan(inputs, LOG_INPUT_PATTERN, DEFAULT_SQL_DIR)?;
        let pb = self.progress_bar(&jobs);

        let tmp_out = in_progress_path(out);
        let file = create_with_backoff(&tmp_out, 16, 50).with_context(|| format!("create {}", tmp_out.display()))?;
        let mut w = BufWriter::with_capacity(self.opts.write_buffer_bytes, file);

        let mut dedupe = SqlDeduplicator::new();
        let mut stats = SqlRunStats { files_planned: jobs.len(), ..Default::default() };
        let marker = self.opts.sql_marker.as_str();
        let escaped_quotes = self.opts.sql_escaped_quotes;

        for job in &jobs {
            tracing::debug!(path=%job.path.display(), "scanning for SQL");
            let res = for_each_line_with_progress_cfg(
                &job.path,
                self.opts.read_buffer_bytes,
                |d| if let Some(pb) = &pb { pb.inc(d) },
                |line| {
                    stats.lines_read += 1;
                    let Some(statement) = extract_embedded_sql_with(line, marker, escaped_quotes) else { return Ok(()) };
                    stats.statements_found += 1;
                    dedupe
                        .keep_with(&statement, |s| {
                            w.write_all(s.as_bytes())?;
                            w.write_all(b"\n")
                        })
                        .map_err(|e| output_error(&tmp_out, e))?;
                    Ok(())
                },
            );
            if let Err(e) = res {
                if e.is::<OutputError>() {
                    return Err(e);
                }
                tracing::warn!(path=%job.path.display(), error=%format!("{e:#}"), "skipping SQL log file");
                stats.failed.push(FileFailure { path: job.path.clone(), error: format!("{e:#}") });
            }
        }

        if let Some(pb) = pb { pb.finish_with_message("done"); }

        w.flush().map_err(|e| output_error(&tmp_out, e))?;
        drop(w);
        replace_file_atomic_backoff(&tmp_out, out)?;

        stats.unique_written = dedupe.kept();
        stats.duplicates_dropped = dedupe.dropped();
        tracing::info!(unique = stats.unique_written, dropped = stats.duplicates_dropped, out=%out.display(), "SQL dedupe finished");
        Ok(stats)
    }

    /// Count identifiers (one per line, blanks skipped) across `inputs`, write the ones seen
    /// exactly once to `unique_out` in first-seen order, and a summary to `report_out`.
    /// With no `inputs` the input dir (default `uidFile/`) is scanned.
    pub fn dedup_uids(&self, inputs: &[PathBuf], unique_out: &Path, report_out: &Path) -> Result<UidRunStats> {
        self.init_runtime();
        let jobs = self.plan(inputs, ID_INPUT_PATTERN, DEFAULT_UID_DIR)?;
        let pb = self.progress_bar(&jobs);

        let mut table = FrequencyTable::new();
        let mut failed = Vec::new();
        for job in &jobs {
            let res = for_each_line_with_progress_cfg(
                &job.path,
                self.opts.read_buffer_bytes,
                |d| if let Some(pb) = &pb { pb.inc(d) },
                |line| {
                    table.push(line);
                    Ok(())
                },
            );
            if let Err(e) = res {
                tracing::warn!(path=%job.path.display(), error=%format!("{e:#}"), "skipping identifier file");
                failed.push(FileFailure { path: job.path.clone(), error: format!("{e:#}") });
            }
        }

        if let Some(pb) = pb { pb.finish_with_message("done"); }

        let write_buf = self.opts.write_buffer_bytes;
        write_atomic(unique_out, write_buf, |w| {
            for uid in table.unique() {
                w.write_all(uid.as_bytes())?;
                w.write_all(b"\n")?;
            }
            Ok(())
        })?;
        write_atomic(report_out, write_buf, |w| {
            write_uid_report(w, &table, self.opts.example_limit)?;
            Ok(())
        })?;

        let stats = UidRunStats {
            files_planned: jobs.len(),
            identifiers_read: table.total(),
            distinct: table.distinct(),
            unique: table.unique_count(),
            duplicate: table.duplicate_count(),
            examples: table
                .duplicate_examples(self.opts.example_limit)
                .into_iter()
                .map(|(uid, count)| DuplicateExample { uid, count })
                .collect(),
            failed,
        };
        tracing::info!(distinct = stats.distinct, unique = stats.unique, duplicate = stats.duplicate, "UID dedupe finished");
        Ok(stats)
    }
}

/// Stream one log file into a header-less CSV part. Returns `(lines_read, rows_written)`.
/// Part write failures come back as [`OutputError`].
fn extract_job_to_part(
    job: &InputJob,
    part: &Path,
    read_buf: usize,
    write_buf: usize,
    pb: Option<&ProgressBar>,
) -> Result<(u64, u64)> {
    let file = create_with_backoff(part, 16, 50).map_err(|e| output_error(part, e))?;
    let mut wtr = csv::Writer::from_writer(BufWriter::with_capacity(write_buf, file));
    let (mut lines, mut rows) = (0u64, 0u64);

    for_each_line_with_progress_cfg(
        &job.path,
        read_buf,
        |d| if let Some(pb) = pb { pb.inc(d) },
        |line| {
            lines += 1;
            if line.trim().is_empty() {
                return Ok(());
            }
            let (record, valid) = extract_log_fields(line);
            if valid {
                wtr.write_record(record.columns()).map_err(|e| output_error(part, e))?;
                rows += 1;
            }
            Ok(())
        },
    )?;
    wtr.flush().map_err(|e| output_error(part, e))?;
    Ok((lines, rows))
}

/// Write through a temp file next to `dest`, then promote it.
fn write_atomic(dest: &Path, write_buf: usize, body: impl FnOnce(&mut BufWriter<fs::File>) -> Result<()>) -> Result<()> {
    let tmp = in_progress_path(dest);
    let file = create_with_backoff(&tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
    let mut w = BufWriter::with_capacity(write_buf, file);
    body(&mut w)?;
    w.flush().with_context(|| format!("flush {}", tmp.display()))?;
    drop(w);
    replace_file_atomic_backoff(&tmp, dest)
}

fn in_progress_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".inprogress");
    dest.with_file_name(name)
}

fn sibling_work_dir(dest: &Path, suffix: &str) -> PathBuf {
    let stem = dest.file_stem().and_then(|s| s.to_str()).unwrap_or("logsift");
    let dir = dest.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    dir.join(format!(".{stem}_{suffix}"))
}
