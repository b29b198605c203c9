use crate::lines::DEFAULT_LINE_BUFFER;
use crate::sql_log::SQL_INFO_MARKER;
use std::path::{Path, PathBuf};

/// Number of duplicate identifiers quoted in the UID report.
pub const DEFAULT_EXAMPLE_LIMIT: usize = 10;

/// User-facing options with defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct SiftOptions {
    pub parallelism: Option<usize>,     // Some(N) to size the rayon pool, None for rayon's default
    pub work_dir: Option<PathBuf>,      // part files; defaults to a temp dir next to the output
    pub file_concurrency: usize,        // log files extracted concurrently (SQL/UID runs stay sequential)
    pub progress: bool,                 // show progress bar
    pub progress_label: Option<String>, // optional label for progress bar

    // IO tuning
    pub read_buffer_bytes: usize,       // BufReader capacity; lines may exceed it
    pub write_buffer_bytes: usize,      // BufWriter capacity

    // input selection
    pub input_pattern: Option<String>,  // file-name regex when an input is a directory
    pub input_dir: Option<PathBuf>,     // scanned when no inputs are given; overrides the job's default

    // job knobs
    pub sql_marker: String,             // marker preceding embedded SQL
    pub sql_escaped_quotes: bool,       // let `\"` inside a statement pass instead of ending it
    pub example_limit: usize,           // duplicate examples quoted in UID reports
}

impl Default for SiftOptions {
    fn default() -> Self {
        Self {
            parallelism: None,
            work_dir: None,
            file_concurrency: 1,
            progress: true,
            progress_label: None,

            read_buffer_bytes: DEFAULT_LINE_BUFFER,
            write_buffer_bytes: 256 * 1024,

            input_pattern: None,
            input_dir: None,

            sql_marker: SQL_INFO_MARKER.to_string(),
            sql_escaped_quotes: false,
            example_limit: DEFAULT_EXAMPLE_LIMIT,
        }
    }
}

impl SiftOptions {
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }
    pub fn with_work_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.work_dir = Some(dir.as_ref().to_path_buf());
        self
    }
    pub fn with_file_concurrency(mut self, n: usize) -> Self {
        self.file_concurrency = n.max(1);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }

    pub fn with_io_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_io_write_buffer(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes.max(8 * 1024);
        self
    }

    pub fn with_input_pattern(mut self, re: impl Into<String>) -> Self {
        self.input_pattern = Some(re.into());
        self
    }
    pub fn with_input_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.input_dir = Some(dir.as_ref().to_path_buf());
        self
    }
    pub fn with_sql_marker(mut self, marker: impl Into<String>) -> Self {
        self.sql_marker = marker.into();
        self
    }
    pub fn with_sql_escaped_quotes(mut self, yes: bool) -> Self {
        self.sql_escaped_quotes = yes;
        self
    }
    pub fn with_example_limit(mut self, n: usize) -> Self {
        self.example_limit = n;
        self
    }
}
