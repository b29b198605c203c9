mod config;
mod paths;
mod lines;

mod progress;
mod stitch;
mod concurrency;
mod util;
mod pipeline;
mod report;

mod fields;
mod sql_key;
mod sql_log;
mod dedupe;
mod counting;

pub use crate::config::{SiftOptions, DEFAULT_EXAMPLE_LIMIT};
pub use crate::pipeline::{DuplicateExample, FileFailure, LogRunStats, Sift, SqlRunStats, UidRunStats};

// Pure per-line extractors, usable without the file pipeline.
pub use crate::fields::{extract_log_fields, has_valid_data, parse_log_line, LogRecord, CSV_HEADERS, USER_ID_DEFAULT};
pub use crate::sql_key::{
    canonicalize_sql, extract_field_name, extract_field_names, extract_fields, extract_table_name,
    extract_where_condition, sql_key_string, SqlKey,
};
pub use crate::sql_log::{extract_embedded_sql, extract_embedded_sql_with, unescape_sql, SQL_INFO_MARKER};
pub use crate::dedupe::{filter_unique_sql, SqlDeduplicator};
pub use crate::counting::{count_identifiers, FrequencyTable};
pub use crate::report::write_uid_report;

// Expose multiprogress and progress helpers.
pub use crate::progress::{make_progress_bar_labeled, set_global_multiprogress};

pub use crate::paths::{
    discover_inputs, plan_inputs, InputJob, DEFAULT_LOG_DIR, DEFAULT_SQL_DIR, DEFAULT_UID_DIR, ID_INPUT_PATTERN,
    LOG_INPUT_PATTERN,
};
pub use crate::lines::{for_each_line_cfg, for_each_line_with_progress_cfg, DEFAULT_LINE_BUFFER};

//export robust file ops from util so binaries can import from crate root.
pub use crate::util::{create_with_backoff, init_tracing_once, open_with_backoff, remove_with_backoff, replace_file_atomic_backoff};
