use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default file-name pattern for log inputs.
pub const LOG_INPUT_PATTERN: &str = r"(?i)\.(txt|log|zst)$";
/// Default file-name pattern for identifier lists.
pub const ID_INPUT_PATTERN: &str = r"(?i)\.(csv|txt)$";

/// Drop directories scanned when a job is given no inputs.
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_SQL_DIR: &str = "sqlFile";
pub const DEFAULT_UID_DIR: &str = "uidFile";

/// One input file scheduled for processing.
#[derive(Clone, Debug)]
pub struct InputJob {
    /// Position in the planned input list; part files are stitched in this order.
    pub idx: usize,
    pub path: PathBuf,
    pub size: u64,
}

/// Files directly under `dir` whose name matches `pattern`, sorted by path.
///
/// A missing directory is created empty and yields no files, so the operator has a place to
/// drop inputs for the next run.
pub fn discover_inputs(dir: &Path, pattern: &Regex) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        fs::create_dir_all(dir).with_context(|| format!("create input dir {}", dir.display()))?;
        tracing::warn!(dir=%dir.display(), "input directory did not exist; created it, put input files there");
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    for ent in WalkDir::new(dir).min_depth(1).max_depth(1).into_iter().flatten() {
        if !ent.file_type().is_file() {
            continue;
        }
        if let Some(name) = ent.file_name().to_str() {
            if pattern.is_match(name) {
                out.push(ent.path().to_path_buf());
            }
        }
    }
    out.sort();
    Ok(out)
}

/// Expand user-supplied paths: directories are scanned with `pattern`, files are kept as given
/// (even if they do not match or do not exist). Order of `inputs` is preserved.
///
/// No inputs means `default_dir`; only that directory is created when missing. Any other
/// missing path stays a file job and fails when opened.
pub fn plan_inputs(inputs: &[PathBuf], pattern: &Regex, default_dir: &Path) -> Result<Vec<InputJob>> {
    let mut paths = Vec::new();
    if inputs.is_empty() {
        paths.extend(discover_inputs(default_dir, pattern)?);
    }
    for p in inputs {
        if p.is_dir() || (!p.exists() && p == default_dir) {
            paths.extend(discover_inputs(p, pattern)?);
        } else {
            paths.push(p.clone());
        }
    }
    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(idx, path)| {
            let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            InputJob { idx, path, size }
        })
        .collect())
}

pub fn total_input_size(jobs: &[InputJob]) -> u64 {
    jobs.iter().map(|j| j.size).sum()
}
