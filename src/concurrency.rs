//! Concurrency helper: limit the number of input files processed in parallel.

use crate::paths::InputJob;
use anyhow::Result;
use rayon::prelude::*;

/// Run `f` over `files` with at most `limit` in flight. Within a file, work stays sequential.
pub fn for_each_file_limited<F>(files: &[InputJob], limit: usize, f: F) -> Result<()>
where
    F: Sync + Fn(&InputJob) -> Result<()>,
{
    if limit <= 1 {
        return files.iter().try_for_each(&f);
    }
    for chunk in files.chunks(limit) {
        chunk.par_iter().try_for_each(&f)?;
    }
    Ok(())
}
