//! Output stitching: join per-file CSV parts under a single header.

use crate::paths::InputJob;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write `header` as a CSV record, then append the `parts` verbatim, in the given order.
/// Missing parts (files that failed) are skipped.
pub fn stitch_csv_parts<W: Write>(header: &[&str], parts: &[PathBuf], out: W) -> Result<W> {
    let mut out = out;
    {
        let mut wtr = csv::Writer::from_writer(&mut out);
        wtr.write_record(header)?;
        wtr.flush()?;
    }
    for p in parts {
        if !p.exists() {
            continue;
        }
        let mut r = BufReader::new(File::open(p).with_context(|| format!("open part {}", p.display()))?);
        std::io::copy(&mut r, &mut out)?;
    }
    out.flush()?;
    Ok(out)
}

pub fn stitch_csv_parts_to_file(header: &[&str], parts: &[PathBuf], out_path: &Path, write_buf: usize) -> Result<()> {
    let f = crate::util::create_with_backoff(out_path, 16, 50)
        .with_context(|| format!("create {}", out_path.display()))?;
    stitch_csv_parts(header, parts, BufWriter::with_capacity(write_buf, f))?;
    Ok(())
}

pub fn part_name_for_job(job: &InputJob) -> String {
    let stem = job.path.file_stem().and_then(|s| s.to_str()).unwrap_or("input");
    format!("{:05}_{stem}.csv.part", job.idx)
}
