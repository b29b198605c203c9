//! Line streaming over plain or `.zst` inputs, with optional byte progress.

use anyhow::{Context, Result};
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use zstd::stream::read::Decoder;

use crate::util::open_with_backoff;

/// Default read buffer; also the initial per-line capacity. Lines longer than this still work.
pub const DEFAULT_LINE_BUFFER: usize = 1024 * 1024;

#[inline]
fn is_zstd(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).map_or(false, |e| e.eq_ignore_ascii_case("zst"))
}

/// A `Read` wrapper that counts raw (on-disk) bytes read.
struct CountingReader<R: Read> {
    inner: R,
    counter: Arc<AtomicU64>,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.counter.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

fn open_reader(path: &Path, read_buf_bytes: usize, counter: Arc<AtomicU64>) -> Result<Box<dyn BufRead>> {
    let file = open_with_backoff(path, 16, 50).with_context(|| format!("open {}", path.display()))?;
    let cnt = CountingReader { inner: file, counter };
    let cap = read_buf_bytes.max(8 * 1024);
    if is_zstd(path) {
        let mut decoder = Decoder::new(cnt).with_context(|| format!("zstd init {}", path.display()))?;
        decoder.window_log_max(31)?;
        Ok(Box::new(BufReader::with_capacity(cap, decoder)))
    } else {
        Ok(Box::new(BufReader::with_capacity(cap, cnt)))
    }
}

/// Stream `path` line by line. Trailing `\r?\n` is stripped and invalid UTF-8 is replaced,
/// so odd bytes in a log never abort a run.
pub fn for_each_line_cfg(
    path: &Path,
    read_buf_bytes: usize,
    on_line: impl FnMut(&str) -> Result<()>,
) -> Result<()> {
    for_each_line_with_progress_cfg(path, read_buf_bytes, |_| {}, on_line)
}

/// Same as [`for_each_line_cfg`] but calls `on_progress(delta)` with the number of raw bytes
/// consumed since the previous call (compressed bytes for `.zst`).
pub fn for_each_line_with_progress_cfg(
    path: &Path,
    read_buf_bytes: usize,
    mut on_progress: impl FnMut(u64),
    mut on_line: impl FnMut(&str) -> Result<()>,
) -> Result<()> {
    let counter = Arc::new(AtomicU64::new(0));
    let mut reader = open_reader(path, read_buf_bytes, counter.clone())?;

    let mut buf: Vec<u8> = Vec::with_capacity(read_buf_bytes.min(DEFAULT_LINE_BUFFER));
    let mut last = 0u64;
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        let cur = counter.load(Ordering::Relaxed);
        if cur > last {
            on_progress(cur - last);
            last = cur;
        }
        if n == 0 {
            break;
        }
        if buf.ends_with(b"\n") {
            buf.pop();
            if buf.ends_with(b"\r") { buf.pop(); }
        }
        on_line(&String::from_utf8_lossy(&buf))?;
    }
    Ok(())
}
