#![allow(dead_code)]

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a plain text file, one entry per line.
pub fn write_lines(path: &Path, lines: &[&str]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    for l in lines {
        writeln!(f, "{}", l).unwrap();
    }
}

/// Write a compressed `.zst` file containing the provided lines.
pub fn write_zst_lines(path: &Path, lines: &[&str]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let f = File::create(path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap();
}

/// Read a text file line-by-line into strings (empty lines skipped).
pub fn read_lines(path: &Path) -> Vec<String> {
    let f = File::open(path).unwrap();
    let r = BufReader::new(f);
    r.lines().map(|l| l.unwrap()).filter(|s| !s.is_empty()).collect()
}

/// Read a CSV file into records (header included).
pub fn read_csv(path: &Path) -> Vec<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(false).from_path(path).unwrap();
    rdr.records()
        .map(|r| r.unwrap().iter().map(|s| s.to_string()).collect())
        .collect()
}

/// Embed a statement in an app log line the way the services log it.
pub fn sql_log_line(sql: &str) -> String {
    let escaped = sql.replace('\\', r"\\").replace('"', r#"\""#);
    format!(r#"2025-06-18T20:58:32.084920+08:00 INFO dao {{"sql_INFO":"{escaped}","cost":3}}"#)
}

/// A realistic payment-callback log line carrying most of the extracted fields.
pub fn payment_log_line() -> String {
    concat!(
        r#"2025-06-18T20:58:32.084920+08:00 INFO http {"requestUrl":"/api/pay/callback","#,
        r#""userId":"12345678","traceId":"0f8fad5b-d9cb-469f-a165-70867728950e","#,
        r#""paySerialNumber":"PSN0000000000001","paySerialNo":"PSO0000000000001","#,
        r#""requestReferenceNumber":"7c9e6679-7425-40de-944b-e07fc1f90ae7","#,
        r#""sign":["0123456789abcdef0123456789abcdef"],"userIp":"10.0.0.7"}"#,
    )
    .to_string()
}

/// Temp workspace with a `logs/` directory of two plain files and one `.zst` file.
pub fn make_log_corpus() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let logs = tmp.path().join("logs");
    let pay = payment_log_line();

    write_lines(&logs.join("a.log"), &[&pay, "", r#"{"userId":"87654321"}"#]);
    write_lines(&logs.join("b.txt"), &[r#"noise without markers"#]);
    write_zst_lines(&logs.join("c.log.zst"), &[r#"{"phone":13800138000,"verifyCode":"123456"}"#]);
    // Ignored by the default pattern.
    write_lines(&logs.join("notes.md"), &[&pay]);

    (tmp, logs)
}
