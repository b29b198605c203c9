#[path = "common/mod.rs"]
mod common;

use common::*;
use logsift::{
    extract_embedded_sql, extract_embedded_sql_with, filter_unique_sql, unescape_sql, SqlDeduplicator, SQL_INFO_MARKER,
};

/// [s1, s2, s1'] keeps [s1, s2] in that order.
#[test]
fn first_occurrence_wins_in_order() {
    let s1 = "select id,name from users where status = 1 and age > 18";
    let s2 = "select id from orders where user_id = 7";
    let s1b = "select id,name from users where status = 2 and age > 30";

    let kept = filter_unique_sql([s1, s2, s1b]);
    assert_eq!(kept, vec![s1, s2]);
}

/// Counters and seen-state follow every decision.
#[test]
fn deduplicator_counts() {
    let mut d = SqlDeduplicator::with_capacity(4);
    assert!(d.is_empty());
    assert!(d.is_new_and_mark("select a from t where x = 1"));
    assert!(!d.is_new_and_mark("select a from t where x = 2"));
    assert!(d.is_new_and_mark("select a from t where y = 2"));
    assert_eq!(d.len(), 2);
    assert_eq!(d.kept(), 2);
    assert_eq!(d.dropped(), 1);
    assert!(d.seen("t|a|x"));
    assert!(!d.seen("t|a|z"));

    d.reset();
    assert!(d.is_empty());
    assert_eq!(d.kept(), 0);
    assert!(d.is_new_and_mark("select a from t where x = 1"));
}

/// Owned strings go through unchanged.
#[test]
fn filter_unique_keeps_owned_inputs() {
    let mut d = SqlDeduplicator::new();
    let out = d.filter_unique(vec![
        "select * from t where a = 1".to_string(),
        "select * from t where a = 9".to_string(),
        "update t set b = 1 where a = 1".to_string(),
    ]);
    assert_eq!(out, vec!["select * from t where a = 1".to_string(), "update t set b = 1 where a = 1".to_string()]);
}

/// A statement whose write fails is neither recorded nor counted, so a retry keeps it.
#[test]
fn failed_emit_leaves_key_unseen() {
    let mut d = SqlDeduplicator::new();
    let stmt = "select a from t where x = 1";

    let res = d.keep_with(stmt, |_| Err::<(), _>("disk full"));
    assert_eq!(res, Err("disk full"));
    assert!(!d.seen("t|a|x"));
    assert_eq!(d.kept(), 0);

    let mut written = Vec::new();
    assert_eq!(d.keep_with(stmt, |s| { written.push(s.to_string()); Ok::<(), ()>(()) }), Ok(true));
    assert_eq!(d.keep_with("select a from t where x = 2", |_| Err::<(), _>(())), Ok(false));
    assert_eq!(written, vec![stmt.to_string()]);
    assert_eq!((d.kept(), d.dropped()), (1, 1));
}

/// Two states never share decisions.
#[test]
fn states_are_independent() {
    let mut a = SqlDeduplicator::new();
    let mut b = SqlDeduplicator::new();
    assert!(a.is_new_and_mark("select id from users where id = 1"));
    assert!(b.is_new_and_mark("select id from users where id = 2"));
}

/// Single-quoted literals survive and `\\` is unescaped.
#[test]
fn embedded_sql_is_located_and_unescaped() {
    let line = sql_log_line(r"select id from users where name = 'bob' and note = 'a\b'");
    assert_eq!(
        extract_embedded_sql(&line).as_deref(),
        Some(r"select id from users where name = 'bob' and note = 'a\b'")
    );
}

/// By default the statement stops at the first `"`, even an escaped one.
#[test]
fn embedded_sql_stops_at_first_quote() {
    let line = r#"INFO {"sql_INFO":"select a from t where n = \"x\"","cost":1}"#;
    assert_eq!(extract_embedded_sql(line).as_deref(), Some(r"select a from t where n = \"));
    assert_eq!(
        extract_embedded_sql_with(line, SQL_INFO_MARKER, true).as_deref(),
        Some(r#"select a from t where n = "x""#)
    );
}

#[test]
fn embedded_sql_edge_cases() {
    assert_eq!(extract_embedded_sql("no marker here"), None);
    assert_eq!(extract_embedded_sql(r#"{"sql_INFO":""}"#), None);
    assert_eq!(extract_embedded_sql(r#"{"sql_INFO":"select 1"#), None);
    assert_eq!(
        extract_embedded_sql_with(r#"SQL=>"select a from b" end"#, r#"SQL=>""#, false).as_deref(),
        Some("select a from b")
    );
}

#[test]
fn unescape_order() {
    assert_eq!(unescape_sql(r#"a \"b\" c"#), r#"a "b" c"#);
    assert_eq!(unescape_sql(r"x\\y"), r"x\y");
}
