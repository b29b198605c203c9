use logsift::{count_identifiers, write_uid_report, FrequencyTable};

/// ["u1","u2","u1","u3"]: u2 and u3 are unique, u1 appears twice.
#[test]
fn unique_and_duplicate_split() {
    let table = count_identifiers(["u1", "u2", "u1", "u3"]);
    assert_eq!(table.unique().collect::<Vec<_>>(), vec!["u2", "u3"]);
    assert_eq!(table.duplicates().collect::<Vec<_>>(), vec![("u1", 2)]);
    assert_eq!(table.total(), 4);
    assert_eq!(table.distinct(), 3);
}

/// Every distinct identifier is in exactly one partition.
#[test]
fn partition_is_complete() {
    let ids = ["a", "b", "a", "c", "d", "d", "d", "e", "b", "f"];
    let table: FrequencyTable = ids.iter().collect();
    for id in ids {
        let in_unique = table.unique().any(|u| u == id);
        let in_dup = table.duplicates().any(|(d, _)| d == id);
        assert!(in_unique ^ in_dup, "{id} must be in exactly one partition");
    }
    assert_eq!(table.unique_count() + table.duplicate_count(), table.distinct());
    assert_eq!(table.count("d"), 3);
    assert_eq!(table.count("zzz"), 0);
}

/// Whitespace is trimmed and blank entries are not counted.
#[test]
fn blanks_are_skipped() {
    let mut table = FrequencyTable::new();
    assert!(table.push(" u1 "));
    assert!(!table.push("   "));
    assert!(!table.push(""));
    assert!(table.push("u1\r"));
    assert_eq!(table.total(), 2);
    assert_eq!(table.count("u1"), 2);
}

/// Examples come in first-seen order, capped at the limit.
#[test]
fn duplicate_examples_limit() {
    let table = count_identifiers(["x", "y", "x", "z", "y", "z", "z", "w"]);
    assert_eq!(
        table.duplicate_examples(2),
        vec![("x".to_string(), 2), ("y".to_string(), 2)]
    );
    assert_eq!(table.duplicate_examples(10).len(), 3);
    assert!(table.duplicate_examples(0).is_empty());
}

#[test]
fn report_lists_totals_and_examples() {
    let table = count_identifiers(["u1", "u2", "u1", "u3"]);
    let mut buf = Vec::new();
    write_uid_report(&mut buf, &table, 10).unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.starts_with("UID dedup report\n"));
    assert!(text.contains("Generated: "));
    assert!(text.contains("Identifiers read: 4\n"));
    assert!(text.contains("Distinct UIDs: 3\n"));
    assert!(text.contains("Unique UIDs: 2\n"));
    assert!(text.contains("Duplicate UIDs: 1\n"));
    assert!(text.contains("UID: u1, occurrences: 2\n"));
}

/// No duplicates, no example section.
#[test]
fn report_without_duplicates() {
    let table = count_identifiers(["a", "b"]);
    let mut buf = Vec::new();
    write_uid_report(&mut buf, &table, 10).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("Duplicate UIDs: 0\n"));
    assert!(!text.contains("examples"));
}
