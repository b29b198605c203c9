//! Human-readable UID dedup report.

use crate::counting::FrequencyTable;
use std::io::{self, Write};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Write the summary: totals, then up to `example_limit` duplicated identifiers with counts.
pub fn write_uid_report<W: Write>(w: &mut W, table: &FrequencyTable, example_limit: usize) -> io::Result<()> {
    let generated = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    writeln!(w, "UID dedup report")?;
    writeln!(w, "================")?;
    writeln!(w)?;
    writeln!(w, "Generated: {generated}")?;
    writeln!(w, "Identifiers read: {}", table.total())?;
    writeln!(w, "Distinct UIDs: {}", table.distinct())?;
    writeln!(w, "Unique UIDs: {}", table.unique_count())?;
    writeln!(w, "Duplicate UIDs: {}", table.duplicate_count())?;

    let examples = table.duplicate_examples(example_limit);
    if !examples.is_empty() {
        writeln!(w)?;
        writeln!(w, "Duplicate UID examples (first {example_limit}):")?;
        for (uid, n) in examples {
            writeln!(w, "UID: {uid}, occurrences: {n}")?;
        }
    }
    Ok(())
}
