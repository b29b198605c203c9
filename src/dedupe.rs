use crate::sql_key::canonicalize_sql;
use ahash::AHashSet;
use std::convert::Infallible;

/// Run-scoped SQL dedupe state.
///
/// Holds the canonical keys seen so far in one job. Create one per job; it is not meant to be
/// shared between unrelated runs. Emission order is whatever order callers feed statements in,
/// so filtering is stable (first occurrence wins).
#[derive(Debug, Default)]
pub struct SqlDeduplicator {
    seen: AHashSet<String>,
    kept: u64,
    dropped: u64,
}

impl SqlDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self { seen: AHashSet::with_capacity(n), ..Self::default() }
    }

    /// Whether `key` (a canonical key string) was already recorded.
    pub fn seen(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// Record `key`; returns `true` if it was new.
    pub fn mark_seen(&mut self, key: impl Into<String>) -> bool {
        self.seen.insert(key.into())
    }

    /// Canonicalize `statement`, record its key, and report whether it is the first of its shape.
    pub fn is_new_and_mark(&mut self, statement: &str) -> bool {
        match self.keep_with(statement, |_| Ok::<(), Infallible>(())) {
            Ok(kept) => kept,
            Err(never) => match never {},
        }
    }

    /// Like [`Self::is_new_and_mark`], but hands a first-of-shape statement to `emit` before
    /// recording it. If `emit` fails the key stays unseen and nothing is counted.
    pub fn keep_with<E>(&mut self, statement: &str, emit: impl FnOnce(&str) -> Result<(), E>) -> Result<bool, E> {
        let key = canonicalize_sql(statement).to_string();
        if self.seen.contains(&key) {
            self.dropped += 1;
            return Ok(false);
        }
        emit(statement)?;
        self.seen.insert(key);
        self.kept += 1;
        Ok(true)
    }

    /// Keep the first statement of every shape, in input order.
    pub fn filter_unique<I, S>(&mut self, statements: I) -> Vec<S>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        statements
            .into_iter()
            .filter(|s| self.is_new_and_mark(s.as_ref()))
            .collect()
    }

    /// Number of distinct shapes recorded.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn kept(&self) -> u64 {
        self.kept
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Forget everything, ready for an unrelated run.
    pub fn reset(&mut self) {
        self.seen.clear();
        self.kept = 0;
        self.dropped = 0;
    }
}

/// One-shot helper: dedupe a whole sequence with a fresh state.
pub fn filter_unique_sql<I, S>(statements: I) -> Vec<S>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    SqlDeduplicator::new().filter_unique(statements)
}
