//! Identifier frequency counting with a unique/duplicate partition.

use ahash::AHashMap;

/// How often each identifier occurred in one input stream.
///
/// Identifiers are remembered in first-seen order so that partitions and example picks are
/// deterministic for a given input.
#[derive(Clone, Debug, Default)]
pub struct FrequencyTable {
    counts: AHashMap<String, u64>,
    order: Vec<String>,
    total: u64,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one raw identifier. Blank input is ignored; the rest is trimmed.
    /// Returns `false` when the value was skipped.
    pub fn push(&mut self, raw: &str) -> bool {
        let id = raw.trim();
        if id.is_empty() {
            return false;
        }
        match self.counts.get_mut(id) {
            Some(n) => *n += 1,
            None => {
                self.counts.insert(id.to_string(), 1);
                self.order.push(id.to_string());
            }
        }
        self.total += 1;
        true
    }

    /// Occurrences of `id` (0 if never seen).
    pub fn count(&self, id: &str) -> u64 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// Identifiers counted, blanks excluded.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct identifiers.
    pub fn distinct(&self) -> usize {
        self.order.len()
    }

    /// Identifiers with `(id, count)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.order.iter().map(move |id| (id.as_str(), self.count(id)))
    }

    /// Identifiers that appeared exactly once.
    pub fn unique(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().filter(|&(_, n)| n == 1).map(|(id, _)| id)
    }

    /// Identifiers that appeared more than once, with their counts.
    pub fn duplicates(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.iter().filter(|&(_, n)| n > 1)
    }

    pub fn unique_count(&self) -> usize {
        self.unique().count()
    }

    pub fn duplicate_count(&self) -> usize {
        self.duplicates().count()
    }

    /// Up to `limit` duplicated identifiers, first-seen first.
    pub fn duplicate_examples(&self, limit: usize) -> Vec<(String, u64)> {
        self.duplicates()
            .take(limit)
            .map(|(id, n)| (id.to_string(), n))
            .collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for s in iter {
            table.push(s.as_ref());
        }
        table
    }
}

/// Count a whole identifier stream.
pub fn count_identifiers<I, S>(ids: I) -> FrequencyTable
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ids.into_iter().collect()
}
