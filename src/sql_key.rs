//! Coarse SQL shape key used to dedupe statements pulled out of logs.
//!
//! A key is `table|fields|whereFields`: the table after `from`, the raw projection text, and
//! the sorted set of column names referenced in the WHERE clause. Literal values drop out, so
//! two statements that only differ in their parameters share a key. There is no AST here;
//! subqueries, joins and unusual operator spacing are not handled.

use std::collections::BTreeSet;
use std::fmt;

/// Comparison operators turned into split points, applied in this order.
const WHERE_OPERATORS: [&str; 13] = [
    "=", "!=", "<>", ">", "<", ">=", "<=", "like", "in", "not in", "is", "is not", "between",
];

const WHERE_CONNECTIVES: [&str; 2] = ["and", "or"];

/// Clauses that terminate the WHERE condition.
const WHERE_TERMINATORS: [&str; 3] = [" order by ", " group by ", " limit "];

const SPLIT: &str = "|";

/// Characters that mark a WHERE token as a literal or a fragment, not a column.
const NON_IDENT_CHARS: &[char] = &['(', ')', '[', ']', '{', '}', '\'', '"', '`'];

/// Dedup fingerprint of one statement.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SqlKey {
    pub table: String,
    pub fields: String,
    pub where_fields: String,
}

impl fmt::Display for SqlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.table, self.fields, self.where_fields)
    }
}

/// Compute the dedup key of a statement (already unescaped).
pub fn canonicalize_sql(sql: &str) -> SqlKey {
    let sql = sql.trim().to_lowercase();
    SqlKey {
        table: extract_table_name(&sql),
        fields: extract_fields(&sql),
        where_fields: extract_where_condition(&sql),
    }
}

/// Convenience for callers that only want the string form.
pub fn sql_key_string(sql: &str) -> String {
    canonicalize_sql(sql).to_string()
}

#[inline]
fn select_from_index(sql: &str) -> Option<usize> {
    if !sql.starts_with("select") {
        return None;
    }
    sql.find(" from ")
}

/// Table token after the first ` from ` of a SELECT. Expects lowercased input.
pub fn extract_table_name(sql: &str) -> String {
    let Some(from) = select_from_index(sql) else { return String::new() };
    let after = sql[from + " from ".len()..].trim();
    match after.find(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r')) {
        Some(end) => after[..end].trim().to_string(),
        None => after.to_string(),
    }
}

/// Raw projection text of a SELECT with `distinct` removed. Expects lowercased input.
pub fn extract_fields(sql: &str) -> String {
    let Some(from) = select_from_index(sql) else { return String::new() };
    let Some(projection) = sql.get("select".len()..from) else { return String::new() };
    projection.trim().replace("distinct", "").trim().to_string()
}

/// Column names of the WHERE clause, sorted and comma-joined. Expects lowercased input.
pub fn extract_where_condition(sql: &str) -> String {
    let Some(at) = sql.find(" where ") else { return String::new() };
    let after = sql[at + " where ".len()..].trim();

    let end = WHERE_TERMINATORS
        .iter()
        .filter_map(|t| after.find(t))
        .filter(|&i| i > 0)
        .min()
        .unwrap_or(after.len());

    extract_field_names(after[..end].trim())
}

/// Split a WHERE clause on operators and connectives and keep the identifier-shaped tokens.
pub fn extract_field_names(where_clause: &str) -> String {
    let mut clause = where_clause.to_lowercase();
    for op in WHERE_OPERATORS.iter().chain(WHERE_CONNECTIVES.iter()) {
        clause = clause.replace(&format!(" {op} "), SPLIT);
    }

    let names: BTreeSet<String> = clause
        .split(SPLIT)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(extract_field_name)
        .collect();

    names.into_iter().collect::<Vec<_>>().join(",")
}

/// Bare column name of one condition fragment, or `None` for literals and fragments.
pub fn extract_field_name(condition: &str) -> Option<String> {
    let mut name = condition
        .trim_matches(|c: char| c == '(' || c == ')')
        .trim_matches(|c: char| c == '\'' || c == '"');

    if let Some((_, last)) = name.rsplit_once('.') {
        name = last;
    }

    if name.is_empty()
        || name.contains(|c: char| c.is_ascii_digit())
        || name.contains(NON_IDENT_CHARS)
    {
        return None;
    }

    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}
