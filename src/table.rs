//! Table retrieval and the multi-table join engine.
//!
//! SNMP tables are read by independent, non-atomic bulk walks, so rows can
//! appear or disappear between the walks of one join. The join detects
//! misaligned snapshots (a suffix with no key, or a row with too few
//! values) and reports them so the caller can re-fetch; it never returns
//! partial rows.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use crate::oid::Oid;
use crate::value::Value;

/// Key aligning corresponding entries across independently-fetched tables:
/// either the trailing OID arcs past the column base, or the value of an
/// explicit index column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RowKey {
    Suffix(Vec<u32>),
    Index(Value),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Suffix(arcs) => write!(f, "{}", Oid::new(arcs.clone())),
            RowKey::Index(value) => write!(f, "{}", value),
        }
    }
}

/// Joined result set: one entry per row, values in requested column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableRows {
    rows: BTreeMap<RowKey, Vec<Value>>,
}

impl TableRows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &RowKey) -> Option<&[Value]> {
        self.rows.get(key).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &RowKey> {
        self.rows.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RowKey, &[Value])> {
        self.rows.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Rows keyed by column name instead of position, for callers that
    /// requested tables by name.
    pub fn into_named(self, columns: &[&str]) -> BTreeMap<RowKey, HashMap<String, Value>> {
        self.rows
            .into_iter()
            .map(|(key, values)| {
                let named = columns
                    .iter()
                    .map(|c| c.to_string())
                    .zip(values)
                    .collect::<HashMap<String, Value>>();
                (key, named)
            })
            .collect()
    }

    /// Render into a JSON object keyed by the displayed row key, for
    /// reporting pipelines.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .rows
            .iter()
            .map(|(key, values)| {
                let row = values.iter().map(Value::to_json).collect::<Vec<_>>();
                (key.to_string(), serde_json::Value::Array(row))
            })
            .collect::<serde_json::Map<String, serde_json::Value>>();
        serde_json::Value::Object(map)
    }
}

impl IntoIterator for TableRows {
    type Item = (RowKey, Vec<Value>);
    type IntoIter = std::collections::btree_map::IntoIter<RowKey, Vec<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Why one join attempt rejected its snapshot. Inspected by the retry loop
/// in the client; never surfaced to callers directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JoinFailure {
    /// A column entry's suffix matched no known row key.
    MissingKey,
    /// A row ended up with fewer values than columns requested.
    LengthMismatch,
}

impl fmt::Display for JoinFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinFailure::MissingKey => write!(f, "entry suffix matched no row key"),
            JoinFailure::LengthMismatch => write!(f, "row has fewer values than columns"),
        }
    }
}

/// One fetched table: its resolved base OID and the walked entries.
#[derive(Debug, Clone)]
pub(crate) struct FetchedTable {
    pub base: Oid,
    pub entries: Vec<(Oid, Value)>,
}

/// Keep only entries that strictly extend `base`. Agents may return
/// entries past the requested subtree boundary; agent order is preserved.
pub(crate) fn filter_subtree(base: &Oid, entries: Vec<(Oid, Value)>) -> Vec<(Oid, Value)> {
    entries
        .into_iter()
        .filter(|(oid, _)| oid.suffix_of(base).is_some())
        .collect()
}

/// Align one snapshot of fetched tables into keyed rows.
///
/// With an explicit index table, each index entry's single trailing arc maps
/// to its index value and seeds an empty row; all column tables then append.
/// Without one, the first column seeds suffix-keyed single-value rows and is
/// excluded from the column loop.
///
/// The completeness check runs only in positional mode. An explicit index
/// guarantees alignment only if the agent is self-consistent for the indexed
/// column; misaligned rows can pass through in that mode.
pub(crate) fn join_snapshot(
    index: Option<&FetchedTable>,
    columns: &[FetchedTable],
) -> Result<TableRows, JoinFailure> {
    let mut key_map: HashMap<Vec<u32>, RowKey> = HashMap::new();
    let mut rows: BTreeMap<RowKey, Vec<Value>> = BTreeMap::new();
    let mut remaining = columns;

    match index {
        Some(index_table) => {
            for (oid, index_value) in &index_table.entries {
                let Some(arc) = oid.last_arc() else { continue };
                let key = RowKey::Index(index_value.clone());
                key_map.insert(vec![arc], key.clone());
                rows.insert(key, Vec::new());
            }
        }
        None => {
            let Some((first, rest)) = columns.split_first() else {
                return Ok(TableRows::default());
            };
            for (oid, value) in &first.entries {
                let Some(suffix) = oid.suffix_of(&first.base) else {
                    return Err(JoinFailure::MissingKey);
                };
                let key = RowKey::Suffix(suffix.to_vec());
                key_map.insert(suffix.to_vec(), key.clone());
                rows.insert(key, vec![value.clone()]);
            }
            remaining = rest;
        }
    }

    for table in remaining {
        for (oid, value) in &table.entries {
            let suffix = oid.suffix_of(&table.base).ok_or(JoinFailure::MissingKey)?;
            let key = key_map.get(suffix).ok_or(JoinFailure::MissingKey)?;
            let row = rows.get_mut(key).ok_or(JoinFailure::MissingKey)?;
            row.push(value.clone());
        }
    }

    if index.is_none() {
        let requested = columns.len();
        if rows.values().any(|row| row.len() != requested) {
            return Err(JoinFailure::LengthMismatch);
        }
    }

    Ok(TableRows { rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(base: &[u32], rows: &[(&[u32], Value)]) -> FetchedTable {
        let base = Oid::from(base);
        let entries = rows
            .iter()
            .map(|(suffix, value)| (base.concat(suffix), value.clone()))
            .collect();
        FetchedTable { base, entries }
    }

    #[test]
    fn test_filter_subtree_drops_out_of_tree_entries() {
        let base = Oid::from([1, 3, 6, 1, 2]);
        let inside = base.child(1);
        let outside = Oid::from([1, 3, 6, 1, 3, 1]);
        let entries = vec![
            (base.clone(), Value::Integer(0)),
            (inside.clone(), Value::Integer(1)),
            (outside, Value::Integer(2)),
        ];
        let kept = filter_subtree(&base, entries);
        // the base itself is not a strict extension either
        assert_eq!(kept, vec![(inside, Value::Integer(1))]);
    }

    #[test]
    fn test_filter_subtree_is_structural_not_textual() {
        // 1.3.61 shares the dotted-string prefix of 1.3.6 but is unrelated
        let base = Oid::from([1, 3, 6]);
        let trap = Oid::from([1, 3, 61, 1]);
        let kept = filter_subtree(&base, vec![(trap, Value::Null)]);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_filter_subtree_preserves_order() {
        let base = Oid::from([1, 3]);
        let entries = vec![
            (base.child(9), Value::Integer(9)),
            (base.child(1), Value::Integer(1)),
            (base.child(5), Value::Integer(5)),
        ];
        let kept = filter_subtree(&base, entries.clone());
        assert_eq!(kept, entries);
    }

    #[test]
    fn test_positional_join_three_columns() {
        let columns = vec![
            table(
                &[1, 3, 6, 1, 1],
                &[
                    (&[1], Value::from("eth0")),
                    (&[2], Value::from("eth1")),
                    (&[3], Value::from("lo")),
                ],
            ),
            table(
                &[1, 3, 6, 1, 2],
                &[
                    (&[1], Value::Integer(1500)),
                    (&[2], Value::Integer(1500)),
                    (&[3], Value::Integer(65536)),
                ],
            ),
            table(
                &[1, 3, 6, 1, 3],
                &[
                    (&[1], Value::Integer(1)),
                    (&[2], Value::Integer(2)),
                    (&[3], Value::Integer(1)),
                ],
            ),
        ];

        let rows = join_snapshot(None, &columns).unwrap();
        assert_eq!(rows.len(), 3);
        for key in [&[1u32][..], &[2], &[3]] {
            let row = rows.get(&RowKey::Suffix(key.to_vec())).unwrap();
            assert_eq!(row.len(), 3);
        }
        let first = rows.get(&RowKey::Suffix(vec![1])).unwrap();
        assert_eq!(first[0], Value::from("eth0"));
        assert_eq!(first[1], Value::Integer(1500));
        assert_eq!(first[2], Value::Integer(1));
    }

    #[test]
    fn test_positional_join_short_row_is_length_mismatch() {
        let columns = vec![
            table(
                &[1, 3, 1],
                &[(&[1], Value::Integer(10)), (&[2], Value::Integer(20))],
            ),
            // row [2] disappeared between walks
            table(&[1, 3, 2], &[(&[1], Value::Integer(11))]),
            table(
                &[1, 3, 3],
                &[(&[1], Value::Integer(12)), (&[2], Value::Integer(22))],
            ),
        ];
        let err = join_snapshot(None, &columns).unwrap_err();
        assert_eq!(err, JoinFailure::LengthMismatch);
    }

    #[test]
    fn test_positional_join_new_row_is_missing_key() {
        let columns = vec![
            table(&[1, 3, 1], &[(&[1], Value::Integer(10))]),
            // row [2] appeared after the first walk
            table(
                &[1, 3, 2],
                &[(&[1], Value::Integer(11)), (&[2], Value::Integer(21))],
            ),
        ];
        let err = join_snapshot(None, &columns).unwrap_err();
        assert_eq!(err, JoinFailure::MissingKey);
    }

    #[test]
    fn test_positional_join_multi_arc_suffix() {
        // Index suffixes are not always single arcs (e.g. ipAddrTable)
        let columns = vec![
            table(
                &[1, 4, 1],
                &[
                    (&[10, 0, 0, 1], Value::Integer(1)),
                    (&[10, 0, 0, 2], Value::Integer(2)),
                ],
            ),
            table(
                &[1, 4, 2],
                &[
                    (&[10, 0, 0, 1], Value::Integer(24)),
                    (&[10, 0, 0, 2], Value::Integer(16)),
                ],
            ),
        ];
        let rows = join_snapshot(None, &columns).unwrap();
        assert_eq!(rows.len(), 2);
        let row = rows.get(&RowKey::Suffix(vec![10, 0, 0, 1])).unwrap();
        assert_eq!(row, &[Value::Integer(1), Value::Integer(24)]);
    }

    #[test]
    fn test_index_join_keys_by_index_value() {
        let index = table(
            &[1, 9, 1],
            &[(&[1], Value::from("eth0")), (&[2], Value::from("eth1"))],
        );
        let columns = vec![table(
            &[1, 9, 2],
            &[(&[1], Value::Integer(1)), (&[2], Value::Integer(2))],
        )];

        let rows = join_snapshot(Some(&index), &columns).unwrap();
        assert_eq!(rows.len(), 2);
        let row = rows.get(&RowKey::Index(Value::from("eth0"))).unwrap();
        assert_eq!(row, &[Value::Integer(1)]);
        assert!(rows.get(&RowKey::Suffix(vec![1])).is_none());
    }

    #[test]
    fn test_index_join_skips_completeness_check() {
        // Known limitation: with an explicit index the short row passes
        let index = table(
            &[1, 9, 1],
            &[(&[1], Value::from("eth0")), (&[2], Value::from("eth1"))],
        );
        let columns = vec![table(&[1, 9, 2], &[(&[1], Value::Integer(1))])];

        let rows = join_snapshot(Some(&index), &columns).unwrap();
        assert_eq!(rows.len(), 2);
        let short = rows.get(&RowKey::Index(Value::from("eth1"))).unwrap();
        assert!(short.is_empty());
    }

    #[test]
    fn test_index_join_unknown_suffix_is_missing_key() {
        let index = table(&[1, 9, 1], &[(&[1], Value::from("eth0"))]);
        let columns = vec![table(
            &[1, 9, 2],
            &[(&[1], Value::Integer(1)), (&[7], Value::Integer(7))],
        )];
        let err = join_snapshot(Some(&index), &columns).unwrap_err();
        assert_eq!(err, JoinFailure::MissingKey);
    }

    #[test]
    fn test_join_no_columns_is_empty() {
        let rows = join_snapshot(None, &[]).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_into_named() {
        let columns = vec![
            table(&[1, 1], &[(&[1], Value::from("eth0"))]),
            table(&[1, 2], &[(&[1], Value::Integer(1))]),
        ];
        let rows = join_snapshot(None, &columns).unwrap();
        let named = rows.into_named(&["ifDescr", "ifOperStatus"]);
        let row = named.get(&RowKey::Suffix(vec![1])).unwrap();
        assert_eq!(row.get("ifDescr"), Some(&Value::from("eth0")));
        assert_eq!(row.get("ifOperStatus"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_to_json() {
        let columns = vec![table(
            &[1, 1],
            &[
                (&[1], Value::from("eth0")),
                (&[2], Value::OctetString(vec![0xde, 0xad])),
            ],
        )];
        let rows = join_snapshot(None, &columns).unwrap();
        let json = rows.to_json();
        assert_eq!(json["1"][0], serde_json::json!("eth0"));
        assert_eq!(json["2"][0], serde_json::json!("0xdead"));
    }

    #[test]
    fn test_row_key_display() {
        assert_eq!(RowKey::Suffix(vec![10, 0, 0, 1]).to_string(), "10.0.0.1");
        assert_eq!(RowKey::Index(Value::from("eth0")).to_string(), "eth0");
    }
}
