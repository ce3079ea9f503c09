use contracts::kpi::KpiKey;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::normalize::{KpiCell, KpiRowMap};

/// One fetched column of a matrix: a group key (e.g. a megabrand code) and
/// its normalized rows keyed by the row dimension value.
#[derive(Debug, Clone)]
pub struct GroupColumn {
    pub key: String,
    pub rows: KpiRowMap,
}

/// One reconciled matrix row: a cell per group column plus the trailing
/// total cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledRow {
    pub key: String,
    pub cells: Vec<KpiCell>,
    pub total: KpiCell,
}

/// Merge per-group fetches into one consistent row set.
///
/// Row keys are the union across all group columns; a key missing from a
/// column gets a zero cell there rather than dropping the row. For additive
/// metrics the total cell is the local sum of the visible cells, so the
/// displayed total always equals the column sum. For non-additive metrics
/// (shares, averages) the total comes from the independently fetched `total`
/// map, falling back to zero when it is absent or lacks the key.
///
/// Rows are ordered by total current value descending, ties by key ascending,
/// so the output is deterministic for identical inputs.
pub fn reconcile(
    kpi: KpiKey,
    groups: &[GroupColumn],
    total: Option<&KpiRowMap>,
) -> Vec<ReconciledRow> {
    let mut keys: BTreeSet<&str> = BTreeSet::new();
    for group in groups {
        keys.extend(group.rows.keys().map(String::as_str));
    }

    let mut out: Vec<ReconciledRow> = keys
        .into_iter()
        .map(|key| {
            let cells: Vec<KpiCell> = groups
                .iter()
                .map(|g| g.rows.get(key).copied().unwrap_or_default())
                .collect();

            let total_cell = if kpi.is_additive() {
                cells.iter().fold(KpiCell::default(), |acc, c| KpiCell {
                    current: acc.current + c.current,
                    prior: acc.prior + c.prior,
                })
            } else {
                total
                    .and_then(|t| t.get(key))
                    .copied()
                    .unwrap_or_default()
            };

            ReconciledRow {
                key: key.to_string(),
                cells,
                total: total_cell,
            }
        })
        .collect();

    out.sort_by(|a, b| {
        b.total
            .current
            .partial_cmp(&a.total.current)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
    out
}

/// Grand total over a set of sibling cells (e.g. the national row under the
/// per-region rows), following the same policy as `reconcile`: additive
/// metrics sum the visible cells, non-additive metrics use the independently
/// fetched total, zero when it is missing.
pub fn grand_total(
    kpi: KpiKey,
    cells: impl IntoIterator<Item = KpiCell>,
    fetched: Option<KpiCell>,
) -> KpiCell {
    if kpi.is_additive() {
        cells.into_iter().fold(KpiCell::default(), |acc, c| KpiCell {
            current: acc.current + c.current,
            prior: acc.prior + c.prior,
        })
    } else {
        fetched.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cell(current: f64) -> KpiCell {
        KpiCell {
            current,
            prior: 0.0,
        }
    }

    fn column(key: &str, rows: &[(&str, f64)]) -> GroupColumn {
        GroupColumn {
            key: key.to_string(),
            rows: rows
                .iter()
                .map(|(k, v)| (k.to_string(), cell(*v)))
                .collect(),
        }
    }

    fn currents(row: &ReconciledRow) -> Vec<f64> {
        let mut v: Vec<f64> = row.cells.iter().map(|c| c.current).collect();
        v.push(row.total.current);
        v
    }

    #[test]
    fn test_additive_total_is_column_sum() {
        let groups = vec![column("A", &[("x", 5.0)]), column("B", &[("x", 7.0)])];
        let rows = reconcile(KpiKey::Volume, &groups, None);
        assert_eq!(rows.len(), 1);
        assert_eq!(currents(&rows[0]), vec![5.0, 7.0, 12.0]);
    }

    #[test]
    fn test_additive_ignores_supplied_total() {
        // Even when the service provides a total, the additive total must be
        // the visible column sum: the columns must add up on screen.
        let groups = vec![column("A", &[("x", 5.0)]), column("B", &[("x", 7.0)])];
        let total: KpiRowMap = HashMap::from([("x".to_string(), cell(99.0))]);
        let rows = reconcile(KpiKey::Volume, &groups, Some(&total));
        assert_eq!(rows[0].total.current, 12.0);
    }

    #[test]
    fn test_non_additive_total_from_fetch() {
        let groups = vec![column("A", &[("x", 5.0)]), column("B", &[("x", 7.0)])];
        let total: KpiRowMap = HashMap::from([("x".to_string(), cell(6.0))]);
        let rows = reconcile(KpiKey::Share, &groups, Some(&total));
        // Blended share, not 12.
        assert_eq!(currents(&rows[0]), vec![5.0, 7.0, 6.0]);
    }

    #[test]
    fn test_non_additive_missing_total_is_zero() {
        let groups = vec![column("A", &[("x", 5.0)])];
        let rows = reconcile(KpiKey::Avd, &groups, None);
        assert_eq!(rows[0].total.current, 0.0);

        let total: KpiRowMap = HashMap::from([("y".to_string(), cell(3.0))]);
        let rows = reconcile(KpiKey::Avd, &groups, Some(&total));
        assert_eq!(rows[0].total.current, 0.0);
    }

    #[test]
    fn test_union_of_keys_zero_fills() {
        let groups = vec![
            column("A", &[("x", 5.0), ("y", 2.0)]),
            column("B", &[("z", 7.0)]),
        ];
        let rows = reconcile(KpiKey::Volume, &groups, None);
        // Disjoint keys: row count is the union size.
        assert_eq!(rows.len(), 3);
        let by_key: HashMap<&str, &ReconciledRow> =
            rows.iter().map(|r| (r.key.as_str(), r)).collect();
        assert_eq!(currents(by_key["x"]), vec![5.0, 0.0, 5.0]);
        assert_eq!(currents(by_key["y"]), vec![2.0, 0.0, 2.0]);
        assert_eq!(currents(by_key["z"]), vec![0.0, 7.0, 7.0]);
    }

    #[test]
    fn test_ordering_desc_total_then_key() {
        let groups = vec![column(
            "A",
            &[("b", 5.0), ("a", 5.0), ("c", 9.0), ("d", 1.0)],
        )];
        let rows = reconcile(KpiKey::Volume, &groups, None);
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_additive_sum_tolerance() {
        let groups = vec![
            column("A", &[("x", 0.1), ("y", 1e9)]),
            column("B", &[("x", 0.2), ("y", 3.0)]),
            column("C", &[("x", 0.3), ("y", 0.0)]),
        ];
        for row in reconcile(KpiKey::Pods, &groups, None) {
            let sum: f64 = row.cells.iter().map(|c| c.current).sum();
            assert!((row.total.current - sum).abs() < 1e-6);
        }
    }

    #[test]
    fn test_grand_total_policy() {
        let cells = vec![cell(5.0), cell(7.0)];
        let total = grand_total(KpiKey::Volume, cells.clone(), Some(cell(99.0)));
        assert_eq!(total.current, 12.0);

        let total = grand_total(KpiKey::Share, cells.clone(), Some(cell(23.4)));
        assert_eq!(total.current, 23.4);

        let total = grand_total(KpiKey::Share, cells, None);
        assert_eq!(total.current, 0.0);
    }

    #[test]
    fn test_prior_values_reconciled_alongside() {
        let mut groups = vec![column("A", &[("x", 5.0)]), column("B", &[("x", 7.0)])];
        groups[0].rows.get_mut("x").unwrap().prior = 4.0;
        groups[1].rows.get_mut("x").unwrap().prior = 6.0;
        let rows = reconcile(KpiKey::Volume, &groups, None);
        assert_eq!(rows[0].total.prior, 10.0);
    }
}
