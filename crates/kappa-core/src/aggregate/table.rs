//! Agreement tables and their two-phase construction.
//!
//! [`TableBuilder`] only accumulates "present" counts and exposes nothing to
//! read; [`TableBuilder::finalize`] back-fills the "absent" counts and hands
//! out immutable [`AgreementTable`]s.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::{ItemKey, PaperKey};

/// Counts for one item of one paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementRow {
    pub item: ItemKey,
    /// Raters who listed the item.
    pub y: usize,
    /// Raters who did not.
    pub n: usize,
}

/// Finalized per-paper table, rows sorted by item key.
///
/// # Invariants
///
/// Every row has `y >= 1` and `y + n == raters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementTable {
    paper: PaperKey,
    raters: usize,
    rows: Vec<AgreementRow>,
}

impl AgreementTable {
    pub fn paper(&self) -> &PaperKey {
        &self.paper
    }

    /// Available submissions every row is measured against.
    pub fn raters(&self) -> usize {
        self.raters
    }

    pub fn rows(&self) -> &[AgreementRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, item: &ItemKey) -> Option<&AgreementRow> {
        self.rows
            .binary_search_by(|row| row.item.cmp(item))
            .ok()
            .map(|idx| &self.rows[idx])
    }

    pub fn total_present(&self) -> usize {
        self.rows.iter().map(|r| r.y).sum()
    }

    pub fn total_absent(&self) -> usize {
        self.rows.iter().map(|r| r.n).sum()
    }

    /// Render as aligned text, one item per line.
    pub fn render(&self) -> String {
        let width = self
            .rows
            .iter()
            .map(|r| r.item.as_str().len())
            .max()
            .unwrap_or(0)
            .max(4);
        let mut out = format!("{}\n{:<width$}  y  n\n", self.paper, "item");
        for row in &self.rows {
            out.push_str(&format!(
                "{:<width$} {:>2} {:>2}\n",
                row.item.as_str(),
                row.y,
                row.n
            ));
        }
        out
    }
}

/// Task-local accumulator of present counts.
///
/// Folding is commutative: the result does not depend on the order raters
/// are folded in.
#[derive(Debug, Default)]
pub(crate) struct TableBuilder {
    tallies: BTreeMap<PaperKey, BTreeMap<ItemKey, usize>>,
}

impl TableBuilder {
    /// Fold one accepted rater's per-paper item sets into the tally.
    pub(crate) fn fold_in(mut self, papers: &BTreeMap<PaperKey, BTreeSet<ItemKey>>) -> Self {
        for (paper, items) in papers {
            let tally = self.tallies.entry(paper.clone()).or_default();
            for item in items {
                *tally.entry(item.clone()).or_insert(0) += 1;
            }
        }
        self
    }

    /// Close the tally: `n = available - y` for every row.
    pub(crate) fn finalize(self, available: usize) -> BTreeMap<PaperKey, AgreementTable> {
        self.tallies
            .into_iter()
            .map(|(paper, tally)| {
                let rows = tally
                    .into_iter()
                    .map(|(item, y)| AgreementRow {
                        item,
                        y,
                        n: available.saturating_sub(y),
                    })
                    .collect();
                let table = AgreementTable {
                    paper: paper.clone(),
                    raters: available,
                    rows,
                };
                (paper, table)
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn table_from_counts(paper: &str, raters: usize, ys: &[(&str, usize)]) -> AgreementTable {
    let mut rows: Vec<AgreementRow> = ys
        .iter()
        .map(|(item, y)| AgreementRow {
            item: ItemKey::new((*item).to_string()),
            y: *y,
            n: raters - *y,
        })
        .collect();
    rows.sort_by(|a, b| a.item.cmp(&b.item));
    AgreementTable {
        paper: PaperKey::new(paper.to_string()),
        raters,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(keys: &[&str]) -> BTreeSet<ItemKey> {
        keys.iter().map(|k| ItemKey::new((*k).to_string())).collect()
    }

    fn paper(doi: &str) -> PaperKey {
        PaperKey::new(format!("https://doi.org/{doi}"))
    }

    #[test]
    fn finalize_backfills_absent_counts() {
        let a = BTreeMap::from([(paper("10.1/x"), items(&["[1]", "[2]", "[3]"]))]);
        let b = BTreeMap::from([(paper("10.1/x"), items(&["[1]", "[2]"]))]);

        let tables = TableBuilder::default().fold_in(&a).fold_in(&b).finalize(2);
        let table = &tables[&paper("10.1/x")];

        assert_eq!(table.raters(), 2);
        let counts: Vec<(&str, usize, usize)> = table
            .rows()
            .iter()
            .map(|r| (r.item.as_str(), r.y, r.n))
            .collect();
        assert_eq!(counts, vec![("[1]", 2, 0), ("[2]", 2, 0), ("[3]", 1, 1)]);
    }

    #[test]
    fn fold_order_does_not_matter() {
        let a = BTreeMap::from([(paper("10.1/x"), items(&["[1]", "[5]"]))]);
        let b = BTreeMap::from([
            (paper("10.1/x"), items(&["[5]"])),
            (paper("10.2/y"), items(&["[9]"])),
        ]);

        let ab = TableBuilder::default().fold_in(&a).fold_in(&b).finalize(2);
        let ba = TableBuilder::default().fold_in(&b).fold_in(&a).finalize(2);
        assert_eq!(ab, ba);
    }

    #[test]
    fn paper_without_items_yields_empty_table() {
        let a = BTreeMap::from([(paper("10.1/x"), BTreeSet::new())]);
        let tables = TableBuilder::default().fold_in(&a).finalize(1);
        assert!(tables[&paper("10.1/x")].is_empty());
    }

    #[test]
    fn lookup_and_totals() {
        let table = table_from_counts("p", 3, &[("[2]", 3), ("[1]", 1)]);
        assert_eq!(table.rows()[0].item.as_str(), "[1]");
        assert_eq!(table.get(&ItemKey::new("[2]".into())).unwrap().y, 3);
        assert!(table.get(&ItemKey::new("[7]".into())).is_none());
        assert_eq!(table.total_present(), 4);
        assert_eq!(table.total_absent(), 2);
    }

    #[test]
    fn render_lists_rows() {
        let table = table_from_counts("https://doi.org/10.1/x", 2, &[("[1]", 2)]);
        let text = table.render();
        assert!(text.starts_with("https://doi.org/10.1/x\n"));
        assert!(text.contains("[1]   2  0"));
    }
}
