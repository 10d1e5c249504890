//! Snapshot read model and its filter/sort evaluator.
//!
//! The snapshot is a caller-owned copy of stock levels. It is never updated
//! behind the caller's back: ledger mutations only become visible after the
//! caller refreshes it from the store.

use serde::{Deserialize, Serialize};

use crate::stock::StockLevel;

/// Ordered, independently maintained copy of stock levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockSnapshot {
    entries: Vec<StockLevel>,
}

impl StockSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_levels(entries: Vec<StockLevel>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, level: StockLevel) {
        self.entries.push(level);
    }

    /// Replace the whole content, keeping the caller's handle.
    pub fn replace(&mut self, entries: Vec<StockLevel>) {
        self.entries = entries;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[StockLevel] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<StockLevel> for StockSnapshot {
    fn extend<T: IntoIterator<Item = StockLevel>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

impl FromIterator<StockLevel> for StockSnapshot {
    fn from_iter<T: IntoIterator<Item = StockLevel>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Sort order for query results.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Color,
    Cotton,
}

impl SortKey {
    /// Case-insensitive; anything other than `color`/`cotton` means "keep snapshot order".
    pub fn parse(raw: &str) -> Option<SortKey> {
        if raw.eq_ignore_ascii_case("color") {
            Some(SortKey::Color)
        } else if raw.eq_ignore_ascii_case("cotton") {
            Some(SortKey::Cotton)
        } else {
            None
        }
    }
}

/// Filter/sort parameters. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockQuery {
    pub color: Option<String>,
    pub min_cotton: Option<i32>,
    pub max_cotton: Option<i32>,
    pub sort_by: Option<SortKey>,
}

impl StockQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn min_cotton(mut self, min: i32) -> Self {
        self.min_cotton = Some(min);
        self
    }

    pub fn max_cotton(mut self, max: i32) -> Self {
        self.max_cotton = Some(max);
        self
    }

    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.sort_by = Some(key);
        self
    }

    /// Set the sort key from raw caller input (see [`SortKey::parse`]).
    pub fn sort_by_raw(mut self, raw: &str) -> Self {
        self.sort_by = SortKey::parse(raw);
        self
    }

    /// Trimmed color filter, or `None` when absent/blank.
    fn effective_color(&self) -> Option<&str> {
        self.color
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Case-insensitive equality folded one character at a time.
///
/// Characters match when equal, when their uppercase forms are equal, or when
/// the lowercase forms of those uppercase forms are equal. Only single-char
/// mappings are used, so `ß` does not expand and a final `ς` still matches `Σ`.
fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars().count() == b.chars().count()
        && a.chars().zip(b.chars()).all(|(x, y)| {
            if x == y {
                return true;
            }
            let (ux, uy) = (simple_upper(x), simple_upper(y));
            ux == uy || simple_lower(ux) == simple_lower(uy)
        })
}

fn simple_upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

// The only multi-char lowercase mapping is `İ` → `i̇`, whose single-char form is `i`.
fn simple_lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Filter then sort a snapshot.
///
/// Stages run in a fixed order (color, min cotton, max cotton), each on the
/// previous stage's output, so filters combine conjunctively. Sorting is stable.
pub fn filter_and_sort(snapshot: &StockSnapshot, query: &StockQuery) -> Vec<StockLevel> {
    tracing::debug!(?query, snapshot_len = snapshot.len(), "filtering stock snapshot");

    if snapshot.is_empty() {
        tracing::warn!("stock snapshot is empty");
        return Vec::new();
    }

    let mut filtered: Vec<StockLevel> = snapshot.entries().to_vec();

    if let Some(color) = query.effective_color() {
        filtered.retain(|level| eq_ignore_case(&level.color, color));
        tracing::debug!(remaining = filtered.len(), "after color filter");
    }

    if let Some(min) = query.min_cotton {
        filtered.retain(|level| level.cotton_percent >= min);
        tracing::debug!(remaining = filtered.len(), "after min cotton filter");
    }

    if let Some(max) = query.max_cotton {
        filtered.retain(|level| level.cotton_percent <= max);
        tracing::debug!(remaining = filtered.len(), "after max cotton filter");
    }

    match query.sort_by {
        Some(SortKey::Color) => filtered.sort_by(|a, b| a.color.cmp(&b.color)),
        Some(SortKey::Cotton) => filtered.sort_by_key(|level| level.cotton_percent),
        None => {}
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fixture() -> StockSnapshot {
        StockSnapshot::from_levels(vec![
            StockLevel::new("Red", 40, 100),
            StockLevel::new("Blue", 70, 10),
            StockLevel::new("Red", 30, 150),
            StockLevel::new("Green", 60, 50),
        ])
    }

    fn cottons(levels: &[StockLevel]) -> Vec<i32> {
        levels.iter().map(|l| l.cotton_percent).collect()
    }

    #[test]
    fn empty_snapshot_yields_empty_result() {
        let query = StockQuery::new()
            .color("Red")
            .min_cotton(0)
            .max_cotton(100)
            .sort_by(SortKey::Cotton);
        assert!(filter_and_sort(&StockSnapshot::new(), &query).is_empty());
    }

    #[test]
    fn color_filter_keeps_original_order() {
        let result = filter_and_sort(&fixture(), &StockQuery::new().color("Red"));
        assert_eq!(
            result,
            vec![StockLevel::new("Red", 40, 100), StockLevel::new("Red", 30, 150)]
        );
    }

    #[test]
    fn color_filter_ignores_case_and_surrounding_whitespace() {
        let result = filter_and_sort(&fixture(), &StockQuery::new().color("  rED "));
        assert_eq!(cottons(&result), vec![40, 30]);
    }

    #[test]
    fn color_filter_folds_case_per_character() {
        let snapshot = StockSnapshot::from_levels(vec![
            StockLevel::new("ΟΔΟΣ", 40, 1),
            StockLevel::new("İris", 50, 2),
            StockLevel::new("Straße", 60, 3),
        ]);

        let greek = filter_and_sort(&snapshot, &StockQuery::new().color("οδος"));
        assert_eq!(cottons(&greek), vec![40]);

        let dotted = filter_and_sort(&snapshot, &StockQuery::new().color("iris"));
        assert_eq!(cottons(&dotted), vec![50]);

        assert!(filter_and_sort(&snapshot, &StockQuery::new().color("STRASSE")).is_empty());
        let sharp = filter_and_sort(&snapshot, &StockQuery::new().color("STRAßE"));
        assert_eq!(cottons(&sharp), vec![60]);
    }

    #[test]
    fn eq_ignore_case_requires_equal_length() {
        assert!(eq_ignore_case("red", "RED"));
        assert!(!eq_ignore_case("red", "reds"));
        assert!(!eq_ignore_case("", "r"));
    }

    #[test]
    fn blank_color_disables_color_filter() {
        let result = filter_and_sort(&fixture(), &StockQuery::new().color("   "));
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn unknown_color_matches_nothing() {
        assert!(filter_and_sort(&fixture(), &StockQuery::new().color("Purple")).is_empty());
    }

    #[test]
    fn cotton_range_is_inclusive() {
        let query = StockQuery::new().min_cotton(30).max_cotton(60);
        let result = filter_and_sort(&fixture(), &query);
        assert_eq!(cottons(&result), vec![40, 30, 60]);
    }

    #[test]
    fn min_cotton_only() {
        let result = filter_and_sort(&fixture(), &StockQuery::new().min_cotton(50));
        assert_eq!(cottons(&result), vec![70, 60]);
    }

    #[test]
    fn max_cotton_only() {
        let result = filter_and_sort(&fixture(), &StockQuery::new().max_cotton(40));
        assert_eq!(cottons(&result), vec![40, 30]);
    }

    #[test]
    fn min_fifty_max_hundred() {
        let query = StockQuery::new().min_cotton(50).max_cotton(100);
        let result = filter_and_sort(&fixture(), &query);
        assert_eq!(
            result,
            vec![StockLevel::new("Blue", 70, 10), StockLevel::new("Green", 60, 50)]
        );
    }

    #[test]
    fn filters_combine() {
        let query = StockQuery::new().color("red").min_cotton(35);
        let result = filter_and_sort(&fixture(), &query);
        assert_eq!(result, vec![StockLevel::new("Red", 40, 100)]);
    }

    #[test]
    fn sort_by_cotton_ascending() {
        let result = filter_and_sort(&fixture(), &StockQuery::new().sort_by_raw("COTTON"));
        assert_eq!(cottons(&result), vec![30, 40, 60, 70]);
    }

    #[test]
    fn sort_by_color_is_stable() {
        let result = filter_and_sort(&fixture(), &StockQuery::new().sort_by_raw("color"));
        let colors: Vec<_> = result.iter().map(|l| l.color.as_str()).collect();
        assert_eq!(colors, vec!["Blue", "Green", "Red", "Red"]);
        // Equal colors keep snapshot order.
        assert_eq!(result[2].cotton_percent, 40);
        assert_eq!(result[3].cotton_percent, 30);
    }

    #[test]
    fn unknown_sort_key_keeps_snapshot_order() {
        let result = filter_and_sort(&fixture(), &StockQuery::new().sort_by_raw("quantity"));
        assert_eq!(cottons(&result), vec![40, 70, 30, 60]);
    }

    #[test]
    fn snapshot_is_not_modified() {
        let snapshot = fixture();
        let _ = filter_and_sort(&snapshot, &StockQuery::new().sort_by(SortKey::Cotton));
        assert_eq!(snapshot, fixture());
    }

    fn arb_level() -> impl Strategy<Value = StockLevel> {
        (
            prop::sample::select(vec!["Red", "red", "Blue", "Green"]),
            -10i32..120,
            0u32..1000,
        )
            .prop_map(|(color, cotton, quantity)| StockLevel::new(color, cotton, quantity))
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: every returned level satisfies all supplied filters, and
        /// nothing satisfying them is dropped.
        #[test]
        fn result_is_exactly_the_matching_subset(
            levels in prop::collection::vec(arb_level(), 0..30),
            min in prop::option::of(0i32..100),
            max in prop::option::of(0i32..100),
        ) {
            let snapshot = StockSnapshot::from_levels(levels.clone());
            let mut query = StockQuery::new().color("RED");
            query.min_cotton = min;
            query.max_cotton = max;

            let result = filter_and_sort(&snapshot, &query);
            let expected: Vec<StockLevel> = levels
                .into_iter()
                .filter(|l| l.color.eq_ignore_ascii_case("red"))
                .filter(|l| min.is_none_or(|m| l.cotton_percent >= m))
                .filter(|l| max.is_none_or(|m| l.cotton_percent <= m))
                .collect();
            prop_assert_eq!(result, expected);
        }

        /// Property: sorting by cotton yields a non-decreasing, same-length result.
        #[test]
        fn cotton_sort_is_ordered(levels in prop::collection::vec(arb_level(), 0..30)) {
            let snapshot = StockSnapshot::from_levels(levels.clone());
            let result = filter_and_sort(&snapshot, &StockQuery::new().sort_by(SortKey::Cotton));
            prop_assert_eq!(result.len(), levels.len());
            prop_assert!(result.windows(2).all(|w| w[0].cotton_percent <= w[1].cotton_percent));
        }
    }
}
