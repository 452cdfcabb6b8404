use super::domain::{CompositeInsight, Tier};
use serde::Serialize;
use std::collections::BTreeSet;

/// Sentinel accepted in tier selections meaning "do not filter".
pub const ALL_TIERS: &str = "all";

/// Which composite tiers the user asked to see.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TierSelection {
    #[default]
    All,
    Only(BTreeSet<Tier>),
}

impl TierSelection {
    /// Build from user-supplied names. Empty input or the `all` sentinel selects
    /// everything; unrecognised names are returned as an error.
    pub fn from_names<I, S>(names: I) -> Result<Self, UnknownTier>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tiers = BTreeSet::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if name.eq_ignore_ascii_case(ALL_TIERS) {
                return Ok(Self::All);
            }
            let tier = Tier::from_name(name).ok_or_else(|| UnknownTier(name.to_string()))?;
            tiers.insert(tier);
        }

        if tiers.is_empty() {
            Ok(Self::All)
        } else {
            Ok(Self::Only(tiers))
        }
    }

    pub fn matches(&self, tier: Option<Tier>) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => tier.is_some_and(|tier| selected.contains(&tier)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tier '{0}', expected low, medium, high or all")]
pub struct UnknownTier(pub String);

/// Keep insights whose tier is selected. Untiered insights only survive `All`.
pub fn filter_by_tier(
    insights: Vec<CompositeInsight>,
    selection: &TierSelection,
) -> Vec<CompositeInsight> {
    match selection {
        TierSelection::All => insights,
        TierSelection::Only(_) => insights
            .into_iter()
            .filter(|insight| selection.matches(insight.tier))
            .collect(),
    }
}

/// Descending by SAM. `sort_by` is stable, so equal SAM keeps input order.
pub fn sort_by_sam(insights: &mut [CompositeInsight]) {
    insights.sort_by(|left, right| right.sam.cmp(&left.sam));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("page numbers start at 1")]
    ZeroPage,
    #[error("page size must be at least 1")]
    ZeroPageSize,
}

/// One page of a ranked result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn empty(per_page: usize) -> Self {
        Self {
            page: 1,
            per_page,
            total_items: 0,
            total_pages: 0,
            items: Vec::new(),
        }
    }
}

/// Slice `[(page-1)*per_page, page*per_page)`. Pages past the end are empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Result<Page<T>, PageError> {
    if page == 0 {
        return Err(PageError::ZeroPage);
    }
    if per_page == 0 {
        return Err(PageError::ZeroPageSize);
    }

    let total_items = items.len();
    let start = (page - 1).saturating_mul(per_page).min(total_items);
    let end = page.saturating_mul(per_page).min(total_items);

    Ok(Page {
        page,
        per_page,
        total_items,
        total_pages: total_items.div_ceil(per_page),
        items: items[start..end].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::domain::Urbanicity;

    fn insight(zip: &str, sam: u64, tier: Option<Tier>) -> CompositeInsight {
        CompositeInsight {
            zip: zip.to_string(),
            city: "Austin".to_string(),
            state: "Texas".to_string(),
            population: 1_000,
            urbanicity: Urbanicity::Urban,
            competitor_count: None,
            latitude: None,
            longitude: None,
            divorce_score: 0.0,
            income_score: 0.0,
            composite_score: 0.0,
            tier,
            households: 400,
            tam: 40_000,
            sam,
        }
    }

    fn zips(items: &[CompositeInsight]) -> Vec<&str> {
        items.iter().map(|insight| insight.zip.as_str()).collect()
    }

    #[test]
    fn all_sentinel_returns_input_unchanged() {
        let input = vec![
            insight("a", 1, Some(Tier::Low)),
            insight("b", 9, None),
            insight("c", 3, Some(Tier::High)),
        ];
        let selection = TierSelection::from_names(["all"]).expect("valid");
        assert_eq!(selection, TierSelection::All);
        assert_eq!(filter_by_tier(input.clone(), &selection), input);

        let empty = TierSelection::from_names(Vec::<String>::new()).expect("valid");
        assert_eq!(filter_by_tier(input.clone(), &empty), input);
    }

    #[test]
    fn selected_tiers_exclude_untiered_scores() {
        let input = vec![
            insight("a", 1, Some(Tier::Low)),
            insight("b", 9, None),
            insight("c", 3, Some(Tier::High)),
            insight("d", 3, Some(Tier::Medium)),
        ];
        let selection = TierSelection::from_names(["high", "Medium"]).expect("valid");
        assert_eq!(zips(&filter_by_tier(input, &selection)), vec!["c", "d"]);
    }

    #[test]
    fn unknown_tier_names_are_rejected() {
        let error = TierSelection::from_names(["low", "premium"]).expect_err("unknown tier");
        assert_eq!(error, UnknownTier("premium".to_string()));
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let mut items = vec![
            insight("first-tie", 10, None),
            insight("small", 1, None),
            insight("big", 50, None),
            insight("second-tie", 10, None),
        ];
        sort_by_sam(&mut items);
        assert_eq!(zips(&items), vec!["big", "first-tie", "second-tie", "small"]);
    }

    #[test]
    fn pagination_slices_the_requested_window() {
        let items: Vec<usize> = (0..20).collect();

        let third = paginate(&items, 3, 7).expect("valid page");
        assert_eq!(third.items, vec![14, 15, 16, 17, 18, 19]);
        assert_eq!(third.total_items, 20);
        assert_eq!(third.total_pages, 3);

        let fourth = paginate(&items, 4, 7).expect("valid page");
        assert!(fourth.items.is_empty());
        assert_eq!(fourth.page, 4);
    }

    #[test]
    fn pagination_rejects_zero_page_or_size() {
        let items = [1, 2, 3];
        assert_eq!(paginate(&items, 0, 7), Err(PageError::ZeroPage));
        assert_eq!(paginate(&items, 1, 0), Err(PageError::ZeroPageSize));
    }
}
