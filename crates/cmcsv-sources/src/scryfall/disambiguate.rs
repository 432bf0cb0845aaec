//! Narrowing an exact-name search result down to the printing that was sold.

use cmcsv_core::{CatalogCard, CatalogMatch, RawLineItem};

/// Picks the printing that matches `item` out of `candidates`.
///
/// Filters are applied in order: finish, then language, then set hint. A
/// filter is skipped when the item carries no value for it, or when applying
/// it would leave nothing; a contradicting signal on the page is less
/// trustworthy than the catalog. What remains is classified by
/// [`CatalogMatch::from_candidates`], preserving the search's relevance order.
#[must_use]
pub fn disambiguate(item: &RawLineItem, candidates: Vec<CatalogCard>) -> CatalogMatch {
    let mut remaining = candidates;

    remaining = narrow(remaining, |card| card.has_finish(item.finish));

    if let Some(language) = item.language.as_deref() {
        remaining = narrow(remaining, |card| card.lang.eq_ignore_ascii_case(language));
    }

    if let Some(hint) = item.set_hint.as_deref() {
        remaining = narrow(remaining, |card| card.matches_set(hint));
    }

    CatalogMatch::from_candidates(remaining)
}

/// Keeps the candidates satisfying `keep`, unless none do.
fn narrow<F>(candidates: Vec<CatalogCard>, keep: F) -> Vec<CatalogCard>
where
    F: Fn(&CatalogCard) -> bool,
{
    if candidates.iter().any(&keep) {
        candidates.into_iter().filter(|card| keep(card)).collect()
    } else {
        candidates
    }
}
