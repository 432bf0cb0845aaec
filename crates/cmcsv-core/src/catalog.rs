//! Catalog records and the outcome of resolving a line item against them.

use std::fmt;

use crate::items::Finish;

/// One card printing as known to the catalog source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCard {
    /// Canonical id required by the import target.
    pub id: String,
    pub name: String,
    pub set_code: String,
    pub set_name: String,
    pub lang: String,
    /// Finishes this printing exists in.
    pub finishes: Vec<Finish>,
}

impl CatalogCard {
    #[must_use]
    pub fn has_finish(&self, finish: Finish) -> bool {
        self.finishes.contains(&finish)
    }

    /// `true` when `hint` names this card's set by code or by full name.
    #[must_use]
    pub fn matches_set(&self, hint: &str) -> bool {
        let hint = hint.trim();
        self.set_code.eq_ignore_ascii_case(hint) || self.set_name.eq_ignore_ascii_case(hint)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchConfidence {
    Exact,
    Ambiguous,
    NoMatch,
}

impl fmt::Display for MatchConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchConfidence::Exact => f.write_str("exact"),
            MatchConfidence::Ambiguous => f.write_str("ambiguous"),
            MatchConfidence::NoMatch => f.write_str("none"),
        }
    }
}

/// Result of resolving one line item.
///
/// Only constructible through [`CatalogMatch::exact`],
/// [`CatalogMatch::from_candidates`] and [`CatalogMatch::no_match`], so an
/// exact match always carries a card and no alternates, and a non-match never
/// carries an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMatch {
    confidence: MatchConfidence,
    card: Option<CatalogCard>,
    candidates: Vec<CatalogCard>,
}

impl CatalogMatch {
    #[must_use]
    pub fn exact(card: CatalogCard) -> Self {
        Self {
            confidence: MatchConfidence::Exact,
            card: Some(card),
            candidates: Vec::new(),
        }
    }

    #[must_use]
    pub fn no_match() -> Self {
        Self {
            confidence: MatchConfidence::NoMatch,
            card: None,
            candidates: Vec::new(),
        }
    }

    /// Classifies a narrowed candidate list: zero is a non-match, one is
    /// exact, more than one is ambiguous with the order preserved.
    #[must_use]
    pub fn from_candidates(mut candidates: Vec<CatalogCard>) -> Self {
        match candidates.len() {
            0 => Self::no_match(),
            1 => Self::exact(candidates.remove(0)),
            _ => Self {
                confidence: MatchConfidence::Ambiguous,
                card: None,
                candidates,
            },
        }
    }

    #[must_use]
    pub fn confidence(&self) -> MatchConfidence {
        self.confidence
    }

    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.confidence == MatchConfidence::Exact
    }

    #[must_use]
    pub fn canonical_id(&self) -> Option<&str> {
        self.card.as_ref().map(|c| c.id.as_str())
    }

    #[must_use]
    pub fn card(&self) -> Option<&CatalogCard> {
        self.card.as_ref()
    }

    #[must_use]
    pub fn candidates(&self) -> &[CatalogCard] {
        &self.candidates
    }
}
