//! Output rows and their assembly from resolved line items.

use std::collections::HashMap;
use std::num::NonZeroU32;

use rust_decimal::Decimal;

use crate::catalog::{CatalogCard, CatalogMatch, MatchConfidence};
use crate::currency::{convert, ExchangeRate};
use crate::items::{Condition, Finish, RawLineItem};

/// Written in place of a canonical id the tool could not determine.
pub const PLACEHOLDER_ID: &str = "MANUAL_REVIEW";

/// Column contract of the import target. Column 5 is ignored by the importer
/// but must be present.
pub const CSV_HEADER: [&str; 8] = [
    "quantity",
    "name",
    "finish",
    "condition",
    "ignore",
    "language",
    "price",
    "scryfall_id",
];

/// One CSV row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub quantity: NonZeroU32,
    pub name: String,
    pub finish: Finish,
    pub condition: Option<Condition>,
    pub language: Option<String>,
    pub price_usd: Option<Decimal>,
    pub canonical_id: Option<String>,
    pub confidence: MatchConfidence,
    pub needs_manual_review: bool,
    /// Printings an ambiguous match narrowed down to, for manual resolution.
    pub candidates: Vec<CatalogCard>,
}

impl OutputRecord {
    /// Names of the output columns a human has to fill in before import.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.canonical_id.is_none() {
            missing.push("scryfall_id");
        }
        if self.condition.is_none() {
            missing.push("condition");
        }
        if self.price_usd.is_none() {
            missing.push("price");
        }
        missing
    }

    /// One `id (set/lang)` entry per remaining candidate printing.
    #[must_use]
    pub fn candidate_summary(&self) -> Vec<String> {
        self.candidates
            .iter()
            .map(|card| format!("{} ({}/{})", card.id, card.set_code, card.lang))
            .collect()
    }

    /// Field values in [`CSV_HEADER`] order.
    #[must_use]
    pub fn csv_fields(&self) -> [String; 8] {
        [
            self.quantity.to_string(),
            self.name.clone(),
            self.finish.as_str().to_string(),
            self.condition.map(|c| c.as_str().to_string()).unwrap_or_default(),
            String::new(),
            self.language.clone().unwrap_or_default(),
            self.price_usd.map(|p| format!("{p:.2}")).unwrap_or_default(),
            self.canonical_id
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_ID.to_string()),
        ]
    }
}

/// Builds the output row for one line item.
///
/// `rate` may be `None` only when the item carries no price; a priced item
/// assembled without a rate ends up with an empty price and is flagged.
#[must_use]
pub fn assemble(
    item: &RawLineItem,
    matched: &CatalogMatch,
    rate: Option<&ExchangeRate>,
) -> OutputRecord {
    let price_usd = match (item.unit_price_eur, rate) {
        (Some(price), Some(rate)) => Some(convert(price, rate)),
        _ => None,
    };

    let language = item
        .language
        .clone()
        .or_else(|| matched.card().map(|card| card.lang.clone()));

    let needs_manual_review =
        !matched.is_exact() || item.condition.is_none() || price_usd.is_none();

    OutputRecord {
        quantity: item.quantity,
        name: item.name.clone(),
        finish: item.finish,
        condition: item.condition,
        language,
        price_usd,
        canonical_id: matched.canonical_id().map(str::to_owned),
        confidence: matched.confidence(),
        needs_manual_review,
        candidates: matched.candidates().to_vec(),
    }
}

/// Folds resolved rows describing the same printing at the same price into
/// their first occurrence, summing quantities. Rows flagged for review are
/// passed through untouched so each stays visible on its own line.
#[must_use]
pub fn merge_duplicates(records: Vec<OutputRecord>) -> Vec<OutputRecord> {
    type MergeKey = (String, Finish, Option<Condition>, Option<String>, Option<Decimal>);

    let mut merged: Vec<OutputRecord> = Vec::with_capacity(records.len());
    let mut first_index: HashMap<MergeKey, usize> = HashMap::new();

    for record in records {
        let key = match (&record.canonical_id, record.needs_manual_review) {
            (Some(id), false) => (
                id.clone(),
                record.finish,
                record.condition,
                record.language.clone(),
                record.price_usd,
            ),
            _ => {
                merged.push(record);
                continue;
            }
        };

        if let Some(&index) = first_index.get(&key) {
            let target = &mut merged[index];
            target.quantity = target.quantity.saturating_add(record.quantity.get());
        } else {
            first_index.insert(key, merged.len());
            merged.push(record);
        }
    }

    merged
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
