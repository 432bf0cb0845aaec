//! Scryfall API response types.
//!
//! Only the fields the resolver needs are modelled. `finishes` is an array of
//! `"nonfoil"`, `"foil"` and `"etched"`; unknown values are dropped during
//! conversion so new finishes do not break parsing.

use cmcsv_core::{CatalogCard, Finish};
use serde::Deserialize;

/// A card object from `/cards/*` endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ScryfallCard {
    pub id: String,
    pub name: String,
    pub set: String,
    pub set_name: String,
    pub lang: String,
    #[serde(default)]
    pub finishes: Vec<String>,
}

/// A paginated list object from `/cards/search`.
#[derive(Debug, Deserialize)]
pub struct ScryfallList {
    pub data: Vec<ScryfallCard>,
    #[serde(default)]
    pub has_more: bool,
    pub next_page: Option<String>,
}

impl From<ScryfallCard> for CatalogCard {
    fn from(card: ScryfallCard) -> Self {
        CatalogCard {
            finishes: card
                .finishes
                .iter()
                .filter_map(|f| Finish::from_catalog_code(f))
                .collect(),
            id: card.id,
            name: card.name,
            set_code: card.set,
            set_name: card.set_name,
            lang: card.lang,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_card_and_drops_unknown_finishes() {
        let card: ScryfallCard = serde_json::from_value(serde_json::json!({
            "object": "card",
            "id": "e3285e6b-3e79-4d7c-bf96-d920f973b122",
            "name": "Lightning Bolt",
            "set": "m10",
            "set_name": "Magic 2010",
            "lang": "en",
            "finishes": ["nonfoil", "foil", "glossy"]
        }))
        .unwrap();

        let converted = CatalogCard::from(card);
        assert_eq!(converted.id, "e3285e6b-3e79-4d7c-bf96-d920f973b122");
        assert_eq!(converted.set_code, "m10");
        assert_eq!(converted.finishes, [Finish::Normal, Finish::Foil]);
    }

    #[test]
    fn missing_finishes_defaults_to_empty() {
        let card: ScryfallCard = serde_json::from_value(serde_json::json!({
            "id": "x", "name": "X", "set": "lea", "set_name": "Alpha", "lang": "en"
        }))
        .unwrap();
        assert!(card.finishes.is_empty());
    }
}
