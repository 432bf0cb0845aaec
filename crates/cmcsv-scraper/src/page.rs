//! Article extraction from a saved marketplace order page.
//!
//! Pages are saved by hand from different locales, so nothing here depends on
//! visible text. Each article is a table row tagged with `data-article-id`;
//! its values come from the row's `data-*` attributes, with tooltip and class
//! markers on descendant elements as fallbacks.

use std::fmt;
use std::num::NonZeroU32;
use std::sync::LazyLock;

use cmcsv_core::{normalize_language, split_set_hint, Condition, Finish, RawLineItem};
use scraper::{ElementRef, Html, Selector};

use crate::error::ParseError;
use crate::parse_helpers::{finish_from_label, language_from_label, parse_price};

static ARTICLE_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr[data-article-id]").expect("valid article row selector"));

static LABELLED: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[title], [data-original-title], [data-bs-original-title], [aria-label]")
        .expect("valid label selector")
});

static NAME_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.name a, td.name").expect("valid name selector"));

static EXPANSION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".expansion-symbol").expect("valid expansion selector"));

static CONDITION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".article-condition").expect("valid condition selector"));

static PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".price").expect("valid price selector"));

/// Attributes that carry human-readable labels on icons and badges.
static LABEL_ATTRS: [&str; 4] = [
    "title",
    "data-original-title",
    "data-bs-original-title",
    "aria-label",
];

/// Why a row could not become a line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingField(&'static str),
    InvalidQuantity(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingField(field) => write!(f, "missing {field}"),
            SkipReason::InvalidQuantity(raw) => write!(f, "invalid quantity \"{raw}\""),
        }
    }
}

/// Outcome for one article row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRow {
    Item(RawLineItem),
    Skipped {
        article_id: Option<String>,
        reason: SkipReason,
    },
}

/// A parsed document known to contain an order-item table.
pub struct OrderPage {
    html: Html,
}

impl OrderPage {
    /// Parses `document` and checks that it is an order page.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NoOrderTable`] if no article rows are present.
    pub fn parse(document: &str) -> Result<Self, ParseError> {
        let html = Html::parse_document(document);
        if html.select(&ARTICLE_ROW).next().is_none() {
            return Err(ParseError::NoOrderTable);
        }
        Ok(Self { html })
    }

    /// Article rows in document order, parsed lazily.
    pub fn rows(&self) -> impl Iterator<Item = ParsedRow> + '_ {
        self.html.select(&ARTICLE_ROW).map(parse_row)
    }
}

/// Parses a whole document into its row outcomes.
///
/// # Errors
///
/// Returns [`ParseError::NoOrderTable`] if no article rows are present.
pub fn parse_order_page(document: &str) -> Result<Vec<ParsedRow>, ParseError> {
    let page = OrderPage::parse(document)?;
    let rows: Vec<ParsedRow> = page.rows().collect();
    tracing::debug!(rows = rows.len(), "parsed order page");
    Ok(rows)
}

fn attr<'a>(row: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    row.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn first_text<'a>(row: &ElementRef<'a>, selector: &Selector) -> Option<String> {
    row.select(selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .find(|text| !text.is_empty())
}

fn element_labels<'a>(el: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    LABEL_ATTRS
        .iter()
        .filter_map(move |name| el.value().attr(name))
}

fn row_labels<'a>(row: &ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    row.select(&LABELLED).flat_map(element_labels)
}

fn parse_row(row: ElementRef<'_>) -> ParsedRow {
    let article_id = attr(&row, "data-article-id").map(str::to_owned);
    let skip = |reason| ParsedRow::Skipped {
        article_id: article_id.clone(),
        reason,
    };

    let Some(product_id) = attr(&row, "data-product-id") else {
        return skip(SkipReason::MissingField("data-product-id"));
    };

    let Some(display_name) = attr(&row, "data-name")
        .map(str::to_owned)
        .or_else(|| first_text(&row, &NAME_CELL))
    else {
        return skip(SkipReason::MissingField("data-name"));
    };

    let quantity = match attr(&row, "data-amount") {
        None => NonZeroU32::MIN,
        Some(raw) => match raw.parse::<u32>().ok().and_then(NonZeroU32::new) {
            Some(quantity) => quantity,
            None => return skip(SkipReason::InvalidQuantity(raw.to_owned())),
        },
    };

    let (name, name_hint) = split_set_hint(&display_name);
    let set_hint = name_hint
        .map(str::to_owned)
        .or_else(|| attr(&row, "data-expansion").map(str::to_owned))
        .or_else(|| attr(&row, "data-expansion-name").map(str::to_owned))
        .or_else(|| {
            row.select(&EXPANSION)
                .flat_map(element_labels)
                .map(str::trim)
                .find(|label| !label.is_empty())
                .map(str::to_owned)
        });

    let language = attr(&row, "data-language")
        .and_then(normalize_language)
        .or_else(|| row_labels(&row).find_map(language_from_label));

    let condition = attr(&row, "data-condition")
        .map(str::to_owned)
        .or_else(|| first_text(&row, &CONDITION))
        .and_then(|raw| Condition::from_marketplace(&raw));

    let unit_price_eur = attr(&row, "data-price")
        .map(str::to_owned)
        .or_else(|| first_text(&row, &PRICE))
        .and_then(|raw| parse_price(&raw));

    ParsedRow::Item(RawLineItem {
        product_id: product_id.to_owned(),
        name: name.to_owned(),
        display_name: display_name.clone(),
        set_hint,
        language,
        finish: row_finish(&row),
        condition,
        quantity,
        unit_price_eur,
    })
}

/// Etched wins over foil when a row carries both markers.
fn row_finish(row: &ElementRef<'_>) -> Finish {
    if let Some(raw) = attr(row, "data-finish") {
        if let Some(finish) =
            Finish::from_catalog_code(&raw.to_ascii_lowercase()).or_else(|| finish_from_label(raw))
        {
            return finish;
        }
    }

    let mut finish = Finish::Normal;
    for label in row_labels(row) {
        match finish_from_label(label) {
            Some(Finish::Etched) => return Finish::Etched,
            Some(found) => finish = found,
            None => {}
        }
    }
    finish
}

#[cfg(test)]
#[path = "page_test.rs"]
mod tests;
