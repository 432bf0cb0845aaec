//! Scryfall card catalog: HTTP client, candidate narrowing, and the
//! run-scoped resolver built on both.

mod client;
mod disambiguate;
mod resolver;
mod types;

pub use client::ScryfallClient;
pub use disambiguate::disambiguate;
pub use resolver::{CatalogResolver, LookupKey};
pub use types::{ScryfallCard, ScryfallList};
