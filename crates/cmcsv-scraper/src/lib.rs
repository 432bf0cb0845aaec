pub mod error;
pub mod page;
mod parse_helpers;

pub use error::ParseError;
pub use page::{parse_order_page, OrderPage, ParsedRow, SkipReason};
