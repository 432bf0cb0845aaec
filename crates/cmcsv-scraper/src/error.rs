use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no order-item table found: expected table rows carrying data-article-id")]
    NoOrderTable,
}
