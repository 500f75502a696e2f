//! Structural extraction of forms and tables from HTML.
//!
//! Parsing is lenient: malformed markup is repaired the way browsers
//! repair it, and invalid UTF-8 is replaced, so extraction itself never
//! fails.

pub mod forms;
pub mod tables;
pub mod values;

pub use forms::Form;
pub use tables::Table;
pub use values::FormValues;

use scraper::Html;

/// Parse a response body into a document.
pub fn parse_document(body: &[u8]) -> Html {
    Html::parse_document(&String::from_utf8_lossy(body))
}

/// Forms of `body`, in document order.
pub fn extract_forms(body: &[u8]) -> Vec<Form> {
    forms::parse_forms(&parse_document(body))
}

/// Tables of `body`, in document order.
pub fn extract_tables(body: &[u8]) -> Vec<Table> {
    tables::parse_tables(&parse_document(body))
}
