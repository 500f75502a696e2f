use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::sync::LazyLock;

static TABLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("table").expect("Failed to parse table selector - this is a bug")
});

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("Failed to parse tr selector - this is a bug"));

static HEADER_CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("Failed to parse th selector - this is a bug"));

static DATA_CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("Failed to parse td selector - this is a bug"));

/// Text content of a `<table>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub id: String,
    pub class: String,
    /// Every `<th>` text, across all rows.
    pub header: Vec<String>,
    /// One entry per row that has at least one `<td>`.
    pub data: Vec<Vec<String>>,
    /// Inner HTML of the `<th>` then `<td>` cells, one entry per `<tr>`.
    pub raw_cells: Vec<Vec<String>>,
}

/// Every `<table>` in document order. Rows, headers and cells are
/// matched as descendants, so a nested table's rows also count toward
/// the outer one.
pub fn parse_tables(document: &Html) -> Vec<Table> {
    document.select(&TABLE_SELECTOR).map(parse_table).collect()
}

fn text_of(cell: &ElementRef<'_>) -> String {
    cell.text().collect()
}

fn parse_table(table: ElementRef<'_>) -> Table {
    let mut parsed = Table {
        id: table.value().attr("id").unwrap_or_default().to_string(),
        class: table.value().attr("class").unwrap_or_default().to_string(),
        ..Table::default()
    };

    for tr in table.select(&ROW_SELECTOR) {
        let mut raw_row = Vec::new();
        for th in tr.select(&HEADER_CELL_SELECTOR) {
            parsed.header.push(text_of(&th));
            raw_row.push(th.inner_html());
        }

        let mut row = Vec::new();
        for td in tr.select(&DATA_CELL_SELECTOR) {
            row.push(text_of(&td));
            raw_row.push(td.inner_html());
        }
        if !row.is_empty() {
            parsed.data.push(row);
        }
        parsed.raw_cells.push(raw_row);
    }

    tracing::trace!(id = %parsed.id, rows = parsed.raw_cells.len(), "parsed table");
    parsed
}
