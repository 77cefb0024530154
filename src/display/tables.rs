//! Table formatting for search results and index summaries.

use comfy_table::{
    Attribute, Cell, Color, ContentArrangement, Row, Table, modifiers::UTF8_ROUND_CORNERS,
    presets::UTF8_FULL,
};

use crate::semantic::SearchResult;

/// Characters of a document shown in a results table.
const DOCUMENT_PREVIEW_CHARS: usize = 120;

/// Builder for creating formatted tables.
pub struct TableBuilder {
    table: Table,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.apply_modifier(UTF8_ROUND_CORNERS);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        Self { table }
    }

    /// Bold header cells.
    pub fn set_headers(mut self, headers: Vec<&str>) -> Self {
        let header_cells: Vec<Cell> = headers
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect();
        self.table.set_header(header_cells);
        self
    }

    /// Accepts plain strings or styled cells.
    pub fn add_row(mut self, row: impl Into<Row>) -> Self {
        self.table.add_row(row);
        self
    }

    pub fn build(self) -> String {
        self.table.to_string()
    }
}

/// Renders ranked results, one row per result.
///
/// Literal (fallback) matches show their zero distance in green.
pub fn create_results_table(results: &[SearchResult]) -> String {
    let mut builder =
        TableBuilder::new().set_headers(vec!["Rank", "Distance", "Similarity", "Document"]);

    for result in results {
        let distance = Cell::new(format!("{:.4}", result.distance));
        let distance = if result.distance == 0.0 {
            distance.fg(Color::Green)
        } else {
            distance
        };
        builder = builder.add_row(vec![
            Cell::new(result.rank),
            distance,
            Cell::new(format!("{:.4}", result.similarity)),
            Cell::new(preview(&result.document)),
        ]);
    }

    builder.build()
}

/// Summary of a finished index build.
pub fn create_index_summary_table(
    corpus: &str,
    documents: usize,
    dimension: Option<usize>,
    embedder: &str,
    location: &str,
    elapsed: std::time::Duration,
) -> String {
    TableBuilder::new()
        .set_headers(vec!["Metric", "Value"])
        .add_row(vec!["Corpus".to_string(), corpus.to_string()])
        .add_row(vec!["Documents".to_string(), documents.to_string()])
        .add_row(vec![
            "Dimension".to_string(),
            dimension.map_or_else(|| "-".to_string(), |d| d.to_string()),
        ])
        .add_row(vec!["Embedder".to_string(), embedder.to_string()])
        .add_row(vec!["Location".to_string(), location.to_string()])
        .add_row(vec!["Time".to_string(), format!("{elapsed:?}")])
        .build()
}

fn preview(document: &str) -> String {
    if document.chars().count() <= DOCUMENT_PREVIEW_CHARS {
        return document.to_string();
    }
    let mut short: String = document.chars().take(DOCUMENT_PREVIEW_CHARS).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::Metadata;

    #[test]
    fn test_table_builder() {
        let table = TableBuilder::new()
            .set_headers(vec!["Column 1", "Column 2"])
            .add_row(vec!["Value 1".to_string(), "Value 2".to_string()])
            .build();

        assert!(table.contains("Column 1"));
        assert!(table.contains("Value 1"));
    }

    #[test]
    fn test_results_table_truncates_long_documents() {
        let long = "Kadıköy ".repeat(40);
        let results = vec![
            SearchResult::new(1, 0.25, "District: Kadıköy".to_string(), Metadata::new()),
            SearchResult::exact(2, long, Metadata::new()),
        ];

        let table = create_results_table(&results);
        assert!(table.starts_with('╭'));
        assert!(table.contains("Similarity"));
        assert!(table.contains("0.2500"));
        assert!(table.contains("0.8000"));
        assert!(table.contains('…'));
    }

    #[test]
    fn test_index_summary_table() {
        let table = create_index_summary_table(
            "areas",
            12,
            Some(384),
            "term frequency (40 terms)",
            ".refuge/index/areas",
            std::time::Duration::from_millis(5),
        );
        assert!(table.contains("384"));
        assert!(table.contains("areas"));
        // Same rounded style as every other table
        assert!(table.starts_with('╭'));
    }
}
