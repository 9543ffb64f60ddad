//! Table formatting utilities for CLI output.

use comfy_table::{presets, CellAlignment, ContentArrangement, Table};

/// Form counts for a single word length.
pub struct LengthStats {
    /// Letters per word.
    pub length: usize,
    /// Number of expanded forms.
    pub forms: usize,
    /// Number of forms that pass the solution filters.
    pub solutions: usize,
}

/// Format per-length counts as a table.
pub fn format_length_table(stats: &[LengthStats]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_BORDERS_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Length", "Forms", "Solutions"]);

    for row in stats {
        table.add_row(vec![
            row.length.to_string(),
            row.forms.to_string(),
            row.solutions.to_string(),
        ]);
    }
    for column in table.column_iter_mut() {
        column.set_cell_alignment(CellAlignment::Right);
    }

    table
}
