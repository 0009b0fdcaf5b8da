//! Fixed-width text rendering of a dataset.

use crate::schema::Dataset;

/// Padding added to the widest cell of each column.
pub const COLUMN_PADDING: usize = 2;

/// Width of each column: the widest rendered cell or header, plus padding.
pub fn column_widths(dataset: &Dataset) -> Vec<usize> {
    dataset
        .headers()
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let widest = dataset
                .column_values(idx)
                .map(|v| v.to_string().chars().count())
                .max()
                .unwrap_or(0);
            widest.max(header.chars().count()) + COLUMN_PADDING
        })
        .collect()
}

/// Render the first `limit` rows as an aligned table.
pub fn render_table(dataset: &Dataset, limit: usize) -> String {
    let widths = column_widths(dataset);
    let mut out = String::new();

    let line = |cells: Vec<String>, out: &mut String| {
        for (cell, width) in cells.iter().zip(&widths) {
            out.push_str(&format!("{:<width$}", cell, width = *width));
        }
        let trimmed = out.trim_end_matches(' ').len();
        out.truncate(trimmed);
        out.push('\n');
    };

    line(dataset.headers().to_vec(), &mut out);
    for row in dataset.rows().iter().take(limit) {
        line(row.iter().map(|v| v.to_string()).collect(), &mut out);
    }
    if dataset.row_count() > limit {
        out.push_str(&format!("... {} more rows\n", dataset.row_count() - limit));
    }
    out
}
