//! Plain-text rendering of category rows for `--print`.

use std::io::{self, Write};

use crate::catalog::CategoryRow;
use crate::util::{display_width, truncate_to_width};

use super::tree::row_prefix;

/// One line per row: indentation, expand marker, title and a bracketed status,
/// cut to `width` columns.
pub fn format_row(row: &CategoryRow, width: usize) -> String {
    let prefix = row_prefix(row);
    let suffix = if row.status.trim().is_empty() {
        String::new()
    } else {
        format!(" [{}]", row.status.trim())
    };

    let budget = width
        .saturating_sub(display_width(&prefix))
        .saturating_sub(display_width(&suffix));
    let line = format!("{}{}{}", prefix, truncate_to_width(&row.title, budget), suffix);
    truncate_to_width(&line, width).into_owned()
}

pub fn write_rows<W: Write>(out: &mut W, rows: &[CategoryRow], width: usize) -> io::Result<()> {
    for row in rows {
        writeln!(out, "{}", format_row(row, width).trim_end())?;
    }
    out.flush()
}
