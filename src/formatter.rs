//! Rendering of command results.

use comfy_table::{Cell, ContentArrangement, Table};

use tabledb::sql::{executor::ResultSet, types::Row};

/// Formats a result for display; `None` for EXIT
pub fn format_result(result: &ResultSet) -> Option<String> {
    Some(match result {
        ResultSet::TableList { tables } if tables.is_empty() => "No tables exist".to_string(),
        ResultSet::TableList { tables } => tables.join("\n"),
        ResultSet::Rows { rows, .. } if rows.is_empty() => "No results found".to_string(),
        ResultSet::Rows { columns, rows } => format_table(columns, rows),
        ResultSet::Mutation { kind, count } => match count {
            1 => format!("1 row {}", kind),
            n => format!("{} rows {}", n, kind),
        },
        ResultSet::Ack { message } => message.clone(),
        ResultSet::Exit => return None,
    })
}

fn format_table(columns: &[String], rows: &[Row]) -> String {
    let mut table = Table::new();

    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    table.set_header(columns.iter().map(Cell::new));
    for row in rows {
        table.add_row(row.iter().map(|v| Cell::new(v.to_string())));
    }

    table.to_string()
}
