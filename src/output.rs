//! Result-set rendering for the CLI: aligned table, JSON, and CSV.

use crate::error::Result;
use crate::value::{Row, Value};

/// Render rows as a width-aligned text table.
pub fn format_table(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return "No data".to_string();
    };
    let headers = first.columns();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    let rendered: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.values().iter().map(Value::to_string).collect())
        .collect();
    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    // The last column is left unpadded to avoid trailing whitespace.
    let format_line = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if i + 1 == cells.len() {
                    cell.clone()
                } else {
                    format!("{cell:<width$}", width = widths[i])
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_line(
        &headers.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
    ));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &rendered {
        lines.push(format_line(row));
    }
    lines.join("\n")
}

fn json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Real(r) => serde_json::Number::from_f64(*r)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::from(s.clone()),
        Value::Boolean(b) => serde_json::Value::from(*b),
        Value::Blob(b) => serde_json::Value::from(b.clone()),
    }
}

/// Render rows as a pretty-printed JSON array of objects.
pub fn format_json(rows: &[Row]) -> Result<String> {
    let data: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            let mut object = serde_json::Map::new();
            for (column, value) in row.iter() {
                object.insert(column.to_string(), json_value(value));
            }
            serde_json::Value::Object(object)
        })
        .collect();
    Ok(serde_json::to_string_pretty(&data)?)
}

fn csv_cell(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        other => other.to_string(),
    };
    if text.contains([',', '"', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text
    }
}

/// Render rows as CSV with a header line.
pub fn format_csv(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };
    let mut lines = vec![first.columns().join(",")];
    for row in rows {
        lines.push(
            row.values()
                .iter()
                .map(csv_cell)
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}
