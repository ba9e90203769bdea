use std::fmt::Display;

use serde_json::{Map, Number};

use crate::sql::{executor::ResultSet, types::Value};

const MIN_COLUMN_WIDTH: usize = 3;

impl ResultSet {
    /// Renders the rows as CSV, header first; empty for messages or no rows
    pub fn to_csv(&self) -> String {
        let ResultSet::Scan { columns, rows } = self else {
            return String::new();
        };
        if rows.is_empty() {
            return String::new();
        }

        let mut lines = vec![columns.join(",")];
        for row in rows {
            let fields = row
                .iter()
                .map(|v| csv_field(&v.to_string()))
                .collect::<Vec<_>>();
            lines.push(fields.join(","));
        }
        lines.join("\n")
    }

    /// Renders the rows as a JSON array of column -> value objects
    pub fn to_json(&self) -> serde_json::Value {
        let ResultSet::Scan { columns, rows } = self else {
            return serde_json::Value::Array(vec![]);
        };
        let objects = rows
            .iter()
            .map(|row| {
                serde_json::Value::Object(
                    columns
                        .iter()
                        .zip(row)
                        .map(|(c, v)| (c.clone(), json_value(v)))
                        .collect::<Map<_, _>>(),
                )
            })
            .collect();
        serde_json::Value::Array(objects)
    }
}

fn csv_field(text: &str) -> String {
    if text.contains(',') || text.contains('"') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

fn json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => (*b).into(),
        Value::Integer(i) => (*i).into(),
        Value::Float(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => s.clone().into(),
    }
}

impl Display for ResultSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (columns, rows) = match self {
            ResultSet::Message { text } => return f.write_str(text),
            ResultSet::Scan { columns, rows } => (columns, rows),
        };

        if rows.is_empty() {
            if columns.is_empty() {
                return write!(f, "Query executed successfully.\n(0 rows)");
            }
            return write!(
                f,
                "Query executed successfully. Columns: {}\n(0 rows)",
                columns.join(", ")
            );
        }

        let cells = rows
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let widths = columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain([c.chars().count(), MIN_COLUMN_WIDTH])
                    .max()
                    .unwrap_or(MIN_COLUMN_WIDTH)
            })
            .collect::<Vec<_>>();

        let line = |values: &[String]| {
            values
                .iter()
                .zip(&widths)
                .map(|(v, &w)| format!("{:<w$}", v, w = w))
                .collect::<Vec<_>>()
                .join(" | ")
        };

        writeln!(f, "{}", line(columns.as_slice()))?;
        let rule = widths.iter().map(|&w| "-".repeat(w)).collect::<Vec<_>>();
        writeln!(f, "{}", rule.join("-+-"))?;
        for row in &cells {
            writeln!(f, "{}", line(row.as_slice()))?;
        }
        let plural = if rows.len() == 1 { "" } else { "s" };
        write!(f, "\n({} row{})", rows.len(), plural)
    }
}
