pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a scalar for a table cell, CSV field or minimal line.
pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_scalar).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// The first array of objects inside a result (schedule rows, discounted flows).
pub(crate) fn row_array(result: &Value) -> Option<(&str, &Vec<Value>)> {
    result.as_object()?.iter().find_map(|(key, val)| match val {
        Value::Array(items) if items.first().is_some_and(Value::is_object) => Some((key.as_str(), items)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_array_finds_schedule_rows() {
        let result = json!({"total_interest": "1", "rows": [{"period": 1}]});
        let (key, rows) = row_array(&result).unwrap();
        assert_eq!(key, "rows");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_row_array_ignores_scalar_lists() {
        let result = json!({"discounted_flows": ["100", "100"]});
        assert!(row_array(&result).is_none());
    }

    #[test]
    fn test_format_scalar_joins_lists() {
        assert_eq!(format_scalar(&json!(["1", "2"])), "1, 2");
        assert_eq!(format_scalar(&Value::Null), "");
    }
}
