use serde_json::Value;
use std::io;

use super::{format_scalar, row_array};

/// Write output as CSV to stdout. A schedule prints one line per period;
/// any other result prints `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    write_csv(&mut wtr, value);
    let _ = wtr.flush();
}

fn write_csv<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) {
    match value {
        Value::Object(map) => {
            let result = map.get("result").unwrap_or(value);
            if let Some((_, rows)) = row_array(result) {
                write_array_csv(wtr, rows);
            } else if let Value::Object(fields) = result {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in fields {
                    let _ = wtr.write_record([key.as_str(), &format_scalar(val)]);
                }
            }
        }
        Value::Array(arr) => write_array_csv(wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_scalar(value)]);
        }
    }
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&format_scalar(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for map in arr.iter().filter_map(Value::as_object) {
        let row: Vec<String> = headers
            .iter()
            .map(|h| map.get(*h).map(format_scalar).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_csv(&mut wtr, value);
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_schedule_rows_become_lines() {
        let out = render(&json!({
            "result": {
                "total_interest": "20",
                "rows": [
                    {"balance": "500", "period": 1},
                    {"balance": "0", "period": 2}
                ]
            }
        }));
        assert_eq!(out, "balance,period\n500,1\n0,2\n");
    }

    #[test]
    fn test_plain_result_is_field_value_pairs() {
        let out = render(&json!({"result": {"irr": "0.15"}, "warnings": []}));
        assert_eq!(out, "field,value\nirr,0.15\n");
    }
}
