use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_scalar, row_array};

/// Format output as tables: the result fields, then any per-period rows.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_result_table(result, map),
            None => println!("{}", field_table(map)),
        },
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    let Value::Object(res_map) = result else {
        println!("{}", field_table(envelope));
        return;
    };

    let rows = row_array(result);
    let scalars: Map<String, Value> = res_map
        .iter()
        .filter(|(key, _)| rows.map_or(true, |(rows_key, _)| rows_key != key.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    println!("{}", field_table(&scalars));

    if let Some((_, items)) = rows {
        println!();
        print_rows(items);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn field_table(map: &Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_scalar(val)]);
    }
    builder.build()
}

fn print_rows(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(headers.iter().cloned());

        for map in arr.iter().filter_map(Value::as_object) {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_scalar).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }

        println!("{}", builder.build());
    } else {
        for item in arr {
            println!("{}", format_scalar(item));
        }
    }
}
