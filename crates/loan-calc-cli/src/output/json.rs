use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print the computation envelope to stdout.
pub fn print_json(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_json(&mut stdout.lock(), value) {
        eprintln!("JSON output error: {}", e);
    }
}

/// Write `value` as pretty JSON followed by a newline.
pub fn write_json<W: Write>(writer: &mut W, value: &Value) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decimals_stay_strings() {
        let mut buf = Vec::new();
        write_json(&mut buf, &json!({"result": {"periodic_payment": "88848.79"}})).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"periodic_payment\": \"88848.79\""));
        assert!(text.ends_with("}\n"));
    }
}
