use serde_json::Value;
use std::io::{self, Read};

/// Read a JSON request from stdin when data is being piped.
/// Returns None if stdin is a TTY or the pipe is empty.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

fn parse_piped(buffer: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse JSON from stdin: {}", e))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_pipe_is_no_input() {
        assert!(parse_piped("  \n").unwrap().is_none());
    }

    #[test]
    fn test_piped_object() {
        let value = parse_piped(r#"{"payment": "100"}"#).unwrap().unwrap();
        assert_eq!(value["payment"], "100");
    }

    #[test]
    fn test_piped_garbage_rejected() {
        let err = parse_piped("payment=100").unwrap_err();
        assert!(err.to_string().contains("stdin"));
    }
}
