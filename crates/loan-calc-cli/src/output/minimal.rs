use serde_json::Value;

use super::format_scalar;

/// Fields holding the answer when the result does not say what it solved for.
const PRIORITY_KEYS: [&str; 9] = [
    "periodic_payment",
    "irr",
    "npv",
    "converted_rate",
    "present_value",
    "future_value",
    "amount",
    "periods",
    "decimal_years",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_answer(value));
}

fn minimal_answer(value: &Value) -> String {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let Value::Object(map) = result else {
        return format_scalar(result);
    };

    if let Some(solved) = map.get("solved_for").and_then(Value::as_str) {
        if let Some(val) = answer_keys(solved).iter().find_map(|k| map.get(*k)) {
            return format_scalar(val);
        }
    }

    for key in PRIORITY_KEYS {
        if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
            return format_scalar(val);
        }
    }

    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, format_scalar(val)),
        None => String::new(),
    }
}

/// Result fields that may carry a solver's answer, keyed by its `solved_for`.
fn answer_keys(solved_for: &str) -> &'static [&'static str] {
    match solved_for {
        "payment" => &["payment"],
        "rate" => &["rate", "rate_percent"],
        "periods" => &["periods"],
        "values" => &["future_value"],
        "capital" => &["capital"],
        "amount" => &["amount"],
        "time" => &["years"],
        "nominal_percent" => &["nominal_percent"],
        "effective_percent" => &["effective_percent"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_solved_field_wins() {
        let out = json!({"result": {"solved_for": "rate", "rate": "0.02", "payment": "100"}});
        assert_eq!(minimal_answer(&out), "0.02");
    }

    #[test]
    fn test_interest_rate_answer_in_percent() {
        let out = json!({"result": {"solved_for": "rate", "rate_percent": "1", "capital": "1000"}});
        assert_eq!(minimal_answer(&out), "1");
    }

    #[test]
    fn test_falls_back_to_first_field() {
        let out = json!({"result": {"alpha": "1", "beta": "2"}});
        assert_eq!(minimal_answer(&out), "alpha: 1");
    }

    #[test]
    fn test_priority_key() {
        let out = json!({"result": {"irr": "0.1532", "iterations": 5}});
        assert_eq!(minimal_answer(&out), "0.1532");
    }
}
