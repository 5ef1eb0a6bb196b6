use serde_json::Value;

use super::{primary, scalar};

/// Headline fields, most specific first.
const PRIORITY_KEYS: [&str; 5] = [
    "filename",
    "cap_rate_pct",
    "net_operating_income",
    "offer_price",
    "annual_cash_flow",
];

/// Print just the headline value.
///
/// Arrays print their length; previews print the model's cap rate or the
/// letter's offer price.
pub fn print_minimal(value: &Value) {
    let target = primary(value);
    let target = match target.get("kind").and_then(Value::as_str) {
        Some("underwriting") => target.get("model").unwrap_or(target),
        Some("loi") => target.get("letter").unwrap_or(target),
        _ => target,
    };

    match target {
        Value::Object(map) => {
            let headline = PRIORITY_KEYS
                .iter()
                .find_map(|key| map.get(*key).filter(|v| !v.is_null()));
            match headline {
                Some(val) => println!("{}", scalar(val)),
                None => {
                    if let Some((key, val)) = map.iter().next() {
                        println!("{}: {}", key, scalar(val));
                    }
                }
            }
        }
        Value::Array(items) => println!("{}", items.len()),
        other => println!("{}", scalar(other)),
    }
}
