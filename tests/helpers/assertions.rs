use billtrust::moves::{DisplayType, MoveLine};
use rust_decimal::Decimal;
use serde_json::Value;

pub fn lines_of(lines: &[MoveLine], display_type: DisplayType) -> Vec<&MoveLine> {
    lines.iter().filter(|l| l.display_type == display_type).collect()
}

pub fn tax_line(lines: &[MoveLine], tax_id: i64) -> Option<&MoveLine> {
    lines
        .iter()
        .find(|l| l.display_type == DisplayType::Tax && l.tax_line_id == Some(tax_id))
}

/// Read a decimal serialized either as a JSON string or number
pub fn decimal(value: &Value) -> Decimal {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.parse()
        .unwrap_or_else(|_| panic!("Expected a decimal, got {}", value))
}

/// Assert the standard error body and return its message
pub fn assert_error_body(body: &Value, code: u16) -> String {
    assert_eq!(body["error"]["code"], code, "unexpected error body: {}", body);
    body["error"]["message"]
        .as_str()
        .expect("error message must be a string")
        .to_string()
}
