/// Display obfuscation and value normalization
///
/// Pure transforms applied at the presentation and persistence boundaries.
/// Obfuscation never touches storage: it masks sensitive sub-fields of a
/// setting value before it is shown to an operator.
use crate::modules::settings::domain::value_objects::SettingField;
use serde_json::{Map, Value};

const MASK: char = '*';
const VISIBLE_PREFIX: usize = 4;

/// Keys of `value` considered sensitive per field category
pub fn sensitive_keys(field: SettingField) -> &'static [&'static str] {
    match field {
        SettingField::Payment => &["gateway_key", "gateway_token", "webhook_secret"],
        SettingField::Logistics => &["token", "password"],
        SettingField::Notification => &["api_key"],
        SettingField::Cdn => &["access_key", "secret_key"],
        SettingField::Company => &[],
        SettingField::Crm => &["api_key"],
        SettingField::Mail => &["smtp_password", "api_key"],
        SettingField::Bucket => &["access_key_id", "secret_access_key"],
    }
}

/// Mask all but the first 4 characters; values of 4 characters or fewer are
/// fully masked
fn mask_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= VISIBLE_PREFIX {
        return MASK.to_string().repeat(chars.len());
    }
    let mut masked: String = chars[..VISIBLE_PREFIX].iter().collect();
    masked.extend(std::iter::repeat(MASK).take(chars.len() - VISIBLE_PREFIX));
    masked
}

/// Obfuscate the sensitive keys of a setting value for display
///
/// Keys outside the field's sensitive set, and empty values, pass through
/// unchanged.
pub fn obfuscate_for_display(field: SettingField, value: &Map<String, Value>) -> Map<String, Value> {
    let sensitive = sensitive_keys(field);
    value
        .iter()
        .map(|(key, val)| {
            let masked = match val {
                Value::String(s) if sensitive.contains(&key.as_str()) && !s.is_empty() => {
                    Value::String(mask_value(s))
                }
                other => other.clone(),
            };
            (key.clone(), masked)
        })
        .collect()
}

/// Normalize a structured value so every entry is a scalar
///
/// Nested arrays and objects are serialized to their JSON string form before
/// persistence or encryption, keeping the stored mapping key -> scalar.
pub fn normalize_values(value: Map<String, Value>) -> Map<String, Value> {
    value
        .into_iter()
        .map(|(key, val)| {
            let normalized = match val {
                Value::Array(_) | Value::Object(_) => {
                    Value::String(val.to_string())
                }
                scalar => scalar,
            };
            (key, normalized)
        })
        .collect()
}
