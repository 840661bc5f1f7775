// Hard caps on caller-supplied limits

/// Keyword search results per call.
pub const KEYWORD_LIMIT_MAX: u32 = 50;
pub const KEYWORD_LIMIT_DEFAULT: u32 = 5;

/// Substitutes per call.
pub const SUBSTITUTIONS_LIMIT_MAX: u32 = 50;
pub const SUBSTITUTIONS_LIMIT_DEFAULT: u32 = 10;

/// Manufacturer and category listings.
pub const LISTING_LIMIT_MAX: u32 = 500;

/// Clamp a requested limit into `1..=max`, using `default` when absent.
pub fn clamp_limit(requested: Option<u32>, default: u32, max: u32) -> u32 {
    requested.unwrap_or(default).clamp(1, max)
}

/// Keep at most `limit` entries of the array under `key`.
///
/// Payloads without that array pass through untouched.
pub fn truncate_list(mut value: serde_json::Value, key: &str, limit: u32) -> serde_json::Value {
    if let Some(items) = value.get_mut(key).and_then(|v| v.as_array_mut()) {
        items.truncate(limit as usize);
    }
    value
}
