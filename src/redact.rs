use std::collections::BTreeMap;

/// Replacement for secret values
pub const MASK: &str = "***";

const SECRET_MARKERS: [&str; 3] = ["SECRET", "TOKEN", "PASSWORD"];

/// Whether a key names something that should not be printed
pub fn is_secret_key(key: &str) -> bool {
    let upper = key.to_ascii_uppercase();
    upper.ends_with("_KEY") || SECRET_MARKERS.iter().any(|m| upper.contains(m))
}

/// Copy `pairs` into a sorted map with secret values masked
pub fn redact<I, K, V>(pairs: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| {
            let key = k.into();
            let value = if is_secret_key(&key) {
                MASK.to_string()
            } else {
                v.into()
            };
            (key, value)
        })
        .collect()
}

/// Snapshot of the process environment with secrets masked.
/// Variables that are not valid unicode are left out.
pub fn dump_redacted() -> BTreeMap<String, String> {
    redact(std::env::vars_os().filter_map(|(k, v)| {
        Some((k.into_string().ok()?, v.into_string().ok()?))
    }))
}
