//! Mapping from lookup keys to remote secret names.

/// Secrets Manager does not allow `:` in secret names, so every `:` becomes `=`.
pub fn translate_key(key: &str) -> String {
    key.replace(':', "=")
}

/// Derives the remote secret name `{uri}/{translated_key}`.
pub fn secret_name(uri: &str, key: &str) -> String {
    format!("{uri}/{}", translate_key(key))
}
