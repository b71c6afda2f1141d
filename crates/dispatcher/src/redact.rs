//! Secret redaction, applied immediately before payloads leave the process.

use contracts::{RedactionSettings, SecretSpec};

/// Known secret values and their masked replacements.
///
/// Redaction is an exact-substring replacement pass; it is the last step
/// before any text or document is handed to a transport, including
/// interactive full-trace rendering.
#[derive(Debug, Default, Clone)]
pub struct SecretStore {
    entries: Vec<(String, String)>,
}

impl SecretStore {
    /// Store with no secrets; `redact` is then the identity.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the store from configured redaction settings.
    pub fn from_settings(settings: &RedactionSettings) -> Self {
        let mut store = Self::default();
        for spec in &settings.secrets {
            store.add_spec(spec);
        }
        store
    }

    fn add_spec(&mut self, spec: &SecretSpec) {
        let mask = spec
            .mask
            .clone()
            .unwrap_or_else(|| derive_mask(&spec.value));
        self.add_secret(&spec.value, &mask);
    }

    /// Register a secret value with an explicit mask. Empty values are
    /// ignored (replacing "" would corrupt every payload).
    pub fn add_secret(&mut self, value: &str, mask: &str) {
        if value.is_empty() {
            return;
        }
        self.entries.push((value.to_string(), mask.to_string()));
    }

    /// Replace every occurrence of every known secret.
    pub fn redact(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (value, mask) in &self.entries {
            if out.contains(value.as_str()) {
                out = out.replace(value.as_str(), mask);
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derive a mask from a secret's shape: token-like `head:tail` values keep
/// their numeric head, anything else becomes a fixed placeholder.
fn derive_mask(value: &str) -> String {
    match value.split_once(':') {
        Some((head, _)) => format!("{head}:{}", "*".repeat(26)),
        None => "*".repeat(8),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_replaces_all_occurrences() {
        let mut store = SecretStore::empty();
        store.add_secret("79001234567", "<phone>");
        let out = store.redact("call 79001234567 or 79001234567 now");
        assert_eq!(out, "call <phone> or <phone> now");
    }

    #[test]
    fn test_token_mask_keeps_head() {
        let settings = RedactionSettings {
            secrets: vec![SecretSpec {
                value: "12345678:AAF0abcdef".to_string(),
                mask: None,
            }],
        };
        let store = SecretStore::from_settings(&settings);
        let out = store.redact("token=12345678:AAF0abcdef");
        assert_eq!(out, format!("token=12345678:{}", "*".repeat(26)));
    }

    #[test]
    fn test_plain_secret_fully_masked() {
        let settings = RedactionSettings {
            secrets: vec![SecretSpec {
                value: "1BVtsOKcBu0eCa".to_string(),
                mask: None,
            }],
        };
        let store = SecretStore::from_settings(&settings);
        assert_eq!(store.redact("s=1BVtsOKcBu0eCa"), "s=********");
    }

    #[test]
    fn test_empty_secret_ignored() {
        let mut store = SecretStore::empty();
        store.add_secret("", "nope");
        assert_eq!(store.redact("unchanged"), "unchanged");
    }

    #[test]
    fn test_no_secrets_is_identity() {
        let store = SecretStore::empty();
        assert_eq!(store.redact("text"), "text");
    }
}
