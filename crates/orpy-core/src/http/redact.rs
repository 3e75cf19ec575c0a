//! Redaction of sensitive values before they reach the logs
//!
//! Values are replaced in place by a one-way digest of their contents (or by
//! a fixed text), so two log lines can still be correlated without exposing
//! the credential itself.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Digest used to mask redacted values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// `{SHA1}<hex>`, the format historically written by orpy
    #[default]
    Sha1,
    /// `{SHA256}<hex>`
    Sha256,
}

impl DigestAlgorithm {
    /// Prefix written in front of the hex digest
    pub fn prefix(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "{SHA1}",
            DigestAlgorithm::Sha256 => "{SHA256}",
        }
    }

    /// Digest `input` and return the prefixed hex form
    pub fn digest(&self, input: &str) -> String {
        let hex = match self {
            DigestAlgorithm::Sha1 => hex::encode(Sha1::digest(input.as_bytes())),
            DigestAlgorithm::Sha256 => hex::encode(Sha256::digest(input.as_bytes())),
        };
        format!("{}{}", self.prefix(), hex)
    }
}

/// Replaces values located by a key path inside JSON documents
#[derive(Debug, Clone, Copy, Default)]
pub struct Redactor {
    algorithm: DigestAlgorithm,
}

impl Redactor {
    /// Create a redactor using the given digest
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    /// The digest in use
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Redact the value at `path` inside `target`, in place.
    ///
    /// All keys but the last are followed to find the containing mapping; if
    /// any of them is missing nothing happens. When the final key exists its
    /// value is set to `replacement` if one is given, otherwise a non-null
    /// value is replaced by its digest. Null values are left untouched.
    pub fn redact(&self, target: &mut Value, path: &[&str], replacement: Option<&str>) {
        let Some((key, parents)) = path.split_last() else {
            return;
        };

        let mut current = target;
        for parent in parents {
            match current.get_mut(*parent) {
                Some(next) => current = next,
                None => return,
            }
        }

        let Some(value) = current.as_object_mut().and_then(|map| map.get_mut(*key)) else {
            return;
        };

        if let Some(text) = replacement {
            *value = Value::String(text.to_string());
        } else if !value.is_null() {
            let plain = match &*value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            *value = Value::String(self.algorithm.digest(&plain));
        }
    }
}

/// Redact `path` in `target` with the default SHA-1 digest
pub fn redact(target: &mut Value, path: &[&str], replacement: Option<&str>) {
    Redactor::default().redact(target, path, replacement);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    // sha1("secret")
    const SECRET_SHA1: &str = "e5e9fa1ba31ecd1ae84f75caaa474f3a663f05f4";

    #[test]
    fn test_nested_value_is_hashed() {
        let mut doc = json!({"a": {"b": "secret"}});
        redact(&mut doc, &["a", "b"], None);
        assert_eq!(doc, json!({"a": {"b": format!("{{SHA1}}{}", SECRET_SHA1)}}));
    }

    #[test]
    fn test_missing_key_is_noop() {
        let mut doc = json!({"a": {}});
        redact(&mut doc, &["a", "b"], None);
        assert_eq!(doc, json!({"a": {}}));

        let mut doc = json!({"x": {"b": "secret"}});
        redact(&mut doc, &["a", "b"], None);
        assert_eq!(doc, json!({"x": {"b": "secret"}}));
    }

    #[test]
    fn test_null_is_left_alone() {
        let mut doc = json!({"a": {"b": null}});
        redact(&mut doc, &["a", "b"], None);
        assert_eq!(doc, json!({"a": {"b": null}}));
    }

    #[test]
    fn test_replacement_text() {
        let mut doc = json!({"Authorization": "Bearer abc"});
        redact(&mut doc, &["Authorization"], Some("<redacted>"));
        assert_eq!(doc, json!({"Authorization": "<redacted>"}));

        // replacement text also overwrites nulls
        let mut doc = json!({"token": null});
        redact(&mut doc, &["token"], Some("***"));
        assert_eq!(doc, json!({"token": "***"}));
    }

    #[test]
    fn test_second_pass_hashes_the_hash() {
        let mut once = json!({"token": "secret"});
        redact(&mut once, &["token"], None);
        let mut twice = once.clone();
        redact(&mut twice, &["token"], None);
        assert_ne!(once, twice);

        let mut again = json!({"token": "secret"});
        redact(&mut again, &["token"], None);
        assert_eq!(once, again);
    }

    #[test]
    fn test_non_string_values_hash_their_json_text() {
        let mut doc = json!({"id": 42});
        redact(&mut doc, &["id"], None);
        assert_eq!(doc["id"], json!(DigestAlgorithm::Sha1.digest("42")));
    }

    #[test]
    fn test_sha256() {
        let redactor = Redactor::new(DigestAlgorithm::Sha256);
        let mut doc = json!({"token": "secret"});
        redactor.redact(&mut doc, &["token"], None);
        assert_eq!(
            doc["token"],
            "{SHA256}2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
        );
    }

    #[test]
    fn test_intermediate_non_object() {
        let mut doc = json!({"a": "flat"});
        redact(&mut doc, &["a", "b"], None);
        assert_eq!(doc, json!({"a": "flat"}));
    }

    #[test]
    fn test_empty_path() {
        let mut doc = json!({"a": 1});
        redact(&mut doc, &[], None);
        assert_eq!(doc, json!({"a": 1}));
    }
}
