use std::collections::HashMap;

use crate::error::{RuntimeError, RuntimeResult};

/// Built-in English messages. Placeholders are `{name}`.
const ENGLISH: &[(&str, &str)] = &[
    ("stage", "Stage"),
    ("new-sprite-position", "New position for {name}: x={x} y={y}"),
    ("new-sprite-rotation", "New direction for {name}: {rot}"),
    ("new-sprite-costume", "New costume for {name}: {costume}"),
    ("waiting", "Waiting for {ms} ms"),
    ("handling-key", "Handling key {key}"),
    ("unknown-opcode", "Unknown opcode: {opcode}"),
    ("unknown-goto-target", "Cannot go to {to} from {name}"),
    ("project-log", "PROJECT LOG: {message}"),
    ("project-warn", "PROJECT WARN: {message}"),
    ("project-error", "PROJECT ERROR: {message}"),
    ("target-halted", "Stopped {name}: {error}"),
    ("script-aborted", "Script in {name} aborted: {error}"),
];

/// Message catalog for diagnostic text.
///
/// Lookups never fail: an unknown key comes back as the key itself so a
/// missing translation can never change what a program does.
#[derive(Clone, Debug)]
pub struct Catalog {
    language: String,
    messages: HashMap<String, String>,
}

impl Catalog {
    pub fn english() -> Self {
        Self {
            language: "en".to_string(),
            messages: ENGLISH
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Build a catalog from a flat JSON object of `key -> template`.
    ///
    /// Keys absent from the document fall back to English.
    pub fn from_json_str(language: &str, json: &str) -> RuntimeResult<Self> {
        let overrides: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| RuntimeError::project(format!("invalid catalog '{language}': {e}")))?;
        let mut catalog = Self::english();
        catalog.language = language.to_string();
        catalog.messages.extend(overrides);
        Ok(catalog)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Render `key`, replacing each `{name}` with its value from `params`.
    pub fn text(&self, key: &str, params: &[(&str, &dyn std::fmt::Display)]) -> String {
        let Some(template) = self.messages.get(key) else {
            return key.to_string();
        };
        let mut out = template.clone();
        for (name, value) in params {
            out = out.replace(&format!("{{{name}}}"), &value.to_string());
        }
        out
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::english()
    }
}
