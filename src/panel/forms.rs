//! Form drafts and the store edits a submit turns into.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{Kpi, KpiValue};

/// Transient text inputs of one form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormDraft {
    fields: BTreeMap<String, String>,
}

impl FormDraft {
    /// A draft with every field present and empty.
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| (f.to_string(), String::new())).collect(),
        }
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.fields.insert(field.to_string(), value.into());
    }

    /// The field's text; empty when never set.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    /// Presence check: every required field is non-empty.
    pub fn is_complete(&self, required: &[&str]) -> bool {
        required.iter().all(|f| !self.get(f).trim().is_empty())
    }

    /// Clear every field back to an empty string.
    pub fn reset(&mut self) {
        for value in self.fields.values_mut() {
            value.clear();
        }
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}

/// One optimistic change to the local store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEdit {
    /// Append-or-increment `key` in `series`.
    Bump {
        series: &'static str,
        key: String,
        delta: f64,
        secondary: Option<f64>,
    },
    PushKpi(Kpi),
    SetKpi { title: String, value: KpiValue },
}

impl StoreEdit {
    pub fn bump(series: &'static str, key: impl Into<String>, delta: f64) -> Self {
        StoreEdit::Bump {
            series,
            key: key.into(),
            delta,
            secondary: None,
        }
    }
}

/// What a complete form submits: local edits plus zero or more POST bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub edits: Vec<StoreEdit>,
    /// Bodies POSTed in order to the panel's resource.
    pub remote: Vec<serde_json::Value>,
    /// Banner text if any POST fails.
    pub failure_message: &'static str,
}

impl Submission {
    pub fn local(edits: Vec<StoreEdit>) -> Self {
        Self {
            edits,
            remote: Vec::new(),
            failure_message: "",
        }
    }

    pub fn remote(
        edits: Vec<StoreEdit>,
        remote: Vec<serde_json::Value>,
        failure_message: &'static str,
    ) -> Self {
        Self {
            edits,
            remote,
            failure_message,
        }
    }

    pub fn is_remote(&self) -> bool {
        !self.remote.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_check() {
        let mut draft = FormDraft::new(&["stage", "count"]);
        assert!(!draft.is_complete(&["stage", "count"]));
        draft.set("stage", "Lead");
        draft.set("count", "   ");
        assert!(!draft.is_complete(&["stage", "count"]));
        draft.set("count", "3");
        assert!(draft.is_complete(&["stage", "count"]));
    }

    #[test]
    fn test_reset_keeps_fields_as_empty_strings() {
        let mut draft = FormDraft::new(&["title", "value"]);
        draft.set("title", "NPS");
        draft.set("value", "42");
        draft.reset();
        assert_eq!(draft.fields().len(), 2);
        assert!(draft.fields().values().all(|v| v.is_empty()));
    }
}
