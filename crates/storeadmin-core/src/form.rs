//! Raw posted form data.
//!
//! Admin edit pages post flat key/value pairs. Keys may repeat (multi-selects)
//! and checkboxes arrive as `"true,false"` because a hidden field follows
//! every checkbox. [`FormData`] keeps the raw values and offers typed
//! accessors that report bad input as [`AdminError::InvalidForm`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{AdminError, Result};

/// Multi-valued form fields, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(key, value)` pairs; repeated keys accumulate.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut form = Self::new();
        for (key, value) in pairs {
            form.insert(key, value);
        }
        form
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(key.into()).or_default().push(value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// First raw value of a field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of a field, splitting comma-joined entries and dropping blanks.
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.fields
            .get(key)
            .map(|values| {
                values
                    .iter()
                    .flat_map(|v| v.split(','))
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parse the first value of a field. Missing or blank fields yield `None`.
    pub fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| AdminError::invalid_form(key, format!("cannot parse '{}'", raw))),
        }
    }

    /// Parse every value of a field.
    pub fn parse_all<T: FromStr>(&self, key: &str) -> Result<Vec<T>> {
        self.values(key)
            .into_iter()
            .map(|raw| {
                raw.parse()
                    .map_err(|_| AdminError::invalid_form(key, format!("cannot parse '{}'", raw)))
            })
            .collect()
    }

    /// Checkbox state. `"true,false"` (checked + hidden field) counts as checked.
    pub fn checkbox(&self, key: &str) -> bool {
        self.values(key)
            .first()
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || *v == "on" || *v == "1")
    }

    /// Fields whose name starts with `prefix`, as `(suffix, values)` pairs.
    pub fn with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a [String])> + 'a {
        self.fields
            .iter()
            .filter_map(move |(key, values)| {
                key.strip_prefix(prefix).map(|suffix| (suffix, values.as_slice()))
            })
    }
}
