// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeMap;

/// A store's diagnostic report, grouped into named sections of `field: value` pairs.
///
/// Section names are lowercase (`keyspace`, `stats`, ...). Values are kept as the raw text the
/// store sent; interpreting them is up to the consumer.
///
/// # Examples
///
/// ```
/// use remcache_store::InfoReport;
///
/// let report = InfoReport::parse("# Keyspace\r\ndb0:keys=3,expires=0,avg_ttl=0\r\n");
/// assert_eq!(report.field("keyspace", "db0"), Some("keys=3,expires=0,avg_ttl=0"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoReport {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl InfoReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the line-oriented text format used by Redis `INFO`.
    ///
    /// `# Name` lines open a section; `field:value` lines belong to the current section. Fields
    /// before the first header land in a section named `default`. Other lines are ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut report = Self::new();
        let mut section = String::from("default");

        for line in text.lines().map(str::trim) {
            if let Some(header) = line.strip_prefix('#') {
                section = header.trim().to_ascii_lowercase();
            } else if let Some((field, value)) = line.split_once(':') {
                report.insert(&section, field, value);
            }
        }

        report
    }

    /// Sets `field` in `section`, replacing any previous value.
    pub fn insert(&mut self, section: &str, field: impl Into<String>, value: impl Into<String>) {
        let _previous = self
            .sections
            .entry(section.to_ascii_lowercase())
            .or_default()
            .insert(field.into(), value.into());
    }

    /// Returns all fields of a section.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&BTreeMap<String, String>> {
        self.sections.get(name)
    }

    /// Returns a single field of a section.
    #[must_use]
    pub fn field(&self, section: &str, field: &str) -> Option<&str> {
        self.section(section)?.get(field).map(String::as_str)
    }

    /// Iterates over section names in order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}
