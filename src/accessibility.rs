//! Accessibility metadata (schema.org / EPUB Accessibility).

/// Accessibility summary of an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Accessibility {
    /// Supported ways of reading, e.g. `"textual"`, `"auditory"`
    pub ways_of_reading: Vec<String>,
    /// Conformance statements, e.g. `"EPUB Accessibility 1.1 - WCAG 2.1 Level AA"`
    pub conforms_to: Vec<String>,
}

impl Accessibility {
    /// True when neither list has any values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ways_of_reading.is_empty() && self.conforms_to.is_empty()
    }
}
