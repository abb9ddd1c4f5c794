//! Entry categories (genres, audiences, subject schemes).

/// A category attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category {
    /// Machine-readable term within the scheme
    pub term: String,
    /// URI identifying the categorization scheme
    pub scheme: String,
    /// Human-readable label, if the feed supplied one
    pub label: Option<String>,
}

impl Category {
    /// Create a category without a label.
    #[must_use]
    pub fn new(term: impl Into<String>, scheme: impl Into<String>) -> Self {
        Category {
            term: term.into(),
            scheme: scheme.into(),
            label: None,
        }
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label if present, otherwise the term.
    #[must_use]
    pub fn effective_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.term)
    }
}
