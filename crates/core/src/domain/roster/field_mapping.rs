use serde::Deserialize;

use super::merge_policy::MergePolicy;

/// Copies one form column into one management column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldMapping {
    /// Header of the form response column.
    pub source: String,
    /// Header of the management sheet column.
    pub target: String,
    #[serde(default)]
    pub policy: MergePolicy,
    /// Tolerate the source column being absent from the form sheet.
    #[serde(default)]
    pub optional: bool,
}

impl FieldMapping {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            policy: MergePolicy::default(),
            optional: false,
        }
    }

    pub fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}
