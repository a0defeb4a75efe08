use std::collections::BTreeSet;

use serde::Deserialize;
use strum::{Display, EnumString};

/// How an incoming form value is combined with the value already stored in
/// the management sheet. An empty incoming value never erases stored data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MergePolicy {
    /// The latest non-empty submission replaces the stored value.
    #[default]
    LastWriteWins,
    /// Comma separated set union, sorted, joined with `", "`.
    Union,
}

impl MergePolicy {
    /// # Examples
    /// ```
    /// use roster_sync_core::domain::roster::MergePolicy;
    /// assert_eq!(MergePolicy::LastWriteWins.merge("old", "new"), "new");
    /// assert_eq!(MergePolicy::LastWriteWins.merge("old", "  "), "old");
    /// assert_eq!(MergePolicy::Union.merge("b, a", "c,a"), "a, b, c");
    /// ```
    pub fn merge(&self, current: &str, incoming: &str) -> String {
        let incoming = incoming.trim();
        if incoming.is_empty() {
            return current.to_owned();
        }

        match self {
            MergePolicy::LastWriteWins => incoming.to_owned(),
            MergePolicy::Union => {
                let items: BTreeSet<&str> = current
                    .split(',')
                    .chain(incoming.split(','))
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .collect();
                items.into_iter().collect::<Vec<_>>().join(", ")
            }
        }
    }
}
