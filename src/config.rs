//! Options for persisted stores.

use serde::{Deserialize, Serialize};

/// How values are rendered as JSON text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Two-space indented output.
    #[default]
    Pretty,
    /// Single-line output.
    Compact,
}

/// What to do when an existing entry does not decode into the store's type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptEntryPolicy {
    /// Refuse to create the store and return
    /// [`Error::Deserialization`](crate::Error::Deserialization).
    #[default]
    FailFast,
    /// Overwrite the entry with the encoded default and continue.
    ResetToInitial,
}

/// Settings for a [`PersistedStore`](crate::PersistedStore).
///
/// ```
/// use keepsake::{CorruptEntryPolicy, Format, PersistOptions};
///
/// let options = PersistOptions::default()
///     .format(Format::Compact)
///     .on_corrupt(CorruptEntryPolicy::ResetToInitial);
/// assert!(options.verify_round_trip);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistOptions {
    pub format: Format,
    pub on_corrupt: CorruptEntryPolicy,
    /// Decode every encoded value back into the store's type before writing
    /// it. Catches values JSON cannot carry faithfully, such as non-finite
    /// floats, which `serde_json` writes as `null`.
    pub verify_round_trip: bool,
}

impl Default for PersistOptions {
    fn default() -> Self {
        Self {
            format: Format::Pretty,
            on_corrupt: CorruptEntryPolicy::FailFast,
            verify_round_trip: true,
        }
    }
}

impl PersistOptions {
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn on_corrupt(mut self, policy: CorruptEntryPolicy) -> Self {
        self.on_corrupt = policy;
        self
    }

    pub fn verify_round_trip(mut self, verify: bool) -> Self {
        self.verify_round_trip = verify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let options: PersistOptions = serde_json::from_str(r#"{ "format": "compact" }"#).unwrap();
        assert_eq!(options.format, Format::Compact);
        assert_eq!(options.on_corrupt, CorruptEntryPolicy::FailFast);
        assert!(options.verify_round_trip);
    }

    #[test]
    fn policy_names_are_snake_case() {
        let json = serde_json::to_string(&CorruptEntryPolicy::ResetToInitial).unwrap();
        assert_eq!(json, "\"reset_to_initial\"");
    }
}
