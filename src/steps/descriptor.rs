//! Step descriptors as they appear in the `steps` list.
//!
//! A descriptor is either a bare step name or a single-key mapping whose
//! value is the step's payload:
//!
//! ```yaml
//! steps:
//!   - RunJest
//!   - InstallPackages: ["04t000000000001", "04t000000000002"]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{BuilderError, Result};

/// One entry of the ordered step list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepDescriptor {
    /// `- StepName`
    Name(String),

    /// `- StepName: payload`
    ///
    /// Only well-formed with exactly one key. The check happens when the
    /// run reaches the entry, not when the config is parsed.
    Mapping(BTreeMap<String, Value>),
}

impl StepDescriptor {
    /// Descriptor for a bare step name.
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Descriptor carrying a payload.
    pub fn with_data(name: impl Into<String>, data: Value) -> Self {
        Self::Mapping(BTreeMap::from([(name.into(), data)]))
    }

    /// Split into step name and optional payload.
    ///
    /// `index` is the descriptor's position in the run and only feeds the
    /// error message.
    pub fn resolve(&self, index: usize) -> Result<(&str, Option<&Value>)> {
        match self {
            Self::Name(name) => Ok((name.as_str(), None)),
            Self::Mapping(map) => {
                let mut entries = map.iter();
                match (entries.next(), entries.next()) {
                    (Some((name, data)), None) => Ok((name.as_str(), Some(data))),
                    _ => Err(BuilderError::MalformedStep {
                        index,
                        keys: map.keys().cloned().collect(),
                    }),
                }
            }
        }
    }

    /// Name used in listings; malformed mappings show all their keys.
    pub fn display_name(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Mapping(map) => map.keys().cloned().collect::<Vec<_>>().join("+"),
        }
    }
}

impl From<&str> for StepDescriptor {
    fn from(name: &str) -> Self {
        Self::name(name)
    }
}

impl std::fmt::Display for StepDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(yaml: &str) -> Vec<StepDescriptor> {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn bare_name_has_no_payload() {
        let steps = parse("- RunJest\n");
        let (name, data) = steps[0].resolve(0).unwrap();
        assert_eq!(name, "RunJest");
        assert!(data.is_none());
    }

    #[test]
    fn single_key_mapping_carries_payload() {
        let steps = parse("- InstallPackages: [a, b]\n");
        let (name, data) = steps[0].resolve(0).unwrap();
        assert_eq!(name, "InstallPackages");
        assert_eq!(data, Some(&json!(["a", "b"])));
    }

    #[test]
    fn two_keys_are_malformed() {
        let steps = parse("- {A: 1, B: 2}\n");
        let err = steps[0].resolve(3).unwrap_err();
        match err {
            BuilderError::MalformedStep { index, keys } => {
                assert_eq!(index, 3);
                assert_eq!(keys, vec!["A", "B"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_mapping_is_malformed() {
        let steps = parse("- {}\n");
        assert!(matches!(
            steps[0].resolve(0),
            Err(BuilderError::MalformedStep { .. })
        ));
    }

    #[test]
    fn malformed_entries_still_parse() {
        // Parsing must not fail; the run reports it when it gets there.
        let steps = parse("- RunJest\n- {A: 1, B: 2}\n- QuitSuccess\n");
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[1].display_name(), "A+B");
    }

    #[test]
    fn with_data_round_trips_through_resolve() {
        let step = StepDescriptor::with_data("PublishCommunity", json!("Partners"));
        let (name, data) = step.resolve(0).unwrap();
        assert_eq!(name, "PublishCommunity");
        assert_eq!(data, Some(&json!("Partners")));
    }
}
