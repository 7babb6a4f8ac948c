//! Merge policy definitions.
//!
//! [`SynthesisMode`] is the user-facing policy name stored in configuration.
//! [`MergeStrategy`] is the mode resolved against a concrete response set,
//! carrying the effective intersection threshold.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Merge policy applied by the synthesizer model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisMode {
    /// Keep every piece of information, drop duplicates, flag conflicts.
    #[default]
    Union,
    /// Keep only content corroborated by at least `threshold` models.
    Intersection,
    /// Keep only the most valuable, directly relevant content.
    Selective,
}

impl SynthesisMode {
    pub const ALL: [SynthesisMode; 3] = [
        SynthesisMode::Union,
        SynthesisMode::Intersection,
        SynthesisMode::Selective,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SynthesisMode::Union => "union",
            SynthesisMode::Intersection => "intersection",
            SynthesisMode::Selective => "selective",
        }
    }

    /// Sampling temperature for the merge call when none is configured.
    pub fn default_temperature(&self) -> f64 {
        match self {
            SynthesisMode::Union => 0.3,
            SynthesisMode::Intersection => 0.2,
            SynthesisMode::Selective => 0.4,
        }
    }

    /// Parse a configured mode, mapping anything unrecognised to [`SynthesisMode::Union`].
    ///
    /// The second element is `false` when the input was not a known mode so
    /// the caller can report it.
    pub fn parse_lenient(s: &str) -> (Self, bool) {
        match s.parse() {
            Ok(mode) => (mode, true),
            Err(_) => (SynthesisMode::Union, false),
        }
    }

    /// Resolve the mode against `response_count` completed responses.
    ///
    /// `threshold` is only consulted for [`SynthesisMode::Intersection`];
    /// when absent the threshold is derived with [`derived_threshold`].
    pub fn resolve(&self, threshold: Option<u32>, response_count: usize) -> MergeStrategy {
        match self {
            SynthesisMode::Union => MergeStrategy::Union,
            SynthesisMode::Selective => MergeStrategy::Selective,
            SynthesisMode::Intersection => MergeStrategy::Intersection {
                threshold: threshold.unwrap_or_else(|| derived_threshold(response_count)),
            },
        }
    }
}

impl fmt::Display for SynthesisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error for mode strings outside the closed set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown synthesis mode '{0}' (expected union, intersection or selective)")]
pub struct UnknownModeError(pub String);

impl FromStr for SynthesisMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "union" => Ok(SynthesisMode::Union),
            "intersection" => Ok(SynthesisMode::Intersection),
            "selective" => Ok(SynthesisMode::Selective),
            other => Err(UnknownModeError(other.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for SynthesisMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SynthesisMode::parse_lenient(&s).0)
    }
}

/// Minimum number of corroborating models when no threshold is configured:
/// `max(2, ceil(n / 2))`.
pub fn derived_threshold(response_count: usize) -> u32 {
    let half = response_count.div_ceil(2);
    u32::try_from(half).unwrap_or(u32::MAX).max(2)
}

/// A merge mode resolved for one synthesis call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    Union,
    Intersection { threshold: u32 },
    Selective,
}

impl MergeStrategy {
    pub fn mode(&self) -> SynthesisMode {
        match self {
            MergeStrategy::Union => SynthesisMode::Union,
            MergeStrategy::Intersection { .. } => SynthesisMode::Intersection,
            MergeStrategy::Selective => SynthesisMode::Selective,
        }
    }

    pub fn threshold(&self) -> Option<u32> {
        match self {
            MergeStrategy::Intersection { threshold } => Some(*threshold),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_threshold() {
        assert_eq!(derived_threshold(0), 2);
        assert_eq!(derived_threshold(1), 2);
        assert_eq!(derived_threshold(2), 2);
        assert_eq!(derived_threshold(3), 2);
        assert_eq!(derived_threshold(4), 2);
        assert_eq!(derived_threshold(5), 3);
        assert_eq!(derived_threshold(8), 4);
    }

    #[test]
    fn test_parse_known_modes() {
        for mode in SynthesisMode::ALL {
            assert_eq!(mode.as_str().parse::<SynthesisMode>().unwrap(), mode);
        }
        assert_eq!(
            " Intersection ".parse::<SynthesisMode>().unwrap(),
            SynthesisMode::Intersection
        );
    }

    #[test]
    fn test_unknown_mode_defaults_to_union() {
        assert_eq!(
            SynthesisMode::parse_lenient("consensus"),
            (SynthesisMode::Union, false)
        );
        assert_eq!(
            SynthesisMode::parse_lenient("selective"),
            (SynthesisMode::Selective, true)
        );
        let mode: SynthesisMode = serde_json::from_str("\"majority\"").unwrap();
        assert_eq!(mode, SynthesisMode::Union);
    }

    #[test]
    fn test_default_temperatures() {
        assert_eq!(SynthesisMode::Union.default_temperature(), 0.3);
        assert_eq!(SynthesisMode::Intersection.default_temperature(), 0.2);
        assert_eq!(SynthesisMode::Selective.default_temperature(), 0.4);
    }

    #[test]
    fn test_resolve_uses_explicit_threshold() {
        assert_eq!(
            SynthesisMode::Intersection.resolve(Some(2), 1),
            MergeStrategy::Intersection { threshold: 2 }
        );
        assert_eq!(
            SynthesisMode::Intersection.resolve(None, 5),
            MergeStrategy::Intersection { threshold: 3 }
        );
        assert_eq!(SynthesisMode::Union.resolve(Some(4), 5), MergeStrategy::Union);
        assert_eq!(MergeStrategy::Selective.threshold(), None);
    }

    #[test]
    fn test_serialize_lowercase() {
        let json = serde_json::to_string(&SynthesisMode::Selective).unwrap();
        assert_eq!(json, "\"selective\"");
    }
}
