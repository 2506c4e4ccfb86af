//! Feature modules and their configuration producers.
//!
//! # Data Flow
//! ```text
//! user parameters (FeatureParams)
//!     → producer for that feature (pure, never fails)
//!     → Fragment (flat-to-shallow JSON mapping)
//!     → store replaces the feature's slot in its FragmentSet
//! ```
//!
//! # Design Decisions
//! - FeatureId is a closed set; its declaration order is the merge precedence
//! - Fragments are replaced wholesale, never patched
//! - Producers degrade to smaller fragments instead of failing; validation of
//!   user input happens before parameters reach them

pub mod hyper_performance;
pub mod infrastructure;
pub mod neural_engine;
pub mod quantum_safe;
pub mod stealth;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use hyper_performance::{CongestionControl, HyperPerformance, HyperPerformanceParams};
pub use infrastructure::{Infrastructure, InfrastructureParams, LoadBalancing};
pub use neural_engine::{NeuralEngine, NeuralEngineParams, OptimizationTarget};
pub use quantum_safe::{PqAlgorithm, QuantumSafeSupreme, QuantumSafeSupremeParams};
pub use stealth::{ObfuscationLevel, StealthProMax, StealthProMaxParams};

/// Identifies a feature module and its fragment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureId {
    NeuralEngine,
    HyperPerformance,
    Infrastructure,
    QuantumSafeSupreme,
    StealthProMax,
}

impl FeatureId {
    /// Merge order. Later entries win key collisions.
    pub const PRECEDENCE: [FeatureId; 5] = [
        FeatureId::NeuralEngine,
        FeatureId::HyperPerformance,
        FeatureId::Infrastructure,
        FeatureId::QuantumSafeSupreme,
        FeatureId::StealthProMax,
    ];

    /// Position in [`FeatureId::PRECEDENCE`].
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureId::NeuralEngine => "neuralEngine",
            FeatureId::HyperPerformance => "hyperPerformance",
            FeatureId::Infrastructure => "infrastructure",
            FeatureId::QuantumSafeSupreme => "quantumSafeSupreme",
            FeatureId::StealthProMax => "stealthProMax",
        }
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown feature: {0}")]
pub struct UnknownFeature(pub String);

impl FromStr for FeatureId {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureId::PRECEDENCE
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

/// A feature's partial configuration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Fragment(Map<String, Value>);

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Fragment {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Fragment {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Exactly one fragment per feature, possibly empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FragmentSet {
    slots: [Fragment; 5],
}

impl FragmentSet {
    /// All five slots empty.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, id: FeatureId) -> &Fragment {
        &self.slots[id.index()]
    }

    /// Replace a slot wholesale, returning the previous fragment.
    pub fn replace(&mut self, id: FeatureId, fragment: Fragment) -> Fragment {
        std::mem::replace(&mut self.slots[id.index()], fragment)
    }

    /// Builder-style [`FragmentSet::replace`].
    pub fn with(mut self, id: FeatureId, fragment: Fragment) -> Self {
        self.replace(id, fragment);
        self
    }

    /// Slots in precedence order, lowest first.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, &Fragment)> {
        FeatureId::PRECEDENCE
            .into_iter()
            .map(move |id| (id, self.get(id)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Fragment::is_empty)
    }
}

/// A pure mapping from feature parameters to a fragment.
pub trait FeatureProducer {
    type Params;

    /// The slot this producer fills.
    const ID: FeatureId;

    fn produce(params: &Self::Params) -> Fragment;
}

/// Parameters for one feature. The variant determines the [`FeatureId`].
///
/// Serialized externally tagged by feature name:
/// `{ "stealthProMax": { "obfuscationLevel": "high" } }`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureParams {
    NeuralEngine(NeuralEngineParams),
    HyperPerformance(HyperPerformanceParams),
    Infrastructure(InfrastructureParams),
    QuantumSafeSupreme(QuantumSafeSupremeParams),
    StealthProMax(StealthProMaxParams),
}

impl FeatureParams {
    pub fn id(&self) -> FeatureId {
        match self {
            FeatureParams::NeuralEngine(_) => NeuralEngine::ID,
            FeatureParams::HyperPerformance(_) => HyperPerformance::ID,
            FeatureParams::Infrastructure(_) => Infrastructure::ID,
            FeatureParams::QuantumSafeSupreme(_) => QuantumSafeSupreme::ID,
            FeatureParams::StealthProMax(_) => StealthProMax::ID,
        }
    }

    /// Run the producer for this feature.
    pub fn produce(&self) -> Fragment {
        match self {
            FeatureParams::NeuralEngine(p) => NeuralEngine::produce(p),
            FeatureParams::HyperPerformance(p) => HyperPerformance::produce(p),
            FeatureParams::Infrastructure(p) => Infrastructure::produce(p),
            FeatureParams::QuantumSafeSupreme(p) => QuantumSafeSupreme::produce(p),
            FeatureParams::StealthProMax(p) => StealthProMax::produce(p),
        }
    }

    /// Decode an untagged params body for a known feature.
    pub fn from_json(id: FeatureId, value: Value) -> serde_json::Result<Self> {
        Ok(match id {
            FeatureId::NeuralEngine => FeatureParams::NeuralEngine(serde_json::from_value(value)?),
            FeatureId::HyperPerformance => {
                FeatureParams::HyperPerformance(serde_json::from_value(value)?)
            }
            FeatureId::Infrastructure => {
                FeatureParams::Infrastructure(serde_json::from_value(value)?)
            }
            FeatureId::QuantumSafeSupreme => {
                FeatureParams::QuantumSafeSupreme(serde_json::from_value(value)?)
            }
            FeatureId::StealthProMax => FeatureParams::StealthProMax(serde_json::from_value(value)?),
        })
    }
}

/// Trimmed string, or `None` when blank.
pub(crate) fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_precedence_matches_index() {
        for (i, id) in FeatureId::PRECEDENCE.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn test_feature_id_parse() {
        assert_eq!("stealthProMax".parse::<FeatureId>(), Ok(FeatureId::StealthProMax));
        assert_eq!("NEURALENGINE".parse::<FeatureId>(), Ok(FeatureId::NeuralEngine));
        assert!("warpDrive".parse::<FeatureId>().is_err());

        let wire = serde_json::to_value(FeatureId::QuantumSafeSupreme).unwrap();
        assert_eq!(wire, json!("quantumSafeSupreme"));
    }

    #[test]
    fn test_fragment_set_replace_is_wholesale() {
        let mut set = FragmentSet::empty();
        assert!(set.is_empty());

        let first: Fragment = [("a", json!(1)), ("b", json!(2))].into_iter().collect();
        let second: Fragment = [("c", json!(3))].into_iter().collect();

        set.replace(FeatureId::Infrastructure, first.clone());
        let previous = set.replace(FeatureId::Infrastructure, second.clone());

        assert_eq!(previous, first);
        assert_eq!(set.get(FeatureId::Infrastructure), &second);
        assert!(set.get(FeatureId::Infrastructure).get("a").is_none());
    }

    #[test]
    fn test_fragment_set_iterates_in_precedence_order() {
        let ids: Vec<_> = FragmentSet::empty().iter().map(|(id, _)| id).collect();
        assert_eq!(ids, FeatureId::PRECEDENCE.to_vec());
    }

    #[test]
    fn test_params_tagged_by_feature_name() {
        let params: FeatureParams = serde_json::from_value(json!({
            "hyperPerformance": { "tcpFastOpen": true }
        }))
        .unwrap();
        assert_eq!(params.id(), FeatureId::HyperPerformance);

        let untagged = FeatureParams::from_json(
            FeatureId::StealthProMax,
            json!({ "obfuscationLevel": "maximum" }),
        )
        .unwrap();
        assert_eq!(untagged.id(), FeatureId::StealthProMax);
        assert!(!untagged.produce().is_empty());
    }

    #[test]
    fn test_params_reject_wrong_shape() {
        let err = FeatureParams::from_json(FeatureId::NeuralEngine, json!({ "enabled": "yes" }));
        assert!(err.is_err());
    }
}
