//! AI neural engine: adaptive routing hints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::features::{FeatureId, FeatureProducer, Fragment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationTarget {
    Latency,
    Throughput,
    #[default]
    Balanced,
}

impl OptimizationTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationTarget::Latency => "latency",
            OptimizationTarget::Throughput => "throughput",
            OptimizationTarget::Balanced => "balanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NeuralEngineParams {
    pub enabled: bool,
    pub optimization_target: OptimizationTarget,
    pub adaptive_routing: bool,
    pub traffic_prediction: bool,
}

pub struct NeuralEngine;

impl FeatureProducer for NeuralEngine {
    type Params = NeuralEngineParams;
    const ID: FeatureId = FeatureId::NeuralEngine;

    fn produce(params: &Self::Params) -> Fragment {
        let mut fragment = Fragment::new();
        if !params.enabled {
            return fragment;
        }

        let strategy = if params.adaptive_routing { "adaptive" } else { "static" };

        fragment.insert("aiEngine", "enabled");
        fragment.insert("optimizationTarget", params.optimization_target.as_str());
        fragment.insert("adaptiveRouting", params.adaptive_routing);
        fragment.insert("trafficPrediction", params.traffic_prediction);
        fragment.insert("routingStrategy", Value::from(strategy));
        fragment
    }
}
