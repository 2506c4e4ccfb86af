//! Infrastructure features: server pool and failover.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::features::{non_blank, FeatureId, FeatureProducer, Fragment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadBalancing {
    #[default]
    RoundRobin,
    LeastLoad,
    Random,
}

impl LoadBalancing {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadBalancing::RoundRobin => "roundRobin",
            LoadBalancing::LeastLoad => "leastLoad",
            LoadBalancing::Random => "random",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InfrastructureParams {
    pub server_locations: Vec<String>,
    pub load_balancing: LoadBalancing,
    pub failover: bool,
    pub health_check_interval_secs: u32,
}

pub struct Infrastructure;

impl FeatureProducer for Infrastructure {
    type Params = InfrastructureParams;
    const ID: FeatureId = FeatureId::Infrastructure;

    fn produce(params: &Self::Params) -> Fragment {
        let mut fragment = Fragment::new();

        let locations: Vec<Value> = params
            .server_locations
            .iter()
            .filter_map(|loc| non_blank(loc))
            .map(Value::from)
            .collect();
        if !locations.is_empty() {
            fragment.insert("serverLocations", locations);
        }

        fragment.insert("loadBalancing", params.load_balancing.as_str());
        fragment.insert("failover", params.failover);
        if params.health_check_interval_secs > 0 {
            fragment.insert("healthCheckInterval", params.health_check_interval_secs);
        }
        fragment
    }
}
