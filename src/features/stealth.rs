//! Stealth technology pro max: obfuscation and TLS camouflage.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::features::{non_blank, FeatureId, FeatureProducer, Fragment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObfuscationLevel {
    Low,
    #[default]
    Medium,
    High,
    Maximum,
}

impl ObfuscationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObfuscationLevel::Low => "low",
            ObfuscationLevel::Medium => "medium",
            ObfuscationLevel::High => "high",
            ObfuscationLevel::Maximum => "maximum",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StealthProMaxParams {
    pub obfuscation_level: ObfuscationLevel,
    /// uTLS client fingerprint, e.g. `chrome`.
    pub fingerprint: String,
    pub server_name: String,
    pub domain_fronting: bool,
    pub traffic_padding: bool,
}

pub struct StealthProMax;

impl FeatureProducer for StealthProMax {
    type Params = StealthProMaxParams;
    const ID: FeatureId = FeatureId::StealthProMax;

    fn produce(params: &Self::Params) -> Fragment {
        let mut fragment = Fragment::new();
        let level = params.obfuscation_level;

        fragment.insert("obfuscationLevel", level.as_str());
        if let Some(fingerprint) = non_blank(&params.fingerprint) {
            fragment.insert("fingerprint", fingerprint);
        }
        if let Some(server_name) = non_blank(&params.server_name) {
            fragment.insert("serverName", server_name);
        }
        fragment.insert("domainFronting", params.domain_fronting);
        fragment.insert("trafficPadding", params.traffic_padding);

        if level >= ObfuscationLevel::High {
            fragment.insert("routingStrategy", "stealth");
        }
        // Mux framing is fingerprintable.
        if level == ObfuscationLevel::Maximum {
            fragment.insert("mux", json!({ "enabled": false }));
        }
        fragment
    }
}
