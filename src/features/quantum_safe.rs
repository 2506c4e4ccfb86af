//! Quantum-safe supreme: post-quantum key exchange settings.
//!
//! A non-empty fragment from this feature also triggers the composer's
//! credential augmentation of the primary outbound.

use serde::{Deserialize, Serialize};

use crate::features::{FeatureId, FeatureProducer, Fragment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PqAlgorithm {
    #[default]
    Kyber768,
    Kyber1024,
    Dilithium,
    Falcon,
}

impl PqAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            PqAlgorithm::Kyber768 => "kyber768",
            PqAlgorithm::Kyber1024 => "kyber1024",
            PqAlgorithm::Dilithium => "dilithium",
            PqAlgorithm::Falcon => "falcon",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuantumSafeSupremeParams {
    pub algorithm: PqAlgorithm,
    /// Combine the classical X25519 exchange with the post-quantum one.
    pub hybrid_mode: bool,
    pub key_rotation_minutes: u32,
}

pub struct QuantumSafeSupreme;

impl FeatureProducer for QuantumSafeSupreme {
    type Params = QuantumSafeSupremeParams;
    const ID: FeatureId = FeatureId::QuantumSafeSupreme;

    fn produce(params: &Self::Params) -> Fragment {
        let mut fragment = Fragment::new();
        let algorithm = params.algorithm.as_str();

        let key_exchange = if params.hybrid_mode {
            format!("x25519+{algorithm}")
        } else {
            algorithm.to_string()
        };

        fragment.insert("pqAlgorithm", algorithm);
        fragment.insert("hybridMode", params.hybrid_mode);
        fragment.insert("keyExchange", key_exchange);
        if params.key_rotation_minutes > 0 {
            fragment.insert("keyRotationInterval", params.key_rotation_minutes);
        }
        fragment
    }
}
