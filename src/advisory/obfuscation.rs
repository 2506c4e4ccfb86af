//! Traffic obfuscation recommendation.

use serde::{Deserialize, Serialize};

use super::{Advisor, ConditionFlags, InvocationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnonymityLevel {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObfuscationInput {
    pub network_conditions: String,
    #[serde(default)]
    pub desired_anonymity_level: AnonymityLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObfuscationOutput {
    pub protocol_recommendation: String,
    pub stealth_mode_enabled: bool,
    pub configuration_details: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObfuscationAdvisor;

impl Advisor for ObfuscationAdvisor {
    type Input = ObfuscationInput;
    type Output = ObfuscationOutput;

    fn invoke(&self, input: &ObfuscationInput) -> Result<ObfuscationOutput, InvocationError> {
        if input.network_conditions.trim().is_empty() {
            return Err(InvocationError::InvalidInput(
                "networkConditions must describe the network".into(),
            ));
        }

        let flags = ConditionFlags::parse(&input.network_conditions);
        let level = input.desired_anonymity_level;
        let hostile = flags.dpi || flags.udp_blocked;

        let (protocol, mut details) = if hostile {
            (
                "vless+reality",
                vec!["TCP transport on port 443 with a borrowed TLS handshake", "uTLS chrome fingerprint"],
            )
        } else if flags.throttling {
            ("trojan+grpc", vec!["gRPC multi-stream transport over TLS", "uTLS firefox fingerprint"])
        } else if level == AnonymityLevel::High {
            ("vless+tls", vec!["WebSocket transport behind a CDN", "uTLS randomized fingerprint"])
        } else {
            ("shadowsocks-2022", vec!["aes-256-gcm cipher with UDP relay"])
        };

        let stealth_mode_enabled = hostile || level == AnonymityLevel::High;
        if stealth_mode_enabled {
            details.push("traffic padding enabled");
        }
        if level == AnonymityLevel::High {
            details.push("multiplexing disabled to avoid flow correlation");
        }

        Ok(ObfuscationOutput {
            protocol_recommendation: protocol.to_string(),
            stealth_mode_enabled,
            configuration_details: details.join("; "),
        })
    }
}
