//! Suggest a transport protocol for hostile networks.
//!
//! Preference tables, most preferred first:
//!
//! | Condition     | Order                                                   |
//! |---------------|---------------------------------------------------------|
//! | DPI           | reality, trojan, vless, vmess, shadowsocks              |
//! | UDP blocked   | trojan, vless, vmess, shadowsocks, hysteria2, wireguard |
//! | Throttling    | hysteria2, vless, trojan, shadowsocks, vmess            |
//! | Clean network | wireguard, vless, shadowsocks, trojan, vmess            |

use serde::{Deserialize, Serialize};

use super::{Advisor, ConditionFlags, InvocationError};

const DPI: &[&str] = &["reality", "trojan", "vless", "vmess", "shadowsocks"];
const UDP_BLOCKED: &[&str] = &["trojan", "vless", "vmess", "shadowsocks", "hysteria2", "wireguard"];
const THROTTLING: &[&str] = &["hysteria2", "vless", "trojan", "shadowsocks", "vmess"];
const CLEAN: &[&str] = &["wireguard", "vless", "shadowsocks", "trojan", "vmess"];

/// UDP transports, never suggested when UDP is blocked.
const UDP_ONLY: &[&str] = &["hysteria2", "wireguard"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolSwitchInput {
    pub current_protocol: String,
    #[serde(default)]
    pub network_conditions: String,
    pub available_protocols: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolSwitchOutput {
    pub suggested_protocol: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProtocolSwitchAdvisor;

impl Advisor for ProtocolSwitchAdvisor {
    type Input = ProtocolSwitchInput;
    type Output = ProtocolSwitchOutput;

    fn invoke(&self, input: &ProtocolSwitchInput) -> Result<ProtocolSwitchOutput, InvocationError> {
        let available: Vec<String> = input
            .available_protocols
            .iter()
            .map(|p| p.trim().to_ascii_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        if available.is_empty() {
            return Err(InvocationError::NoCandidate("no protocols available"));
        }

        let flags = ConditionFlags::parse(&input.network_conditions);
        let (table, condition) = if flags.dpi {
            (DPI, "deep packet inspection")
        } else if flags.udp_blocked {
            (UDP_BLOCKED, "UDP blocking")
        } else if flags.throttling {
            (THROTTLING, "throttling")
        } else {
            (CLEAN, "an unrestricted network")
        };

        let usable = |p: &&str| !(flags.udp_blocked && UDP_ONLY.contains(p));
        let ranked = table
            .iter()
            .filter(|p| usable(*p))
            .find(|p| available.iter().any(|a| a == **p));

        let current = input.current_protocol.trim().to_ascii_lowercase();
        let output = match ranked {
            Some(&p) if p == current => ProtocolSwitchOutput {
                suggested_protocol: current,
                reason: format!("{p} is already the best available choice for {condition}"),
            },
            Some(&p) => ProtocolSwitchOutput {
                suggested_protocol: p.to_string(),
                reason: format!("{p} is preferred over {current} under {condition}"),
            },
            None => {
                let fallback = available
                    .iter()
                    .find(|p| usable(&p.as_str()))
                    .ok_or(InvocationError::NoCandidate("only UDP protocols available while UDP is blocked"))?;
                ProtocolSwitchOutput {
                    suggested_protocol: fallback.clone(),
                    reason: format!("no ranked protocol available for {condition}, falling back to {fallback}"),
                }
            }
        };
        Ok(output)
    }
}
