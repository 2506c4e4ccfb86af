//! Advisory helpers.
//!
//! # Data Flow
//! ```text
//! operator input (location, observed metrics, candidate servers, ...)
//!     → Advisor::invoke (stateless, deterministic)
//!     → recommendation shown to the operator
//! ```
//!
//! # Design Decisions
//! - One-way: recommendations are never fed into the store; an operator
//!   applies them by submitting feature params
//! - Heuristics read free-form condition text through `ConditionFlags`
//! - Bad input fails with `InvocationError` instead of a guess

pub mod network_health;
pub mod obfuscation;
pub mod protocol_switching;
pub mod relay_chain;
pub mod server_selection;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use network_health::{NetworkHealthAdvisor, NetworkHealthInput, NetworkHealthOutput};
pub use obfuscation::{AnonymityLevel, ObfuscationAdvisor, ObfuscationInput, ObfuscationOutput};
pub use protocol_switching::{ProtocolSwitchAdvisor, ProtocolSwitchInput, ProtocolSwitchOutput};
pub use relay_chain::{RelayChainAdvisor, RelayChainInput, RelayChainOutput};
pub use server_selection::{ServerSelectionAdvisor, ServerSelectionInput, ServerSelectionOutput};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no candidate available: {0}")]
    NoCandidate(&'static str),
}

/// A stateless recommendation function.
pub trait Advisor {
    type Input: DeserializeOwned;
    type Output: Serialize;

    fn invoke(&self, input: &Self::Input) -> Result<Self::Output, InvocationError>;
}

/// The advisors exposed by name over the admin API and CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdvisorKind {
    ServerSelection,
    RelayChain,
    ProtocolSwitching,
    TrafficObfuscation,
    NetworkHealth,
}

impl AdvisorKind {
    pub const ALL: [AdvisorKind; 5] = [
        AdvisorKind::ServerSelection,
        AdvisorKind::RelayChain,
        AdvisorKind::ProtocolSwitching,
        AdvisorKind::TrafficObfuscation,
        AdvisorKind::NetworkHealth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisorKind::ServerSelection => "server-selection",
            AdvisorKind::RelayChain => "relay-chain",
            AdvisorKind::ProtocolSwitching => "protocol-switching",
            AdvisorKind::TrafficObfuscation => "traffic-obfuscation",
            AdvisorKind::NetworkHealth => "network-health",
        }
    }

    /// Decode `input`, run the advisor, encode its output.
    pub fn invoke_json(&self, input: Value) -> Result<Value, AdvisoryError> {
        match self {
            AdvisorKind::ServerSelection => run_json(&ServerSelectionAdvisor, input),
            AdvisorKind::RelayChain => run_json(&RelayChainAdvisor, input),
            AdvisorKind::ProtocolSwitching => run_json(&ProtocolSwitchAdvisor, input),
            AdvisorKind::TrafficObfuscation => run_json(&ObfuscationAdvisor, input),
            AdvisorKind::NetworkHealth => run_json(&NetworkHealthAdvisor, input),
        }
    }
}

impl fmt::Display for AdvisorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown advisor: {0}")]
pub struct UnknownAdvisor(pub String);

impl FromStr for AdvisorKind {
    type Err = UnknownAdvisor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdvisorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownAdvisor(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("malformed advisor input: {0}")]
    Decode(#[source] serde_json::Error),

    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error("cannot encode advisor output: {0}")]
    Encode(#[source] serde_json::Error),
}

fn run_json<A: Advisor>(advisor: &A, input: Value) -> Result<Value, AdvisoryError> {
    let input: A::Input = serde_json::from_value(input).map_err(AdvisoryError::Decode)?;
    let output = advisor.invoke(&input)?;
    serde_json::to_value(output).map_err(AdvisoryError::Encode)
}

/// Observed server load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerLoad {
    #[default]
    Low,
    Medium,
    High,
}

impl ServerLoad {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerLoad::Low => "low",
            ServerLoad::Medium => "medium",
            ServerLoad::High => "high",
        }
    }

    fn penalty_ms(self) -> u32 {
        match self {
            ServerLoad::Low => 0,
            ServerLoad::Medium => 40,
            ServerLoad::High => 120,
        }
    }
}

/// A server the operator can route through.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCandidate {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub load: ServerLoad,
    pub latency_ms: u32,
}

impl ServerCandidate {
    /// Region appears in the user's location text (or vice versa).
    pub fn is_near(&self, location: &str) -> bool {
        let region = self.region.trim().to_ascii_lowercase();
        let location = location.trim().to_ascii_lowercase();
        !region.is_empty()
            && !location.is_empty()
            && (location.contains(&region) || region.contains(&location))
    }
}

/// Routing cost in milliseconds-equivalent; lower is better.
pub(crate) fn cost(candidate: &ServerCandidate, location: &str, flags: &ConditionFlags) -> u32 {
    let mut penalty = candidate.load.penalty_ms();
    if flags.unstable {
        penalty *= 2;
    }
    let base = candidate.latency_ms.saturating_add(penalty);
    if candidate.is_near(location) {
        base.saturating_sub(30)
    } else {
        base
    }
}

/// Facts extracted from a free-form network conditions description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConditionFlags {
    pub dpi: bool,
    pub throttling: bool,
    pub udp_blocked: bool,
    pub unstable: bool,
    pub high_latency: bool,
}

impl ConditionFlags {
    pub fn parse(text: &str) -> Self {
        let text = text.to_ascii_lowercase();
        let has = |needle: &str| text.contains(needle);

        Self {
            dpi: has("dpi") || has("deep packet") || has("censor"),
            throttling: has("throttl"),
            udp_blocked: has("udp") && (has("block") || has("drop")),
            unstable: has("unstable") || has("packet loss") || has("jitter"),
            high_latency: has("high latency") || has("trans-pacific") || has("satellite"),
        }
    }
}
