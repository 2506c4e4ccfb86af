//! Multi-hop relay route planning.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{cost, Advisor, ConditionFlags, InvocationError, ServerCandidate};

/// Hops beyond this add latency without adding anonymity.
pub const MAX_HOPS: usize = 5;

/// Added per hop after the entry relay.
const INTER_HOP_MS: u32 = 15;

fn default_max_hops() -> usize {
    3
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayChainInput {
    pub user_location: String,
    #[serde(default)]
    pub network_conditions: String,
    pub available_servers: Vec<ServerCandidate>,
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayChainOutput {
    pub optimized_route: Vec<String>,
    pub expected_latency_ms: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RelayChainAdvisor;

impl Advisor for RelayChainAdvisor {
    type Input = RelayChainInput;
    type Output = RelayChainOutput;

    fn invoke(&self, input: &RelayChainInput) -> Result<RelayChainOutput, InvocationError> {
        if input.max_hops == 0 || input.max_hops > MAX_HOPS {
            return Err(InvocationError::InvalidInput(format!(
                "maxHops must be between 1 and {MAX_HOPS}"
            )));
        }

        let flags = ConditionFlags::parse(&input.network_conditions);

        // Duplicate names collapse to their first entry.
        let mut seen = HashSet::new();
        let mut ranked: Vec<(u32, &ServerCandidate)> = input
            .available_servers
            .iter()
            .filter(|s| seen.insert(s.name.as_str()))
            .map(|s| (cost(s, &input.user_location, &flags), s))
            .collect();
        if ranked.is_empty() {
            return Err(InvocationError::NoCandidate("no servers available"));
        }
        ranked.sort_by_key(|(c, _)| *c);
        ranked.truncate(input.max_hops);

        // The entry hop is the one nearest the user; remaining hops keep cost order.
        if let Some(entry) = ranked
            .iter()
            .position(|(_, s)| s.is_near(&input.user_location))
        {
            let near = ranked.remove(entry);
            ranked.insert(0, near);
        }

        let hops = ranked.len() as u32;
        let expected_latency_ms = ranked
            .iter()
            .map(|(_, s)| s.latency_ms)
            .fold(0u32, u32::saturating_add)
            .saturating_add(INTER_HOP_MS * (hops - 1));

        Ok(RelayChainOutput {
            optimized_route: ranked.into_iter().map(|(_, s)| s.name.clone()).collect(),
            expected_latency_ms,
        })
    }
}
