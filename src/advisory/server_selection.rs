//! Pick the best single exit server.

use serde::{Deserialize, Serialize};

use super::{cost, Advisor, ConditionFlags, InvocationError, ServerCandidate, ServerLoad};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSelectionInput {
    pub user_location: String,
    #[serde(default)]
    pub network_conditions: String,
    pub candidates: Vec<ServerCandidate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    Stable,
    Moderate,
    Unstable,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSelectionOutput {
    pub selected_server: String,
    pub latency_ms: u32,
    pub stability: Stability,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ServerSelectionAdvisor;

impl Advisor for ServerSelectionAdvisor {
    type Input = ServerSelectionInput;
    type Output = ServerSelectionOutput;

    fn invoke(&self, input: &ServerSelectionInput) -> Result<ServerSelectionOutput, InvocationError> {
        let flags = ConditionFlags::parse(&input.network_conditions);

        // Ties resolve to the earliest candidate.
        let best = input
            .candidates
            .iter()
            .enumerate()
            .min_by_key(|(index, c)| (cost(c, &input.user_location, &flags), *index))
            .map(|(_, c)| c)
            .ok_or(InvocationError::NoCandidate("candidates list is empty"))?;

        let stability = match (best.load, flags.unstable) {
            (ServerLoad::Low, false) => Stability::Stable,
            (ServerLoad::High, _) | (ServerLoad::Medium, true) => Stability::Unstable,
            _ => Stability::Moderate,
        };

        let mut reason = format!(
            "{} has the lowest routing cost ({} ms latency, {} load)",
            best.name,
            best.latency_ms,
            best.load.as_str()
        );
        if best.is_near(&input.user_location) {
            reason.push_str(", close to the user");
        }
        if flags.unstable {
            reason.push_str("; load weighted heavily for unstable conditions");
        }

        Ok(ServerSelectionOutput {
            selected_server: best.name.clone(),
            latency_ms: best.latency_ms,
            stability,
            reason,
        })
    }
}
