//! Threshold-based network health diagnosis.

use serde::{Deserialize, Serialize};

use super::{Advisor, InvocationError};

const MAX_LATENCY_MS: f64 = 100.0;
const MAX_JITTER_MS: f64 = 30.0;
const MAX_PACKET_LOSS_PCT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkHealthInput {
    /// Milliseconds.
    pub jitter: f64,
    /// Milliseconds.
    pub latency: f64,
    /// Percent, 0 to 100.
    pub packet_loss: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkHealthOutput {
    pub diagnosis: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkHealthAdvisor;

impl Advisor for NetworkHealthAdvisor {
    type Input = NetworkHealthInput;
    type Output = NetworkHealthOutput;

    fn invoke(&self, input: &NetworkHealthInput) -> Result<NetworkHealthOutput, InvocationError> {
        for (name, value) in [
            ("jitter", input.jitter),
            ("latency", input.latency),
            ("packetLoss", input.packet_loss),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(InvocationError::InvalidInput(format!(
                    "{name} must be a non-negative number"
                )));
            }
        }
        if input.packet_loss > 100.0 {
            return Err(InvocationError::InvalidInput(
                "packetLoss must not exceed 100".into(),
            ));
        }

        let mut diagnosis = "Network health is optimal.";
        let mut recommendations = Vec::new();

        // Later checks override the diagnosis, recommendations accumulate.
        if input.latency > MAX_LATENCY_MS {
            diagnosis = "High latency detected, which can cause delays in real-time communication.";
            recommendations.push("Consider moving closer to your Wi-Fi router.");
            recommendations.push("Use a wired connection for better stability.");
        }
        if input.jitter > MAX_JITTER_MS {
            diagnosis = "High jitter detected, which can result in distorted audio or video.";
            recommendations.push("Reduce network congestion by closing unnecessary applications.");
        }
        if input.packet_loss > MAX_PACKET_LOSS_PCT {
            diagnosis = "Significant packet loss detected, leading to loss of data.";
            recommendations.push("Restart your router or contact your ISP if the problem persists.");
        }
        if recommendations.is_empty() {
            recommendations.push("No immediate action required. Your network is performing well.");
        }

        Ok(NetworkHealthOutput {
            diagnosis: diagnosis.to_string(),
            recommendations: recommendations.into_iter().map(String::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnose(jitter: f64, latency: f64, packet_loss: f64) -> Result<NetworkHealthOutput, InvocationError> {
        NetworkHealthAdvisor.invoke(&NetworkHealthInput {
            jitter,
            latency,
            packet_loss,
        })
    }

    #[test]
    fn test_healthy_network() {
        let out = diagnose(30.0, 100.0, 2.0).unwrap();
        assert_eq!(out.diagnosis, "Network health is optimal.");
        assert_eq!(out.recommendations.len(), 1);
        assert!(out.recommendations[0].starts_with("No immediate action"));
    }

    #[test]
    fn test_high_latency_only() {
        let out = diagnose(5.0, 150.0, 0.0).unwrap();
        assert!(out.diagnosis.starts_with("High latency"));
        assert_eq!(out.recommendations.len(), 2);
    }

    #[test]
    fn test_last_failing_check_names_diagnosis() {
        let out = diagnose(45.0, 150.0, 5.0).unwrap();
        assert!(out.diagnosis.starts_with("Significant packet loss"));
        assert_eq!(out.recommendations.len(), 4);
        assert!(!out.recommendations.iter().any(|r| r.starts_with("No immediate")));
    }

    #[test]
    fn test_rejects_nonsense_measurements() {
        assert!(matches!(diagnose(-1.0, 10.0, 0.0), Err(InvocationError::InvalidInput(_))));
        assert!(matches!(diagnose(1.0, f64::NAN, 0.0), Err(InvocationError::InvalidInput(_))));
        assert!(matches!(diagnose(1.0, 10.0, 101.0), Err(InvocationError::InvalidInput(_))));
    }
}
