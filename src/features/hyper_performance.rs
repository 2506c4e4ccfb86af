//! Hyper performance module: transport tuning.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::features::{FeatureId, FeatureProducer, Fragment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionControl {
    #[default]
    Bbr,
    Cubic,
    Reno,
}

impl CongestionControl {
    pub fn as_str(&self) -> &'static str {
        match self {
            CongestionControl::Bbr => "bbr",
            CongestionControl::Cubic => "cubic",
            CongestionControl::Reno => "reno",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HyperPerformanceParams {
    pub tcp_fast_open: bool,
    /// Mux sub-connections per TCP connection; 0 disables multiplexing.
    pub mux_concurrency: u16,
    pub buffer_size_kb: u32,
    pub congestion_control: CongestionControl,
}

pub struct HyperPerformance;

impl FeatureProducer for HyperPerformance {
    type Params = HyperPerformanceParams;
    const ID: FeatureId = FeatureId::HyperPerformance;

    fn produce(params: &Self::Params) -> Fragment {
        let mut fragment = Fragment::new();

        fragment.insert("tcpFastOpen", params.tcp_fast_open);

        let mux = if params.mux_concurrency > 0 {
            json!({ "enabled": true, "concurrency": params.mux_concurrency })
        } else {
            json!({ "enabled": false })
        };
        fragment.insert("mux", mux);

        if params.buffer_size_kb > 0 {
            fragment.insert("bufferSize", params.buffer_size_kb);
        }
        fragment.insert("congestionControl", params.congestion_control.as_str());
        fragment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mux_enabled_with_concurrency() {
        let params = HyperPerformanceParams {
            tcp_fast_open: true,
            mux_concurrency: 8,
            buffer_size_kb: 512,
            congestion_control: CongestionControl::Cubic,
        };
        let fragment = HyperPerformance::produce(&params);

        assert_eq!(fragment.get("mux"), Some(&json!({ "enabled": true, "concurrency": 8 })));
        assert_eq!(fragment.get("bufferSize"), Some(&json!(512)));
        assert_eq!(fragment.get("congestionControl"), Some(&json!("cubic")));
    }

    #[test]
    fn test_zero_values_degrade() {
        let fragment = HyperPerformance::produce(&HyperPerformanceParams::default());

        assert_eq!(fragment.get("mux"), Some(&json!({ "enabled": false })));
        assert!(fragment.get("bufferSize").is_none());
        assert_eq!(fragment.get("tcpFastOpen"), Some(&json!(false)));
    }
}
