//! The composed configuration handed to downstream tooling.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::skeleton::types::{BaseSkeleton, Inbound, LogConfig, Outbound, Policy};

/// Skeleton sections plus the open `other` extension area.
///
/// Only the composer builds these; the store hands out shared read-only
/// snapshots.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FinalConfiguration {
    pub log: LogConfig,
    pub inbounds: Vec<Inbound>,
    pub outbounds: Vec<Outbound>,
    pub policy: Policy,
    #[serde(default)]
    pub other: Map<String, Value>,
}

impl FinalConfiguration {
    /// Wrap a skeleton with an empty extension area.
    pub fn from_skeleton(skeleton: BaseSkeleton) -> Self {
        Self {
            log: skeleton.log,
            inbounds: skeleton.inbounds,
            outbounds: skeleton.outbounds,
            policy: skeleton.policy,
            other: Map::new(),
        }
    }

    /// The skeleton sections of this configuration, without `other`.
    pub fn skeleton(&self) -> BaseSkeleton {
        BaseSkeleton {
            log: self.log.clone(),
            inbounds: self.inbounds.clone(),
            outbounds: self.outbounds.clone(),
            policy: self.policy.clone(),
        }
    }

    pub fn primary_outbound_mut(&mut self) -> Option<&mut Outbound> {
        self.outbounds.first_mut()
    }

    /// Pretty JSON, as written to disk.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl From<BaseSkeleton> for FinalConfiguration {
    fn from(skeleton: BaseSkeleton) -> Self {
        Self::from_skeleton(skeleton)
    }
}
