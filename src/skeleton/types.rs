//! Skeleton section definitions.
//!
//! All types derive Serde traits and serialize to the field names the proxy
//! core expects (`loglevel`, `streamSettings`, `connIdle`, ...).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Log verbosity of the proxy core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Warning,
    Info,
    Error,
    /// Logging disabled (`"none"` on the wire).
    #[serde(rename = "none")]
    Off,
}

/// Inbound and outbound protocols understood by the proxy core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Socks,
    Http,
    #[serde(rename = "dokodemo-door")]
    DokodemoDoor,
    Vless,
    Vmess,
    Trojan,
    Shadowsocks,
    Freedom,
    Blackhole,
    Dns,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Socks => "socks",
            Protocol::Http => "http",
            Protocol::DokodemoDoor => "dokodemo-door",
            Protocol::Vless => "vless",
            Protocol::Vmess => "vmess",
            Protocol::Trojan => "trojan",
            Protocol::Shadowsocks => "shadowsocks",
            Protocol::Freedom => "freedom",
            Protocol::Blackhole => "blackhole",
            Protocol::Dns => "dns",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `log` section.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct LogConfig {
    pub loglevel: LogLevel,
}

/// A local listener.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Inbound {
    pub port: u16,
    pub protocol: Protocol,
    #[serde(default)]
    pub settings: Map<String, Value>,
}

/// An upstream route. The first entry is the primary outbound.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Outbound {
    pub protocol: Protocol,
    #[serde(default)]
    pub settings: Map<String, Value>,
    #[serde(default, rename = "streamSettings")]
    pub stream_settings: Map<String, Value>,
}

/// Timing thresholds for one policy level, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyLevel {
    pub handshake: u32,
    pub conn_idle: u32,
    pub uplink_only: u32,
    pub downlink_only: u32,
}

impl Default for PolicyLevel {
    fn default() -> Self {
        Self {
            handshake: 4,
            conn_idle: 300,
            uplink_only: 1,
            downlink_only: 1,
        }
    }
}

/// `policy` section. Level ids serialize as string keys (`"0"`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Policy {
    pub levels: BTreeMap<u32, PolicyLevel>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            levels: BTreeMap::from([(0, PolicyLevel::default())]),
        }
    }
}

/// The fixed base configuration every composition starts from.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BaseSkeleton {
    pub log: LogConfig,
    pub inbounds: Vec<Inbound>,
    pub outbounds: Vec<Outbound>,
    pub policy: Policy,
}

impl Default for BaseSkeleton {
    fn default() -> Self {
        let mut socks_settings = Map::new();
        socks_settings.insert("auth".to_string(), json!("noauth"));

        Self {
            log: LogConfig::default(),
            inbounds: vec![Inbound {
                port: 1080,
                protocol: Protocol::Socks,
                settings: socks_settings,
            }],
            outbounds: vec![Outbound {
                protocol: Protocol::Vless,
                settings: Map::new(),
                stream_settings: Map::new(),
            }],
            policy: Policy::default(),
        }
    }
}

impl BaseSkeleton {
    /// The outbound the augmentation rules target, if any.
    pub fn primary_outbound(&self) -> Option<&Outbound> {
        self.outbounds.first()
    }
}
