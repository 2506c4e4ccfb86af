//! Targeted augmentations.
//!
//! Unlike the generic merge, these write to specific, named skeleton paths
//! and check the shape they find there.
//!
//! Only one rule exists: a non-empty `quantumSafeSupreme` fragment attaches a
//! credential placeholder (`vnext`) to a vless primary outbound. Outbounds of
//! any other protocol are left untouched.

use serde_json::{json, Value};

use crate::composer::error::{json_kind, ComposeError};
use crate::features::{FeatureId, FragmentSet};
use crate::skeleton::{FinalConfiguration, Protocol};

pub const CREDENTIAL_PATH: &str = "outbounds[0].settings.vnext";

/// Placeholder server entry with one user and no payload encryption.
fn credential_block() -> Value {
    json!([{ "users": [{ "encryption": "none" }] }])
}

/// Attach the credential block to the primary outbound when triggered.
///
/// Returns whether the block was written.
pub fn attach_credentials(
    config: &mut FinalConfiguration,
    fragments: &FragmentSet,
) -> Result<bool, ComposeError> {
    if fragments.get(FeatureId::QuantumSafeSupreme).is_empty() {
        return Ok(false);
    }

    let Some(outbound) = config.primary_outbound_mut() else {
        return Ok(false);
    };
    if outbound.protocol != Protocol::Vless {
        return Ok(false);
    }

    if let Some(existing) = outbound.settings.get("vnext") {
        if !existing.is_array() {
            return Err(ComposeError::SchemaMismatch {
                path: CREDENTIAL_PATH.to_string(),
                expected: "array",
                found: json_kind(existing),
            });
        }
    }

    outbound.settings.insert("vnext".to_string(), credential_block());
    Ok(true)
}
