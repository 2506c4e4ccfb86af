//! Generic fragment merge.

use std::collections::HashMap;

use serde::Serialize;

use crate::composer::augment;
use crate::composer::error::ComposeError;
use crate::features::{FeatureId, FragmentSet};
use crate::skeleton::{BaseSkeleton, FinalConfiguration};

/// A key written by more than one fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub key: String,
    pub overridden: FeatureId,
    pub winner: FeatureId,
}

/// What a composition did, for auditing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MergeTrace {
    /// Features with non-empty fragments, in merge order.
    pub contributors: Vec<FeatureId>,
    pub collisions: Vec<Collision>,
    pub credentials_attached: bool,
}

/// Build the final configuration from a skeleton and the current fragments.
pub fn compose(
    skeleton: &BaseSkeleton,
    fragments: &FragmentSet,
) -> Result<FinalConfiguration, ComposeError> {
    compose_traced(skeleton, fragments).map(|(config, _)| config)
}

/// [`compose`], also reporting contributors and key collisions.
pub fn compose_traced(
    skeleton: &BaseSkeleton,
    fragments: &FragmentSet,
) -> Result<(FinalConfiguration, MergeTrace), ComposeError> {
    let mut config = FinalConfiguration::from_skeleton(skeleton.clone());
    let mut trace = MergeTrace::default();
    let mut owners: HashMap<&str, FeatureId> = HashMap::new();

    for (id, fragment) in fragments.iter() {
        if fragment.is_empty() {
            continue;
        }
        trace.contributors.push(id);

        for (key, value) in fragment.iter() {
            if let Some(previous) = owners.insert(key.as_str(), id) {
                trace.collisions.push(Collision {
                    key: key.clone(),
                    overridden: previous,
                    winner: id,
                });
            }
            config.other.insert(key.clone(), value.clone());
        }
    }

    trace.credentials_attached = augment::attach_credentials(&mut config, fragments)?;

    Ok((config, trace))
}
