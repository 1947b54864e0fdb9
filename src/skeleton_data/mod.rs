//! Raw records of the DragonBones JSON skeleton format, as exported by the
//! editor. These are turned into the runtime model by [`crate::parser`].

pub mod armature;
pub mod bone;
pub mod transform;
pub mod slot;
pub mod actions;
pub mod animation;
pub mod skin;
pub mod ik;

use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct RawSkeletonData {
    #[serde(rename = "frameRate")]
    #[serde(default)]
    pub frame_rate: u32,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(rename = "compatibleVersion")]
    #[serde(default)]
    pub compatible_version: String,

    #[serde(rename = "armature")]
    #[serde(default)]
    pub armatures: Vec<armature::RawArmatureData>,
}
