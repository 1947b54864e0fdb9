use serde::Deserialize;

fn default_armature_type() -> String { "Armature".into() }

#[derive(Clone, Deserialize, Debug)]
pub struct RawArmatureData {
    // MovieClip is unsupported; the parser rejects it.
    #[serde(rename = "type")]
    #[serde(default = "default_armature_type")]
    pub armature_type: String,

    #[serde(rename = "frameRate")]
    #[serde(default)]
    pub frame_rate: u32,

    pub name: String,

    #[serde(rename = "aabb")]
    #[serde(default)]
    pub aa_bb: crate::shared_types::Rect,

    #[serde(rename = "bone")]
    #[serde(default)]
    pub bones: Vec<super::bone::RawBone>,

    #[serde(default)]
    pub ik: Vec<super::ik::RawIkData>,

    #[serde(rename = "slot")]
    #[serde(default)]
    pub slots: Vec<super::slot::RawSlot>,

    #[serde(rename = "skin")]
    #[serde(default)]
    pub skins: Vec<super::skin::RawSkinData>,

    #[serde(rename = "animation")]
    #[serde(default)]
    pub animations: Vec<super::animation::RawAnimationData>,

    #[serde(rename = "defaultActions")]
    #[serde(default)]
    pub default_actions: Vec<super::actions::RawActionData>,

    #[serde(default)]
    pub actions: Vec<super::actions::RawActionData>,
}
