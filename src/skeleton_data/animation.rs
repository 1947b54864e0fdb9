use serde::Deserialize;
use crate::shared_types::{default_one, default_one_u32, default_name};

#[derive(Clone, Deserialize, Debug)]
pub struct RawAnimationData {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub duration: u32,

    #[serde(rename = "playTimes")]
    #[serde(default = "default_one_u32")]
    pub play_times: u32,
    #[serde(rename = "fadeInTime")]
    #[serde(default)]
    pub fade_in_time: f32,
    #[serde(default = "default_one")]
    pub scale: f32,
    #[serde(rename = "slot")]
    #[serde(default)]
    pub slot_timelines: Vec<RawSlotTimeline>,
    #[serde(rename = "bone")]
    #[serde(default)]
    pub bone_timelines: Vec<RawBoneTimeline>,
}

/// Only the frame layout is read here; sample values belong to the pose
/// evaluator.
#[derive(Clone, Deserialize, Debug)]
pub struct RawFrame {
    #[serde(default = "default_one_u32")]
    pub duration: u32,
    #[serde(rename = "tweenEasing")]
    #[serde(default)]
    pub tween_easing: Option<f32>,
    #[serde(default)]
    pub curve: Vec<f32>,
}

#[derive(Clone, Deserialize, Debug)]
pub struct RawSlotTimeline {
    pub name: String,
    #[serde(rename = "displayFrame")]
    #[serde(default)]
    pub display_frames: Vec<RawFrame>,
    #[serde(rename = "colorFrame")]
    #[serde(default)]
    pub color_frames: Vec<RawFrame>,
}

#[derive(Clone, Deserialize, Debug)]
pub struct RawBoneTimeline {
    #[serde(rename = "name")]
    #[serde(default)]
    pub bone_name: String,
    #[serde(rename = "translateFrame")]
    #[serde(default)]
    pub translate_frames: Vec<RawFrame>,
    #[serde(rename = "rotateFrame")]
    #[serde(default)]
    pub rotate_frames: Vec<RawFrame>,
    #[serde(rename = "scaleFrame")]
    #[serde(default)]
    pub scale_frames: Vec<RawFrame>,
    #[serde(rename = "frame")]
    #[serde(default)]
    pub frames: Vec<RawFrame>,
}
