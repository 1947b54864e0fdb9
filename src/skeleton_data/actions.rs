use serde::Deserialize;
use serde_json::Value;

#[derive(Clone, Deserialize, Debug)]
pub struct RawActionData {
    #[serde(rename = "gotoAndPlay")]
    #[serde(default)]
    pub goto_and_play: String,
    // Older exports write "play"/"frame"/"sound", newer ones 0/10/11.
    #[serde(rename = "type")]
    #[serde(default)]
    pub action_type: Value,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "bone")]
    #[serde(default)]
    pub bone_name: String,
    #[serde(rename = "slot")]
    #[serde(default)]
    pub slot_name: String,
    #[serde(rename = "ints")]
    #[serde(default)]
    pub user_ints: Vec<i32>,
    #[serde(rename = "floats")]
    #[serde(default)]
    pub user_floats: Vec<f32>,
    #[serde(rename = "strings")]
    #[serde(default)]
    pub user_strings: Vec<String>,
}
