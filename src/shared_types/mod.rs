use serde::Deserialize;

#[derive(Copy, Clone, Deserialize, Default, Debug, PartialEq)]
pub struct Rect {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

#[derive(Copy, Clone, Deserialize, Default, Debug, PartialEq)]
pub struct Point {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

#[derive(Copy, Clone, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    Normal,
    Add,
    Alpha,
    Darken,
    Difference,
    Erase,
    HardLight,
    Invert,
    Layer,
    Lighten,
    Multiply,
    Overlay,
    Screen,
    Subtract,
}

impl Default for BlendMode {
    fn default() -> Self {
        Self::Normal
    }
}

#[derive(Copy, Clone, Deserialize, Debug, PartialEq)]
pub struct ColorTransform {
    #[serde(rename = "aM", default = "default_100")]
    pub alpha_multiplier: i32,
    #[serde(rename = "rM", default = "default_100")]
    pub red_multiplier: i32,
    #[serde(rename = "gM", default = "default_100")]
    pub green_multiplier: i32,
    #[serde(rename = "bM", default = "default_100")]
    pub blue_multiplier: i32,
    #[serde(rename = "aO", default)]
    pub alpha_offset: i32,
    #[serde(rename = "rO", default)]
    pub red_offset: i32,
    #[serde(rename = "gO", default)]
    pub green_offset: i32,
    #[serde(rename = "bO", default)]
    pub blue_offset: i32,
}

impl Default for ColorTransform {
    fn default() -> Self {
        Self {
            alpha_multiplier: 100,
            red_multiplier: 100,
            green_multiplier: 100,
            blue_multiplier: 100,
            alpha_offset: 0,
            red_offset: 0,
            green_offset: 0,
            blue_offset: 0,
        }
    }
}

pub(crate) fn default_true() -> bool { true }
pub(crate) fn default_one() -> f32 { 1.0 }
pub(crate) fn default_one_u32() -> u32 { 1 }
pub(crate) fn default_100() -> i32 { 100 }
pub(crate) fn default_name() -> String { "default".into() }
pub(crate) fn default_pivot() -> Point { Point { x: 0.5, y: 0.5 } }
