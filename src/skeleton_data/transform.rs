use serde::Deserialize;
use crate::model::transform::{normalize_radian, Transform};
use crate::shared_types::default_one;

#[derive(Copy, Clone, Deserialize, Debug)]
pub struct RawTransform {
    #[serde(default)]
    pub x: f32,

    #[serde(default)]
    pub y: f32,

    #[serde(default)]
    pub skew: f32,

    #[serde(default)]
    #[serde(rename = "rotate")]
    pub rotation: f32,

    #[serde(default)]
    #[serde(rename = "skX")]
    pub skew_x: f32,

    #[serde(default)]
    #[serde(rename = "skY")]
    pub skew_y: f32,

    #[serde(default = "default_one")]
    #[serde(rename = "scX")]
    pub scale_x: f32,

    #[serde(default = "default_one")]
    #[serde(rename = "scY")]
    pub scale_y: f32,
}

impl Default for RawTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            skew: 0.0,
            rotation: 0.0,
            skew_x: 0.0,
            skew_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl RawTransform {
    /// Degrees to radians; the legacy `skX`/`skY` pair is folded into
    /// rotation plus skew.
    pub fn to_transform(&self, scale: f32) -> Transform {
        let (rotation, skew) = if self.rotation != 0.0 || self.skew != 0.0 {
            (
                normalize_radian(self.rotation.to_radians()),
                normalize_radian(self.skew.to_radians()),
            )
        } else if self.skew_x != 0.0 || self.skew_y != 0.0 {
            let rotation = normalize_radian(self.skew_y.to_radians());
            (rotation, normalize_radian(self.skew_x.to_radians()) - rotation)
        } else {
            (0.0, 0.0)
        };
        Transform {
            x: self.x * scale,
            y: self.y * scale,
            rotation,
            skew,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
        }
    }
}
