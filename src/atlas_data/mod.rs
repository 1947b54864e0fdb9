//! Raw records of the DragonBones JSON texture atlas format.

use serde::Deserialize;

use crate::model::texture::{TextureAtlasData, TextureData};
use crate::shared_types::{default_one, Rect};

#[derive(Clone, Deserialize, Debug)]
pub struct RawAtlas {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "imagePath")]
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default = "default_one")]
    pub scale: f32,
    #[serde(rename = "SubTexture")]
    #[serde(default)]
    pub sub_textures: Vec<RawSubTexture>,
}

#[derive(Clone, Deserialize, Debug)]
pub struct RawSubTexture {
    pub name: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub rotated: bool,
    #[serde(rename = "frameX")]
    #[serde(default)]
    pub frame_x: f32,
    #[serde(rename = "frameY")]
    #[serde(default)]
    pub frame_y: f32,
    #[serde(rename = "frameWidth")]
    #[serde(default)]
    pub frame_width: f32,
    #[serde(rename = "frameHeight")]
    #[serde(default)]
    pub frame_height: f32,
}

impl RawSubTexture {
    /// Region in atlas pixels divided by `scale`, plus the untrimmed frame
    /// when the exporter wrote one.
    pub fn to_texture_data(&self, scale: f32) -> TextureData {
        let frame = if self.frame_width > 0.0 && self.frame_height > 0.0 {
            Some(Rect {
                x: self.frame_x / scale,
                y: self.frame_y / scale,
                width: self.frame_width / scale,
                height: self.frame_height / scale,
            })
        } else {
            None
        };
        TextureData {
            name: self.name.clone(),
            atlas_name: String::new(),
            rotated: self.rotated,
            region: Rect {
                x: self.x / scale,
                y: self.y / scale,
                width: self.width / scale,
                height: self.height / scale,
            },
            frame,
        }
    }
}

impl RawAtlas {
    /// Copies this page into `target`. A non-positive `scale` keeps the
    /// scale written in the file.
    pub fn fill(&self, target: &mut TextureAtlasData, scale: f32) {
        target.name = self.name.clone();
        target.image_path = self.image_path.clone();
        target.width = self.width;
        target.height = self.height;
        target.scale = if scale > 0.0 { scale } else { self.scale };
        let scale = if target.scale > 0.0 { target.scale } else { 1.0 };
        for sub in self.sub_textures.iter() {
            target.add_texture(sub.to_texture_data(scale));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed_and_plain_sub_textures() {
        let raw: RawAtlas = serde_json::from_slice(include_bytes!("../test_assets/hero_tex.json")).unwrap();
        let mut atlas = TextureAtlasData::default();
        raw.fill(&mut atlas, 0.0);

        assert_eq!(atlas.name, "hero");
        assert_eq!(atlas.image_path, "hero_tex.png");
        assert_eq!(atlas.width, 128);

        let body = atlas.get_texture("body").unwrap();
        assert_eq!(body.atlas_name, "hero");
        assert_eq!(body.region, Rect { x: 0.0, y: 0.0, width: 32.0, height: 48.0 });
        assert!(body.frame.is_none());

        let head = atlas.get_texture("head").unwrap();
        assert_eq!(head.frame.unwrap().width, 24.0);
        assert_eq!(head.frame.unwrap().x, -2.0);
    }
}
