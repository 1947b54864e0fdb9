//! Runtime for DragonBones skeletal animation data: registers parsed
//! skeleton and atlas data, resolves overlapping data sets and builds live
//! armatures through a pluggable rendering backend.

pub mod skeleton_data;
pub mod atlas_data;
pub mod shared_types;

pub mod animation;
pub mod armature;
pub mod backend;
pub mod config;
pub mod error;
pub mod factory;
pub mod model;
pub mod parser;
pub mod pool;

pub use animation::{AnimationConfig, BoneMask, FadeOutMode, TweenType};
pub use armature::bone::Bone;
pub use armature::slot::{Slot, SlotDisplay};
pub use armature::Armature;
#[cfg(feature = "macroquad-backend")]
pub use backend::MacroquadBackend;
pub use backend::{Backend, DisplayObject, HeadlessBackend};
pub use config::FactoryConfig;
pub use error::{DataError, Result};
pub use factory::{AssetRegistry, BuildArmaturePackage, Factory, Registration};
pub use parser::{DataParser, JsonDataParser};
pub use pool::{ObjectPool, Poolable};

#[cfg(test)]
mod tests {
    use crate::atlas_data::RawAtlas;
    use crate::skeleton_data::RawSkeletonData;

    #[test]
    fn test_deserialization_of_fixtures() {
        let bytes = include_bytes!("test_assets/hero_ske.json");
        let skeleton_data: RawSkeletonData = serde_json::from_slice(bytes).unwrap();
        assert_eq!(skeleton_data.armatures.len(), 2);

        let atlas: RawAtlas = serde_json::from_slice(include_bytes!("test_assets/hero_tex.json")).unwrap();
        assert_eq!(atlas.name, "hero");
    }
}
