//! Entry point of the runtime: owns registered data, the object pool and the
//! rendering backend, and builds armatures from names.

mod builder;
mod display;
mod registry;

pub use registry::{AssetRegistry, BuildArmaturePackage, Registration};

use std::any::Any;
use std::rc::Rc;

use crate::armature::Armature;
use crate::backend::{Backend, HeadlessBackend};
use crate::config::FactoryConfig;
use crate::error::Result;
use crate::model::armature::ArmatureData;
use crate::model::texture::{TextureAtlasData, TextureData};
use crate::model::SkeletonDataSet;
use crate::parser::{DataParser, JsonDataParser};
use crate::pool::ObjectPool;

pub struct Factory {
    registry: AssetRegistry,
    pool: ObjectPool,
    backend: Box<dyn Backend>,
    parser: Box<dyn DataParser>,
    config: FactoryConfig,
}

impl Default for Factory {
    fn default() -> Self {
        Self::new(Box::new(HeadlessBackend::default()))
    }
}

impl Factory {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self::with_config(backend, FactoryConfig::default())
    }

    pub fn with_config(backend: Box<dyn Backend>, config: FactoryConfig) -> Self {
        Self {
            registry: AssetRegistry::new(config.auto_search),
            pool: ObjectPool::new(),
            backend,
            parser: Box::new(JsonDataParser),
            config,
        }
    }

    pub fn with_parser(mut self, parser: Box<dyn DataParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn auto_search(&self) -> bool {
        self.registry.auto_search
    }

    pub fn set_auto_search(&mut self, value: bool) {
        self.registry.auto_search = value;
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    pub fn pool(&self) -> &ObjectPool {
        &self.pool
    }

    /// Parses skeleton data and registers it under `name` or its own name.
    pub fn parse_skeleton_data(&mut self, raw: &[u8], name: Option<&str>, scale: f32) -> Result<Rc<SkeletonDataSet>> {
        let scale = self.config.effective_scale(scale);
        let data = Rc::new(self.parser.parse_skeleton_data(raw, scale)?);
        self.registry.register_skeleton_data(data.clone(), name, &mut self.pool);
        Ok(data)
    }

    /// Parses one atlas page, binds `texture` to it through the backend and
    /// registers it. A non-positive `scale` keeps the scale of the file.
    pub fn parse_texture_atlas_data(
        &mut self,
        raw: &[u8],
        texture: Option<Box<dyn Any>>,
        name: Option<&str>,
        scale: f32,
    ) -> Result<Rc<TextureAtlasData>> {
        let mut atlas = self.backend.create_texture_atlas_data(&mut self.pool);
        if let Err(e) = self.parser.parse_texture_atlas_data(raw, &mut atlas, scale) {
            self.pool.release(atlas);
            return Err(e);
        }
        if let Some(texture) = texture {
            self.backend.bind_render_texture(&atlas, texture);
        }
        let atlas = Rc::new(atlas);
        self.registry.register_texture_atlas_data(atlas.clone(), name);
        Ok(atlas)
    }

    /// Rebinds render textures of the atlases registered under `name`,
    /// pairing them up in order.
    pub fn update_texture_atlas_data(&self, name: &str, textures: Vec<Box<dyn Any>>) {
        match self.registry.get_texture_atlas_data(name) {
            Some(atlases) => {
                for (atlas, texture) in atlases.iter().zip(textures) {
                    self.backend.bind_render_texture(atlas, texture);
                }
            }
            None => log::warn!("No texture atlas data `{}`", name),
        }
    }

    pub fn add_skeleton_data(&mut self, data: Rc<SkeletonDataSet>, name: Option<&str>) -> Registration {
        self.registry.register_skeleton_data(data, name, &mut self.pool)
    }

    pub fn get_skeleton_data(&self, name: &str) -> Option<&Rc<SkeletonDataSet>> {
        self.registry.get_skeleton_data(name)
    }

    pub fn remove_skeleton_data(&mut self, name: &str, dispose: bool) -> bool {
        self.registry.remove_skeleton_data(name, dispose, &mut self.pool)
    }

    pub fn add_texture_atlas_data(&mut self, data: Rc<TextureAtlasData>, name: Option<&str>) -> Registration {
        self.registry.register_texture_atlas_data(data, name)
    }

    pub fn get_texture_atlas_data(&self, name: &str) -> Option<&[Rc<TextureAtlasData>]> {
        self.registry.get_texture_atlas_data(name)
    }

    pub fn remove_texture_atlas_data(&mut self, name: &str, dispose: bool) -> bool {
        self.registry.remove_texture_atlas_data(name, dispose, &mut self.pool)
    }

    pub fn get_texture_data(&self, atlas_name: &str, texture_name: &str) -> Option<Rc<TextureData>> {
        self.registry.resolve_texture(atlas_name, texture_name)
    }

    /// Armature metadata without building anything.
    pub fn get_armature_data(&self, name: &str, data_name: Option<&str>) -> Option<Rc<ArmatureData>> {
        self.registry
            .resolve_armature(data_name.unwrap_or_default(), name, "", "")
            .map(|package| package.armature)
    }

    pub fn build_armature(
        &mut self,
        armature_name: &str,
        data_name: Option<&str>,
        skin_name: Option<&str>,
        atlas_name: Option<&str>,
    ) -> Option<Armature> {
        self.build_armature_at(armature_name, data_name, skin_name, atlas_name, 0)
    }

    /// Returns an armature and everything it owns to the pool.
    pub fn dispose_armature(&mut self, armature: Armature) {
        armature.dispose(&mut self.pool);
    }

    /// Unregisters all data; with `dispose` it is returned to the pool too.
    pub fn clear(&mut self, dispose: bool) {
        self.registry.clear(dispose, &mut self.pool);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armature::slot::SlotDisplay;
    use crate::backend::HeadlessDisplay;
    use crate::model::action::ActionData;

    const HERO_SKE: &[u8] = include_bytes!("../test_assets/hero_ske.json");
    const HERO_TEX: &[u8] = include_bytes!("../test_assets/hero_tex.json");

    fn factory() -> Factory {
        let mut factory = Factory::default();
        factory.parse_skeleton_data(HERO_SKE, None, 1.0).unwrap();
        factory.parse_texture_atlas_data(HERO_TEX, None, None, 0.0).unwrap();
        factory
    }

    #[test]
    fn test_build_resolves_bones_slots_and_textures() {
        let mut factory = factory();
        let armature = factory.build_armature("hero", Some("hero"), None, None).unwrap();

        assert_eq!(armature.bones().len(), 4);
        assert_eq!(armature.slots().len(), 4);
        let body = armature.get_bone("body").unwrap();
        assert_eq!(body.world_position(), (0.0, -40.0));

        let body_slot = armature.get_slot("body_slot").unwrap();
        assert!(matches!(body_slot.current_display(), Some(SlotDisplay::Raw)));
        assert_eq!(body_slot.current_texture().unwrap().name, "body");
        let raw = body_slot.raw_display().unwrap().as_any().downcast_ref::<HeadlessDisplay>();
        assert_eq!(raw, Some(&HeadlessDisplay::Image("body_slot".into())));

        let arm_slot = armature.get_slot("arm_slot").unwrap();
        assert_eq!(arm_slot.display_list().len(), 2);
        assert!(matches!(arm_slot.display_list()[0], SlotDisplay::Mesh));
        assert!(arm_slot.display_list()[1].is_empty());
    }

    #[test]
    fn test_mesh_falls_back_to_image_without_mesh_support() {
        let mut factory = Factory::new(Box::new(HeadlessBackend { supports_mesh: false }));
        factory.parse_skeleton_data(HERO_SKE, None, 1.0).unwrap();
        let armature = factory.build_armature("hero", None, None, None).unwrap();
        let arm_slot = armature.get_slot("arm_slot").unwrap();
        assert!(matches!(arm_slot.display_list()[0], SlotDisplay::Raw));
    }

    #[test]
    fn test_ik_constraint_hangs_off_chain_root() {
        let mut factory = factory();
        let armature = factory.build_armature("hero", None, None, None).unwrap();
        let body = armature.get_bone("body").unwrap();
        assert_eq!(body.constraints().len(), 1);
        let ik = &body.constraints()[0];
        assert_eq!(ik.bone, armature.bone_index("arm").unwrap());
        assert_eq!(ik.target, armature.bone_index("root").unwrap());
        assert_eq!(ik.root, armature.bone_index("body"));
        assert!(armature.get_bone("arm").unwrap().constraints().is_empty());
    }

    #[test]
    fn test_constraint_with_unknown_target_is_skipped() {
        let mut factory = Factory::default();
        let raw = br#"{
            "name": "rig",
            "armature": [{
                "name": "rig",
                "bone": [{ "name": "root" }, { "name": "hand", "parent": "root" }],
                "ik": [{ "name": "reach", "bone": "hand", "target": "ghost" }]
            }]
        }"#;
        factory.parse_skeleton_data(raw, None, 1.0).unwrap();
        let armature = factory.build_armature("rig", None, None, None).unwrap();
        assert!(armature.bones().iter().all(|bone| bone.constraints().is_empty()));
    }

    #[test]
    fn test_non_default_skin_overrides_only_its_slots() {
        let mut factory = factory();
        let armature = factory.build_armature("hero", None, Some("armored"), None).unwrap();

        let body_slot = armature.get_slot("body_slot").unwrap();
        assert_eq!(body_slot.current_display_data().unwrap().name, "armor");
        assert_eq!(body_slot.current_texture().unwrap().name, "armor");

        let arm_slot = armature.get_slot("arm_slot").unwrap();
        assert_eq!(arm_slot.current_display_data().unwrap().name, "arm");
        assert!(armature.get_slot("weapon_slot").unwrap().child_armature().is_some());
    }

    #[test]
    fn test_nested_armature_default_playback() {
        let mut factory = factory();
        let armature = factory.build_armature("hero", None, None, None).unwrap();

        let weapon = armature.get_slot("weapon_slot").unwrap().child_armature().unwrap();
        assert!(!weapon.inherit_animation);
        assert_eq!(weapon.animation().last_animation_name(), Some("swing"));
        assert!(weapon.animation().is_playing());

        let shield = armature.get_slot("shield_slot").unwrap().child_armature().unwrap();
        assert_eq!(shield.animation().last_animation_name(), Some("rest"));

        let data = factory.get_armature_data("hero", None).unwrap();
        let display = data.default_skin.get_display("weapon_slot", "sword").unwrap();
        match &display.kind {
            crate::model::skin::DisplayKind::Armature(nested) => {
                assert_eq!(nested.armature().unwrap().name, "sword");
            }
            other => panic!("unexpected display {:?}", other),
        }
    }

    #[test]
    fn test_declared_actions_are_buffered_not_played() {
        let mut factory = factory();
        let data = factory.get_armature_data("hero", None).unwrap();
        let package = factory.registry.resolve_armature("hero", "hero", "", "").unwrap();
        let shield = data.default_skin.get_display("shield_slot", "sword").unwrap().clone();

        let display = factory.get_slot_display(Some(&package), &shield, None, 0);
        let child = display.as_armature().unwrap();
        assert!(!child.animation().is_playing());
        assert_eq!(child.buffered_actions(), &[ActionData::play("rest")]);
    }

    #[test]
    fn test_self_nesting_stops_at_depth_limit() {
        let config = FactoryConfig {
            max_nesting_depth: 2,
            ..FactoryConfig::default()
        };
        let mut factory = Factory::with_config(Box::new(HeadlessBackend::default()), config);
        let raw = br#"{
            "name": "loop",
            "armature": [{
                "name": "loop",
                "bone": [{ "name": "root" }],
                "slot": [{ "name": "inner", "parent": "root" }],
                "skin": [{ "slot": [{ "name": "inner", "display": [{ "type": "armature", "name": "loop" }] }] }]
            }]
        }"#;
        factory.parse_skeleton_data(raw, None, 1.0).unwrap();
        let armature = factory.build_armature("loop", None, None, None).unwrap();

        let first = armature.get_slot("inner").unwrap().child_armature().unwrap();
        let second = first.get_slot("inner").unwrap().child_armature().unwrap();
        assert!(second.get_slot("inner").unwrap().display_list()[0].is_empty());
    }

    #[test]
    fn test_missing_armature_builds_nothing() {
        let mut factory = factory();
        assert!(factory.build_armature("dragon", None, None, None).is_none());
        assert!(factory.build_armature("hero", Some("elsewhere"), None, None).is_none());

        factory.set_auto_search(true);
        assert!(factory.build_armature("hero", Some("elsewhere"), None, None).is_none());
        factory.get_skeleton_data("hero").unwrap().set_auto_search(true);
        assert!(factory.build_armature("hero", Some("elsewhere"), None, None).is_some());
    }

    #[test]
    fn test_frame_cache_reaches_nested_armatures() {
        let mut factory = factory();
        let armature = factory.build_armature("hero", None, None, None).unwrap();
        armature.enable_frame_cache(30.0);

        let idle = armature.animation().animations()["idle"].clone();
        assert_eq!(idle.cache_frame_rate(), 30.0);
        assert_eq!(idle.bone_cached_frame_indices("arm").unwrap().len(), 61);

        let weapon = armature.get_slot("weapon_slot").unwrap().child_armature().unwrap();
        let swing = weapon.animation().animations()["swing"].clone();
        assert_eq!(swing.slot_cached_frame_indices("blade_slot").unwrap().len(), 31);
    }

    #[test]
    fn test_dispose_and_clear_feed_the_pool() {
        let mut factory = factory();
        let armature = factory.build_armature("hero", None, None, None).unwrap();
        factory.dispose_armature(armature);
        assert_eq!(factory.pool().free_count::<Armature>(), 3);

        let data = factory.get_skeleton_data("hero").unwrap().clone();
        assert_eq!(factory.add_skeleton_data(data.clone(), None), Registration::Unchanged);
        drop(data);
        factory.clear(true);
        assert!(factory.get_skeleton_data("hero").is_none());
        assert_eq!(factory.pool().free_count::<SkeletonDataSet>(), 1);
        assert_eq!(factory.pool().free_count::<TextureAtlasData>(), 1);
    }

    #[test]
    fn test_update_texture_atlas_rebinds_in_order() {
        let factory = factory();
        let textures: Vec<Box<dyn Any>> = vec![Box::new(7_u32)];
        factory.update_texture_atlas_data("hero", textures);
        let atlas = &factory.get_texture_atlas_data("hero").unwrap()[0];
        let bound = atlas.render_texture();
        assert_eq!(bound.as_ref().and_then(|texture| texture.downcast_ref::<u32>()), Some(&7));
    }
}
