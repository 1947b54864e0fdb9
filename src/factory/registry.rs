use std::rc::Rc;

use indexmap::IndexMap;

use crate::model::armature::ArmatureData;
use crate::model::skin::SkinData;
use crate::model::texture::{TextureAtlasData, TextureData};
use crate::model::SkeletonDataSet;
use crate::pool::ObjectPool;

/// Everything one build call needs, resolved up front.
#[derive(Clone, Debug)]
pub struct BuildArmaturePackage {
    /// Name the skeleton set is registered under.
    pub data_name: String,
    /// Atlas set that overrides texture lookups; empty for none.
    pub texture_atlas_name: String,
    pub data: Rc<SkeletonDataSet>,
    pub armature: Rc<ArmatureData>,
    pub skin: Rc<SkinData>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// A different instance was registered under the name and got released.
    Replaced,
    /// The very same instance was already registered.
    Unchanged,
}

/// Registered skeleton and atlas data, in registration order.
#[derive(Default)]
pub struct AssetRegistry {
    /// Allows lookups to fall back to every registered set.
    pub auto_search: bool,
    skeletons: IndexMap<String, Rc<SkeletonDataSet>>,
    atlases: IndexMap<String, Vec<Rc<TextureAtlasData>>>,
}

impl AssetRegistry {
    pub fn new(auto_search: bool) -> Self {
        Self {
            auto_search,
            ..Self::default()
        }
    }

    /// Stores `data` under `name`, or under its own name.
    pub fn register_skeleton_data(
        &mut self,
        data: Rc<SkeletonDataSet>,
        name: Option<&str>,
        pool: &mut ObjectPool,
    ) -> Registration {
        let name = name.unwrap_or(&data.name).to_string();
        match self.skeletons.insert(name.clone(), data.clone()) {
            None => Registration::Added,
            Some(previous) if Rc::ptr_eq(&previous, &data) => Registration::Unchanged,
            Some(previous) => {
                log::warn!("Replace data: {}", name);
                pool.release_shared(previous);
                Registration::Replaced
            }
        }
    }

    pub fn get_skeleton_data(&self, name: &str) -> Option<&Rc<SkeletonDataSet>> {
        self.skeletons.get(name)
    }

    pub fn skeleton_names(&self) -> impl Iterator<Item = &str> {
        self.skeletons.keys().map(String::as_str)
    }

    pub fn remove_skeleton_data(&mut self, name: &str, dispose: bool, pool: &mut ObjectPool) -> bool {
        match self.skeletons.shift_remove(name) {
            Some(data) => {
                if dispose {
                    pool.release_shared(data);
                }
                true
            }
            None => false,
        }
    }

    /// Appends `data` to the atlas list under `name`. The same instance is
    /// never listed twice.
    pub fn register_texture_atlas_data(&mut self, data: Rc<TextureAtlasData>, name: Option<&str>) -> Registration {
        let name = name.unwrap_or(&data.name).to_string();
        let list = self.atlases.entry(name).or_insert_with(Vec::new);
        if list.iter().any(|atlas| Rc::ptr_eq(atlas, &data)) {
            return Registration::Unchanged;
        }
        list.push(data);
        Registration::Added
    }

    pub fn get_texture_atlas_data(&self, name: &str) -> Option<&[Rc<TextureAtlasData>]> {
        self.atlases.get(name).map(Vec::as_slice)
    }

    pub fn remove_texture_atlas_data(&mut self, name: &str, dispose: bool, pool: &mut ObjectPool) -> bool {
        match self.atlases.shift_remove(name) {
            Some(list) => {
                if dispose {
                    for atlas in list {
                        pool.release_shared(atlas);
                    }
                }
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self, dispose: bool, pool: &mut ObjectPool) {
        for (_, data) in self.skeletons.drain(..) {
            if dispose {
                pool.release_shared(data);
            }
        }
        for (_, list) in self.atlases.drain(..) {
            if dispose {
                for atlas in list {
                    pool.release_shared(atlas);
                }
            }
        }
    }

    /// Looks in the named atlas set first, then, with auto search on, in
    /// every atlas that allows it.
    pub fn resolve_texture(&self, atlas_name: &str, texture_name: &str) -> Option<Rc<TextureData>> {
        let named = self
            .atlases
            .get(atlas_name)
            .and_then(|list| list.iter().find_map(|atlas| atlas.get_texture(texture_name)));
        if let Some(texture) = named {
            return Some(texture.clone());
        }

        if self.auto_search {
            return self
                .atlases
                .values()
                .flatten()
                .filter(|atlas| atlas.auto_search())
                .find_map(|atlas| atlas.get_texture(texture_name))
                .cloned();
        }
        None
    }

    /// Resolves the data one armature build needs. An empty `data_name`
    /// searches every set; an empty `skin_name` picks the default skin.
    pub fn resolve_armature(
        &self,
        data_name: &str,
        armature_name: &str,
        skin_name: &str,
        atlas_name: &str,
    ) -> Option<BuildArmaturePackage> {
        let mut found = if data_name.is_empty() {
            None
        } else {
            self.skeletons.get_key_value(data_name).and_then(|(name, data)| {
                data.get_armature(armature_name)
                    .map(|armature| (name, data, armature))
            })
        };

        if found.is_none() && (data_name.is_empty() || self.auto_search) {
            found = self
                .skeletons
                .iter()
                .filter(|(_, data)| data_name.is_empty() || data.auto_search())
                .find_map(|(name, data)| {
                    data.get_armature(armature_name)
                        .map(|armature| (name, data, armature))
                });
        }

        let (resolved_name, data, armature) = found?;
        let skin = self
            .resolve_skin(armature, skin_name)
            .unwrap_or_else(|| armature.default_skin.clone());

        Some(BuildArmaturePackage {
            data_name: resolved_name.clone(),
            texture_atlas_name: atlas_name.to_string(),
            data: data.clone(),
            armature: armature.clone(),
            skin,
        })
    }

    fn resolve_skin(&self, armature: &ArmatureData, skin_name: &str) -> Option<Rc<SkinData>> {
        if skin_name.is_empty() {
            return None;
        }
        if let Some(skin) = armature.get_skin(skin_name) {
            return Some(skin.clone());
        }
        if self.auto_search {
            // A skin may be borrowed from an armature named after it.
            return self
                .skeletons
                .values()
                .find_map(|data| data.get_armature(skin_name))
                .map(|skin_armature| skin_armature.default_skin.clone());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_set(name: &str, armatures: &[&str], auto_search: bool) -> Rc<SkeletonDataSet> {
        let mut data = SkeletonDataSet::new(name);
        for armature in armatures {
            data.add_armature(ArmatureData::new(*armature));
        }
        data.set_auto_search(auto_search);
        Rc::new(data)
    }

    fn atlas(name: &str, textures: &[&str], auto_search: bool) -> Rc<TextureAtlasData> {
        let mut atlas = TextureAtlasData::new(name);
        for texture in textures {
            atlas.add_texture(TextureData {
                name: texture.to_string(),
                atlas_name: String::new(),
                rotated: false,
                region: Default::default(),
                frame: None,
            });
        }
        atlas.set_auto_search(auto_search);
        Rc::new(atlas)
    }

    #[test]
    fn test_empty_set_name_searches_everything() {
        let mut pool = ObjectPool::new();
        let mut registry = AssetRegistry::new(true);
        registry.register_skeleton_data(data_set("first", &["hero"], true), None, &mut pool);
        registry.register_skeleton_data(data_set("second", &["dragon"], true), None, &mut pool);

        let package = registry.resolve_armature("", "dragon", "", "").unwrap();
        assert_eq!(package.data_name, "second");
        assert_eq!(package.armature.name, "dragon");
        assert!(Rc::ptr_eq(&package.skin, &package.armature.default_skin));
    }

    #[test]
    fn test_empty_set_name_ignores_auto_search_flags() {
        let mut pool = ObjectPool::new();
        let mut registry = AssetRegistry::new(false);
        registry.register_skeleton_data(data_set("first", &["hero"], false), None, &mut pool);
        registry.register_skeleton_data(data_set("second", &["dragon"], false), None, &mut pool);

        let package = registry.resolve_armature("", "dragon", "", "").unwrap();
        assert_eq!(package.data_name, "second");
        assert!(registry.resolve_armature("", "ghost", "", "").is_none());
    }

    #[test]
    fn test_named_set_falls_back_only_with_auto_search() {
        let mut pool = ObjectPool::new();
        let mut registry = AssetRegistry::new(false);
        registry.register_skeleton_data(data_set("first", &["hero"], false), None, &mut pool);
        registry.register_skeleton_data(data_set("second", &["dragon"], false), None, &mut pool);

        assert!(registry.resolve_armature("first", "dragon", "", "").is_none());

        registry.auto_search = true;
        assert!(registry.resolve_armature("first", "dragon", "", "").is_none());

        registry.register_skeleton_data(data_set("second", &["dragon"], true), None, &mut pool);
        let package = registry.resolve_armature("first", "dragon", "", "").unwrap();
        assert_eq!(package.data_name, "second");
    }

    #[test]
    fn test_replace_releases_previous_instance() {
        let mut pool = ObjectPool::new();
        let mut registry = AssetRegistry::default();
        let first = data_set("hero", &["hero"], false);
        assert_eq!(registry.register_skeleton_data(first.clone(), None, &mut pool), Registration::Added);
        assert_eq!(registry.register_skeleton_data(first.clone(), None, &mut pool), Registration::Unchanged);
        drop(first);

        let second = data_set("hero", &["hero"], false);
        assert_eq!(registry.register_skeleton_data(second.clone(), None, &mut pool), Registration::Replaced);
        assert_eq!(pool.free_count::<SkeletonDataSet>(), 1);
        assert!(Rc::ptr_eq(registry.get_skeleton_data("hero").unwrap(), &second));
    }

    #[test]
    fn test_skin_borrowed_from_armature_of_same_name() {
        let mut pool = ObjectPool::new();
        let mut registry = AssetRegistry::new(false);
        let mut outfits = ArmatureData::new("winter");
        outfits.add_skin(SkinData::new("coat"));
        let mut wardrobe = SkeletonDataSet::new("wardrobe");
        wardrobe.add_armature(outfits);
        registry.register_skeleton_data(data_set("hero", &["hero"], false), None, &mut pool);
        registry.register_skeleton_data(Rc::new(wardrobe), None, &mut pool);

        let package = registry.resolve_armature("hero", "hero", "winter", "").unwrap();
        assert_eq!(package.skin.name, "default");

        registry.auto_search = true;
        let package = registry.resolve_armature("hero", "hero", "winter", "").unwrap();
        assert_eq!(package.skin.name, "coat");
    }

    #[test]
    fn test_texture_lookup_order() {
        let mut registry = AssetRegistry::new(false);
        let hidden = atlas("hidden", &["sword"], false);
        assert_eq!(registry.register_texture_atlas_data(hidden.clone(), None), Registration::Added);
        assert_eq!(registry.register_texture_atlas_data(hidden, None), Registration::Unchanged);
        registry.register_texture_atlas_data(atlas("shared", &["sword", "shield"], true), None);
        registry.register_texture_atlas_data(atlas("hero", &["body"], false), None);
        registry.register_texture_atlas_data(atlas("hero", &["head"], false), None);

        assert_eq!(registry.get_texture_atlas_data("hero").unwrap().len(), 2);
        assert_eq!(registry.resolve_texture("hero", "head").unwrap().atlas_name, "hero");
        assert!(registry.resolve_texture("hero", "sword").is_none());

        registry.auto_search = true;
        assert_eq!(registry.resolve_texture("hero", "sword").unwrap().atlas_name, "shared");
        assert!(registry.resolve_texture("hero", "bow").is_none());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut pool = ObjectPool::new();
        let mut registry = AssetRegistry::default();
        registry.register_skeleton_data(data_set("a", &[], false), None, &mut pool);
        registry.register_skeleton_data(data_set("b", &[], false), None, &mut pool);
        registry.register_texture_atlas_data(atlas("a", &[], false), None);

        assert!(registry.remove_skeleton_data("a", true, &mut pool));
        assert!(!registry.remove_skeleton_data("a", true, &mut pool));
        assert_eq!(pool.free_count::<SkeletonDataSet>(), 1);

        registry.clear(true, &mut pool);
        assert_eq!(registry.skeleton_names().count(), 0);
        assert!(registry.get_texture_atlas_data("a").is_none());
        assert_eq!(pool.free_count::<SkeletonDataSet>(), 2);
        assert_eq!(pool.free_count::<TextureAtlasData>(), 1);
    }
}
