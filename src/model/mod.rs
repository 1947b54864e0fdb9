//! Runtime data model: what the parser produces and the factory resolves
//! against. Records are shared through `Rc` between the registry and every
//! armature built from them.

pub mod action;
pub mod animation;
pub mod armature;
pub mod skin;
pub mod texture;
pub mod transform;

use std::cell::Cell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::pool::Poolable;
use armature::ArmatureData;

/// A named collection of armatures, usually one exported skeleton file.
#[derive(Debug, Default)]
pub struct SkeletonDataSet {
    pub name: String,
    pub version: String,
    pub frame_rate: u32,
    auto_search: Cell<bool>,
    armatures: IndexMap<String, Rc<ArmatureData>>,
}

impl SkeletonDataSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether factory-wide fallback searches may look into this set.
    pub fn auto_search(&self) -> bool {
        self.auto_search.get()
    }

    pub fn set_auto_search(&self, value: bool) {
        self.auto_search.set(value);
    }

    pub fn add_armature(&mut self, armature: ArmatureData) {
        if self.armatures.contains_key(&armature.name) {
            log::warn!("Replace armature `{}` in `{}`", armature.name, self.name);
        }
        self.armatures.insert(armature.name.clone(), Rc::new(armature));
    }

    pub fn get_armature(&self, name: &str) -> Option<&Rc<ArmatureData>> {
        self.armatures.get(name)
    }

    pub fn armature_names(&self) -> impl Iterator<Item = &str> {
        self.armatures.keys().map(String::as_str)
    }

    pub fn armatures(&self) -> impl Iterator<Item = &Rc<ArmatureData>> {
        self.armatures.values()
    }
}

impl Poolable for SkeletonDataSet {
    fn clear(&mut self) {
        self.name.clear();
        self.version.clear();
        self.frame_rate = 0;
        self.auto_search.set(false);
        self.armatures.clear();
    }
}
