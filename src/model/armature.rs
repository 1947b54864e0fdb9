use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;

use super::action::ActionData;
use super::animation::AnimationData;
use super::skin::SkinData;
use super::transform::Transform;
use crate::shared_types::{BlendMode, ColorTransform, Rect};

#[derive(Clone, Debug)]
pub struct IkConstraintData {
    pub name: String,
    pub target: String,
    /// First bone of a two-bone chain; `None` for a single-bone chain.
    pub root: Option<String>,
    pub bend_positive: bool,
    pub scale_enabled: bool,
    pub weight: f32,
}

#[derive(Clone, Debug)]
pub enum ConstraintData {
    Ik(IkConstraintData),
}

impl ConstraintData {
    pub fn target(&self) -> &str {
        match self {
            ConstraintData::Ik(ik) => &ik.target,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BoneData {
    pub name: String,
    pub parent: Option<String>,
    pub length: f32,
    pub inherit_translation: bool,
    pub inherit_rotation: bool,
    pub inherit_scale: bool,
    pub inherit_reflection: bool,
    pub transform: Transform,
    pub constraints: Vec<ConstraintData>,
}

impl BoneData {
    pub fn new(name: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(str::to_string),
            length: 0.0,
            inherit_translation: true,
            inherit_rotation: true,
            inherit_scale: true,
            inherit_reflection: true,
            transform: Transform::default(),
            constraints: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SlotData {
    pub name: String,
    /// Name of the bone the slot hangs from.
    pub parent: String,
    pub display_index: i32,
    pub z_order: usize,
    pub blend_mode: BlendMode,
    pub color: ColorTransform,
    pub actions: Vec<ActionData>,
}

impl SlotData {
    pub fn new(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            display_index: 0,
            z_order: 0,
            blend_mode: BlendMode::Normal,
            color: ColorTransform::default(),
            actions: Vec::new(),
        }
    }
}

/// Declarative description of one armature.
///
/// `bones` is ordered parent-before-child and `slots` in draw order; the
/// builder relies on both.
#[derive(Debug)]
pub struct ArmatureData {
    pub name: String,
    pub frame_rate: u32,
    pub aabb: Rect,
    pub bones: Vec<Rc<BoneData>>,
    pub slots: Vec<Rc<SlotData>>,
    pub skins: HashMap<String, Rc<SkinData>>,
    pub default_skin: Rc<SkinData>,
    pub animations: IndexMap<String, Rc<AnimationData>>,
    pub default_actions: Vec<ActionData>,
    pub actions: Vec<ActionData>,
}

impl ArmatureData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frame_rate: 0,
            aabb: Rect::default(),
            bones: Vec::new(),
            slots: Vec::new(),
            skins: HashMap::new(),
            default_skin: Rc::new(SkinData::new("default")),
            animations: IndexMap::new(),
            default_actions: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn get_bone(&self, name: &str) -> Option<&Rc<BoneData>> {
        self.bones.iter().find(|bone| bone.name == name)
    }

    pub fn get_slot(&self, name: &str) -> Option<&Rc<SlotData>> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    pub fn get_skin(&self, name: &str) -> Option<&Rc<SkinData>> {
        self.skins.get(name)
    }

    pub fn get_animation(&self, name: &str) -> Option<&Rc<AnimationData>> {
        self.animations.get(name)
    }

    /// Registers a skin; a skin called `default` (or the first one added)
    /// becomes the default skin.
    pub fn add_skin(&mut self, skin: SkinData) {
        let skin = Rc::new(skin);
        if self.skins.is_empty() || skin.name == "default" {
            self.default_skin = skin.clone();
        }
        self.skins.insert(skin.name.clone(), skin);
    }

    pub fn add_animation(&mut self, animation: AnimationData) {
        self.animations.insert(animation.name.clone(), Rc::new(animation));
    }

    /// Allocates frame caches for every clip of this armature.
    pub fn cache_frames(&self, frame_rate: f32) {
        for animation in self.animations.values() {
            animation.cache_frames(frame_rate, self);
        }
    }
}
