//! Live armatures built by the factory.

pub mod bone;
pub mod constraint;
pub mod slot;

use std::collections::HashMap;
use std::rc::Rc;

use indextree::{Arena, NodeId};

use crate::animation::Animation;
use crate::backend::DisplayObject;
use crate::model::action::{ActionData, ActionKind};
use crate::model::armature::ArmatureData;
use crate::pool::{ObjectPool, Poolable};
use bone::Bone;
use slot::{Slot, SlotDisplay};

pub struct Armature {
    name: String,
    armature_data: Option<Rc<ArmatureData>>,
    display: Option<Box<dyn DisplayObject>>,
    bones: Vec<Bone>,
    bone_tree: Arena<usize>,
    tree_handles: Vec<NodeId>,
    bone_lookup: HashMap<String, usize>,
    slots: Vec<Slot>,
    animation: Animation,
    actions: Vec<ActionData>,
    /// Whether the parent armature's clips drive this armature when it is
    /// shown as a nested display.
    pub inherit_animation: bool,
    pose_invalid: bool,
}

impl Default for Armature {
    fn default() -> Self {
        Self {
            name: String::new(),
            armature_data: None,
            display: None,
            bones: Vec::new(),
            bone_tree: Arena::new(),
            tree_handles: Vec::new(),
            bone_lookup: HashMap::new(),
            slots: Vec::new(),
            animation: Animation::default(),
            actions: Vec::new(),
            inherit_animation: true,
            pose_invalid: true,
        }
    }
}

impl Armature {
    pub fn init(&mut self, armature_data: Rc<ArmatureData>, display: Box<dyn DisplayObject>) {
        self.name = armature_data.name.clone();
        self.animation.set_animations(armature_data.animations.clone());
        let default_animation = armature_data
            .default_actions
            .iter()
            .find(|action| action.kind == ActionKind::Play && action.slot.is_none())
            .map(|action| action.name.clone());
        self.animation.set_default_animation(default_animation);
        self.armature_data = Some(armature_data);
        self.display = Some(display);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn armature_data(&self) -> Option<&Rc<ArmatureData>> {
        self.armature_data.as_ref()
    }

    pub fn display(&self) -> Option<&dyn DisplayObject> {
        self.display.as_deref()
    }

    /// Attaches `bone` under the bone named `parent`, or as a root.
    /// Returns the index of the new bone.
    pub fn add_bone(&mut self, mut bone: Bone, parent: Option<&str>) -> usize {
        let index = self.bones.len();
        let parent_index = parent.and_then(|parent_name| {
            let found = self.bone_lookup.get(parent_name).copied();
            if found.is_none() {
                log::warn!("Bone `{}` has no parent `{}` in `{}`", bone.name(), parent_name, self.name);
            }
            found
        });

        let handle = self.bone_tree.new_node(index);
        if let Some(parent_index) = parent_index {
            self.tree_handles[parent_index].append(handle, &mut self.bone_tree);
        }
        self.tree_handles.push(handle);

        bone.parent = parent_index;
        self.bone_lookup.insert(bone.name().to_string(), index);
        self.bones.push(bone);
        self.pose_invalid = true;
        index
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bone_lookup.get(name).copied()
    }

    pub fn get_bone(&self, name: &str) -> Option<&Bone> {
        self.bone_index(name).map(|index| &self.bones[index])
    }

    /// Mutable access marks the bone and its whole subtree dirty.
    pub fn get_bone_mut(&mut self, name: &str) -> Option<&mut Bone> {
        let index = self.bone_index(name)?;
        for node_id in self.tree_handles[index].descendants(&self.bone_tree) {
            if let Some(node) = self.bone_tree.get(node_id) {
                self.bones[*node.get()].invalidate();
            }
        }
        Some(&mut self.bones[index])
    }

    /// Bones in build order, parents before children.
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub(crate) fn bone_at_mut(&mut self, index: usize) -> Option<&mut Bone> {
        self.bones.get_mut(index)
    }

    /// True if `bone` sits somewhere below `ancestor`. A bone does not
    /// contain itself.
    pub fn bone_contains(&self, ancestor: &str, bone: &str) -> bool {
        match (self.bone_index(ancestor), self.bone_index(bone)) {
            (Some(ancestor), Some(bone)) if ancestor != bone => {
                let ancestor = self.tree_handles[ancestor];
                self.tree_handles[bone]
                    .ancestors(&self.bone_tree)
                    .skip(1)
                    .any(|node_id| node_id == ancestor)
            }
            _ => false,
        }
    }

    /// Attaches `slot` to the bone named `parent_bone`. Returns the slot index.
    pub fn add_slot(&mut self, mut slot: Slot, parent_bone: &str) -> usize {
        slot.parent = self.bone_index(parent_bone);
        if slot.parent.is_none() {
            log::warn!("Slot `{}` has no bone `{}` in `{}`", slot.name(), parent_bone, self.name);
        }
        self.slots.push(slot);
        self.slots.len() - 1
    }

    pub fn get_slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.name() == name)
    }

    pub fn get_slot_mut(&mut self, name: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|slot| slot.name() == name)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [Slot] {
        &mut self.slots
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn animation_mut(&mut self) -> &mut Animation {
        &mut self.animation
    }

    /// Queues an action for the next `advance_time`. With `append == false`
    /// the action is put in front of the queue. An action equal to one
    /// already queued is dropped.
    pub fn buffer_action(&mut self, action: ActionData, append: bool) {
        if self.actions.contains(&action) {
            return;
        }
        if append {
            self.actions.push(action);
        } else {
            self.actions.insert(0, action);
        }
    }

    pub fn buffered_actions(&self) -> &[ActionData] {
        &self.actions
    }

    /// Allocates frame caches for this armature's clips and those of every
    /// nested armature currently shown.
    pub fn enable_frame_cache(&self, frame_rate: f32) {
        if frame_rate <= 0.0 {
            return;
        }
        if let Some(data) = self.armature_data.as_ref() {
            data.cache_frames(frame_rate);
        }
        for child in self.slots.iter().filter_map(Slot::child_armature) {
            child.enable_frame_cache(frame_rate);
        }
    }

    pub fn invalidate_pose(&mut self) {
        self.pose_invalid = true;
    }

    pub fn advance_time(&mut self, passed_time: f32) {
        for action in std::mem::take(&mut self.actions) {
            self.run_action(&action);
        }

        self.animation.advance_time(passed_time);

        if self.pose_invalid {
            self.pose_invalid = false;
            for bone in self.bones.iter_mut() {
                bone.invalidate();
            }
        }
        self.update_matrices();

        let clip = self.animation.last_animation_name().map(str::to_string);
        for slot in self.slots.iter_mut() {
            if let Some(child) = slot.child_armature_mut() {
                if child.inherit_animation {
                    if let Some(clip) = clip.as_deref() {
                        if child.animation.has_animation(clip)
                            && child.animation.last_animation_name() != Some(clip)
                        {
                            child.animation.play(Some(clip), -1);
                        }
                    }
                }
                child.advance_time(passed_time);
            }
        }
    }

    fn run_action(&mut self, action: &ActionData) {
        match action.kind {
            ActionKind::Play => {
                if let Some(slot_name) = action.slot.as_deref() {
                    match self.get_slot_mut(slot_name).and_then(Slot::child_armature_mut) {
                        Some(child) => child.buffer_action(ActionData { slot: None, ..action.clone() }, true),
                        None => log::warn!("No child armature in slot `{}` of `{}`", slot_name, self.name),
                    }
                } else {
                    self.animation.play(Some(&action.name), -1);
                }
            }
            ActionKind::Frame | ActionKind::Sound => {
                log::debug!("`{}` skips {:?} action `{}`", self.name, action.kind, action.name);
            }
        }
    }

    fn update_matrices(&mut self) {
        for &node_id in self.tree_handles.iter() {
            let bone_id = match self.bone_tree.get(node_id) {
                Some(node) => *node.get(),
                None => continue,
            };
            if !self.bones[bone_id].dirty {
                continue;
            }

            let bone = &self.bones[bone_id];
            let (inherit_rotation, inherit_scale) = bone
                .bone_data()
                .map_or((true, true), |data| (data.inherit_rotation, data.inherit_scale));

            let mut local = bone.transform;
            if !inherit_rotation || !inherit_scale {
                let mut parent = bone.parent;
                while let Some(parent_id) = parent {
                    let parent_bone = &self.bones[parent_id];
                    if !inherit_rotation {
                        local.rotation -= parent_bone.transform.rotation;
                    }
                    if !inherit_scale {
                        local.scale_x /= parent_bone.transform.scale_x;
                        local.scale_y /= parent_bone.transform.scale_y;
                    }
                    parent = parent_bone.parent;
                }
            }

            let parent_transform = bone
                .parent
                .map_or_else(nalgebra::Matrix3::identity, |parent_id| self.bones[parent_id].global);

            let bone = &mut self.bones[bone_id];
            bone.global = parent_transform * local.to_matrix();
            bone.dirty = false;
        }
    }

    /// Returns bones, constraints, slots and nested armatures to `pool`.
    pub fn dispose(mut self, pool: &mut ObjectPool) {
        for mut slot in std::mem::take(&mut self.slots) {
            for display in slot.take_display_list() {
                if let SlotDisplay::Armature(child) = display {
                    child.dispose(pool);
                }
            }
            slot.take_backend_displays();
            pool.release(slot);
        }
        for mut bone in std::mem::take(&mut self.bones) {
            for constraint in bone.take_constraints() {
                pool.release(constraint);
            }
            pool.release(bone);
        }
        log::debug!("disposed armature `{}`", self.name);
        pool.release(self);
    }
}

impl Poolable for Armature {
    fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::animation::AnimationData;
    use crate::model::armature::BoneData;
    use crate::model::transform::Transform;

    fn bone(name: &str, parent: Option<&str>, x: f32) -> Bone {
        let mut data = BoneData::new(name, parent);
        data.transform = Transform { x, ..Transform::default() };
        let mut bone = Bone::default();
        bone.init(Rc::new(data));
        bone
    }

    fn chain() -> Armature {
        let mut armature = Armature::default();
        armature.add_bone(bone("root", None, 10.0), None);
        armature.add_bone(bone("mid", Some("root"), 5.0), Some("root"));
        armature.add_bone(bone("leaf", Some("mid"), 2.0), Some("mid"));
        armature.add_bone(bone("side", Some("root"), 1.0), Some("root"));
        armature
    }

    #[test]
    fn test_bone_contains_follows_hierarchy() {
        let armature = chain();
        assert!(armature.bone_contains("root", "leaf"));
        assert!(armature.bone_contains("mid", "leaf"));
        assert!(!armature.bone_contains("mid", "side"));
        assert!(!armature.bone_contains("leaf", "root"));
        assert!(!armature.bone_contains("mid", "mid"));
        assert!(!armature.bone_contains("mid", "missing"));
    }

    #[test]
    fn test_missing_parent_becomes_root() {
        let mut armature = chain();
        let index = armature.add_bone(bone("orphan", Some("nowhere"), 0.0), Some("nowhere"));
        assert_eq!(armature.bones()[index].parent(), None);
    }

    #[test]
    fn test_advance_time_resolves_world_positions() {
        let mut armature = chain();
        armature.advance_time(0.0);
        assert_eq!(armature.get_bone("leaf").unwrap().world_position(), (17.0, 0.0));

        armature.get_bone_mut("mid").unwrap().transform.x = 0.0;
        assert!(armature.get_bone("leaf").unwrap().dirty);
        assert!(!armature.get_bone("side").unwrap().dirty);
        armature.advance_time(0.0);
        assert_eq!(armature.get_bone("leaf").unwrap().world_position(), (12.0, 0.0));
    }

    #[test]
    fn test_buffered_play_action_runs_on_advance() {
        let mut data = ArmatureData::new("hero");
        data.add_animation(AnimationData::new("idle", 1.0));
        data.add_animation(AnimationData::new("walk", 1.0));
        let mut armature = Armature::default();
        armature.init(Rc::new(data), Box::new(crate::backend::HeadlessDisplay::Armature("hero".into())));

        armature.buffer_action(ActionData::play("walk"), true);
        armature.buffer_action(ActionData::play("walk"), true);
        assert_eq!(armature.buffered_actions().len(), 1);
        assert!(!armature.animation().is_playing());

        armature.advance_time(0.0);
        assert!(armature.buffered_actions().is_empty());
        assert_eq!(armature.animation().last_animation_name(), Some("walk"));
    }

    #[test]
    fn test_default_play_action_picks_unnamed_clip() {
        let mut data = ArmatureData::new("hero");
        data.add_animation(AnimationData::new("idle", 1.0));
        data.add_animation(AnimationData::new("walk", 1.0));
        data.default_actions.push(ActionData { slot: Some("weapon".into()), ..ActionData::play("idle") });
        data.default_actions.push(ActionData::play("walk"));
        let mut armature = Armature::default();
        armature.init(Rc::new(data), Box::new(crate::backend::HeadlessDisplay::Armature("hero".into())));

        assert_eq!(armature.animation().default_animation(), Some("walk"));
        assert_eq!(armature.animation_mut().play(None, -1).unwrap().name, "walk");
    }

    #[test]
    fn test_dispose_returns_parts_to_pool() {
        let mut pool = ObjectPool::new();
        let armature = chain();
        armature.dispose(&mut pool);
        assert_eq!(pool.free_count::<Bone>(), 4);
        assert_eq!(pool.free_count::<Armature>(), 1);

        let reused: Armature = pool.borrow();
        assert!(reused.bones().is_empty());
        assert!(reused.inherit_animation);
    }
}
