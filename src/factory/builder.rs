use std::collections::HashMap;
use std::rc::Rc;

use super::{BuildArmaturePackage, Factory};
use crate::armature::bone::Bone;
use crate::armature::constraint::IkConstraint;
use crate::armature::slot::SlotDisplay;
use crate::armature::Armature;
use crate::model::armature::ConstraintData;
use crate::model::skin::DisplayList;

impl Factory {
    /// Builds an armature that sits `depth` levels below a top level one.
    pub(crate) fn build_armature_at(
        &mut self,
        armature_name: &str,
        data_name: Option<&str>,
        skin_name: Option<&str>,
        atlas_name: Option<&str>,
        depth: usize,
    ) -> Option<Armature> {
        let package = match self.registry.resolve_armature(
            data_name.unwrap_or_default(),
            armature_name,
            skin_name.unwrap_or_default(),
            atlas_name.unwrap_or_default(),
        ) {
            Some(package) => package,
            None => {
                log::warn!("No armature data: {}, {}", armature_name, data_name.unwrap_or_default());
                return None;
            }
        };

        let mut armature = self.backend.create_armature(&package, &mut self.pool);
        self.build_bones(&package, &mut armature);
        self.build_slots(&package, &mut armature, depth);
        log::debug!(
            "built `{}` from `{}` with skin `{}`",
            armature.name(),
            package.data_name,
            package.skin.name
        );

        armature.invalidate_pose();
        armature.advance_time(0.0);
        Some(armature)
    }

    fn build_bones(&mut self, package: &BuildArmaturePackage, armature: &mut Armature) {
        for bone_data in package.armature.bones.iter() {
            let mut bone: Bone = self.pool.borrow();
            bone.init(bone_data.clone());
            let index = armature.add_bone(bone, bone_data.parent.as_deref());

            for constraint_data in bone_data.constraints.iter() {
                // Only bones built so far can be targeted.
                let target = match armature.bone_index(constraint_data.target()) {
                    Some(target) => target,
                    None => continue,
                };

                match constraint_data {
                    ConstraintData::Ik(ik) => {
                        let root = ik.root.as_deref().and_then(|name| armature.bone_index(name));
                        let mut constraint: IkConstraint = self.pool.borrow();
                        constraint.name = ik.name.clone();
                        constraint.target = target;
                        constraint.bone = index;
                        constraint.root = root;
                        constraint.bend_positive = ik.bend_positive;
                        constraint.scale_enabled = ik.scale_enabled;
                        constraint.weight = ik.weight;

                        if let Some(owner) = armature.bone_at_mut(root.unwrap_or(index)) {
                            owner.add_constraint(constraint);
                        }
                    }
                }
            }
        }
    }

    fn build_slots(&mut self, package: &BuildArmaturePackage, armature: &mut Armature, depth: usize) {
        let default_skin = &package.armature.default_skin;
        let mut skin_slots: HashMap<&str, &DisplayList> = default_skin
            .displays
            .iter()
            .map(|(slot_name, displays)| (slot_name.as_str(), displays))
            .collect();
        if !Rc::ptr_eq(&package.skin, default_skin) {
            for (slot_name, displays) in package.skin.displays.iter() {
                skin_slots.insert(slot_name.as_str(), displays);
            }
        }

        for slot_data in package.armature.slots.iter() {
            let displays = match skin_slots.get(slot_data.name.as_str()) {
                Some(displays) => *displays,
                None => continue,
            };

            let mut slot = self
                .backend
                .create_slot(package, slot_data, displays, armature, &mut self.pool);
            let display_list: Vec<SlotDisplay> = displays
                .iter()
                .map(|display| match display {
                    Some(display) => self.get_slot_display(Some(package), display, None, depth),
                    None => SlotDisplay::Empty,
                })
                .collect();

            slot.set_display_list(display_list);
            slot.set_display_index(slot_data.display_index);
            armature.add_slot(slot, &slot_data.parent);
        }
    }
}
