use std::rc::Rc;

use nalgebra::Matrix3;

use super::constraint::IkConstraint;
use crate::model::armature::BoneData;
use crate::model::transform::Transform;
use crate::pool::Poolable;

pub struct Bone {
    name: String,
    bone_data: Option<Rc<BoneData>>,
    pub(crate) parent: Option<usize>,
    /// Local transform, starting at the bind pose.
    pub transform: Transform,
    pub(crate) global: Matrix3<f32>,
    pub(crate) dirty: bool,
    constraints: Vec<IkConstraint>,
}

impl Default for Bone {
    fn default() -> Self {
        Self {
            name: String::new(),
            bone_data: None,
            parent: None,
            transform: Transform::default(),
            global: Matrix3::identity(),
            dirty: true,
            constraints: Vec::new(),
        }
    }
}

impl Bone {
    pub fn init(&mut self, bone_data: Rc<BoneData>) {
        self.name = bone_data.name.clone();
        self.transform = bone_data.transform;
        self.global = Matrix3::identity();
        self.dirty = true;
        self.bone_data = Some(bone_data);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bone_data(&self) -> Option<&Rc<BoneData>> {
        self.bone_data.as_ref()
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn global_transform(&self) -> &Matrix3<f32> {
        &self.global
    }

    /// World position of the bone origin.
    pub fn world_position(&self) -> (f32, f32) {
        (self.global[(0, 2)], self.global[(1, 2)])
    }

    /// Constraints evaluated right after this bone's own transform.
    pub fn constraints(&self) -> &[IkConstraint] {
        &self.constraints
    }

    pub fn add_constraint(&mut self, constraint: IkConstraint) {
        self.constraints.push(constraint);
    }

    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn take_constraints(&mut self) -> Vec<IkConstraint> {
        std::mem::take(&mut self.constraints)
    }
}

impl Poolable for Bone {
    fn clear(&mut self) {
        self.name.clear();
        self.bone_data = None;
        self.parent = None;
        self.transform = Transform::default();
        self.global = Matrix3::identity();
        self.dirty = true;
        self.constraints.clear();
    }
}
