use crate::pool::Poolable;

/// Live IK constraint. Bones are referred to by their index in the owning
/// armature, resolved once while the armature is built.
#[derive(Clone, Debug, PartialEq)]
pub struct IkConstraint {
    pub name: String,
    pub target: usize,
    pub bone: usize,
    pub root: Option<usize>,
    pub bend_positive: bool,
    pub scale_enabled: bool,
    pub weight: f32,
}

impl Default for IkConstraint {
    fn default() -> Self {
        Self {
            name: String::new(),
            target: 0,
            bone: 0,
            root: None,
            bend_positive: true,
            scale_enabled: false,
            weight: 1.0,
        }
    }
}

impl Poolable for IkConstraint {
    fn clear(&mut self) {
        *self = Self::default();
    }
}
