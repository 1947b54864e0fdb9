#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Play,
    Frame,
    Sound,
}

/// A declarative action, e.g. "play animation `walk`" attached to an
/// armature's default actions or to a nested armature display.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionData {
    pub kind: ActionKind,
    pub name: String,
    pub bone: Option<String>,
    pub slot: Option<String>,
    pub ints: Vec<i32>,
    pub floats: Vec<f32>,
    pub strings: Vec<String>,
}

impl ActionData {
    pub fn play(animation_name: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Play,
            name: animation_name.into(),
            bone: None,
            slot: None,
            ints: Vec::new(),
            floats: Vec::new(),
            strings: Vec::new(),
        }
    }
}
