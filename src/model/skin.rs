use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use super::action::ActionData;
use super::armature::ArmatureData;
use super::texture::TextureData;
use super::transform::Transform;
use crate::shared_types::Point;

/// Display list of one slot; `None` entries are deliberate gaps that keep
/// indices aligned with the slot's display index.
pub type DisplayList = Vec<Option<Rc<DisplayData>>>;

#[derive(Clone, Debug, Default)]
pub struct SkinData {
    pub name: String,
    pub displays: HashMap<String, DisplayList>,
}

impl SkinData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            displays: HashMap::new(),
        }
    }

    pub fn add_display(&mut self, slot_name: &str, display: Option<DisplayData>) {
        self.displays
            .entry(slot_name.to_string())
            .or_insert_with(Vec::new)
            .push(display.map(Rc::new));
    }

    pub fn get_displays(&self, slot_name: &str) -> Option<&DisplayList> {
        self.displays.get(slot_name)
    }

    pub fn get_display(&self, slot_name: &str, display_name: &str) -> Option<&Rc<DisplayData>> {
        self.get_displays(slot_name)?
            .iter()
            .flatten()
            .find(|display| display.name == display_name)
    }
}

/// What a slot can show.
#[derive(Debug)]
pub struct DisplayData {
    pub name: String,
    pub path: String,
    /// Name of the skeleton data set this display was parsed into.
    pub data_name: String,
    pub transform: Transform,
    pub kind: DisplayKind,
}

#[derive(Debug)]
pub enum DisplayKind {
    Image(ImageDisplayData),
    Mesh(MeshDisplayData),
    Armature(ArmatureDisplayData),
}

#[derive(Debug, Default)]
pub struct ImageDisplayData {
    pub pivot: Point,
    pub texture: RefCell<Option<Rc<TextureData>>>,
}

#[derive(Debug, Default)]
pub struct MeshDisplayData {
    pub inherit_deform: bool,
    pub vertices: Vec<f32>,
    pub uvs: Vec<f32>,
    pub triangles: Vec<u32>,
    pub weights: Vec<f32>,
    pub texture: RefCell<Option<Rc<TextureData>>>,
}

#[derive(Debug, Default)]
pub struct ArmatureDisplayData {
    pub inherit_animation: bool,
    pub actions: Vec<ActionData>,
    /// Filled in the first time the nested armature is built. Weak, since a
    /// display may point back at the armature that declares it.
    pub armature: RefCell<Weak<ArmatureData>>,
}

impl ArmatureDisplayData {
    pub fn armature(&self) -> Option<Rc<ArmatureData>> {
        self.armature.borrow().upgrade()
    }
}

impl DisplayData {
    pub fn image(name: &str, data_name: &str) -> Self {
        Self::with_kind(name, data_name, DisplayKind::Image(ImageDisplayData::default()))
    }

    pub fn mesh(name: &str, data_name: &str) -> Self {
        Self::with_kind(name, data_name, DisplayKind::Mesh(MeshDisplayData::default()))
    }

    pub fn armature(name: &str, data_name: &str, inherit_animation: bool, actions: Vec<ActionData>) -> Self {
        Self::with_kind(
            name,
            data_name,
            DisplayKind::Armature(ArmatureDisplayData {
                inherit_animation,
                actions,
                armature: RefCell::new(Weak::new()),
            }),
        )
    }

    fn with_kind(name: &str, data_name: &str, kind: DisplayKind) -> Self {
        Self {
            name: name.to_string(),
            path: name.to_string(),
            data_name: data_name.to_string(),
            transform: Transform::default(),
            kind,
        }
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, DisplayKind::Mesh(_))
    }

    pub fn is_armature(&self) -> bool {
        matches!(self.kind, DisplayKind::Armature(_))
    }

    /// Texture slot of image and mesh displays.
    pub fn texture_cell(&self) -> Option<&RefCell<Option<Rc<TextureData>>>> {
        match &self.kind {
            DisplayKind::Image(image) => Some(&image.texture),
            DisplayKind::Mesh(mesh) => Some(&mesh.texture),
            DisplayKind::Armature(_) => None,
        }
    }

    pub fn texture(&self) -> Option<Rc<TextureData>> {
        self.texture_cell().and_then(|cell| cell.borrow().clone())
    }
}
