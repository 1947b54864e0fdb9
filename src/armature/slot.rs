use std::rc::Rc;

use super::Armature;
use crate::backend::DisplayObject;
use crate::model::armature::SlotData;
use crate::model::skin::{DisplayData, DisplayList};
use crate::model::texture::TextureData;
use crate::pool::Poolable;
use crate::shared_types::{BlendMode, ColorTransform};

/// One resolved entry of a slot's display list.
///
/// `Raw` and `Mesh` stand for the slot's own backend display objects; a
/// slot owns exactly one of each and every entry of that kind shares it.
pub enum SlotDisplay {
    Empty,
    Raw,
    Mesh,
    Armature(Box<Armature>),
}

impl Default for SlotDisplay {
    fn default() -> Self {
        SlotDisplay::Empty
    }
}

impl SlotDisplay {
    pub fn is_empty(&self) -> bool {
        matches!(self, SlotDisplay::Empty)
    }

    pub fn as_armature(&self) -> Option<&Armature> {
        match self {
            SlotDisplay::Armature(armature) => Some(armature),
            _ => None,
        }
    }

    pub fn as_armature_mut(&mut self) -> Option<&mut Armature> {
        match self {
            SlotDisplay::Armature(armature) => Some(armature),
            _ => None,
        }
    }
}

pub struct Slot {
    name: String,
    slot_data: Option<Rc<SlotData>>,
    pub(crate) parent: Option<usize>,
    display_index: i32,
    /// Display data as declared by the skin the slot was built from.
    raw_display_datas: DisplayList,
    /// Display data currently in use; replacements land here.
    display_datas: DisplayList,
    display_list: Vec<SlotDisplay>,
    raw_display: Option<Box<dyn DisplayObject>>,
    mesh_display: Option<Box<dyn DisplayObject>>,
    pub blend_mode: BlendMode,
    pub color: ColorTransform,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            name: String::new(),
            slot_data: None,
            parent: None,
            display_index: -1,
            raw_display_datas: Vec::new(),
            display_datas: Vec::new(),
            display_list: Vec::new(),
            raw_display: None,
            mesh_display: None,
            blend_mode: BlendMode::Normal,
            color: ColorTransform::default(),
        }
    }
}

impl Slot {
    pub fn init(
        &mut self,
        slot_data: Rc<SlotData>,
        raw_display_datas: DisplayList,
        raw_display: Box<dyn DisplayObject>,
        mesh_display: Box<dyn DisplayObject>,
    ) {
        self.name = slot_data.name.clone();
        self.blend_mode = slot_data.blend_mode;
        self.color = slot_data.color;
        self.display_datas = raw_display_datas.clone();
        self.raw_display_datas = raw_display_datas;
        self.raw_display = Some(raw_display);
        self.mesh_display = Some(mesh_display);
        self.slot_data = Some(slot_data);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slot_data(&self) -> Option<&Rc<SlotData>> {
        self.slot_data.as_ref()
    }

    /// Index of the bone the slot is attached to.
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn display_index(&self) -> i32 {
        self.display_index
    }

    pub fn set_display_index(&mut self, index: i32) {
        self.display_index = index.max(-1);
    }

    pub fn display_list(&self) -> &[SlotDisplay] {
        &self.display_list
    }

    pub fn display_list_mut(&mut self) -> &mut [SlotDisplay] {
        &mut self.display_list
    }

    /// Installs a new display list and hands back the previous one.
    pub fn set_display_list(&mut self, display_list: Vec<SlotDisplay>) -> Vec<SlotDisplay> {
        std::mem::replace(&mut self.display_list, display_list)
    }

    pub fn take_display_list(&mut self) -> Vec<SlotDisplay> {
        std::mem::take(&mut self.display_list)
    }

    pub fn raw_display_datas(&self) -> &DisplayList {
        &self.raw_display_datas
    }

    pub fn set_raw_display_datas(&mut self, displays: DisplayList) {
        self.raw_display_datas = displays;
    }

    pub fn display_datas(&self) -> &DisplayList {
        &self.display_datas
    }

    pub fn display_datas_mut(&mut self) -> &mut DisplayList {
        &mut self.display_datas
    }

    pub fn raw_display(&self) -> Option<&dyn DisplayObject> {
        self.raw_display.as_deref()
    }

    pub fn mesh_display(&self) -> Option<&dyn DisplayObject> {
        self.mesh_display.as_deref()
    }

    pub fn current_display(&self) -> Option<&SlotDisplay> {
        usize::try_from(self.display_index).ok().and_then(|index| self.display_list.get(index))
    }

    pub fn current_display_data(&self) -> Option<&Rc<DisplayData>> {
        usize::try_from(self.display_index)
            .ok()
            .and_then(|index| self.display_datas.get(index))
            .and_then(Option::as_ref)
    }

    pub fn current_texture(&self) -> Option<Rc<TextureData>> {
        self.current_display_data().and_then(|display| display.texture())
    }

    pub fn child_armature(&self) -> Option<&Armature> {
        self.current_display().and_then(SlotDisplay::as_armature)
    }

    pub fn child_armature_mut(&mut self) -> Option<&mut Armature> {
        let index = usize::try_from(self.display_index).ok()?;
        self.display_list.get_mut(index).and_then(SlotDisplay::as_armature_mut)
    }

    pub(crate) fn take_backend_displays(&mut self) {
        self.raw_display = None;
        self.mesh_display = None;
    }
}

impl Poolable for Slot {
    fn clear(&mut self) {
        *self = Self::default();
    }
}
