use std::any::Any;
use std::rc::Rc;

use super::{Backend, DisplayObject};
use crate::armature::slot::Slot;
use crate::armature::Armature;
use crate::factory::BuildArmaturePackage;
use crate::model::armature::SlotData;
use crate::model::skin::DisplayList;
use crate::pool::ObjectPool;

/// Placeholder display object; only remembers what it stands for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeadlessDisplay {
    Armature(String),
    Image(String),
    Mesh(String),
}

impl DisplayObject for HeadlessDisplay {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Backend that builds the full armature graph without rendering anything.
#[derive(Clone, Debug)]
pub struct HeadlessBackend {
    pub supports_mesh: bool,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self { supports_mesh: true }
    }
}

impl Backend for HeadlessBackend {
    fn supports_mesh(&self) -> bool {
        self.supports_mesh
    }

    fn create_armature(&self, package: &BuildArmaturePackage, pool: &mut ObjectPool) -> Armature {
        let mut armature: Armature = pool.borrow();
        let display = HeadlessDisplay::Armature(package.armature.name.clone());
        armature.init(package.armature.clone(), Box::new(display));
        armature
    }

    fn create_slot(
        &self,
        _package: &BuildArmaturePackage,
        slot_data: &Rc<SlotData>,
        displays: &DisplayList,
        _armature: &Armature,
        pool: &mut ObjectPool,
    ) -> Slot {
        let mut slot: Slot = pool.borrow();
        slot.init(
            slot_data.clone(),
            displays.clone(),
            Box::new(HeadlessDisplay::Image(slot_data.name.clone())),
            Box::new(HeadlessDisplay::Mesh(slot_data.name.clone())),
        );
        slot
    }
}
