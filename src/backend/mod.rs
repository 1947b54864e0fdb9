//! Rendering backend boundary. The factory never creates display objects or
//! render textures itself; it asks the injected [`Backend`].

mod headless;
#[cfg(feature = "macroquad-backend")]
mod macroquad;

pub use headless::{HeadlessBackend, HeadlessDisplay};
#[cfg(feature = "macroquad-backend")]
pub use self::macroquad::{load_texture, MacroquadBackend, MacroquadDisplay};

use std::any::Any;
use std::fmt::Debug;
use std::rc::Rc;

use crate::armature::slot::Slot;
use crate::armature::Armature;
use crate::factory::BuildArmaturePackage;
use crate::model::armature::SlotData;
use crate::model::skin::DisplayList;
use crate::model::texture::TextureAtlasData;
use crate::pool::ObjectPool;

/// A backend specific drawable owned by a slot or an armature.
pub trait DisplayObject: Any + Debug {
    fn as_any(&self) -> &dyn Any;
}

pub trait Backend {
    /// Whether mesh displays can be deformed; otherwise they render as images.
    fn supports_mesh(&self) -> bool;

    fn create_texture_atlas_data(&self, pool: &mut ObjectPool) -> TextureAtlasData {
        pool.borrow()
    }

    /// Attaches a backend texture handle to a parsed atlas.
    fn bind_render_texture(&self, atlas: &TextureAtlasData, texture: Box<dyn Any>) {
        atlas.set_render_texture(texture);
    }

    /// Creates the empty armature shell the builder fills in.
    fn create_armature(&self, package: &BuildArmaturePackage, pool: &mut ObjectPool) -> Armature;

    /// Creates a slot with its raw and mesh display objects, not yet attached.
    fn create_slot(
        &self,
        package: &BuildArmaturePackage,
        slot_data: &Rc<SlotData>,
        displays: &DisplayList,
        armature: &Armature,
        pool: &mut ObjectPool,
    ) -> Slot;
}
