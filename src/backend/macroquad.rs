use std::any::Any;
use std::rc::Rc;

use macroquad::prelude::{FilterMode, Texture2D};

use super::{Backend, DisplayObject};
use crate::armature::slot::Slot;
use crate::armature::Armature;
use crate::factory::BuildArmaturePackage;
use crate::model::armature::SlotData;
use crate::model::skin::DisplayList;
use crate::model::texture::TextureAtlasData;
use crate::pool::ObjectPool;

#[derive(Debug)]
pub enum MacroquadDisplay {
    Armature(String),
    Sprite(String),
    Mesh(String),
}

impl DisplayObject for MacroquadDisplay {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Default)]
pub struct MacroquadBackend;

impl Backend for MacroquadBackend {
    fn supports_mesh(&self) -> bool {
        true
    }

    /// Accepts either a ready `Texture2D` or the encoded image bytes of the
    /// atlas page.
    fn bind_render_texture(&self, atlas: &TextureAtlasData, texture: Box<dyn Any>) {
        let texture = match texture.downcast::<Texture2D>() {
            Ok(texture) => *texture,
            Err(other) => match other.downcast::<Vec<u8>>() {
                Ok(bytes) => match load_texture(&bytes) {
                    Ok(texture) => texture,
                    Err(e) => {
                        log::warn!("Cannot decode atlas image `{}`: {}", atlas.image_path, e);
                        return;
                    }
                },
                Err(_) => {
                    log::warn!("Unsupported render texture for atlas `{}`", atlas.name);
                    return;
                }
            },
        };
        atlas.set_render_texture(Box::new(texture));
    }

    fn create_armature(&self, package: &BuildArmaturePackage, pool: &mut ObjectPool) -> Armature {
        let mut armature: Armature = pool.borrow();
        let display = MacroquadDisplay::Armature(package.armature.name.clone());
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
            Box::new(MacroquadDisplay::Sprite(slot_data.name.clone())),
            Box::new(MacroquadDisplay::Mesh(slot_data.name.clone())),
        );
        slot
    }
}

/// Decodes an atlas page and bleeds opaque colors into fully transparent
/// neighbours, so linear filtering does not pull black fringes into sprites.
pub fn load_texture(texture_bytes: &[u8]) -> Result<Texture2D, image::ImageError> {
    let img = image::load_from_memory(texture_bytes)?.to_rgba8();
    let (width, height) = (img.width() as usize, img.height() as usize);
    let mut raw_bytes = img.into_raw();

    for _ in 0..3 {
        for j in 0..height {
            for i in 0..width {
                let at = 4 * (j * width + i);
                if !is_transparent(&raw_bytes, at) {
                    continue;
                }
                let neighbours = [
                    (j > 0).then(|| at - 4 * width),
                    (j + 1 < height).then(|| at + 4 * width),
                    (i > 0).then(|| at - 4),
                    (i + 1 < width).then(|| at + 4),
                ];
                for from in neighbours.iter().flatten() {
                    if !is_transparent(&raw_bytes, *from) {
                        raw_bytes.copy_within(*from..*from + 3, at);
                    }
                }
            }
        }
    }

    let texture = Texture2D::from_rgba8(width as u16, height as u16, &raw_bytes);
    texture.set_filter(FilterMode::Linear);
    Ok(texture)
}

fn is_transparent(bytes: &[u8], at: usize) -> bool {
    bytes[at..at + 4].iter().all(|&b| b == 0)
}
