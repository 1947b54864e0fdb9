use std::any::Any;
use std::cell::{Cell, Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::pool::Poolable;
use crate::shared_types::Rect;

/// One named sub-region of an atlas page.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub name: String,
    /// Owning atlas name.
    pub atlas_name: String,
    pub rotated: bool,
    pub region: Rect,
    /// Untrimmed frame, when the exporter trimmed transparent borders.
    pub frame: Option<Rect>,
}

/// One atlas page plus the render texture a backend bound to it.
pub struct TextureAtlasData {
    pub name: String,
    pub image_path: String,
    pub width: u32,
    pub height: u32,
    pub scale: f32,
    auto_search: Cell<bool>,
    textures: HashMap<String, Rc<TextureData>>,
    render_texture: RefCell<Option<Box<dyn Any>>>,
}

impl fmt::Debug for TextureAtlasData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureAtlasData")
            .field("name", &self.name)
            .field("image_path", &self.image_path)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("textures", &self.textures.len())
            .field("has_render_texture", &self.render_texture.borrow().is_some())
            .finish()
    }
}

impl Default for TextureAtlasData {
    fn default() -> Self {
        Self {
            name: String::new(),
            image_path: String::new(),
            width: 0,
            height: 0,
            scale: 1.0,
            auto_search: Cell::new(false),
            textures: HashMap::new(),
            render_texture: RefCell::new(None),
        }
    }
}

impl TextureAtlasData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn auto_search(&self) -> bool {
        self.auto_search.get()
    }

    pub fn set_auto_search(&self, value: bool) {
        self.auto_search.set(value);
    }

    pub fn add_texture(&mut self, mut texture: TextureData) {
        texture.atlas_name = self.name.clone();
        self.textures.insert(texture.name.clone(), Rc::new(texture));
    }

    pub fn get_texture(&self, name: &str) -> Option<&Rc<TextureData>> {
        self.textures.get(name)
    }

    pub fn textures(&self) -> impl Iterator<Item = &Rc<TextureData>> {
        self.textures.values()
    }

    pub fn set_render_texture(&self, texture: Box<dyn Any>) {
        *self.render_texture.borrow_mut() = Some(texture);
    }

    pub fn render_texture(&self) -> Ref<'_, Option<Box<dyn Any>>> {
        self.render_texture.borrow()
    }
}

impl Poolable for TextureAtlasData {
    fn clear(&mut self) {
        self.name.clear();
        self.image_path.clear();
        self.width = 0;
        self.height = 0;
        self.scale = 1.0;
        self.auto_search.set(false);
        self.textures.clear();
        self.render_texture.replace(None);
    }
}
