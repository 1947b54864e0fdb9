use std::rc::Rc;

use indexmap::IndexMap;

use super::{BuildArmaturePackage, Factory};
use crate::armature::slot::{Slot, SlotDisplay};
use crate::armature::Armature;
use crate::model::skin::{DisplayData, DisplayKind, SkinData};

impl Factory {
    /// Resolves one display record into what the slot shows, building the
    /// nested armature for armature displays. `raw` is the display the slot
    /// was declared with at the same index.
    pub(crate) fn get_slot_display(
        &mut self,
        package: Option<&BuildArmaturePackage>,
        display: &Rc<DisplayData>,
        raw: Option<&Rc<DisplayData>>,
        depth: usize,
    ) -> SlotDisplay {
        let data_name = package.map_or(display.data_name.as_str(), |package| package.data_name.as_str());
        let atlas_name = package.map_or("", |package| package.texture_atlas_name.as_str());

        match &display.kind {
            DisplayKind::Image(_) | DisplayKind::Mesh(_) => {
                self.resolve_display_texture(display, data_name, atlas_name);
                let as_mesh = display.is_mesh() || raw.map_or(false, |raw| raw.is_mesh());
                if as_mesh && self.backend.supports_mesh() {
                    SlotDisplay::Mesh
                } else {
                    SlotDisplay::Raw
                }
            }
            DisplayKind::Armature(nested) => {
                if depth >= self.config.max_nesting_depth {
                    log::warn!(
                        "Nested armature `{}` is deeper than {} levels",
                        display.path,
                        self.config.max_nesting_depth
                    );
                    return SlotDisplay::Empty;
                }

                let atlas_name = Some(atlas_name).filter(|name| !name.is_empty());
                let mut child = match self.build_armature_at(&display.path, Some(data_name), None, atlas_name, depth + 1)
                {
                    Some(child) => child,
                    None => return SlotDisplay::Empty,
                };

                child.inherit_animation = nested.inherit_animation;
                if !child.inherit_animation {
                    let actions = if nested.actions.is_empty() {
                        child
                            .armature_data()
                            .map_or_else(Vec::new, |data| data.default_actions.clone())
                    } else {
                        nested.actions.clone()
                    };

                    if actions.is_empty() {
                        child.animation_mut().play(None, -1);
                    } else {
                        for action in actions {
                            child.buffer_action(action, true);
                        }
                    }
                }

                if let Some(data) = child.armature_data() {
                    *nested.armature.borrow_mut() = Rc::downgrade(data);
                }
                SlotDisplay::Armature(Box::new(child))
            }
        }
    }

    /// A display without a texture looks it up through its data set name;
    /// one that already has a texture is rebound when an atlas override is
    /// given, even if the override has no such texture.
    fn resolve_display_texture(&self, display: &DisplayData, data_name: &str, atlas_name: &str) {
        let cell = match display.texture_cell() {
            Some(cell) => cell,
            None => return,
        };

        let missing = cell.borrow().is_none();
        if missing {
            *cell.borrow_mut() = self.registry.resolve_texture(data_name, &display.path);
        } else if !atlas_name.is_empty() {
            *cell.borrow_mut() = self.registry.resolve_texture(atlas_name, &display.path);
        }
    }

    /// Puts `display` at `display_index` of `slot`, or at its current index,
    /// growing the slot's lists with empty entries as needed.
    pub(crate) fn replace_slot_display_at(
        &mut self,
        package: Option<&BuildArmaturePackage>,
        display: Option<&Rc<DisplayData>>,
        slot: &mut Slot,
        display_index: Option<usize>,
    ) {
        let index = display_index
            .or_else(|| usize::try_from(slot.display_index()).ok())
            .unwrap_or(0);

        let mut display_list = slot.take_display_list();
        if display_list.len() <= index {
            display_list.resize_with(index + 1, SlotDisplay::default);
        }
        let display_datas = slot.display_datas_mut();
        if display_datas.len() <= index {
            display_datas.resize(index + 1, None);
        }
        display_datas[index] = display.cloned();

        let resolved = match display {
            Some(display) => {
                let raw = slot.raw_display_datas().get(index).cloned().flatten();
                self.get_slot_display(package, display, raw.as_ref(), 0)
            }
            None => SlotDisplay::Empty,
        };

        if let SlotDisplay::Armature(previous) = std::mem::replace(&mut display_list[index], resolved) {
            previous.dispose(&mut self.pool);
        }
        slot.set_display_list(display_list);
    }

    /// Replaces one display of `slot` with the display named `display_name`
    /// that `slot_name` declares in the armature's default skin.
    ///
    /// Returns `false` when the armature or the slot's display list cannot be
    /// found. A missing display name leaves the slot untouched.
    pub fn replace_slot_display(
        &mut self,
        data_name: Option<&str>,
        armature_name: &str,
        slot_name: &str,
        display_name: &str,
        slot: &mut Slot,
        display_index: Option<usize>,
    ) -> bool {
        let package = match self
            .registry
            .resolve_armature(data_name.unwrap_or_default(), armature_name, "", "")
        {
            Some(package) => package,
            None => return false,
        };
        let display = match package.skin.get_displays(slot_name) {
            Some(displays) => displays
                .iter()
                .flatten()
                .find(|display| display.name == display_name)
                .cloned(),
            None => return false,
        };

        if let Some(display) = display {
            self.replace_slot_display_at(Some(&package), Some(&display), slot, display_index);
        }
        true
    }

    /// Replaces every display of `slot` with the list `slot_name` declares,
    /// index by index.
    pub fn replace_slot_display_list(
        &mut self,
        data_name: Option<&str>,
        armature_name: &str,
        slot_name: &str,
        slot: &mut Slot,
    ) -> bool {
        let package = match self
            .registry
            .resolve_armature(data_name.unwrap_or_default(), armature_name, "", "")
        {
            Some(package) => package,
            None => return false,
        };
        let displays = match package.skin.get_displays(slot_name) {
            Some(displays) => displays.clone(),
            None => return false,
        };

        for (index, display) in displays.iter().enumerate() {
            self.replace_slot_display_at(Some(&package), display.as_ref(), slot, Some(index));
        }
        true
    }

    /// Rebuilds the display lists of every slot `skin` covers, except the
    /// slots named in `exclude`.
    pub fn change_skin(&mut self, armature: &mut Armature, skin: &SkinData, exclude: &[&str]) {
        for slot in armature.slots_mut() {
            if exclude.contains(&slot.name()) {
                continue;
            }
            let displays = match skin.get_displays(slot.name()) {
                Some(displays) => displays,
                None => continue,
            };

            let display_list: Vec<SlotDisplay> = displays
                .iter()
                .map(|display| match display {
                    Some(display) => self.get_slot_display(None, display, None, 0),
                    None => SlotDisplay::Empty,
                })
                .collect();

            slot.set_raw_display_datas(displays.clone());
            *slot.display_datas_mut() = displays.clone();
            for previous in slot.set_display_list(display_list) {
                if let SlotDisplay::Armature(previous) = previous {
                    previous.dispose(&mut self.pool);
                }
            }
        }
    }

    /// Gives `to` the clips of another armature, merged over its own unless
    /// `replace` is set, then does the same for every nested armature the
    /// source skin declares at matching slot indices.
    pub fn copy_animations_to_armature(
        &self,
        to: &mut Armature,
        from_armature_name: &str,
        from_skin_name: Option<&str>,
        from_data_name: Option<&str>,
        replace: bool,
    ) -> bool {
        let package = match self.registry.resolve_armature(
            from_data_name.unwrap_or_default(),
            from_armature_name,
            from_skin_name.unwrap_or_default(),
            "",
        ) {
            Some(package) => package,
            None => {
                log::warn!("No armature data: {}", from_armature_name);
                return false;
            }
        };

        let mut animations = if replace {
            IndexMap::new()
        } else {
            to.animation().animations().clone()
        };
        for (name, animation) in package.armature.animations.iter() {
            animations.insert(name.clone(), animation.clone());
        }
        to.animation_mut().set_animations(animations);

        for slot in to.slots_mut() {
            let displays = match package.skin.get_displays(slot.name()) {
                Some(displays) => displays,
                None => continue,
            };
            for (index, display) in slot.display_list_mut().iter_mut().enumerate() {
                let child = match display.as_armature_mut() {
                    Some(child) => child,
                    None => continue,
                };
                if let Some(Some(from_display)) = displays.get(index) {
                    if from_display.is_armature() {
                        self.copy_animations_to_armature(
                            child,
                            &from_display.path,
                            from_skin_name,
                            from_data_name,
                            replace,
                        );
                    }
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;

    const HERO_SKE: &[u8] = include_bytes!("../test_assets/hero_ske.json");
    const HERO_TEX: &[u8] = include_bytes!("../test_assets/hero_tex.json");

    fn hero() -> (Factory, Armature) {
        let mut factory = Factory::new(Box::new(HeadlessBackend::default()));
        factory.parse_skeleton_data(HERO_SKE, None, 1.0).unwrap();
        factory.parse_texture_atlas_data(HERO_TEX, None, None, 0.0).unwrap();
        let armature = factory.build_armature("hero", None, None, None).unwrap();
        (factory, armature)
    }

    fn clip_names(armature: &Armature) -> Vec<&str> {
        armature.animation().animation_names().collect()
    }

    #[test]
    fn test_replace_grows_lists_with_empty_entries() {
        let (mut factory, mut armature) = hero();
        let slot = armature.get_slot_mut("body_slot").unwrap();
        assert!(factory.replace_slot_display(Some("hero"), "hero", "arm_slot", "arm", slot, Some(3)));

        assert_eq!(slot.display_list().len(), 4);
        assert!(matches!(slot.display_list()[0], SlotDisplay::Raw));
        assert!(slot.display_list()[1].is_empty());
        assert!(slot.display_list()[2].is_empty());
        assert!(matches!(slot.display_list()[3], SlotDisplay::Mesh));

        let names: Vec<Option<&str>> = slot
            .display_datas()
            .iter()
            .map(|display| display.as_ref().map(|display| display.name.as_str()))
            .collect();
        assert_eq!(names, vec![Some("body"), None, None, Some("arm")]);
        assert_eq!(slot.raw_display_datas().len(), 1);
    }

    #[test]
    fn test_replace_follows_raw_mesh_display() {
        let (mut factory, mut armature) = hero();
        let slot = armature.get_slot_mut("arm_slot").unwrap();
        assert!(factory.replace_slot_display(None, "hero", "body_slot", "body", slot, None));

        assert!(matches!(slot.current_display(), Some(SlotDisplay::Mesh)));
        assert_eq!(slot.current_display_data().unwrap().name, "body");
        assert_eq!(slot.current_texture().unwrap().name, "body");
    }

    #[test]
    fn test_replace_with_unknown_names() {
        let (mut factory, mut armature) = hero();
        let slot = armature.get_slot_mut("body_slot").unwrap();
        assert!(!factory.replace_slot_display(None, "hero", "tail_slot", "body", slot, None));
        assert!(!factory.replace_slot_display(None, "dragon", "body_slot", "body", slot, None));
        assert!(factory.replace_slot_display(None, "hero", "body_slot", "tail", slot, None));
        assert_eq!(slot.display_list().len(), 1);
    }

    #[test]
    fn test_replacing_child_armature_disposes_it() {
        let (mut factory, mut armature) = hero();
        let slot = armature.get_slot_mut("weapon_slot").unwrap();
        assert!(slot.child_armature().is_some());

        assert!(factory.replace_slot_display(None, "hero", "body_slot", "body", slot, None));
        assert!(slot.child_armature().is_none());
        assert_eq!(factory.pool().free_count::<Armature>(), 1);
    }

    #[test]
    fn test_replace_display_list() {
        let (mut factory, mut armature) = hero();
        let slot = armature.get_slot_mut("body_slot").unwrap();
        assert!(factory.replace_slot_display_list(None, "hero", "arm_slot", slot));

        assert_eq!(slot.display_list().len(), 2);
        assert!(matches!(slot.display_list()[0], SlotDisplay::Mesh));
        assert!(slot.display_list()[1].is_empty());
        assert!(!factory.replace_slot_display_list(None, "hero", "tail_slot", slot));
    }

    #[test]
    fn test_change_skin_respects_exclusions() {
        let (mut factory, mut armature) = hero();
        let data = factory.get_armature_data("hero", None).unwrap();
        let armored = data.get_skin("armored").unwrap().clone();

        factory.change_skin(&mut armature, &armored, &["body_slot"]);
        let body_slot = armature.get_slot("body_slot").unwrap();
        assert_eq!(body_slot.current_display_data().unwrap().name, "body");

        factory.change_skin(&mut armature, &armored, &[]);
        let body_slot = armature.get_slot("body_slot").unwrap();
        assert_eq!(body_slot.current_display_data().unwrap().name, "armor");
        assert_eq!(body_slot.raw_display_datas().len(), 1);
        assert_eq!(body_slot.current_texture().unwrap().name, "armor");
        assert_eq!(armature.get_slot("arm_slot").unwrap().current_display_data().unwrap().name, "arm");
    }

    #[test]
    fn test_copy_animations_merges_and_recurses() {
        let (mut factory, mut armature) = hero();
        let moves = br#"{
            "name": "moves",
            "armature": [
                {
                    "name": "hero_moves",
                    "bone": [{ "name": "root" }],
                    "slot": [{ "name": "weapon_slot", "parent": "root" }],
                    "skin": [{ "slot": [{ "name": "weapon_slot", "display": [{ "type": "armature", "name": "sword_moves" }] }] }],
                    "animation": [{ "name": "run", "duration": 10 }]
                },
                { "name": "sword_moves", "animation": [{ "name": "slash", "duration": 5 }] }
            ]
        }"#;
        factory.parse_skeleton_data(moves, None, 1.0).unwrap();

        assert!(factory.copy_animations_to_armature(&mut armature, "hero_moves", None, Some("moves"), false));
        assert_eq!(clip_names(&armature), vec!["idle", "attack", "run"]);
        let weapon = armature.get_slot("weapon_slot").unwrap().child_armature().unwrap();
        assert_eq!(clip_names(weapon), vec!["swing", "rest", "slash"]);
        let shield = armature.get_slot("shield_slot").unwrap().child_armature().unwrap();
        assert_eq!(clip_names(shield), vec!["swing", "rest"]);

        assert!(factory.copy_animations_to_armature(&mut armature, "hero_moves", None, Some("moves"), true));
        assert_eq!(clip_names(&armature), vec!["run"]);
        assert!(!factory.copy_animations_to_armature(&mut armature, "ghost", None, Some("moves"), true));
    }

    #[test]
    fn test_atlas_override_rebinds_resolved_textures() {
        let (mut factory, _) = hero();
        let mut alt = crate::model::texture::TextureAtlasData::new("alt");
        alt.add_texture(crate::model::texture::TextureData {
            name: "body".into(),
            atlas_name: String::new(),
            rotated: false,
            region: Default::default(),
            frame: None,
        });
        factory.add_texture_atlas_data(Rc::new(alt), None);

        let armature = factory.build_armature("hero", None, None, Some("alt")).unwrap();
        let body_slot = armature.get_slot("body_slot").unwrap();
        assert_eq!(body_slot.current_texture().unwrap().atlas_name, "alt");
        // The override has no arm texture, so the arm loses its binding.
        assert!(armature.get_slot("arm_slot").unwrap().current_texture().is_none());
    }
}
