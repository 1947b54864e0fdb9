//! Turns serialized DragonBones data into the runtime model.

use std::collections::HashSet;

use serde_json::Value;

use crate::atlas_data::RawAtlas;
use crate::error::{DataError, Result};
use crate::model::action::{ActionData, ActionKind};
use crate::model::animation::{AnimationData, TimelineData, TimelineKind};
use crate::model::armature::{ArmatureData, BoneData, ConstraintData, IkConstraintData, SlotData};
use crate::model::skin::{DisplayData, DisplayKind, ImageDisplayData, MeshDisplayData, SkinData};
use crate::model::texture::TextureAtlasData;
use crate::model::SkeletonDataSet;
use crate::skeleton_data::actions::RawActionData;
use crate::skeleton_data::animation::{RawAnimationData, RawFrame};
use crate::skeleton_data::armature::RawArmatureData;
use crate::skeleton_data::bone::RawBone;
use crate::skeleton_data::skin::RawDisplay;
use crate::skeleton_data::RawSkeletonData;

const DEFAULT_FRAME_RATE: u32 = 24;

pub trait DataParser {
    fn parse_skeleton_data(&self, raw: &[u8], scale: f32) -> Result<SkeletonDataSet>;

    /// Fills `target` from one serialized atlas page.
    fn parse_texture_atlas_data(&self, raw: &[u8], target: &mut TextureAtlasData, scale: f32) -> Result<()>;
}

#[derive(Copy, Clone, Debug, Default)]
pub struct JsonDataParser;

impl DataParser for JsonDataParser {
    fn parse_skeleton_data(&self, raw: &[u8], scale: f32) -> Result<SkeletonDataSet> {
        let raw: RawSkeletonData = serde_json::from_slice(raw)?;
        let mut data_set = SkeletonDataSet::new(raw.name.clone());
        data_set.version = raw.version.clone();
        data_set.frame_rate = if raw.frame_rate > 0 { raw.frame_rate } else { DEFAULT_FRAME_RATE };

        for raw_armature in raw.armatures.iter() {
            let armature = parse_armature(raw_armature, &data_set.name, data_set.frame_rate, scale)?;
            data_set.add_armature(armature);
        }
        log::debug!(
            "parsed `{}` with {} armature(s)",
            data_set.name,
            data_set.armature_names().count()
        );
        Ok(data_set)
    }

    fn parse_texture_atlas_data(&self, raw: &[u8], target: &mut TextureAtlasData, scale: f32) -> Result<()> {
        let raw: RawAtlas = serde_json::from_slice(raw)?;
        raw.fill(target, scale);
        Ok(())
    }
}

fn parse_armature(raw: &RawArmatureData, data_name: &str, frame_rate: u32, scale: f32) -> Result<ArmatureData> {
    if !matches!(raw.armature_type.as_str(), "Armature" | "Stage") {
        return Err(DataError::UnsupportedArmature(raw.armature_type.clone(), raw.name.clone()));
    }

    let mut armature = ArmatureData::new(raw.name.clone());
    armature.frame_rate = if raw.frame_rate > 0 { raw.frame_rate } else { frame_rate };
    armature.aabb = raw.aa_bb;
    armature.aabb.x *= scale;
    armature.aabb.y *= scale;
    armature.aabb.width *= scale;
    armature.aabb.height *= scale;

    let mut bones: Vec<BoneData> = sort_bones(&raw.bones, &raw.name)
        .into_iter()
        .map(|(raw_bone, parent)| {
            let mut bone = BoneData::new(raw_bone.name.clone(), parent);
            bone.length = raw_bone.length * scale;
            bone.inherit_translation = raw_bone.inherit_translation;
            bone.inherit_rotation = raw_bone.inherit_rotation;
            bone.inherit_scale = raw_bone.inherit_scale;
            bone.inherit_reflection = raw_bone.inherit_reflection;
            bone.transform = raw_bone.transform.to_transform(scale);
            bone
        })
        .collect();

    for ik in raw.ik.iter() {
        let position = match bones.iter().position(|bone| bone.name == ik.bone) {
            Some(position) => position,
            None => {
                log::warn!("IK `{}` controls missing bone `{}` in `{}`", ik.name, ik.bone, raw.name);
                continue;
            }
        };
        let root = if ik.chain_length > 0 { bones[position].parent.clone() } else { None };
        bones[position].constraints.push(ConstraintData::Ik(IkConstraintData {
            name: ik.name.clone(),
            target: ik.target.clone(),
            root,
            bend_positive: ik.bend_positive,
            scale_enabled: ik.scale,
            weight: ik.weight,
        }));
    }
    armature.bones = bones.into_iter().map(std::rc::Rc::new).collect();

    for (z_order, raw_slot) in raw.slots.iter().enumerate() {
        let mut slot = SlotData::new(raw_slot.name.clone(), raw_slot.parent.clone());
        slot.display_index = raw_slot.display_index;
        slot.z_order = z_order;
        slot.blend_mode = raw_slot.blend_mode;
        slot.color = raw_slot.color_transform;
        slot.actions = raw_slot.actions.iter().filter_map(parse_action).collect();
        armature.slots.push(std::rc::Rc::new(slot));
    }

    for raw_skin in raw.skins.iter() {
        let mut skin = SkinData::new(raw_skin.name.clone());
        for raw_slot in raw_skin.slots.iter() {
            skin.displays.entry(raw_slot.name.clone()).or_insert_with(Vec::new);
            for raw_display in raw_slot.displays.iter() {
                skin.add_display(&raw_slot.name, parse_display(raw_display, data_name, scale));
            }
        }
        armature.add_skin(skin);
    }

    for raw_animation in raw.animations.iter() {
        armature.add_animation(parse_animation(raw_animation, armature.frame_rate));
    }

    armature.default_actions = raw.default_actions.iter().filter_map(parse_action).collect();
    armature.actions = raw.actions.iter().filter_map(parse_action).collect();
    Ok(armature)
}

/// Orders bones parent-first. Bones whose parent never shows up are kept as
/// roots.
fn sort_bones<'a>(raw_bones: &'a [RawBone], armature_name: &str) -> Vec<(&'a RawBone, Option<&'a str>)> {
    let mut sorted = Vec::with_capacity(raw_bones.len());
    let mut placed: HashSet<&str> = HashSet::new();
    let mut pending: Vec<&RawBone> = raw_bones.iter().collect();

    while !pending.is_empty() {
        let before = pending.len();
        pending.retain(|&bone| match bone.parent.as_deref() {
            Some(parent) if !placed.contains(parent) => true,
            parent => {
                sorted.push((bone, parent));
                placed.insert(bone.name.as_str());
                false
            }
        });

        if pending.len() == before {
            for bone in pending.drain(..) {
                log::warn!(
                    "Bone `{}` has no parent `{}` in `{}`",
                    bone.name,
                    bone.parent.as_deref().unwrap_or_default(),
                    armature_name
                );
                sorted.push((bone, None));
                placed.insert(bone.name.as_str());
            }
        }
    }
    sorted
}

fn parse_display(raw: &RawDisplay, data_name: &str, scale: f32) -> Option<DisplayData> {
    let path_or_name = |path: &str, name: &str| if path.is_empty() { name.to_string() } else { path.to_string() };
    match raw {
        RawDisplay::Image(image) => {
            let mut display = DisplayData::image(&image.name, data_name);
            display.path = path_or_name(&image.path, &image.name);
            display.transform = image.transform.to_transform(scale);
            display.kind = DisplayKind::Image(ImageDisplayData {
                pivot: image.pivot,
                ..ImageDisplayData::default()
            });
            Some(display)
        }
        RawDisplay::Mesh(mesh) => {
            let mut display = DisplayData::mesh(&mesh.name, data_name);
            display.path = path_or_name(&mesh.path, &mesh.name);
            display.transform = mesh.transform.to_transform(scale);
            display.kind = DisplayKind::Mesh(MeshDisplayData {
                inherit_deform: mesh.inherit_deform,
                vertices: mesh.vertices.iter().map(|v| v * scale).collect(),
                uvs: mesh.uvs.clone(),
                triangles: mesh.triangles.clone(),
                weights: mesh.weights.clone(),
                ..MeshDisplayData::default()
            });
            Some(display)
        }
        RawDisplay::Armature(armature) => {
            let actions = armature.actions.iter().filter_map(parse_action).collect();
            let mut display = DisplayData::armature(&armature.name, data_name, armature.inherit_animation, actions);
            display.path = path_or_name(&armature.path, &armature.name);
            display.transform = armature.transform.to_transform(scale);
            Some(display)
        }
        RawDisplay::BoundingBox { name } => {
            log::debug!("bounding box `{}` kept as an empty display", name);
            None
        }
    }
}

fn parse_action(raw: &RawActionData) -> Option<ActionData> {
    let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_string());

    let (kind, name) = if !raw.goto_and_play.is_empty() {
        (ActionKind::Play, raw.goto_and_play.clone())
    } else {
        let kind = match &raw.action_type {
            Value::Null => ActionKind::Play,
            Value::String(kind) => match kind.as_str() {
                "play" => ActionKind::Play,
                "frame" => ActionKind::Frame,
                "sound" => ActionKind::Sound,
                other => {
                    log::warn!("Unknown action type `{}`", other);
                    return None;
                }
            },
            Value::Number(kind) => match kind.as_i64() {
                Some(0) => ActionKind::Play,
                Some(10) => ActionKind::Frame,
                Some(11) => ActionKind::Sound,
                _ => {
                    log::warn!("Unknown action type `{}`", kind);
                    return None;
                }
            },
            other => {
                log::warn!("Unknown action type `{}`", other);
                return None;
            }
        };
        (kind, raw.name.clone())
    };

    Some(ActionData {
        kind,
        name,
        bone: non_empty(&raw.bone_name),
        slot: non_empty(&raw.slot_name),
        ints: raw.user_ints.clone(),
        floats: raw.user_floats.clone(),
        strings: raw.user_strings.clone(),
    })
}

fn parse_animation(raw: &RawAnimationData, frame_rate: u32) -> AnimationData {
    let frame_rate = frame_rate.max(1) as f32;
    let mut animation = AnimationData::new(raw.name.clone(), raw.duration as f32 / frame_rate);
    animation.frame_count = raw.duration;
    animation.play_times = raw.play_times;
    animation.fade_in_time = raw.fade_in_time;
    animation.scale = raw.scale;

    for timeline in raw.bone_timelines.iter() {
        let tracks = [
            (TimelineKind::BoneAll, &timeline.frames),
            (TimelineKind::BoneTranslate, &timeline.translate_frames),
            (TimelineKind::BoneRotate, &timeline.rotate_frames),
            (TimelineKind::BoneScale, &timeline.scale_frames),
        ];
        for (kind, frames) in tracks {
            if let Some(timeline_data) = timeline_data(kind, frames) {
                animation.add_bone_timeline(&timeline.bone_name, timeline_data);
            }
        }
    }
    for timeline in raw.slot_timelines.iter() {
        let tracks = [
            (TimelineKind::SlotDisplay, &timeline.display_frames),
            (TimelineKind::SlotColor, &timeline.color_frames),
        ];
        for (kind, frames) in tracks {
            if let Some(timeline_data) = timeline_data(kind, frames) {
                animation.add_slot_timeline(&timeline.name, timeline_data);
            }
        }
    }
    animation
}

fn timeline_data(kind: TimelineKind, frames: &[RawFrame]) -> Option<TimelineData> {
    if frames.is_empty() {
        return None;
    }
    Some(TimelineData {
        kind,
        frame_count: frames.len(),
        duration: frames.iter().map(|frame| frame.duration).sum(),
    })
}
