use indexmap::IndexSet;
use serde::Deserialize;

use crate::armature::Armature;
use crate::error::{DataError, Result};
use crate::pool::Poolable;

/// Which playing states a new state fades out when it starts.
#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq)]
pub enum FadeOutMode {
    None,
    SameLayer,
    SameGroup,
    SameLayerAndGroup,
    All,
    Single,
}

#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq)]
pub enum TweenType {
    None,
    Line,
    Curve,
    QuadIn,
    QuadOut,
    QuadInOut,
}

impl TweenType {
    /// Maps linear progress `t` in `0..=1` onto the curve.
    pub fn ease(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            TweenType::None => {
                if t < 1.0 {
                    0.0
                } else {
                    1.0
                }
            }
            TweenType::Line => t,
            TweenType::Curve => t * t * (3.0 - 2.0 * t),
            TweenType::QuadIn => t * t,
            TweenType::QuadOut => -t * (t - 2.0),
            TweenType::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -2.0 * t * t + 4.0 * t - 1.0
                }
            }
        }
    }
}

/// Bones a playing state may touch.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(from = "Vec<String>")]
pub enum BoneMask {
    Unrestricted,
    Explicit(IndexSet<String>),
}

impl Default for BoneMask {
    fn default() -> Self {
        BoneMask::Unrestricted
    }
}

impl From<Vec<String>> for BoneMask {
    fn from(names: Vec<String>) -> Self {
        if names.is_empty() {
            BoneMask::Unrestricted
        } else {
            BoneMask::Explicit(names.into_iter().collect())
        }
    }
}

impl BoneMask {
    pub fn contains(&self, name: &str) -> bool {
        match self {
            BoneMask::Unrestricted => true,
            BoneMask::Explicit(names) => names.contains(name),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, BoneMask::Unrestricted)
    }

    /// Names of an explicit mask in insertion order; empty when unrestricted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        let names = match self {
            BoneMask::Unrestricted => None,
            BoneMask::Explicit(names) => Some(names.iter().map(String::as_str)),
        };
        names.into_iter().flatten()
    }

    fn insert(&mut self, name: &str) {
        match self {
            BoneMask::Explicit(names) => {
                names.insert(name.to_string());
            }
            BoneMask::Unrestricted => {
                *self = BoneMask::Explicit(std::iter::once(name.to_string()).collect());
            }
        }
    }

    fn remove(&mut self, name: &str) {
        if let BoneMask::Explicit(names) = self {
            names.shift_remove(name);
            if names.is_empty() {
                *self = BoneMask::Unrestricted;
            }
        }
    }
}

/// One playback request handed to [`crate::animation::Animation::play_config`].
///
/// Negative timing fields and a `time_scale` at or below `-100` mean
/// "use the clip's own value".
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    pub pause_fade_out: bool,
    pub fade_out_mode: FadeOutMode,
    pub fade_out_tween_type: TweenType,
    pub fade_out_time: f32,
    pub action_enabled: bool,
    pub additive_blending: bool,
    pub display_control: bool,
    pub pause_fade_in: bool,
    pub reset_to_pose: bool,
    pub fade_in_tween_type: TweenType,
    /// `-1` uses the clip default, `0` loops forever.
    pub play_times: i32,
    pub layer: u32,
    /// Start position in seconds.
    pub position: f32,
    pub duration: f32,
    pub time_scale: f32,
    pub fade_in_time: f32,
    pub auto_fade_out_time: f32,
    pub weight: f32,
    /// Name of the resulting state; defaults to `animation`.
    pub name: String,
    /// Clip to play.
    pub animation: String,
    pub group: String,
    pub bone_mask: BoneMask,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            pause_fade_out: true,
            fade_out_mode: FadeOutMode::All,
            fade_out_tween_type: TweenType::Line,
            fade_out_time: -1.0,
            action_enabled: true,
            additive_blending: false,
            display_control: true,
            pause_fade_in: true,
            reset_to_pose: true,
            fade_in_tween_type: TweenType::Line,
            play_times: -1,
            layer: 0,
            position: 0.0,
            duration: -1.0,
            time_scale: -100.0,
            fade_in_time: -1.0,
            auto_fade_out_time: -1.0,
            weight: 1.0,
            name: String::new(),
            animation: String::new(),
            group: String::new(),
            bone_mask: BoneMask::Unrestricted,
        }
    }
}

impl AnimationConfig {
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::de::from_str(source).map_err(|e| DataError::Config(e.to_string()))
    }

    /// Restores every field to its default.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn copy_from(&mut self, other: &AnimationConfig) {
        self.clone_from(other);
    }

    pub fn contains_bone_mask(&self, name: &str) -> bool {
        self.bone_mask.contains(name)
    }

    /// Adds `name` to the mask and, when `recursive`, every bone below it.
    /// Unknown bones are ignored.
    pub fn add_bone_mask(&mut self, armature: &Armature, name: &str, recursive: bool) {
        if armature.get_bone(name).is_none() {
            log::warn!("No bone `{}` in `{}` to add to the mask", name, armature.name());
            return;
        }

        self.bone_mask.insert(name);
        if recursive {
            for bone in armature.bones() {
                if armature.bone_contains(name, bone.name()) {
                    self.bone_mask.insert(bone.name());
                }
            }
        }
    }

    /// Removes `name` from the mask and, when `recursive`, every bone below
    /// it. Recursively removing from an unrestricted mask leaves an explicit
    /// mask of every bone outside the removed subtree.
    pub fn remove_bone_mask(&mut self, armature: &Armature, name: &str, recursive: bool) {
        self.bone_mask.remove(name);
        if !recursive || armature.get_bone(name).is_none() {
            return;
        }

        match &mut self.bone_mask {
            BoneMask::Explicit(names) => {
                names.retain(|bone| !armature.bone_contains(name, bone));
                if names.is_empty() {
                    self.bone_mask = BoneMask::Unrestricted;
                }
            }
            BoneMask::Unrestricted => {
                let kept: IndexSet<String> = armature
                    .bones()
                    .iter()
                    .map(|bone| bone.name())
                    .filter(|&bone| bone != name && !armature.bone_contains(name, bone))
                    .map(str::to_string)
                    .collect();
                if !kept.is_empty() {
                    self.bone_mask = BoneMask::Explicit(kept);
                }
            }
        }
    }
}

impl Poolable for AnimationConfig {
    fn clear(&mut self) {
        AnimationConfig::clear(self);
    }
}
