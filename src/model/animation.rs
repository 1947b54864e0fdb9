use std::cell::{Ref, RefCell};
use std::collections::HashMap;

use super::armature::ArmatureData;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimelineKind {
    BoneAll,
    BoneTranslate,
    BoneRotate,
    BoneScale,
    SlotDisplay,
    SlotColor,
}

/// Frame layout of one timeline; the samples themselves are evaluated
/// elsewhere.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineData {
    pub kind: TimelineKind,
    pub frame_count: usize,
    /// Total duration of the timeline's frames, in armature frames.
    pub duration: u32,
}

/// Cached-pose addressing for one clip. An index of `-1` means the pose for
/// that frame has not been computed yet.
#[derive(Clone, Debug, Default)]
pub struct FrameCache {
    pub frame_rate: f32,
    pub cached_frames: Vec<bool>,
    pub bone_indices: HashMap<String, Vec<i32>>,
    pub slot_indices: HashMap<String, Vec<i32>>,
}

#[derive(Debug)]
pub struct AnimationData {
    pub name: String,
    pub frame_count: u32,
    /// 0 loops forever.
    pub play_times: u32,
    /// Seconds.
    pub duration: f32,
    pub scale: f32,
    pub fade_in_time: f32,
    pub bone_timelines: HashMap<String, Vec<TimelineData>>,
    pub slot_timelines: HashMap<String, Vec<TimelineData>>,
    cache: RefCell<FrameCache>,
}

impl AnimationData {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            frame_count: 0,
            play_times: 1,
            duration,
            scale: 1.0,
            fade_in_time: 0.0,
            bone_timelines: HashMap::new(),
            slot_timelines: HashMap::new(),
            cache: RefCell::new(FrameCache::default()),
        }
    }

    pub fn add_bone_timeline(&mut self, bone_name: &str, timeline: TimelineData) {
        self.bone_timelines
            .entry(bone_name.to_string())
            .or_insert_with(Vec::new)
            .push(timeline);
    }

    pub fn add_slot_timeline(&mut self, slot_name: &str, timeline: TimelineData) {
        self.slot_timelines
            .entry(slot_name.to_string())
            .or_insert_with(Vec::new)
            .push(timeline);
    }

    pub fn bone_timelines(&self, bone_name: &str) -> Option<&[TimelineData]> {
        self.bone_timelines.get(bone_name).map(Vec::as_slice)
    }

    pub fn slot_timelines(&self, slot_name: &str) -> Option<&[TimelineData]> {
        self.slot_timelines.get(slot_name).map(Vec::as_slice)
    }

    /// Allocates the frame cache at `frame_rate`, scaled by the clip's own
    /// time scale. Once a clip is cached its cache rate never changes.
    pub fn cache_frames(&self, frame_rate: f32, owner: &ArmatureData) {
        let mut cache = self.cache.borrow_mut();
        if cache.frame_rate > 0.0 {
            return;
        }

        cache.frame_rate = (frame_rate * self.scale).ceil().max(1.0);
        // One extra frame covers rounding at the end of the clip.
        let frame_count = (cache.frame_rate * self.duration).ceil() as usize + 1;

        cache.cached_frames = vec![false; frame_count];
        cache.bone_indices = owner
            .bones
            .iter()
            .map(|bone| (bone.name.clone(), vec![-1; frame_count]))
            .collect();
        cache.slot_indices = owner
            .slots
            .iter()
            .map(|slot| (slot.name.clone(), vec![-1; frame_count]))
            .collect();
        log::debug!(
            "cached `{}` at {} fps ({} frames)",
            self.name,
            cache.frame_rate,
            frame_count
        );
    }

    pub fn cache_frame_rate(&self) -> f32 {
        self.cache.borrow().frame_rate
    }

    pub fn frame_cache(&self) -> Ref<'_, FrameCache> {
        self.cache.borrow()
    }

    /// Cache slot for a play position in seconds, clamped to the last frame.
    pub fn cache_frame_index(&self, time: f32) -> Option<usize> {
        let cache = self.cache.borrow();
        if cache.frame_rate <= 0.0 || cache.cached_frames.is_empty() {
            return None;
        }
        let index = (time.max(0.0) * cache.frame_rate) as usize;
        Some(index.min(cache.cached_frames.len() - 1))
    }

    pub fn is_frame_cached(&self, frame: usize) -> bool {
        self.cache.borrow().cached_frames.get(frame).copied().unwrap_or(false)
    }

    pub fn set_frame_cached(&self, frame: usize) {
        if let Some(flag) = self.cache.borrow_mut().cached_frames.get_mut(frame) {
            *flag = true;
        }
    }

    pub fn bone_cached_frame_indices(&self, bone_name: &str) -> Option<Ref<'_, [i32]>> {
        let cache = self.cache.borrow();
        if !cache.bone_indices.contains_key(bone_name) {
            return None;
        }
        Some(Ref::map(cache, |cache| cache.bone_indices[bone_name].as_slice()))
    }

    pub fn slot_cached_frame_indices(&self, slot_name: &str) -> Option<Ref<'_, [i32]>> {
        let cache = self.cache.borrow();
        if !cache.slot_indices.contains_key(slot_name) {
            return None;
        }
        Some(Ref::map(cache, |cache| cache.slot_indices[slot_name].as_slice()))
    }

    /// Records where the pose of `bone_name` at `frame` lives in the shared
    /// sample buffer.
    pub fn set_bone_cached_frame_index(&self, bone_name: &str, frame: usize, sample: i32) -> bool {
        let mut cache = self.cache.borrow_mut();
        match cache.bone_indices.get_mut(bone_name).and_then(|indices| indices.get_mut(frame)) {
            Some(entry) => {
                *entry = sample;
                true
            }
            None => false,
        }
    }

    pub fn set_slot_cached_frame_index(&self, slot_name: &str, frame: usize, sample: i32) -> bool {
        let mut cache = self.cache.borrow_mut();
        match cache.slot_indices.get_mut(slot_name).and_then(|indices| indices.get_mut(frame)) {
            Some(entry) => {
                *entry = sample;
                true
            }
            None => false,
        }
    }
}
