//! Minimal playback driver: picks clips, resolves playback parameters and
//! keeps the play head. Pose sampling is not done here.

pub mod config;

use std::rc::Rc;

use indexmap::IndexMap;

use crate::model::animation::AnimationData;
pub use config::{AnimationConfig, BoneMask, FadeOutMode, TweenType};

/// A clip being played with every "use the clip default" sentinel resolved.
#[derive(Clone, Debug)]
pub struct AnimationState {
    pub name: String,
    pub group: String,
    pub layer: u32,
    /// 0 loops forever.
    pub play_times: u32,
    pub time_scale: f32,
    pub fade_in_time: f32,
    pub fade_in_tween_type: TweenType,
    pub weight: f32,
    pub additive_blending: bool,
    pub bone_mask: BoneMask,
    animation_data: Rc<AnimationData>,
    duration: f32,
    position: f32,
    current_time: f32,
    current_play_times: u32,
    playing: bool,
}

impl AnimationState {
    fn new(animation_data: Rc<AnimationData>, config: &AnimationConfig, default_time_scale: f32) -> Self {
        let position = config.position.max(0.0);
        let duration = if config.duration < 0.0 {
            (animation_data.duration - position).max(0.0)
        } else {
            config.duration
        };
        let time_scale = if config.time_scale <= -100.0 {
            default_time_scale
        } else {
            config.time_scale
        };
        let play_times = match config.play_times {
            times if times < 0 => animation_data.play_times,
            times => times as u32,
        };
        let fade_in_time = if config.fade_in_time < 0.0 {
            animation_data.fade_in_time
        } else {
            config.fade_in_time
        };
        let name = if config.name.is_empty() {
            animation_data.name.clone()
        } else {
            config.name.clone()
        };

        Self {
            name,
            group: config.group.clone(),
            layer: config.layer,
            play_times,
            time_scale,
            fade_in_time,
            fade_in_tween_type: config.fade_in_tween_type,
            weight: config.weight,
            additive_blending: config.additive_blending,
            bone_mask: config.bone_mask.clone(),
            animation_data,
            duration,
            position,
            current_time: 0.0,
            current_play_times: 0,
            playing: true,
        }
    }

    pub fn animation_data(&self) -> &Rc<AnimationData> {
        &self.animation_data
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Play head in clip seconds.
    pub fn current_time(&self) -> f32 {
        self.position + self.current_time
    }

    pub fn current_play_times(&self) -> u32 {
        self.current_play_times
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_completed(&self) -> bool {
        self.play_times > 0 && self.current_play_times >= self.play_times
    }

    pub fn contains_bone_mask(&self, name: &str) -> bool {
        self.bone_mask.contains(name)
    }

    /// Frame cache slot of the current play head, once the clip is cached.
    pub fn cache_frame_index(&self) -> Option<usize> {
        self.animation_data.cache_frame_index(self.current_time())
    }

    fn advance_time(&mut self, passed_time: f32) {
        if !self.playing || self.is_completed() {
            return;
        }
        if self.duration <= 0.0 {
            self.current_play_times = self.play_times.max(1);
            self.playing = false;
            return;
        }

        let current_time = self.current_time + passed_time * self.time_scale;
        if !current_time.is_finite() {
            log::warn!("Non-finite time step on `{}`", self.name);
            return;
        }

        if current_time >= self.duration {
            // Float to int `as` saturates, so huge steps cannot overflow.
            let loops = (current_time / self.duration).floor() as u32;
            self.current_play_times = self.current_play_times.saturating_add(loops);
            if self.is_completed() {
                self.current_play_times = self.play_times;
                self.current_time = self.duration;
                self.playing = false;
                return;
            }
        }

        self.current_time = current_time.rem_euclid(self.duration);
        if self.current_time >= self.duration {
            self.current_time = 0.0;
        }
    }
}

/// Playback controller owned by every armature.
#[derive(Debug)]
pub struct Animation {
    pub time_scale: f32,
    animations: IndexMap<String, Rc<AnimationData>>,
    /// Clip of the armature's default play action, if it declares one.
    default_animation: Option<String>,
    state: Option<AnimationState>,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            animations: IndexMap::new(),
            default_animation: None,
            state: None,
        }
    }
}

impl Animation {
    /// Replaces the playable clips and stops whatever was playing.
    pub fn set_animations(&mut self, animations: IndexMap<String, Rc<AnimationData>>) {
        self.animations = animations;
        self.state = None;
    }

    pub fn set_default_animation(&mut self, name: Option<String>) {
        self.default_animation = name;
    }

    pub fn default_animation(&self) -> Option<&str> {
        self.default_animation.as_deref()
    }

    pub fn animations(&self) -> &IndexMap<String, Rc<AnimationData>> {
        &self.animations
    }

    pub fn animation_names(&self) -> impl Iterator<Item = &str> {
        self.animations.keys().map(String::as_str)
    }

    pub fn has_animation(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }

    /// Plays `name`, or resumes the last state, or starts the default clip,
    /// falling back to the first one.
    /// `play_times` of `-1` keeps the clip's own count.
    pub fn play(&mut self, name: Option<&str>, play_times: i32) -> Option<&AnimationState> {
        let name = match name {
            Some(name) => name.to_string(),
            None => {
                let resumable = self.state.as_ref().map_or(false, |state| !state.is_completed());
                if resumable {
                    if let Some(state) = self.state.as_mut() {
                        state.playing = true;
                    }
                    return self.state.as_ref();
                }
                match self.default_animation.as_ref().filter(|name| self.animations.contains_key(*name)) {
                    Some(name) => name.clone(),
                    None => self.animations.keys().next()?.clone(),
                }
            }
        };

        let config = AnimationConfig {
            animation: name,
            play_times,
            ..AnimationConfig::default()
        };
        self.play_config(&config)
    }

    pub fn play_config(&mut self, config: &AnimationConfig) -> Option<&AnimationState> {
        let animation_data = match self.animations.get(&config.animation) {
            Some(animation_data) => animation_data.clone(),
            None => {
                log::warn!("Non-existent animation `{}`", config.animation);
                return None;
            }
        };
        self.state = Some(AnimationState::new(animation_data, config, 1.0));
        self.state.as_ref()
    }

    pub fn stop(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.playing = false;
        }
    }

    pub fn reset(&mut self) {
        self.state = None;
    }

    pub fn state(&self) -> Option<&AnimationState> {
        self.state.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.state.as_ref().map_or(false, AnimationState::is_playing)
    }

    pub fn is_completed(&self) -> bool {
        self.state.as_ref().map_or(false, AnimationState::is_completed)
    }

    /// Clip name of the last started state.
    pub fn last_animation_name(&self) -> Option<&str> {
        self.state.as_ref().map(|state| state.animation_data.name.as_str())
    }

    pub fn advance_time(&mut self, passed_time: f32) {
        let time_scale = self.time_scale;
        if let Some(state) = self.state.as_mut() {
            state.advance_time(passed_time * time_scale);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animation() -> Animation {
        let mut walk = AnimationData::new("walk", 1.0);
        walk.play_times = 0;
        let mut jump = AnimationData::new("jump", 0.5);
        jump.fade_in_time = 0.2;
        jump.play_times = 2;

        let mut animations = IndexMap::new();
        animations.insert(walk.name.clone(), Rc::new(walk));
        animations.insert(jump.name.clone(), Rc::new(jump));
        let mut animation = Animation::default();
        animation.set_animations(animations);
        animation
    }

    #[test]
    fn test_play_without_name_starts_first_clip() {
        let mut animation = animation();
        let state = animation.play(None, -1).unwrap();
        assert_eq!(state.name, "walk");
        assert_eq!(state.play_times, 0);
        assert!(animation.is_playing());
    }

    #[test]
    fn test_config_sentinels_take_clip_defaults() {
        let mut animation = animation();
        let config = AnimationConfig {
            animation: "jump".into(),
            ..AnimationConfig::default()
        };
        let state = animation.play_config(&config).unwrap();
        assert_eq!(state.play_times, 2);
        assert_eq!(state.fade_in_time, 0.2);
        assert_eq!(state.time_scale, 1.0);
        assert_eq!(state.duration(), 0.5);

        let config = AnimationConfig {
            animation: "jump".into(),
            name: "big_jump".into(),
            play_times: 1,
            time_scale: 2.0,
            fade_in_time: 0.0,
            ..AnimationConfig::default()
        };
        let state = animation.play_config(&config).unwrap();
        assert_eq!(state.name, "big_jump");
        assert_eq!(state.play_times, 1);
        assert_eq!(state.time_scale, 2.0);
        assert_eq!(state.fade_in_time, 0.0);
    }

    #[test]
    fn test_finite_state_completes() {
        let mut animation = animation();
        animation.play(Some("jump"), -1);
        animation.advance_time(0.6);
        assert!(!animation.is_completed());
        assert_eq!(animation.state().unwrap().current_play_times(), 1);
        animation.advance_time(0.6);
        assert!(animation.is_completed());
        assert!(!animation.is_playing());
    }

    #[test]
    fn test_unknown_clip_is_not_played() {
        let mut animation = animation();
        assert!(animation.play(Some("fly"), -1).is_none());
        assert!(animation.state().is_none());
    }

    #[test]
    fn test_play_without_name_prefers_default_clip() {
        let mut animation = animation();
        animation.set_default_animation(Some("jump".into()));
        assert_eq!(animation.play(None, -1).unwrap().name, "jump");

        animation.reset();
        animation.set_default_animation(Some("fly".into()));
        assert_eq!(animation.play(None, -1).unwrap().name, "walk");
    }

    #[test]
    fn test_huge_step_on_looping_clip_wraps() {
        let mut animation = animation();
        animation.play(Some("walk"), -1);
        animation.advance_time(1.0e8);

        let state = animation.state().unwrap();
        assert!(state.is_playing());
        assert!(state.current_time() >= 0.0 && state.current_time() < 1.0);
        assert!(state.current_play_times() > 0);

        animation.time_scale = -1.0;
        animation.advance_time(1.0e8);
        let state = animation.state().unwrap();
        assert!(state.current_time() >= 0.0 && state.current_time() < 1.0);

        animation.advance_time(f32::INFINITY);
        assert!(animation.state().unwrap().current_time() < 1.0);
    }

    #[test]
    fn test_huge_step_completes_finite_clip() {
        let mut animation = animation();
        animation.play(Some("jump"), -1);
        animation.advance_time(1.0e8);

        let state = animation.state().unwrap();
        assert!(state.is_completed());
        assert_eq!(state.current_play_times(), 2);
        assert_eq!(state.current_time(), 0.5);
    }

    #[test]
    fn test_resume_after_stop() {
        let mut animation = animation();
        animation.play(Some("walk"), -1);
        animation.advance_time(0.25);
        animation.stop();
        animation.advance_time(0.25);
        assert_eq!(animation.state().unwrap().current_time(), 0.25);
        animation.play(None, -1);
        assert!(animation.is_playing());
        assert_eq!(animation.state().unwrap().current_time(), 0.25);
    }
}
