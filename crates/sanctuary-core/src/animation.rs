//! Animation clip selection and playback policy

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AnimationConfig;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnimationError {
    #[error("Animation clip {index} requested but the model only has {available} clip(s)")]
    ClipOutOfRange { index: usize, available: usize },
}

/// How many times the selected clip plays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPolicy {
    Once,
    #[default]
    Forever,
    /// Play the clip `n` times in total
    Count(u32),
}

/// The clip that will drive the model and how it is played
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackPlan<C> {
    pub clip_index: usize,
    pub clip: C,
    pub rate: f32,
    pub loop_policy: LoopPolicy,
}

impl<C: Clone> PlaybackPlan<C> {
    /// Pick the configured clip out of a model's clip list.
    ///
    /// An index past the end is an error; no other clip is substituted.
    pub fn select(clips: &[C], config: &AnimationConfig) -> Result<Self, AnimationError> {
        let clip = clips
            .get(config.clip_index)
            .ok_or(AnimationError::ClipOutOfRange {
                index: config.clip_index,
                available: clips.len(),
            })?;

        Ok(Self {
            clip_index: config.clip_index,
            clip: clip.clone(),
            rate: config.playback_rate,
            loop_policy: config.loop_policy,
        })
    }
}
