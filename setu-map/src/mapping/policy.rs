//! Submap boundary policy.

use crate::config::ConfigLoadError;

/// Decide whether a frame starts a new submap.
///
/// `frame_count` is the number of frames processed before this one. The
/// first frame always creates; after that only keyframes landing on a
/// multiple of `keyframe_step` do.
#[inline]
pub fn should_create_submap(frame_count: u64, is_keyframe: bool, keyframe_step: u32) -> bool {
    if frame_count == 0 {
        return true;
    }
    if !is_keyframe {
        return false;
    }
    frame_count % u64::from(keyframe_step) == 0
}

/// Keyframe cadence for submap creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundaryPolicy {
    keyframe_step: u32,
}

impl BoundaryPolicy {
    /// Create a policy. A zero step is rejected.
    pub fn new(keyframe_step: u32) -> Result<Self, ConfigLoadError> {
        if keyframe_step == 0 {
            return Err(ConfigLoadError::Invalid(
                "keyframe_step must be at least 1".to_string(),
            ));
        }
        Ok(Self { keyframe_step })
    }

    /// Configured step.
    pub fn keyframe_step(&self) -> u32 {
        self.keyframe_step
    }

    /// See [`should_create_submap`].
    #[inline]
    pub fn should_create(&self, frame_count: u64, is_keyframe: bool) -> bool {
        should_create_submap(frame_count, is_keyframe, self.keyframe_step)
    }
}
