//! Looped, time-indexed playback of a reference trajectory.

use crate::error::Result;
use crate::parse::{parse_bvh_from_file, parse_bvh_from_string};
use crate::pose::{build_pose_trajectory, PoseTrajectory};
use crate::profile::Profile;
use std::path::Path;

/// Absorbs rounding in `time / frame_time` so that `k * frame_time` maps to frame `k`.
const FRAME_EPSILON: f64 = 1e-9;

/// Where a point in time falls in the looped trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    /// Frame within the stored trajectory.
    pub frame: usize,
    /// Number of completed loops.
    pub cycle: usize,
}

/// A reference motion that can be sampled at any time >= 0, looping forever.
///
/// Each completed loop moves the forward row on by the drift of one loop, so a cyclic gait keeps
/// walking forward instead of snapping back to its start.
#[derive(Debug, Clone)]
pub struct ReferenceMotion {
    trajectory: PoseTrajectory,
    num_frames: usize,
    /// Frame returned by the last `sample` call.
    frame_idx: usize,
}

impl ReferenceMotion {
    /// Returns `None` for a trajectory without frames.
    pub fn new(trajectory: PoseTrajectory) -> Option<Self> {
        let num_frames = trajectory.num_frames();
        if num_frames == 0 {
            return None;
        }
        Some(ReferenceMotion {
            trajectory,
            num_frames,
            frame_idx: 0,
        })
    }

    pub fn from_file(file_path: impl AsRef<Path>, profile: Profile) -> Result<Self> {
        let clip = parse_bvh_from_file(file_path)?;
        Ok(Self::from_non_empty(build_pose_trajectory(&clip, profile)?))
    }

    pub fn from_bvh_str(bvh_string: &str, profile: Profile) -> Result<Self> {
        let clip = parse_bvh_from_string(bvh_string)?;
        Ok(Self::from_non_empty(build_pose_trajectory(&clip, profile)?))
    }

    // parsed clips always hold at least one frame
    fn from_non_empty(trajectory: PoseTrajectory) -> Self {
        let num_frames = trajectory.num_frames();
        ReferenceMotion {
            trajectory,
            num_frames,
            frame_idx: 0,
        }
    }

    pub fn trajectory(&self) -> &PoseTrajectory {
        &self.trajectory
    }

    pub fn profile(&self) -> Profile {
        self.trajectory.profile()
    }

    pub fn frame_time(&self) -> f64 {
        self.trajectory.frame_time()
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Frame picked by the most recent `sample` call.
    pub fn current_frame(&self) -> usize {
        self.frame_idx
    }

    /// Length of one loop in seconds.
    pub fn duration(&self) -> f64 {
        self.num_frames as f64 * self.frame_time()
    }

    /// Forward displacement gained per loop: last frame minus the second frame of the forward row.
    pub fn cycle_drift(&self) -> f64 {
        let Some(row) = self
            .profile()
            .forward_row()
            .and_then(|dof| self.trajectory.row(dof))
        else {
            return 0.0;
        };
        //// a single frame clip has no second frame and never drifts
        match (row.get(1), row.last()) {
            (Some(second), Some(last)) => last - second,
            _ => 0.0,
        }
    }

    /// Frame and loop count for `time` seconds. Negative times count as 0.
    pub fn playback_state(&self, time: f64) -> PlaybackState {
        let raw_frame = (time.max(0.0) / self.frame_time() + FRAME_EPSILON).floor() as usize;
        PlaybackState {
            frame: raw_frame % self.num_frames,
            cycle: raw_frame / self.num_frames,
        }
    }

    /// Pose at `time` seconds, without touching `current_frame`.
    pub fn pose_at(&self, time: f64) -> Vec<f64> {
        let state = self.playback_state(time);
        let mut pose = self
            .trajectory
            .column(state.frame)
            .unwrap_or_else(|| vec![0.0; self.trajectory.num_dof()]);
        if let Some(dof) = self.profile().forward_row() {
            pose[dof] += self.cycle_drift() * state.cycle as f64;
        }
        pose
    }

    /// Pose at `time` seconds; also records the frame it came from in `current_frame`.
    pub fn sample(&mut self, time: f64) -> Vec<f64> {
        self.frame_idx = self.playback_state(time).frame;
        self.pose_at(time)
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
