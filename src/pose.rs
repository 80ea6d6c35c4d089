//! Selection of a profile's degrees of freedom into a dof x frames trajectory matrix.

use crate::decode::{decode_rotations, DecodedMotion};
use crate::error::{BvhError, Result};
use crate::profile::{DofSource, Profile};
use crate::types::MotionClip;

/// Reference trajectory of a reduced skeleton, one row per degree of freedom.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseTrajectory {
    profile: Profile,
    /// rows[dof][frame]
    rows: Vec<Vec<f64>>,
    frame_time: f64,
}

impl PoseTrajectory {
    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Seconds per frame.
    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    pub fn num_dof(&self) -> usize {
        self.rows.len()
    }

    pub fn num_frames(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// (num_dof, num_frames)
    pub fn shape(&self) -> (usize, usize) {
        (self.num_dof(), self.num_frames())
    }

    pub fn dof_names(&self) -> impl Iterator<Item = &'static str> {
        self.profile.dof_table().iter().map(|entry| entry.name)
    }

    pub fn row(&self, dof: usize) -> Option<&[f64]> {
        self.rows.get(dof).map(Vec::as_slice)
    }

    pub fn get(&self, dof: usize, frame: usize) -> Option<f64> {
        self.rows.get(dof)?.get(frame).copied()
    }

    /// Pose at `frame` as a fresh vector.
    pub fn column(&self, frame: usize) -> Option<Vec<f64>> {
        if frame >= self.num_frames() {
            return None;
        }
        Some(self.rows.iter().map(|row| row[frame]).collect())
    }
}

/// Build the trajectory matrix for `decoded.profile`: row i is `source_i[component_i] * scale_i`.
pub fn select_pose(decoded: &DecodedMotion) -> Result<PoseTrajectory> {
    let profile = decoded.profile;
    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(profile.num_dof());

    for entry in profile.dof_table() {
        let values = match entry.source {
            DofSource::Translation => decoded.translation.component(entry.component),
            DofSource::Joint(joint) => decoded
                .rotations
                .get(joint)
                .ok_or(BvhError::MissingJoint {
                    profile: profile.name(),
                    joint,
                })?
                .component(entry.component),
        };
        let values = values.unwrap_or_else(|| {
            panic!(
                "BUG: {} row {} reads component {} past the end of its source. Report this bug.",
                profile, entry.name, entry.component
            )
        });
        rows.push(values.into_iter().map(|v| v * entry.scale).collect());
    }

    //// start the displacement axes at zero
    for &dof in profile.zeroed_rows() {
        let row = &mut rows[dof];
        if let Some(&first) = row.first() {
            for value in row.iter_mut() {
                *value -= first;
            }
        }
    }

    tracing::info!(
        "Built {} trajectory: {} dof x {} frames, frame time {}s",
        profile,
        rows.len(),
        decoded.num_frames,
        decoded.frame_time
    );

    Ok(PoseTrajectory {
        profile,
        rows,
        frame_time: decoded.frame_time,
    })
}

/// Decode `clip` for `profile` and select its trajectory.
pub fn build_pose_trajectory(clip: &MotionClip, profile: Profile) -> Result<PoseTrajectory> {
    let decoded = decode_rotations(clip, profile);
    select_pose(&decoded)
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
