//! Turns .bvh motion capture into reference pose trajectories for simulated characters.
//!
//! ```no_run
//! use bvh_ref_motion::{Profile, ReferenceMotion};
//!
//! let mut motion = ReferenceMotion::from_file("walk.bvh", "walker2d".parse::<Profile>()?)?;
//! let pose = motion.sample(1.25);
//! assert_eq!(pose.len(), 9);
//! # Ok::<(), bvh_ref_motion::BvhError>(())
//! ```

pub mod decode;
pub mod error;
pub mod parse;
pub mod player;
pub mod pose;
pub mod profile;
pub mod types;
mod utils;

pub use error::{BvhError, Result};
pub use player::{PlaybackState, ReferenceMotion};
pub use pose::PoseTrajectory;
pub use profile::Profile;

use std::path::Path;

/// load a bvh file from a file path and reduce it to `profile`'s trajectory
pub fn load_pose_trajectory_from_file(
    file_path: impl AsRef<Path>,
    profile: Profile,
) -> Result<PoseTrajectory> {
    let clip = parse::parse_bvh_from_file(file_path)?;
    pose::build_pose_trajectory(&clip, profile)
}

/// load a bvh file from a string and reduce it to `profile`'s trajectory
pub fn load_pose_trajectory_from_string(bvh_string: &str, profile: Profile) -> Result<PoseTrajectory> {
    let clip = parse::parse_bvh_from_string(bvh_string)?;
    pose::build_pose_trajectory(&clip, profile)
}
