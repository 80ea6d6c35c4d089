use thiserror::Error;

/// Everything that can go wrong while turning a .bvh file into a reference trajectory.
/// Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum BvhError {
    #[error("Malformed hierarchy at line {line}: {reason}")]
    MalformedHeader { line: usize, reason: String },

    #[error("Missing motion data: {0}")]
    MissingData(String),

    #[error("Invalid number {token:?} at line {line}")]
    NumericParse { line: usize, token: String },

    #[error("Frame at line {line} has {found} channels, hierarchy declares {expected}")]
    FrameLength {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Frame time must be a positive number of seconds, got {0}")]
    InvalidFrameTime(f64),

    #[error("Unknown skeleton profile {0:?} (expected \"walker2d\" or \"humanoid3d_lowerbody\")")]
    UnknownProfile(String),

    #[error("Profile {profile} needs joint {joint:?}, which the file does not declare")]
    MissingJoint {
        profile: &'static str,
        joint: &'static str,
    },

    #[error("Failed to read bvh file: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BvhError>;
