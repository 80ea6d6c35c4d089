//! Target skeletons a clip can be reduced to, and the static tables describing each of them.

use crate::error::BvhError;
use crate::types::RotationOrder;
use std::fmt;
use std::str::FromStr;

/// Root height of the capture rig's ground plane, in centimeters.
pub const GROUND_HEIGHT: f64 = 110.0;
/// Extra height added back for the humanoid, whose root sits on a different ground origin.
pub const HUMANOID_GROUND_CORRECTION: f64 = 130.0;
/// Row that accumulates forward drift when playback loops.
pub const FORWARD_ROW: usize = 0;

/// Joint that becomes a quaternion in the humanoid profile.
pub const HIP_JOINT: &str = "Hips";
/// Joint whose euler angles are read in Z,Y,X order in the humanoid profile.
pub const SPINE_JOINT: &str = "Spine";

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Reduced skeleton targeted by the physics controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// Planar biped: root x/z/pitch plus hip, knee and ankle pitch per leg.
    Walker2d,
    /// 3D biped from the abdomen down.
    Humanoid3dLowerBody,
}

/// Where a degree of freedom is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DofSource {
    /// Ground-adjusted root translation.
    Translation,
    Joint(&'static str),
}

/// One row of a pose trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DofEntry {
    pub name: &'static str,
    pub source: DofSource,
    pub component: usize,
    pub scale: f64,
}

/// How a joint's rotation is re-expressed for a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Euler(RotationOrder),
    /// [x, y, z, w]
    Quaternion,
}

const fn dof(name: &'static str, source: DofSource, component: usize, scale: f64) -> DofEntry {
    DofEntry {
        name,
        source,
        component,
        scale,
    }
}

use DofSource::{Joint, Translation};

const WALKER2D_DOFS: [DofEntry; 9] = [
    dof("rootx", Translation, 2, 0.01),
    dof("rootz", Translation, 1, 0.01),
    dof("rooty", Joint("Hips"), 2, 1.0),
    dof("thigh_joint", Joint("RightUpLeg"), 2, -1.0),
    dof("leg_joint", Joint("RightLeg"), 2, -1.0),
    dof("foot_joint", Joint("RightFoot"), 2, -1.0),
    dof("thigh_left_joint", Joint("LeftUpLeg"), 2, -1.0),
    dof("leg_left_joint", Joint("LeftLeg"), 2, -1.0),
    dof("foot_left_joint", Joint("LeftFoot"), 2, -1.0),
];

const HUMANOID3D_LOWERBODY_DOFS: [DofEntry; 18] = [
    dof("root_x", Translation, 2, 0.01),
    dof("root_y", Translation, 0, 0.01),
    dof("root_z", Translation, 1, 0.01),
    dof("root_qw", Joint("Hips"), 3, 1.0),
    dof("root_qx", Joint("Hips"), 0, 1.0),
    dof("root_qy", Joint("Hips"), 1, 1.0),
    dof("root_qz", Joint("Hips"), 2, 1.0),
    dof("abdomen_z", Joint("Spine"), 0, 1.0),
    dof("abdomen_y", Joint("Spine"), 1, 1.0),
    dof("abdomen_x", Joint("Spine"), 2, 1.0),
    dof("right_hip_x", Joint("RightUpLeg"), 0, 1.0),
    dof("right_hip_z", Joint("RightUpLeg"), 1, 1.0),
    dof("right_hip_y", Joint("RightUpLeg"), 2, 1.0),
    dof("right_knee", Joint("RightLeg"), 2, -1.0),
    dof("left_hip_x", Joint("LeftUpLeg"), 0, -1.0),
    dof("left_hip_z", Joint("LeftUpLeg"), 1, -1.0),
    dof("left_hip_y", Joint("LeftUpLeg"), 2, 1.0),
    dof("left_knee", Joint("LeftLeg"), 2, -1.0),
];

/////////////////////////////////////////////////////////////////////////////////////////////////

impl Profile {
    pub const ALL: [Profile; 2] = [Profile::Walker2d, Profile::Humanoid3dLowerBody];

    pub fn name(self) -> &'static str {
        match self {
            Profile::Walker2d => "walker2d",
            Profile::Humanoid3dLowerBody => "humanoid3d_lowerbody",
        }
    }

    /// Ordered rows of the pose trajectory.
    pub fn dof_table(self) -> &'static [DofEntry] {
        match self {
            Profile::Walker2d => &WALKER2D_DOFS,
            Profile::Humanoid3dLowerBody => &HUMANOID3D_LOWERBODY_DOFS,
        }
    }

    pub fn num_dof(self) -> usize {
        self.dof_table().len()
    }

    /// Rows shifted so that their first frame is exactly zero.
    pub fn zeroed_rows(self) -> &'static [usize] {
        match self {
            Profile::Walker2d => &[0, 1],
            Profile::Humanoid3dLowerBody => &[0],
        }
    }

    /// Added to the vertical root translation (centimeters).
    pub fn ground_offset(self) -> f64 {
        match self {
            Profile::Walker2d => -GROUND_HEIGHT,
            Profile::Humanoid3dLowerBody => -GROUND_HEIGHT + HUMANOID_GROUND_CORRECTION,
        }
    }

    /// Row advanced by one loop's drift on every playback cycle, if any.
    pub fn forward_row(self) -> Option<usize> {
        match self {
            Profile::Walker2d | Profile::Humanoid3dLowerBody => Some(FORWARD_ROW),
        }
    }

    pub fn representation(self, joint: &str) -> Representation {
        match self {
            Profile::Walker2d => Representation::Euler(RotationOrder::XZY),
            Profile::Humanoid3dLowerBody => match joint {
                HIP_JOINT => Representation::Quaternion,
                SPINE_JOINT => Representation::Euler(RotationOrder::ZYX),
                _ => Representation::Euler(RotationOrder::XZY),
            },
        }
    }

    /// Joints the file has to declare, in table order without duplicates.
    pub fn required_joints(self) -> Vec<&'static str> {
        let mut joints: Vec<&'static str> = Vec::new();
        for entry in self.dof_table() {
            if let DofSource::Joint(name) = entry.source {
                if !joints.contains(&name) {
                    joints.push(name);
                }
            }
        }
        joints
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Profile {
    type Err = BvhError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Profile::ALL
            .into_iter()
            .find(|profile| profile.name() == s)
            .ok_or_else(|| BvhError::UnknownProfile(s.to_string()))
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////
