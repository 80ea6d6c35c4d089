//! Per-joint rotations and root translation decoded from raw channel values.

use crate::profile::{Profile, Representation};
use crate::types::*;
use crate::utils;
use std::collections::HashMap;

/// Per-frame rotation of one joint in the representation its profile asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum RotationTrack {
    /// Radians, `angles[frame][i]` is the angle about `order.axes()[i]`.
    Euler {
        order: RotationOrder,
        angles: Vec<[f64; 3]>,
    },
    /// `[x, y, z, w]` per frame.
    Quaternion(Vec<[f64; 4]>),
}

impl RotationTrack {
    pub fn len(&self) -> usize {
        match self {
            RotationTrack::Euler { angles, .. } => angles.len(),
            RotationTrack::Quaternion(quats) => quats.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values per frame (3 for euler angles, 4 for quaternions).
    pub fn width(&self) -> usize {
        match self {
            RotationTrack::Euler { .. } => 3,
            RotationTrack::Quaternion(_) => 4,
        }
    }

    /// One component across all frames, or `None` if `component >= width()`.
    pub fn component(&self, component: usize) -> Option<Vec<f64>> {
        if component >= self.width() {
            return None;
        }
        let values = match self {
            RotationTrack::Euler { angles, .. } => angles.iter().map(|a| a[component]).collect(),
            RotationTrack::Quaternion(quats) => quats.iter().map(|q| q[component]).collect(),
        };
        Some(values)
    }
}

/// Decoded rotation tracks keyed by joint name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointRotations {
    tracks: HashMap<String, RotationTrack>,
}

impl JointRotations {
    pub fn get(&self, joint: &str) -> Option<&RotationTrack> {
        self.tracks.get(joint)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn joint_names(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }
}

/// Root translation in file units (centimeters).
/// `raw` is exactly what the file holds; `grounded` has the profile's ground offset applied to Y.
#[derive(Debug, Clone, PartialEq)]
pub struct RootTranslation {
    pub raw: Vec<[f64; 3]>,
    pub grounded: Vec<[f64; 3]>,
}

impl RootTranslation {
    pub fn from_raw(raw: Vec<[f64; 3]>, ground_offset: f64) -> Self {
        let grounded = raw.iter().map(|&[x, y, z]| [x, y + ground_offset, z]).collect();
        RootTranslation { raw, grounded }
    }

    /// One grounded component across all frames.
    pub fn component(&self, component: usize) -> Option<Vec<f64>> {
        if component >= 3 {
            return None;
        }
        Some(self.grounded.iter().map(|t| t[component]).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMotion {
    pub profile: Profile,
    pub rotations: JointRotations,
    pub translation: RootTranslation,
    pub frame_time: f64,
    pub num_frames: usize,
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn __decode_joint(joint: &JointSpec, frames: &[Frame], profile: Profile) -> RotationTrack {
    //// the order is relabeled into the simulator's axes, the angle columns stay where they are
    let order = joint.rotation_order.remapped();
    let start = joint.channel_start;
    let quats = frames.iter().map(|frame| {
        let eul = [frame[start], frame[start + 1], frame[start + 2]];
        utils::__from_euler_to_quat(eul, order)
    });

    match profile.representation(&joint.name) {
        Representation::Euler(out_order) => RotationTrack::Euler {
            order: out_order,
            angles: quats
                .map(|q| utils::__from_quat_to_euler(q, out_order))
                .collect(),
        },
        Representation::Quaternion => {
            RotationTrack::Quaternion(quats.map(utils::__quat_to_xyzw).collect())
        }
    }
}

/// Decode every joint of `clip` into the rotation representation `profile` uses, plus root translation.
pub fn decode_rotations(clip: &MotionClip, profile: Profile) -> DecodedMotion {
    let mut tracks = HashMap::with_capacity(clip.header.joints.len());
    for joint in clip.header.joints.iter() {
        let track = __decode_joint(joint, &clip.frames, profile);
        tracing::debug!(
            "Decoded {} ({} -> {})",
            joint.name,
            joint.rotation_order,
            match &track {
                RotationTrack::Euler { order, .. } => order.to_string(),
                RotationTrack::Quaternion(_) => "quat".to_string(),
            }
        );
        tracks.insert(joint.name.clone(), track);
    }

    //// root translation comes first and is not axis remapped
    let raw = clip
        .frames
        .iter()
        .map(|frame| [frame[0], frame[1], frame[2]])
        .collect();

    DecodedMotion {
        profile,
        rotations: JointRotations { tracks },
        translation: RootTranslation::from_raw(raw, profile.ground_offset()),
        frame_time: clip.frame_time,
        num_frames: clip.num_frames(),
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_bvh_from_string;

    fn clip(frames: &[[f64; 9]]) -> MotionClip {
        MotionClip {
            header: BvhHeader {
                joints: vec![
                    JointSpec {
                        name: "Hips".to_string(),
                        channel_start: 3,
                        rotation_order: RotationOrder::ZXY,
                    },
                    JointSpec {
                        name: "Spine".to_string(),
                        channel_start: 6,
                        rotation_order: RotationOrder::ZXY,
                    },
                ],
                num_channels: 9,
            },
            frames: frames.iter().map(|f| f.to_vec()).collect(),
            frame_time: 0.05,
        }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_declared_x_becomes_simulator_y() {
        // ZXY is remapped to XYZ, so the Xrotation column rotates about Y
        let decoded = decode_rotations(
            &clip(&[[0.0, 0.0, 0.0, 0.0, 30.0, 0.0, 0.0, 0.0, 0.0]]),
            Profile::Walker2d,
        );
        let hips = decoded.rotations.get("Hips").unwrap();
        let RotationTrack::Euler { order, angles } = hips else {
            panic!("walker2d joints are euler tracks");
        };
        assert_eq!(*order, RotationOrder::XZY);
        assert_close(angles[0][0], 0.0);
        assert_close(angles[0][1], 0.0);
        assert_close(angles[0][2], 30f64.to_radians());
    }

    #[test]
    fn test_declared_z_becomes_simulator_x() {
        let decoded = decode_rotations(
            &clip(&[[0.0, 0.0, 0.0, -45.0, 0.0, 0.0, 0.0, 0.0, 0.0]]),
            Profile::Walker2d,
        );
        let hips = decoded.rotations.get("Hips").unwrap();
        assert_close(hips.component(0).unwrap()[0], -45f64.to_radians());
        assert_close(hips.component(1).unwrap()[0], 0.0);
    }

    #[test]
    fn test_humanoid_tracks() {
        // declared Yrotation column rotates about Z after remapping
        let decoded = decode_rotations(
            &clip(&[[0.0, 0.0, 0.0, 0.0, 0.0, 90.0, 0.0, 0.0, 20.0]]),
            Profile::Humanoid3dLowerBody,
        );
        let hips = decoded.rotations.get("Hips").unwrap();
        assert_eq!(hips.width(), 4);
        let half = std::f64::consts::FRAC_1_SQRT_2;
        assert_close(hips.component(0).unwrap()[0], 0.0);
        assert_close(hips.component(1).unwrap()[0], 0.0);
        assert_close(hips.component(2).unwrap()[0], half);
        assert_close(hips.component(3).unwrap()[0], half);

        // spine is read back in Z,Y,X order: a pure Z rotation lands in component 0
        let spine = decoded.rotations.get("Spine").unwrap();
        assert!(matches!(spine, RotationTrack::Euler { order, .. } if *order == RotationOrder::ZYX));
        assert_close(spine.component(0).unwrap()[0], 20f64.to_radians());
        assert!(spine.component(3).is_none());
    }

    #[test]
    fn test_translation_keeps_raw_and_grounded() {
        let frames = [[1.0, 115.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]];
        let walker = decode_rotations(&clip(&frames), Profile::Walker2d);
        assert_eq!(walker.translation.raw[0], [1.0, 115.0, 3.0]);
        assert_eq!(walker.translation.grounded[0], [1.0, 5.0, 3.0]);

        let humanoid = decode_rotations(&clip(&frames), Profile::Humanoid3dLowerBody);
        assert_eq!(humanoid.translation.raw[0], [1.0, 115.0, 3.0]);
        assert_eq!(humanoid.translation.grounded[0], [1.0, 135.0, 3.0]);
        assert_eq!(humanoid.translation.component(1).unwrap(), vec![135.0]);
    }

    #[test]
    fn test_every_joint_is_decoded() {
        let text = "HIERARCHY\nROOT Hips\n{\nCHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation\nJOINT Chest\n{\nCHANNELS 3 Zrotation Xrotation Yrotation\n}\n}\nMOTION\nFrames: 2\nFrame Time: 0.1\n0 0 0 0 0 0 0 0 0\n0 0 0 0 0 0 0 0 0\n";
        let clip = parse_bvh_from_string(text).unwrap();
        let decoded = decode_rotations(&clip, Profile::Walker2d);
        assert_eq!(decoded.rotations.len(), 2);
        assert_eq!(decoded.num_frames, 2);
        assert_eq!(decoded.rotations.get("Chest").unwrap().len(), 2);
        let mut names: Vec<&str> = decoded.rotations.joint_names().collect();
        names.sort();
        assert_eq!(names, vec!["Chest", "Hips"]);
    }
}
