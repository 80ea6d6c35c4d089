use cgmath::Quaternion as CgQuaternion;
use std::fmt;

/////////////////////////////////////////////////////////////////////////////////////////////////

pub type Index = usize;
pub type Quaternion = CgQuaternion<f64>;
/// One motion sample line: every channel of every joint, in header order.
pub type Frame = Vec<f64>;

/////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Parse the axis letter of a channel token ("Xrotation" -> X).
    pub fn from_char(c: char) -> Option<Axis> {
        match c.to_ascii_uppercase() {
            'X' => Some(Axis::X),
            'Y' => Some(Axis::Y),
            'Z' => Some(Axis::Z),
            _ => None,
        }
    }

    pub fn index(self) -> Index {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Relabel an axis from the mocap convention to the simulator convention (X->Y, Y->Z, Z->X).
    pub fn remapped(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::Z,
            Axis::Z => Axis::X,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Order of three intrinsic rotations, e.g. "ZXY" means rotate about Z, then about the new X, then about the new Y.
/// Only Tait-Bryan orders (three distinct axes) can be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RotationOrder([Axis; 3]);

impl RotationOrder {
    pub const XYZ: RotationOrder = RotationOrder([Axis::X, Axis::Y, Axis::Z]);
    pub const XZY: RotationOrder = RotationOrder([Axis::X, Axis::Z, Axis::Y]);
    pub const YXZ: RotationOrder = RotationOrder([Axis::Y, Axis::X, Axis::Z]);
    pub const YZX: RotationOrder = RotationOrder([Axis::Y, Axis::Z, Axis::X]);
    pub const ZXY: RotationOrder = RotationOrder([Axis::Z, Axis::X, Axis::Y]);
    pub const ZYX: RotationOrder = RotationOrder([Axis::Z, Axis::Y, Axis::X]);

    /// Returns `None` when an axis repeats.
    pub fn new(axes: [Axis; 3]) -> Option<RotationOrder> {
        let [a, b, c] = axes;
        if a == b || b == c || a == c {
            return None;
        }
        Some(RotationOrder(axes))
    }

    pub fn axes(&self) -> [Axis; 3] {
        self.0
    }

    /// The same order with each axis relabeled through `Axis::remapped`.
    pub fn remapped(&self) -> RotationOrder {
        let [a, b, c] = self.0;
        RotationOrder([a.remapped(), b.remapped(), c.remapped()])
    }

    /// true for XYZ, YZX and ZXY (even permutations of the axes).
    pub fn is_cyclic(&self) -> bool {
        let [a, b, _] = self.0;
        b.index() == (a.index() + 1) % 3
    }
}

impl fmt::Display for RotationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in self.0 {
            write!(f, "{}", axis.as_char())?;
        }
        Ok(())
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// A joint as declared in the HIERARCHY section.
#[derive(Debug, Clone, PartialEq)]
pub struct JointSpec {
    pub name: String,
    /// Offset into a frame where this joint's 3 rotation channels begin.
    pub channel_start: Index,
    /// Declared order, before any axis remapping.
    pub rotation_order: RotationOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BvhHeader {
    /// Joints in declaration order; the first one is the root.
    pub joints: Vec<JointSpec>,
    /// Total number of channels per frame.
    pub num_channels: usize,
}

impl BvhHeader {
    pub fn root(&self) -> Option<&JointSpec> {
        self.joints.first()
    }

    pub fn joint(&self, name: &str) -> Option<&JointSpec> {
        self.joints.iter().find(|joint| joint.name == name)
    }
}

/// Everything read from a .bvh file.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionClip {
    pub header: BvhHeader,
    /// frames x channels, in file (time) order. Never empty.
    pub frames: Vec<Frame>,
    pub frame_time: f64,
}

impl MotionClip {
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////
