use crate::error::{BvhError, Result};
use crate::types::*;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static RE_JOINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(ROOT|JOINT)\s+(\S+)").expect("joint pattern is valid"));
static RE_CHANNELS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CHANNELS\s+(\S+)(.*)$").expect("channels pattern is valid"));
static RE_FRAMES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Frames:\s*(\S+)").expect("frames pattern is valid"));
static RE_FRAME_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Frame Time:\s*(\S*)").expect("frame time pattern is valid"));

/// Number of translation channels the root declares ahead of its rotations.
const ROOT_POSITION_CHANNELS: usize = 3;
const ROTATION_CHANNELS: usize = 3;

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn __malformed(line: usize, reason: impl Into<String>) -> BvhError {
    BvhError::MalformedHeader {
        line,
        reason: reason.into(),
    }
}

/// Axis of a channel token like "Zrotation" if it ends with `suffix` ("rotation" / "position").
fn __channel_axis(token: &str, suffix: &str) -> Option<Axis> {
    let mut chars = token.chars();
    let axis = Axis::from_char(chars.next()?)?;
    if chars.as_str().eq_ignore_ascii_case(suffix) {
        Some(axis)
    } else {
        None
    }
}

/// Rotation order from the first letter of each rotation token, in declared order.
fn __rotation_order(line: usize, tokens: &[&str]) -> Result<RotationOrder> {
    let mut axes = [Axis::X; 3];
    for (axis, token) in axes.iter_mut().zip(tokens) {
        *axis = __channel_axis(token, "rotation")
            .ok_or_else(|| __malformed(line, format!("expected a rotation channel, got {:?}", token)))?;
    }
    RotationOrder::new(axes)
        .ok_or_else(|| __malformed(line, format!("rotation channels {:?} repeat an axis", tokens)))
}

fn __parse_f64(line: usize, token: &str) -> Result<f64> {
    token.parse::<f64>().map_err(|_| BvhError::NumericParse {
        line,
        token: token.to_string(),
    })
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Joint seen on a ROOT/JOINT line whose CHANNELS line hasn't been read yet.
struct PendingJoint {
    line: usize,
    name: String,
}

/// Parse the HIERARCHY section, consuming lines up to and including "MOTION".
pub fn parse_header<'a, I>(lines: &mut I) -> Result<BvhHeader>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut joints: Vec<JointSpec> = Vec::new();
    let mut pending: Option<PendingJoint> = None;
    let mut channels_index: usize = 0;
    let mut last_line = 0;

    for (line_no, line) in lines {
        last_line = line_no;
        let line = line.trim();

        if line.starts_with("MOTION") {
            if let Some(joint) = pending {
                return Err(__malformed(
                    joint.line,
                    format!("joint {:?} declares no channels", joint.name),
                ));
            }
            if joints.is_empty() {
                return Err(__malformed(line_no, "hierarchy declares no joints"));
            }
            return Ok(BvhHeader {
                joints,
                num_channels: channels_index,
            });
        } else if line.starts_with("ROOT") || line.starts_with("JOINT") {
            //// Create joint
            let captures = RE_JOINT
                .captures(line)
                .ok_or_else(|| __malformed(line_no, "joint declaration without a name"))?;
            let is_root = &captures[1] == "ROOT";
            let name = captures[2].to_string();

            if let Some(joint) = pending.take() {
                return Err(__malformed(
                    joint.line,
                    format!("joint {:?} declares no channels", joint.name),
                ));
            }
            //// only a single ROOT, and it has to come first
            if is_root && !joints.is_empty() {
                return Err(__malformed(line_no, "more than one ROOT joint"));
            }
            if !is_root && joints.is_empty() {
                return Err(__malformed(line_no, format!("JOINT {:?} appears before ROOT", name)));
            }
            if joints.iter().any(|joint| joint.name == name) {
                return Err(__malformed(line_no, format!("duplicate joint name {:?}", name)));
            }
            pending = Some(PendingJoint {
                line: line_no,
                name,
            });
        } else if line.starts_with("CHANNELS") {
            //// Parse channels
            let captures = RE_CHANNELS
                .captures(line)
                .ok_or_else(|| __malformed(line_no, "CHANNELS line without a channel count"))?;
            let num_channels = captures[1].parse::<usize>().map_err(|_| {
                __malformed(line_no, format!("invalid channel count {:?}", &captures[1]))
            })?;
            let channel_names: Vec<&str> = captures
                .get(2)
                .map_or("", |m| m.as_str())
                .split_whitespace()
                .collect();
            if channel_names.len() != num_channels {
                return Err(__malformed(
                    line_no,
                    format!(
                        "declares {} channels but lists {}",
                        num_channels,
                        channel_names.len()
                    ),
                ));
            }

            let Some(joint) = pending.take() else {
                let reason = if joints.is_empty() {
                    "CHANNELS before any ROOT"
                } else {
                    "CHANNELS declared twice for the same joint"
                };
                return Err(__malformed(line_no, reason));
            };

            let spec = if joints.is_empty() {
                //// the root carries 3 translation channels in front of its rotations
                if num_channels != ROOT_POSITION_CHANNELS + ROTATION_CHANNELS {
                    return Err(__malformed(
                        line_no,
                        format!(
                            "root joint {:?} must declare 3 position and 3 rotation channels, got {}",
                            joint.name, num_channels
                        ),
                    ));
                }
                let (positions, rotations) = channel_names.split_at(ROOT_POSITION_CHANNELS);
                if let Some(token) = positions
                    .iter()
                    .find(|token| __channel_axis(token, "position").is_none())
                {
                    return Err(__malformed(
                        line_no,
                        format!("expected a position channel, got {:?}", token),
                    ));
                }
                JointSpec {
                    name: joint.name,
                    channel_start: channels_index + ROOT_POSITION_CHANNELS,
                    rotation_order: __rotation_order(line_no, rotations)?,
                }
            } else {
                if num_channels != ROTATION_CHANNELS {
                    return Err(__malformed(
                        line_no,
                        format!(
                            "joint {:?} must declare exactly 3 rotation channels, got {}",
                            joint.name, num_channels
                        ),
                    ));
                }
                JointSpec {
                    name: joint.name,
                    channel_start: channels_index,
                    rotation_order: __rotation_order(line_no, &channel_names)?,
                }
            };
            channels_index += num_channels;

            tracing::debug!(
                "Joint {} (channels {}..{}, order {})",
                spec.name,
                spec.channel_start,
                spec.channel_start + ROTATION_CHANNELS,
                spec.rotation_order
            );
            joints.push(spec);
        }
        // HIERARCHY, braces, OFFSET and End Site carry nothing we need
    }

    Err(BvhError::MissingData(format!(
        "reached end of file at line {} without a MOTION section",
        last_line
    )))
}

/// Parse the MOTION section (everything after the "MOTION" line).
pub fn parse_motion<'a, I>(lines: I, header: &BvhHeader) -> Result<(Vec<Frame>, f64)>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut frames: Vec<Frame> = Vec::new();
    let mut frame_time: Option<f64> = None;
    let mut declared_frames: Option<usize> = None;

    for (line_no, line) in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(captures) = RE_FRAME_TIME.captures(line) {
            let value = __parse_f64(line_no, &captures[1])?;
            if !value.is_finite() || value <= 0.0 {
                return Err(BvhError::InvalidFrameTime(value));
            }
            frame_time = Some(value);
        } else if let Some(captures) = RE_FRAMES.captures(line) {
            //// only used to sanity check the file
            declared_frames = captures[1].parse::<usize>().ok();
        } else {
            let frame = line
                .split_whitespace()
                .map(|token| __parse_f64(line_no, token))
                .collect::<Result<Frame>>()?;
            if frame.len() != header.num_channels {
                return Err(BvhError::FrameLength {
                    line: line_no,
                    expected: header.num_channels,
                    found: frame.len(),
                });
            }
            frames.push(frame);
        }
    }

    if frames.is_empty() {
        return Err(BvhError::MissingData(
            "MOTION section contains no frames".to_string(),
        ));
    }
    let frame_time = frame_time
        .ok_or_else(|| BvhError::MissingData("MOTION section has no Frame Time line".to_string()))?;

    if let Some(declared) = declared_frames {
        if declared != frames.len() {
            tracing::warn!(
                "File declares {} frames but contains {}; using the frames present",
                declared,
                frames.len()
            );
        }
    }

    Ok((frames, frame_time))
}

/// Lines numbered from 1, as they appear in the file.
fn __numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines().enumerate().map(|(i, line)| (i + 1, line))
}

//////////////////////////////////////////////////////////////// PUBLIC ///////////////////////////////////////////////////////////////////////////////////////

/// load a bvh file from a string
pub fn parse_bvh_from_string(bvh_string: &str) -> Result<MotionClip> {
    let mut lines = __numbered_lines(bvh_string);
    let header = parse_header(&mut lines)?;
    let (frames, frame_time) = parse_motion(lines, &header)?;
    Ok(MotionClip {
        header,
        frames,
        frame_time,
    })
}

/// load a bvh file from a file path
pub fn parse_bvh_from_file(file_path: impl AsRef<Path>) -> Result<MotionClip> {
    let contents = std::fs::read_to_string(file_path)?;
    parse_bvh_from_string(&contents)
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_JOINTS: &str = "\
HIERARCHY
ROOT Hips
{
  OFFSET 0.0 0.0 0.0
  CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation
  JOINT Spine
  {
    OFFSET 0.0 10.0 0.0
    CHANNELS 3 Zrotation Yrotation Xrotation
    End Site
    {
      OFFSET 0.0 5.0 0.0
    }
  }
}
MOTION
Frames: 2
Frame Time: 0.0333
1.0 2.0 3.0 4.0 5.0 6.0 7.0 8.0 9.0
1.5 2.5 3.5 4.5 5.5 6.5 7.5 8.5 9.5
";

    fn with_channels(channels: &str) -> String {
        format!(
            "HIERARCHY\nROOT Hips\n{{\nCHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation\nJOINT Spine\n{{\n{}\n}}\n}}\nMOTION\nFrames: 1\nFrame Time: 0.033\n0 0 0 0 0 0 0 0 0\n",
            channels
        )
    }

    #[test]
    fn test_header_layout() {
        let clip = parse_bvh_from_string(TWO_JOINTS).unwrap();
        let header = &clip.header;
        assert_eq!(header.num_channels, 9);
        assert_eq!(header.joints.len(), 2);

        let root = header.root().unwrap();
        assert_eq!(root.name, "Hips");
        assert_eq!(root.channel_start, 3);
        assert_eq!(root.rotation_order, RotationOrder::ZXY);

        let spine = header.joint("Spine").unwrap();
        assert_eq!(spine.channel_start, 6);
        assert_eq!(spine.rotation_order, RotationOrder::ZYX);
    }

    #[test]
    fn test_motion_data() {
        let clip = parse_bvh_from_string(TWO_JOINTS).unwrap();
        assert_eq!(clip.num_frames(), 2);
        assert_eq!(clip.frame_time, 0.0333);
        assert_eq!(clip.frames[1][0], 1.5);
        assert_eq!(clip.frames[1][8], 9.5);
    }

    #[test]
    fn test_two_rotation_channels_is_malformed() {
        let err = parse_bvh_from_string(&with_channels("CHANNELS 2 Zrotation Xrotation")).unwrap_err();
        assert!(matches!(err, BvhError::MalformedHeader { line: 7, .. }), "{}", err);
    }

    #[test]
    fn test_count_mismatch_is_malformed() {
        let err = parse_bvh_from_string(&with_channels("CHANNELS 3 Zrotation Xrotation")).unwrap_err();
        assert!(matches!(err, BvhError::MalformedHeader { .. }));
    }

    #[test]
    fn test_position_channel_on_child_is_malformed() {
        let err =
            parse_bvh_from_string(&with_channels("CHANNELS 3 Zrotation Xposition Yrotation")).unwrap_err();
        assert!(matches!(err, BvhError::MalformedHeader { .. }));
    }

    #[test]
    fn test_repeated_axis_is_malformed() {
        let err =
            parse_bvh_from_string(&with_channels("CHANNELS 3 Zrotation Xrotation Zrotation")).unwrap_err();
        assert!(matches!(err, BvhError::MalformedHeader { .. }));
    }

    #[test]
    fn test_channels_before_root_is_malformed() {
        let text = "HIERARCHY\nCHANNELS 3 Zrotation Xrotation Yrotation\nMOTION\nFrame Time: 0.1\n0 0 0\n";
        let err = parse_bvh_from_string(text).unwrap_err();
        assert!(matches!(err, BvhError::MalformedHeader { line: 2, .. }));
    }

    #[test]
    fn test_joint_before_root_is_malformed() {
        let text = "HIERARCHY\nJOINT Spine\nCHANNELS 3 Zrotation Xrotation Yrotation\nMOTION\nFrame Time: 0.1\n0 0 0\n";
        let err = parse_bvh_from_string(text).unwrap_err();
        assert!(matches!(err, BvhError::MalformedHeader { line: 2, .. }));
    }

    #[test]
    fn test_joint_without_channels_is_malformed() {
        let text = "HIERARCHY\nROOT Hips\n{\nCHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation\nJOINT Spine\n{\n}\n}\nMOTION\nFrame Time: 0.1\n0 0 0 0 0 0\n";
        let err = parse_bvh_from_string(text).unwrap_err();
        assert!(matches!(err, BvhError::MalformedHeader { line: 5, .. }));
    }

    #[test]
    fn test_root_without_translation_is_malformed() {
        let text = "HIERARCHY\nROOT Hips\n{\nCHANNELS 3 Zrotation Xrotation Yrotation\n}\nMOTION\nFrame Time: 0.1\n0 0 0\n";
        let err = parse_bvh_from_string(text).unwrap_err();
        assert!(matches!(err, BvhError::MalformedHeader { line: 4, .. }));
    }

    #[test]
    fn test_duplicate_joint_is_malformed() {
        let text = with_channels("CHANNELS 3 Zrotation Xrotation Yrotation\nJOINT Spine\nCHANNELS 3 Zrotation Xrotation Yrotation");
        let err = parse_bvh_from_string(&text).unwrap_err();
        assert!(matches!(err, BvhError::MalformedHeader { .. }));
    }

    #[test]
    fn test_empty_motion_is_missing_data() {
        let text = "HIERARCHY\nROOT Hips\n{\nCHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation\n}\nMOTION\nFrames: 0\nFrame Time: 0.033\n";
        let err = parse_bvh_from_string(text).unwrap_err();
        assert!(matches!(err, BvhError::MissingData(_)));
    }

    #[test]
    fn test_missing_motion_section() {
        let text = "HIERARCHY\nROOT Hips\n{\nCHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation\n}\n";
        let err = parse_bvh_from_string(text).unwrap_err();
        assert!(matches!(err, BvhError::MissingData(_)));
    }

    #[test]
    fn test_missing_frame_time() {
        let text = "HIERARCHY\nROOT Hips\n{\nCHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation\n}\nMOTION\nFrames: 1\n0 0 0 0 0 0\n";
        let err = parse_bvh_from_string(text).unwrap_err();
        assert!(matches!(err, BvhError::MissingData(_)));
    }

    #[test]
    fn test_bad_number() {
        let text = TWO_JOINTS.replace("7.5 8.5", "7.5 eight");
        let err = parse_bvh_from_string(&text).unwrap_err();
        match err {
            BvhError::NumericParse { line, token } => {
                assert_eq!(line, 20);
                assert_eq!(token, "eight");
            }
            other => panic!("unexpected error {}", other),
        }
    }

    #[test]
    fn test_short_frame() {
        let text = TWO_JOINTS.replace("1.5 2.5 3.5 4.5 5.5 6.5 7.5 8.5 9.5", "1.5 2.5");
        let err = parse_bvh_from_string(&text).unwrap_err();
        assert!(matches!(
            err,
            BvhError::FrameLength {
                line: 20,
                expected: 9,
                found: 2
            }
        ));
    }

    #[test]
    fn test_invalid_frame_time() {
        let text = TWO_JOINTS.replace("Frame Time: 0.0333", "Frame Time: 0");
        let err = parse_bvh_from_string(&text).unwrap_err();
        assert!(matches!(err, BvhError::InvalidFrameTime(t) if t == 0.0));
    }

    #[test]
    fn test_frames_count_mismatch_is_not_fatal() {
        let text = TWO_JOINTS.replace("Frames: 2", "Frames: 5");
        let clip = parse_bvh_from_string(&text).unwrap();
        assert_eq!(clip.num_frames(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = parse_bvh_from_file("./does/not/exist.bvh").unwrap_err();
        assert!(matches!(err, BvhError::Io(_)));
    }
}
