//! Camera frames and orientation metadata.
//!
//! A [`Frame`] is the unit of work handed to the classification pipeline: an
//! RGBA8 pixel buffer, its dimensions, and the rotation the capture pipeline
//! reported for it. Frames are transient - the producer owns them until
//! submission, after which the coordinator borrows one for the duration of a
//! single classify call.

use std::fmt;

/// Frame rotation reported by the capture pipeline.
///
/// The value is the clockwise rotation that must be applied to the pixel data
/// to make the image upright. Arbitrary degree values snap to the nearest
/// quarter turn via [`Rotation::from_degrees`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Already upright
    Deg0,
    /// Rotate 90° clockwise to make upright
    Deg90,
    /// Rotate 180° to make upright
    Deg180,
    /// Rotate 270° clockwise to make upright
    Deg270,
}

impl Rotation {
    /// Snaps an arbitrary degree value to the nearest quarter turn.
    ///
    /// Negative values and values outside `[0, 360)` are normalized first, so
    /// `-90` maps to `Deg270` and `450` maps to `Deg90`.
    pub fn from_degrees(degrees: i32) -> Self {
        let normalized = degrees.rem_euclid(360);
        let quarter = ((normalized as f32 / 90.0).round() as i32) % 4;
        match quarter {
            1 => Self::Deg90,
            2 => Self::Deg180,
            3 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    /// The rotation in degrees.
    pub fn degrees(&self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Number of clockwise quarter turns needed to make the image upright.
    pub fn quarter_turns(&self) -> u32 {
        self.degrees() / 90
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::Deg0
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// One camera frame: RGBA8 pixels plus capture metadata.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Tightly packed RGBA8 pixel data, `width * height * 4` bytes
    pub pixels: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Rotation needed to make the image upright
    pub rotation: Rotation,
}

impl Frame {
    /// Creates a frame from an RGBA8 buffer.
    ///
    /// The buffer length is validated later, when the frame enters the
    /// preprocessing stage; construction itself never fails so producers can
    /// hand buffers over without inspecting them.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, rotation: Rotation) -> Self {
        Self {
            pixels,
            width,
            height,
            rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_quarter_turns() {
        assert_eq!(Rotation::from_degrees(0), Rotation::Deg0);
        assert_eq!(Rotation::from_degrees(90), Rotation::Deg90);
        assert_eq!(Rotation::from_degrees(180), Rotation::Deg180);
        assert_eq!(Rotation::from_degrees(270), Rotation::Deg270);
    }

    #[test]
    fn test_snapping_to_nearest_quarter_turn() {
        assert_eq!(Rotation::from_degrees(44), Rotation::Deg0);
        assert_eq!(Rotation::from_degrees(46), Rotation::Deg90);
        assert_eq!(Rotation::from_degrees(91), Rotation::Deg90);
        assert_eq!(Rotation::from_degrees(359), Rotation::Deg0);
    }

    #[test]
    fn test_normalization_of_out_of_range_degrees() {
        assert_eq!(Rotation::from_degrees(-90), Rotation::Deg270);
        assert_eq!(Rotation::from_degrees(450), Rotation::Deg90);
        assert_eq!(Rotation::from_degrees(-360), Rotation::Deg0);
    }

    #[test]
    fn test_quarter_turns() {
        assert_eq!(Rotation::Deg0.quarter_turns(), 0);
        assert_eq!(Rotation::Deg90.quarter_turns(), 1);
        assert_eq!(Rotation::Deg270.quarter_turns(), 3);
    }
}
