//! Listener-relative sound positions
//!
//! Sound effects are positioned relative to the listener. Attenuation and
//! panning are left to the backend; this module only decides where a sound
//! sits in listener space.

use crate::foundation::math::{Vec2, Vec3};

/// Forward (+z) offset applied to 2D positions
///
/// Keeps a sound on the XY plane from sitting exactly on the listener,
/// where panning is undefined.
pub const PLANE_FORWARD_OFFSET: f32 = 0.000_001;

/// Where a sound effect plays, relative to the listener
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SoundPosition {
    /// On the listener
    #[default]
    Listener,
    /// On the XY plane immediately in front of the listener
    Plane(Vec2),
    /// Anywhere in listener space
    Space(Vec3),
}

impl SoundPosition {
    /// Resolve to a listener-space offset
    pub fn to_listener_space(self) -> Vec3 {
        match self {
            Self::Listener => Vec3::zeros(),
            Self::Plane(offset) => Vec3::new(offset.x, offset.y, PLANE_FORWARD_OFFSET),
            Self::Space(offset) => offset,
        }
    }
}

impl From<Vec2> for SoundPosition {
    fn from(offset: Vec2) -> Self {
        Self::Plane(offset)
    }
}

impl From<Vec3> for SoundPosition {
    fn from(offset: Vec3) -> Self {
        Self::Space(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_position_sits_in_front() {
        let position = SoundPosition::from(Vec2::new(3.0, -2.0)).to_listener_space();
        assert_eq!(position, Vec3::new(3.0, -2.0, PLANE_FORWARD_OFFSET));
        assert!(position.z > 0.0);
    }

    #[test]
    fn test_space_position_unchanged() {
        let offset = Vec3::new(1.0, 2.0, -3.0);
        assert_eq!(SoundPosition::from(offset).to_listener_space(), offset);
    }

    #[test]
    fn test_default_is_listener() {
        assert_eq!(SoundPosition::default().to_listener_space(), Vec3::zeros());
    }
}
