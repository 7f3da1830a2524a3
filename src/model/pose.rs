use glam::{Vec2, Vec3};

/// Viewpoint position and orientation.
///
/// Yaw is a rotation around +Y; at yaw 0 the viewer faces -Z, and a positive
/// yaw turns to the left. Pitch is positive when looking up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerPose {
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
}

impl PlayerPose {
    pub fn new(position: Vec3, pitch: f32, yaw: f32) -> Self {
        Self { position, pitch, yaw }
    }

    /// Unit view direction including pitch.
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }

    /// Horizontal heading as an (x, z) unit vector; pitch does not contribute.
    pub fn heading(&self) -> Vec2 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec2::new(-sy, -cy)
    }

    /// Rotate a ground-plane (x, z) vector by the yaw only.
    pub fn rotate_by_yaw(&self, v: Vec2) -> Vec2 {
        let (s, c) = self.yaw.sin_cos();
        Vec2::new(v.x * c + v.y * s, -v.x * s + v.y * c)
    }
}

impl Default for PlayerPose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 0.0, 0.0)
    }
}
