use glam::{Vec2, Vec3};
use serde::Deserialize;

use super::pose::PlayerPose;

/// Axis-aligned footprint in the ground plane: centre (x, z), full width and depth.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub z: f32,
    pub w: f32,
    pub d: f32,
}

impl Obstacle {
    pub fn new(x: f32, z: f32, w: f32, d: f32) -> Self {
        Self { x, z, w, d }
    }

    /// True if `p` is strictly inside the footprint grown by `radius` on both axes.
    pub fn overlaps(&self, p: Vec3, radius: f32) -> bool {
        (p.x - self.x).abs() < self.w / 2.0 + radius && (p.z - self.z).abs() < self.d / 2.0 + radius
    }
}

/// Walkable range of the player's centre. Anything outside is wall.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HallBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl HallBounds {
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.z >= self.min_z && p.z <= self.max_z
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new((self.min_x + self.max_x) / 2.0, (self.min_z + self.max_z) / 2.0)
    }
}

/// A portrait hung on one of the walls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Exhibit {
    pub name: String,
    pub description: String,
    pub position: (f32, f32, f32),
    /// Yaw of the portrait's front face.
    pub facing: f32,
    pub neon: (f32, f32, f32),
}

impl Exhibit {
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.position.0, self.position.1, self.position.2)
    }

    pub fn neon_rgba(&self) -> [f32; 4] {
        [self.neon.0, self.neon.1, self.neon.2, 1.0]
    }
}

/// The static hall: bounds, collision table and exhibits. Never mutated after startup.
#[derive(Debug, Clone)]
pub struct Hall {
    bounds: HallBounds,
    obstacles: Vec<Obstacle>,
    exhibits: Vec<Exhibit>,
}

impl Hall {
    pub fn new(bounds: HallBounds, obstacles: Vec<Obstacle>, exhibits: Vec<Exhibit>) -> Self {
        Self { bounds, obstacles, exhibits }
    }

    pub fn bounds(&self) -> &HallBounds {
        &self.bounds
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn exhibits(&self) -> &[Exhibit] {
        &self.exhibits
    }

    /// Hard walls first, then every obstacle footprint inflated by `radius`.
    pub fn is_blocked(&self, p: Vec3, radius: f32) -> bool {
        if !self.bounds.contains(p) {
            return true;
        }
        self.obstacles.iter().any(|o| o.overlaps(p, radius))
    }

    /// Nearest exhibit within `max_distance` that lies inside the viewer's
    /// horizontal view cone (half-angle `half_fov`).
    pub fn exhibit_in_view(&self, pose: &PlayerPose, max_distance: f32, half_fov: f32) -> Option<&Exhibit> {
        let eye = Vec2::new(pose.position.x, pose.position.z);
        let heading = pose.heading();
        let min_cos = half_fov.cos();

        self.exhibits
            .iter()
            .filter_map(|exhibit| {
                let p = exhibit.position();
                let to = Vec2::new(p.x, p.z) - eye;
                let dist = to.length();
                if dist > max_distance || dist <= f32::EPSILON {
                    return None;
                }
                (heading.dot(to / dist) >= min_cos).then_some((dist, exhibit))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, exhibit)| exhibit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hall() -> Hall {
        Hall::new(
            HallBounds { min_x: -10.0, max_x: 10.0, min_z: -20.0, max_z: 20.0 },
            vec![Obstacle::new(0.0, -5.0, 4.0, 2.0), Obstacle::new(6.0, 6.0, 1.0, 1.0)],
            vec![],
        )
    }

    #[test]
    fn test_points_inside_inflated_footprint_are_blocked() {
        let hall = hall();
        let radius = 0.5;
        // footprint of the first obstacle grown by the radius: x in (-2.5, 2.5), z in (-6.5, -3.5)
        for &(x, z) in &[(0.0, -5.0), (2.4, -5.0), (-2.4, -3.6), (2.49, -6.49), (0.0, -3.51)] {
            assert!(hall.is_blocked(Vec3::new(x, 1.7, z), radius), "({x}, {z}) should be blocked");
        }
    }

    #[test]
    fn test_points_clear_of_obstacles_are_free() {
        let hall = hall();
        let radius = 0.5;
        let eps = 1e-3;
        for o in hall.obstacles() {
            let hx = o.w / 2.0 + radius + eps;
            let hz = o.d / 2.0 + radius + eps;
            for &(x, z) in &[(o.x + hx, o.z), (o.x - hx, o.z), (o.x, o.z + hz), (o.x, o.z - hz), (o.x + hx, o.z + hz)] {
                assert!(!hall.is_blocked(Vec3::new(x, 1.7, z), radius), "({x}, {z}) should be free");
            }
        }
    }

    #[test]
    fn test_footprint_is_rectangular_not_circular() {
        let hall = hall();
        // corner of the inflated rectangle, outside a circle of the same radius around the corner
        assert!(hall.is_blocked(Vec3::new(2.45, 0.0, -3.55), 0.5));
    }

    #[test]
    fn test_outside_bounds_is_blocked() {
        let hall = hall();
        assert!(hall.is_blocked(Vec3::new(10.01, 0.0, 0.0), 0.5));
        assert!(hall.is_blocked(Vec3::new(-10.01, 0.0, 0.0), 0.5));
        assert!(hall.is_blocked(Vec3::new(0.0, 0.0, 20.01), 0.5));
        assert!(hall.is_blocked(Vec3::new(0.0, 0.0, -20.01), 0.5));
        assert!(!hall.is_blocked(Vec3::new(10.0, 0.0, 20.0), 0.5));
    }

    #[test]
    fn test_exhibit_in_view_picks_nearest_in_cone() {
        let exhibit = |name: &str, x: f32, z: f32| Exhibit {
            name: name.to_string(),
            description: String::new(),
            position: (x, 3.0, z),
            facing: 0.0,
            neon: (1.0, 1.0, 1.0),
        };
        let hall = Hall::new(
            HallBounds { min_x: -10.0, max_x: 10.0, min_z: -20.0, max_z: 20.0 },
            vec![],
            vec![exhibit("far", 0.0, -5.0), exhibit("near", 0.5, -3.0), exhibit("behind", 0.0, 2.0)],
        );
        let pose = PlayerPose::new(Vec3::new(0.0, 1.7, 0.0), 0.0, 0.0);

        let seen = hall.exhibit_in_view(&pose, 6.0, 0.5).map(|e| e.name.as_str());
        assert_eq!(seen, Some("near"));

        // turned around, only the one behind is in the cone
        let turned = PlayerPose::new(pose.position, 0.0, std::f32::consts::PI);
        let seen = hall.exhibit_in_view(&turned, 6.0, 0.5).map(|e| e.name.as_str());
        assert_eq!(seen, Some("behind"));

        assert!(hall.exhibit_in_view(&pose, 2.0, 0.5).is_none());
    }
}
