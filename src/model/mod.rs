// MODEL: hall layout, viewpoint and scene state
pub mod hall;
pub mod pose;
pub mod camera;
pub mod particles;

pub use hall::{Exhibit, Hall, HallBounds, Obstacle};
pub use pose::PlayerPose;
pub use camera::Camera;
pub use particles::{Particle, ParticleConfig, ParticleField};
