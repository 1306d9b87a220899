use karting_common::Transform;

/// Spin applied about Y each tick, in degrees.
const SPIN_SPEED: f32 = 0.05;

/// A decorative body beside the track that turns slowly in place.
#[derive(Debug, Clone)]
pub struct Landmark {
    name: String,
    transform: Transform,
    spin_speed: f32,
}

impl Landmark {
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            spin_speed: SPIN_SPEED,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn update(&mut self) {
        self.transform.rotation.y += self.spin_speed;
    }
}
