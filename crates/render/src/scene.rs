use glam::{Mat4, Vec3};
use karting_common::{KartRole, Transform};
use karting_kernel::{FinishRecord, Light, Phase, RaceSim, Sky};

const PLAYER_COLOR: Vec3 = Vec3::new(0.85, 0.2, 0.15);
const GHOST_COLOR: Vec3 = Vec3::new(0.6, 0.75, 1.0);
const GROUND_COLOR: Vec3 = Vec3::new(0.32, 0.36, 0.3);
const FINISH_COLOR: Vec3 = Vec3::new(0.95, 0.95, 0.95);
const EARTH_COLOR: Vec3 = Vec3::new(0.2, 0.4, 0.85);
const METEORITE_COLOR: Vec3 = Vec3::new(0.45, 0.35, 0.3);

/// Built-in primitive a drawable is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Unit cube, ±0.5 on each axis.
    Cube,
    /// Quad in the XY plane, ±1 on each axis, facing +Z.
    Quad,
    /// Unit-radius sphere.
    Sphere,
}

/// Which point light illuminates a drawable. The sun lights everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightSlot {
    /// The start light's point light.
    Track,
    /// The point light reserved for the landmarks.
    Landmark,
    /// Self-lit; only its own color.
    Emissive,
}

#[derive(Debug, Clone)]
pub struct Drawable {
    pub label: String,
    pub shape: Shape,
    pub transform: Transform,
    /// Linear RGB plus alpha; alpha below 1 is drawn blended.
    pub color: [f32; 4],
    pub light: LightSlot,
}

impl Drawable {
    pub fn model_matrix(&self) -> Mat4 {
        self.transform.model_matrix()
    }

    pub fn is_translucent(&self) -> bool {
        self.color[3] < 1.0
    }
}

/// Race status shown alongside the scene.
#[derive(Debug, Clone)]
pub struct HudState {
    pub tick: u64,
    pub phase: Phase,
    pub race_started: bool,
    pub paused: bool,
    pub player_speed: f32,
    pub results: Vec<FinishRecord>,
}

/// Everything a renderer needs for one frame, captured after the tick.
///
/// Capturing copies out of the simulation; renderers never hold a reference
/// into race state.
#[derive(Debug, Clone)]
pub struct SceneFrame {
    pub drawables: Vec<Drawable>,
    pub track_light: Light,
    pub landmark_light: Light,
    pub sun: Light,
    pub sky: Sky,
    pub hud: HudState,
}

impl SceneFrame {
    pub fn capture(sim: &RaceSim) -> Self {
        let mut drawables = Vec::with_capacity(sim.entrants().len() + 5);

        drawables.push(Drawable {
            label: "ground".into(),
            shape: Shape::Quad,
            transform: *sim.ground(),
            color: rgba(GROUND_COLOR, 1.0),
            light: LightSlot::Track,
        });
        drawables.push(Drawable {
            label: "finish line".into(),
            shape: Shape::Quad,
            transform: *sim.finish_line().transform(),
            color: rgba(FINISH_COLOR, 1.0),
            light: LightSlot::Track,
        });

        let traffic_light = sim.traffic_light();
        drawables.push(Drawable {
            label: "start light".into(),
            shape: Shape::Cube,
            transform: *traffic_light.transform(),
            color: rgba(traffic_light.light().color(), 1.0),
            light: LightSlot::Emissive,
        });

        for landmark in sim.landmarks() {
            let color = if landmark.name() == "Earth" {
                EARTH_COLOR
            } else {
                METEORITE_COLOR
            };
            drawables.push(Drawable {
                label: landmark.name().to_owned(),
                shape: Shape::Sphere,
                transform: *landmark.transform(),
                color: rgba(color, 1.0),
                light: LightSlot::Landmark,
            });
        }

        for entrant in sim.entrants() {
            let kart = &entrant.kart;
            let color = match kart.role() {
                KartRole::Player => PLAYER_COLOR,
                KartRole::Ghost => GHOST_COLOR,
            };
            drawables.push(Drawable {
                label: kart.name().to_owned(),
                shape: Shape::Cube,
                transform: *kart.transform(),
                color: rgba(color, entrant.transparency),
                light: LightSlot::Track,
            });
        }

        // Opaque first, then translucent far to near, so ghosts blend over the track.
        let eye = sim.player().position();
        drawables.sort_by(|a, b| {
            a.is_translucent().cmp(&b.is_translucent()).then_with(|| {
                let da = a.transform.position.distance_squared(eye);
                let db = b.transform.position.distance_squared(eye);
                db.total_cmp(&da)
            })
        });

        let context = sim.context();
        Self {
            drawables,
            track_light: *traffic_light.light(),
            landmark_light: *sim.landmark_light(),
            sun: *sim.sun(),
            sky: context.sky,
            hud: HudState {
                tick: sim.tick_count(),
                phase: traffic_light.phase(),
                race_started: context.race_started,
                paused: context.paused,
                player_speed: sim.player().speed(),
                results: sim.results().to_vec(),
            },
        }
    }

    pub fn find(&self, label: &str) -> Option<&Drawable> {
        self.drawables.iter().find(|d| d.label == label)
    }
}

fn rgba(rgb: Vec3, alpha: f32) -> [f32; 4] {
    [rgb.x, rgb.y, rgb.z, alpha]
}
