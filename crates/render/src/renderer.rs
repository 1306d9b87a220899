use glam::Vec3;

use crate::scene::SceneFrame;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 2.0, -4.5),
            target: Vec3::new(0.0, 2.0, -3.0),
            fov_degrees: 80.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads a captured scene and a view, then produces output. It
/// never sees the simulation itself.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &SceneFrame, view: &RenderView) -> Self::Output;
}

/// Text renderer for headless runs, logs and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &SceneFrame, view: &RenderView) -> String {
        let hud = &scene.hud;
        let mut out = String::new();
        out.push_str(&format!(
            "=== Race (tick={}, phase={}, sky={:?}) ===\n",
            hud.tick, hud.phase, scene.sky
        ));
        out.push_str(&format!(
            "Started: {}  Paused: {}  Player speed: {:.4}\n",
            hud.race_started, hud.paused, hud.player_speed
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));
        let light = &scene.track_light;
        let color = light.color();
        out.push_str(&format!(
            "Start light: color=({:.2}, {:.2}, {:.2}) intensity={:.0}\n",
            color.x,
            color.y,
            color.z,
            light.intensity()
        ));

        out.push_str(&format!("Drawables: {}\n", scene.drawables.len()));
        for d in &scene.drawables {
            let p = d.transform.position;
            out.push_str(&format!(
                "  {:<12} {:?} pos=({:.2}, {:.2}, {:.2}) alpha={:.2}\n",
                d.label, d.shape, p.x, p.y, p.z, d.color[3]
            ));
        }

        if !hud.results.is_empty() {
            out.push_str("Results:\n");
            for record in &hud.results {
                out.push_str(&format!("  {record}\n"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use karting_kernel::{RaceConfig, RaceSim};

    #[test]
    fn debug_renderer_fresh_race() {
        let sim = RaceSim::new(RaceConfig::default());
        let scene = SceneFrame::capture(&sim);
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());

        assert!(output.contains("tick=0"));
        assert!(output.contains("phase=idle"));
        assert!(output.contains("Drawables: 8"));
        assert!(output.contains("Turtle"));
        assert!(!output.contains("Results:"));
    }

    #[test]
    fn debug_renderer_lists_results() {
        let sim = RaceSim::new(RaceConfig::default());
        let mut scene = SceneFrame::capture(&sim);
        scene.hud.results.push(karting_kernel::FinishRecord {
            rank: 1,
            name: "Hare".into(),
            time: 20.0,
        });
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(output.contains("RANK: 1 KART: Hare : Time :20:"));
    }

    #[test]
    fn debug_renderer_one_line_per_drawable() {
        let sim = RaceSim::new(RaceConfig::default());
        let scene = SceneFrame::capture(&sim);
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(output.ends_with('\n'));
        assert!(output.lines().any(|l| l.starts_with("Camera: eye=(0.0, 2.0, -4.5)")));
        let bodies = output.lines().filter(|l| l.contains(" pos=(")).count();
        assert_eq!(bodies, scene.drawables.len());
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 80.0);
        assert_eq!(view.target, Vec3::new(0.0, 2.0, -3.0));
    }
}
