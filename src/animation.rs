//! Per-frame animation: phase, node spins and the single render call.
//!
//! Speeds are read from the configuration store every frame and applied
//! per frame, not per second, so the motion rate follows the display rate.

use std::collections::HashSet;

use glam::Vec3;
use log::{error, warn};

use crate::camera::Camera;
use crate::config::ConfigStore;
use crate::scene::SceneGraph;
use crate::traits::RenderSurface;

/// Single-slot edge latch: raised by input events, consumed once per frame
#[derive(Debug, Default, Clone)]
pub struct LatchedSignal {
    raised: bool,
}

impl LatchedSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self) {
        self.raised = true;
    }

    pub fn is_set(&self) -> bool {
        self.raised
    }

    /// Returns whether the signal was raised since the last call
    pub fn consume_and_clear(&mut self) -> bool {
        std::mem::take(&mut self.raised)
    }
}

/// Address of a float parameter in the configuration store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamRef {
    pub group: String,
    pub key: String,
}

impl ParamRef {
    pub fn new(group: &str, key: &str) -> Self {
        Self {
            group: group.to_string(),
            key: key.to_string(),
        }
    }
}

impl std::fmt::Display for ParamRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.group, self.key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinCondition {
    Always,
    /// Only on frames where the activity signal was raised beforehand
    OnActivity,
}

/// Rotation added to a named node every qualifying frame:
/// `axes * speed` radians, with `speed` read from the config
#[derive(Debug, Clone)]
pub struct Spin {
    pub node: String,
    pub axes: Vec3,
    pub speed: ParamRef,
    pub condition: SpinCondition,
}

impl Spin {
    pub fn always(node: &str, axes: Vec3, speed: ParamRef) -> Self {
        Self {
            node: node.to_string(),
            axes,
            speed,
            condition: SpinCondition::Always,
        }
    }

    pub fn on_activity(node: &str, axes: Vec3, speed: ParamRef) -> Self {
        Self {
            condition: SpinCondition::OnActivity,
            ..Self::always(node, axes, speed)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationState {
    /// Sum of the phase speed over every processed frame
    pub phase: f32,
    pub frame: u64,
}

/// Outcome of one [`AnimationDriver::tick`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub phase: f32,
    /// Whether the activity signal was consumed this frame
    pub active: bool,
    /// Nodes rotated this frame
    pub spun: usize,
    pub rendered: bool,
}

#[derive(Debug)]
pub struct AnimationDriver {
    phase_speed: ParamRef,
    spins: Vec<Spin>,
    accumulated: Vec<Vec3>,
    state: AnimationState,
    activity: LatchedSignal,
    // problems already logged, so a missing node warns once instead of every frame
    reported: HashSet<String>,
}

impl AnimationDriver {
    pub fn new(phase_speed: ParamRef) -> Self {
        Self {
            phase_speed,
            spins: Vec::new(),
            accumulated: Vec::new(),
            state: AnimationState::default(),
            activity: LatchedSignal::new(),
            reported: HashSet::new(),
        }
    }

    pub fn with_spin(mut self, spin: Spin) -> Self {
        self.spins.push(spin);
        self.accumulated.push(Vec3::ZERO);
        self
    }

    pub fn spins(&self) -> &[Spin] {
        &self.spins
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Mark user activity; picked up by the next tick
    pub fn signal_activity(&mut self) {
        self.activity.set();
    }

    pub fn activity_pending(&self) -> bool {
        self.activity.is_set()
    }

    /// Total rotation this driver has applied to `node`
    pub fn accumulated_rotation(&self, node: &str) -> Option<Vec3> {
        self.spins
            .iter()
            .position(|s| s.node == node)
            .map(|i| self.accumulated[i])
    }

    /// Process one display frame and render it exactly once.
    ///
    /// Never fails: missing nodes, unreadable speeds and render errors are
    /// logged and the frame still completes.
    pub fn tick(
        &mut self,
        scene: &mut SceneGraph,
        config: &ConfigStore,
        surface: &mut dyn RenderSurface,
        camera: &Camera,
    ) -> FrameReport {
        let active = self.activity.consume_and_clear();

        let phase_speed = read_speed(config, &self.phase_speed, &mut self.reported);
        self.state.phase += phase_speed;
        self.state.frame += 1;

        let mut spun = 0;
        for (spin, total) in self.spins.iter().zip(self.accumulated.iter_mut()) {
            if spin.condition == SpinCondition::OnActivity && !active {
                continue;
            }
            let delta = spin.axes * read_speed(config, &spin.speed, &mut self.reported);
            match scene
                .lookup(&spin.node)
                .and_then(|id| scene.transform_mut(id))
            {
                Ok(transform) => {
                    transform.rotate_by(delta);
                    *total += delta;
                    spun += 1;
                }
                Err(err) => {
                    if self.reported.insert(format!("node:{}", spin.node)) {
                        warn!("skipping spin of `{}`: {err}", spin.node);
                    }
                }
            }
        }

        let rendered = match surface.render(scene, camera) {
            Ok(()) => true,
            Err(err) => {
                error!("frame {} failed to render: {err}", self.state.frame);
                false
            }
        };

        FrameReport {
            frame: self.state.frame,
            phase: self.state.phase,
            active,
            spun,
            rendered,
        }
    }
}

fn read_speed(config: &ConfigStore, param: &ParamRef, reported: &mut HashSet<String>) -> f32 {
    config.float(&param.group, &param.key).unwrap_or_else(|err| {
        if reported.insert(format!("param:{param}")) {
            warn!("speed {param} unavailable, holding still: {err}");
        }
        0.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latched_signal() {
        let mut signal = LatchedSignal::new();
        assert!(!signal.consume_and_clear());
        signal.set();
        signal.set();
        assert!(signal.is_set());
        assert!(signal.consume_and_clear());
        assert!(!signal.consume_and_clear());
    }

    #[test]
    fn test_spin_builders() {
        let spin = Spin::on_activity("core", Vec3::ONE, ParamRef::new("motion", "speed"));
        assert_eq!(spin.condition, SpinCondition::OnActivity);
        assert_eq!(spin.speed.to_string(), "motion.speed");

        let driver = AnimationDriver::new(ParamRef::new("motion", "speed")).with_spin(spin);
        assert_eq!(driver.accumulated_rotation("core"), Some(Vec3::ZERO));
        assert_eq!(driver.accumulated_rotation("nope"), None);
    }
}
