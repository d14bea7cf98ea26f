pub mod animation;
pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod factory;
pub mod frame;
pub mod geometry;
pub mod input;
pub mod math;
pub mod panel;
pub mod regen;
pub mod renderer;
pub mod scene;
pub mod scenes;
pub mod traits;

pub use animation::{AnimationDriver, FrameReport, LatchedSignal};
pub use config::{ConfigStore, ParamChange, Preset};
pub use error::{Result, SceneError};
pub use regen::{RegenReport, RegenerationController};
pub use scene::SceneGraph;
pub use scenes::{SceneKind, SceneSetup};
