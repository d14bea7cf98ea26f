use std::path::PathBuf;

use clap::Parser;

use crate::scenes::SceneKind;

#[derive(Parser, Debug, Clone)]
#[command(name = "parametric-scene")]
#[command(about = "Live-tunable procedural 3D scenes", long_about = None)]
pub struct Cli {
    /// Scene to build
    #[arg(long, value_enum, default_value_t = SceneKind::Crystal)]
    pub scene: SceneKind,

    /// Hide the control panel
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// JSON preset applied over the scene defaults before the first frame
    #[arg(long, value_name = "FILE")]
    pub preset: Option<PathBuf>,

    /// Print the scene's parameters as a JSON preset and exit
    #[arg(long = "dump-preset", default_value = "false")]
    pub dump_preset: bool,
}
