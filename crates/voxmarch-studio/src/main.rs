use std::path::PathBuf;

use anyhow::Result;
use voxmarch_engine::logging::{init_logging, LoggingConfig};
use voxmarch_viewer::{SceneConfig, Viewer};

/// `voxmarch-studio [model.vox]`
///
/// With no argument the procedural sphere scene is shown.
fn main() {
    init_logging(LoggingConfig::default());

    if let Err(err) = run(std::env::args_os().nth(1).map(PathBuf::from)) {
        log::error!("{err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(model: Option<PathBuf>) -> Result<()> {
    let scene = match model {
        Some(path) => {
            log::info!("loading {}", path.display());
            SceneConfig::vox_model(path)
        }
        None => SceneConfig::sphere_demo(),
    };

    println!();
    println!("  voxmarch studio");
    println!("  drag: orbit   space: accumulate   r: auto-orbit   h: shadows");
    println!("  up/down: bounces   pgup/pgdn: dda depth   [ ]: shadow   left/right: sun");
    println!("  esc: quit");
    println!();

    Viewer::new(scene).run()
}
