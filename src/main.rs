use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use diorama::{config::ViewerConfig, DioramaApp};

/// Fly through the diorama. F1 toggles the debug UI, Escape quits.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Directory holding `objects/` and `Skybox_textures/`
    #[arg(long, value_name = "DIR")]
    resources: Option<PathBuf>,

    /// Camera/colour snapshot read at startup and written on exit
    #[arg(long, value_name = "FILE")]
    state_file: Option<PathBuf>,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Read the snapshot but never write it back
    #[arg(long)]
    no_save: bool,
}

impl Args {
    fn into_config(self) -> ViewerConfig {
        let mut config = ViewerConfig::default().with_size(self.width, self.height);
        if let Some(resources) = self.resources {
            config = config.with_resource_root(resources);
        }
        if let Some(state_file) = self.state_file {
            config = config.with_state_file(state_file);
        }
        config.save_state_on_exit = !self.no_save;
        config
    }
}

fn run(config: ViewerConfig) -> Result<()> {
    let app = DioramaApp::new(config).context("failed to start the viewer")?;
    app.run().context("viewer stopped with an error")?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config();
    if let Err(err) = run(config) {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}
