use std::path::PathBuf;
use std::process::ExitCode;

use attractor_field::{ColorMode, DeviceClass, EngineConfig, RunError};
use clap::Parser;

/// Lorenz attractor trails rendered as GPU point clouds.
#[derive(Debug, Parser)]
#[command(name = "attractor-field", version, about)]
struct Cli {
    /// JSON engine configuration to load instead of the defaults
    config: Option<PathBuf>,

    /// Use the lighter preset for low-power displays
    #[arg(long)]
    constrained: bool,

    /// Start in fractal colour mode
    #[arg(long)]
    fractal: bool,
}

impl Cli {
    fn into_config(self) -> Result<EngineConfig, RunError> {
        let mut config = match self.config {
            Some(path) => {
                log::info!("loading config from {}", path.display());
                EngineConfig::load(&path)?
            }
            None => EngineConfig::new(),
        };
        if self.constrained {
            config = config.with_device_class(DeviceClass::Constrained);
        }
        if self.fractal {
            config = config.with_color_mode(ColorMode::Fractal);
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.into_config().and_then(attractor_field::run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
