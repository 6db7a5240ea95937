use std::process::ExitCode;

use rook_engine::device::GpuInit;
use rook_engine::logging::{init_logging, LoggingConfig};
use rook_engine::window::Runtime;

mod app;
mod assets;
mod config;
mod frame;
mod resources;
#[cfg(test)]
mod testing;

use app::ViewerApp;
use config::ViewerConfig;

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    let config = ViewerConfig::default();
    let runtime = config.runtime();

    match Runtime::run(runtime, GpuInit::default(), ViewerApp::new(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
