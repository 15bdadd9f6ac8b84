#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use orgadmin_business::BusinessConfig;
use orgadmin_ui::OrgAdminApp;
use orgadmin_ui::state::State;

mod alloc {
    #[global_allocator]
    static MALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;
}

fn main() -> eframe::Result {
    // Log to stderr (if you run with `RUST_LOG=debug`).
    env_logger::Builder::from_env(env_logger::Env::default()).init();

    let config = match BusinessConfig::init() {
        Ok(config) => config,
        Err(err) => {
            log::error!("invalid configuration: {err:#}");
            return Err(eframe::Error::AppCreation(err.into()));
        }
    };

    // Commands and list requests are spawned on this runtime from the UI thread.
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => return Err(eframe::Error::AppCreation(Box::new(err))),
    };
    let _guard = runtime.enter();

    log::info!("talking to {}", config.api_url());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Organisation admin",
        native_options,
        Box::new(move |_cc| Ok(Box::new(OrgAdminApp::new(State::new(config))))),
    )
}
