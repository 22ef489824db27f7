use eframe::NativeOptions;
use terracube::app::TerracubeApp;
use terracube::config::AppConfig;
use terracube::error::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env()?;
    info!(
        lng = config.initial_center.lng,
        lat = config.initial_center.lat,
        zoom = config.initial_zoom,
        "starting"
    );

    let native_options = NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1400.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Terracube",
        native_options,
        Box::new(move |cc| Ok(Box::new(TerracubeApp::new(cc, &config)))),
    )?;
    Ok(())
}
