use eframe::egui;
use patent_uploader::app::PatentUploader;
use patent_uploader::config::UploaderConfig;
use patent_uploader::error::AppError;
use patent_uploader::logging;

fn main() -> Result<(), AppError> {
    let config = UploaderConfig::load()?;
    logging::init(&config.log_level)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 640.0])
            .with_min_inner_size([480.0, 420.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Patent Uploader",
        options,
        Box::new(move |cc: &eframe::CreationContext<'_>| {
            Box::new(PatentUploader::new(cc, config))
        }),
    )?;
    Ok(())
}
