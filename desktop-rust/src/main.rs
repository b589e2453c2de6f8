mod app;
mod io;
mod model;

use app::{configure_fonts, DesktopApp};
use invoice_ai_desk::config::Config;
use invoice_ai_desk::logging::init_logging;

fn main() -> anyhow::Result<()> {
    init_logging(false);
    let config = Config::load()?;

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Invoice AI Desk",
        options,
        Box::new(move |cc| {
            configure_fonts(&cc.egui_ctx);
            let mut app = DesktopApp::new(config);
            app.load_history();
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
