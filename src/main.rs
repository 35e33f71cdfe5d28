use tracing::Level;

#[cfg(not(target_arch = "wasm32"))]
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .try_init();
}

#[cfg(target_arch = "wasm32")]
fn init_logging() {
    // forwards tracing events to the browser console
    let _ = dioxus::logger::init(Level::INFO);
}

fn main() {
    init_logging();
    dioxus::launch(fiscal_dashboard::ui::App);
}
