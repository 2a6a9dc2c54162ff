//! Sanctuary Web - browser entry point for the scene
//!
//! The host page provides a `#sanctuary-canvas` element; loading the module
//! mounts the scene into it and `unmount()` tears it down again.

mod app;

use sanctuary_scene::TeardownSignal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use wasm_bindgen::prelude::*;

/// wgpu and the engine stay at WARN; the scene crates report at INFO
const LOG_DIRECTIVES: &str = "warn,sanctuary_core=info,sanctuary_scene=info,sanctuary_web=info";

thread_local! {
    static TEARDOWN: TeardownSignal = TeardownSignal::default();
}

/// Entry point for WASM module
#[wasm_bindgen(start)]
pub fn main() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce wgpu noise
    tracing_subscriber::registry()
        .with(log_filter())
        .with(tracing_wasm::WASMLayer::new(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(tracing::Level::INFO)
                .build(),
        ))
        .init();

    let teardown = TEARDOWN.with(TeardownSignal::clone);
    app::run(teardown);
}

fn log_filter() -> EnvFilter {
    EnvFilter::new(LOG_DIRECTIVES)
}

/// Release the scene; safe to call more than once
#[wasm_bindgen]
pub fn unmount() {
    TEARDOWN.with(TeardownSignal::request);
}
