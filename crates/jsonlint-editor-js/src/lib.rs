//! WASM bindings for the jsonlint editor.
//!
//! Provides the embeddable JSON editor for JavaScript/TypeScript pages.

mod callbacks;
mod editor;
mod events;
mod types;

pub use callbacks::*;
pub use editor::*;
pub use events::*;
pub use types::*;

use wasm_bindgen::prelude::*;

/// Initialize panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    // Caret tracing fires on every keystroke.
    let filter = EnvFilter::new("debug,jsonlint::caret=info");

    let reg = Registry::default().with(filter).with(wasm_layer);

    let _ = set_global_default(reg);
}
