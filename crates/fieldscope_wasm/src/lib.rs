//! WASM bindings for the FieldScope core library.
//!
//! `WasmSession` is the explicit controller handed to every UI component;
//! `WasmMetricsPoller` is the scoped timer that feeds the performance panel.

mod clock;
mod metrics;
mod session;

pub use metrics::WasmMetricsPoller;
pub use session::{SolveStatus, WasmSession};

use serde::Serialize;
use std::sync::Once;
use wasm_bindgen::prelude::*;

static HOOKS: Once = Once::new();

/// Panic hook and tracing subscriber, installed once per page.
pub(crate) fn install_hooks() {
    HOOKS.call_once(|| {
        console_error_panic_hook::set_once();
        #[cfg(target_arch = "wasm32")]
        tracing_wasm::set_as_global_default();
    });
}

/// Serializes with plain objects for maps so flattened structs reach JS as objects.
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
