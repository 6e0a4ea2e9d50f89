use fieldscope_core::traits::Clock;
#[cfg(target_arch = "wasm32")]
use std::time::Duration;

/// `performance.now()`, falling back to `Date.now()` outside a window context.
#[cfg(target_arch = "wasm32")]
pub(crate) struct PerformanceClock;

#[cfg(target_arch = "wasm32")]
impl Clock for PerformanceClock {
    fn now(&self) -> Duration {
        let ms = web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now);
        Duration::from_secs_f64(ms.max(0.0) / 1000.0)
    }
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn session_clock() -> Box<dyn Clock> {
    Box::new(PerformanceClock)
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn session_clock() -> Box<dyn Clock> {
    Box::new(fieldscope_core::metrics::InstantClock::new())
}
