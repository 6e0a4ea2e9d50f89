use crate::session::WasmSession;
use crate::to_js;
use fieldscope_core::metrics::{EfficiencyReport, MetricsSynchronizer};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Browser-timer driven metrics poll for one session.
///
/// Holds only a weak reference to the session: once the session is freed the
/// timer keeps firing into a no-op until the poller is cancelled or dropped.
#[wasm_bindgen]
pub struct WasmMetricsPoller {
    sync: Rc<RefCell<MetricsSynchronizer>>,
    handle: Option<i32>,
    tick: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl WasmMetricsPoller {
    /// Publishes a report immediately, then every configured interval.
    /// `on_report(report, rows)` receives the raw report and the formatted
    /// panel rows, where unmeasured ratios read "N/A".
    #[wasm_bindgen(constructor)]
    pub fn new(session: &WasmSession, on_report: js_sys::Function) -> Result<WasmMetricsPoller, JsValue> {
        let interval = session.metrics_interval();
        let sync = Rc::new(RefCell::new(MetricsSynchronizer::new(interval)));
        let weak = session.downgrade();

        let first = {
            let shared = weak
                .upgrade()
                .ok_or_else(|| JsValue::from_str("Session has been freed"))?;
            let session = shared
                .try_borrow()
                .map_err(|_| JsValue::from_str("Session is busy"))?;
            let mut state = sync.borrow_mut();
            let report = state.start(&*session).cloned();
            report
        };
        if let Some(report) = first {
            deliver(&on_report, &report)?;
        }

        let tick_sync = Rc::clone(&sync);
        let tick = Closure::<dyn FnMut()>::new(move || {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let report = match shared.try_borrow() {
                Ok(session) => tick_sync.borrow_mut().pull(&*session).cloned(),
                // a solve is running on this tick; the next one will catch up
                Err(_) => None,
            };
            let Some(report) = report else {
                return;
            };
            if let Err(err) = deliver(&on_report, &report) {
                tracing::warn!("metrics report not delivered: {:?}", err);
            }
        });

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))?;
        let handle = window.set_interval_with_callback_and_timeout_and_arguments_0(
            tick.as_ref().unchecked_ref(),
            interval.as_millis().min(i32::MAX as u128) as i32,
        )?;
        tracing::debug!(interval_ms = interval.as_millis() as u64, "metrics polling started");

        Ok(WasmMetricsPoller {
            sync,
            handle: Some(handle),
            tick: Some(tick),
        })
    }

    /// Most recent report, or `undefined` if none was published.
    pub fn latest(&self) -> Result<JsValue, JsValue> {
        match self.sync.borrow().latest() {
            Some(report) => to_js(report),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Panel rows for the most recent report, or `undefined`.
    pub fn latest_rows(&self) -> Result<JsValue, JsValue> {
        match self.sync.borrow().latest() {
            Some(report) => to_js(&report.display_rows()),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some() && self.sync.borrow().is_active()
    }

    /// Stops the timer. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(handle);
            }
            tracing::debug!("metrics polling stopped");
        }
        if let Ok(mut sync) = self.sync.try_borrow_mut() {
            sync.cancel();
        }
        self.tick = None;
    }
}

impl Drop for WasmMetricsPoller {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn deliver(on_report: &js_sys::Function, report: &EfficiencyReport) -> Result<(), JsValue> {
    let value = to_js(report)?;
    let rows = to_js(&report.display_rows())?;
    on_report.call2(&JsValue::NULL, &value, &rows)?;
    Ok(())
}
