use crate::clock::session_clock;
use crate::{install_hooks, to_js};
use fieldscope_core::bridge::{Bounds, SolveRequest};
use fieldscope_core::error::SessionError;
use fieldscope_core::metrics::ReportRow;
use fieldscope_core::placeholder::PlaceholderSolver;
use fieldscope_core::session::{Session, SolveOutcome};
use fieldscope_core::settings::SessionSettings;
use fieldscope_core::source::{SourceId, SourceKind};
use fieldscope_core::traits::ReportSource;
use fieldscope_core::Vec3;
use serde_wasm_bindgen::from_value;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use wasm_bindgen::prelude::*;

pub(crate) type SharedSession = Rc<RefCell<Session<PlaceholderSolver>>>;

/// Outcome of `WasmSession::solve`. Solver failures are thrown instead.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Skipped = 0,
    Busy = 1,
    Superseded = 2,
    Completed = 3,
}

impl From<&SolveOutcome> for SolveStatus {
    fn from(outcome: &SolveOutcome) -> Self {
        match outcome {
            SolveOutcome::Skipped => SolveStatus::Skipped,
            SolveOutcome::Busy => SolveStatus::Busy,
            SolveOutcome::Superseded => SolveStatus::Superseded,
            SolveOutcome::Completed(_) => SolveStatus::Completed,
        }
    }
}

#[wasm_bindgen]
pub struct WasmSession {
    inner: SharedSession,
}

#[wasm_bindgen]
impl WasmSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmSession {
        Self::from_settings(SessionSettings::default())
    }

    /// Builds a session from a partial settings object; missing keys take defaults.
    pub fn with_settings(settings: JsValue) -> Result<WasmSession, JsValue> {
        let settings: SessionSettings = if settings.is_undefined() || settings.is_null() {
            SessionSettings::default()
        } else {
            from_value(settings)
                .map_err(|e| JsValue::from_str(&format!("Invalid settings: {}", e)))?
        };
        Ok(Self::from_settings(settings))
    }

    /// Returns the new source's id.
    pub fn add_source(&self, kind: &str, x: f64, y: f64, z: f64) -> Result<f64, JsValue> {
        let kind = parse_kind(kind)?;
        let mut session = self.session_mut()?;
        Ok(session.add_source(kind, Vec3::new(x, y, z)).0 as f64)
    }

    pub fn add_random_source(&self, kind: &str) -> Result<f64, JsValue> {
        let kind = parse_kind(kind)?;
        let mut session = self.session_mut()?;
        Ok(session.add_random_source(kind).0 as f64)
    }

    pub fn move_source(&self, id: f64, x: f64, y: f64, z: f64) -> Result<(), JsValue> {
        let mut session = self.session_mut()?;
        session
            .move_source(SourceId(id as u64), Vec3::new(x, y, z))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn clear(&self) -> Result<(), JsValue> {
        self.session_mut()?.clear();
        Ok(())
    }

    pub fn source_count(&self) -> u32 {
        self.inner
            .try_borrow()
            .map(|s| s.source_count() as u32)
            .unwrap_or(0)
    }

    pub fn is_computing(&self) -> bool {
        self.inner.try_borrow().map(|s| s.is_computing()).unwrap_or(true)
    }

    pub fn sources(&self) -> Result<JsValue, JsValue> {
        let session = self.session()?;
        to_js(&*session.sources())
    }

    /// Latest snapshot, or `undefined` before the first successful solve.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let session = self.session()?;
        match session.snapshot() {
            Some(snapshot) => to_js(&*snapshot),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Solves with the configured bounds and resolution.
    pub fn solve(&self) -> Result<SolveStatus, JsValue> {
        let Ok(mut session) = self.inner.try_borrow_mut() else {
            return Ok(SolveStatus::Busy);
        };
        session
            .solve_default()
            .map(|outcome| SolveStatus::from(&outcome))
            .map_err(|e| JsValue::from_str(&format!("Solve failed: {}", e)))
    }

    pub fn solve_in(&self, min: Vec<f64>, max: Vec<f64>, resolution: u32) -> Result<SolveStatus, JsValue> {
        let bounds = Bounds::new(vec3_from_slice(&min)?, vec3_from_slice(&max)?);
        let Ok(mut session) = self.inner.try_borrow_mut() else {
            return Ok(SolveStatus::Busy);
        };
        session
            .solve(SolveRequest::new(bounds, resolution as usize))
            .map(|outcome| SolveStatus::from(&outcome))
            .map_err(|e| JsValue::from_str(&format!("Solve failed: {}", e)))
    }

    pub fn field_segments(&self) -> Result<JsValue, JsValue> {
        let session = self.session()?;
        to_js(&session.field_segments())
    }

    pub fn scene_frame(&self) -> Result<JsValue, JsValue> {
        let session = self.session()?;
        to_js(&session.scene_frame())
    }

    pub fn scene_settings(&self) -> Result<JsValue, JsValue> {
        let session = self.session()?;
        to_js(&session.scene_settings())
    }

    pub fn efficiency_report(&self) -> Result<JsValue, JsValue> {
        let session = self.session()?;
        to_js(&session.efficiency_report())
    }

    /// Performance panel rows as `{ label, value }` objects; unmeasured ratios read "N/A".
    pub fn report_rows(&self) -> Result<JsValue, JsValue> {
        to_js(&self.panel_rows()?)
    }
}

impl Default for WasmSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WasmSession {
    fn from_settings(settings: SessionSettings) -> Self {
        install_hooks();
        let solver = PlaceholderSolver::new(session_clock());
        Self {
            inner: Rc::new(RefCell::new(Session::new(solver, settings))),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<Session<PlaceholderSolver>>> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn metrics_interval(&self) -> Duration {
        self.inner
            .try_borrow()
            .map(|s| s.settings().metrics_interval())
            .unwrap_or_default()
    }

    fn panel_rows(&self) -> Result<Vec<ReportRow>, JsValue> {
        Ok(self.session()?.efficiency_report().display_rows())
    }

    fn session(&self) -> Result<std::cell::Ref<'_, Session<PlaceholderSolver>>, JsValue> {
        self.inner
            .try_borrow()
            .map_err(|_| JsValue::from_str("Session is busy"))
    }

    fn session_mut(&self) -> Result<std::cell::RefMut<'_, Session<PlaceholderSolver>>, JsValue> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("Session is busy"))
    }
}

fn parse_kind(kind: &str) -> Result<SourceKind, JsValue> {
    SourceKind::from_name(kind)
        .ok_or_else(|| JsValue::from_str(&SessionError::UnknownKind(kind.to_string()).to_string()))
}

fn vec3_from_slice(values: &[f64]) -> Result<Vec3, JsValue> {
    match values {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(JsValue::from_str("Bounds corners need exactly three coordinates.")),
    }
}
