//! The session controller: one registry, one current snapshot, one busy flag.
//!
//! UI components receive the session explicitly instead of sharing a global
//! solver. Every edit publishes fresh `Arc`s, so a renderer holding the previous
//! list or snapshot keeps a consistent view until it asks again.

use crate::bridge::{invoke_solver, SolveRequest};
use crate::error::{SessionError, SolveError};
use crate::metrics::EfficiencyReport;
use crate::projector::{project_channel, FieldSegment};
use crate::registry::SourceRegistry;
use crate::scene::{SceneComposer, SceneFrame, SceneSettings};
use crate::settings::SessionSettings;
use crate::snapshot::FieldSnapshot;
use crate::source::{Source, SourceId, SourceKind};
use crate::traits::{FieldSolver, ReportSource};
use crate::Vec3;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Result of a solve request that did not fail.
#[derive(Debug, Clone)]
pub enum SolveOutcome {
    /// No sources; nothing to solve.
    Skipped,
    /// Another solve is in flight; this request was dropped.
    Busy,
    /// The registry was cleared while the solve ran; the result was discarded.
    Superseded,
    Completed(Arc<FieldSnapshot>),
}

/// Result of [`Session::begin_solve`].
#[derive(Debug)]
pub enum SolveStart {
    Started(SolveTicket),
    Skipped,
    Busy,
}

/// Exclusive claim on the session's single solve slot, plus the inputs captured
/// when it was issued.
#[derive(Debug)]
pub struct SolveTicket {
    serial: u64,
    epoch: u64,
    sources: Arc<[Source]>,
    request: SolveRequest,
}

impl SolveTicket {
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn request(&self) -> &SolveRequest {
        &self.request
    }
}

pub struct Session<S: FieldSolver> {
    solver: S,
    registry: SourceRegistry,
    snapshot: Option<Arc<FieldSnapshot>>,
    settings: SessionSettings,
    composer: SceneComposer,
    pending: Option<u64>,
    next_serial: u64,
    /// Bumped by `clear`; tickets from an older epoch cannot install results.
    epoch: u64,
}

impl<S: FieldSolver> Session<S> {
    pub fn new(solver: S, settings: SessionSettings) -> Self {
        Self {
            solver,
            registry: SourceRegistry::new(settings.seed),
            snapshot: None,
            composer: SceneComposer::new(settings.projector, settings.channel),
            settings,
            pending: None,
            next_serial: 0,
            epoch: 0,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn add_source(&mut self, kind: SourceKind, position: Vec3) -> SourceId {
        self.registry.add(kind, position)
    }

    /// Adds a source at a random spot inside the placement cube.
    pub fn add_random_source(&mut self, kind: SourceKind) -> SourceId {
        self.registry.add_random(kind, self.settings.placement_extent)
    }

    /// Moves a source. The snapshot is left as is; it is stale until the next solve.
    pub fn move_source(&mut self, id: SourceId, position: Vec3) -> Result<(), SessionError> {
        self.registry.move_source(id, position)
    }

    /// Empties the registry and drops the snapshot. A solve already in flight
    /// keeps its slot but its result will be discarded.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.snapshot = None;
        self.epoch += 1;
    }

    pub fn sources(&self) -> Arc<[Source]> {
        self.registry.sources()
    }

    pub fn source_count(&self) -> usize {
        self.registry.len()
    }

    pub fn snapshot(&self) -> Option<Arc<FieldSnapshot>> {
        self.snapshot.clone()
    }

    pub fn is_computing(&self) -> bool {
        self.pending.is_some()
    }

    /// Claims the solve slot for `request`.
    ///
    /// Busy sessions and empty registries are answered without touching the
    /// solver; an invalid request is an error and leaves the session idle.
    pub fn begin_solve(&mut self, request: SolveRequest) -> Result<SolveStart, SolveError> {
        if self.pending.is_some() {
            return Ok(SolveStart::Busy);
        }
        if self.registry.is_empty() {
            return Ok(SolveStart::Skipped);
        }
        request.validate()?;

        let serial = self.next_serial;
        self.next_serial += 1;
        self.pending = Some(serial);
        Ok(SolveStart::Started(SolveTicket {
            serial,
            epoch: self.epoch,
            sources: self.registry.sources(),
            request,
        }))
    }

    /// Releases the slot and installs `result` if it is a snapshot for the
    /// current registry. Errors are logged and returned; the previous snapshot
    /// stays in place.
    pub fn finish_solve(
        &mut self,
        ticket: SolveTicket,
        result: Result<FieldSnapshot, SolveError>,
    ) -> Result<SolveOutcome, SolveError> {
        if self.pending != Some(ticket.serial) {
            return Err(SolveError::StaleTicket);
        }
        self.pending = None;

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(sources = ticket.sources().len(), "field solve failed: {err}");
                return Err(err);
            }
        };
        if ticket.epoch != self.epoch {
            info!("registry cleared during solve; discarding result");
            return Ok(SolveOutcome::Superseded);
        }
        if !snapshot.is_aligned() {
            warn!(
                points = snapshot.points.len(),
                electric = snapshot.electric_field.len(),
                "solver returned misaligned field channels"
            );
        }
        info!(
            sources = ticket.sources().len(),
            samples = snapshot.sample_count(),
            resolution = ticket.request().resolution,
            "field solve complete"
        );
        let snapshot = Arc::new(snapshot);
        self.snapshot = Some(Arc::clone(&snapshot));
        Ok(SolveOutcome::Completed(snapshot))
    }

    /// Gives up a claimed slot without changing any state.
    pub fn abandon_solve(&mut self, ticket: SolveTicket) {
        if self.pending == Some(ticket.serial) {
            self.pending = None;
        }
    }

    /// Runs the solver for a ticket issued by this session.
    pub fn run_ticket(&mut self, ticket: &SolveTicket) -> Result<FieldSnapshot, SolveError> {
        invoke_solver(&mut self.solver, ticket.sources(), ticket.request())
    }

    /// Synchronous solve: begin, run, finish.
    pub fn solve(&mut self, request: SolveRequest) -> Result<SolveOutcome, SolveError> {
        let ticket = match self.begin_solve(request)? {
            SolveStart::Started(ticket) => ticket,
            SolveStart::Skipped => return Ok(SolveOutcome::Skipped),
            SolveStart::Busy => return Ok(SolveOutcome::Busy),
        };
        let result = self.run_ticket(&ticket);
        self.finish_solve(ticket, result)
    }

    /// Solve with the configured bounds and resolution.
    pub fn solve_default(&mut self) -> Result<SolveOutcome, SolveError> {
        self.solve(self.settings.solve_request())
    }

    /// Segments for the configured channel of the current snapshot.
    pub fn field_segments(&self) -> Vec<FieldSegment> {
        project_channel(
            self.snapshot.as_deref(),
            self.settings.channel,
            &self.settings.projector,
        )
    }

    pub fn scene_frame(&self) -> SceneFrame {
        self.composer
            .compose(&self.registry.sources(), self.snapshot.as_deref())
    }

    /// Camera, lighting, grid and labels; fixed for the session's lifetime.
    pub fn scene_settings(&self) -> &SceneSettings {
        &self.composer.scene
    }
}

impl<S: FieldSolver> ReportSource for Session<S> {
    fn efficiency_report(&self) -> EfficiencyReport {
        self.solver.efficiency_report()
    }
}
