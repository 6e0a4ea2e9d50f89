//! Ordered, copy-on-publish list of sources.

use crate::error::SessionError;
use crate::source::{
    Source, SourceId, SourceKind, DEFAULT_CHARGE_MAGNITUDE, DEFAULT_CURRENT_STRENGTH,
};
use crate::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::debug;

/// Owns the session's sources.
///
/// Every mutation builds a new `Arc<[Source]>` and swaps it in; a reader that
/// grabbed `sources()` earlier keeps a complete, unchanging copy.
pub struct SourceRegistry {
    sources: Arc<[Source]>,
    next_id: u64,
    rng: StdRng,
}

impl SourceRegistry {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            sources: Arc::from(Vec::new()),
            next_id: 1,
            rng,
        }
    }

    /// Appends a source at `position` and returns its id.
    ///
    /// Charges get `+/-DEFAULT_CHARGE_MAGNITUDE` with a fair coin for the sign;
    /// current loops get `DEFAULT_CURRENT_STRENGTH` and a unit +x element.
    pub fn add(&mut self, kind: SourceKind, position: Vec3) -> SourceId {
        let id = SourceId(self.next_id);
        self.next_id += 1;
        let source = match kind {
            SourceKind::Charge => {
                let sign = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                Source::charge(id, position, sign * DEFAULT_CHARGE_MAGNITUDE)
            }
            SourceKind::CurrentLoop => Source::current_loop(id, position, DEFAULT_CURRENT_STRENGTH),
        };
        debug!(%id, ?kind, strength = source.strength(), "source added");
        self.publish(self.sources.iter().cloned().chain(Some(source)).collect());
        id
    }

    /// Like [`add`](Self::add) with the position drawn uniformly from
    /// `[-extent, extent]^3`.
    pub fn add_random(&mut self, kind: SourceKind, extent: f64) -> SourceId {
        let extent = if extent.is_finite() { extent.abs() } else { 0.0 };
        let position = Vec3::new(
            self.rng.gen_range(-extent..=extent),
            self.rng.gen_range(-extent..=extent),
            self.rng.gen_range(-extent..=extent),
        );
        self.add(kind, position)
    }

    /// Moves one source; current-loop paths move with it.
    pub fn move_source(&mut self, id: SourceId, position: Vec3) -> Result<(), SessionError> {
        if !self.sources.iter().any(|s| s.id() == id) {
            return Err(SessionError::UnknownSource(id));
        }
        let moved: Vec<Source> = self
            .sources
            .iter()
            .map(|s| if s.id() == id { s.moved_to(position) } else { s.clone() })
            .collect();
        debug!(%id, x = position.x, y = position.y, z = position.z, "source moved");
        self.publish(moved);
        Ok(())
    }

    /// Drops every source. Ids keep counting up afterwards.
    pub fn clear(&mut self) {
        if !self.sources.is_empty() {
            debug!(count = self.sources.len(), "sources cleared");
        }
        self.publish(Vec::new());
    }

    /// Current list. Clone into a `Vec` to edit; the registry is unaffected.
    pub fn sources(&self) -> Arc<[Source]> {
        Arc::clone(&self.sources)
    }

    pub fn get(&self, id: SourceId) -> Option<&Source> {
        self.sources.iter().find(|s| s.id() == id)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn publish(&mut self, sources: Vec<Source>) {
        self.sources = Arc::from(sources);
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}
