//! Request validation and the guarded call into the external solver.

use crate::error::SolveError;
use crate::snapshot::FieldSnapshot;
use crate::source::Source;
use crate::traits::FieldSolver;
use crate::Vec3;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Grid density used when the caller does not pick one.
pub const DEFAULT_RESOLUTION: usize = 32;
/// Upper bound on samples per axis; 256^3 samples is already far past what the
/// renderer can draw.
pub const MAX_RESOLUTION: usize = 256;

/// Axis-aligned sampling volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Cube centred on the origin with the given half extent.
    pub fn cube(half_extent: f64) -> Self {
        Self {
            min: Vec3::repeat(-half_extent),
            max: Vec3::repeat(half_extent),
        }
    }

    pub fn validate(&self) -> Result<(), SolveError> {
        for (idx, axis) in ['x', 'y', 'z'].into_iter().enumerate() {
            let (min, max) = (self.min[idx], self.max[idx]);
            if !min.is_finite() || !max.is_finite() || max <= min {
                return Err(SolveError::InvalidBounds { axis, min, max });
            }
        }
        Ok(())
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::cube(5.0)
    }
}

/// Everything the solver needs besides the sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    pub bounds: Bounds,
    pub resolution: usize,
}

impl SolveRequest {
    pub fn new(bounds: Bounds, resolution: usize) -> Self {
        Self { bounds, resolution }
    }

    pub fn validate(&self) -> Result<(), SolveError> {
        self.bounds.validate()?;
        if self.resolution == 0 || self.resolution > MAX_RESOLUTION {
            return Err(SolveError::InvalidResolution {
                resolution: self.resolution,
                max: MAX_RESOLUTION,
            });
        }
        Ok(())
    }
}

impl Default for SolveRequest {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

/// Runs the solver, turning both `Err` and panics into `SolveError::Solver`.
pub fn invoke_solver<S: FieldSolver + ?Sized>(
    solver: &mut S,
    sources: &[Source],
    request: &SolveRequest,
) -> Result<FieldSnapshot, SolveError> {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        solver.solve(sources, &request.bounds, request.resolution)
    }));
    match outcome {
        Ok(Ok(snapshot)) => Ok(snapshot),
        Ok(Err(err)) => Err(SolveError::Solver(err)),
        Err(payload) => Err(SolveError::Solver(anyhow::anyhow!(
            panic_payload_to_string(payload)
        ))),
    }
}

fn panic_payload_to_string(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    "Solver panicked.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::EfficiencyReport;
    use crate::source::SourceId;
    use crate::traits::ReportSource;

    struct PanickingSolver;

    impl ReportSource for PanickingSolver {
        fn efficiency_report(&self) -> EfficiencyReport {
            EfficiencyReport::default()
        }
    }

    impl FieldSolver for PanickingSolver {
        fn solve(&mut self, _: &[Source], _: &Bounds, _: usize) -> anyhow::Result<FieldSnapshot> {
            panic!("lattice exploded");
        }
    }

    #[test]
    fn default_request_matches_the_ui_volume() {
        let request = SolveRequest::default();
        assert_eq!(request.resolution, 32);
        assert_eq!(request.bounds.min, Vec3::new(-5.0, -5.0, -5.0));
        assert_eq!(request.bounds.max, Vec3::new(5.0, 5.0, 5.0));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn inverted_bounds_name_the_offending_axis() {
        let bounds = Bounds::new(Vec3::new(-1.0, 2.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        match bounds.validate() {
            Err(SolveError::InvalidBounds { axis, min, max }) => {
                assert_eq!(axis, 'y');
                assert_eq!(min, 2.0);
                assert_eq!(max, 1.0);
            }
            other => panic!("expected invalid bounds, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_and_flat_bounds_are_rejected() {
        let flat = Bounds::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 0.0));
        assert!(matches!(
            flat.validate(),
            Err(SolveError::InvalidBounds { axis: 'z', .. })
        ));
        let nan = Bounds::new(Vec3::new(f64::NAN, 0.0, 0.0), Vec3::repeat(1.0));
        assert!(nan.validate().is_err());
    }

    #[test]
    fn resolution_must_be_in_range() {
        let zero = SolveRequest::new(Bounds::default(), 0);
        assert!(matches!(
            zero.validate(),
            Err(SolveError::InvalidResolution { resolution: 0, .. })
        ));
        let huge = SolveRequest::new(Bounds::default(), MAX_RESOLUTION + 1);
        assert!(huge.validate().is_err());
        let edge = SolveRequest::new(Bounds::default(), MAX_RESOLUTION);
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn solver_panics_become_errors() {
        let sources = vec![Source::charge(SourceId(1), Vec3::zeros(), 1e-9)];
        let err = invoke_solver(&mut PanickingSolver, &sources, &SolveRequest::default())
            .expect_err("panic should surface as an error");
        let message = format!("{err}");
        assert!(
            message.contains("lattice exploded"),
            "expected panic message in \"{message}\""
        );
    }
}
