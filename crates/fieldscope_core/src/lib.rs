pub mod bridge;
pub mod error;
pub mod metrics;
pub mod placeholder;
pub mod projector;
pub mod registry;
pub mod scene;
pub mod session;
pub mod settings;
pub mod snapshot;
pub mod source;
/// The `fieldscope_core` crate holds everything between the user's edits and the
/// renderer: it never solves a field itself, it keeps sources, snapshots and scene
/// geometry consistent around an external solver.
///
/// Key components:
/// - **Traits**: `FieldSolver` (the external solver seam) and `Clock` (time source for counters).
/// - **Registry**: copy-on-publish list of user-placed charges and current loops.
/// - **Session**: controller owning the registry, the current snapshot and the busy flag.
/// - **Projector**: field samples to bounded, keyed line segments.
/// - **Scene**: source visuals, field lines and static camera/lighting config.
pub mod traits;

pub use nalgebra::Vector3;

/// All positions and field samples are double precision 3-vectors.
pub type Vec3 = Vector3<f64>;
