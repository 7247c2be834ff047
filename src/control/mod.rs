//! Drive control: persistent rover state, stuck detection, and the
//! per-tick decision procedure.
//!
//! The control state is one explicit struct threaded by exclusive
//! reference through the stuck detector and the decision procedure;
//! each of those documents exactly which fields it reads and writes.

mod decision;
mod state;
mod stuck;

pub use decision::decide;
pub use state::{DriveMode, RoverState, StuckLevel};
pub use stuck::{decadegree_bucket, StuckDetector};
