//! The worker loop and the pieces it owns.

pub(crate) mod pool;
pub(crate) mod readiness;
pub(crate) mod timer;
pub(crate) mod worker;

pub use pool::OffloadPool;
pub use readiness::{Readiness, ReadinessState};
pub use timer::TimerSchedule;
pub use worker::Worker;
