pub mod handle;
pub mod registry;

pub use handle::{Session, SessionId};
pub use registry::{BroadcastReport, SessionGuard, SessionRegistry};
