//! Refresh primitives shared by the tab controllers.
//!
//! - [`Epoch`]: generation counter used to discard stale responses
//! - [`RefreshTimer`]: cancellable fixed-interval ticker
//! - [`Debouncer`]: trailing-edge delay with cancel
//!
//! Timers and debouncers never call back into controllers directly. They post
//! messages onto the app channel, and each message carries a generation so
//! anything queued before a stop or cancel can be recognised and dropped.

mod debounce;
mod epoch;
mod timer;

pub use debounce::Debouncer;
pub use epoch::Epoch;
pub use timer::RefreshTimer;
