//! Reactive state plumbing for the admin UI.
//!
//! - [`StateCtx`] owns UI-side states and applies async updates in delivery order.
//! - [`Command`] is the only place side effects (network IO) run; dispatching a command
//!   supersedes the previous in-flight command of the same type.
//! - [`Store`] is the push-based external store: subscribers receive the current value
//!   on subscribe and every later value, and release themselves via [`Disposer`]s.
//! - [`Debouncer`] coalesces bursts of input into the last value after a quiet window.

mod command;
mod ctx;
mod debounce;
mod disposer;
mod error;
mod state;
mod store;
mod task;
mod time;

pub use command::{Command, CommandFuture, LatestOnlyUpdater, Updater};
pub use ctx::StateCtx;
pub use debounce::Debouncer;
pub use disposer::{Disposer, DisposerScope};
pub use error::StateError;
pub use state::{State, state_assign_impl};
pub use store::{Store, Subscription};
pub use task::{GenerationCounter, TaskHandle, TaskId, TaskRegistry};
pub use time::Time;
