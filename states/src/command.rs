use std::any::{Any, TypeId};
use std::future::Future;
use std::pin::Pin;

use flume::Sender;
use tokio_util::sync::CancellationToken;

use crate::{GenerationCounter, State, TaskHandle};

pub type CommandFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

type Modify = Box<dyn FnOnce(&mut dyn Any) + Send>;

pub(crate) enum StateUpdate {
    Assign(TypeId, Box<dyn Any + Send>),
    Modify(TypeId, Modify),
}

/// Sends state updates back to the owning [`crate::StateCtx`].
///
/// Updates are queued and applied in send order on the next `StateCtx::sync()`.
#[derive(Clone)]
pub struct Updater {
    send: Sender<StateUpdate>,
}

impl Updater {
    pub(crate) fn new(send: Sender<StateUpdate>) -> Self {
        Self { send }
    }

    /// Replace the whole state.
    pub fn set<T: State>(&self, value: T) {
        let update = StateUpdate::Assign(TypeId::of::<T>(), Box::new(value));
        if self.send.send(update).is_err() {
            log::debug!("state context dropped, update discarded");
        }
    }

    /// Modify the state in place once it is synced.
    pub fn update<T: State>(&self, f: impl FnOnce(&mut T) + Send + 'static) {
        let modify: Modify = Box::new(move |any| {
            if let Some(state) = any.downcast_mut::<T>() {
                f(state);
            }
        });
        if self
            .send
            .send(StateUpdate::Modify(TypeId::of::<T>(), modify))
            .is_err()
        {
            log::debug!("state context dropped, update discarded");
        }
    }
}

/// An [`Updater`] bound to one task generation.
///
/// Once a newer task of the same command type starts, every update from this one is
/// dropped, so a late response can never overwrite newer state.
#[derive(Clone)]
pub struct LatestOnlyUpdater {
    inner: Updater,
    handle: TaskHandle,
    generation: GenerationCounter,
}

impl LatestOnlyUpdater {
    pub(crate) fn new(inner: Updater, handle: TaskHandle, generation: GenerationCounter) -> Self {
        Self {
            inner,
            handle,
            generation,
        }
    }

    pub fn is_current(&self) -> bool {
        !self.handle.is_cancelled() && self.generation.is_current(self.handle.id().generation())
    }

    pub fn set<T: State>(&self, value: T) {
        if self.is_current() {
            self.inner.set(value);
        } else {
            log::debug!(
                "dropping stale update from generation {}",
                self.handle.id().generation()
            );
        }
    }

    pub fn update<T: State>(&self, f: impl FnOnce(&mut T) + Send + 'static) {
        if self.is_current() {
            self.inner.update(f);
        } else {
            log::debug!(
                "dropping stale update from generation {}",
                self.handle.id().generation()
            );
        }
    }
}

/// Manual-only side effect. Dispatch via `StateCtx::dispatch`.
///
/// The command carries its own input; results flow back through the updater.
pub trait Command: Send + 'static {
    fn run(self, updater: LatestOnlyUpdater, cancel: CancellationToken) -> CommandFuture;
}
