use std::any::{TypeId, type_name};
use std::collections::BTreeMap;

use flume::{Receiver, Sender};

use crate::command::StateUpdate;
use crate::{
    Command, GenerationCounter, LatestOnlyUpdater, State, StateError, TaskHandle, TaskRegistry,
    Updater,
};

/// Owner of every UI-side state.
///
/// Lives on the UI thread. Async work talks back to it only through [`Updater`]s;
/// queued updates are applied by [`StateCtx::sync`], typically once per frame.
pub struct StateCtx {
    states: BTreeMap<TypeId, Box<dyn State>>,
    send: Sender<StateUpdate>,
    recv: Receiver<StateUpdate>,
    tasks: TaskRegistry,
}

impl Default for StateCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StateCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCtx")
            .field("states", &self.states.len())
            .field("pending_updates", &self.recv.len())
            .finish()
    }
}

impl StateCtx {
    pub fn new() -> Self {
        let (send, recv) = flume::unbounded();
        Self {
            states: BTreeMap::new(),
            send,
            recv,
            tasks: TaskRegistry::new(),
        }
    }

    /// Registers (or replaces) a state.
    pub fn add_state<T: State>(&mut self, state: T) {
        self.states.insert(TypeId::of::<T>(), Box::new(state));
    }

    pub fn has_state<T: State>(&self) -> bool {
        self.states.contains_key(&TypeId::of::<T>())
    }

    pub fn try_state<T: State>(&self) -> Result<&T, StateError> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|state| state.as_any().downcast_ref::<T>())
            .ok_or_else(StateError::not_registered::<T>)
    }

    pub fn try_state_mut<T: State>(&mut self) -> Result<&mut T, StateError> {
        self.states
            .get_mut(&TypeId::of::<T>())
            .and_then(|state| state.as_any_mut().downcast_mut::<T>())
            .ok_or_else(StateError::not_registered::<T>)
    }

    /// # Panics
    /// Panics if `T` was never registered with [`StateCtx::add_state`].
    pub fn state<T: State>(&self) -> &T {
        match self.try_state::<T>() {
            Ok(state) => state,
            Err(err) => panic!("{err}"),
        }
    }

    /// # Panics
    /// Panics if `T` was never registered with [`StateCtx::add_state`].
    pub fn state_mut<T: State>(&mut self) -> &mut T {
        match self.try_state_mut::<T>() {
            Ok(state) => state,
            Err(err) => panic!("{err}"),
        }
    }

    /// Modify a registered state in place. Unregistered states are logged and skipped.
    pub fn update<T: State>(&mut self, f: impl FnOnce(&mut T)) {
        match self.try_state_mut::<T>() {
            Ok(state) => f(state),
            Err(err) => log::warn!("update skipped: {err}"),
        }
    }

    pub fn updater(&self) -> Updater {
        Updater::new(self.send.clone())
    }

    /// Applies queued updates in the order they were sent.
    ///
    /// Returns the number of updates applied.
    pub fn sync(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.recv.try_recv() {
            match update {
                StateUpdate::Assign(id, value) => match self.states.get_mut(&id) {
                    Some(state) => {
                        state.assign_box(value);
                        applied += 1;
                    }
                    None => log::warn!("sync: dropping update for unregistered state {id:?}"),
                },
                StateUpdate::Modify(id, modify) => match self.states.get_mut(&id) {
                    Some(state) => {
                        modify(state.as_any_mut());
                        applied += 1;
                    }
                    None => log::warn!("sync: dropping update for unregistered state {id:?}"),
                },
            }
        }
        applied
    }

    /// Spawns `command` on the ambient tokio runtime.
    ///
    /// A previous in-flight command of the same type is cancelled and its updates are
    /// discarded from now on. Without a runtime the command is logged and dropped.
    pub fn dispatch<C: Command>(&mut self, command: C) -> TaskHandle {
        let (handle, generation) = self.tasks.begin(TypeId::of::<C>());
        self.run_command(command, handle, generation)
    }

    /// Spawns `command` without superseding other in-flight commands of its type.
    ///
    /// Used for independent work such as loading the children of different tree nodes.
    pub fn spawn<C: Command>(&mut self, command: C) -> TaskHandle {
        let (handle, generation) = self.tasks.begin_detached(TypeId::of::<C>());
        self.run_command(command, handle, generation)
    }

    fn run_command<C: Command>(
        &self,
        command: C,
        handle: TaskHandle,
        generation: GenerationCounter,
    ) -> TaskHandle {
        let updater = LatestOnlyUpdater::new(self.updater(), handle.clone(), generation);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::error!(
                "dispatch {}: no tokio runtime, command dropped",
                type_name::<C>()
            );
            handle.cancel();
            return handle;
        };

        let cancel = handle.cancellation_token();
        let future = command.run(updater, cancel.clone());
        runtime.spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = future => {}
            }
        });

        handle
    }

    /// Cancels every in-flight command. Used on teardown.
    pub fn cancel_all(&mut self) {
        self.tasks.cancel_all();
    }
}
