//! Task identity and latest-only bookkeeping.
//!
//! Every dispatched command gets a [`TaskId`] made of the command's `TypeId` and a
//! per-type generation. Starting a new task of the same type cancels the previous one
//! and advances the generation, so results from superseded tasks can be recognised and
//! dropped even if the superseded future ignores its cancellation token.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

/// Unique identifier for a spawned task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    type_id: TypeId,
    generation: u64,
}

impl TaskId {
    pub fn new(type_id: TypeId, generation: u64) -> Self {
        Self {
            type_id,
            generation,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Higher values were spawned more recently.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Monotonic generation shared between the spawner and the spawned work.
///
/// Cloning shares the counter.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    inner: Arc<AtomicU64>,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation and returns it.
    pub fn advance(&self) -> u64 {
        self.inner.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn current(&self) -> u64 {
        self.inner.load(Ordering::Acquire)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

/// Handle to a spawned async task with cooperative cancellation support.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    cancel_token: CancellationToken,
}

impl TaskHandle {
    pub fn new(id: TaskId, cancel_token: CancellationToken) -> Self {
        Self { id, cancel_token }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Requests cooperative cancellation. The task stops at its next check point.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

#[derive(Debug, Default)]
struct TaskSlot {
    generation: GenerationCounter,
    running: Option<CancellationToken>,
}

/// Per-type registry of the latest task.
///
/// Detached tasks share one parent token instead of a slot, so they never
/// supersede each other but still stop on [`TaskRegistry::cancel_all`].
#[derive(Debug, Default)]
pub struct TaskRegistry {
    slots: HashMap<TypeId, TaskSlot>,
    detached: CancellationToken,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the running task of `type_id` (if any) and registers a new one.
    pub fn begin(&mut self, type_id: TypeId) -> (TaskHandle, GenerationCounter) {
        let slot = self.slots.entry(type_id).or_default();

        if let Some(previous) = slot.running.take() {
            previous.cancel();
        }

        let generation = slot.generation.advance();
        let token = CancellationToken::new();
        slot.running = Some(token.clone());

        (
            TaskHandle::new(TaskId::new(type_id, generation), token),
            slot.generation.clone(),
        )
    }

    /// Registers a task that runs alongside others of its type.
    ///
    /// The returned counter is never advanced, so generation 0 stays current.
    pub fn begin_detached(&mut self, type_id: TypeId) -> (TaskHandle, GenerationCounter) {
        let generation = GenerationCounter::new();
        let token = self.detached.child_token();
        (
            TaskHandle::new(TaskId::new(type_id, generation.current()), token),
            generation,
        )
    }

    /// Cancels every registered task, detached ones included.
    pub fn cancel_all(&mut self) {
        for slot in self.slots.values_mut() {
            if let Some(token) = slot.running.take() {
                token.cancel();
            }
            slot.generation.advance();
        }
        self.detached.cancel();
        self.detached = CancellationToken::new();
    }

    pub fn current_generation(&self, type_id: TypeId) -> u64 {
        self.slots
            .get(&type_id)
            .map(|slot| slot.generation.current())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SearchTask;
    struct LoadTask;

    #[test]
    fn task_id_equality() {
        let type_id = TypeId::of::<String>();

        let id1 = TaskId::new(type_id, 1);
        let id2 = TaskId::new(type_id, 1);
        let id3 = TaskId::new(type_id, 2);
        let id4 = TaskId::new(TypeId::of::<i32>(), 1);

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_ne!(id1, id4);
    }

    #[test]
    fn task_handle_clone_shares_token() {
        let handle1 = TaskHandle::new(
            TaskId::new(TypeId::of::<String>(), 1),
            CancellationToken::new(),
        );
        let handle2 = handle1.clone();

        handle1.cancel();

        assert!(handle1.is_cancelled());
        assert!(handle2.is_cancelled());
        assert!(handle2.cancellation_token().is_cancelled());
    }

    #[test]
    fn generation_counter_tracks_latest() {
        let counter = GenerationCounter::new();
        let first = counter.advance();
        let second = counter.advance();

        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
        assert_eq!(counter.clone().current(), second);
    }

    #[test]
    fn begin_cancels_previous_task_of_same_type() {
        let mut registry = TaskRegistry::new();

        let (first, _) = registry.begin(TypeId::of::<SearchTask>());
        let (second, counter) = registry.begin(TypeId::of::<SearchTask>());

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(second.id().generation(), 2);
        assert!(counter.is_current(second.id().generation()));
        assert!(!counter.is_current(first.id().generation()));
    }

    #[test]
    fn begin_leaves_other_types_running() {
        let mut registry = TaskRegistry::new();

        let (search, _) = registry.begin(TypeId::of::<SearchTask>());
        let (load, _) = registry.begin(TypeId::of::<LoadTask>());

        assert!(!search.is_cancelled());
        assert!(!load.is_cancelled());
        assert_eq!(registry.current_generation(TypeId::of::<LoadTask>()), 1);
    }

    #[test]
    fn detached_tasks_do_not_supersede_each_other() {
        let mut registry = TaskRegistry::new();

        let (first, first_gen) = registry.begin_detached(TypeId::of::<LoadTask>());
        let (second, second_gen) = registry.begin_detached(TypeId::of::<LoadTask>());

        assert!(!first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(first_gen.is_current(first.id().generation()));
        assert!(second_gen.is_current(second.id().generation()));

        registry.cancel_all();
        assert!(first.is_cancelled());
        assert!(second.is_cancelled());

        let (fresh, _) = registry.begin_detached(TypeId::of::<LoadTask>());
        assert!(!fresh.is_cancelled());
    }

    #[test]
    fn cancel_all_invalidates_generations() {
        let mut registry = TaskRegistry::new();
        let (search, counter) = registry.begin(TypeId::of::<SearchTask>());

        registry.cancel_all();

        assert!(search.is_cancelled());
        assert!(!counter.is_current(search.id().generation()));
    }
}
