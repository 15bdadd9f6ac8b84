use std::any::{Any, type_name};

/// A value stored in [`crate::StateCtx`], addressed by its concrete type.
pub trait State: Any + Send {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Replace `self` with a boxed value of the same concrete type.
    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Shared `assign_box` body: downcast and overwrite, ignoring mismatched types.
pub fn state_assign_impl<T: State>(state: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(value) => *state = *value,
        Err(_) => log::warn!("assign_box: value is not a {}", type_name::<T>()),
    }
}
