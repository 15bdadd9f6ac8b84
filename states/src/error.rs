use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("state not registered: {type_name}")]
    NotRegistered { type_name: &'static str },
}

impl StateError {
    pub fn not_registered<T>() -> Self {
        Self::NotRegistered {
            type_name: std::any::type_name::<T>(),
        }
    }
}
