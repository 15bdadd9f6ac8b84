//! Pages of the application. There is one: the record list.

mod list_page;

pub use list_page::{ListPageState, MODEL_TYPES, list_page};
