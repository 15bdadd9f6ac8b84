//! Organisation unit picker: tree, debounced name search and bulk selection.

mod commands;
mod model;
mod picker;
mod selection;

pub use commands::{
    BulkSelectCommand, BulkTarget, LoadOrgUnitChildrenCommand, LoadOrgUnitMetadataCommand,
    SearchOrgUnitsCommand,
};
pub use model::{OrgUnit, OrgUnitGroup, OrgUnitLevel, id_from_path};
pub use picker::{ChildrenLoad, OrgUnitPickerState, SEARCH_DEBOUNCE_MS, SearchRequest};
pub use selection::{BulkMode, apply_bulk, toggle_path};
