//! View-model layer of the organisation admin app.
//!
//! Everything here is UI-toolkit agnostic: widgets in `orgadmin-ui` render these
//! states and forward user input back into them.

pub mod api;
pub mod config;
pub mod context_actions;
pub mod details;
pub mod dropdown;
pub mod error;
pub mod http;
pub mod i18n;
pub mod list;
pub mod list_controller;
pub mod model;
pub mod multiple_filter;
pub mod options;
pub mod org_unit;
pub mod pager;
pub mod permissions;
pub mod stores;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use api::{Dhis2Api, ListQuery, ModelApi, ModelPage, SharedModelApi};
pub use config::BusinessConfig;
pub use context_actions::{ContextAction, PRIMARY_ACTION};
pub use details::{DEFAULT_DETAIL_FIELDS, DetailRow, DetailValue, DetailsContent};
pub use dropdown::{DropdownEntry, DropdownMode, DropdownState};
pub use error::{ApiError, ApiResult};
pub use i18n::{Translate, Translations};
pub use list::{ActionOutcome, ListPhase, ListView};
pub use list_controller::{FilterRequest, ListActions, ListController};
pub use model::{Access, ListStoreValue, Model};
pub use multiple_filter::MultipleFilterState;
pub use options::SelectOption;
pub use org_unit::{OrgUnit, OrgUnitPickerState};
pub use pager::Pager;
pub use permissions::{CurrentUser, LoadCurrentUserCommand, Permissions};
pub use stores::{ListStores, OrgUnitDialogValue, Snack};
