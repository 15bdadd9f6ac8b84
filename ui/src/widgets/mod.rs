pub mod details_box;
pub mod dropdown;
pub mod list_table;
pub mod multiple_filter;
pub mod org_unit_dialog;
pub mod org_unit_form;
pub mod pagination;
pub mod snackbar;

pub use details_box::details_box;
pub use dropdown::dropdown;
pub use list_table::{RowEvent, list_table};
pub use multiple_filter::multiple_filter;
pub use org_unit_dialog::{DialogAction, OrgUnitDialogState, org_unit_dialog};
pub use org_unit_form::{OrgUnitFormState, org_unit_form};
pub use pagination::{PageClick, pagination};
pub use snackbar::{SnackbarState, snackbar};
