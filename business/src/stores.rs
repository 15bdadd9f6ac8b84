//! External push stores shared by the list controller and the list view.

use orgadmin_states::Store;

use crate::model::{ListStoreValue, Model};
use crate::org_unit::OrgUnit;

/// Everything the org unit assignment dialog needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrgUnitDialogValue {
    pub model: Option<Model>,
    pub roots: Vec<OrgUnit>,
    /// Paths assigned when the dialog opened.
    pub selected: Vec<String>,
    pub open: bool,
}

/// A toast message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snack {
    pub message: String,
    pub action: Option<String>,
    /// `message` is a translation key.
    pub translate: bool,
}

impl Snack {
    pub fn translated(key: impl Into<String>) -> Self {
        Self {
            message: key.into(),
            action: None,
            translate: true,
        }
    }

    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListStores {
    pub list: Store<ListStoreValue>,
    /// Currently selected record, `None` when the details panel is hidden.
    pub details: Store<Option<Model>>,
    pub org_unit_dialog: Store<OrgUnitDialogValue>,
    pub snack: Store<Option<Snack>>,
}

impl ListStores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips only the `open` flag; everything else in the dialog value is kept.
    pub fn close_org_unit_dialog(&self) {
        self.org_unit_dialog.update(|value| value.open = false);
    }

    pub fn show_snack(&self, snack: Snack) {
        self.snack.set_state(Some(snack));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn closing_dialog_keeps_model() {
        let stores = ListStores::new();
        let model = Model::from_value("user", json!({"id": "u1"}));
        stores.org_unit_dialog.set_state(OrgUnitDialogValue {
            model: Some(model.clone()),
            roots: Vec::new(),
            selected: vec!["/a".into()],
            open: true,
        });
        let sub = stores.org_unit_dialog.subscribe();

        stores.close_org_unit_dialog();

        let pushed = sub.drain();
        assert_eq!(pushed.len(), 2);
        assert!(!pushed[1].open);
        assert_eq!(pushed[1].model, Some(model));
        assert_eq!(pushed[1].selected, vec!["/a".to_owned()]);
    }
}
