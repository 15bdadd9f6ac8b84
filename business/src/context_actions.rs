//! Per-row actions and their permission gates.

use crate::i18n::camel_case_to_underscores;
use crate::model::Model;
use crate::permissions::Permissions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextAction {
    Edit,
    Clone,
    Delete,
    Details,
    AssignToOrgUnits,
}

/// Activating a row runs this action, if allowed for the row.
pub const PRIMARY_ACTION: ContextAction = ContextAction::AssignToOrgUnits;

impl ContextAction {
    pub const ALL: [ContextAction; 5] = [
        ContextAction::Edit,
        ContextAction::Clone,
        ContextAction::Delete,
        ContextAction::Details,
        ContextAction::AssignToOrgUnits,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Clone => "clone",
            Self::Delete => "delete",
            Self::Details => "details",
            Self::AssignToOrgUnits => "assignToOrgUnits",
        }
    }

    pub fn translation_key(self) -> String {
        camel_case_to_underscores(self.name())
    }

    /// Material icon name, where one differs from the default.
    pub fn icon(self) -> Option<&'static str> {
        match self {
            Self::AssignToOrgUnits => Some("business"),
            _ => None,
        }
    }
}

/// Actions offered for `model_type`, after the user-level update and delete checks.
pub fn available_actions(model_type: &str, permissions: &impl Permissions) -> Vec<ContextAction> {
    ContextAction::ALL
        .into_iter()
        .filter(|action| {
            !matches!(action, ContextAction::Edit | ContextAction::Clone)
                || permissions.can_update(model_type)
        })
        .filter(|action| *action != ContextAction::Delete || permissions.can_delete(model_type))
        .collect()
}

/// Whether `action` may run on this particular record, from its own access flags.
pub fn is_context_action_allowed(model: Option<&Model>, action: ContextAction) -> bool {
    let Some(model) = model else {
        return false;
    };
    let Some(access) = model.access() else {
        return false;
    };

    // categoryOptionCombo access flags are not reliable for anything but edit and details.
    if model.model_type.as_str() == "categoryOptionCombo" {
        return match action {
            ContextAction::Edit => access.can_write(),
            ContextAction::Details => access.can_read(),
            _ => false,
        };
    }

    if let Some(flag) = access.flag(action.name()) {
        return flag;
    }

    match action {
        ContextAction::Details => access.can_read(),
        ContextAction::AssignToOrgUnits => {
            model.model_type.as_str() == "user" && access.can_write()
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::permissions::CurrentUser;

    fn model(model_type: &str, access: serde_json::Value) -> Model {
        Model::from_value(model_type, json!({"id": "x", "access": access}))
    }

    #[test]
    fn edit_and_clone_need_update_permission() {
        let reader = CurrentUser::new("r", ["F_USER_DELETE"]);
        let actions = available_actions("user", &reader);
        assert!(!actions.contains(&ContextAction::Edit));
        assert!(!actions.contains(&ContextAction::Clone));
        assert!(actions.contains(&ContextAction::Delete));
        assert!(actions.contains(&ContextAction::Details));
    }

    #[test]
    fn delete_needs_delete_permission() {
        let editor = CurrentUser::new("e", ["F_USER_ADD"]);
        let actions = available_actions("user", &editor);
        assert!(!actions.contains(&ContextAction::Delete));
        assert!(actions.contains(&ContextAction::Edit));
    }

    #[test]
    fn no_model_or_access_allows_nothing() {
        assert!(!is_context_action_allowed(None, ContextAction::Details));
        let bare = Model::from_value("user", json!({"id": "x"}));
        assert!(!is_context_action_allowed(Some(&bare), ContextAction::Details));
    }

    #[test]
    fn access_flags_named_like_the_action_win() {
        let m = model("userGroup", json!({"read": true, "delete": false}));
        assert!(!is_context_action_allowed(Some(&m), ContextAction::Delete));
        assert!(is_context_action_allowed(Some(&m), ContextAction::Details));
        assert!(is_context_action_allowed(Some(&m), ContextAction::Edit));
    }

    #[test]
    fn flag_missing_from_access_block_does_not_deny() {
        let m = model("userGroup", json!({"read": true, "write": true}));
        assert!(is_context_action_allowed(Some(&m), ContextAction::Delete));
        assert!(is_context_action_allowed(Some(&m), ContextAction::Clone));
    }

    #[test]
    fn assign_to_org_units_only_for_writable_users() {
        let user = model("user", json!({"write": true}));
        let group = model("userGroup", json!({"write": true}));
        let read_only = model("user", json!({"read": true}));

        assert!(is_context_action_allowed(Some(&user), ContextAction::AssignToOrgUnits));
        assert!(!is_context_action_allowed(Some(&group), ContextAction::AssignToOrgUnits));
        assert!(!is_context_action_allowed(Some(&read_only), ContextAction::AssignToOrgUnits));
    }

    #[test]
    fn category_option_combo_is_special_cased() {
        let m = model("categoryOptionCombo", json!({"read": true, "write": false, "delete": true}));
        assert!(!is_context_action_allowed(Some(&m), ContextAction::Edit));
        assert!(is_context_action_allowed(Some(&m), ContextAction::Details));
        assert!(!is_context_action_allowed(Some(&m), ContextAction::Delete));
    }
}
