//! The list page orchestrator.
//!
//! [`ListView`] composes search, paging, the table, the details panel and the org
//! unit assignment dialog. It owns only transient view state; rows, the selected
//! record and the dialog arrive through store subscriptions, and everything it
//! wants done goes out through [`ListActions`].

use std::any::Any;

use chrono::{DateTime, Utc};
use orgadmin_states::{Debouncer, DisposerScope, State, Store, Subscription, state_assign_impl};
use ustr::Ustr;

use crate::context_actions::{
    ContextAction, PRIMARY_ACTION, available_actions, is_context_action_allowed,
};
use crate::i18n::camel_case_to_underscores;
use crate::list_controller::{FilterRequest, ListActions};
use crate::model::{ListStoreValue, Model};
use crate::pager::Pager;
use crate::permissions::Permissions;
use crate::stores::{ListStores, OrgUnitDialogValue};

pub const LIST_SEARCH_DEBOUNCE_MS: i64 = 400;
pub const DETAILS_SCROLL_DEBOUNCE_MS: i64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Loading,
    Loaded,
}

/// Outcome of a context action the view cannot complete by itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Open the editor route, e.g. `/edit/user/abc` or `/clone/user/abc`.
    Navigate(String),
}

struct ListSubscriptions {
    list: Subscription<ListStoreValue>,
    details: Subscription<Option<Model>>,
    org_unit_dialog: Subscription<OrgUnitDialogValue>,
    dialog_store: Store<OrgUnitDialogValue>,
}

pub struct ListView {
    model_type: Ustr,
    phase: ListPhase,
    rows: Vec<Model>,
    pager: Pager,
    table_columns: Vec<String>,
    details: Option<Model>,
    org_unit_dialog: OrgUnitDialogValue,
    search_text: String,
    search_string: String,
    search: Debouncer<String>,
    show_all_users: bool,
    details_offset: f32,
    scroll: Debouncer<f32>,
    subscriptions: Option<ListSubscriptions>,
    scope: DisposerScope,
}

impl std::fmt::Debug for ListView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListView")
            .field("model_type", &self.model_type)
            .field("phase", &self.phase)
            .field("rows", &self.rows.len())
            .field("search_string", &self.search_string)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

impl ListView {
    pub fn new(model_type: impl AsRef<str>) -> Self {
        Self {
            model_type: Ustr::from(model_type.as_ref()),
            phase: ListPhase::Loading,
            rows: Vec::new(),
            pager: Pager::default(),
            table_columns: Vec::new(),
            details: None,
            org_unit_dialog: OrgUnitDialogValue::default(),
            search_text: String::new(),
            search_string: String::new(),
            search: Debouncer::from_millis(LIST_SEARCH_DEBOUNCE_MS).distinct(),
            show_all_users: true,
            details_offset: 0.0,
            scroll: Debouncer::from_millis(DETAILS_SCROLL_DEBOUNCE_MS),
            subscriptions: None,
            scope: DisposerScope::new(),
        }
    }

    /// Subscribes to the stores and requests the first page.
    pub fn mount(&mut self, stores: &ListStores, actions: &dyn ListActions) {
        self.unmount();

        let subscriptions = ListSubscriptions {
            list: stores.list.subscribe(),
            details: stores.details.subscribe(),
            org_unit_dialog: stores.org_unit_dialog.subscribe(),
            dialog_store: stores.org_unit_dialog.clone(),
        };
        self.scope.register(subscriptions.list.disposer());
        self.scope.register(subscriptions.details.disposer());
        self.scope.register(subscriptions.org_unit_dialog.disposer());
        self.subscriptions = Some(subscriptions);

        self.phase = ListPhase::Loading;
        self.issue_filter(actions, !self.show_all_users);
    }

    /// Releases every subscription.
    pub fn unmount(&mut self) {
        self.scope.dispose();
        self.subscriptions = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.subscriptions.is_some()
    }

    /// Switches the record type. A different type restarts loading with an empty search.
    pub fn navigate(&mut self, model_type: impl AsRef<str>, actions: &dyn ListActions) {
        let model_type = Ustr::from(model_type.as_ref());
        if model_type == self.model_type {
            return;
        }
        log::info!("list: {} -> {model_type}", self.model_type);
        self.model_type = model_type;
        self.phase = ListPhase::Loading;
        self.rows.clear();
        self.search_text.clear();
        self.search_string.clear();
        self.search.reset();
        self.issue_filter(actions, !self.show_all_users);
    }

    /// Applies every pending store push, in delivery order. Returns whether anything changed.
    pub fn poll_stores(&mut self) -> bool {
        let Some(subs) = &self.subscriptions else {
            return false;
        };
        let lists = subs.list.drain();
        let details = subs.details.drain();
        let dialogs = subs.org_unit_dialog.drain();
        let changed = !(lists.is_empty() && details.is_empty() && dialogs.is_empty());

        for value in lists {
            self.apply_list(value);
        }
        if let Some(latest) = details.into_iter().last() {
            self.details = latest;
        }
        if let Some(latest) = dialogs.into_iter().last() {
            self.org_unit_dialog = latest;
        }
        changed
    }

    /// Takes a list store value. Placeholders without a list are ignored.
    pub fn apply_list(&mut self, value: ListStoreValue) {
        let Some(list) = value.list else {
            return;
        };
        self.rows = list;
        self.pager = value.pager;
        self.table_columns = value.table_columns;
        self.phase = ListPhase::Loaded;
    }

    /// Debounced timers: fires the list search and settles the details panel offset.
    pub fn tick(&mut self, now: DateTime<Utc>, actions: &dyn ListActions) {
        if let Some(query) = self.search.poll(now) {
            self.search_string = query;
            self.phase = ListPhase::Loading;
            self.issue_filter(actions, !self.show_all_users);
        }
        if let Some(offset) = self.scroll.poll(now) {
            self.details_offset = offset;
        }
    }

    /// Earliest instant a debounced timer is due.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        match (self.search.next_deadline(), self.scroll.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn issue_filter(&self, actions: &dyn ListActions, can_manage: bool) {
        actions.filter(FilterRequest {
            model_type: self.model_type,
            search_string: self.search_string.clone(),
            can_manage,
        });
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn set_search_text(&mut self, text: impl Into<String>, now: DateTime<Utc>) {
        self.search_text = text.into();
        self.search.push(self.search_text.clone(), now);
    }

    /// The "display only users I can manage" checkbox.
    pub fn can_manage_checked(&self) -> bool {
        !self.show_all_users
    }

    pub fn set_can_manage(&mut self, checked: bool, actions: &dyn ListActions) {
        self.phase = ListPhase::Loading;
        self.issue_filter(actions, checked);
        self.show_all_users = !checked;
    }

    pub fn next_page(&mut self, actions: &dyn ListActions) {
        self.phase = ListPhase::Loading;
        actions.get_next_page();
    }

    pub fn previous_page(&mut self, actions: &dyn ListActions) {
        self.phase = ListPhase::Loading;
        actions.get_previous_page();
    }

    pub fn model_type(&self) -> Ustr {
        self.model_type
    }

    pub fn phase(&self) -> ListPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == ListPhase::Loading
    }

    pub fn rows(&self) -> &[Model] {
        &self.rows
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn table_columns(&self) -> &[String] {
        &self.table_columns
    }

    pub fn currently_shown(&self) -> String {
        self.pager.current_page_label()
    }

    /// Translation key of the page heading, e.g. `user_group_management`.
    pub fn heading_key(&self) -> String {
        format!("{}_management", camel_case_to_underscores(&self.model_type))
    }

    pub fn loading_text(&self) -> String {
        format!("Loading {} list...", self.model_type)
    }

    pub fn show_no_results(&self) -> bool {
        self.rows.is_empty() && !self.is_loading()
    }

    pub fn available_actions(&self, permissions: &impl Permissions) -> Vec<ContextAction> {
        available_actions(&self.model_type, permissions)
    }

    pub fn is_action_allowed(&self, model: &Model, action: ContextAction) -> bool {
        is_context_action_allowed(Some(model), action)
    }

    /// Runs a context action offered for `model`.
    pub fn trigger_action(
        &mut self,
        action: ContextAction,
        model: &Model,
        actions: &dyn ListActions,
    ) -> Option<ActionOutcome> {
        if !self.is_action_allowed(model, action) {
            log::warn!("{} not allowed on {}", action.name(), model.display_name());
            return None;
        }
        let id = model.id().unwrap_or_default();
        match action {
            ContextAction::Edit => Some(ActionOutcome::Navigate(format!(
                "/edit/{}/{id}",
                self.model_type
            ))),
            ContextAction::Clone => Some(ActionOutcome::Navigate(format!(
                "/clone/{}/{id}",
                self.model_type
            ))),
            ContextAction::Delete => {
                actions.delete_model(model);
                None
            }
            ContextAction::Details => {
                actions.show_details(model);
                None
            }
            ContextAction::AssignToOrgUnits => {
                actions.open_org_unit_assignment(model);
                None
            }
        }
    }

    /// Row activation runs the primary action when both gates allow it.
    pub fn trigger_primary(
        &mut self,
        model: &Model,
        permissions: &impl Permissions,
        actions: &dyn ListActions,
    ) -> Option<ActionOutcome> {
        if !self.available_actions(permissions).contains(&PRIMARY_ACTION) {
            return None;
        }
        self.trigger_action(PRIMARY_ACTION, model, actions)
    }

    pub fn details(&self) -> Option<&Model> {
        self.details.as_ref()
    }

    pub fn close_details(&mut self, actions: &dyn ListActions) {
        actions.hide_details_box();
    }

    /// Raw scroll offset of the page; the details panel follows it after a quiet period.
    pub fn on_scroll(&mut self, offset: f32, now: DateTime<Utc>) {
        self.scroll.push(offset, now);
    }

    pub fn details_offset(&self) -> f32 {
        self.details_offset
    }

    pub fn org_unit_dialog(&self) -> &OrgUnitDialogValue {
        &self.org_unit_dialog
    }

    /// Only the `open` flag of the dialog store is touched.
    pub fn close_org_unit_dialog(&mut self) {
        match &self.subscriptions {
            Some(subs) => subs.dialog_store.update(|value| value.open = false),
            None => self.org_unit_dialog.open = false,
        }
    }

    pub fn save_org_unit_assignment(&self, paths: Vec<String>, actions: &dyn ListActions) {
        match &self.org_unit_dialog.model {
            Some(model) => actions.save_org_unit_assignment(model, paths),
            None => log::warn!("org unit assignment saved without a record"),
        }
    }
}

impl State for ListView {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}
