use std::any::Any;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use orgadmin_states::{Debouncer, State, state_assign_impl};

use super::model::{OrgUnit, OrgUnitGroup, OrgUnitLevel};
use super::selection::{BulkMode, apply_bulk, toggle_path};
use crate::i18n::Translate;

/// Quiet window of the name search.
pub const SEARCH_DEBOUNCE_MS: i64 = 400;

/// What the tree knows about a node's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildrenLoad {
    Loading,
    Loaded(Vec<OrgUnit>),
    Failed,
}

/// What the picker wants done after a debounced search fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRequest {
    /// Query the server for names matching this text.
    Remote(String),
    /// The field was cleared; the configured roots are back.
    Restored,
}

/// View state of the organisation unit picker.
///
/// The selection is owned by whoever embeds the picker: every change is computed
/// here but only handed out through [`OrgUnitPickerState::take_change`], and becomes
/// visible once the owner feeds it back with [`OrgUnitPickerState::set_selected`].
#[derive(Debug, Clone)]
pub struct OrgUnitPickerState {
    original_roots: Vec<OrgUnit>,
    roots: Vec<OrgUnit>,
    selected: Vec<String>,
    intersection_policy: bool,
    search_text: String,
    search: Debouncer<String>,
    levels: Vec<OrgUnitLevel>,
    groups: Vec<OrgUnitGroup>,
    children: HashMap<String, ChildrenLoad>,
    expanded: HashSet<String>,
    loading: bool,
    pending_change: Option<Vec<String>>,
    session: u64,
}

impl Default for OrgUnitPickerState {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl OrgUnitPickerState {
    pub fn new(roots: Vec<OrgUnit>, selected: Vec<String>) -> Self {
        let expanded = roots.iter().map(|root| root.path.clone()).collect();
        Self {
            original_roots: roots.clone(),
            roots,
            selected,
            intersection_policy: false,
            search_text: String::new(),
            search: Debouncer::from_millis(SEARCH_DEBOUNCE_MS).distinct(),
            levels: Vec::new(),
            groups: Vec::new(),
            children: HashMap::new(),
            expanded,
            loading: false,
            pending_change: None,
            session: 0,
        }
    }

    /// Tags the picker with the dialog session it was opened for.
    #[must_use]
    pub fn with_session(mut self, session: u64) -> Self {
        self.session = session;
        self
    }

    /// Commands started for another session leave this picker alone.
    pub fn session(&self) -> u64 {
        self.session
    }

    #[must_use]
    pub fn with_intersection_policy(mut self, intersection_policy: bool) -> Self {
        self.intersection_policy = intersection_policy;
        self
    }

    pub fn intersection_policy(&self) -> bool {
        self.intersection_policy
    }

    pub fn roots(&self) -> &[OrgUnit] {
        &self.roots
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.selected.iter().any(|p| p == path)
    }

    pub fn set_selected(&mut self, selected: Vec<String>) {
        self.selected = selected;
    }

    /// `"3 organisation units selected"`.
    pub fn selected_label(&self, translate: &impl Translate) -> String {
        format!(
            "{} {}",
            self.selected.len(),
            translate.translate("organisation_units_selected")
        )
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Records a keystroke in the search box; the query fires after the quiet window.
    pub fn set_search_text(&mut self, text: impl Into<String>, now: DateTime<Utc>) {
        self.search_text = text.into();
        self.search.push(self.search_text.clone(), now);
    }

    pub fn search_deadline(&self) -> Option<DateTime<Utc>> {
        self.search.next_deadline()
    }

    /// Fires the debounced search. Blank text restores the configured roots in place.
    pub fn poll_search(&mut self, now: DateTime<Utc>) -> Option<SearchRequest> {
        let query = self.search.poll(now)?;
        if query.trim().is_empty() {
            self.show_roots(self.original_roots.clone());
            Some(SearchRequest::Restored)
        } else {
            Some(SearchRequest::Remote(query))
        }
    }

    /// Replaces the visible roots with search results.
    ///
    /// Results landing after the field was cleared are dropped; the roots stay restored.
    pub fn apply_search_results(&mut self, units: Vec<OrgUnit>) {
        if self.search_text.trim().is_empty() {
            return;
        }
        self.show_roots(units);
    }

    fn show_roots(&mut self, roots: Vec<OrgUnit>) {
        self.expanded
            .extend(roots.iter().map(|root| root.path.clone()));
        self.roots = roots;
    }

    pub fn has_roots(&self) -> bool {
        !self.roots.is_empty()
    }

    pub fn levels(&self) -> &[OrgUnitLevel] {
        &self.levels
    }

    pub fn groups(&self) -> &[OrgUnitGroup] {
        &self.groups
    }

    pub fn set_metadata(&mut self, levels: Vec<OrgUnitLevel>, groups: Vec<OrgUnitGroup>) {
        self.levels = levels;
        self.groups = groups;
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    pub fn set_expanded(&mut self, path: &str, expanded: bool) {
        if expanded {
            self.expanded.insert(path.to_owned());
        } else {
            self.expanded.remove(path);
        }
    }

    pub fn children(&self, path: &str) -> Option<&ChildrenLoad> {
        self.children.get(path)
    }

    /// Marks `unit`'s children as loading and returns `true` if a fetch should start.
    pub fn begin_children_load(&mut self, unit: &OrgUnit) -> bool {
        if !unit.has_children || !self.is_expanded(&unit.path) {
            return false;
        }
        match self.children.get(&unit.path) {
            Some(ChildrenLoad::Loading | ChildrenLoad::Loaded(_)) => false,
            Some(ChildrenLoad::Failed) | None => {
                self.children
                    .insert(unit.path.clone(), ChildrenLoad::Loading);
                true
            }
        }
    }

    pub fn set_children(&mut self, path: &str, load: ChildrenLoad) {
        self.children.insert(path.to_owned(), load);
    }

    /// Flips one node. Emitted through the change channel only.
    pub fn toggle(&mut self, path: &str) {
        self.pending_change = Some(toggle_path(&self.selected, path));
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// A bulk fetch is in flight.
    pub fn begin_bulk(&mut self) {
        self.loading = true;
    }

    pub fn fail_bulk(&mut self) {
        self.loading = false;
    }

    /// Combines the fetched paths with the current selection and emits the result.
    pub fn finish_bulk(&mut self, fetched: &[String], mode: BulkMode) {
        self.loading = false;
        self.pending_change = Some(apply_bulk(
            &self.selected,
            fetched,
            mode,
            self.intersection_policy,
        ));
    }

    pub fn deselect_all(&mut self) {
        self.pending_change = Some(Vec::new());
    }

    /// The selection the owner should adopt, if anything changed since the last call.
    pub fn take_change(&mut self) -> Option<Vec<String>> {
        self.pending_change.take()
    }
}

impl State for OrgUnitPickerState {
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
