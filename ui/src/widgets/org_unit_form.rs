//! Organisation unit picker: name search, bulk selection affordances and a lazy tree.

use egui::{RichText, ScrollArea, TextEdit, Ui};
use orgadmin_business::org_unit::{
    BulkMode, BulkSelectCommand, BulkTarget, ChildrenLoad, LoadOrgUnitChildrenCommand,
    OrgUnitPickerState, SearchOrgUnitsCommand, SearchRequest,
};
use orgadmin_business::{DropdownState, OrgUnit, SelectOption, SharedModelApi, Translate};
use orgadmin_states::{StateCtx, TaskHandle, Time};

use super::dropdown::dropdown;
use crate::utils::colors::COLOR_RED;

const TREE_HEIGHT: f32 = 360.0;
const INDENT: f32 = 18.0;

/// Selectors of the bulk affordances, plus the commands the form started.
/// Options follow the picker's levels and groups.
#[derive(Debug, Clone)]
pub struct OrgUnitFormState {
    level: DropdownState,
    group: DropdownState,
    dropdown_limit: usize,
    tasks: Vec<TaskHandle>,
}

impl OrgUnitFormState {
    pub fn new(dropdown_limit: usize) -> Self {
        Self {
            level: DropdownState::new(Vec::new()).with_limit(dropdown_limit),
            group: DropdownState::new(Vec::new()).with_limit(dropdown_limit),
            dropdown_limit,
            tasks: Vec::new(),
        }
    }

    /// Cancels in-flight commands and forgets picked level and group, e.g. when the
    /// dialog opens for another record.
    pub fn reset(&mut self) {
        self.cancel_tasks();
        *self = Self::new(self.dropdown_limit);
    }

    /// Cancels every search, child load and bulk fetch this form started.
    pub fn cancel_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            task.cancel();
        }
    }

    /// Commands that may still deliver results.
    pub fn in_flight(&self) -> &[TaskHandle] {
        &self.tasks
    }

    pub(super) fn track(&mut self, task: TaskHandle) {
        self.tasks.retain(|task| !task.is_cancelled());
        self.tasks.push(task);
    }

    fn sync_options(&mut self, picker: &OrgUnitPickerState) {
        if self.level.options().len() != picker.levels().len() {
            self.level.set_options(
                picker
                    .levels()
                    .iter()
                    .map(|level| SelectOption::new(level.level.to_string(), &level.display_name))
                    .collect(),
            );
        }
        if self.group.options().len() != picker.groups().len() {
            self.group.set_options(
                picker
                    .groups()
                    .iter()
                    .map(|group| SelectOption::new(group.id.as_str(), &group.display_name))
                    .collect(),
            );
        }
    }

    fn level_target(&self) -> Option<BulkTarget> {
        self.level
            .value()
            .and_then(|level| level.parse().ok())
            .map(BulkTarget::Level)
    }

    fn group_target(&self) -> Option<BulkTarget> {
        self.group.value().map(BulkTarget::Group)
    }
}

enum FormEvent {
    Toggle(String),
    Expand(OrgUnit, bool),
    LoadChildren(OrgUnit),
    Bulk(BulkTarget, BulkMode),
    DeselectAll,
}

/// Renders the picker held in `ctx` and returns the selection its owner should adopt.
///
/// Debounced searches, child loads and bulk fetches are started from here.
pub fn org_unit_form(
    ui: &mut Ui,
    ctx: &mut StateCtx,
    form: &mut OrgUnitFormState,
    api: &SharedModelApi,
    translate: &impl Translate,
) -> Option<Vec<String>> {
    let now = ctx.state::<Time>().now();
    let session = ctx.state::<OrgUnitPickerState>().session();

    let search = {
        let picker = ctx.state_mut::<OrgUnitPickerState>();
        ui.label(RichText::new(picker.selected_label(translate)).strong());

        let mut text = picker.search_text().to_owned();
        let edit = ui.add(
            TextEdit::singleline(&mut text)
                .hint_text(translate.translate("filter_organisation_units_by_name")),
        );
        if edit.changed() {
            picker.set_search_text(text, now);
        }
        picker.poll_search(now)
    };
    if let Some(SearchRequest::Remote(query)) = search {
        form.track(ctx.dispatch(SearchOrgUnitsCommand {
            api: api.clone(),
            session,
            query,
        }));
    }

    let mut events = Vec::new();
    {
        let picker = ctx.state::<OrgUnitPickerState>();
        form.sync_options(picker);
        ui.add_space(4.0);
        bulk_controls(ui, form, picker.is_loading(), translate, &mut events);
        ui.separator();

        if picker.has_roots() {
            ScrollArea::vertical()
                .max_height(TREE_HEIGHT)
                .show(ui, |ui| {
                    for root in picker.roots() {
                        tree_node(ui, picker, root, 0, &mut events);
                    }
                });
        } else {
            ui.label(translate.translate("no_roots_found"));
        }
    }

    for event in events {
        if let Some(task) = handle_event(ctx, api, session, event) {
            form.track(task);
        }
    }

    ctx.state_mut::<OrgUnitPickerState>().take_change()
}

fn bulk_controls(
    ui: &mut Ui,
    form: &mut OrgUnitFormState,
    loading: bool,
    translate: &impl Translate,
    events: &mut Vec<FormEvent>,
) {
    let level_label = translate.translate("select_by_level");
    dropdown(ui, "org_unit_level", &level_label, &mut form.level, translate);
    bulk_buttons(ui, form.level_target(), loading, translate, events);

    let group_label = translate.translate("select_by_group");
    dropdown(ui, "org_unit_group", &group_label, &mut form.group, translate);
    bulk_buttons(ui, form.group_target(), loading, translate, events);

    ui.horizontal(|ui| {
        if ui
            .add_enabled(!loading, egui::Button::new(translate.translate("select_all")))
            .clicked()
        {
            events.push(FormEvent::Bulk(BulkTarget::All, BulkMode::Select));
        }
        if ui
            .add_enabled(!loading, egui::Button::new(translate.translate("deselect_all")))
            .clicked()
        {
            events.push(FormEvent::DeselectAll);
        }
        if loading {
            ui.spinner();
        }
    });
}

fn bulk_buttons(
    ui: &mut Ui,
    target: Option<BulkTarget>,
    loading: bool,
    translate: &impl Translate,
    events: &mut Vec<FormEvent>,
) {
    let enabled = target.is_some() && !loading;
    ui.horizontal(|ui| {
        for (key, mode) in [("select", BulkMode::Select), ("deselect", BulkMode::Deselect)] {
            let clicked = ui
                .add_enabled(enabled, egui::Button::new(translate.translate(key)))
                .clicked();
            if clicked && let Some(target) = target.clone() {
                events.push(FormEvent::Bulk(target, mode));
            }
        }
    });
}

fn tree_node(
    ui: &mut Ui,
    picker: &OrgUnitPickerState,
    unit: &OrgUnit,
    depth: u16,
    events: &mut Vec<FormEvent>,
) {
    let expanded = picker.is_expanded(&unit.path);

    ui.horizontal(|ui| {
        ui.add_space(f32::from(depth) * INDENT);
        if unit.has_children {
            let arrow = if expanded { "▼" } else { "▶" };
            if ui.small_button(arrow).clicked() {
                events.push(FormEvent::Expand(unit.clone(), !expanded));
            }
        } else {
            ui.add_space(INDENT);
        }

        let mut checked = picker.is_selected(&unit.path);
        if ui.checkbox(&mut checked, unit.display_name.as_str()).changed() {
            events.push(FormEvent::Toggle(unit.path.clone()));
        }
    });

    if !expanded || !unit.has_children {
        return;
    }

    match picker.children(&unit.path) {
        None => events.push(FormEvent::LoadChildren(unit.clone())),
        Some(ChildrenLoad::Loading) => {
            ui.horizontal(|ui| {
                ui.add_space(f32::from(depth + 1) * INDENT);
                ui.weak("…");
            });
        }
        Some(ChildrenLoad::Failed) => {
            ui.horizontal(|ui| {
                ui.add_space(f32::from(depth + 1) * INDENT);
                ui.colored_label(COLOR_RED, "⚠");
            });
        }
        Some(ChildrenLoad::Loaded(children)) => {
            for child in children {
                tree_node(ui, picker, child, depth + 1, events);
            }
        }
    }
}

fn handle_event(
    ctx: &mut StateCtx,
    api: &SharedModelApi,
    session: u64,
    event: FormEvent,
) -> Option<TaskHandle> {
    match event {
        FormEvent::Toggle(path) => {
            ctx.state_mut::<OrgUnitPickerState>().toggle(&path);
            None
        }
        FormEvent::Expand(unit, expanded) => {
            ctx.state_mut::<OrgUnitPickerState>()
                .set_expanded(&unit.path, expanded);
            if expanded {
                load_children(ctx, api, session, &unit)
            } else {
                None
            }
        }
        FormEvent::LoadChildren(unit) => load_children(ctx, api, session, &unit),
        FormEvent::Bulk(target, mode) => {
            ctx.state_mut::<OrgUnitPickerState>().begin_bulk();
            Some(ctx.dispatch(BulkSelectCommand {
                api: api.clone(),
                session,
                target,
                mode,
            }))
        }
        FormEvent::DeselectAll => {
            ctx.state_mut::<OrgUnitPickerState>().deselect_all();
            None
        }
    }
}

fn load_children(
    ctx: &mut StateCtx,
    api: &SharedModelApi,
    session: u64,
    unit: &OrgUnit,
) -> Option<TaskHandle> {
    if !ctx
        .state_mut::<OrgUnitPickerState>()
        .begin_children_load(unit)
    {
        return None;
    }
    Some(ctx.spawn(LoadOrgUnitChildrenCommand {
        api: api.clone(),
        session,
        id: unit.id,
        path: unit.path.clone(),
    }))
}
