//! The list page: heading, search, filters, table, pagination, details and the
//! org unit assignment dialog, all driven by the [`ListView`] in the state context.

use egui::{ScrollArea, SidePanel, TextEdit, Ui};
use orgadmin_business::i18n::camel_case_to_underscores;
use orgadmin_business::{
    ActionOutcome, CurrentUser, DropdownState, ListController, ListView, MultipleFilterState,
    SelectOption, SharedModelApi, Translate, Translations,
};
use orgadmin_states::Time;
use ustr::Ustr;

use crate::state::State;
use crate::widgets::{
    DialogAction, OrgUnitDialogState, RowEvent, SnackbarState, details_box, dropdown, list_table,
    multiple_filter, org_unit_dialog, pagination, snackbar,
};

/// Record types the selector offers.
pub const MODEL_TYPES: &[&str] = &["user", "userGroup", "userRole"];

const DETAILS_WIDTH: f32 = 360.0;

/// Widget state of the list page that the view model does not own.
#[derive(Debug)]
pub struct ListPageState {
    pub model_types: DropdownState,
    /// Which of the list's table columns are shown.
    pub columns: MultipleFilterState,
    pub snackbar: SnackbarState,
    pub org_unit_dialog: OrgUnitDialogState,
    /// Editor route requested by the last edit or clone action.
    pub last_route: Option<String>,
    scroll_offset: f32,
}

impl ListPageState {
    pub fn new(translations: &Translations, model_type: &str, dropdown_limit: usize) -> Self {
        let options = MODEL_TYPES
            .iter()
            .map(|model_type| SelectOption::new(model_type, camel_case_to_underscores(model_type)))
            .collect();
        Self {
            model_types: DropdownState::new(options)
                .with_limit(dropdown_limit)
                .required(true)
                .with_value(Some(Ustr::from(model_type)))
                .translate_options(translations),
            columns: MultipleFilterState::default(),
            snackbar: SnackbarState::default(),
            org_unit_dialog: OrgUnitDialogState::new(dropdown_limit),
            last_route: None,
            scroll_offset: 0.0,
        }
    }

    /// Follows the list's table columns, showing all of them whenever the set changes.
    fn sync_columns(&mut self, table_columns: &[String], translate: &impl Translate) {
        let unchanged = self.columns.options().len() == table_columns.len()
            && self
                .columns
                .options()
                .iter()
                .zip(table_columns)
                .all(|(option, column)| option.value.as_str() == column);
        if unchanged {
            return;
        }

        self.columns.set_options(
            table_columns
                .iter()
                .map(|column| {
                    SelectOption::new(column, translate.translate(&camel_case_to_underscores(column)))
                })
                .collect(),
        );
        self.columns
            .set_selected(table_columns.iter().map(|c| Ustr::from(c.as_str())).collect());
    }

    fn visible_columns(&self, table_columns: &[String]) -> Vec<String> {
        table_columns
            .iter()
            .filter(|column| {
                self.columns
                    .selected()
                    .iter()
                    .any(|selected| selected.as_str() == column.as_str())
            })
            .cloned()
            .collect()
    }
}

/// Mounts the list view on first use and hooks the snackbar to the snack store.
pub fn ensure_mounted(state: &mut State) {
    let view = state.ctx.state_mut::<ListView>();
    if view.is_mounted() {
        return;
    }
    view.mount(&state.stores, &state.controller);
    state.page.snackbar.subscribe(&state.stores.snack);
}

pub fn list_page(ui: &mut Ui, state: &mut State) {
    ensure_mounted(state);
    let now = state.ctx.state::<Time>().now();
    let State {
        ctx,
        api,
        controller,
        translations,
        page,
        ..
    } = state;
    let (api, controller, translations): (&SharedModelApi, &ListController, &Translations) =
        (api, controller, translations);

    let user = ctx.state::<CurrentUser>().clone();
    let available = ctx.state::<ListView>().available_actions(&user);

    let view = ctx.state_mut::<ListView>();
    view.poll_stores();
    view.tick(now, controller);
    page.sync_columns(view.table_columns(), translations);

    ui.heading(translations.translate(&view.heading_key()));
    ui.add_space(4.0);

    ui.horizontal_wrapped(|ui| {
        let label = translations.translate("model_type");
        if let Some(Some(model_type)) =
            dropdown(ui, "model_type", &label, &mut page.model_types, translations)
        {
            view.navigate(model_type, controller);
        }

        let mut search = view.search_text().to_owned();
        let edit = ui.add(
            TextEdit::singleline(&mut search)
                .hint_text(translations.translate("search"))
                .desired_width(200.0),
        );
        if edit.changed() {
            view.set_search_text(search, now);
        }

        if view.model_type().as_str() == "user" {
            let mut can_manage = view.can_manage_checked();
            let label = translations.translate("display_only_users_can_manage");
            if ui.checkbox(&mut can_manage, label).changed() {
                view.set_can_manage(can_manage, controller);
            }
        }

        let label = translations.translate("columns");
        multiple_filter(ui, "columns", &label, &mut page.columns, translations);
    });
    ui.separator();

    let click = pagination(ui, view.pager(), translations);
    if click.next {
        view.next_page(controller);
    } else if click.previous {
        view.previous_page(controller);
    }

    if view.details().is_some() {
        let mut close = false;
        SidePanel::right("details_panel")
            .resizable(false)
            .exact_width(DETAILS_WIDTH)
            .show_inside(ui, |ui| {
                ui.add_space(view.details_offset());
                close = details_box(ui, view.details(), translations);
            });
        if close {
            view.close_details(controller);
        }
    }

    let mut row_event = None;
    let scroll = ScrollArea::vertical().show(ui, |ui| {
        if view.is_loading() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(view.loading_text());
            });
        } else if view.show_no_results() {
            ui.label(translations.translate("no_results_found"));
        } else {
            let columns = page.visible_columns(view.table_columns());
            row_event = list_table(ui, view.rows(), &columns, &available, translations);
        }
    });
    if (scroll.state.offset.y - page.scroll_offset).abs() > f32::EPSILON {
        page.scroll_offset = scroll.state.offset.y;
        view.on_scroll(page.scroll_offset, now);
    }

    if let Some(event) = row_event {
        let outcome = match event {
            RowEvent::Primary(index) => view
                .rows()
                .get(index)
                .cloned()
                .and_then(|model| view.trigger_primary(&model, &user, controller)),
            RowEvent::Action(action, index) => view
                .rows()
                .get(index)
                .cloned()
                .and_then(|model| view.trigger_action(action, &model, controller)),
        };
        if let Some(ActionOutcome::Navigate(route)) = outcome {
            log::info!("open {route}");
            page.last_route = Some(route);
        }
    }

    if let Some(route) = &page.last_route {
        ui.label(format!("→ {route}"));
    }

    let dialog_value = view.org_unit_dialog().clone();
    match org_unit_dialog(ui, ctx, &mut page.org_unit_dialog, &dialog_value, api, translations) {
        Some(DialogAction::Save(paths)) => {
            ctx.state::<ListView>()
                .save_org_unit_assignment(paths, controller);
        }
        Some(DialogAction::Close) => ctx.state_mut::<ListView>().close_org_unit_dialog(),
        None => {}
    }

    snackbar(ui, &mut page.snackbar, now, translations);
}
