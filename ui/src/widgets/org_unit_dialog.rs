//! Modal for assigning a record to organisation units.

use egui::{Ui, Window};
use orgadmin_business::org_unit::{LoadOrgUnitMetadataCommand, OrgUnitPickerState};
use orgadmin_business::{OrgUnitDialogValue, SharedModelApi, Translate};
use orgadmin_states::StateCtx;

use super::org_unit_form::{OrgUnitFormState, org_unit_form};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogAction {
    Save(Vec<String>),
    Close,
}

/// Working copy of the selection while the dialog is up.
///
/// Every opening starts a new picker session; results of commands started in an
/// earlier session never reach the new picker.
#[derive(Debug, Clone)]
pub struct OrgUnitDialogState {
    showing: bool,
    session: u64,
    selected: Vec<String>,
    form: OrgUnitFormState,
}

impl OrgUnitDialogState {
    pub fn new(dropdown_limit: usize) -> Self {
        Self {
            showing: false,
            session: 0,
            selected: Vec::new(),
            form: OrgUnitFormState::new(dropdown_limit),
        }
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Seeds a fresh picker from the store value and starts loading levels and groups.
    fn open(&mut self, ctx: &mut StateCtx, value: &OrgUnitDialogValue, api: &SharedModelApi) {
        self.showing = true;
        self.session += 1;
        self.selected = value.selected.clone();
        self.form.reset();
        ctx.add_state(
            OrgUnitPickerState::new(value.roots.clone(), value.selected.clone())
                .with_session(self.session),
        );
        self.form.track(ctx.dispatch(LoadOrgUnitMetadataCommand {
            api: api.clone(),
            session: self.session,
        }));
    }

    fn hide(&mut self) {
        self.showing = false;
        self.form.cancel_tasks();
    }
}

pub fn org_unit_dialog(
    ui: &mut Ui,
    ctx: &mut StateCtx,
    dialog: &mut OrgUnitDialogState,
    value: &OrgUnitDialogValue,
    api: &SharedModelApi,
    translate: &impl Translate,
) -> Option<DialogAction> {
    if !value.open {
        if dialog.showing {
            dialog.hide();
        }
        return None;
    }
    if !dialog.showing {
        dialog.open(ctx, value, api);
    }

    let title = match &value.model {
        Some(model) => format!(
            "{}: {}",
            translate.translate("assign_to_org_units"),
            model.display_name()
        ),
        None => translate.translate("assign_to_org_units"),
    };

    let mut open = true;
    let mut action = None;

    Window::new(title)
        .id(egui::Id::new("org_unit_dialog"))
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .default_width(480.0)
        .show(ui.ctx(), |ui| {
            if let Some(change) = org_unit_form(ui, ctx, &mut dialog.form, api, translate) {
                ctx.state_mut::<OrgUnitPickerState>()
                    .set_selected(change.clone());
                dialog.selected = change;
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button(translate.translate("save")).clicked() {
                    action = Some(DialogAction::Save(dialog.selected.clone()));
                }
                if ui.button(translate.translate("close")).clicked() {
                    action = Some(DialogAction::Close);
                }
            });
        });

    if !open || action == Some(DialogAction::Close) {
        dialog.form.cancel_tasks();
        return Some(DialogAction::Close);
    }
    action
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use egui_kittest::Harness;
    use kittest::Queryable;
    use orgadmin_business::test_utils::{FakeModelApi, user};
    use orgadmin_business::{OrgUnit, Translations};
    use orgadmin_states::Time;

    use super::*;

    struct Fixture {
        ctx: StateCtx,
        dialog: OrgUnitDialogState,
        value: OrgUnitDialogValue,
        api: SharedModelApi,
        actions: Vec<DialogAction>,
    }

    fn harness<'a>(value: OrgUnitDialogValue) -> Harness<'a, Fixture> {
        harness_with(value, FakeModelApi::default())
    }

    fn harness_with<'a>(value: OrgUnitDialogValue, api: FakeModelApi) -> Harness<'a, Fixture> {
        let mut ctx = StateCtx::new();
        ctx.add_state(Time::default());
        ctx.add_state(OrgUnitPickerState::default());
        let t = Translations::english();

        Harness::new_ui_state(
            move |ui, f: &mut Fixture| {
                f.ctx.sync();
                if let Some(action) =
                    org_unit_dialog(ui, &mut f.ctx, &mut f.dialog, &f.value, &f.api, &t)
                {
                    f.actions.push(action);
                }
            },
            Fixture {
                ctx,
                dialog: OrgUnitDialogState::new(50),
                value,
                api: Arc::new(api),
                actions: Vec::new(),
            },
        )
    }

    fn open_value() -> OrgUnitDialogValue {
        OrgUnitDialogValue {
            model: Some(user("u1")),
            roots: vec![
                OrgUnit::new("a", "Bo", "/a", false),
                OrgUnit::new("b", "Kenema", "/b", false),
            ],
            selected: vec!["/a".to_owned()],
            open: true,
        }
    }

    #[test]
    fn closed_value_renders_nothing() {
        let harness = harness(OrgUnitDialogValue::default());
        assert!(harness.query_by_label_contains("Assign to organisation units").is_none());
    }

    #[test]
    fn opening_seeds_picker_from_store_value() {
        let harness = harness(open_value());

        let picker = harness.state().ctx.state::<OrgUnitPickerState>();
        assert_eq!(picker.selected(), ["/a".to_owned()]);
        assert_eq!(picker.roots().len(), 2);
        assert!(
            harness
                .query_by_label_contains("1 organisation units selected")
                .is_some()
        );
    }

    #[test]
    fn save_hands_out_edited_selection() {
        let mut harness = harness(open_value());

        harness.get_by_label("Kenema").click();
        harness.run();
        harness.get_by_label("Save").click();
        harness.run();

        assert_eq!(
            harness.state().actions,
            vec![DialogAction::Save(vec!["/a".to_owned(), "/b".to_owned()])]
        );
    }

    #[tokio::test]
    async fn reopening_for_another_record_drops_earlier_bulk_selection() {
        let api = FakeModelApi::default().with_group_paths(vec!["/zz".to_owned()]);
        let mut harness = harness_with(open_value(), api);
        let first_session = harness.state().dialog.session();

        harness.get_by_label("Select all").click();
        harness.step();
        assert!(!harness.state().dialog.form.in_flight().is_empty());

        harness.state_mut().value.open = false;
        harness.step();
        harness.state_mut().value = OrgUnitDialogValue {
            model: Some(user("u2")),
            roots: vec![OrgUnit::new("b", "Kenema", "/b", false)],
            selected: vec!["/b".to_owned()],
            open: true,
        };
        harness.step();

        for _ in 0..10 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            harness.step();
        }

        let fixture = harness.state();
        assert!(fixture.dialog.session() > first_session);
        assert_eq!(fixture.dialog.selected(), ["/b".to_owned()]);
        assert_eq!(
            fixture.ctx.state::<OrgUnitPickerState>().selected(),
            ["/b".to_owned()]
        );
        assert!(fixture.actions.is_empty());
    }

    #[test]
    fn close_button_reports_close() {
        let mut harness = harness(open_value());

        harness.get_by_label("Close").click();
        harness.run();

        assert_eq!(harness.state().actions, vec![DialogAction::Close]);
    }
}
