//! Single choice selector that turns into a filterable dialog for long option lists.

use std::hash::Hash;

use egui::{ComboBox, ScrollArea, Ui, Window};
use orgadmin_business::{DropdownEntry, DropdownMode, DropdownState, Translate};
use ustr::Ustr;

const DIALOG_LIST_HEIGHT: f32 = 320.0;

/// Shows `state` with a `label` and returns the committed value when the user picked one.
///
/// `Some(None)` means the "no value" entry was picked.
pub fn dropdown(
    ui: &mut Ui,
    id_salt: impl Hash,
    label: &str,
    state: &mut DropdownState,
    translate: &impl Translate,
) -> Option<Option<Ustr>> {
    match state.mode() {
        DropdownMode::Select => select(ui, id_salt, label, state, translate),
        DropdownMode::Dialog => dialog(ui, id_salt, label, state, translate),
    }
}

fn select(
    ui: &mut Ui,
    id_salt: impl Hash,
    label: &str,
    state: &mut DropdownState,
    translate: &impl Translate,
) -> Option<Option<Ustr>> {
    let entries = state.select_entries(translate);
    let current = state.value();
    let mut picked = None;

    ui.horizontal(|ui| {
        ui.label(label);
        ComboBox::from_id_salt(id_salt)
            .selected_text(state.display_text())
            .show_ui(ui, |ui| {
                for DropdownEntry { value, text } in entries {
                    if ui.selectable_label(current == value, text).clicked() {
                        picked = Some(value);
                    }
                }
            });
    });

    picked.map(|value| state.pick(value))
}

fn dialog(
    ui: &mut Ui,
    id_salt: impl Hash,
    label: &str,
    state: &mut DropdownState,
    translate: &impl Translate,
) -> Option<Option<Ustr>> {
    ui.horizontal(|ui| {
        ui.label(label);
        let summary = match state.display_text() {
            "" => translate.translate("select"),
            text => text.to_owned(),
        };
        if ui.button(summary).clicked() {
            state.open_dialog();
        }
    });

    if !state.is_dialog_open() {
        return None;
    }

    let mut open = true;
    let mut picked = None;
    let mut cancelled = false;
    let entries = state.dialog_entries(translate);

    Window::new(label)
        .id(egui::Id::new(id_salt).with("dialog"))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ui.ctx(), |ui| {
            ui.add(
                egui::TextEdit::singleline(state.filter_text_mut())
                    .hint_text(translate.translate("filter")),
            );
            ui.add_space(4.0);

            ScrollArea::vertical()
                .max_height(DIALOG_LIST_HEIGHT)
                .show(ui, |ui| {
                    for DropdownEntry { value, text } in entries {
                        if ui.selectable_label(false, text).clicked() {
                            picked = Some(value);
                        }
                    }
                });

            ui.add_space(8.0);
            if ui.button(translate.translate("cancel")).clicked() {
                cancelled = true;
            }
        });

    if let Some(value) = picked {
        return Some(state.pick(value));
    }
    if cancelled || !open {
        state.cancel_dialog();
    }
    None
}
