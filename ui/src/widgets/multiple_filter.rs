//! Compact multi select. Edits happen in a dialog and only count once applied.

use std::hash::Hash;

use egui::{ScrollArea, Ui, Window};
use orgadmin_business::{MultipleFilterState, Translate};
use ustr::Ustr;

const COLUMN_HEIGHT: f32 = 240.0;

/// Shows the summary of `state` and its edit dialog. Returns the applied selection.
pub fn multiple_filter(
    ui: &mut Ui,
    id_salt: impl Hash,
    title: &str,
    state: &mut MultipleFilterState,
    translate: &impl Translate,
) -> Option<Vec<Ustr>> {
    ui.horizontal(|ui| {
        ui.label(title);
        let summary = match state.summary(translate) {
            summary if summary.is_empty() => translate.translate("select"),
            summary => summary,
        };
        if ui.button(summary).clicked() {
            state.open_dialog();
        }
    });

    if !state.is_dialog_open() {
        return None;
    }

    let mut open = true;
    let mut toggled: Option<Ustr> = None;
    let mut applied = false;
    let mut cancelled = false;

    Window::new(title)
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

            ui.columns(2, |columns| {
                ScrollArea::vertical()
                    .id_salt("available")
                    .max_height(COLUMN_HEIGHT)
                    .show(&mut columns[0], |ui| {
                        for option in state.available() {
                            if ui.selectable_label(false, option.text.as_str()).clicked() {
                                toggled = Some(option.value);
                            }
                        }
                    });
                ScrollArea::vertical()
                    .id_salt("staged")
                    .max_height(COLUMN_HEIGHT)
                    .show(&mut columns[1], |ui| {
                        for option in state.staged_options() {
                            if ui.selectable_label(true, option.text.as_str()).clicked() {
                                toggled = Some(option.value);
                            }
                        }
                    });
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                applied = ui.button(translate.translate("apply")).clicked();
                cancelled = ui.button(translate.translate("cancel")).clicked();
            });
        });

    if let Some(value) = toggled {
        state.toggle_staged(value);
    }
    if applied {
        return Some(state.apply());
    }
    if cancelled || !open {
        state.cancel();
    }
    None
}

#[cfg(test)]
mod tests {
    use egui_kittest::Harness;
    use kittest::Queryable;
    use orgadmin_business::{SelectOption, Translations};

    use super::*;

    struct Fixture {
        state: MultipleFilterState,
        applied: Option<Vec<Ustr>>,
    }

    fn harness<'a>(selected: &[&str]) -> Harness<'a, Fixture> {
        let options = ["Alpha", "Beta", "Gamma", "Delta", "Epsilon"]
            .iter()
            .map(|name| SelectOption::new(name.to_lowercase(), *name))
            .collect();
        let selected = selected.iter().map(|s| Ustr::from(*s)).collect();
        let t = Translations::english();

        Harness::new_ui_state(
            move |ui, fixture: &mut Fixture| {
                if let Some(values) = multiple_filter(ui, "cols", "Columns", &mut fixture.state, &t)
                {
                    fixture.applied = Some(values);
                }
            },
            Fixture {
                state: MultipleFilterState::new(options, selected),
                applied: None,
            },
        )
    }

    #[test]
    fn summary_is_compacted() {
        let harness = harness(&["alpha", "beta", "gamma", "delta", "epsilon"]);
        assert!(
            harness
                .query_by_label_contains("Alpha, Beta, Gamma and 2 others")
                .is_some()
        );
    }

    #[test]
    fn staged_edits_apply_together() {
        let mut harness = harness(&[]);

        harness.get_by_label("Select").click();
        harness.run();
        harness.get_by_label("Alpha").click();
        harness.run();
        harness.get_by_label("Gamma").click();
        harness.run();
        harness.get_by_label("Apply").click();
        harness.run();

        let fixture = harness.state();
        assert_eq!(
            fixture.applied,
            Some(vec![Ustr::from("alpha"), Ustr::from("gamma")])
        );
        assert!(!fixture.state.is_dialog_open());
    }

    #[test]
    fn cancel_discards_staged_edits() {
        let mut harness = harness(&["alpha"]);

        harness.get_by_label("Alpha").click();
        harness.run();
        harness.get_by_label("Beta").click();
        harness.run();
        harness.get_by_label("Cancel").click();
        harness.run();

        let fixture = harness.state();
        assert_eq!(fixture.applied, None);
        assert_eq!(fixture.state.selected(), &[Ustr::from("alpha")]);
    }
}
