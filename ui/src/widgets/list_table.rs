//! The record table of the list page.
//!
//! One bordered frame, shaded header and padded cells.

use egui::{Frame, InnerResponse, Label, Margin, Sense, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use orgadmin_business::context_actions::is_context_action_allowed;
use orgadmin_business::i18n::camel_case_to_underscores;
use orgadmin_business::{ContextAction, Model, Translate};

use crate::utils::colors::{HEADER_BG_COLOR, TABLE_BORDER_COLOR};

pub const ROW_HEIGHT: f32 = 30.0;
pub const HEADER_HEIGHT: f32 = 32.0;
pub const ACTIONS_WIDTH: f32 = 48.0;

/// What the user did with a row this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowEvent {
    /// The row itself was clicked.
    Primary(usize),
    Action(ContextAction, usize),
}

fn header_cell<R>(ui: &mut Ui, add_contents: impl FnOnce(&mut Ui) -> R) -> InnerResponse<R> {
    Frame::NONE
        .fill(HEADER_BG_COLOR)
        .inner_margin(Margin::symmetric(8, 8))
        .show(ui, add_contents)
}

fn data_cell<R>(ui: &mut Ui, add_contents: impl FnOnce(&mut Ui) -> R) -> InnerResponse<R> {
    Frame::NONE
        .inner_margin(Margin::symmetric(8, 6))
        .show(ui, add_contents)
}

/// Draws `rows` with one column per entry in `columns` plus a menu of `actions`.
///
/// Only actions the record's own access allows are offered on a row.
pub fn list_table(
    ui: &mut Ui,
    rows: &[Model],
    columns: &[String],
    actions: &[ContextAction],
    translate: &impl Translate,
) -> Option<RowEvent> {
    let mut event = None;

    Frame::NONE
        .stroke(Stroke::new(1.0, TABLE_BORDER_COLOR))
        .inner_margin(Margin::ZERO)
        .show(ui, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(Column::remainder().at_least(100.0), columns.len())
                .column(Column::exact(ACTIONS_WIDTH))
                .header(HEADER_HEIGHT, |mut header| {
                    for column in columns {
                        header.col(|ui| {
                            header_cell(ui, |ui| {
                                ui.strong(translate.translate(&camel_case_to_underscores(column)));
                            });
                        });
                    }
                    header.col(|_| {});
                })
                .body(|mut body| {
                    for (index, model) in rows.iter().enumerate() {
                        let allowed: Vec<ContextAction> = actions
                            .iter()
                            .copied()
                            .filter(|action| is_context_action_allowed(Some(model), *action))
                            .collect();

                        body.row(ROW_HEIGHT, |mut row| {
                            for column in columns {
                                row.col(|ui| {
                                    data_cell(ui, |ui| {
                                        let cell = ui.add(
                                            Label::new(model.column_text(column))
                                                .sense(Sense::click())
                                                .truncate(),
                                        );
                                        if cell.clicked() {
                                            event = Some(RowEvent::Primary(index));
                                        }
                                        cell.context_menu(|ui| {
                                            if let Some(action) = action_menu(ui, &allowed, translate) {
                                                event = Some(RowEvent::Action(action, index));
                                            }
                                        });
                                    });
                                });
                            }
                            row.col(|ui| {
                                ui.add_enabled_ui(!allowed.is_empty(), |ui| {
                                    ui.menu_button("⋮", |ui| {
                                        if let Some(action) = action_menu(ui, &allowed, translate) {
                                            event = Some(RowEvent::Action(action, index));
                                        }
                                    });
                                });
                            });
                        });
                    }
                });
        });

    event
}

/// Glyph for a material icon name, where the default font has one.
fn icon_glyph(icon: &str) -> Option<&'static str> {
    match icon {
        "business" => Some("🏢"),
        _ => None,
    }
}

fn action_menu(ui: &mut Ui, allowed: &[ContextAction], translate: &impl Translate) -> Option<ContextAction> {
    let mut picked = None;
    for action in allowed {
        let label = translate.translate(&action.translation_key());
        let button = match action.icon().and_then(icon_glyph) {
            Some(glyph) => egui::Button::new(label).right_text(glyph),
            None => egui::Button::new(label),
        };
        if ui.add(button).clicked() {
            picked = Some(*action);
            ui.close();
        }
    }
    picked
}
