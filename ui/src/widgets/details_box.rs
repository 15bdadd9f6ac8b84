//! Read-only details of the selected record, shown beside the list.

use egui::{Frame, Grid, Hyperlink, Margin, RichText, Stroke, Ui};
use orgadmin_business::details::{LOADING_DETAILS, details_content};
use orgadmin_business::{DEFAULT_DETAIL_FIELDS, DetailValue, DetailsContent, Model, Translate};

use crate::utils::colors::{COLOR_MUTED, TABLE_BORDER_COLOR};

/// Renders the panel. Returns `true` when the close button was clicked.
pub fn details_box(ui: &mut Ui, record: Option<&Model>, translate: &impl Translate) -> bool {
    let content = details_content(DEFAULT_DETAIL_FIELDS, record, translate);
    let mut close = false;

    Frame::NONE
        .stroke(Stroke::new(1.0, TABLE_BORDER_COLOR))
        .inner_margin(Margin::same(12))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.heading(translate.translate("details"));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    close = ui.button("✖").on_hover_text(translate.translate("close")).clicked();
                });
            });
            ui.separator();

            match content {
                DetailsContent::Loading => {
                    ui.label(LOADING_DETAILS);
                }
                DetailsContent::Rows(rows) => {
                    Grid::new("details_box_rows")
                        .num_columns(2)
                        .spacing([12.0, 6.0])
                        .show(ui, |ui| {
                            for row in rows {
                                ui.label(RichText::new(row.label).color(COLOR_MUTED));
                                detail_value(ui, row.value);
                                ui.end_row();
                            }
                        });
                }
            }
        });

    close
}

fn detail_value(ui: &mut Ui, value: DetailValue) {
    match value {
        DetailValue::Text(text) => {
            ui.label(text);
        }
        DetailValue::Link { label, url } => {
            ui.add(Hyperlink::from_label_and_url(label, url).open_in_new_tab(true));
        }
        DetailValue::Lines(lines) => {
            ui.vertical(|ui| {
                for line in lines {
                    ui.label(line);
                }
            });
        }
    }
}
