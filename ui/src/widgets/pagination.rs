use egui::{Response, Ui};
use orgadmin_business::{Pager, Translate};

/// Which page button was clicked this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageClick {
    pub previous: bool,
    pub next: bool,
}

/// `51 - 100 / 237` with previous and next buttons.
///
/// Buttons are disabled when the pager has nothing in that direction.
pub fn pagination(ui: &mut Ui, pager: &Pager, translate: &impl Translate) -> PageClick {
    let mut click = PageClick::default();
    ui.horizontal(|ui| {
        ui.label(format!("{} / {}", pager.current_page_label(), pager.total));

        let previous = page_button(ui, &translate.translate("previous"), pager.has_previous());
        let next = page_button(ui, &translate.translate("next"), pager.has_next());
        click.previous = previous.clicked();
        click.next = next.clicked();
    });
    click
}

fn page_button(ui: &mut Ui, label: &str, enabled: bool) -> Response {
    ui.add_enabled(enabled, egui::Button::new(label))
}
