//! Transient notifications pushed through the snack store.

use chrono::{DateTime, TimeDelta, Utc};
use egui::{Align2, Area, Frame, Margin, RichText, Ui};
use orgadmin_business::{Snack, Translate};
use orgadmin_states::{Store, Subscription};

use crate::utils::colors::SNACK_BG_COLOR;

/// How long a snack stays up without interaction.
pub const SNACK_DURATION_MS: i64 = 4000;

#[derive(Default)]
pub struct SnackbarState {
    subscription: Option<Subscription<Option<Snack>>>,
    current: Option<(Snack, DateTime<Utc>)>,
}

impl std::fmt::Debug for SnackbarState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnackbarState")
            .field("subscribed", &self.subscription.is_some())
            .field("current", &self.current)
            .finish()
    }
}

impl SnackbarState {
    pub fn subscribe(&mut self, store: &Store<Option<Snack>>) {
        self.subscription = Some(store.subscribe());
    }

    /// Picks up the latest push. A `None` push hides the current snack.
    pub fn poll(&mut self, now: DateTime<Utc>) {
        let Some(latest) = self
            .subscription
            .as_ref()
            .and_then(|sub| sub.drain().into_iter().last())
        else {
            return;
        };
        self.current = latest.map(|snack| (snack, now));
    }

    pub fn current(&self) -> Option<&Snack> {
        self.current.as_ref().map(|(snack, _)| snack)
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// When the current snack hides by itself.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.current
            .as_ref()
            .map(|(_, shown)| *shown + TimeDelta::milliseconds(SNACK_DURATION_MS))
    }

    fn expire(&mut self, now: DateTime<Utc>) {
        if self.deadline().is_some_and(|deadline| now >= deadline) {
            self.current = None;
        }
    }
}

/// Draws the current snack at the bottom of the screen.
pub fn snackbar(ui: &mut Ui, state: &mut SnackbarState, now: DateTime<Utc>, translate: &impl Translate) {
    state.poll(now);
    state.expire(now);
    let Some(snack) = state.current() else {
        return;
    };

    let message = if snack.translate {
        translate.translate(&snack.message)
    } else {
        snack.message.clone()
    };
    let action = snack.action.as_deref().map(|key| translate.translate(key));
    let mut dismissed = false;

    Area::new(egui::Id::new("snackbar"))
        .anchor(Align2::CENTER_BOTTOM, [0.0, -24.0])
        .show(ui.ctx(), |ui| {
            Frame::NONE
                .fill(SNACK_BG_COLOR)
                .inner_margin(Margin::symmetric(16, 10))
                .corner_radius(4.0)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(message).color(egui::Color32::WHITE));
                        if let Some(action) = action {
                            dismissed = ui.button(action).clicked();
                        }
                    });
                });
        });

    if dismissed {
        state.dismiss();
    }
}
