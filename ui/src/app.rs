use std::time::Duration;

use chrono::{DateTime, Utc};
use orgadmin_business::{ListView, LoadCurrentUserCommand, OrgUnitPickerState};
use orgadmin_states::Time;

use crate::pages::list_page;
use crate::state::State;

/// Async results land through the state context; poll for them at least this often.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct OrgAdminApp {
    state: State,
    started: bool,
}

impl OrgAdminApp {
    /// Called once before the first frame.
    pub fn new(state: State) -> Self {
        Self {
            state,
            started: false,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    fn start(&mut self) {
        self.started = true;
        self.state.ctx.dispatch(LoadCurrentUserCommand {
            api: self.state.api.clone(),
        });
    }

    /// Earliest debounce or snack timer, so the frame after it is not missed.
    fn next_deadline(&self) -> Option<DateTime<Utc>> {
        [
            self.state.ctx.state::<ListView>().next_deadline(),
            self.state.ctx.state::<OrgUnitPickerState>().search_deadline(),
            self.state.page.snackbar.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }
}

impl eframe::App for OrgAdminApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.ctx.state_mut::<Time>().refresh();
        self.state.ctx.sync();
        if !self.started {
            self.start();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            list_page(ui, &mut self.state);
        });

        let now = self.state.ctx.state::<Time>().now();
        let wait = self
            .next_deadline()
            .and_then(|deadline| (deadline - now).to_std().ok())
            .map_or(POLL_INTERVAL, |until| until.min(POLL_INTERVAL));
        ctx.request_repaint_after(wait);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.state.ctx.state_mut::<ListView>().unmount();
        self.state.ctx.cancel_all();
    }
}
