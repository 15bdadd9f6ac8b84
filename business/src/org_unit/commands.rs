//! Network side of the picker. Results land in [`OrgUnitPickerState`].

use orgadmin_states::{Command, CommandFuture, LatestOnlyUpdater};
use tokio_util::sync::CancellationToken;
use ustr::Ustr;

use super::picker::{ChildrenLoad, OrgUnitPickerState};
use super::selection::BulkMode;
use crate::api::SharedModelApi;

/// Applies `f` to the picker only if it still belongs to `session`.
fn update_picker(
    updater: &LatestOnlyUpdater,
    session: u64,
    f: impl FnOnce(&mut OrgUnitPickerState) + Send + 'static,
) {
    updater.update::<OrgUnitPickerState>(move |picker| {
        if picker.session() == session {
            f(picker);
        } else {
            log::debug!(
                "dropping org unit update for session {session}, picker is on {}",
                picker.session()
            );
        }
    });
}

/// Name search. A newer search supersedes an older one.
pub struct SearchOrgUnitsCommand {
    pub api: SharedModelApi,
    pub session: u64,
    pub query: String,
}

impl Command for SearchOrgUnitsCommand {
    fn run(self, updater: LatestOnlyUpdater, _cancel: CancellationToken) -> CommandFuture {
        Box::pin(async move {
            match self.api.search_org_units(&self.query).await {
                Ok(units) => {
                    log::debug!("org unit search {:?}: {} hits", self.query, units.len());
                    update_picker(&updater, self.session, move |picker| {
                        picker.apply_search_results(units);
                    });
                }
                Err(err) => log::error!("org unit search {:?} failed: {err}", self.query),
            }
        })
    }
}

/// Levels and groups for the bulk affordances, loaded once on mount.
pub struct LoadOrgUnitMetadataCommand {
    pub api: SharedModelApi,
    pub session: u64,
}

impl Command for LoadOrgUnitMetadataCommand {
    fn run(self, updater: LatestOnlyUpdater, _cancel: CancellationToken) -> CommandFuture {
        Box::pin(async move {
            let (levels, groups) = tokio::join!(
                self.api.list_org_unit_levels(),
                self.api.list_org_unit_groups()
            );
            match (levels, groups) {
                (Ok(levels), Ok(groups)) => {
                    update_picker(&updater, self.session, move |picker| {
                        picker.set_metadata(levels, groups);
                    });
                }
                (Err(err), _) | (_, Err(err)) => {
                    log::error!("loading org unit levels and groups failed: {err}");
                }
            }
        })
    }
}

/// Children of one node. Run with `StateCtx::spawn` so sibling loads do not cancel each other.
pub struct LoadOrgUnitChildrenCommand {
    pub api: SharedModelApi,
    pub session: u64,
    pub id: Ustr,
    pub path: String,
}

impl Command for LoadOrgUnitChildrenCommand {
    fn run(self, updater: LatestOnlyUpdater, _cancel: CancellationToken) -> CommandFuture {
        Box::pin(async move {
            let load = match self.api.org_unit_children(&self.id).await {
                Ok(children) => ChildrenLoad::Loaded(children),
                Err(err) => {
                    log::error!("loading children of {} failed: {err}", self.path);
                    ChildrenLoad::Failed
                }
            };
            let path = self.path;
            update_picker(&updater, self.session, move |picker| {
                picker.set_children(&path, load);
            });
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkTarget {
    Level(u32),
    Group(Ustr),
    All,
}

/// Fetches the paths behind a bulk affordance and emits the combined selection.
pub struct BulkSelectCommand {
    pub api: SharedModelApi,
    pub session: u64,
    pub target: BulkTarget,
    pub mode: BulkMode,
}

impl Command for BulkSelectCommand {
    fn run(self, updater: LatestOnlyUpdater, _cancel: CancellationToken) -> CommandFuture {
        Box::pin(async move {
            let fetched = match &self.target {
                BulkTarget::Level(level) => self.api.org_units_at_level(*level).await,
                BulkTarget::Group(group) => self.api.org_units_in_group(group).await,
                BulkTarget::All => self.api.all_org_units().await,
            };
            let mode = self.mode;
            match fetched {
                Ok(paths) => {
                    log::debug!("bulk {:?} {:?}: {} paths", mode, self.target, paths.len());
                    update_picker(&updater, self.session, move |picker| {
                        picker.finish_bulk(&paths, mode);
                    });
                }
                Err(err) => {
                    log::error!("bulk selection {:?} failed: {err}", self.target);
                    update_picker(&updater, self.session, OrgUnitPickerState::fail_bulk);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use orgadmin_states::StateCtx;

    use super::*;
    use crate::org_unit::OrgUnit;
    use crate::test_utils::FakeModelApi;

    async fn settle(ctx: &mut StateCtx) {
        tokio::time::sleep(Duration::from_millis(50)).await;
        ctx.sync();
    }

    fn picker_ctx(selected: Vec<String>) -> StateCtx {
        let mut ctx = StateCtx::new();
        ctx.add_state(OrgUnitPickerState::new(
            vec![OrgUnit::new("root", "Root", "/root", true)],
            selected,
        ));
        ctx
    }

    #[tokio::test(start_paused = true)]
    async fn search_replaces_roots() {
        let api = Arc::new(FakeModelApi::default().with_search_results(vec![OrgUnit::new(
            "bo", "Bo", "/root/bo", false,
        )]));
        let mut ctx = picker_ctx(Vec::new());
        ctx.state_mut::<OrgUnitPickerState>()
            .set_search_text("bo", chrono::Utc::now());

        ctx.dispatch(SearchOrgUnitsCommand {
            api: api.clone(),
            session: 0,
            query: "bo".to_owned(),
        });
        settle(&mut ctx).await;

        assert_eq!(ctx.state::<OrgUnitPickerState>().roots()[0].display_name, "Bo");
        assert_eq!(api.calls("search_org_units"), vec!["bo".to_owned()]);
    }

    #[tokio::test(start_paused = true)]
    async fn bulk_by_group_unions_selection() {
        let api = Arc::new(
            FakeModelApi::default().with_group_paths(vec!["/root/a".into(), "/root/b".into()]),
        );
        let mut ctx = picker_ctx(vec!["/root/a".into()]);
        ctx.state_mut::<OrgUnitPickerState>().begin_bulk();

        ctx.dispatch(BulkSelectCommand {
            api,
            session: 0,
            target: BulkTarget::Group(Ustr::from("g1")),
            mode: BulkMode::Select,
        });
        settle(&mut ctx).await;

        let picker = ctx.state_mut::<OrgUnitPickerState>();
        assert!(!picker.is_loading());
        assert_eq!(
            picker.take_change(),
            Some(vec!["/root/a".to_owned(), "/root/b".to_owned()])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_bulk_clears_loading_without_change() {
        let api = Arc::new(FakeModelApi::default().failing());
        let mut ctx = picker_ctx(vec!["/root".into()]);
        ctx.state_mut::<OrgUnitPickerState>().begin_bulk();

        ctx.dispatch(BulkSelectCommand {
            api,
            session: 0,
            target: BulkTarget::All,
            mode: BulkMode::Select,
        });
        settle(&mut ctx).await;

        let picker = ctx.state_mut::<OrgUnitPickerState>();
        assert!(!picker.is_loading());
        assert_eq!(picker.take_change(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn sibling_children_loads_both_land() {
        let api = Arc::new(FakeModelApi::default().with_children(vec![OrgUnit::new(
            "c", "Child", "/x/c", false,
        )]));
        let mut ctx = picker_ctx(Vec::new());

        for path in ["/root/a", "/root/b"] {
            ctx.spawn(LoadOrgUnitChildrenCommand {
                api: api.clone(),
                session: 0,
                id: Ustr::from(crate::org_unit::id_from_path(path)),
                path: path.to_owned(),
            });
        }
        settle(&mut ctx).await;

        let picker = ctx.state::<OrgUnitPickerState>();
        assert!(matches!(picker.children("/root/a"), Some(ChildrenLoad::Loaded(_))));
        assert!(matches!(picker.children("/root/b"), Some(ChildrenLoad::Loaded(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn bulk_for_an_earlier_session_is_dropped() {
        let api = Arc::new(FakeModelApi::default().with_group_paths(vec!["/root/a".into()]));
        let mut ctx = picker_ctx(Vec::new());
        ctx.state_mut::<OrgUnitPickerState>().begin_bulk();

        ctx.dispatch(BulkSelectCommand {
            api,
            session: 0,
            target: BulkTarget::Group(Ustr::from("g1")),
            mode: BulkMode::Select,
        });
        ctx.add_state(
            OrgUnitPickerState::new(vec![OrgUnit::new("other", "Other", "/other", false)], Vec::new())
                .with_session(1),
        );
        settle(&mut ctx).await;

        let picker = ctx.state_mut::<OrgUnitPickerState>();
        assert_eq!(picker.session(), 1);
        assert_eq!(picker.take_change(), None);
        assert!(picker.selected().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn metadata_fills_levels_and_groups() {
        let api = Arc::new(FakeModelApi::default());
        let mut ctx = picker_ctx(Vec::new());

        ctx.dispatch(LoadOrgUnitMetadataCommand { api, session: 0 });
        settle(&mut ctx).await;

        let picker = ctx.state::<OrgUnitPickerState>();
        assert_eq!(picker.levels().len(), 2);
        assert_eq!(picker.groups().len(), 1);
    }
}
