//! Fulfils list actions against the remote API and pushes results into the stores.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use orgadmin_states::GenerationCounter;
use ustr::Ustr;

use crate::api::{ListQuery, SharedModelApi};
use crate::model::{ListStoreValue, Model, default_columns};
use crate::stores::{ListStores, OrgUnitDialogValue, Snack};

pub const ORG_UNIT_ASSIGNMENT_SAVED: &str = "organisation_unit_assignment_saved";
pub const ORG_UNIT_ASSIGNMENT_SAVE_ERROR: &str = "organisation_unit_assignment_save_error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    pub model_type: Ustr,
    pub search_string: String,
    pub can_manage: bool,
}

/// Fire-and-forget commands issued by the list view.
///
/// Results arrive later through the stores. Failures are logged.
pub trait ListActions {
    fn filter(&self, request: FilterRequest);
    fn get_next_page(&self);
    fn get_previous_page(&self);
    fn show_details(&self, model: &Model);
    fn hide_details_box(&self);
    fn delete_model(&self, model: &Model);
    fn open_org_unit_assignment(&self, model: &Model);
    fn save_org_unit_assignment(&self, model: &Model, paths: Vec<String>);
}

fn spawn(what: &'static str, future: impl Future<Output = ()> + Send + 'static) {
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(future);
        }
        Err(_) => log::error!("{what}: no tokio runtime, action dropped"),
    }
}

/// [`ListActions`] backed by a [`crate::api::ModelApi`].
///
/// List and details fetches are latest-only: once a newer one starts, the older
/// response is dropped instead of overwriting the store.
#[derive(Clone)]
pub struct ListController {
    api: SharedModelApi,
    stores: ListStores,
    page_size: u64,
    last_query: Arc<Mutex<Option<ListQuery>>>,
    list_generation: GenerationCounter,
    details_generation: GenerationCounter,
}

impl ListController {
    pub fn new(api: SharedModelApi, stores: ListStores, page_size: u64) -> Self {
        Self {
            api,
            stores,
            page_size,
            last_query: Arc::new(Mutex::new(None)),
            list_generation: GenerationCounter::new(),
            details_generation: GenerationCounter::new(),
        }
    }

    pub fn stores(&self) -> &ListStores {
        &self.stores
    }

    pub fn last_query(&self) -> Option<ListQuery> {
        self.last_query
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn remember(&self, query: &ListQuery) {
        *self.last_query.lock().unwrap_or_else(PoisonError::into_inner) = Some(query.clone());
    }

    /// Fetches one page and pushes it unless a newer fetch started meanwhile.
    pub async fn load_list(&self, query: ListQuery) {
        self.remember(&query);
        let generation = self.list_generation.advance();

        let result = self.api.list_models(&query).await;
        if !self.list_generation.is_current(generation) {
            log::debug!("dropping stale {} list page {}", query.model_type, query.page);
            return;
        }

        match result {
            Ok(page) => {
                log::debug!(
                    "{} list page {}: {} rows of {}",
                    query.model_type,
                    page.pager.page,
                    page.rows.len(),
                    page.pager.total
                );
                self.stores.list.set_state(ListStoreValue::loaded(
                    page.rows,
                    page.pager,
                    default_columns(&query.model_type),
                ));
            }
            Err(err) => {
                log::error!("loading {} list failed: {err}", query.model_type);
                // Re-push so the view leaves its loading state.
                self.stores.list.set_state(self.stores.list.state());
            }
        }
    }

    fn page_query(&self, step: i64) -> Option<ListQuery> {
        let query = self.last_query()?;
        let pager = self.stores.list.state().pager;
        let allowed = if step > 0 {
            pager.has_next()
        } else {
            pager.has_previous()
        };
        if !allowed {
            return None;
        }
        let page = pager.page.saturating_add_signed(step).max(1);
        Some(query.with_page(page))
    }

    fn turn_page(&self, step: i64) {
        match self.page_query(step) {
            Some(query) => {
                let this = self.clone();
                spawn("turn page", async move { this.load_list(query).await });
            }
            None => {
                log::debug!("no page in direction {step}");
                self.stores.list.set_state(self.stores.list.state());
            }
        }
    }

    pub async fn load_details(&self, model: Model) {
        let generation = self.details_generation.advance();
        self.stores.details.set_state(Some(model.clone()));

        let Some(id) = model.id() else {
            return;
        };
        match self.api.get_model(&model.model_type, id).await {
            Ok(full) if self.details_generation.is_current(generation) => {
                self.stores.details.set_state(Some(full));
            }
            Ok(_) => log::debug!("dropping stale details for {id}"),
            Err(err) => log::error!("loading details of {} {id} failed: {err}", model.model_type),
        }
    }

    pub async fn delete(&self, model: Model) {
        match self.api.delete_model(&model).await {
            Ok(()) => {
                log::info!("deleted {} {}", model.model_type, model.display_name());
                if let Some(query) = self.last_query() {
                    self.load_list(query).await;
                }
            }
            Err(err) => log::error!("deleting {} failed: {err}", model.display_name()),
        }
    }

    /// Loads roots and the record's current assignment, then opens the dialog.
    pub async fn open_assignment(&self, model: Model) {
        let Some(id) = model.id().map(str::to_owned) else {
            log::error!("cannot assign org units to a record without id");
            return;
        };
        let (roots, full) = tokio::join!(
            self.api.user_roots(),
            self.api.get_model(&model.model_type, &id)
        );
        match (roots, full) {
            (Ok(roots), Ok(full)) => {
                let selected = full.org_unit_paths();
                self.stores.org_unit_dialog.set_state(OrgUnitDialogValue {
                    model: Some(full),
                    roots,
                    selected,
                    open: true,
                });
            }
            (Err(err), _) | (_, Err(err)) => {
                log::error!("preparing org unit assignment for {id} failed: {err}");
            }
        }
    }

    pub async fn save_assignment(&self, model: Model, paths: Vec<String>) {
        match self.api.save_org_unit_assignment(&model, &paths).await {
            Ok(()) => {
                self.stores
                    .show_snack(Snack::translated(ORG_UNIT_ASSIGNMENT_SAVED).with_action("ok"));
                self.stores.close_org_unit_dialog();
            }
            Err(err) => {
                log::error!("{err}");
                self.stores
                    .show_snack(Snack::translated(ORG_UNIT_ASSIGNMENT_SAVE_ERROR));
            }
        }
    }
}

impl ListActions for ListController {
    fn filter(&self, request: FilterRequest) {
        let query = ListQuery {
            search: request.search_string,
            can_manage: request.can_manage,
            ..ListQuery::first_page(request.model_type, self.page_size)
        };
        let this = self.clone();
        spawn("filter", async move { this.load_list(query).await });
    }

    fn get_next_page(&self) {
        self.turn_page(1);
    }

    fn get_previous_page(&self) {
        self.turn_page(-1);
    }

    fn show_details(&self, model: &Model) {
        let this = self.clone();
        let model = model.clone();
        spawn("show details", async move { this.load_details(model).await });
    }

    fn hide_details_box(&self) {
        self.details_generation.advance();
        self.stores.details.set_state(None);
    }

    fn delete_model(&self, model: &Model) {
        let this = self.clone();
        let model = model.clone();
        spawn("delete", async move { this.delete(model).await });
    }

    fn open_org_unit_assignment(&self, model: &Model) {
        let this = self.clone();
        let model = model.clone();
        spawn("open org unit assignment", async move {
            this.open_assignment(model).await;
        });
    }

    fn save_org_unit_assignment(&self, model: &Model, paths: Vec<String>) {
        let this = self.clone();
        let model = model.clone();
        spawn("save org unit assignment", async move {
            this.save_assignment(model, paths).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::test_utils::{FakeModelApi, user};

    fn controller(api: FakeModelApi) -> (ListController, Arc<FakeModelApi>) {
        let api = Arc::new(api);
        (
            ListController::new(api.clone(), ListStores::new(), 50),
            api,
        )
    }

    fn filter(search: &str) -> FilterRequest {
        FilterRequest {
            model_type: Ustr::from("user"),
            search_string: search.to_owned(),
            can_manage: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn filter_pushes_rows_into_list_store() {
        let (controller, _api) = controller(FakeModelApi::default().with_users(3));
        let sub = controller.stores().list.subscribe();

        controller.filter(filter(""));
        tokio::time::sleep(Duration::from_millis(10)).await;

        let pushed = sub.drain();
        let last = pushed.last().unwrap();
        assert_eq!(last.list.as_ref().map(Vec::len), Some(3));
        assert_eq!(last.table_columns, default_columns("user"));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_list_response_is_dropped() {
        let api = FakeModelApi::default()
            .with_users(3)
            .with_latency("slow", Duration::from_millis(300));
        let (controller, _api) = controller(api);

        controller.filter(filter("slow"));
        tokio::time::sleep(Duration::from_millis(5)).await;
        controller.filter(filter("fast"));
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(controller.last_query().unwrap().search, "fast");
        let rows = controller.stores().list.state().list.unwrap();
        assert!(rows.iter().all(|m| m.display_name().contains("fast")));
    }

    #[tokio::test(start_paused = true)]
    async fn next_page_uses_last_query() {
        let (controller, api) = controller(FakeModelApi::default().with_users(120));
        controller.load_list(ListQuery::first_page(Ustr::from("user"), 50)).await;

        controller.get_next_page();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(controller.stores().list.state().pager.page, 2);
        assert_eq!(api.calls("list_models"), vec!["user:1:", "user:2:"]);
    }

    #[tokio::test(start_paused = true)]
    async fn previous_page_on_first_page_repushes_current() {
        let (controller, api) = controller(FakeModelApi::default().with_users(10));
        controller.load_list(ListQuery::first_page(Ustr::from("user"), 50)).await;
        let sub = controller.stores().list.subscribe();

        controller.get_previous_page();

        assert_eq!(sub.drain().len(), 2);
        assert_eq!(api.calls("list_models").len(), 1);
    }

    #[tokio::test]
    async fn save_success_shows_snack_and_closes_dialog() {
        let (controller, api) = controller(FakeModelApi::default());
        controller.stores().org_unit_dialog.set_state(OrgUnitDialogValue {
            model: Some(user("u1")),
            open: true,
            ..OrgUnitDialogValue::default()
        });

        controller
            .save_assignment(user("u1"), vec!["/root/a".into()])
            .await;

        assert_eq!(
            controller.stores().snack.state(),
            Some(Snack::translated(ORG_UNIT_ASSIGNMENT_SAVED).with_action("ok"))
        );
        assert!(!controller.stores().org_unit_dialog.state().open);
        assert_eq!(api.calls("save_org_unit_assignment"), vec!["u1:/root/a"]);
    }

    #[tokio::test]
    async fn save_failure_shows_error_snack_and_keeps_dialog() {
        let (controller, _api) = controller(FakeModelApi::default().failing());
        controller.stores().org_unit_dialog.set_state(OrgUnitDialogValue {
            open: true,
            ..OrgUnitDialogValue::default()
        });

        controller.save_assignment(user("u1"), Vec::new()).await;

        assert_eq!(
            controller.stores().snack.state(),
            Some(Snack::translated(ORG_UNIT_ASSIGNMENT_SAVE_ERROR))
        );
        assert!(controller.stores().org_unit_dialog.state().open);
    }

    #[tokio::test]
    async fn open_assignment_seeds_roots_and_paths() {
        let (controller, _api) = controller(FakeModelApi::default());

        controller.open_assignment(user("u1")).await;

        let dialog = controller.stores().org_unit_dialog.state();
        assert!(dialog.open);
        assert_eq!(dialog.roots.len(), 1);
        assert_eq!(dialog.selected, vec!["/root/u1".to_owned()]);
    }

    #[tokio::test]
    async fn details_push_row_then_full_record() {
        let (controller, _api) = controller(FakeModelApi::default());
        let sub = controller.stores().details.subscribe();
        let row = Model::from_value("user", json!({"id": "u1"}));

        controller.load_details(row.clone()).await;

        let pushed = sub.drain();
        assert_eq!(pushed[1], Some(row));
        assert_eq!(
            pushed[2].as_ref().and_then(|m| m.str_field("username")),
            Some("u1")
        );

        controller.hide_details_box();
        assert_eq!(controller.stores().details.state(), None);
    }

    #[tokio::test]
    async fn delete_refreshes_last_query() {
        let (controller, api) = controller(FakeModelApi::default().with_users(2));
        controller.load_list(ListQuery::first_page(Ustr::from("user"), 50)).await;

        controller.delete(user("u0")).await;

        assert_eq!(api.calls("delete_model"), vec!["u0"]);
        assert_eq!(api.calls("list_models").len(), 2);
    }
}
