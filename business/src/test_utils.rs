//! In-memory fakes for testing code that talks to [`ModelApi`] or issues
//! [`ListActions`], without a server.
//!
//! HTTP-level behaviour of [`crate::Dhis2Api`] is covered separately against
//! `wiremock` servers in `tests/`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::api::{ListQuery, ModelApi, ModelPage};
use crate::error::{ApiError, ApiResult};
use crate::list_controller::{FilterRequest, ListActions};
use crate::model::Model;
use crate::org_unit::{OrgUnit, OrgUnitGroup, OrgUnitLevel};
use crate::pager::Pager;
use crate::permissions::CurrentUser;

/// A user record with write access, assigned to `/root/{id}`.
pub fn user(id: &str) -> Model {
    Model::from_value(
        "user",
        json!({
            "id": id,
            "displayName": format!("User {id}"),
            "username": id,
            "access": {"read": true, "write": true, "update": true, "delete": true},
            "organisationUnits": [{"id": id, "path": format!("/root/{id}")}],
        }),
    )
}

/// Configurable [`ModelApi`] that records every call as `"<method>" -> [args]`.
#[derive(Default)]
pub struct FakeModelApi {
    users: usize,
    failing: bool,
    latency: Vec<(String, Duration)>,
    search_results: Vec<OrgUnit>,
    children: Vec<OrgUnit>,
    group_paths: Vec<String>,
    calls: Mutex<HashMap<&'static str, Vec<String>>>,
}

impl FakeModelApi {
    /// `list_models` serves `count` users, named after the search text.
    #[must_use]
    pub fn with_users(mut self, count: usize) -> Self {
        self.users = count;
        self
    }

    /// Every call fails with a 500.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Delays list fetches whose search text equals `search`.
    #[must_use]
    pub fn with_latency(mut self, search: &str, delay: Duration) -> Self {
        self.latency.push((search.to_owned(), delay));
        self
    }

    #[must_use]
    pub fn with_search_results(mut self, units: Vec<OrgUnit>) -> Self {
        self.search_results = units;
        self
    }

    #[must_use]
    pub fn with_children(mut self, units: Vec<OrgUnit>) -> Self {
        self.children = units;
        self
    }

    #[must_use]
    pub fn with_group_paths(mut self, paths: Vec<String>) -> Self {
        self.group_paths = paths;
        self
    }

    pub fn calls(&self, method: &str) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.get(method).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn record(&self, method: &'static str, args: String) -> ApiResult<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.entry(method).or_default().push(args);
        }
        if self.failing {
            Err(ApiError::Status {
                status: 500,
                body: format!("{method} failed"),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ModelApi for FakeModelApi {
    async fn list_models(&self, query: &ListQuery) -> ApiResult<ModelPage> {
        self.record(
            "list_models",
            format!("{}:{}:{}", query.model_type, query.page, query.search),
        )?;
        if let Some((_, delay)) = self.latency.iter().find(|(s, _)| *s == query.search) {
            tokio::time::sleep(*delay).await;
        }

        let size = query.page_size.max(1);
        let total = self.users as u64;
        let first = (query.page.saturating_sub(1) * size).min(total);
        let last = (first + size).min(total);
        let rows = (first..last)
            .map(|i| {
                let mut model = user(&format!("u{i}"));
                model.attributes.insert(
                    "displayName".to_owned(),
                    json!(format!("{} user {i}", query.search)),
                );
                model
            })
            .collect();

        Ok(ModelPage {
            pager: Pager {
                total,
                page_count: total.div_ceil(size).max(1),
                page: query.page,
                page_size: size,
            },
            rows,
        })
    }

    async fn get_model(&self, model_type: &str, id: &str) -> ApiResult<Model> {
        self.record("get_model", format!("{model_type}:{id}"))?;
        Ok(user(id))
    }

    async fn delete_model(&self, model: &Model) -> ApiResult<()> {
        self.record("delete_model", model.id().unwrap_or_default().to_owned())
    }

    async fn current_user(&self) -> ApiResult<CurrentUser> {
        self.record("current_user", String::new())?;
        Ok(CurrentUser::new("admin", ["ALL"]))
    }

    async fn user_roots(&self) -> ApiResult<Vec<OrgUnit>> {
        self.record("user_roots", String::new())?;
        Ok(vec![OrgUnit::new("root", "Root", "/root", true)])
    }

    async fn search_org_units(&self, name: &str) -> ApiResult<Vec<OrgUnit>> {
        self.record("search_org_units", name.to_owned())?;
        Ok(self.search_results.clone())
    }

    async fn org_unit_children(&self, id: &str) -> ApiResult<Vec<OrgUnit>> {
        self.record("org_unit_children", id.to_owned())?;
        Ok(self.children.clone())
    }

    async fn list_org_unit_levels(&self) -> ApiResult<Vec<OrgUnitLevel>> {
        self.record("list_org_unit_levels", String::new())?;
        Ok(vec![
            OrgUnitLevel {
                id: "l1".into(),
                level: 1,
                display_name: "National".to_owned(),
            },
            OrgUnitLevel {
                id: "l2".into(),
                level: 2,
                display_name: "District".to_owned(),
            },
        ])
    }

    async fn list_org_unit_groups(&self) -> ApiResult<Vec<OrgUnitGroup>> {
        self.record("list_org_unit_groups", String::new())?;
        Ok(vec![OrgUnitGroup {
            id: "g1".into(),
            display_name: "Hospitals".to_owned(),
        }])
    }

    async fn org_units_at_level(&self, level: u32) -> ApiResult<Vec<String>> {
        self.record("org_units_at_level", level.to_string())?;
        Ok(self.group_paths.clone())
    }

    async fn org_units_in_group(&self, group_id: &str) -> ApiResult<Vec<String>> {
        self.record("org_units_in_group", group_id.to_owned())?;
        Ok(self.group_paths.clone())
    }

    async fn all_org_units(&self) -> ApiResult<Vec<String>> {
        self.record("all_org_units", String::new())?;
        Ok(self.group_paths.clone())
    }

    async fn save_org_unit_assignment(&self, model: &Model, paths: &[String]) -> ApiResult<()> {
        self.record(
            "save_org_unit_assignment",
            format!("{}:{}", model.id().unwrap_or_default(), paths.join(",")),
        )
    }
}

/// Something a [`RecordingListActions`] was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedAction {
    Filter(FilterRequest),
    NextPage,
    PreviousPage,
    ShowDetails(String),
    HideDetails,
    Delete(String),
    OpenOrgUnitAssignment(String),
    SaveOrgUnitAssignment(String, Vec<String>),
}

/// [`ListActions`] that only records what it was asked.
#[derive(Debug, Default)]
pub struct RecordingListActions {
    actions: Mutex<Vec<RecordedAction>>,
}

impl RecordingListActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, clearing the log.
    pub fn take(&self) -> Vec<RecordedAction> {
        self.actions
            .lock()
            .map(|mut actions| std::mem::take(&mut *actions))
            .unwrap_or_default()
    }

    fn push(&self, action: RecordedAction) {
        if let Ok(mut actions) = self.actions.lock() {
            actions.push(action);
        }
    }
}

fn id_of(model: &Model) -> String {
    model.id().unwrap_or_default().to_owned()
}

impl ListActions for RecordingListActions {
    fn filter(&self, request: FilterRequest) {
        self.push(RecordedAction::Filter(request));
    }

    fn get_next_page(&self) {
        self.push(RecordedAction::NextPage);
    }

    fn get_previous_page(&self) {
        self.push(RecordedAction::PreviousPage);
    }

    fn show_details(&self, model: &Model) {
        self.push(RecordedAction::ShowDetails(id_of(model)));
    }

    fn hide_details_box(&self) {
        self.push(RecordedAction::HideDetails);
    }

    fn delete_model(&self, model: &Model) {
        self.push(RecordedAction::Delete(id_of(model)));
    }

    fn open_org_unit_assignment(&self, model: &Model) {
        self.push(RecordedAction::OpenOrgUnitAssignment(id_of(model)));
    }

    fn save_org_unit_assignment(&self, model: &Model, paths: Vec<String>) {
        self.push(RecordedAction::SaveOrgUnitAssignment(id_of(model), paths));
    }
}
