//! Remote model API.
//!
//! [`ModelApi`] is the seam between commands / the list controller and the
//! server. [`Dhis2Api`] talks to a real instance over HTTP; tests substitute
//! `test_utils::FakeModelApi`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use ustr::Ustr;

use crate::config::BusinessConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::{Client, RequestBuilder, Response};
use crate::model::{Model, plural};
use crate::org_unit::{OrgUnit, OrgUnitGroup, OrgUnitLevel, id_from_path};
use crate::pager::Pager;
use crate::permissions::CurrentUser;

pub const LIST_FIELDS: &str = "id,displayName,name,username,lastUpdated,created,access,href";
pub const DETAIL_FIELDS: &str = ":all,access,userGroups[id,displayName],organisationUnits[id,displayName,path]";
pub const ORG_UNIT_FIELDS: &str = "id,displayName,path,children::isNotEmpty";

/// One filtered page of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub model_type: Ustr,
    pub page: u64,
    pub page_size: u64,
    pub search: String,
    /// Only records the current user can manage. Honoured for users only.
    pub can_manage: bool,
}

impl ListQuery {
    pub fn first_page(model_type: Ustr, page_size: u64) -> Self {
        Self {
            model_type,
            page: 1,
            page_size,
            search: String::new(),
            can_manage: false,
        }
    }

    #[must_use]
    pub fn with_page(&self, page: u64) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelPage {
    pub pager: Pager,
    pub rows: Vec<Model>,
}

#[async_trait]
pub trait ModelApi: Send + Sync {
    async fn list_models(&self, query: &ListQuery) -> ApiResult<ModelPage>;

    /// Full record, including access, groups and org units.
    async fn get_model(&self, model_type: &str, id: &str) -> ApiResult<Model>;

    async fn delete_model(&self, model: &Model) -> ApiResult<()>;

    async fn current_user(&self) -> ApiResult<CurrentUser>;

    /// Org units assigned to the current user; the picker's configured roots.
    async fn user_roots(&self) -> ApiResult<Vec<OrgUnit>>;

    /// Case-insensitive partial match on display name, within the user's hierarchy.
    async fn search_org_units(&self, name: &str) -> ApiResult<Vec<OrgUnit>>;

    async fn org_unit_children(&self, id: &str) -> ApiResult<Vec<OrgUnit>>;

    async fn list_org_unit_levels(&self) -> ApiResult<Vec<OrgUnitLevel>>;

    async fn list_org_unit_groups(&self) -> ApiResult<Vec<OrgUnitGroup>>;

    /// Paths of every org unit on `level`.
    async fn org_units_at_level(&self, level: u32) -> ApiResult<Vec<String>>;

    /// Paths of every member of the group.
    async fn org_units_in_group(&self, group_id: &str) -> ApiResult<Vec<String>>;

    /// Paths of every org unit.
    async fn all_org_units(&self) -> ApiResult<Vec<String>>;

    /// Replaces the record's org unit assignment with `paths`.
    async fn save_org_unit_assignment(&self, model: &Model, paths: &[String]) -> ApiResult<()>;
}

pub type SharedModelApi = Arc<dyn ModelApi>;

/// `ModelApi` over the DHIS2 web API.
#[derive(Debug, Clone)]
pub struct Dhis2Api {
    api_url: String,
    credentials: Option<(String, String)>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrgUnitsResponse {
    #[serde(default)]
    organisation_units: Vec<OrgUnit>,
}

#[derive(Debug, Deserialize)]
struct PathOnly {
    #[serde(default)]
    path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PathsResponse {
    #[serde(default)]
    organisation_units: Vec<PathOnly>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LevelsResponse {
    #[serde(default)]
    organisation_unit_levels: Vec<OrgUnitLevel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupsResponse {
    #[serde(default)]
    organisation_unit_groups: Vec<OrgUnitGroup>,
}

#[derive(Debug, Deserialize)]
struct ChildrenResponse {
    #[serde(default)]
    children: Vec<OrgUnit>,
}

impl Dhis2Api {
    pub fn new(config: &BusinessConfig) -> Self {
        Self {
            api_url: config.api_url().to_string(),
            credentials: config
                .credentials()
                .map(|(user, pass)| (user.to_owned(), pass.to_owned())),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("accept", "application/json");
        match &self.credentials {
            Some((user, pass)) => request.basic_auth(user, pass),
            None => request,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(Client::get(format!("{}/{path}", self.api_url)))
    }

    async fn fetch(request: RequestBuilder) -> ApiResult<Response> {
        request.send().await?.error_for_status()
    }

    fn decode<T: serde::de::DeserializeOwned>(response: &Response, what: &'static str) -> ApiResult<T> {
        response.json().map_err(|e| ApiError::decode(what, e))
    }

    async fn org_unit_paths(&self, filter: Option<String>) -> ApiResult<Vec<String>> {
        let mut request = self
            .get("organisationUnits")
            .query("fields", "id,path")
            .query("paging", "false");
        if let Some(filter) = filter {
            request = request.query("filter", filter);
        }
        let response = Self::fetch(request).await?;
        let body: PathsResponse = Self::decode(&response, "organisation unit paths")?;
        Ok(body
            .organisation_units
            .into_iter()
            .map(|unit| unit.path)
            .filter(|path| !path.is_empty())
            .collect())
    }
}

#[async_trait]
impl ModelApi for Dhis2Api {
    async fn list_models(&self, query: &ListQuery) -> ApiResult<ModelPage> {
        let collection = plural(&query.model_type);
        let mut request = self
            .get(&collection)
            .query("page", query.page.to_string())
            .query("pageSize", query.page_size.to_string())
            .query("fields", LIST_FIELDS)
            .query("order", "displayName:asc");

        let search = query.search.trim();
        let is_user = query.model_type.as_str() == "user";
        if !search.is_empty() {
            request = if is_user {
                request.query("query", search)
            } else {
                request.query("filter", format!("displayName:ilike:{search}"))
            };
        }
        if is_user && query.can_manage {
            request = request.query("canManage", "true");
        }

        let response = Self::fetch(request).await?;
        let mut body: Value = Self::decode(&response, "model list")?;

        let pager = match body.get_mut("pager").map(Value::take) {
            Some(pager) => serde_json::from_value(pager).map_err(|e| ApiError::decode("pager", e))?,
            None => Pager::default(),
        };
        let rows = match body.get_mut(collection.as_str()).map(Value::take) {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| Model::from_value(query.model_type, item))
                .collect(),
            _ => {
                log::warn!("list response for {collection} has no `{collection}` array");
                Vec::new()
            }
        };

        Ok(ModelPage { pager, rows })
    }

    async fn get_model(&self, model_type: &str, id: &str) -> ApiResult<Model> {
        let request = self
            .get(&format!("{}/{id}", plural(model_type)))
            .query("fields", DETAIL_FIELDS);
        let response = Self::fetch(request).await?;
        let body: Value = Self::decode(&response, "model")?;
        Ok(Model::from_value(model_type, body))
    }

    async fn delete_model(&self, model: &Model) -> ApiResult<()> {
        let Some(id) = model.id() else {
            return Err(ApiError::Http(format!("{} record has no id", model.model_type)));
        };
        let url = format!("{}/{}/{id}", self.api_url, plural(&model.model_type));
        Self::fetch(self.authorize(Client::delete(url))).await?;
        Ok(())
    }

    async fn current_user(&self) -> ApiResult<CurrentUser> {
        let request = self
            .get("me")
            .query("fields", "username,authorities");
        let response = Self::fetch(request).await?;
        Self::decode(&response, "current user")
    }

    async fn user_roots(&self) -> ApiResult<Vec<OrgUnit>> {
        let request = self
            .get("me")
            .query("fields", format!("organisationUnits[{ORG_UNIT_FIELDS}]"));
        let response = Self::fetch(request).await?;
        let body: OrgUnitsResponse = Self::decode(&response, "user roots")?;
        Ok(body.organisation_units)
    }

    async fn search_org_units(&self, name: &str) -> ApiResult<Vec<OrgUnit>> {
        let request = self
            .get("organisationUnits")
            .query("filter", format!("displayName:ilike:{name}"))
            .query("fields", ORG_UNIT_FIELDS)
            .query("withinUserHierarchy", "true");
        let response = Self::fetch(request).await?;
        let body: OrgUnitsResponse = Self::decode(&response, "organisation unit search")?;
        Ok(body.organisation_units)
    }

    async fn org_unit_children(&self, id: &str) -> ApiResult<Vec<OrgUnit>> {
        let request = self
            .get(&format!("organisationUnits/{id}"))
            .query("fields", format!("children[{ORG_UNIT_FIELDS}]"));
        let response = Self::fetch(request).await?;
        let body: ChildrenResponse = Self::decode(&response, "organisation unit children")?;
        let mut children = body.children;
        children.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(children)
    }

    async fn list_org_unit_levels(&self) -> ApiResult<Vec<OrgUnitLevel>> {
        let request = self
            .get("organisationUnitLevels")
            .query("paging", "false")
            .query("fields", "id,level,displayName,path")
            .query("order", "level:asc");
        let response = Self::fetch(request).await?;
        let body: LevelsResponse = Self::decode(&response, "organisation unit levels")?;
        Ok(body.organisation_unit_levels)
    }

    async fn list_org_unit_groups(&self) -> ApiResult<Vec<OrgUnitGroup>> {
        let request = self
            .get("organisationUnitGroups")
            .query("paging", "false")
            .query("fields", "id,displayName,path");
        let response = Self::fetch(request).await?;
        let body: GroupsResponse = Self::decode(&response, "organisation unit groups")?;
        Ok(body.organisation_unit_groups)
    }

    async fn org_units_at_level(&self, level: u32) -> ApiResult<Vec<String>> {
        self.org_unit_paths(Some(format!("level:eq:{level}"))).await
    }

    async fn org_units_in_group(&self, group_id: &str) -> ApiResult<Vec<String>> {
        self.org_unit_paths(Some(format!("organisationUnitGroups.id:eq:{group_id}")))
            .await
    }

    async fn all_org_units(&self) -> ApiResult<Vec<String>> {
        self.org_unit_paths(None).await
    }

    async fn save_org_unit_assignment(&self, model: &Model, paths: &[String]) -> ApiResult<()> {
        let Some(id) = model.id() else {
            return Err(ApiError::Http(format!("{} record has no id", model.model_type)));
        };
        let units: Vec<Value> = paths
            .iter()
            .map(|path| json!({ "id": id_from_path(path) }))
            .collect();
        let patch = json!([
            { "op": "add", "path": "/organisationUnits", "value": units }
        ]);

        let url = format!("{}/{}/{id}", self.api_url, plural(&model.model_type));
        let request = self.authorize(Client::patch(url)).json_patch(&patch)?;
        Self::fetch(request).await?;
        log::info!(
            "saved {} organisation units for {} {id}",
            paths.len(),
            model.model_type
        );
        Ok(())
    }
}
