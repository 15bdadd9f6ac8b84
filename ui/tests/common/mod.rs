use std::time::Duration;

use egui_kittest::Harness;
use orgadmin_ui::OrgAdminApp;
use orgadmin_ui::state::State;
use serde_json::json;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct TestCtx<'a> {
    pub server: MockServer,
    harness: Harness<'a, OrgAdminApp>,
}

impl<'a> TestCtx<'a> {
    pub async fn new_app() -> Self {
        let server = mock_dhis2().await;
        let state = State::test(server.uri());
        let app = OrgAdminApp::new(state);
        let harness = Harness::new_eframe(|_| app);
        Self { server, harness }
    }

    pub fn harness_mut(&mut self) -> &mut Harness<'a, OrgAdminApp> {
        &mut self.harness
    }

    #[allow(unused)]
    pub fn harness(&self) -> &Harness<'a, OrgAdminApp> {
        &self.harness
    }

    /// Steps frames while giving spawned requests time to finish.
    pub async fn settle(&mut self) {
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.harness.step();
        }
    }
}

fn user(id: &str, name: &str, paths: &[&str]) -> serde_json::Value {
    json!({
        "id": id,
        "displayName": name,
        "username": id,
        "lastUpdated": "2024-03-05T09:00:00.000",
        "access": {"read": true, "write": true, "update": true, "delete": true},
        "organisationUnits": paths.iter().map(|p| json!({"id": p.rsplit('/').next(), "path": p})).collect::<Vec<_>>(),
    })
}

/// A DHIS2 server with two users, one root and one level and group.
async fn mock_dhis2() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/me"))
        .and(query_param("fields", "username,authorities"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"username": "admin", "authorities": ["ALL"]})),
        )
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organisationUnits": [
                {"id": "sl", "displayName": "Sierra Leone", "path": "/sl", "children": false}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pager": {"page": 1, "pageCount": 1, "total": 2, "pageSize": 50},
            "users": [user("u1", "Ann", &["/sl"]), user("u2", "Bob", &[])]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex("^/api/users/u1$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user("u1", "Ann", &["/sl"])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/organisationUnitLevels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organisationUnitLevels": [{"id": "l1", "level": 1, "displayName": "National"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/organisationUnitGroups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organisationUnitGroups": [{"id": "g1", "displayName": "Hospitals"}]
        })))
        .mount(&server)
        .await;

    server
}
