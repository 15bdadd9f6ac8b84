use std::any::Any;
use std::collections::HashSet;

use orgadmin_states::{Command, CommandFuture, LatestOnlyUpdater, State, state_assign_impl};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::api::SharedModelApi;

/// Authority that grants everything.
pub const SUPERUSER_AUTHORITY: &str = "ALL";

/// User-level checks per model type, e.g. `"user"` or `"userGroup"`.
pub trait Permissions {
    fn can_create(&self, model_type: &str) -> bool;
    fn can_update(&self, model_type: &str) -> bool;
    fn can_delete(&self, model_type: &str) -> bool;
}

/// The logged in user as returned by `/api/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CurrentUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    authorities: HashSet<String>,
}

impl CurrentUser {
    pub fn new(username: impl Into<String>, authorities: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            username: username.into(),
            authorities: authorities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_superuser(&self) -> bool {
        self.authorities.contains(SUPERUSER_AUTHORITY)
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.is_superuser() || self.authorities.contains(authority)
    }
}

/// `userGroup` -> `USERGROUP`, as used in `F_USERGROUP_ADD`.
fn authority_key(model_type: &str) -> String {
    model_type.to_uppercase()
}

impl Permissions for CurrentUser {
    fn can_create(&self, model_type: &str) -> bool {
        let key = authority_key(model_type);
        ["ADD", "PUBLIC_ADD", "PRIVATE_ADD"]
            .iter()
            .any(|suffix| self.has_authority(&format!("F_{key}_{suffix}")))
    }

    fn can_update(&self, model_type: &str) -> bool {
        self.can_create(model_type)
    }

    fn can_delete(&self, model_type: &str) -> bool {
        self.has_authority(&format!("F_{}_DELETE", authority_key(model_type)))
    }
}

impl State for CurrentUser {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}

/// Fetches `/api/me` into the [`CurrentUser`] state.
///
/// Until it lands the default user has no authorities, so gated actions stay hidden.
pub struct LoadCurrentUserCommand {
    pub api: SharedModelApi,
}

impl Command for LoadCurrentUserCommand {
    fn run(self, updater: LatestOnlyUpdater, _cancel: CancellationToken) -> CommandFuture {
        Box::pin(async move {
            match self.api.current_user().await {
                Ok(user) => {
                    log::info!("signed in as {}", user.username);
                    updater.set(user);
                }
                Err(err) => log::error!("loading current user failed: {err}"),
            }
        })
    }
}
