use std::sync::Arc;

use orgadmin_business::{
    BusinessConfig, CurrentUser, Dhis2Api, ListController, ListStores, ListView,
    OrgUnitPickerState, SharedModelApi, Translations,
};
use orgadmin_states::{StateCtx, Time};

use crate::pages::ListPageState;

/// Record type the list opens with.
pub const INITIAL_MODEL_TYPE: &str = "user";

/// The main application state.
pub struct State {
    /// Frame clock, config, signed in user, list view and org unit picker.
    pub ctx: StateCtx,
    pub api: SharedModelApi,
    pub stores: ListStores,
    pub controller: ListController,
    pub translations: Translations,
    /// Widget state that never leaves the UI thread.
    pub page: ListPageState,
}

impl State {
    pub fn new(config: BusinessConfig) -> Self {
        let api: SharedModelApi = Arc::new(Dhis2Api::new(&config));
        Self::with_api(config, api)
    }

    /// Builds the state around any [`orgadmin_business::ModelApi`], e.g. a fake in tests.
    pub fn with_api(config: BusinessConfig, api: SharedModelApi) -> Self {
        let stores = ListStores::new();
        let controller = ListController::new(Arc::clone(&api), stores.clone(), config.page_size);
        let translations = Translations::english();
        let page = ListPageState::new(&translations, INITIAL_MODEL_TYPE, config.dropdown_limit);

        let mut ctx = StateCtx::new();
        ctx.add_state(Time::default());
        ctx.add_state(config);
        ctx.add_state(CurrentUser::default());
        ctx.add_state(ListView::new(INITIAL_MODEL_TYPE));
        ctx.add_state(OrgUnitPickerState::default());

        Self {
            ctx,
            api,
            stores,
            controller,
            translations,
            page,
        }
    }

    pub fn test(base_url: String) -> Self {
        Self::new(BusinessConfig::new(base_url))
    }
}
