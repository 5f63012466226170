// Application state module
// Shared, read-only handles used by every request

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::types::Config;
use crate::auth::{SessionUserService, UserService};
use crate::geo::{self, CountryNames, GeoLocator};
use crate::logger;
use crate::store::{self, Datastore};

/// Application state
pub struct AppState {
    pub config: Config,
    pub datastore: Arc<dyn Datastore>,
    pub users: Arc<dyn UserService>,
    pub locator: Arc<dyn GeoLocator>,
    pub country_names: CountryNames,

    // Cached config values for fast access
    pub cached_access_log: Arc<AtomicBool>,
}

impl AppState {
    /// Assemble state from already-built collaborators
    pub fn new(
        config: Config,
        datastore: Arc<dyn Datastore>,
        users: Arc<dyn UserService>,
        locator: Arc<dyn GeoLocator>,
    ) -> Self {
        let cached_access_log = Arc::new(AtomicBool::new(config.logging.access_log));
        Self {
            config,
            datastore,
            users,
            locator,
            country_names: CountryNames::default(),
            cached_access_log,
        }
    }

    /// Build the configured store, session lookup and geolocation client
    pub fn from_config(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let datastore = store::open(&config.store)?;
        let users = Arc::new(SessionUserService::from_config(&config.auth));
        let locator = geo::from_config(&config.geolocation)?;

        let mut state = Self::new(config.clone(), datastore, users, locator);
        if let Some(path) = &config.geolocation.country_file {
            match CountryNames::load(path) {
                Ok(names) => state.country_names = names,
                Err(e) => logger::log_warning(&format!(
                    "Country file '{path}' not loaded, logging codes only: {e}"
                )),
            }
        }
        Ok(state)
    }
}
