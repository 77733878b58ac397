use std::sync::Arc;

use pyvo_core::{CzechHolidays, DataStore, HolidayCalendar};

use crate::config::Config;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DataStore>,
    pub holidays: Arc<dyn HolidayCalendar>,
    pub base_url: Arc<str>,
    pub reload_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(store: DataStore, base_url: &str, reload_secret: Option<&str>) -> Self {
        Self {
            store: Arc::new(store),
            holidays: Arc::new(CzechHolidays),
            base_url: Arc::from(base_url.trim_end_matches('/')),
            reload_secret: reload_secret.map(Arc::from),
        }
    }

    pub fn from_config(store: DataStore, config: &Config) -> Self {
        Self::new(store, &config.base_url, config.reload_secret.as_deref())
    }
}
