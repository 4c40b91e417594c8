//! Configuration, read from the environment (and `.env`) with `figment`.

use figment::{Figment, providers::Env};
use serde::Deserialize;

const DEFAULT_PORTAL_URL: &str =
    "https://apptracking.council.nsw.gov.au/Pages/XC.Track/SearchApplication.aspx";
const DEFAULT_SEARCH_URL: &str = "https://apptracking.council.nsw.gov.au/Pages/XC.Track/SearchApplication.aspx?d={date_from}&de={date_to}&k=LodgementDate&t=DA";

/// Runtime configuration. Every field has a default, so an empty
/// environment runs against the council portal with a local database.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// SQLite connection string.
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Level for this crate's logs when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Main page; visiting it establishes the portal session.
    #[serde(default = "default_portal_url")]
    pub portal_url: String,
    /// Search results URL with `{date_from}` and `{date_to}` placeholders.
    #[serde(default = "default_search_url")]
    pub search_url: String,
    /// IANA timezone the council's "today" is computed in.
    #[serde(default = "default_portal_timezone")]
    pub portal_timezone: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Config {
    /// Extract from raw environment variables (`DATABASE_URL`, `LOG_LEVEL`, ...).
    pub fn load() -> Result<Self, figment::Error> {
        Self::from_figment(Figment::new().merge(Env::raw()))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        figment.extract()
    }
}

fn default_database_url() -> String {
    "sqlite://data.sqlite?mode=rwc".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_portal_url() -> String {
    DEFAULT_PORTAL_URL.to_owned()
}

fn default_search_url() -> String {
    DEFAULT_SEARCH_URL.to_owned()
}

fn default_portal_timezone() -> String {
    "Australia/Sydney".to_owned()
}

fn default_user_agent() -> String {
    concat!("da_tracker/", env!("CARGO_PKG_VERSION")).to_owned()
}
