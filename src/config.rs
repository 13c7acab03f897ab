//! Runtime configuration
//!
//! Everything is read from the environment (and from a `.env` file, if any) once, in `main`.
//! The resulting [`Config`] is then handed to whoever needs it.

use std::collections::HashMap;
use std::convert::TryFrom;
use std::path::PathBuf;

use chrono::Locale;
use chrono_tz::Tz;
use url::Url;

use crate::error::{config_error, Result};

pub const DEFAULT_CALDAV_URL: &str = "https://caldav.icloud.com/";
pub const DEFAULT_CALENDAR_NAME: &str = "AVMIL";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
pub const DEFAULT_BACKUP_PATH: &str = "events.ics";

/// Part of the ProdID string that describes the organization (example of a ProdID string: `-//ABC Corporation//My Product//EN`).
pub const DEFAULT_ORG_NAME: &str = "Your Company";
/// Part of the ProdID string that describes the product name (example of a ProdID string: `-//ABC Corporation//My Product//EN`).
pub const DEFAULT_PRODUCT_NAME: &str = "Your Product";

#[derive(Clone, Debug)]
pub struct Config {
    /// Root URL of the CalDAV server
    pub caldav_url: Url,
    pub username: String,
    pub password: String,
    /// Display name of the calendar events are added to
    pub calendar_name: String,
    /// Timezone that naive event times are expressed in
    pub timezone: Tz,
    /// Filter string given to `env_logger`
    pub log_level: String,
    pub ollama_url: Url,
    pub ollama_model: String,
    /// Locale used to display events before confirmation
    pub locale: Locale,
    /// Where the aggregated iCal backup is written
    pub backup_path: PathBuf,
    pub org_name: String,
    pub product_name: String,
}

impl Config {
    /// Load the configuration from the process environment.
    ///
    /// A `.env` file in the current directory is honoured, but real environment variables take precedence.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Build a configuration out of any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| lookup(key).ok_or_else(|| config_error(format!("Missing environment variable: {}", key)));

        let caldav_url = parse_url("CALDAV_URL", &or_default("CALDAV_URL", DEFAULT_CALDAV_URL))?;
        let ollama_url = parse_url("OLLAMA_URL", &or_default("OLLAMA_URL", DEFAULT_OLLAMA_URL))?;

        let tz_name = or_default("TIMEZONE", "UTC");
        let timezone = tz_name.parse::<Tz>()
            .map_err(|err| config_error(format!("Invalid TIMEZONE {:?}: {}", tz_name, err)))?;

        let locale_name = or_default("LOCALE", "en_US");
        let locale = Locale::try_from(locale_name.as_str())
            .map_err(|_| config_error(format!("Unknown LOCALE {:?}", locale_name)))?;

        Ok(Self {
            caldav_url,
            username: required("CALDAV_USERNAME")?,
            password: required("CALDAV_PASSWORD")?,
            calendar_name: or_default("CALENDAR_NAME", DEFAULT_CALENDAR_NAME),
            timezone,
            log_level: or_default("LOG_LEVEL", "debug"),
            ollama_url,
            ollama_model: or_default("OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL),
            locale,
            backup_path: PathBuf::from(or_default("BACKUP_PATH", DEFAULT_BACKUP_PATH)),
            org_name: or_default("ICAL_ORG_NAME", DEFAULT_ORG_NAME),
            product_name: or_default("ICAL_PRODUCT_NAME", DEFAULT_PRODUCT_NAME),
        })
    }

    /// The PRODID put in every generated iCal document
    pub fn prod_id(&self) -> String {
        format!("-//{}//{}//EN", self.org_name, self.product_name)
    }
}

fn parse_url(key: &str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|err| config_error(format!("Invalid {} {:?}: {}", key, value, err)))
}
