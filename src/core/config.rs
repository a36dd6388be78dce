//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::source::{
    ServiceAccountKey, SheetsAuth, SourceError, DEFAULT_RANGE, SHEETS_ENDPOINT,
};

/// Project config file, looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = ".stockgrid.yaml";

/// Stockgrid configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Spreadsheet to fetch when no file is given
    pub sheet_id: Option<String>,

    /// A1-notation range to fetch (default A:Z)
    pub range: Option<String>,

    /// Google API key for public or link-shared sheets
    pub api_key: Option<String>,

    /// OAuth access token with the spreadsheets.readonly scope
    pub access_token: Option<String>,

    /// Service account key file contents, inline
    pub service_account_json: Option<String>,

    /// Path to a service account key file
    pub service_account_key: Option<String>,

    /// Override for the Sheets API endpoint
    pub sheets_endpoint: Option<String>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let project_path = std::env::current_dir()
            .ok()
            .map(|dir| dir.join(PROJECT_CONFIG_FILE));
        let mut config = Self::load_files(
            Self::global_config_path().as_deref(),
            project_path.as_deref(),
        );
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Merge the global then the project file; missing or invalid files are skipped
    pub fn load_files(global: Option<&Path>, project: Option<&Path>) -> Self {
        let mut config = Config::default();
        for path in [global, project].into_iter().flatten() {
            if let Some(layer) = Self::read_file(path) {
                config.merge(layer);
            }
        }
        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable config file");
                return None;
            }
        };
        // An empty file deserializes as null
        if contents.trim().is_empty() {
            return Some(Config::default());
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping invalid config file");
                None
            }
        }
    }

    /// Environment variables override file settings
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| lookup(*key).filter(|v| !v.is_empty()))
        };

        if let Some(sheet_id) = var(&["STOCKGRID_SHEET_ID", "GOOGLE_SHEET_ID"]) {
            self.sheet_id = Some(sheet_id);
        }
        if let Some(range) = var(&["STOCKGRID_RANGE"]) {
            self.range = Some(range);
        }
        if let Some(api_key) = var(&["GOOGLE_API_KEY"]) {
            self.api_key = Some(api_key);
        }
        if let Some(token) = var(&["GOOGLE_ACCESS_TOKEN"]) {
            self.access_token = Some(token);
        }
        if let Some(json) = var(&["GOOGLE_SERVICE_ACCOUNT_JSON"]) {
            self.service_account_json = Some(json);
        }
        if let Some(path) = var(&["GOOGLE_SERVICE_ACCOUNT_KEY"]) {
            self.service_account_key = Some(path);
        }
        if let Some(endpoint) = var(&["STOCKGRID_SHEETS_ENDPOINT"]) {
            self.sheets_endpoint = Some(endpoint);
        }
        if let Some(format) = var(&["STOCKGRID_FORMAT"]) {
            self.default_format = Some(format);
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "stockgrid")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.sheet_id.is_some() {
            self.sheet_id = other.sheet_id;
        }
        if other.range.is_some() {
            self.range = other.range;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.access_token.is_some() {
            self.access_token = other.access_token;
        }
        if other.service_account_json.is_some() {
            self.service_account_json = other.service_account_json;
        }
        if other.service_account_key.is_some() {
            self.service_account_key = other.service_account_key;
        }
        if other.sheets_endpoint.is_some() {
            self.sheets_endpoint = other.sheets_endpoint;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    pub fn range(&self) -> &str {
        self.range.as_deref().unwrap_or(DEFAULT_RANGE)
    }

    pub fn sheets_endpoint(&self) -> &str {
        self.sheets_endpoint.as_deref().unwrap_or(SHEETS_ENDPOINT)
    }

    /// Sheets credentials, most specific first: access token, inline
    /// service account JSON, service account key file, API key
    pub fn sheets_auth(&self) -> Result<Option<SheetsAuth>, SourceError> {
        if let Some(token) = &self.access_token {
            return Ok(Some(SheetsAuth::AccessToken(token.clone())));
        }
        if let Some(json) = &self.service_account_json {
            let key = ServiceAccountKey::from_json(json, "GOOGLE_SERVICE_ACCOUNT_JSON")?;
            return Ok(Some(SheetsAuth::ServiceAccount(key)));
        }
        if let Some(path) = &self.service_account_key {
            let key = ServiceAccountKey::from_file(Path::new(path))?;
            return Ok(Some(SheetsAuth::ServiceAccount(key)));
        }
        Ok(self.api_key.clone().map(SheetsAuth::ApiKey))
    }

    /// Value of a key for display, with credentials redacted
    pub fn display_value(&self, key: &str) -> Option<String> {
        match key {
            "sheet_id" => self.sheet_id.clone(),
            "range" => Some(self.range().to_string()),
            "api_key" => self.api_key.as_deref().map(redact),
            "access_token" => self.access_token.as_deref().map(redact),
            "service_account_json" => self
                .service_account_json
                .as_ref()
                .map(|_| "(inline key, hidden)".to_string()),
            "service_account_key" => self.service_account_key.clone(),
            "sheets_endpoint" => Some(self.sheets_endpoint().to_string()),
            "default_format" => self.default_format.clone(),
            _ => None,
        }
    }
}

/// Keep only the last four characters of a secret
fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
