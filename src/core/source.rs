//! Grid sources - where raw sheet rows come from
//!
//! A [`GridSource`] produces the [`RawGrid`] the parser consumes. Local files
//! are read as CSV, TSV or JSON; remote sheets are fetched from the Google
//! Sheets values API with an API key, an OAuth access token, or a service
//! account whose signed assertion is exchanged for a token first.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::parse::RawGrid;

/// Range fetched when none is configured
pub const DEFAULT_RANGE: &str = "A:Z";

/// Google Sheets v4 spreadsheets endpoint
pub const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Token endpoint used when a key file does not name one
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Read-only access is all a grid fetch needs
pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Google caps assertion lifetime at one hour
const ASSERTION_LIFETIME_SECS: u64 = 3600;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while obtaining a grid
#[derive(Debug, Error, Diagnostic)]
pub enum SourceError {
    #[error("No spreadsheet configured")]
    #[diagnostic(
        code(stockgrid::source::missing_sheet_id),
        help("Pass a FILE, use --sheet-id, or set STOCKGRID_SHEET_ID (or GOOGLE_SHEET_ID)")
    )]
    MissingSheetId,

    #[error("Google Sheets credentials not found")]
    #[diagnostic(
        code(stockgrid::source::missing_credentials),
        help("Set GOOGLE_SERVICE_ACCOUNT_JSON, GOOGLE_SERVICE_ACCOUNT_KEY, GOOGLE_ACCESS_TOKEN or GOOGLE_API_KEY, or add the matching key to the config file")
    )]
    MissingCredentials,

    #[error("Failed to parse {origin}: {message}")]
    #[diagnostic(
        code(stockgrid::source::malformed_credentials),
        help("Check that {origin} is valid service account JSON. Make sure to paste the entire JSON file content, including all quotes and brackets.")
    )]
    MalformedCredentials { origin: String, message: String },

    #[error("File not found: {}", .path.display())]
    #[diagnostic(code(stockgrid::source::not_found))]
    NotFound { path: PathBuf },

    #[error("Unsupported grid file: {}", .path.display())]
    #[diagnostic(
        code(stockgrid::source::unsupported_format),
        help("Use a .csv, .tsv or .json file")
    )]
    UnsupportedFormat { path: PathBuf },

    #[error("Invalid Sheets endpoint: {0}")]
    #[diagnostic(code(stockgrid::source::endpoint))]
    InvalidEndpoint(String),

    #[error("Data source unreachable: {0}")]
    #[diagnostic(
        code(stockgrid::source::unreachable),
        help("Check network connectivity and the configured Sheets endpoint")
    )]
    Unreachable(#[source] reqwest::Error),

    #[error("Google API returned HTTP {status}: {body}")]
    #[diagnostic(
        code(stockgrid::source::http_status),
        help("Check that the sheet ID is correct and that the credentials can read the sheet")
    )]
    HttpStatus { status: u16, body: String },

    #[error("Malformed grid from {origin}: {message}")]
    #[diagnostic(code(stockgrid::source::malformed))]
    MalformedGrid { origin: String, message: String },

    #[error("Invalid JSON in {origin}: {source}")]
    #[diagnostic(code(stockgrid::source::json))]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid CSV in {}: {source}", .path.display())]
    #[diagnostic(code(stockgrid::source::csv))]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("IO error: {0}")]
    #[diagnostic(code(stockgrid::source::io))]
    Io(#[from] std::io::Error),
}

/// Local grid file formats, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Tsv,
    Json,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(FileFormat::Csv),
            "tsv" | "tab" => Some(FileFormat::Tsv),
            "json" => Some(FileFormat::Json),
            _ => None,
        }
    }
}

/// How requests to the Sheets API are authorized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetsAuth {
    /// Sent as the `key` query parameter
    ApiKey(String),
    /// Sent as a bearer token
    AccessToken(String),
    /// Exchanged for a bearer token before each fetch
    ServiceAccount(ServiceAccountKey),
}

/// The parts of a Google service account key file needed to sign in
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

/// JWT claims of a service account token request
#[derive(Debug, Serialize, PartialEq, Eq)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ServiceAccountKey {
    /// Parse key file contents; `origin` names where they came from in errors
    pub fn from_json(json: &str, origin: &str) -> Result<Self, SourceError> {
        serde_json::from_str(json).map_err(|e| SourceError::MalformedCredentials {
            origin: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Read a key file, relative paths resolving against the working directory
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        if !path.exists() {
            return Err(SourceError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents, &path.display().to_string())
    }

    fn claims(&self, issued_at: u64) -> AssertionClaims<'_> {
        AssertionClaims {
            iss: &self.client_email,
            scope: SHEETS_READONLY_SCOPE,
            aud: &self.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        }
    }

    /// Sign an RS256 token request assertion issued at `issued_at` (unix seconds)
    pub fn assertion(&self, issued_at: u64) -> Result<String, SourceError> {
        let malformed = |message: String| SourceError::MalformedCredentials {
            origin: format!("service account key for {}", self.client_email),
            message,
        };

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| malformed(format!("private_key is not an RSA PEM key ({})", e)))?;
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        jsonwebtoken::encode(&header, &self.claims(issued_at), &key)
            .map_err(|e| malformed(format!("could not sign assertion ({})", e)))
    }

    /// Trade a fresh assertion for an access token at `token_uri`
    fn access_token(&self, client: &reqwest::blocking::Client) -> Result<String, SourceError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let assertion = self.assertion(now)?;
        info!(client_email = %self.client_email, token_uri = %self.token_uri, "requesting access token");

        let response = client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .map_err(SourceError::Unreachable)?;
        let status = response.status();
        let body = response.text().map_err(SourceError::Unreachable)?;

        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|source| SourceError::Json {
                origin: self.token_uri.clone(),
                source,
            })?;
        Ok(token.access_token)
    }
}

/// A single sheet range to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRequest {
    pub spreadsheet_id: String,
    pub range: String,
    pub auth: SheetsAuth,
    pub endpoint: String,
}

impl SheetRequest {
    pub fn new(spreadsheet_id: impl Into<String>, auth: SheetsAuth) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            range: DEFAULT_RANGE.to_string(),
            auth,
            endpoint: SHEETS_ENDPOINT.to_string(),
        }
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Build `{endpoint}/{id}/values/{range}`, percent-encoding each segment
    pub fn url(&self) -> Result<reqwest::Url, SourceError> {
        let mut url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| SourceError::InvalidEndpoint(format!("{}: {}", self.endpoint, e)))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidEndpoint(self.endpoint.clone()))?
            .pop_if_empty()
            .extend([self.spreadsheet_id.as_str(), "values", self.range.as_str()]);

        if let SheetsAuth::ApiKey(key) = &self.auth {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    fn fetch(&self) -> Result<RawGrid, SourceError> {
        let url = self.url()?;
        info!(
            spreadsheet = %self.spreadsheet_id,
            range = %self.range,
            "fetching sheet values"
        );

        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(SourceError::Unreachable)?;

        let request = match &self.auth {
            SheetsAuth::ApiKey(_) => client.get(url),
            SheetsAuth::AccessToken(token) => client.get(url).bearer_auth(token),
            SheetsAuth::ServiceAccount(key) => {
                let token = key.access_token(&client)?;
                client.get(url).bearer_auth(token)
            }
        };

        let response = request.send().map_err(SourceError::Unreachable)?;
        let status = response.status();
        let body = response.text().map_err(SourceError::Unreachable)?;

        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let origin = "Google Sheets API";
        let value: Value = serde_json::from_str(&body).map_err(|source| SourceError::Json {
            origin: origin.to_string(),
            source,
        })?;
        grid_from_json(value, origin)
    }
}

/// Where a grid is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridSource {
    File(PathBuf),
    Sheets(SheetRequest),
}

impl fmt::Display for GridSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridSource::File(path) => write!(f, "{}", path.display()),
            GridSource::Sheets(req) => write!(f, "sheet {} ({})", req.spreadsheet_id, req.range),
        }
    }
}

impl GridSource {
    /// Read or fetch the grid
    pub fn load(&self) -> Result<RawGrid, SourceError> {
        let grid = match self {
            GridSource::File(path) => read_file(path)?,
            GridSource::Sheets(req) => req.fetch()?,
        };
        debug!(source = %self, rows = grid.len(), "loaded grid");
        Ok(grid)
    }
}

fn read_file(path: &Path) -> Result<RawGrid, SourceError> {
    if !path.exists() {
        return Err(SourceError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let format = FileFormat::from_path(path).ok_or_else(|| SourceError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    info!(path = %path.display(), ?format, "reading grid file");

    match format {
        FileFormat::Csv => read_delimited(path, b',', true),
        FileFormat::Tsv => read_delimited(path, b'\t', false),
        FileFormat::Json => {
            let origin = path.display().to_string();
            let contents = std::fs::read_to_string(path)?;
            let value: Value =
                serde_json::from_str(&contents).map_err(|source| SourceError::Json {
                    origin: origin.clone(),
                    source,
                })?;
            grid_from_json(value, &origin)
        }
    }
}

/// Rows keep their own lengths; nothing is treated as a header here
fn read_delimited(path: &Path, delimiter: u8, quoting: bool) -> Result<RawGrid, SourceError> {
    let csv_error = |source| SourceError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .quoting(quoting)
        .from_path(path)
        .map_err(csv_error)?;

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        grid.push(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

/// Accept a bare array of rows or a Sheets `ValueRange` object
pub fn grid_from_json(value: Value, origin: &str) -> Result<RawGrid, SourceError> {
    let malformed = |message: String| SourceError::MalformedGrid {
        origin: origin.to_string(),
        message,
    };

    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("values") {
            Some(Value::Array(rows)) => rows,
            // The API omits `values` entirely for an empty range
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(_) => return Err(malformed("\"values\" is not an array".to_string())),
        },
        _ => {
            return Err(malformed(
                "expected an array of rows or an object with \"values\"".to_string(),
            ))
        }
    };

    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| match row {
            Value::Array(cells) => Ok(cells.into_iter().map(cell_text).collect()),
            Value::Null => Ok(Vec::new()),
            _ => Err(malformed(format!("row {} is not an array", idx + 1))),
        })
        .collect()
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
