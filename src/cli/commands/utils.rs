//! Shared utilities for CLI commands

use miette::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::debug;

use crate::core::{parse_grid, Config, GridSource, RawGrid, SheetRequest, SourceError};
use crate::entities::InventoryRecord;

/// Where a command reads its sheet from
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// CSV, TSV or JSON file holding the sheet (default: fetch from Google Sheets)
    pub file: Option<PathBuf>,

    /// Spreadsheet ID to fetch (overrides config)
    #[arg(long, conflicts_with = "file")]
    pub sheet_id: Option<String>,

    /// Range to fetch in A1 notation (overrides config, default A:Z)
    #[arg(long, conflicts_with = "file")]
    pub range: Option<String>,
}

impl SourceArgs {
    /// A file wins; otherwise flags and config describe a Sheets request
    pub fn resolve(&self, config: &Config) -> Result<GridSource, SourceError> {
        if let Some(file) = &self.file {
            return Ok(GridSource::File(file.clone()));
        }

        let sheet_id = self
            .sheet_id
            .clone()
            .filter(|id| !id.is_empty())
            .or_else(|| config.sheet_id.clone())
            .ok_or(SourceError::MissingSheetId)?;
        let auth = config
            .sheets_auth()?
            .ok_or(SourceError::MissingCredentials)?;
        let range = self.range.as_deref().unwrap_or(config.range());

        Ok(GridSource::Sheets(
            SheetRequest::new(sheet_id, auth)
                .with_range(range)
                .with_endpoint(config.sheets_endpoint()),
        ))
    }

    /// Resolve, load and parse the sheet
    pub fn load(&self, config: &Config) -> Result<Inventory> {
        let source = self.resolve(config)?;
        let grid = source.load()?;
        let records = parse_grid(&grid);
        debug!(source = %source, items = records.len(), "parsed inventory");
        Ok(Inventory { grid, records })
    }
}

/// A loaded sheet and the records parsed from it
#[derive(Debug, Clone)]
pub struct Inventory {
    pub grid: RawGrid,
    pub records: Vec<InventoryRecord>,
}

/// Write content to a file, or stdout when no path is given
pub fn write_output(content: &str, output_path: Option<PathBuf>, quiet: bool) -> Result<()> {
    use miette::IntoDiagnostic;

    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            writer.flush().into_diagnostic()?;
            if !quiet {
                eprintln!("Written to: {}", path.display());
            }
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SheetsAuth;

    #[test]
    fn test_file_wins() {
        let args = SourceArgs {
            file: Some(PathBuf::from("inventory.csv")),
            ..Default::default()
        };
        let source = args.resolve(&Config::default()).unwrap();
        assert_eq!(source, GridSource::File(PathBuf::from("inventory.csv")));
    }

    #[test]
    fn test_missing_sheet_id() {
        let err = SourceArgs::default().resolve(&Config::default()).unwrap_err();
        assert!(matches!(err, SourceError::MissingSheetId));
    }

    #[test]
    fn test_missing_credentials() {
        let config = Config {
            sheet_id: Some("abc".to_string()),
            ..Default::default()
        };
        let err = SourceArgs::default().resolve(&config).unwrap_err();
        assert!(matches!(err, SourceError::MissingCredentials));
    }

    #[test]
    fn test_malformed_service_account_stops_resolution() {
        let config = Config {
            sheet_id: Some("abc".to_string()),
            service_account_json: Some("{\"client_email\": 1}".to_string()),
            ..Default::default()
        };
        let err = SourceArgs::default().resolve(&config).unwrap_err();
        assert!(matches!(err, SourceError::MalformedCredentials { .. }));
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            sheet_id: Some("from-config".to_string()),
            range: Some("Old!A:Z".to_string()),
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        let args = SourceArgs {
            sheet_id: Some("from-flag".to_string()),
            range: Some("Stock!A1:F200".to_string()),
            ..Default::default()
        };
        match args.resolve(&config).unwrap() {
            GridSource::Sheets(req) => {
                assert_eq!(req.spreadsheet_id, "from-flag");
                assert_eq!(req.range, "Stock!A1:F200");
                assert_eq!(req.auth, SheetsAuth::ApiKey("key".to_string()));
            }
            other => panic!("expected sheets source, got {:?}", other),
        }
    }

    #[test]
    fn test_load_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("inventory.csv");
        std::fs::write(
            &path,
            "Item ID,Item Name,Type,Stock,Par,Order Amount\nTrailer,,,,,\n,Widget,Tool,5,10,5\n",
        )
        .unwrap();

        let args = SourceArgs {
            file: Some(path),
            ..Default::default()
        };
        let inventory = args.load(&Config::default()).unwrap();
        assert_eq!(inventory.grid.len(), 3);
        assert_eq!(inventory.records.len(), 1);
        assert_eq!(inventory.records[0].location, "Trailer");
    }
}
