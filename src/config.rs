//! Configuration file handling.
//!
//! The configuration file is stored at `$SPEND_DASH_HOME/config.json` and names the data source,
//! the worksheet and columns to read, how long fetched data is cached, and how the table is laid
//! out.

use crate::api::{DEFAULT_COLUMNS, DEFAULT_WORKSHEET};
use crate::cache::DEFAULT_TTL_MINUTES;
use crate::report::{TableOptions, DEFAULT_LOOKBACK_MONTHS};
use crate::{utils, Result};
use anyhow::{anyhow, bail, ensure, Context};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "spend-dash";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const CLIENT_SECRET_JSON: &str = "client_secret.json";
const TOKEN_JSON: &str = "token.json";
const CONFIG_JSON: &str = "config.json";
const SNAPSHOT_SQLITE: &str = "snapshot.sqlite";
const DEFAULT_TIMEZONE: &str = "UTC";

/// Where transactions come from.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// A Google sheet, e.g. `https://docs.google.com/spreadsheets/d/1a7Km9FxQw.../edit`.
    Google { sheet_url: String },
    /// A directory holding one `<worksheet>.csv` export per worksheet. A relative `dir` is resolved
    /// against the home directory.
    Csv { dir: PathBuf },
}

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$SPEND_DASH_HOME` and from there it loads `$SPEND_DASH_HOME/config.json`. It
/// provides paths to other items that are either configurable or are expected in a certain location
/// within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, its `.secrets` subdirectory and an initial `config.json` for
    /// `source` with default settings.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the home directory, e.g. `$HOME/spend-dash`
    /// - `source` - The data source to read transactions from.
    /// - `secret_file` - The downloaded OAuth 2.0 client credentials JSON. It is copied to its
    ///   default location in the secrets directory. Required for a Google source.
    /// - `timezone` - The IANA timezone used to decide what "today" is. Defaults to UTC.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail or if the arguments do not fit together.
    pub async fn create(
        dir: impl Into<PathBuf>,
        source: DataSource,
        secret_file: Option<&Path>,
        timezone: Option<&str>,
    ) -> Result<Self> {
        if let DataSource::Google { sheet_url } = &source {
            let _ = extract_spreadsheet_id(sheet_url)
                .context("Failed to extract spreadsheet ID from sheet URL")?;
            ensure!(
                secret_file.is_some(),
                "A Google sheet needs the OAuth client credentials file, pass --client-secret"
            );
        }
        let timezone = timezone.unwrap_or(DEFAULT_TIMEZONE);
        let _ = parse_timezone(timezone)?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;
        if let Some(secret_file) = secret_file {
            utils::copy(secret_file, secrets.join(CLIENT_SECRET_JSON)).await?;
        }

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            source,
            timezone: timezone.to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            secrets,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load and validate the config file
    /// - validate that the secrets directory exists
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The home directory is missing, run `spend-dash init` first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            secrets: root.join(SECRETS),
            root,
            config_path,
            config_file,
        };
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join(SNAPSHOT_SQLITE)
    }

    pub fn source(&self) -> &DataSource {
        &self.config_file.source
    }

    /// The spreadsheet ID from the sheet URL. Fails when the source is not a Google sheet.
    pub fn spreadsheet_id(&self) -> Result<&str> {
        match &self.config_file.source {
            DataSource::Google { sheet_url } => extract_spreadsheet_id(sheet_url),
            DataSource::Csv { .. } => bail!("The configured data source is not a Google sheet"),
        }
    }

    pub fn worksheet(&self) -> &str {
        &self.config_file.worksheet
    }

    /// The column positions to keep, or `None` to keep every column.
    pub fn columns(&self) -> Option<&[usize]> {
        if self.config_file.columns.is_empty() {
            None
        } else {
            Some(&self.config_file.columns)
        }
    }

    pub fn cache_ttl_minutes(&self) -> u32 {
        self.config_file.cache_ttl_minutes
    }

    pub fn timezone(&self) -> Result<Tz> {
        parse_timezone(&self.config_file.timezone)
    }

    pub fn table_options(&self) -> TableOptions {
        TableOptions::new(self.config_file.lookback_months, self.config_file.reverse)
    }

    /// Returns the stored `client_secret_path` if it is absolute, otherwise resolves the relative path.
    pub fn client_secret_path(&self) -> PathBuf {
        self.resolve(&self.config_file.client_secret_path())
    }

    /// Returns the stored `token_path` if it is absolute, otherwise resolves the relative path.
    pub fn token_path(&self) -> PathBuf {
        self.resolve(&self.config_file.token_path())
    }

    /// Returns `p` unchanged if it is absolute, otherwise joins it to the home directory.
    pub fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            return p.to_path_buf();
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file. Everything
/// except `app_name`, `config_version` and `source` may be left out.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "spend-dash",
///   "config_version": 1,
///   "source": { "google": { "sheet_url": "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJ" } },
///   "worksheet": "Combined",
///   "columns": [0, 2, 3, 4, 5, 6, 7, 8, 9],
///   "cache_ttl_minutes": 10,
///   "timezone": "America/Los_Angeles",
///   "lookback_months": 4,
///   "reverse": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "spend-dash"
    app_name: String,

    config_version: u8,

    source: DataSource,

    #[serde(default = "default_worksheet")]
    worksheet: String,

    /// Zero-based positions of the worksheet columns to keep. Empty keeps all of them.
    #[serde(default = "default_columns")]
    columns: Vec<usize>,

    #[serde(default = "default_cache_ttl_minutes")]
    cache_ttl_minutes: u32,

    /// IANA timezone name
    #[serde(default = "default_timezone")]
    timezone: String,

    #[serde(default = "default_lookback_months")]
    lookback_months: u32,

    /// Show the newest month first
    #[serde(default)]
    reverse: bool,

    /// Path to the OAuth 2.0 client credentials file (optional, relative to the home directory or
    /// absolute). Defaults to $SPEND_DASH_HOME/.secrets/client_secret.json
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_secret_path: Option<PathBuf>,

    /// Path to the OAuth token file (optional, relative to the home directory or absolute).
    /// Defaults to $SPEND_DASH_HOME/.secrets/token.json
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_path: Option<PathBuf>,
}

fn default_worksheet() -> String {
    DEFAULT_WORKSHEET.to_string()
}

fn default_columns() -> Vec<usize> {
    DEFAULT_COLUMNS.to_vec()
}

fn default_cache_ttl_minutes() -> u32 {
    DEFAULT_TTL_MINUTES
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_lookback_months() -> u32 {
    DEFAULT_LOOKBACK_MONTHS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            source: DataSource::Google {
                sheet_url: String::new(),
            },
            worksheet: default_worksheet(),
            columns: default_columns(),
            cache_ttl_minutes: default_cache_ttl_minutes(),
            timezone: default_timezone(),
            lookback_months: default_lookback_months(),
            reverse: false,
            client_secret_path: None,
            token_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads and validates a ConfigFile from the specified path.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            config.lookback_months >= 1,
            "lookback_months must be at least 1 in {}",
            path.display()
        );
        let _ = parse_timezone(&config.timezone)
            .with_context(|| format!("Invalid config file at {}", path.display()))?;

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }

    fn client_secret_path(&self) -> PathBuf {
        self.client_secret_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(CLIENT_SECRET_JSON))
    }

    fn token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(TOKEN_JSON))
    }
}

fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| anyhow!("Unknown timezone '{name}': {e}"))
}

/// Extracts the spreadsheet ID from a Google Sheets URL of the form
/// `https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/...`, ignoring any query or fragment.
fn extract_spreadsheet_id(url: &str) -> Result<&str> {
    let parts: Vec<&str> = url.split('/').collect();
    for (i, part) in parts.iter().enumerate() {
        if *part == "d" && i + 1 < parts.len() {
            let id_part = parts[i + 1];
            let id = id_part
                .split(['?', '#'])
                .next()
                .unwrap_or(id_part);
            ensure!(!id.is_empty(), "The sheet URL '{url}' has an empty spreadsheet ID");
            return Ok(id);
        }
    }
    bail!(
        "Invalid Google Sheets URL format. Expected: \
        https://docs.google.com/spreadsheets/d/SPREADSHEET_ID"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SHEET_URL: &str =
        "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL/edit";

    fn google() -> DataSource {
        DataSource::Google {
            sheet_url: SHEET_URL.to_string(),
        }
    }

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("spend_home");
        let secret_source_file = dir.path().join("x.json");
        utils::write(&secret_source_file, "12345").await.unwrap();

        let config = Config::create(
            &home_dir,
            google(),
            Some(&secret_source_file),
            Some("America/New_York"),
        )
        .await
        .unwrap();

        assert_eq!(
            config.spreadsheet_id().unwrap(),
            "7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL"
        );
        let found_secret_content = utils::read(&config.client_secret_path()).await.unwrap();
        assert_eq!(found_secret_content, "12345");
        assert!(config.secrets().is_dir());
        // The source file is copied, not moved.
        assert!(secret_source_file.is_file());

        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(loaded.source(), &google());
        assert_eq!(loaded.worksheet(), "Combined");
        assert_eq!(loaded.columns(), Some(DEFAULT_COLUMNS));
        assert_eq!(loaded.cache_ttl_minutes(), 10);
        assert_eq!(loaded.timezone().unwrap(), chrono_tz::America::New_York);
        assert_eq!(loaded.table_options(), TableOptions::default());
        assert_eq!(loaded.snapshot_path(), loaded.root().join("snapshot.sqlite"));
        assert_eq!(loaded.token_path(), loaded.secrets().join("token.json"));
    }

    #[tokio::test]
    async fn test_config_create_csv() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(
            dir.path(),
            DataSource::Csv {
                dir: PathBuf::from("exports"),
            },
            None,
            None,
        )
        .await
        .unwrap();
        assert!(config.spreadsheet_id().is_err());
        assert_eq!(config.timezone().unwrap(), Tz::UTC);
        assert_eq!(
            config.resolve(Path::new("exports")),
            config.root().join("exports")
        );
        assert_eq!(config.resolve(Path::new("/abs")), PathBuf::from("/abs"));
    }

    #[tokio::test]
    async fn test_config_create_google_requires_secret() {
        let dir = TempDir::new().unwrap();
        let result = Config::create(dir.path(), google(), None, None).await;
        assert!(result.unwrap_err().to_string().contains("--client-secret"));
    }

    #[tokio::test]
    async fn test_config_create_bad_timezone() {
        let dir = TempDir::new().unwrap();
        let source = DataSource::Csv {
            dir: PathBuf::from("x"),
        };
        let result = Config::create(dir.path(), source, None, Some("Mars/Olympus")).await;
        assert!(result.unwrap_err().to_string().contains("Mars/Olympus"));
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path().join("nope")).await;
        assert!(result.unwrap_err().to_string().contains("spend-dash init"));
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "spend-dash",
            "config_version": 1,
            "source": { "csv": { "dir": "/tmp/exports" } },
            "columns": [],
            "reverse": true
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(
            config.source,
            DataSource::Csv {
                dir: PathBuf::from("/tmp/exports")
            }
        );
        assert!(config.columns.is_empty());
        assert!(config.reverse);
        assert_eq!(config.worksheet, "Combined");
        assert_eq!(config.lookback_months, 4);
        assert_eq!(
            config.client_secret_path(),
            PathBuf::from(SECRETS).join(CLIENT_SECRET_JSON)
        );
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1,
            "source": { "csv": { "dir": "x" } }
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_load_zero_lookback() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "spend-dash",
            "config_version": 1,
            "source": { "csv": { "dir": "x" } },
            "lookback_months": 0
        }"#;
        utils::write(&config_path, json).await.unwrap();
        assert!(ConfigFile::load(&config_path).await.is_err());
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let t = TempDir::new().unwrap();
        let path = t.path().join("file.json");
        let original = ConfigFile {
            source: google(),
            client_secret_path: Some(PathBuf::from(".secrets/my_key.json")),
            reverse: true,
            ..ConfigFile::default()
        };
        original.save(&path).await.unwrap();
        assert_eq!(ConfigFile::load(&path).await.unwrap(), original);

        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("token_path"));
    }

    #[test]
    fn test_extract_spreadsheet_id() {
        assert_eq!(
            extract_spreadsheet_id(SHEET_URL).unwrap(),
            "7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL"
        );
        assert_eq!(
            extract_spreadsheet_id("https://docs.google.com/spreadsheets/d/ABC123?foo=bar")
                .unwrap(),
            "ABC123"
        );
        assert_eq!(
            extract_spreadsheet_id("https://docs.google.com/spreadsheets/d/ABC123#gid=0").unwrap(),
            "ABC123"
        );
        assert!(extract_spreadsheet_id("https://example.com/invalid").is_err());
        assert!(extract_spreadsheet_id("").is_err());
    }
}
