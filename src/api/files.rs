//! The two JSON files behind Google authentication, both kept in the secrets directory:
//! - `client_secret.json`, the "Desktop app" OAuth client downloaded from the Google Cloud console
//! - `token.json`, written by `spend-dash auth` and rewritten on every token refresh

use crate::api::OAUTH_SCOPES;
use crate::{utils, Result};
use anyhow::{bail, Context};
use chrono::{DateTime, Duration, Utc};
use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// The loopback redirect the OAuth client must allow. The callback server adds its port to it.
pub(super) const REDIRECT: &str = "http://localhost";

/// JSON data paired with the file it lives in.
#[derive(Default, Debug, Clone)]
pub(super) struct File<F>
where
    F: Serialize + DeserializeOwned + Clone + Debug,
{
    path: PathBuf,
    data: F,
}

impl<F> File<F>
where
    F: Serialize + DeserializeOwned + Clone + Debug,
{
    pub(super) async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data: F = utils::deserialize(&path).await?;
        Ok(Self { path, data })
    }

    pub(super) fn new(path: impl Into<PathBuf>, data: F) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    /// Writes the data as pretty JSON. The file is only readable by the owner on Unix.
    pub(super) async fn save(&self) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.data).context("Unable to serialize to JSON")?;
        utils::write(&self.path, json).await?;

        #[cfg(unix)]
        {
            use std::fs::Permissions;
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, Permissions::from_mode(0o600))
                .await
                .with_context(|| format!("Unable to restrict access to {}", self.path.display()))?;
        }

        Ok(())
    }

    pub(super) fn data(&self) -> &F {
        &self.data
    }

    pub(super) fn data_mut(&mut self) -> &mut F {
        &mut self.data
    }

    pub(super) fn path(&self) -> &Path {
        &self.path
    }
}

/// The OAuth client credentials. Google nests them under an `installed` key for desktop clients,
/// next to `client_id`, `client_secret`, `redirect_uris`, `auth_uri` and `token_uri`.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) struct SecretFile {
    installed: Installed,
}

impl SecretFile {
    pub(crate) async fn load(path: &Path) -> Result<SecretFile> {
        utils::deserialize(path)
            .await
            .context("Unable to read the OAuth client secret file")
    }

    pub(super) fn client_id(&self) -> &str {
        &self.installed.client_id
    }

    pub(super) fn client_secret(&self) -> &str {
        &self.installed.client_secret
    }

    pub(super) fn auth_uri(&self) -> &str {
        &self.installed.auth_uri
    }

    pub(super) fn token_uri(&self) -> &str {
        &self.installed.token_uri
    }
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct Installed {
    client_id: String,
    client_secret: String,
    /// Must contain `http://localhost` (without a port number).
    #[serde(deserialize_with = "deserialize_redirects")]
    redirect_uris: Vec<String>,
    auth_uri: String,
    token_uri: String,
}

fn deserialize_redirects<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let redirects = Vec::<String>::deserialize(deserializer)?;
    if !redirects.iter().any(|s| is_valid_redirect(s)) {
        return Err(D::Error::custom(format!(
            "The OAuth client does not allow the redirect {REDIRECT}. Add it to the client's \
            authorized redirect URIs in the Google Cloud console and download the file again"
        )));
    }
    Ok(redirects)
}

fn is_valid_redirect(s: &str) -> bool {
    matches!(s, REDIRECT | "http://127.0.0.1")
}

/// The tokens we receive from Google OAuth, in a shape of our own choosing.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(super) struct TokenFile {
    scopes: Vec<String>,
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl TokenFile {
    /// Loads the token file and checks that it was granted every scope we need.
    pub(super) async fn load(p: impl AsRef<Path>) -> Result<File<Self>> {
        let file: File<Self> = File::load(p.as_ref())
            .await
            .context("Unable to read the OAuth token file")?;
        if let Some(scope) = file.data().missing_scope() {
            bail!("The OAuth token lacks the scope '{scope}', run `spend-dash auth` again");
        }
        Ok(file)
    }

    fn missing_scope(&self) -> Option<&'static str> {
        OAUTH_SCOPES
            .iter()
            .copied()
            .find(|required| !self.scopes.iter().any(|granted| granted.as_str() == *required))
    }

    pub(super) fn new(
        scopes: Vec<String>,
        access_token: String,
        refresh_token: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            scopes,
            access_token,
            refresh_token,
            expires_at,
        }
    }

    pub(super) fn access_token(&self) -> &str {
        &self.access_token
    }

    pub(super) fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub(super) fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True if the token has expired at `now` or will within five minutes.
    pub(super) fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now + Duration::minutes(5)
    }

    /// Google only sends a new refresh token occasionally; keep the old one otherwise.
    pub(super) fn update(
        &mut self,
        access_token: String,
        expires_at: DateTime<Utc>,
        refresh_token: Option<String>,
    ) {
        self.access_token = access_token;
        self.expires_at = expires_at;
        if let Some(rt) = refresh_token {
            self.refresh_token = rt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn secret_json(redirect: &str) -> String {
        format!(
            r#"
{{
    "installed": {{
        "client_id": "1234-abcd.apps.googleusercontent.com",
        "client_secret": "s3cret",
        "redirect_uris": ["{redirect}", "https://example.com:4040/whatever"],
        "auth_uri": "https://accounts.google.com/o/oauth2/auth",
        "token_uri": "https://oauth2.googleapis.com/token"
    }}
}}
"#
        )
    }

    #[tokio::test]
    async fn test_secret_file_loopback_redirects() {
        for redirect in ["http://localhost", "http://127.0.0.1"] {
            let temp_dir = TempDir::new().unwrap();
            let p = temp_dir.path().join("file.json");
            utils::write(&p, secret_json(redirect)).await.unwrap();
            let secret_file = SecretFile::load(&p).await.unwrap();
            assert_eq!(
                secret_file.client_id(),
                "1234-abcd.apps.googleusercontent.com"
            );
            assert_eq!(secret_file.token_uri(), "https://oauth2.googleapis.com/token");
        }
    }

    #[tokio::test]
    async fn test_secret_file_redirect_with_port() {
        let temp_dir = TempDir::new().unwrap();
        let p = temp_dir.path().join("file.json");
        utils::write(&p, secret_json("http://localhost:9900"))
            .await
            .unwrap();
        let err = SecretFile::load(&p).await.unwrap_err();
        assert!(format!("{err:#}").contains("does not allow the redirect http://localhost"));
    }

    #[tokio::test]
    async fn test_token_file_missing_scope() {
        let json = r##"
        {
            "scopes": ["https://www.googleapis.com/auth/drive.readonly"],
            "access_token": "abc12",
            "refresh_token": "xyz89",
            "expires_at": "2025-01-01T00:00:00Z"
        }
        "##;
        let tmp = TempDir::new().unwrap();
        let json_path = tmp.path().join("file.json");
        utils::write(&json_path, json).await.unwrap();

        let error_message = TokenFile::load(&json_path).await.unwrap_err().to_string();
        assert!(error_message.contains(OAUTH_SCOPES[0]));
    }

    #[tokio::test]
    async fn test_token_file_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let json_path = tmp.path().join("token.json");
        let expires_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let token = TokenFile::new(
            OAUTH_SCOPES.iter().map(|s| s.to_string()).collect(),
            "abc12".to_string(),
            "xyz89".to_string(),
            expires_at,
        );
        File::new(&json_path, token).save().await.unwrap();

        let mut file = TokenFile::load(&json_path).await.unwrap();
        assert_eq!(file.path(), json_path.as_path());
        assert_eq!(file.data().access_token(), "abc12");
        assert_eq!(file.data().expires_at(), expires_at);

        file.data_mut()
            .update("new".to_string(), expires_at + Duration::hours(1), None);
        assert_eq!(file.data().refresh_token(), "xyz89");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&json_path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_token_is_expired() {
        let expires_at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let token = TokenFile::new(vec![], String::new(), String::new(), expires_at);
        assert!(!token.is_expired(expires_at - Duration::minutes(6)));
        assert!(token.is_expired(expires_at - Duration::minutes(4)));
        assert!(token.is_expired(expires_at + Duration::minutes(1)));
    }
}
