//! OAuth 2.0 for the Google Sheets API.
//!
//! - The consent flow runs a one-shot HTTP server on a loopback port to receive the authorization
//!   code, then exchanges it for tokens and saves them to `token.json`.
//! - `TokenProvider` hands out the access token and refreshes it shortly before it expires.

use crate::api::files::{File, SecretFile, TokenFile, REDIRECT};
use crate::api::OAUTH_SCOPES;
use crate::Result;
use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, Duration, Utc};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, RedirectUrl, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use std::collections::HashMap;
use std::convert::Infallible;
use std::path::Path;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Google assumes an hour when a token response does not say.
const DEFAULT_EXPIRY_SECONDS: i64 = 3600;

const CALLBACK_PAGE: &str = "spend-dash is authorized. You can close this window.";

type GoogleClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Holds the client credentials and the saved tokens, and refreshes the access token when needed.
pub(crate) struct TokenProvider {
    secret: SecretFile,
    token: File<TokenFile>,
}

impl TokenProvider {
    /// Loads credentials and tokens saved by a previous consent flow.
    pub(crate) async fn load(secret_path: &Path, token_path: &Path) -> Result<Self> {
        let secret = SecretFile::load(secret_path).await?;
        let token = TokenFile::load(token_path).await.with_context(|| {
            format!(
                "Unable to load the OAuth token at {}, run `spend-dash auth` first",
                token_path.display()
            )
        })?;
        Ok(Self { secret, token })
    }

    /// Runs the consent flow in the browser and saves the resulting tokens to `token_path`.
    pub(crate) async fn initialize(secret_path: &Path, token_path: &Path) -> Result<Self> {
        let secret = SecretFile::load(secret_path).await?;
        let listener = TcpListener::bind(("127.0.0.1", 0))
            .await
            .context("Unable to bind a local port for the OAuth callback")?;
        let port = listener
            .local_addr()
            .context("Unable to read the OAuth callback address")?
            .port();
        let redirect = format!("{REDIRECT}:{port}");
        let client = google_client(&secret)?.set_redirect_uri(
            RedirectUrl::new(redirect.clone()).context("Invalid OAuth redirect URL")?,
        );

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf) = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(OAUTH_SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .set_pkce_challenge(pkce_challenge)
            .url();

        info!("Open this URL in your browser to authorize spend-dash:\n\n{auth_url}\n");
        info!("Waiting for the OAuth callback on {redirect}");
        let params = receive_callback(listener).await?;
        let code = authorization_code(&params, csrf.secret())?;

        let response = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http_client()?)
            .await
            .context("Failed to exchange the authorization code for tokens")?;
        let refresh_token = response
            .refresh_token()
            .map(|t| t.secret().to_string())
            .context("Google did not return a refresh token")?;
        let token = TokenFile::new(
            granted_scopes(&response),
            response.access_token().secret().to_string(),
            refresh_token,
            expires_at(&response, Utc::now()),
        );
        let token = File::new(token_path, token);
        token.save().await?;
        info!("Tokens saved to {}", token_path.display());
        Ok(Self { secret, token })
    }

    /// The current access token, which may have expired.
    pub(crate) fn token(&self) -> &str {
        self.token.data().access_token()
    }

    /// The access token, refreshed first if it expires within five minutes.
    pub(crate) async fn token_with_refresh(&mut self) -> Result<&str> {
        if self.token.data().is_expired(Utc::now()) {
            self.refresh().await?;
        }
        Ok(self.token())
    }

    /// Exchanges the refresh token for a new access token and saves it.
    pub(crate) async fn refresh(&mut self) -> Result<()> {
        debug!("Refreshing the OAuth access token");
        let client = google_client(&self.secret)?;
        let refresh_token = RefreshToken::new(self.token.data().refresh_token().to_string());
        let response = client
            .exchange_refresh_token(&refresh_token)
            .request_async(&http_client()?)
            .await
            .context("Failed to refresh the OAuth access token, try `spend-dash auth`")?;
        let now = Utc::now();
        self.token.data_mut().update(
            response.access_token().secret().to_string(),
            expires_at(&response, now),
            response.refresh_token().map(|t| t.secret().to_string()),
        );
        self.token.save().await
    }
}

fn google_client(secret: &SecretFile) -> Result<GoogleClient> {
    Ok(BasicClient::new(ClientId::new(secret.client_id().to_string()))
        .set_client_secret(ClientSecret::new(secret.client_secret().to_string()))
        .set_auth_uri(AuthUrl::new(secret.auth_uri().to_string()).context("Invalid auth_uri")?)
        .set_token_uri(TokenUrl::new(secret.token_uri().to_string()).context("Invalid token_uri")?))
}

/// An HTTP client that does not follow redirects.
fn http_client() -> Result<reqwest::Client> {
    reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("Unable to build the HTTP client")
}

fn expires_at(response: &BasicTokenResponse, now: DateTime<Utc>) -> DateTime<Utc> {
    let seconds = response
        .expires_in()
        .and_then(|d| i64::try_from(d.as_secs()).ok())
        .unwrap_or(DEFAULT_EXPIRY_SECONDS);
    now + Duration::seconds(seconds)
}

fn granted_scopes(response: &BasicTokenResponse) -> Vec<String> {
    match response.scopes() {
        Some(scopes) => scopes.iter().map(|s| s.as_str().to_string()).collect(),
        None => OAUTH_SCOPES.iter().map(|s| s.to_string()).collect(),
    }
}

/// Serves the loopback redirect until a request arrives, and returns its query parameters.
async fn receive_callback(listener: TcpListener) -> Result<HashMap<String, String>> {
    let (tx, mut rx) = mpsc::channel::<HashMap<String, String>>(1);
    let server = tokio::spawn(async move {
        loop {
            let stream = match listener.accept().await {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!("Failed to accept the OAuth callback connection: {e}");
                    continue;
                }
            };
            let tx = tx.clone();
            let service = service_fn(move |req: Request<Incoming>| {
                let tx = tx.clone();
                async move {
                    let params = parse_query(req.uri().query().unwrap_or_default());
                    if !params.is_empty() {
                        let _ = tx.send(params).await;
                    }
                    Ok::<_, Infallible>(Response::new(CALLBACK_PAGE.to_string()))
                }
            });
            let _ = tokio::spawn(async move {
                if let Err(e) = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await
                {
                    debug!("OAuth callback connection ended: {e}");
                }
            });
        }
    });

    let params = rx.recv().await;
    server.abort();
    params.ok_or_else(|| anyhow!("The OAuth callback server stopped before it was called"))
}

fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Pulls the authorization code out of the callback parameters after checking the CSRF state.
fn authorization_code(params: &HashMap<String, String>, state: &str) -> Result<String> {
    if let Some(error) = params.get("error") {
        bail!("Authorization was denied: {error}");
    }
    match params.get("state") {
        Some(found) if found == state => {}
        _ => bail!("The OAuth callback state did not match, the request may have been forged"),
    }
    params
        .get("code")
        .cloned()
        .context("The OAuth callback did not include an authorization code")
}
