//! Implements the `Sheet` trait using the `sheets::Client` to read a Google sheet.

use crate::api::{Sheet, TokenProvider};
use crate::Result;
use anyhow::Context;
use sheets::types::{DateTimeRenderOption, Dimension, ValueRenderOption};
use sheets::ClientError;
use tracing::trace;

/// Reads a Google sheet. It takes a `TokenProvider`, on which it calls refresh to keep the token
/// up-to-date.
pub(crate) struct GoogleSheet {
    spreadsheet_id: String,
    token_provider: TokenProvider,
}

impl GoogleSheet {
    pub(crate) fn new(spreadsheet_id: impl Into<String>, token_provider: TokenProvider) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            token_provider,
        }
    }

    /// A client holding an access token that is good for at least a few more minutes.
    async fn client(&mut self) -> Result<sheets::Client> {
        let access_token = self.token_provider.token_with_refresh().await?;

        // The client wants OAuth app settings too, but only the access token is used for API calls,
        // and refreshing is handled by `TokenProvider`.
        Ok(sheets::Client::new(
            String::new(),
            String::new(),
            String::new(),
            access_token.to_string(),
            String::new(),
        ))
    }
}

#[async_trait::async_trait]
impl Sheet for GoogleSheet {
    async fn get(&mut self, sheet_name: &str) -> Result<Vec<Vec<String>>> {
        trace!("get for {sheet_name}");
        let client = self.client().await?;
        let range = format!("{sheet_name}!A:ZZ");
        let response = client
            .spreadsheets()
            .values_get(
                &self.spreadsheet_id,
                &range,
                DateTimeRenderOption::FormattedString,
                Dimension::Rows,
                ValueRenderOption::FormattedValue,
            )
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to fetch {sheet_name} sheet data"))?;
        Ok(response.body.values)
    }
}

/// Names the variant in the error chain, since some `ClientError` variants display very little.
fn map_client_error(e: ClientError) -> anyhow::Error {
    let error_name = match &e {
        ClientError::EmptyRefreshToken => "EmptyRefreshToken".to_string(),
        ClientError::FromUtf8Error(inner) => format!("FromUtf8Error {inner}"),
        ClientError::UrlParserError(inner) => format!("UrlParserError {inner}"),
        ClientError::SerdeJsonError(inner) => format!("SerdeJsonError {inner}"),
        ClientError::ReqwestError(inner) => format!("ReqwestError {inner}"),
        ClientError::InvalidHeaderValue(inner) => format!("InvalidHeaderValue {inner}"),
        ClientError::ReqwestMiddleWareError(inner) => format!("ReqwestMiddleWareError {inner}"),
        ClientError::HttpError { .. } => "HttpError".to_string(),
        ClientError::Other(_) => "Other".to_string(),
    };
    anyhow::Error::from(e).context(error_name)
}
