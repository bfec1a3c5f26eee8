//! Request signing.
//!
//! Private requests carry the API key and secret as headers plus a
//! `timestamp` and `recvWindow`. GET parameters go in the query string,
//! other methods send them as a form body.

use chrono::Utc;

use bourse_exchange::{ExchangeError, ExchangeResult, HttpMethod, SignedRequest};

use super::client::{Binance, Query};
use super::endpoints::ApiClass;
use super::ID;

const API_KEY_HEADER: &str = "X-MBX-APIKEY";
const API_SECRET_HEADER: &str = "X-MBX-APISECRET";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

fn encode(params: &Query) -> ExchangeResult<String> {
    serde_urlencoded::to_string(params)
        .map_err(|e| ExchangeError::BadRequest(format!("{} could not encode parameters: {}", ID, e)))
}

fn with_query(url: String, encoded: &str) -> String {
    if encoded.is_empty() {
        url
    } else {
        format!("{}?{}", url, encoded)
    }
}

impl Binance {
    /// Build the request for `path` on the host of `api`.
    ///
    /// # Errors
    /// `Authentication` if the class is private and credentials are
    /// missing or incomplete
    pub fn sign(
        &self,
        path: &str,
        api: ApiClass,
        method: HttpMethod,
        params: &Query,
    ) -> ExchangeResult<SignedRequest> {
        let url = format!("{}{}", api.base_url(self.is_sandbox()), path);

        if !api.is_private() {
            return Ok(SignedRequest {
                url: with_query(url, &encode(params)?),
                method,
                body: None,
                headers: Vec::new(),
            });
        }

        let credentials = self
            .credentials()
            .filter(|c| c.is_complete())
            .ok_or_else(|| {
                ExchangeError::Authentication(format!("{} requires apiKey and secret credentials", ID))
            })?;

        let mut params = params.clone();
        params
            .entry("timestamp".to_string())
            .or_insert_with(|| Utc::now().timestamp_millis().to_string());
        params
            .entry("recvWindow".to_string())
            .or_insert_with(|| self.options().recv_window.to_string());
        let encoded = encode(&params)?;

        let mut headers = vec![
            (API_KEY_HEADER.to_string(), credentials.api_key.clone()),
            (API_SECRET_HEADER.to_string(), credentials.api_secret.as_str().to_string()),
        ];

        let (url, body) = match method {
            HttpMethod::Get => (with_query(url, &encoded), None),
            _ => {
                headers.push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
                (url, Some(encoded))
            },
        };

        Ok(SignedRequest { url, method, body, headers })
    }
}
