use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use crate::domain::{Credentials, Database, Token};
use crate::error::EnteroError;

pub const DEFAULT_SERVER: &str = "https://enterobase.warwick.ac.uk";
pub const SEARCH_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    api_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssemblySearch {
    #[serde(rename = "Assemblies", default)]
    pub assemblies: Vec<AssemblyRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssemblyRecord {
    #[serde(default)]
    pub download_fasta_link: Option<String>,
}

impl AssemblySearch {
    /// Link of the first returned record; later matches are ignored.
    pub fn first_download_link(&self) -> Option<&str> {
        self.assemblies
            .first()
            .and_then(|record| record.download_fasta_link.as_deref())
            .filter(|link| !link.is_empty())
    }
}

pub trait EnterobaseClient: Send + Sync {
    fn login(&self, credentials: &Credentials) -> Result<Token, EnteroError>;
    fn assemblies_url(&self, database: Database, barcode: &str) -> String;
    fn search_assemblies(&self, token: &Token, query_url: &str)
    -> Result<AssemblySearch, EnteroError>;
    fn download(&self, token: &Token, url: &str) -> Result<Vec<u8>, EnteroError>;
}

/// `Authorization` value Enterobase expects: the token as basic-auth user with an empty password.
pub fn authorization_value(token: &Token) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:", token.as_str())))
}

pub fn login_url(server: &str, credentials: &Credentials) -> String {
    format!(
        "{}/api/v2.0/login?username={}&password={}",
        server.trim_end_matches('/'),
        urlencoding::encode(credentials.username()),
        urlencoding::encode(credentials.password())
    )
}

pub fn assemblies_url(server: &str, database: Database, barcode: &str) -> String {
    format!(
        "{}/api/v2.0/{}/assemblies?barcode={}&limit={}",
        server.trim_end_matches('/'),
        database.as_str(),
        urlencoding::encode(barcode),
        SEARCH_LIMIT
    )
}

#[derive(Clone)]
pub struct EnterobaseHttpClient {
    client: Client,
    server: String,
}

impl EnterobaseHttpClient {
    pub fn new(server: &str) -> Result<Self, EnteroError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("enterobase-fetch/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| EnteroError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| EnteroError::Http(err.to_string()))?;
        Ok(Self {
            client,
            server: server.trim_end_matches('/').to_string(),
        })
    }

    fn authorized(&self, url: &str, token: &Token) -> Result<RequestBuilder, EnteroError> {
        let mut value = HeaderValue::from_str(&authorization_value(token))
            .map_err(|err| EnteroError::InvalidResponse(format!("unusable API token: {err}")))?;
        value.set_sensitive(true);
        Ok(self.client.get(url).header(AUTHORIZATION, value))
    }

    fn send(request: RequestBuilder) -> Result<Response, EnteroError> {
        request
            .send()
            .map_err(|err| EnteroError::Http(err.to_string()))
    }
}

impl EnterobaseClient for EnterobaseHttpClient {
    fn login(&self, credentials: &Credentials) -> Result<Token, EnteroError> {
        debug!(server = %self.server, "requesting API token");
        let response = Self::send(self.client.get(login_url(&self.server, credentials)))?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(EnteroError::Authentication {
                status: status.as_u16(),
                message: status_message(status, response),
            });
        }
        let body: LoginResponse = response
            .json()
            .map_err(|err| EnteroError::InvalidResponse(err.to_string()))?;
        body.api_token
            .filter(|token| !token.is_empty())
            .map(Token::new)
            .ok_or_else(|| {
                EnteroError::InvalidResponse("login response has no api_token".to_string())
            })
    }

    fn assemblies_url(&self, database: Database, barcode: &str) -> String {
        assemblies_url(&self.server, database, barcode)
    }

    fn search_assemblies(
        &self,
        token: &Token,
        query_url: &str,
    ) -> Result<AssemblySearch, EnteroError> {
        debug!(url = query_url, "searching assemblies");
        let response = Self::send(self.authorized(query_url, token)?)?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(EnteroError::Status {
                status: status.as_u16(),
                message: status_message(status, response),
            });
        }
        response
            .json()
            .map_err(|err| EnteroError::InvalidResponse(err.to_string()))
    }

    fn download(&self, token: &Token, url: &str) -> Result<Vec<u8>, EnteroError> {
        debug!(url, "downloading assembly");
        let response = Self::send(self.authorized(url, token)?)?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(EnteroError::Status {
                status: status.as_u16(),
                message: status_message(status, response),
            });
        }
        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(|err| EnteroError::Http(err.to_string()))
    }
}

fn status_message(status: StatusCode, response: Response) -> String {
    let reason = status.canonical_reason().unwrap_or("request failed");
    match response.text() {
        Ok(body) if !body.trim().is_empty() => format!("{reason}: {}", body.trim()),
        _ => reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_is_token_with_empty_password() {
        let token = Token::new("secret");
        // base64("secret:")
        assert_eq!(authorization_value(&token), "Basic c2VjcmV0Og==");
    }

    #[test]
    fn urls_follow_api_layout() {
        let url = assemblies_url("https://example.org/", Database::Senterica, "SAL_AA0001AA_AS");
        assert_eq!(
            url,
            "https://example.org/api/v2.0/senterica/assemblies?barcode=SAL_AA0001AA_AS&limit=50"
        );

        let credentials = Credentials::new("user@lab", "p&ss word");
        assert_eq!(
            login_url("https://example.org", &credentials),
            "https://example.org/api/v2.0/login?username=user%40lab&password=p%26ss%20word"
        );
    }

    #[test]
    fn first_link_wins() {
        let search: AssemblySearch = serde_json::from_str(
            r#"{"Assemblies": [
                {"download_fasta_link": "https://x/1", "barcode": "A"},
                {"download_fasta_link": "https://x/2", "barcode": "B"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(search.first_download_link(), Some("https://x/1"));

        let empty: AssemblySearch = serde_json::from_str(r#"{"Assemblies": []}"#).unwrap();
        assert_eq!(empty.first_download_link(), None);
    }
}
