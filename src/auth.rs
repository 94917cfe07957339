use tracing::info;

use crate::domain::{Credentials, Token};
use crate::enterobase::EnterobaseClient;
use crate::error::EnteroError;

/// Holds the login pair and the session token obtained with it.
///
/// The token is requested on the first call to [`TokenManager::token`] and
/// reused for the rest of the run. A failed login is returned as
/// [`EnteroError::Authentication`] and nothing is cached.
pub struct TokenManager {
    credentials: Credentials,
    token: Option<Token>,
}

impl TokenManager {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            token: None,
        }
    }

    pub fn token<C: EnterobaseClient>(&mut self, client: &C) -> Result<&Token, EnteroError> {
        match self.token {
            Some(ref token) => Ok(token),
            None => {
                info!("retrieving an API token from Enterobase");
                let token = client.login(&self.credentials)?;
                info!("API token acquired");
                Ok(self.token.insert(token))
            }
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}
