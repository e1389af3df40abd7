use log::info;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::solarman::{SolarmanClient, SolarmanError};

/// Lowercase hex SHA-256 digest of the password, as the login endpoint
/// expects in its `password` field.
pub fn sha256_hex(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Body of the password-grant login request.  The endpoint wants the hashed
/// and the clear-text password side by side; `org_id` goes in only for the
/// second, organization-scoped login.
pub fn login_form<'a>(
    username: &'a str,
    password_hash: &'a str,
    clear_text_pwd: &'a str,
    org_id: Option<&'a str>,
) -> Vec<(&'static str, &'a str)> {
    let mut form = vec![
        ("grant_type", "password"),
        ("identity_type", "2"),
        ("username", username),
        ("password", password_hash),
        ("clear_text_pwd", clear_text_pwd),
        ("client_id", "test"),
    ];
    if let Some(org_id) = org_id {
        form.push(("org_id", org_id));
    }
    form
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrgMembership {
    org: OrgRef,
}

#[derive(Debug, Deserialize)]
struct OrgRef {
    id: OrgId,
}

/// The backend sends numeric organization ids today.  Accept a string too,
/// and normalize to a string on our side.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OrgId {
    Number(u64),
    Text(String),
}

impl OrgId {
    fn into_string(self) -> String {
        match self {
            OrgId::Number(id) => id.to_string(),
            OrgId::Text(id) => id,
        }
    }
}

impl SolarmanClient {
    /// Exchange the account credentials for a bearer token.  Called once
    /// without an `org_id` and again with the id returned by `find_org_id`;
    /// only the second token can read generation data.
    pub async fn acquire_token(
        &self,
        username: &str,
        clear_text_pwd: &str,
        org_id: Option<&str>,
    ) -> Result<String, SolarmanError> {
        let url = format!("{}/oauth-s/oauth/token", self.login_url);
        let password_hash = sha256_hex(clear_text_pwd);
        let form = login_form(username, &password_hash, clear_text_pwd, org_id);
        match org_id {
            Some(_) => info!("logging in user {} with organization scope ...", username),
            None => info!("logging in user {} ...", username),
        }
        let client = reqwest::Client::new();
        let response = client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| SolarmanError::Auth(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SolarmanError::Auth(format!(
                "login returned status {}",
                response.status()
            )));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SolarmanError::Auth(e.to_string()))?;
        token
            .access_token
            .ok_or_else(|| SolarmanError::Auth("no access_token in login response".to_string()))
    }

    /// Look up the organization the account belongs to.  Accounts can in
    /// principle belong to several; the first membership wins, like the web
    /// frontend does.
    pub async fn find_org_id(&self, token: &str) -> Result<String, SolarmanError> {
        let url = format!("{}/user-s/acc/org/my", self.login_url);
        let client = reqwest::Client::new();
        let response = client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SolarmanError::OrgResolution(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SolarmanError::OrgResolution(format!(
                "organization endpoint returned status {}",
                response.status()
            )));
        }
        let memberships: Vec<OrgMembership> = response
            .json()
            .await
            .map_err(|e| SolarmanError::OrgResolution(e.to_string()))?;
        let first = memberships.into_iter().next().ok_or_else(|| {
            SolarmanError::OrgResolution("account belongs to no organization".to_string())
        })?;
        let org_id = first.org.id.into_string();
        info!("account belongs to organization {}", org_id);
        Ok(org_id)
    }
}
