pub mod auth;
pub mod pipeline;
pub mod stats;

use jiff::civil::Date;
use thiserror::Error;

use crate::interval::month::Month;

/// Everything that can go wrong while talking to the Solarman API.  Each
/// variant names the stage that failed; a run either produces the complete
/// table or one of these.
#[derive(Error, Debug)]
pub enum SolarmanError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("organization lookup failed: {0}")]
    OrgResolution(String),
    #[error("failed to fetch month {month}: {reason}")]
    Fetch { month: Month, reason: String },
    #[error("unexpected response shape: {0}")]
    DataShape(String),
    #[error("invalid date range: end {1} is before start {0}")]
    InvalidRange(Date, Date),
}

/// Client for the Solarman professional API.  The login service and the
/// data service live on different hosts.
#[derive(Clone)]
pub struct SolarmanClient {
    pub login_url: String,
    pub api_url: String,
}

impl SolarmanClient {
    pub fn prod() -> SolarmanClient {
        SolarmanClient {
            login_url: "https://login-pro.solarmanpv.com".to_string(),
            api_url: "https://pro.solarmanpv.com".to_string(),
        }
    }
}
