use futures::future::try_join_all;
use jiff::civil::Date;
use log::info;
use serde_json::Value;

use crate::interval::month::Month;
use crate::solarman::stats::{flatten, DailyRecord};
use crate::solarman::{SolarmanClient, SolarmanError};

impl SolarmanClient {
    /// Fetch the monthly payloads covering `[start, end]`, one request per
    /// calendar month, all in flight at once.  The output is in month order,
    /// not completion order.  The first failure fails the whole call.
    pub async fn fetch_range(
        &self,
        token: &str,
        start: Date,
        end: Date,
    ) -> Result<Vec<Value>, SolarmanError> {
        let months = Month::containing(start)
            .up_to(Month::containing(end))
            .ok_or(SolarmanError::InvalidRange(start, end))?;
        info!("fetching {} months of generation history ...", months.len());
        try_join_all(months.iter().map(|month| self.fetch_month(token, *month))).await
    }

    /// Run the whole pipeline: log in, discover the organization, log in
    /// again with organization scope, download every month of `[start, end]`
    /// concurrently, and flatten the payloads into daily records.
    pub async fn download_generation(
        &self,
        username: &str,
        clear_text_pwd: &str,
        start: Date,
        end: Date,
    ) -> Result<Vec<DailyRecord>, SolarmanError> {
        let token = self.acquire_token(username, clear_text_pwd, None).await?;
        let org_id = self.find_org_id(&token).await?;
        let token = self
            .acquire_token(username, clear_text_pwd, Some(&org_id))
            .await?;
        let payloads = self.fetch_range(&token, start, end).await?;
        let records = flatten(payloads)?;
        info!("downloaded {} daily records", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::error::Error;
    use std::path::Path;

    use jiff::civil::date;
    use log::info;

    use crate::solarman::SolarmanClient;

    #[ignore]
    #[tokio::test]
    async fn download_live() -> Result<(), Box<dyn Error>> {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Info)
            .is_test(true)
            .try_init();
        dotenvy::from_path(Path::new(".env/test.env")).unwrap();
        let username = env::var("SOLARMAN_USER")?;
        let password = env::var("SOLARMAN_PASSWORD")?;
        let client = SolarmanClient::prod();
        let records = client
            .download_generation(&username, &password, date(2023, 1, 15), date(2023, 2, 10))
            .await?;
        info!("got {} daily records", records.len());
        assert!(!records.is_empty());
        Ok(())
    }
}
