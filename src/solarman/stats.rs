use std::error::Error;
use std::io::Write;

use jiff::civil::Date;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::interval::month::Month;
use crate::solarman::{SolarmanClient, SolarmanError};

/// One day of generation for the account.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyRecord {
    pub date: Date,
    #[serde(rename = "kWh")]
    pub kwh: f64,
    pub full_power_hours: f64,
}

#[derive(Debug, Deserialize)]
struct MonthlyPayload {
    items: Vec<DailyItem>,
}

#[derive(Debug, Deserialize)]
struct DailyItem {
    year: i16,
    month: i8,
    day: i8,
    #[serde(rename = "generationValue")]
    generation_value: f64,
    #[serde(rename = "fullPowerHoursDay")]
    full_power_hours_day: f64,
}

impl SolarmanClient {
    /// Download the daily generation statistics for one month.  Returns the
    /// raw payload; `flatten` validates the shape later.
    pub async fn fetch_month(&self, token: &str, month: Month) -> Result<Value, SolarmanError> {
        let url = format!("{}/maintain-s/history/power/stats/month", self.api_url);
        info!("fetching month {} ...", month);
        let client = reqwest::Client::new();
        let response = client
            .post(&url)
            .query(&[
                ("year", month.year().to_string()),
                ("month", month.month().to_string()),
            ])
            .bearer_auth(token)
            // the endpoint insists on a json body even though it carries nothing
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| SolarmanError::Fetch {
                month,
                reason: e.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(SolarmanError::Fetch {
                month,
                reason: format!("status {}", response.status()),
            });
        }
        let payload: Value = response.json().await.map_err(|e| SolarmanError::Fetch {
            month,
            reason: e.to_string(),
        })?;
        Ok(payload)
    }
}

/// Merge the monthly payloads into one table of daily records, in payload
/// order.  Every item carries its own date, which is taken at face value; an
/// item that does not decode, or one with an impossible date, fails the whole
/// merge.
pub fn flatten(payloads: Vec<Value>) -> Result<Vec<DailyRecord>, SolarmanError> {
    let mut records = Vec::new();
    for payload in payloads {
        let monthly: MonthlyPayload =
            serde_json::from_value(payload).map_err(|e| SolarmanError::DataShape(e.to_string()))?;
        for item in monthly.items {
            let date = Date::new(item.year, item.month, item.day)
                .map_err(|e| SolarmanError::DataShape(format!("invalid item date: {}", e)))?;
            records.push(DailyRecord {
                date,
                kwh: item.generation_value,
                full_power_hours: item.full_power_hours_day,
            });
        }
    }
    Ok(records)
}

/// Write the table as csv, header line first.
pub fn write_csv<W: Write>(records: &[DailyRecord], writer: W) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use jiff::civil::{date, Date};
    use serde_json::json;

    use super::*;
    use crate::solarman::SolarmanError;

    #[test]
    fn test_flatten_empty() {
        assert!(flatten(vec![]).unwrap().is_empty());
        assert!(flatten(vec![json!({"items": []})]).unwrap().is_empty());
    }

    #[test]
    fn test_flatten_one_item() {
        let payload = json!({
            "items": [
                {"year": 2023, "month": 5, "day": 1,
                 "generationValue": 12.3, "fullPowerHoursDay": 4.1}
            ]
        });
        let records = flatten(vec![payload]).unwrap();
        assert_eq!(
            records,
            vec![DailyRecord {
                date: date(2023, 5, 1),
                kwh: 12.3,
                full_power_hours: 4.1
            }]
        );
    }

    #[test]
    fn test_flatten_keeps_order() {
        let jan = json!({"items": [
            {"year": 2023, "month": 1, "day": 30, "generationValue": 1.0, "fullPowerHoursDay": 0.5},
            {"year": 2023, "month": 1, "day": 31, "generationValue": 2.0, "fullPowerHoursDay": 1.0},
        ]});
        let feb = json!({"items": [
            {"year": 2023, "month": 2, "day": 1, "generationValue": 3.0, "fullPowerHoursDay": 1.5},
        ]});
        let records = flatten(vec![jan, feb]).unwrap();
        let dates: Vec<Date> = records.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![date(2023, 1, 30), date(2023, 1, 31), date(2023, 2, 1)]
        );
    }

    #[test]
    fn test_flatten_rejects_missing_field() {
        let payload = json!({"items": [
            {"year": 2023, "month": 5, "day": 1, "generationValue": 12.3}
        ]});
        assert!(matches!(
            flatten(vec![payload]),
            Err(SolarmanError::DataShape(_))
        ));
    }

    #[test]
    fn test_flatten_rejects_missing_items() {
        let payload = json!({"total": 31});
        assert!(matches!(
            flatten(vec![payload]),
            Err(SolarmanError::DataShape(_))
        ));
    }

    #[test]
    fn test_flatten_rejects_impossible_date() {
        let payload = json!({"items": [
            {"year": 2023, "month": 2, "day": 30, "generationValue": 1.0, "fullPowerHoursDay": 0.0}
        ]});
        assert!(matches!(
            flatten(vec![payload]),
            Err(SolarmanError::DataShape(_))
        ));
    }

    #[test]
    fn test_write_csv() -> Result<(), Box<dyn Error>> {
        let records = vec![
            DailyRecord {
                date: date(2023, 5, 1),
                kwh: 12.3,
                full_power_hours: 4.1,
            },
            DailyRecord {
                date: date(2023, 5, 2),
                kwh: 0.0,
                full_power_hours: 0.0,
            },
        ];
        let mut buf = Vec::new();
        write_csv(&records, &mut buf)?;
        let text = String::from_utf8(buf)?;
        assert_eq!(
            text,
            "date,kWh,full_power_hours\n2023-05-01,12.3,4.1\n2023-05-02,0.0,0.0\n"
        );
        Ok(())
    }
}
