//! Typed client profiles assembled from the raw snapshot row.
//!
//! Each field is read explicitly by column name; one-hot encoded groups are
//! decoded back to their category label. Field names serialize to the keys
//! the dashboard consumes.

use crate::dataset::ClientDataset;
use chrono::{Duration, NaiveDate};
use credrisk_core::Result;
use serde::Serialize;

/// Demographic half of a client's profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalProfile {
    pub gender: String,
    pub count_children: i64,
    pub age: i64,
    pub birthday: String,
    pub own_car: String,
    pub own_realty: String,
    pub civil_status: String,
    pub education_type: String,
}

impl PersonalProfile {
    /// `today` anchors the day-offset columns (`DAYS_BIRTH` counts backwards
    /// from the application date).
    pub fn from_dataset(dataset: &ClientDataset, client_id: u64, today: NaiveDate) -> Result<Self> {
        let days_birth = dataset.value_or_zero(client_id, "DAYS_BIRTH")?;
        let gender = match dataset.value_or_zero(client_id, "CODE_GENDER")? {
            g if g == 1.0 => "F",
            _ => "M",
        };

        Ok(Self {
            gender: gender.to_string(),
            count_children: dataset.value_or_zero(client_id, "CNT_CHILDREN")? as i64,
            age: (days_birth / -365.0).round() as i64,
            birthday: offset_date(today, days_birth),
            own_car: yes_no(dataset.value_or_zero(client_id, "FLAG_OWN_CAR")?),
            own_realty: yes_no(dataset.value_or_zero(client_id, "FLAG_OWN_REALTY")?),
            civil_status: decode_one_hot(dataset, client_id, "NAME_FAMILY_STATUS_")?,
            education_type: decode_one_hot(dataset, client_id, "NAME_EDUCATION_TYPE_")?,
        })
    }
}

/// Financial half of a client's profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankProfile {
    pub total_income: f64,
    pub seniority: i64,
    pub registration_since: String,
    pub income_type: String,
    pub amt_credit: f64,
    pub length_credit: i64,
    pub annual_credit: f64,
    pub payment_rate: f64,
    pub credit_income_ratio: f64,
    pub ext_source1: f64,
    pub ext_source2: f64,
    pub ext_source3: f64,
}

impl BankProfile {
    pub fn from_dataset(dataset: &ClientDataset, client_id: u64, today: NaiveDate) -> Result<Self> {
        let credit = dataset.value_or_zero(client_id, "AMT_CREDIT")?;
        let annuity = dataset.value_or_zero(client_id, "AMT_ANNUITY")?;
        let length_credit = if annuity > 0.0 {
            (12.0 * credit / annuity).round() as i64
        } else {
            0
        };

        Ok(Self {
            total_income: dataset.value_or_zero(client_id, "AMT_INCOME_TOTAL")?,
            seniority: (dataset.value_or_zero(client_id, "DAYS_EMPLOYED")? / -365.0).round()
                as i64,
            registration_since: offset_date(
                today,
                dataset.value_or_zero(client_id, "DAYS_REGISTRATION")?,
            ),
            income_type: decode_one_hot(dataset, client_id, "NAME_INCOME_TYPE_")?,
            amt_credit: credit,
            length_credit,
            annual_credit: annuity,
            payment_rate: round2(100.0 * dataset.value_or_zero(client_id, "PAYMENT_RATE")?),
            credit_income_ratio: round2(
                dataset.value_or_zero(client_id, "CREDIT_INCOME_PERCENT")?,
            ),
            ext_source1: dataset.value_or_zero(client_id, "EXT_SOURCE_1")?,
            ext_source2: dataset.value_or_zero(client_id, "EXT_SOURCE_2")?,
            ext_source3: dataset.value_or_zero(client_id, "EXT_SOURCE_3")?,
        })
    }
}

/// Recover the category label of a one-hot group: the suffix of the first
/// prefix-matching column holding a 1. Snapshot column order makes this
/// deterministic even on malformed rows with two hot columns.
fn decode_one_hot(dataset: &ClientDataset, client_id: u64, prefix: &str) -> Result<String> {
    let hot: Vec<&str> = dataset.columns_with_prefix(prefix).collect();
    for column in hot {
        if dataset.value_or_zero(client_id, column)? >= 0.5 {
            let label = column[prefix.len()..].replace('_', " ");
            return Ok(label);
        }
    }
    Ok("Unknown".to_string())
}

fn offset_date(today: NaiveDate, day_offset: f64) -> String {
    (today + Duration::days(day_offset as i64))
        .format("%Y-%m-%d")
        .to_string()
}

fn yes_no(flag: f64) -> String {
    if flag >= 0.5 { "Yes" } else { "No" }.to_string()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
