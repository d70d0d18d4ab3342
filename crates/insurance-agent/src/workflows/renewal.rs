//! Renewal reminders derived from the policy expiry date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const FAST_TRACK_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct RenewalRequest {
    pub policy_id: String,
    /// `YYYY-MM-DD`
    pub expiry_date: String,
    pub current_premium: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalStage {
    Active,
    DueSoon,
    Expired,
}

impl RenewalStage {
    pub fn for_days(days_until_expiry: i64) -> Self {
        if days_until_expiry > FAST_TRACK_WINDOW_DAYS {
            Self::Active
        } else if days_until_expiry > 0 {
            Self::DueSoon
        } else {
            Self::Expired
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Active => "Your policy is active. Early renewal can offer discounts.",
            Self::DueSoon => {
                "Renew now to avoid policy lapse. You’re eligible for fast-track renewal."
            }
            Self::Expired => "Policy expired! Renew immediately to maintain coverage.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenewalReminder {
    pub policy_id: String,
    pub days_until_expiry: i64,
    pub current_premium: f64,
    pub stage: RenewalStage,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenewalError {
    #[error("policy_id is required")]
    MissingPolicyId,
    #[error("expiry_date must be YYYY-MM-DD (found '{0}')")]
    InvalidExpiryDate(String),
    #[error("current_premium must be a non-negative number (found {0})")]
    InvalidPremium(f64),
}

pub fn renewal_reminder(
    request: &RenewalRequest,
    today: NaiveDate,
) -> Result<RenewalReminder, RenewalError> {
    let policy_id = request.policy_id.trim();
    if policy_id.is_empty() {
        return Err(RenewalError::MissingPolicyId);
    }

    if !request.current_premium.is_finite() || request.current_premium < 0.0 {
        return Err(RenewalError::InvalidPremium(request.current_premium));
    }

    let expiry = NaiveDate::parse_from_str(request.expiry_date.trim(), "%Y-%m-%d")
        .map_err(|_| RenewalError::InvalidExpiryDate(request.expiry_date.clone()))?;

    let days_until_expiry = (expiry - today).num_days();
    let stage = RenewalStage::for_days(days_until_expiry);

    Ok(RenewalReminder {
        policy_id: policy_id.to_string(),
        days_until_expiry,
        current_premium: request.current_premium,
        stage,
        recommendation: stage.recommendation().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date")
    }

    fn request(expiry_date: &str) -> RenewalRequest {
        RenewalRequest {
            policy_id: "POL-001".to_string(),
            expiry_date: expiry_date.to_string(),
            current_premium: 5000.0,
        }
    }

    #[test]
    fn distant_expiry_is_active() {
        let reminder = renewal_reminder(&request("2025-04-15"), today()).expect("valid");

        assert_eq!(reminder.days_until_expiry, 45);
        assert_eq!(reminder.stage, RenewalStage::Active);
        assert!(reminder.recommendation.starts_with("Your policy is active"));
    }

    #[test]
    fn window_boundaries() {
        let thirty = renewal_reminder(&request("2025-03-31"), today()).expect("valid");
        assert_eq!(thirty.days_until_expiry, 30);
        assert_eq!(thirty.stage, RenewalStage::DueSoon);

        let thirty_one = renewal_reminder(&request("2025-04-01"), today()).expect("valid");
        assert_eq!(thirty_one.stage, RenewalStage::Active);

        let tomorrow = renewal_reminder(&request("2025-03-02"), today()).expect("valid");
        assert_eq!(tomorrow.stage, RenewalStage::DueSoon);

        let same_day = renewal_reminder(&request("2025-03-01"), today()).expect("valid");
        assert_eq!(same_day.days_until_expiry, 0);
        assert_eq!(same_day.stage, RenewalStage::Expired);
    }

    #[test]
    fn expiry_tomorrow_counts_one_full_day() {
        // Calendar dates only, so the time of day never rounds tomorrow down to zero.
        let reminder = renewal_reminder(&request("2025-03-02"), today()).expect("valid");

        assert_eq!(reminder.days_until_expiry, 1);
        assert_eq!(reminder.stage, RenewalStage::DueSoon);
    }

    #[test]
    fn past_expiry_is_negative_and_expired() {
        let reminder = renewal_reminder(&request("2025-02-19"), today()).expect("valid");

        assert_eq!(reminder.days_until_expiry, -10);
        assert_eq!(
            reminder.recommendation,
            "Policy expired! Renew immediately to maintain coverage."
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(
            renewal_reminder(&request("03/01/2025"), today()),
            Err(RenewalError::InvalidExpiryDate("03/01/2025".to_string()))
        );

        let mut blank = request("2025-04-15");
        blank.policy_id = "  ".to_string();
        assert_eq!(
            renewal_reminder(&blank, today()),
            Err(RenewalError::MissingPolicyId)
        );
    }
}
