// ==========================================
// 医院寄售库存优化 - 效期风险评估引擎
// ==========================================
// 职责: 效期日期 → 粗粒度状态 + 细粒度风险层级
// 红线: 效期未知视为最不紧急,不报错
// ==========================================

use crate::config::EngineConfig;
use crate::domain::types::{ExpiryRisk, ExpiryStatus};
use crate::engine::aggregator::{at_midnight, shift_days, whole_days_between};
use chrono::{NaiveDate, NaiveDateTime};

/// 单行效期评估结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryAssessment {
    pub status: ExpiryStatus,
    pub risk: ExpiryRisk,
    pub days_to_expiry: Option<i64>,
}

pub struct ExpiryEvaluator {
    expiring_soon_days: i64,
    risk_high_days: i64,
    risk_medium_days: i64,
}

impl ExpiryEvaluator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            expiring_soon_days: config.expiring_soon_days,
            risk_high_days: config.risk_high_days,
            risk_medium_days: config.risk_medium_days,
        }
    }

    pub fn evaluate(&self, expiry_date: Option<NaiveDate>, as_of: NaiveDateTime) -> ExpiryAssessment {
        match expiry_date {
            None => ExpiryAssessment {
                status: ExpiryStatus::Ok,
                risk: ExpiryRisk::Low,
                days_to_expiry: None,
            },
            Some(date) => {
                let expiry = at_midnight(date);
                let days = whole_days_between(as_of, expiry);
                ExpiryAssessment {
                    status: self.status(expiry, as_of),
                    risk: self.risk(days),
                    days_to_expiry: Some(days),
                }
            }
        }
    }

    /// 已过期: 效期零点早于 as_of；临期: 不晚于 as_of + N 天
    fn status(&self, expiry: NaiveDateTime, as_of: NaiveDateTime) -> ExpiryStatus {
        if expiry < as_of {
            ExpiryStatus::Expired
        } else if expiry <= shift_days(as_of, self.expiring_soon_days) {
            ExpiryStatus::ExpiringSoon
        } else {
            ExpiryStatus::Ok
        }
    }

    fn risk(&self, days_to_expiry: i64) -> ExpiryRisk {
        if days_to_expiry < self.risk_high_days {
            ExpiryRisk::High
        } else if days_to_expiry < self.risk_medium_days {
            ExpiryRisk::Medium
        } else {
            ExpiryRisk::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn as_of() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn evaluate_in(days: i64) -> ExpiryAssessment {
        ExpiryEvaluator::new(&EngineConfig::default())
            .evaluate(Some(as_of().date() + Duration::days(days)), as_of())
    }

    #[test]
    fn test_unknown_expiry_is_ok_and_low() {
        let a = ExpiryEvaluator::new(&EngineConfig::default()).evaluate(None, as_of());
        assert_eq!(a.status, ExpiryStatus::Ok);
        assert_eq!(a.risk, ExpiryRisk::Low);
        assert_eq!(a.days_to_expiry, None);
    }

    #[test]
    fn test_yesterday_is_expired() {
        let a = evaluate_in(-1);
        assert_eq!(a.status, ExpiryStatus::Expired);
        assert_eq!(a.risk, ExpiryRisk::High);
    }

    #[test]
    fn test_expiry_on_as_of_date_is_expired() {
        // 当日零点早于 09:30
        let a = evaluate_in(0);
        assert_eq!(a.status, ExpiryStatus::Expired);
        assert_eq!(a.risk, ExpiryRisk::High);
        assert_eq!(a.days_to_expiry, Some(-1));
    }

    #[test]
    fn test_expiry_on_as_of_date_at_midnight_is_expiring_soon() {
        let midnight = as_of().date().and_hms_opt(0, 0, 0).unwrap();
        let a = ExpiryEvaluator::new(&EngineConfig::default()).evaluate(Some(midnight.date()), midnight);
        assert_eq!(a.status, ExpiryStatus::ExpiringSoon);
        assert_eq!(a.days_to_expiry, Some(0));
    }

    #[test]
    fn test_huge_horizon_does_not_panic() {
        let config = EngineConfig {
            expiring_soon_days: i64::MAX,
            ..Default::default()
        };
        let a = ExpiryEvaluator::new(&config).evaluate(Some(as_of().date() + Duration::days(5_000)), as_of());
        assert_eq!(a.status, ExpiryStatus::ExpiringSoon);
    }

    #[test]
    fn test_expiring_soon_window() {
        assert_eq!(evaluate_in(15).status, ExpiryStatus::ExpiringSoon);
        // 第 30 天零点早于 as_of + 30 天
        assert_eq!(evaluate_in(30).status, ExpiryStatus::ExpiringSoon);
        assert_eq!(evaluate_in(31).status, ExpiryStatus::Ok);
    }

    #[test]
    fn test_risk_tiers() {
        assert_eq!(evaluate_in(45).risk, ExpiryRisk::High);
        assert_eq!(evaluate_in(120).risk, ExpiryRisk::Medium);
        assert_eq!(evaluate_in(400).risk, ExpiryRisk::Low);
    }

    #[test]
    fn test_days_to_expiry_floor() {
        // 明日零点距 09:30 不足一整天
        assert_eq!(evaluate_in(1).days_to_expiry, Some(0));
        assert_eq!(evaluate_in(10).days_to_expiry, Some(9));
    }
}
