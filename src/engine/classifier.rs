// ==========================================
// 医院寄售库存优化 - 活跃度分级引擎
// ==========================================
// 红线: 分级是"等级制",不是评分制
// ==========================================
// 职责: 活跃商/平均间隔 → A/B/C/D + 安全库存
// 策略:
//   - Quotient: 活跃商 = 活跃天数 / 动销次数,固定阈值分级
//   - FamilyInterval: 相邻动销平均间隔,按使用族阈值分级
// ==========================================

use crate::config::{ClassTable, EngineConfig, FamilyIntervalTable};
use crate::domain::recommendation::{AggregateStats, ClassificationResult};
use crate::domain::types::{ActivityClass, SchemaVariant, UsageFamily};
use serde::Serialize;
use std::fmt;

// ==========================================
// 分级策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationStrategy {
    Quotient,
    FamilyInterval,
}

impl ClassificationStrategy {
    /// 选择规则: 配置了使用族间隔表,或扁平结构（无原始动销）→ FamilyInterval
    pub fn select(config: &EngineConfig, variant: SchemaVariant) -> Self {
        if config.family_intervals.is_some() || variant == SchemaVariant::FlatSnapshot {
            ClassificationStrategy::FamilyInterval
        } else {
            ClassificationStrategy::Quotient
        }
    }
}

impl fmt::Display for ClassificationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationStrategy::Quotient => write!(f, "quotient"),
            ClassificationStrategy::FamilyInterval => write!(f, "family_interval"),
        }
    }
}

// ==========================================
// ActivityClassifier - 活跃度分级器
// ==========================================
pub struct ActivityClassifier {
    strategy: ClassificationStrategy,
    quotient_thresholds: [f64; 3],
    no_activity_quotient: f64,
    family_intervals: FamilyIntervalTable,
    safety_stock: ClassTable<i64>,
}

impl ActivityClassifier {
    pub fn new(strategy: ClassificationStrategy, config: &EngineConfig) -> Self {
        Self {
            strategy,
            quotient_thresholds: config.quotient_thresholds,
            no_activity_quotient: config.no_activity_quotient,
            family_intervals: config.family_intervals_or_default(),
            safety_stock: config.safety_stock,
        }
    }

    pub fn strategy(&self) -> ClassificationStrategy {
        self.strategy
    }

    /// 单键分级
    pub fn classify(&self, stats: &AggregateStats, family: UsageFamily) -> ClassificationResult {
        let (activity_quotient, class) = match self.strategy {
            ClassificationStrategy::Quotient => self.by_quotient(stats),
            ClassificationStrategy::FamilyInterval => self.by_family_interval(stats, family),
        };

        ClassificationResult {
            activity_quotient,
            class,
            safety_stock: self.safety_stock.get(class),
        }
    }

    /// 活跃商分级；无动销取哨兵值,必落入 D
    fn by_quotient(&self, stats: &AggregateStats) -> (f64, ActivityClass) {
        match (stats.movement_count, stats.days_active) {
            (0, _) | (_, None) => (self.no_activity_quotient, ActivityClass::D),
            (count, Some(days)) => {
                let quotient = days as f64 / count as f64;
                (quotient, ActivityClass::from_cutoffs(quotient, &self.quotient_thresholds))
            }
        }
    }

    /// 使用族间隔分级；间隔未定义或使用族未知 → D
    fn by_family_interval(&self, stats: &AggregateStats, family: UsageFamily) -> (f64, ActivityClass) {
        match stats.mean_interval_days {
            Some(interval) if family != UsageFamily::Unknown => {
                let cutoffs = self.family_intervals.get(family);
                (interval, ActivityClass::from_cutoffs(interval, &cutoffs))
            }
            Some(interval) => (interval, ActivityClass::D),
            None => (self.no_activity_quotient, ActivityClass::D),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(count: usize, days_active: Option<i64>, interval: Option<f64>) -> AggregateStats {
        AggregateStats {
            movement_count: count,
            days_active,
            mean_interval_days: interval,
            ..Default::default()
        }
    }

    fn quotient_classifier() -> ActivityClassifier {
        ActivityClassifier::new(ClassificationStrategy::Quotient, &EngineConfig::default())
    }

    fn family_classifier() -> ActivityClassifier {
        ActivityClassifier::new(ClassificationStrategy::FamilyInterval, &EngineConfig::default())
    }

    #[test]
    fn test_strategy_selection() {
        let mut config = EngineConfig::default();
        assert_eq!(
            ClassificationStrategy::select(&config, SchemaVariant::MovementInventory),
            ClassificationStrategy::Quotient
        );
        assert_eq!(
            ClassificationStrategy::select(&config, SchemaVariant::FlatSnapshot),
            ClassificationStrategy::FamilyInterval
        );

        config.family_intervals = Some(crate::config::default_family_intervals());
        assert_eq!(
            ClassificationStrategy::select(&config, SchemaVariant::MovementInventory),
            ClassificationStrategy::FamilyInterval
        );
    }

    #[test]
    fn test_quotient_classes_and_safety_stock() {
        let classifier = quotient_classifier();

        // 28 天 / 4 次 = 7 → A
        let r = classifier.classify(&stats(4, Some(28), None), UsageFamily::High);
        assert_eq!(r.activity_quotient, 7.0);
        assert_eq!(r.class, ActivityClass::A);
        assert_eq!(r.safety_stock, 3);

        // 60 / 4 = 15 → B
        let r = classifier.classify(&stats(4, Some(60), None), UsageFamily::High);
        assert_eq!(r.class, ActivityClass::B);
        assert_eq!(r.safety_stock, 2);

        // 160 / 4 = 40 → C（边界归入较活跃一档）
        let r = classifier.classify(&stats(4, Some(160), None), UsageFamily::High);
        assert_eq!(r.class, ActivityClass::C);

        // 400 / 4 = 100 → D
        let r = classifier.classify(&stats(4, Some(400), None), UsageFamily::High);
        assert_eq!(r.class, ActivityClass::D);
        assert_eq!(r.safety_stock, 0);
    }

    #[test]
    fn test_zero_movements_uses_sentinel() {
        let r = quotient_classifier().classify(&AggregateStats::default(), UsageFamily::High);
        assert_eq!(r.activity_quotient, 999.0);
        assert_eq!(r.class, ActivityClass::D);
        assert_eq!(r.safety_stock, 0);
    }

    #[test]
    fn test_zero_movements_is_d_even_with_low_sentinel() {
        // 绕过 validate 直接构造
        let config = EngineConfig {
            no_activity_quotient: 5.0,
            ..Default::default()
        };
        let r = ActivityClassifier::new(ClassificationStrategy::Quotient, &config)
            .classify(&AggregateStats::default(), UsageFamily::High);
        assert_eq!(r.class, ActivityClass::D);
        assert_eq!(r.safety_stock, 0);
    }

    #[test]
    fn test_family_interval_thresholds_differ_by_family() {
        let classifier = family_classifier();
        let s = stats(5, Some(50), Some(12.0));

        // high: [7,14,30] → B; medium: [14,30,60] → A; low: [30,60,120] → A
        assert_eq!(classifier.classify(&s, UsageFamily::High).class, ActivityClass::B);
        assert_eq!(classifier.classify(&s, UsageFamily::Medium).class, ActivityClass::A);
        assert_eq!(classifier.classify(&s, UsageFamily::Low).class, ActivityClass::A);

        let slow = stats(2, Some(200), Some(45.0));
        assert_eq!(classifier.classify(&slow, UsageFamily::High).class, ActivityClass::D);
        assert_eq!(classifier.classify(&slow, UsageFamily::Medium).class, ActivityClass::C);
    }

    #[test]
    fn test_family_interval_undefined_or_unknown_is_d() {
        let classifier = family_classifier();

        let single = stats(1, Some(3), None);
        assert_eq!(classifier.classify(&single, UsageFamily::High).class, ActivityClass::D);

        let frequent = stats(10, Some(20), Some(2.0));
        let r = classifier.classify(&frequent, UsageFamily::Unknown);
        assert_eq!(r.class, ActivityClass::D);
        assert_eq!(r.activity_quotient, 2.0);
    }
}
