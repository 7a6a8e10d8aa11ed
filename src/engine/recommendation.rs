// ==========================================
// 医院寄售库存优化 - 补货建议计算引擎
// ==========================================
// 职责: 分级结果 + 消耗量 → 建议库存 + 差值
// 策略:
//   - AdditiveSafetyStock: 最大单次动销 + 安全库存
//   - WeeklyMultiple: round(周消耗 × 倍数[使用族][等级])
// 差值口径: Difference = Current_Stock - Recommended（正=过剩）
// 红线: 建议库存永不为负
// ==========================================

use crate::config::{EngineConfig, MultiplierTable, StrategySelection};
use crate::domain::recommendation::{AggregateStats, ClassificationResult};
use crate::domain::types::{SchemaVariant, UsageFamily};
use serde::Serialize;
use std::fmt;
use tracing::warn;

// ==========================================
// 建议策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStrategy {
    AdditiveSafetyStock,
    WeeklyMultiple,
}

impl RecommendationStrategy {
    /// 选择规则
    ///
    /// - Auto: 统一结构 → 叠加模型；扁平结构 → 倍数模型
    /// - 扁平结构无单次动销数据,强制叠加时降级为倍数模型
    pub fn select(selection: StrategySelection, variant: SchemaVariant) -> Self {
        match (selection, variant) {
            (StrategySelection::WeeklyMultiple, _) => RecommendationStrategy::WeeklyMultiple,
            (StrategySelection::Additive, SchemaVariant::MovementInventory)
            | (StrategySelection::Auto, SchemaVariant::MovementInventory) => {
                RecommendationStrategy::AdditiveSafetyStock
            }
            (StrategySelection::Additive, SchemaVariant::FlatSnapshot) => {
                warn!("扁平结构缺少单次动销数据,叠加模型降级为周消耗倍数模型");
                RecommendationStrategy::WeeklyMultiple
            }
            (StrategySelection::Auto, SchemaVariant::FlatSnapshot) => {
                RecommendationStrategy::WeeklyMultiple
            }
        }
    }
}

impl fmt::Display for RecommendationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendationStrategy::AdditiveSafetyStock => write!(f, "additive_safety_stock"),
            RecommendationStrategy::WeeklyMultiple => write!(f, "weekly_multiple"),
        }
    }
}

/// 建议结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockRecommendation {
    pub recommended: i64,
    pub difference: i64,
}

// ==========================================
// RecommendationCalculator - 建议库存计算器
// ==========================================
pub struct RecommendationCalculator {
    strategy: RecommendationStrategy,
    multipliers: MultiplierTable,
}

impl RecommendationCalculator {
    pub fn new(strategy: RecommendationStrategy, config: &EngineConfig) -> Self {
        Self {
            strategy,
            multipliers: config.multipliers,
        }
    }

    pub fn strategy(&self) -> RecommendationStrategy {
        self.strategy
    }

    /// 计算建议库存与差值
    ///
    /// `weekly_consumption` 仅倍数模型使用
    pub fn calculate(
        &self,
        stats: &AggregateStats,
        classification: &ClassificationResult,
        family: UsageFamily,
        weekly_consumption: f64,
        current_stock: i64,
    ) -> StockRecommendation {
        let raw = match self.strategy {
            RecommendationStrategy::AdditiveSafetyStock => {
                stats
                    .max_movement_qty
                    .saturating_add(classification.safety_stock)
            }
            RecommendationStrategy::WeeklyMultiple => {
                let multiplier = self.multipliers.get(family).get(classification.class);
                let target = (weekly_consumption * multiplier).round_ties_even();
                if target.is_finite() {
                    target as i64
                } else {
                    0
                }
            }
        };

        let recommended = raw.max(0);
        StockRecommendation {
            recommended,
            difference: current_stock.saturating_sub(recommended),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ActivityClass;

    fn classification(class: ActivityClass, safety_stock: i64) -> ClassificationResult {
        ClassificationResult {
            activity_quotient: 0.0,
            class,
            safety_stock,
        }
    }

    fn stats_with_max(max: i64) -> AggregateStats {
        AggregateStats {
            max_movement_qty: max,
            movement_count: 1,
            ..Default::default()
        }
    }

    fn calculator(strategy: RecommendationStrategy) -> RecommendationCalculator {
        RecommendationCalculator::new(strategy, &EngineConfig::default())
    }

    #[test]
    fn test_strategy_selection() {
        use RecommendationStrategy::*;
        use StrategySelection as S;

        assert_eq!(RecommendationStrategy::select(S::Auto, SchemaVariant::MovementInventory), AdditiveSafetyStock);
        assert_eq!(RecommendationStrategy::select(S::Auto, SchemaVariant::FlatSnapshot), WeeklyMultiple);
        assert_eq!(RecommendationStrategy::select(S::WeeklyMultiple, SchemaVariant::MovementInventory), WeeklyMultiple);
        assert_eq!(RecommendationStrategy::select(S::Additive, SchemaVariant::FlatSnapshot), WeeklyMultiple);
    }

    #[test]
    fn test_additive_model() {
        let r = calculator(RecommendationStrategy::AdditiveSafetyStock).calculate(
            &stats_with_max(5),
            &classification(ActivityClass::A, 3),
            UsageFamily::High,
            0.0,
            4,
        );
        assert_eq!(r.recommended, 8);
        assert_eq!(r.difference, -4);
    }

    #[test]
    fn test_additive_model_clamps_negative_peak() {
        // 仅有退货（负数量）时建议库存不为负
        let r = calculator(RecommendationStrategy::AdditiveSafetyStock).calculate(
            &stats_with_max(-6),
            &classification(ActivityClass::C, 1),
            UsageFamily::Low,
            0.0,
            2,
        );
        assert_eq!(r.recommended, 0);
        assert_eq!(r.difference, 2);
    }

    #[test]
    fn test_additive_model_saturates() {
        let r = calculator(RecommendationStrategy::AdditiveSafetyStock).calculate(
            &stats_with_max(i64::MAX),
            &classification(ActivityClass::A, 3),
            UsageFamily::High,
            0.0,
            i64::MIN,
        );
        assert_eq!(r.recommended, i64::MAX);
        assert_eq!(r.difference, i64::MIN);
    }

    #[test]
    fn test_weekly_multiple_model() {
        let calc = calculator(RecommendationStrategy::WeeklyMultiple);

        // 4.0 × high/A(3) = 12
        let r = calc.calculate(
            &AggregateStats::default(),
            &classification(ActivityClass::A, 3),
            UsageFamily::High,
            4.0,
            20,
        );
        assert_eq!(r.recommended, 12);
        assert_eq!(r.difference, 8);

        // 5.0 × medium/B(1.5) = 7.5 → 8（银行家舍入）
        let r = calc.calculate(
            &AggregateStats::default(),
            &classification(ActivityClass::B, 2),
            UsageFamily::Medium,
            5.0,
            0,
        );
        assert_eq!(r.recommended, 8);

        // 5.0 × low/C(0.5) = 2.5 → 2
        let r = calc.calculate(
            &AggregateStats::default(),
            &classification(ActivityClass::C, 1),
            UsageFamily::Low,
            5.0,
            0,
        );
        assert_eq!(r.recommended, 2);
    }

    #[test]
    fn test_weekly_multiple_unknown_family_uses_low_table() {
        let r = calculator(RecommendationStrategy::WeeklyMultiple).calculate(
            &AggregateStats::default(),
            &classification(ActivityClass::A, 3),
            UsageFamily::Unknown,
            10.0,
            0,
        );
        // low/A = 2
        assert_eq!(r.recommended, 20);
    }
}
