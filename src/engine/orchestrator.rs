// ==========================================
// 医院寄售库存优化 - 引擎编排器
// ==========================================
// 用途: 协调聚合 → 分级 → 建议 → 效期 → 动作的执行顺序
// 红线: as_of 由调用方传入,引擎内部不读时钟
// 红线: 每次调用全量重算,无跨调用状态
// ==========================================

use crate::config::EngineConfig;
use crate::domain::record::{ConsignmentDataset, DataIssue, InventorySnapshot, ItemKey};
use crate::domain::recommendation::{AggregateStats, RecommendationRow, RecommendationSummary};
use crate::domain::types::SchemaVariant;
use crate::engine::action::ActionResolver;
use crate::engine::aggregator::WindowAggregator;
use crate::engine::classifier::{ActivityClassifier, ClassificationStrategy};
use crate::engine::expiry::ExpiryEvaluator;
use crate::engine::filter::RecordFilter;
use crate::engine::recommendation::{RecommendationCalculator, RecommendationStrategy};
use crate::engine::report;
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info, instrument};

// ==========================================
// RecommendationReport - 计算结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationReport {
    pub batch_id: String,
    pub as_of: NaiveDateTime,
    pub variant: SchemaVariant,
    pub classification_strategy: ClassificationStrategy,
    pub recommendation_strategy: RecommendationStrategy,
    pub rows: Vec<RecommendationRow>,
    pub summary: RecommendationSummary,
    pub issues: Vec<DataIssue>,
}

impl RecommendationReport {
    /// 按键查找结果行
    pub fn row(&self, key: &ItemKey) -> Option<&RecommendationRow> {
        self.rows
            .iter()
            .find(|r| r.hospital_id == key.hospital_id && r.product_id == key.product_id)
    }
}

// ==========================================
// RecommendationEngine - 补货建议引擎
// ==========================================
pub struct RecommendationEngine {
    config: EngineConfig,
}

impl RecommendationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 执行完整计算流程
    ///
    /// 每个库存快照输出一行；无动销的键按零聚合参与分级
    #[instrument(skip(self, dataset, filter), fields(batch_id = %dataset.batch_id, as_of = %as_of))]
    pub fn run(
        &self,
        dataset: &ConsignmentDataset,
        as_of: NaiveDateTime,
        filter: &RecordFilter,
    ) -> RecommendationReport {
        let classification_strategy = ClassificationStrategy::select(&self.config, dataset.variant);
        let recommendation_strategy =
            RecommendationStrategy::select(self.config.strategy, dataset.variant);
        info!(
            variant = %dataset.variant,
            classification = %classification_strategy,
            recommendation = %recommendation_strategy,
            "开始计算补货建议"
        );

        // ==========================================
        // 步骤1: 筛选
        // ==========================================
        let movements: Vec<_> = dataset
            .movements
            .iter()
            .filter(|m| filter.matches_movement(m))
            .collect();
        let mut inventory: Vec<&InventorySnapshot> = dataset
            .inventory
            .iter()
            .filter(|s| filter.matches_snapshot(s))
            .collect();
        inventory.sort_by_key(|s| s.key());
        debug!(
            movements = movements.len(),
            inventory = inventory.len(),
            "步骤1: 筛选完成"
        );

        // ==========================================
        // 步骤2: 时间窗聚合
        // ==========================================
        let aggregator =
            WindowAggregator::new(self.config.consumption_window_days, self.config.lookback_days);
        let aggregates = aggregator.aggregate(movements, as_of);

        // ==========================================
        // 步骤3-6: 分级 / 建议 / 效期 / 动作
        // ==========================================
        let classifier = ActivityClassifier::new(classification_strategy, &self.config);
        let calculator = RecommendationCalculator::new(recommendation_strategy, &self.config);
        let expiry = ExpiryEvaluator::new(&self.config);

        let rows: Vec<RecommendationRow> = inventory
            .into_iter()
            .map(|snapshot| {
                let (stats, weekly_consumption) =
                    self.stats_for(snapshot, dataset.variant, aggregates.get(&snapshot.key()));

                let classification = classifier.classify(&stats, snapshot.usage_family);
                let recommendation = calculator.calculate(
                    &stats,
                    &classification,
                    snapshot.usage_family,
                    weekly_consumption,
                    snapshot.current_stock,
                );
                let assessment = expiry.evaluate(snapshot.expiry_date, as_of);
                let action = ActionResolver.resolve(assessment.status, recommendation.difference);

                RecommendationRow {
                    hospital_id: snapshot.hospital_id.clone(),
                    hospital_name: snapshot.hospital_name.clone(),
                    product_id: snapshot.product_id.clone(),
                    product_name: snapshot.product_name.clone(),
                    product_category: snapshot.product_category.clone(),
                    usage_family: snapshot.usage_family,
                    consumption_window: stats.consumption_window,
                    weekly_consumption,
                    days_active: stats.days_active,
                    movement_count: stats.movement_count,
                    max_movement_qty: stats.max_movement_qty,
                    mean_interval_days: stats.mean_interval_days,
                    activity_quotient: classification.activity_quotient,
                    class: classification.class,
                    safety_stock: classification.safety_stock,
                    current_stock: snapshot.current_stock,
                    recommended: recommendation.recommended,
                    difference: recommendation.difference,
                    expiry_date: snapshot.expiry_date,
                    days_to_expiry: assessment.days_to_expiry,
                    expiry_status: assessment.status,
                    expiry_risk: assessment.risk,
                    action,
                }
            })
            .collect();

        let summary = report::summarize(&rows);
        info!(
            items = summary.item_count,
            total_recommended = summary.total_recommended,
            reduction_needed = summary.reduction_needed,
            increase_needed = summary.increase_needed,
            expired = summary.expired_count,
            "补货建议计算完成"
        );

        RecommendationReport {
            batch_id: dataset.batch_id.clone(),
            as_of,
            variant: dataset.variant,
            classification_strategy,
            recommendation_strategy,
            rows,
            summary,
            issues: dataset.issues.clone(),
        }
    }

    /// 单键聚合统计 + 周消耗
    ///
    /// - 统一结构: 取动销聚合（缺失补零）,周消耗 = 窗口消耗 / (W/7)
    /// - 扁平结构: 取内嵌平均周消耗与平均间隔,窗口消耗由周消耗折算
    fn stats_for(
        &self,
        snapshot: &InventorySnapshot,
        variant: SchemaVariant,
        aggregated: Option<&AggregateStats>,
    ) -> (AggregateStats, f64) {
        let weeks_in_window = self.config.consumption_window_days as f64 / 7.0;

        match variant {
            SchemaVariant::MovementInventory => {
                let stats = aggregated.cloned().unwrap_or_default();
                let weekly = stats.consumption_window as f64 / weeks_in_window;
                (stats, weekly)
            }
            SchemaVariant::FlatSnapshot => {
                let weekly = snapshot.avg_weekly_consumption.unwrap_or(0.0);
                let stats = AggregateStats {
                    consumption_window: (weekly * weeks_in_window).round() as i64,
                    mean_interval_days: snapshot.avg_interval_days,
                    ..Default::default()
                };
                (stats, weekly)
            }
        }
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
