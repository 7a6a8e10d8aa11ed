// ==========================================
// 医院寄售库存优化 - 引擎层
// ==========================================
// 流程: 筛选 → 时间窗聚合 → 活跃度分级 → 建议库存 → 效期评估 → 动作判定
// 红线: 引擎是纯函数批处理,不做 I/O,不读时钟
// ==========================================

pub mod action;
pub mod aggregator;
pub mod classifier;
pub mod expiry;
pub mod filter;
pub mod orchestrator;
pub mod recommendation;
pub mod report;

// 重导出核心引擎
pub use action::ActionResolver;
pub use aggregator::WindowAggregator;
pub use classifier::{ActivityClassifier, ClassificationStrategy};
pub use expiry::{ExpiryAssessment, ExpiryEvaluator};
pub use filter::{FilterOptions, RecordFilter};
pub use orchestrator::{RecommendationEngine, RecommendationReport};
pub use recommendation::{RecommendationCalculator, RecommendationStrategy, StockRecommendation};
pub use report::{category_hospital_pivot, product_hospital_pivot, summarize, PivotValue};
