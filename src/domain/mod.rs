// ==========================================
// 医院寄售库存优化 - 领域模型层
// ==========================================
// 职责: 定义记录、派生实体、领域类型
// 红线: 不含数据读取逻辑,不含引擎逻辑
// ==========================================

pub mod recommendation;
pub mod record;
pub mod types;

// 重导出核心类型
pub use recommendation::{
    AggregateStats, ClassificationResult, PivotTable, RecommendationRow, RecommendationSummary,
};
pub use record::{
    ConsignmentDataset, DataIssue, DataIssueKind, InventorySnapshot, ItemKey, MovementRecord,
};
pub use types::{
    ActivityClass, ExpiryRisk, ExpiryStatus, RecordType, SchemaVariant, StockAction, UsageFamily,
};
