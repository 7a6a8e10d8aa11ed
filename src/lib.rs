// ==========================================
// 医院寄售库存优化 - 核心库
// ==========================================
// 系统定位: 补货决策支持（人工最终控制权）
// 主流程: 导入校验 → 时间窗聚合 → 活跃度分级 → 建议库存 → 效期评估 → 动作判定
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录与派生实体
pub mod domain;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 引擎配置
pub mod config;

// 导出层 - CSV / JSON
pub mod export;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ActivityClass, ExpiryRisk, ExpiryStatus, SchemaVariant, StockAction, UsageFamily,
};

// 领域实体
pub use domain::{
    AggregateStats, ConsignmentDataset, DataIssue, DataIssueKind, InventorySnapshot, ItemKey,
    MovementRecord, PivotTable, RecommendationRow, RecommendationSummary,
};

// 引擎
pub use engine::{
    ActivityClassifier, ActionResolver, ExpiryEvaluator, PivotValue, RecommendationCalculator,
    RecommendationEngine, RecommendationReport, RecordFilter, WindowAggregator,
};

// 导入 / 配置 / 导出
pub use config::{ConfigError, EngineConfig};
pub use export::{ExportError, ExportFormat};
pub use importer::{DatasetLoader, ImportError, ImportResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "医院寄售库存优化";
