// ==========================================
// 医院寄售库存优化 - 配置层
// ==========================================
// 职责: 引擎参数加载与校验
// 存储: JSON 文件 / 默认值
// ==========================================

pub mod engine_config;

// 重导出核心配置
pub use engine_config::{
    default_family_intervals, ClassTable, ConfigError, DuplicatePolicy, EngineConfig,
    FamilyIntervalTable, FamilyTable, MultiplierTable, StrategySelection, MAX_DAYS,
};
