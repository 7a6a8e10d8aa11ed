// ==========================================
// 医院寄售库存优化 - 引擎配置
// ==========================================
// 职责: 时间窗 / 分级阈值 / 安全库存表 / 倍数表 / 策略选择
// 存储: JSON 文件（全部字段可缺省,缺省取默认值）
// ==========================================

use crate::domain::types::{ActivityClass, UsageFamily};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// ==========================================
// 配置错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置解析失败: {0}")]
    ParseError(String),

    #[error("配置值非法 (key: {key}): {message}")]
    InvalidValue { key: String, message: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

// ==========================================
// 策略选择
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategySelection {
    /// 按数据集结构自动选择
    #[default]
    Auto,
    /// 强制叠加安全库存模型
    Additive,
    /// 强制周消耗倍数模型
    WeeklyMultiple,
}

/// 同键重复库存快照的合并策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    #[default]
    KeepLast,
    Sum,
}

// ==========================================
// 按等级取值的表（A/B/C/D）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassTable<T> {
    #[serde(rename = "A")]
    pub a: T,
    #[serde(rename = "B")]
    pub b: T,
    #[serde(rename = "C")]
    pub c: T,
    #[serde(rename = "D")]
    pub d: T,
}

impl<T: Copy> ClassTable<T> {
    pub fn get(&self, class: ActivityClass) -> T {
        match class {
            ActivityClass::A => self.a,
            ActivityClass::B => self.b,
            ActivityClass::C => self.c,
            ActivityClass::D => self.d,
        }
    }
}

/// 安全库存表默认值 {A:3, B:2, C:1, D:0}
fn default_safety_stock() -> ClassTable<i64> {
    ClassTable { a: 3, b: 2, c: 1, d: 0 }
}

// ==========================================
// 按使用族取值的表（high/medium/low）
// ==========================================
// 未知使用族一律取 low（最保守口径）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FamilyTable<T> {
    pub high: T,
    pub medium: T,
    pub low: T,
}

impl<T: Copy> FamilyTable<T> {
    pub fn get(&self, family: UsageFamily) -> T {
        match family {
            UsageFamily::High => self.high,
            UsageFamily::Medium => self.medium,
            UsageFamily::Low | UsageFamily::Unknown => self.low,
        }
    }
}

/// 使用族分级间隔表：每族 A/B/C 三档升序天数阈值
pub type FamilyIntervalTable = FamilyTable<[f64; 3]>;

/// 周消耗倍数表：每族按等级取倍数
pub type MultiplierTable = FamilyTable<ClassTable<f64>>;

/// 使用族分级间隔默认表
pub fn default_family_intervals() -> FamilyIntervalTable {
    FamilyTable {
        high: [7.0, 14.0, 30.0],
        medium: [14.0, 30.0, 60.0],
        low: [30.0, 60.0, 120.0],
    }
}

fn default_multipliers() -> MultiplierTable {
    FamilyTable {
        high: ClassTable { a: 3.0, b: 2.0, c: 1.0, d: 0.2 },
        medium: ClassTable { a: 2.5, b: 1.5, c: 0.8, d: 0.2 },
        low: ClassTable { a: 2.0, b: 1.0, c: 0.5, d: 0.1 },
    }
}

// ==========================================
// EngineConfig - 引擎配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 消耗统计窗口 W（天）
    pub consumption_window_days: i64,
    /// 活跃度回溯窗口 L（天）
    pub lookback_days: i64,

    /// 活跃商分级阈值（A/B/C 升序）
    pub quotient_thresholds: [f64; 3],
    /// 无动销时的活跃商哨兵值
    pub no_activity_quotient: f64,

    /// 安全库存表（叠加模型）
    pub safety_stock: ClassTable<i64>,
    /// 使用族分级间隔表；存在时启用使用族分级
    pub family_intervals: Option<FamilyIntervalTable>,
    /// 周消耗倍数表（倍数模型）
    pub multipliers: MultiplierTable,

    /// 临期天数阈值
    pub expiring_soon_days: i64,
    /// 风险层级阈值（剩余天数 < high → High,< medium → Medium）
    pub risk_high_days: i64,
    pub risk_medium_days: i64,

    pub strategy: StrategySelection,
    pub duplicate_policy: DuplicatePolicy,
}

/// 天数类参数上限（约 100 年）
pub const MAX_DAYS: i64 = 36_500;

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            consumption_window_days: 180,
            lookback_days: 540,
            quotient_thresholds: [10.0, 20.0, 40.0],
            no_activity_quotient: 999.0,
            safety_stock: default_safety_stock(),
            family_intervals: None,
            multipliers: default_multipliers(),
            expiring_soon_days: 30,
            risk_high_days: 90,
            risk_medium_days: 180,
            strategy: StrategySelection::Auto,
            duplicate_policy: DuplicatePolicy::KeepLast,
        }
    }
}

impl EngineConfig {
    /// 从 JSON 字符串加载并校验
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载并校验
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    /// 启用使用族分级时的间隔表（未配置则取默认表）
    pub fn family_intervals_or_default(&self) -> FamilyIntervalTable {
        self.family_intervals.unwrap_or_else(default_family_intervals)
    }

    /// 校验配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_days("consumption_window_days", self.consumption_window_days, 1)?;
        check_days("lookback_days", self.lookback_days, 1)?;
        check_ascending("quotient_thresholds", &self.quotient_thresholds)?;
        // 无动销哨兵必须落入最低级
        if !(self.no_activity_quotient > self.quotient_thresholds[2]) {
            return Err(invalid(
                "no_activity_quotient",
                &format!(
                    "必须大于最高阈值 {}: {}",
                    self.quotient_thresholds[2], self.no_activity_quotient
                ),
            ));
        }
        if let Some(intervals) = &self.family_intervals {
            check_ascending("family_intervals.high", &intervals.high)?;
            check_ascending("family_intervals.medium", &intervals.medium)?;
            check_ascending("family_intervals.low", &intervals.low)?;
        }
        for class in ActivityClass::ALL {
            if self.safety_stock.get(class) < 0 {
                return Err(invalid("safety_stock", "安全库存不能为负数"));
            }
            for family in [UsageFamily::High, UsageFamily::Medium, UsageFamily::Low] {
                let m = self.multipliers.get(family).get(class);
                if !(m >= 0.0) {
                    return Err(invalid(
                        "multipliers",
                        &format!("{}/{} 倍数必须为非负数: {}", family, class, m),
                    ));
                }
            }
        }
        check_days("expiring_soon_days", self.expiring_soon_days, 0)?;
        check_days("risk_high_days", self.risk_high_days, -MAX_DAYS)?;
        check_days("risk_medium_days", self.risk_medium_days, -MAX_DAYS)?;
        if self.risk_high_days >= self.risk_medium_days {
            return Err(invalid(
                "risk_high_days",
                "必须小于 risk_medium_days",
            ));
        }
        Ok(())
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn check_days(key: &str, value: i64, min: i64) -> Result<(), ConfigError> {
    if !(min..=MAX_DAYS).contains(&value) {
        return Err(invalid(
            key,
            &format!("取值范围 [{}, {}]: {}", min, MAX_DAYS, value),
        ));
    }
    Ok(())
}

fn check_ascending(key: &str, cutoffs: &[f64; 3]) -> Result<(), ConfigError> {
    let ascending = cutoffs[0] < cutoffs[1] && cutoffs[1] < cutoffs[2];
    if !ascending || cutoffs.iter().any(|c| c.is_nan()) {
        return Err(invalid(
            key,
            &format!("阈值必须严格升序: {:?}", cutoffs),
        ));
    }
    Ok(())
}
