// ==========================================
// 医院寄售库存优化 - 时间窗聚合引擎
// ==========================================
// 职责: 按 (医院, 产品) 计算消耗窗口合计与活跃度统计
// 输入: 动销记录 + as_of 时间点
// 输出: ItemKey → AggregateStats
// 红线: 日期未知的动销不进入任何时间窗
// ==========================================

use crate::domain::record::{ItemKey, MovementRecord};
use crate::domain::recommendation::AggregateStats;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

const SECONDS_PER_DAY: i64 = 86_400;

/// 日期按当日零点参与时间比较
pub(crate) fn at_midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// 时间点平移 N 天；越界时取日期类型的边界值
pub(crate) fn shift_days(at: NaiveDateTime, days: i64) -> NaiveDateTime {
    let bound = if days < 0 {
        NaiveDateTime::MIN
    } else {
        NaiveDateTime::MAX
    };
    Duration::try_days(days)
        .and_then(|delta| at.checked_add_signed(delta))
        .unwrap_or(bound)
}

/// 两个时间点之间的整天数（向下取整）
pub(crate) fn whole_days_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (to - from).num_seconds().div_euclid(SECONDS_PER_DAY)
}

// ==========================================
// WindowAggregator - 时间窗聚合器
// ==========================================
pub struct WindowAggregator {
    consumption_window_days: i64, // W
    lookback_days: i64,           // L
}

impl WindowAggregator {
    pub fn new(consumption_window_days: i64, lookback_days: i64) -> Self {
        Self {
            consumption_window_days,
            lookback_days,
        }
    }

    /// 聚合全部动销
    ///
    /// 只返回至少有一条已知日期动销的键；其余键由调用方补零
    #[instrument(skip(self, movements))]
    pub fn aggregate<'a, I>(
        &self,
        movements: I,
        as_of: NaiveDateTime,
    ) -> BTreeMap<ItemKey, AggregateStats>
    where
        I: IntoIterator<Item = &'a MovementRecord>,
    {
        let window_start = shift_days(as_of, self.consumption_window_days.saturating_neg());
        let lookback_start = shift_days(as_of, self.lookback_days.saturating_neg());

        // 先按键收集已知日期的动销
        let mut grouped: BTreeMap<ItemKey, Vec<(NaiveDate, i64)>> = BTreeMap::new();
        for movement in movements {
            if let Some(date) = movement.movement_date {
                grouped
                    .entry(movement.key())
                    .or_default()
                    .push((date, movement.movement_qty));
            }
        }

        let stats: BTreeMap<ItemKey, AggregateStats> = grouped
            .into_iter()
            .map(|(key, mut events)| {
                events.sort_by_key(|(date, _)| *date);
                let stats = self.aggregate_key(&events, as_of, window_start, lookback_start);
                (key, stats)
            })
            .collect();

        debug!(keys = stats.len(), "时间窗聚合完成");
        stats
    }

    /// 单键聚合（events 已按日期升序）
    fn aggregate_key(
        &self,
        events: &[(NaiveDate, i64)],
        as_of: NaiveDateTime,
        window_start: NaiveDateTime,
        lookback_start: NaiveDateTime,
    ) -> AggregateStats {
        let consumption_window = events
            .iter()
            .filter(|(date, _)| at_midnight(*date) >= window_start)
            .fold(0i64, |acc, (_, qty)| acc.saturating_add(*qty));

        let lookback: Vec<&(NaiveDate, i64)> = events
            .iter()
            .filter(|(date, _)| at_midnight(*date) >= lookback_start)
            .collect();

        let first_activity = lookback.first().map(|(date, _)| *date);
        let days_active = first_activity.map(|date| whole_days_between(at_midnight(date), as_of));
        let max_movement_qty = lookback.iter().map(|(_, qty)| *qty).max().unwrap_or(0);

        AggregateStats {
            consumption_window,
            first_activity,
            days_active,
            movement_count: lookback.len(),
            max_movement_qty,
            mean_interval_days: mean_interval(lookback.iter().map(|(date, _)| *date)),
        }
    }
}

/// 相邻动销日期的平均间隔（天）；少于 2 次为 None
fn mean_interval<I: Iterator<Item = NaiveDate>>(sorted_dates: I) -> Option<f64> {
    let dates: Vec<NaiveDate> = sorted_dates.collect();
    if dates.len() < 2 {
        return None;
    }
    let total: i64 = dates
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days())
        .sum();
    Some(total as f64 / (dates.len() - 1) as f64)
}
