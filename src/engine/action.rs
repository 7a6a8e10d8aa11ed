// ==========================================
// 医院寄售库存优化 - 补货动作判定
// ==========================================
// 判定表（按序）:
//   1) 已过期 → Remove – Expired（覆盖一切）
//   2) 差值 > 0 → Reduce
//   3) 差值 < 0 → Increase
//   4) 否则 → OK
// 临期时 Reduce/Increase 追加 "(Expiring Soon)"
// ==========================================

use crate::domain::types::{ExpiryStatus, StockAction};

pub struct ActionResolver;

impl ActionResolver {
    pub fn resolve(&self, status: ExpiryStatus, difference: i64) -> StockAction {
        let expiring_soon = status == ExpiryStatus::ExpiringSoon;
        match status {
            ExpiryStatus::Expired => StockAction::RemoveExpired,
            _ if difference > 0 => StockAction::Reduce { expiring_soon },
            _ if difference < 0 => StockAction::Increase { expiring_soon },
            _ => StockAction::Ok,
        }
    }
}
