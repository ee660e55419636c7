use sea_orm::sea_query::LockType;
use sea_orm::{ActiveModelTrait, DatabaseTransaction, EntityTrait, IntoActiveModel, QuerySelect, Set};

use crate::{
    entity::order_counters::{Entity as OrderCounters, Model as CounterModel},
    error::{AppError, AppResult},
};

const MIN_WIDTH: usize = 5;

/// Next human-readable order id after `last`.
///
/// Ids are zero-padded decimal strings, at least five digits wide. The width
/// grows by one digit once the current width is exhausted, so the sequence
/// stays strictly increasing and lexicographically sortable with no ceiling:
/// `"00001"`, ..., `"99999"`, `"100000"`, ...
pub fn next_order_id(last: Option<&str>) -> AppResult<String> {
    let current = last.unwrap_or("00000");
    let value: u64 = current
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid order id '{current}'")))?;

    let mut width = current.len().max(MIN_WIDTH);
    if value >= 10u64.pow(width as u32) - 1 {
        width += 1;
    }

    Ok(format!("{:0width$}", value + 1))
}

/// Allocates the next order id inside an open transaction.
///
/// The singleton counter row is read under `FOR UPDATE`, so concurrent
/// creations serialize here instead of racing on a read-latest-then-increment.
pub async fn allocate_order_id(txn: &DatabaseTransaction) -> AppResult<String> {
    let counter: CounterModel = OrderCounters::find()
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::Dependency("Order counter row is missing".to_string()))?;

    let next = next_order_id(counter.last_id.as_deref())?;

    let mut active = counter.into_active_model();
    active.last_id = Set(Some(next.clone()));
    active.update(txn).await?;

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_from_empty() {
        assert_eq!(next_order_id(None).unwrap(), "00001");
    }

    #[test]
    fn increments_and_keeps_padding() {
        assert_eq!(next_order_id(Some("00001")).unwrap(), "00002");
        assert_eq!(next_order_id(Some("00419")).unwrap(), "00420");
        assert_eq!(next_order_id(Some("99998")).unwrap(), "99999");
    }

    #[test]
    fn widens_at_power_of_ten_boundary() {
        assert_eq!(next_order_id(Some("99999")).unwrap(), "100000");
        assert_eq!(next_order_id(Some("100000")).unwrap(), "100001");
        assert_eq!(next_order_id(Some("999999")).unwrap(), "1000000");
    }

    #[test]
    fn sequence_is_strictly_increasing_and_sortable() {
        let mut id = "99995".to_string();
        for _ in 0..10 {
            let next = next_order_id(Some(&id)).unwrap();
            assert!(next.len() >= MIN_WIDTH);
            assert!(next > id || next.len() > id.len(), "{id} -> {next}");
            assert!(next.parse::<u64>().unwrap() == id.parse::<u64>().unwrap() + 1);
            id = next;
        }
        assert_eq!(id, "100005");
    }

    #[test]
    fn rejects_garbage() {
        assert!(next_order_id(Some("12ab3")).is_err());
    }
}
