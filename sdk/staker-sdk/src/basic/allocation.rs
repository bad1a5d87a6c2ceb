use crate::error::{Result, StakerSdkError};
use crate::types::Asset;

/// Uniform share of `total` for each of `count` receivers, truncated toward zero.
///
/// Returns `None` when there is nobody to share with. The remainder of the
/// integer division stays with the custodian.
pub fn per_beneficiary(total: Asset, count: usize) -> Option<Asset> {
    if count == 0 {
        return None;
    }
    let count = i64::try_from(count).ok()?;
    Some(Asset::new(total.amount / count, total.symbol))
}

/// Fail unless `available` covers `required`
pub fn ensure_sufficient_balance(available: Asset, required: Asset) -> Result<()> {
    if available.symbol != required.symbol || available.amount < required.amount {
        return Err(StakerSdkError::InsufficientBalance {
            required: required.to_string(),
            available: available.to_string(),
        });
    }
    Ok(())
}
