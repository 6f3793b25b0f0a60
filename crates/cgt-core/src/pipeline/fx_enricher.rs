//! FX enricher.
//!
//! Conversion direction: a provider's `rate` is foreign-currency-units
//! per one GBP, so converting to GBP always **divides** by `rate`.

use crate::models::{Currency, EnrichedTransaction, Issue};
use crate::providers::{CancellationToken, FxProvider};
use rust_decimal::Decimal;

pub async fn enrich(
    transactions: &mut [EnrichedTransaction],
    provider: &dyn FxProvider,
    cancel: &CancellationToken,
) -> Result<Vec<Issue>, crate::error::CgtError> {
    let mut issues = Vec::new();

    for tx in transactions.iter_mut() {
        if tx.transaction.ignored {
            continue;
        }
        if cancel.is_cancelled() {
            return Err(crate::error::CgtError::Cancelled);
        }

        if tx.transaction.currency == Currency::GBP {
            tx.fx_rate = Decimal::ONE;
            tx.fx_source = "Native GBP".to_string();
            apply_rate(tx, Decimal::ONE);
            continue;
        }

        match provider.get_rate(tx.transaction.date, tx.transaction.currency).await {
            Ok(rate) => {
                tx.fx_rate = rate.rate;
                tx.fx_source = format!("{:?}", tx.transaction.currency);
                apply_rate(tx, rate.rate);
            }
            Err(err) => {
                tx.fx_rate = Decimal::ZERO;
                tx.price_gbp = None;
                tx.split_adjusted_price_gbp = None;
                tx.value_gbp = None;
                tx.fee_gbp = None;
                tx.fx_source = "Failed".to_string();
                tx.fx_error = Some(err.0.clone());
                issues.push(Issue::FxResolution {
                    tx_id: tx.transaction.id.clone(),
                    message: err.0,
                });
            }
        }
    }

    Ok(issues)
}

fn apply_rate(tx: &mut EnrichedTransaction, rate: Decimal) {
    let to_gbp = |amount: Decimal| amount / rate;

    tx.price_gbp = tx.transaction.price.map(to_gbp);
    tx.split_adjusted_price_gbp = tx.split_adjusted_price.map(to_gbp);
    tx.fee_gbp = tx.transaction.fee.map(to_gbp).or(Some(Decimal::ZERO));

    let raw_value = tx.transaction.total.or_else(|| {
        let qty = tx.transaction.quantity?;
        let price = tx.transaction.price?;
        Some(qty.abs() * price * tx.transaction.effective_contract_size())
    });
    tx.value_gbp = raw_value.map(to_gbp);
}
