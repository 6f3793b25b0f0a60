//! Tax-year enricher: a pure annotation pass.

use crate::models::EnrichedTransaction;
use crate::tax_year::TaxPeriod;

pub fn enrich(transactions: &mut [EnrichedTransaction]) {
    for tx in transactions.iter_mut() {
        tx.tax_year = Some(TaxPeriod::from_date(tx.transaction.date));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, Transaction, TransactionKind};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn assigns_tax_year_from_date() {
        let mut txs = vec![EnrichedTransaction::from_transaction(Transaction {
            id: "t1".into(),
            source: "test".into(),
            symbol: "AAPL".into(),
            date: NaiveDate::from_ymd_opt(2024, 4, 5).unwrap(),
            kind: TransactionKind::Sell,
            quantity: Some(Decimal::ONE),
            price: Some(Decimal::ONE),
            currency: Currency::GBP,
            total: None,
            fee: None,
            ratio: None,
            is_short_sell: None,
            underlying: None,
            opt_type: None,
            strike: None,
            expiration: None,
            contract_size: None,
            ignored: false,
        })];
        enrich(&mut txs);
        assert_eq!(txs[0].tax_year.unwrap().label(), "2023/24");
    }
}
