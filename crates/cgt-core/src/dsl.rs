//! DSL serializer: the inverse of [`crate::parser`], converting
//! [`Transaction`] values back to DSL lines.

use crate::models::{OptionType, Transaction, TransactionKind};

fn kind_word(kind: TransactionKind) -> &'static str {
    use TransactionKind::*;
    match kind {
        Buy => "BUY",
        Sell => "SELL",
        Dividend => "DIVIDEND",
        Fee => "FEE",
        Interest => "INTEREST",
        Transfer => "TRANSFER",
        Tax => "TAX",
        StockSplit => "STOCK_SPLIT",
        OptBuyToOpen => "OPT_BUY_TO_OPEN",
        OptSellToOpen => "OPT_SELL_TO_OPEN",
        OptBuyToClose => "OPT_BUY_TO_CLOSE",
        OptSellToClose => "OPT_SELL_TO_CLOSE",
        OptAssigned => "OPT_ASSIGNED",
        OptExpired => "OPT_EXPIRED",
    }
}

/// Convert a single transaction to a DSL line.
pub fn transaction_to_dsl(tx: &Transaction) -> String {
    let date = tx.date.format("%Y-%m-%d");
    let mut line = format!("{} {} {}", date, kind_word(tx.kind), tx.symbol);

    line.push_str(&format!(" id={}", tx.id));
    if let Some(qty) = tx.quantity {
        line.push_str(&format!(" qty={qty}"));
    }
    if let Some(price) = tx.price {
        line.push_str(&format!(" price={price}"));
    }
    if tx.currency != cgt_money::Currency::GBP {
        line.push_str(&format!(" currency={}", tx.currency.code()));
    }
    if let Some(total) = tx.total {
        line.push_str(&format!(" total={total}"));
    }
    if let Some(fee) = tx.fee {
        line.push_str(&format!(" fee={fee}"));
    }
    if let Some(ratio) = &tx.ratio {
        line.push_str(&format!(" ratio={ratio}"));
    }
    if tx.is_short_sell == Some(true) {
        line.push_str(" short=true");
    }
    if let Some(underlying) = &tx.underlying {
        line.push_str(&format!(" underlying={underlying}"));
    }
    if let Some(opt_type) = tx.opt_type {
        line.push_str(&format!(
            " opt_type={}",
            match opt_type {
                OptionType::Call => "CALL",
                OptionType::Put => "PUT",
            }
        ));
    }
    if let Some(strike) = tx.strike {
        line.push_str(&format!(" strike={strike}"));
    }
    if let Some(expiration) = tx.expiration {
        line.push_str(&format!(" expiration={}", expiration.format("%Y-%m-%d")));
    }
    if let Some(contract_size) = tx.contract_size {
        line.push_str(&format!(" contract_size={contract_size}"));
    }

    line
}

/// Convert transactions to DSL format, one line per transaction.
pub fn transactions_to_dsl(transactions: &[Transaction]) -> String {
    transactions
        .iter()
        .map(transaction_to_dsl)
        .collect::<Vec<_>>()
        .join("\n")
}
