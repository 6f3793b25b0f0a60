//! The line-oriented transaction DSL: `parse_file` turns DSL text into
//! [`Transaction`] values; [`crate::dsl`] serializes the other way.

use crate::error::CgtError;
use crate::models::{Currency, OptionType, Transaction, TransactionKind};
use chrono::NaiveDate;
use pest_consume::{Error, Parser, match_nodes};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

type ParseResult<T> = std::result::Result<T, Error<Rule>>;
type Node<'i> = pest_consume::Node<'i, Rule, ()>;

#[derive(Parser)]
#[grammar = "parser.pest"]
struct CgtParser;

struct RawTransaction {
    date: NaiveDate,
    kind: String,
    symbol: String,
    fields: HashMap<String, String>,
}

#[pest_consume::parser]
impl CgtParser {
    fn EOI(_input: Node) -> ParseResult<()> {
        Ok(())
    }

    fn date(input: Node) -> ParseResult<NaiveDate> {
        NaiveDate::parse_from_str(input.as_str(), "%Y-%m-%d")
            .map_err(|_| input.error("invalid date, expected YYYY-MM-DD"))
    }

    fn kind_word(input: Node) -> ParseResult<String> {
        Ok(input.as_str().to_string())
    }

    fn symbol(input: Node) -> ParseResult<String> {
        Ok(input.as_str().to_uppercase())
    }

    fn key(input: Node) -> ParseResult<String> {
        Ok(input.as_str().to_string())
    }

    fn value(input: Node) -> ParseResult<String> {
        Ok(input.as_str().to_string())
    }

    fn field(input: Node) -> ParseResult<(String, String)> {
        Ok(match_nodes!(input.into_children();
            [key(k), value(v)] => (k, v),
        ))
    }

    fn transaction(input: Node) -> ParseResult<RawTransaction> {
        let mut date = None;
        let mut kind = None;
        let mut symbol = None;
        let mut fields = HashMap::new();

        for child in input.into_children() {
            match child.as_rule() {
                Rule::date => date = Some(Self::date(child)?),
                Rule::kind_word => kind = Some(Self::kind_word(child)?),
                Rule::symbol => symbol = Some(Self::symbol(child)?),
                Rule::field => {
                    let (k, v) = Self::field(child)?;
                    fields.insert(k, v);
                }
                _ => {}
            }
        }

        Ok(RawTransaction {
            date: date.expect("grammar guarantees a date"),
            kind: kind.expect("grammar guarantees a kind"),
            symbol: symbol.expect("grammar guarantees a symbol"),
            fields,
        })
    }

    fn COMMENT(_input: Node) -> ParseResult<()> {
        Ok(())
    }

    fn transaction_list(input: Node) -> ParseResult<Vec<RawTransaction>> {
        let mut out = Vec::new();
        for child in input.into_children() {
            if child.as_rule() == Rule::transaction {
                out.push(Self::transaction(child)?);
            }
        }
        Ok(out)
    }
}

fn kind_from_word(word: &str) -> Option<TransactionKind> {
    use TransactionKind::*;
    Some(match word {
        "BUY" => Buy,
        "SELL" => Sell,
        "DIVIDEND" => Dividend,
        "FEE" => Fee,
        "INTEREST" => Interest,
        "TRANSFER" => Transfer,
        "TAX" => Tax,
        "STOCK_SPLIT" => StockSplit,
        "OPT_BUY_TO_OPEN" => OptBuyToOpen,
        "OPT_SELL_TO_OPEN" => OptSellToOpen,
        "OPT_BUY_TO_CLOSE" => OptBuyToClose,
        "OPT_SELL_TO_CLOSE" => OptSellToClose,
        "OPT_ASSIGNED" => OptAssigned,
        "OPT_EXPIRED" => OptExpired,
        _ => return None,
    })
}

fn parse_decimal_field(fields: &HashMap<String, String>, key: &str) -> Option<Decimal> {
    fields.get(key).and_then(|v| Decimal::from_str(v).ok())
}

fn build_transaction(
    index: usize,
    raw: RawTransaction,
) -> Result<Transaction, CgtError> {
    let kind = kind_from_word(&raw.kind).ok_or_else(|| {
        CgtError::InvalidTransaction(format!("unrecognized transaction kind '{}'", raw.kind))
    })?;

    let currency = match raw.fields.get("currency") {
        Some(code) => Currency::from_code(code)
            .ok_or_else(|| CgtError::InvalidCurrencyCode { code: code.clone() })?,
        None => Currency::GBP,
    };

    let opt_type = match raw.fields.get("opt_type").map(String::as_str) {
        Some("CALL") => Some(OptionType::Call),
        Some("PUT") => Some(OptionType::Put),
        Some(other) => {
            return Err(CgtError::InvalidTransaction(format!(
                "unrecognized opt_type '{other}'"
            )));
        }
        None => None,
    };

    let expiration = raw
        .fields
        .get("expiration")
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| CgtError::InvalidTransaction("invalid expiration date".to_string()))?;

    let id = raw
        .fields
        .get("id")
        .cloned()
        .unwrap_or_else(|| format!("dsl-{index}"));

    Ok(Transaction {
        id,
        source: "dsl".to_string(),
        symbol: raw.symbol,
        date: raw.date,
        kind,
        quantity: parse_decimal_field(&raw.fields, "qty"),
        price: parse_decimal_field(&raw.fields, "price"),
        currency,
        total: parse_decimal_field(&raw.fields, "total"),
        fee: parse_decimal_field(&raw.fields, "fee"),
        ratio: raw.fields.get("ratio").cloned(),
        is_short_sell: raw.fields.get("short").map(|v| v == "true"),
        underlying: raw.fields.get("underlying").cloned(),
        opt_type,
        strike: parse_decimal_field(&raw.fields, "strike"),
        expiration,
        contract_size: raw.fields.get("contract_size").and_then(|v| v.parse().ok()),
        ignored: false,
    })
}

/// Parse DSL text into transactions. Currency stays in its original
/// denomination; GBP conversion happens later, in the pipeline.
pub fn parse_file(input: &str) -> Result<Vec<Transaction>, CgtError> {
    let inputs = CgtParser::parse(Rule::transaction_list, input)
        .map_err(|e| CgtError::ParseError(Box::new(e)))?;
    let input = inputs
        .single()
        .map_err(|e| CgtError::ParseError(Box::new(e)))?;
    let raw_transactions = CgtParser::transaction_list(input)?;

    raw_transactions
        .into_iter()
        .enumerate()
        .map(|(i, raw)| build_transaction(i, raw))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_simple_buy_and_sell() {
        let input = "2024-03-18 BUY AAPL qty=10 price=180.00\n2024-03-18 SELL AAPL qty=10 price=185.00\n";
        let transactions = parse_file(input).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].kind, TransactionKind::Buy);
        assert_eq!(transactions[0].symbol, "AAPL");
        assert_eq!(transactions[0].price, Some(Decimal::from(180)));
        assert_eq!(transactions[1].kind, TransactionKind::Sell);
    }

    #[test]
    fn parses_option_fields_and_currency() {
        let input =
            "2024-02-01 OPT_SELL_TO_OPEN AAPLC qty=1 price=2.50 currency=USD underlying=AAPL opt_type=CALL strike=150 expiration=2024-06-21 short=true\n";
        let transactions = parse_file(input).unwrap();
        assert_eq!(transactions.len(), 1);
        let tx = &transactions[0];
        assert_eq!(tx.kind, TransactionKind::OptSellToOpen);
        assert_eq!(tx.currency, Currency::USD);
        assert_eq!(tx.underlying.as_deref(), Some("AAPL"));
        assert_eq!(tx.opt_type, Some(OptionType::Call));
        assert_eq!(tx.is_short_sell, Some(true));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let input = "# a comment\n\n2024-01-01 BUY AAPL qty=1 price=1\n";
        let transactions = parse_file(input).unwrap();
        assert_eq!(transactions.len(), 1);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let input = "2024-01-01 FROBNICATE AAPL qty=1\n";
        assert!(parse_file(input).is_err());
    }
}
