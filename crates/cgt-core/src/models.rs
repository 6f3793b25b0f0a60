//! The transaction model and the result types the pipeline produces.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use cgt_money::Currency;
pub use crate::tax_year::TaxPeriod;

/// The closed set of brokerage event kinds this engine understands.
///
/// New option events must be added here, not bolted on as a boolean flag,
/// so every `match` on this enum fails to compile until it is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Buy,
    Sell,
    Dividend,
    Fee,
    Interest,
    Transfer,
    Tax,
    StockSplit,
    OptBuyToOpen,
    OptSellToOpen,
    OptBuyToClose,
    OptSellToClose,
    OptAssigned,
    OptExpired,
}

impl TransactionKind {
    pub fn is_option(&self) -> bool {
        matches!(
            self,
            TransactionKind::OptBuyToOpen
                | TransactionKind::OptSellToOpen
                | TransactionKind::OptBuyToClose
                | TransactionKind::OptSellToClose
                | TransactionKind::OptAssigned
                | TransactionKind::OptExpired
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionType {
    Call,
    Put,
}

/// A single brokerage event, as supplied by an external parser.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Transaction {
    pub id: String,
    pub source: String,
    pub symbol: String,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[schemars(with = "String")]
    pub currency: Currency,
    #[serde(default)]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub fee: Option<Decimal>,
    /// `"new:old"`, required iff `kind == StockSplit`.
    #[serde(default)]
    pub ratio: Option<String>,
    #[serde(default)]
    pub is_short_sell: Option<bool>,
    #[serde(default)]
    pub underlying: Option<String>,
    #[serde(default)]
    pub opt_type: Option<OptionType>,
    #[serde(default)]
    pub strike: Option<Decimal>,
    #[serde(default)]
    pub expiration: Option<NaiveDate>,
    #[serde(default)]
    pub contract_size: Option<u32>,
    #[serde(default)]
    pub ignored: bool,
}

impl Transaction {
    /// Contract size for cost-basis math: the declared size, or 100 (the
    /// standard US equity-option multiplier) for unlabelled option events.
    pub fn effective_contract_size(&self) -> Decimal {
        if self.kind.is_option() {
            Decimal::from(self.contract_size.unwrap_or(100))
        } else {
            Decimal::ONE
        }
    }
}

/// Parsed view of a `StockSplit` transaction's `ratio` string.
#[derive(Debug, Clone, PartialEq)]
pub struct StockSplitEvent {
    pub symbol: String,
    pub date: NaiveDate,
    pub ratio_from: u32,
    pub ratio_to: u32,
    pub ratio_multiplier: Decimal,
    pub source: String,
}

/// Which matcher rule (if any) claimed a transaction's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GainGroup {
    #[default]
    None,
    SameDay,
    ThirtyDay,
    Section104,
    ShortSell,
}

/// `Transaction` plus every value the pipeline computes from it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EnrichedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,

    pub split_adjusted_quantity: Option<Decimal>,
    pub split_adjusted_price: Option<Decimal>,
    pub split_multiplier: Decimal,
    pub applied_splits: Vec<String>,

    pub fx_rate: Decimal,
    pub price_gbp: Option<Decimal>,
    pub split_adjusted_price_gbp: Option<Decimal>,
    pub value_gbp: Option<Decimal>,
    pub fee_gbp: Option<Decimal>,
    pub fx_source: String,
    pub fx_error: Option<String>,

    pub tax_year: Option<TaxPeriod>,

    pub gain_group: GainGroup,
    pub match_groups: Vec<String>,
}

impl EnrichedTransaction {
    /// Start of the pipeline: wrap a raw transaction with unset computed
    /// fields. Split/FX/tax-year enrichment fill these in.
    pub fn from_transaction(transaction: Transaction) -> Self {
        Self {
            transaction,
            split_adjusted_quantity: None,
            split_adjusted_price: None,
            split_multiplier: Decimal::ONE,
            applied_splits: Vec::new(),
            fx_rate: Decimal::ZERO,
            price_gbp: None,
            split_adjusted_price_gbp: None,
            value_gbp: None,
            fee_gbp: None,
            fx_source: String::new(),
            fx_error: None,
            tax_year: None,
            gain_group: GainGroup::None,
            match_groups: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchRule {
    ShortSell,
    SameDay,
    ThirtyDay,
    Section104,
}

/// One acquisition's contribution to a disposal's match.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AcquisitionMatch {
    pub tx_ref: String,
    pub quantity_matched: Decimal,
    pub cost_basis_gbp: Decimal,
}

/// Output of any matcher stage: one disposal matched against one or more
/// acquisitions under a single rule.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Matching {
    pub disposal: String,
    pub acquisitions: Vec<AcquisitionMatch>,
    pub rule: MatchRule,
}

impl Matching {
    pub fn quantity_matched(&self) -> Decimal {
        self.acquisitions.iter().map(|a| a.quantity_matched).sum()
    }

    pub fn total_cost_basis_gbp(&self) -> Decimal {
        self.acquisitions.iter().map(|a| a.cost_basis_gbp).sum()
    }
}

/// A running-average Section 104 cost pool for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Section104Pool {
    pub quantity: Decimal,
    pub total_cost_gbp: Decimal,
}

impl Section104Pool {
    pub fn zero() -> Self {
        Self {
            quantity: Decimal::ZERO,
            total_cost_gbp: Decimal::ZERO,
        }
    }

    pub fn average_cost_gbp(&self) -> Decimal {
        if self.quantity.is_zero() {
            Decimal::ZERO
        } else {
            self.total_cost_gbp / self.quantity
        }
    }
}

/// One disposal transaction's fully assembled CGT outcome.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DisposalRecord {
    pub id: String,
    pub symbol: String,
    pub date: NaiveDate,
    pub tax_year: TaxPeriod,
    pub effective_quantity: Decimal,
    pub proceeds_gbp: Decimal,
    pub allowable_costs_gbp: Decimal,
    pub gain_or_loss_gbp: Decimal,
    pub matchings: Vec<Matching>,
    pub unmatched_quantity: Decimal,
    pub is_incomplete: bool,
}

/// Per-tax-year aggregate totals.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TaxYearSummary {
    pub tax_year: TaxPeriod,
    pub disposal_count: usize,
    pub total_proceeds_gbp: Decimal,
    pub total_gains_gbp: Decimal,
    pub total_losses_gbp: Decimal,
    pub net_gain_gbp: Decimal,
    pub annual_exempt_amount: Decimal,
    pub taxable_gain_gbp: Decimal,
    pub dividend_count: usize,
    pub dividend_total_gbp: Decimal,
    pub dividend_allowance: Decimal,
}

/// Non-fatal conditions surfaced for operator review.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Issue {
    FxResolution { tx_id: String, message: String },
    SplitFeedFailure { message: String },
    InvalidSplitRatio { tx_id: String, raw: String },
    IncompleteDisposal { disposal_id: String, unmatched_quantity: Decimal },
    IncompleteAcquisition { tx_id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Metadata {
    pub calculated_at: chrono::DateTime<chrono::Utc>,
    pub total_transactions: usize,
    pub total_buys: usize,
    pub total_sells: usize,
    pub total_issues: usize,
}

/// Everything the pipeline produces for one run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CgtResult {
    pub transactions: Vec<EnrichedTransaction>,
    pub disposals: Vec<DisposalRecord>,
    pub section_104_pools: HashMap<String, Section104Pool>,
    pub tax_year_summaries: Vec<TaxYearSummary>,
    pub issues: Vec<Issue>,
    pub metadata: Metadata,
}
