//! The pipeline orchestrator: the single linear sequence from raw
//! transactions to a fully assembled [`CgtResult`].

pub mod fx_enricher;
pub mod split_extractor;
pub mod split_normaliser;
pub mod tax_year_enricher;

use crate::assembler;
use crate::error::CgtError;
use crate::matcher;
use crate::models::{CgtResult, EnrichedTransaction, Issue, Metadata, Transaction, TransactionKind};
use crate::providers::{CancellationToken, FxProvider, SplitFeed};
use crate::validation;

/// Run the full pipeline: validate, resolve splits, normalise for
/// splits, resolve FX, tag tax years, match disposals, assemble results.
///
/// `current_year` anchors the split feed's lookback window; the caller
/// supplies it rather than the pipeline reading the system clock, so
/// runs stay reproducible.
pub async fn run(
    mut transactions: Vec<Transaction>,
    fx_provider: &dyn FxProvider,
    split_feed: &dyn SplitFeed,
    cancel: &CancellationToken,
    current_year: i32,
) -> Result<CgtResult, CgtError> {
    let mut issues = validation::validate(&mut transactions);

    if cancel.is_cancelled() {
        return Err(CgtError::Cancelled);
    }
    let split_outcome =
        split_extractor::extract_splits(&transactions, split_feed, current_year).await;
    issues.extend(split_outcome.issues);
    transactions.extend(split_outcome.synthetic_transactions);
    transactions.sort_by_key(|t| t.date);

    let mut enriched: Vec<EnrichedTransaction> = transactions
        .into_iter()
        .map(EnrichedTransaction::from_transaction)
        .collect();

    split_normaliser::normalise(&mut enriched, &split_outcome.events);

    let fx_issues = fx_enricher::enrich(&mut enriched, fx_provider, cancel).await?;
    issues.extend(fx_issues);

    tax_year_enricher::enrich(&mut enriched);

    let (matchings, pools) = matcher::run_all(&mut enriched);

    let disposals = assembler::assemble_disposals(&enriched, &matchings);
    let tax_year_summaries = assembler::assemble_tax_year_summaries(&enriched, &disposals);

    for disposal in &disposals {
        if disposal.is_incomplete {
            issues.push(Issue::IncompleteDisposal {
                disposal_id: disposal.id.clone(),
                unmatched_quantity: disposal.unmatched_quantity,
            });
        }
    }

    let total_buys = enriched
        .iter()
        .filter(|t| !t.transaction.ignored && t.transaction.kind == TransactionKind::Buy)
        .count();
    let total_sells = enriched
        .iter()
        .filter(|t| !t.transaction.ignored && t.transaction.kind == TransactionKind::Sell)
        .count();

    let metadata = Metadata {
        calculated_at: chrono::Utc::now(),
        total_transactions: enriched.len(),
        total_buys,
        total_sells,
        total_issues: issues.len(),
    };

    Ok(CgtResult {
        transactions: enriched,
        disposals,
        section_104_pools: pools,
        tax_year_summaries,
        issues,
        metadata,
    })
}
