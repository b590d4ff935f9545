//! The weekly batch run.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use ledger::{LedgerDb, PointsReceipt};
use merkle::MerkleCommitment;
use rewards::{
    aggregate_splits, curve, rank_builders, split_builder_quota, Address, ClaimEntry, CurveConfig,
    SplitConfig, WeekContext,
};

use crate::error::{PipelineError, Result};
use crate::sources::{HoldingsSource, LeaderboardSource, MissingWalletPolicy, WalletResolver};

/// One identity's weekly total with its resolved wallet.
struct ResolvedEarner {
    user_id: Uuid,
    address: Address,
    points: u64,
}

/// Orchestrates one week's reward computation and commitment.
///
/// Reads through the collaborator seams, writes receipts and exactly one
/// commitment row into the ledger. Intended to run once per week to
/// completion; it holds no internal mutable state between runs.
pub struct WeeklyPipeline<L, H, W> {
    leaderboard: L,
    holdings: H,
    wallets: W,
    ledger: Arc<LedgerDb>,
    curve: CurveConfig,
    split: SplitConfig,
    wallet_policy: MissingWalletPolicy,
}

impl<L, H, W> WeeklyPipeline<L, H, W>
where
    L: LeaderboardSource,
    H: HoldingsSource,
    W: WalletResolver,
{
    /// Create a pipeline with default curve, split and wallet policy.
    pub fn new(leaderboard: L, holdings: H, wallets: W, ledger: Arc<LedgerDb>) -> Self {
        Self {
            leaderboard,
            holdings,
            wallets,
            ledger,
            curve: CurveConfig::default(),
            split: SplitConfig::default(),
            wallet_policy: MissingWalletPolicy::default(),
        }
    }

    /// Override the reward curve parameters.
    pub fn with_curve_config(mut self, curve: CurveConfig) -> Self {
        self.curve = curve;
        self
    }

    /// Override the scout/builder split parameters.
    pub fn with_split_config(mut self, split: SplitConfig) -> Self {
        self.split = split;
        self
    }

    /// Override the missing-wallet policy.
    pub fn with_wallet_policy(mut self, policy: MissingWalletPolicy) -> Self {
        self.wallet_policy = policy;
        self
    }

    /// Compute the week's claim set without side effects.
    ///
    /// Pure read-side computation: rank, normalize, split per builder,
    /// aggregate, resolve wallets, merge per address. Nothing is written.
    pub async fn compute_weekly_claims(&self, ctx: &WeekContext) -> Result<Vec<ClaimEntry>> {
        let earners = self.compute_week(ctx).await?;
        Ok(merge_claims(&earners))
    }

    /// Run the full weekly batch: compute claims, record ledger receipts,
    /// build the Merkle tree and persist the commitment.
    ///
    /// Rejected up front if the week already has a commitment; fails
    /// before persisting the commitment if any stage fails.
    pub async fn generate_weekly_claims(&self, ctx: &WeekContext) -> Result<MerkleCommitment> {
        ctx.validate().map_err(PipelineError::Rewards)?;

        if self.ledger.get_commitment(&ctx.week)?.is_some() {
            return Err(PipelineError::CommitmentExists(ctx.week.clone()));
        }

        let earners = self.compute_week(ctx).await?;
        let claims = merge_claims(&earners);
        let commitment = MerkleCommitment::build(&ctx.season, &ctx.week, claims)?;

        // Receipts precede the commitment row inside one ledger
        // transaction: a run losing the unique-week race (or failing
        // mid-write) rolls its receipts back with it, so claimable
        // points never drift from the committed claim set.
        let event_id = format!("gems_payout:{}", ctx.week);
        let receipts: Vec<PointsReceipt> = earners
            .iter()
            .map(|earner| {
                PointsReceipt::new(
                    earner.user_id,
                    earner.points,
                    event_id.clone(),
                    ctx.season.clone(),
                )
            })
            .collect();

        self.ledger
            .commit_week(&receipts, &commitment)
            .map_err(|e| match e {
                ledger::LedgerError::CommitmentExists(week) => {
                    PipelineError::CommitmentExists(week)
                }
                other => PipelineError::Ledger(other),
            })?;

        info!(
            week = %ctx.week,
            root = %commitment.merkle_tree_root,
            total_claimable = commitment.total_claimable,
            claims = commitment.claims.len(),
            "Committed weekly claims"
        );
        Ok(commitment)
    }

    /// Ranked computation up to wallet resolution.
    async fn compute_week(&self, ctx: &WeekContext) -> Result<Vec<ResolvedEarner>> {
        ctx.validate().map_err(PipelineError::Rewards)?;

        let stats = self.leaderboard.weekly_stats(ctx).await?;
        let entries = rank_builders(stats);
        let factor =
            curve::normalization_factor(entries.len() as u32, ctx.weekly_budget, &self.curve)?;

        info!(
            week = %ctx.week,
            ranked = entries.len(),
            "Computing weekly claims"
        );

        let mut splits = Vec::with_capacity(entries.len());
        for entry in entries.iter().take(self.curve.max_ranks as usize) {
            let quota =
                curve::normalized_quota(entry.rank, ctx.weekly_budget, factor, self.curve.decay);
            let holdings = self.holdings.holdings(entry.builder_id, &ctx.season).await?;
            splits.push(split_builder_quota(
                entry.builder_id,
                quota,
                &holdings,
                &self.split,
            ));
        }

        // Sorted so wallet lookups and failures are deterministic
        let mut totals: Vec<(Uuid, u64)> = aggregate_splits(&splits).into_iter().collect();
        totals.sort_unstable_by_key(|(user_id, _)| *user_id);

        let mut earners = Vec::with_capacity(totals.len());
        for (user_id, points) in totals {
            match self.wallets.wallet_address(user_id).await? {
                Some(address) => earners.push(ResolvedEarner {
                    user_id,
                    address,
                    points,
                }),
                None => match self.wallet_policy {
                    MissingWalletPolicy::WarnAndSkip => warn!(
                        user = %user_id,
                        points,
                        "No wallet registered; weekly points forfeited"
                    ),
                    MissingWalletPolicy::Fail => {
                        return Err(PipelineError::MissingWallet(user_id))
                    }
                },
            }
        }

        Ok(earners)
    }
}

/// Merge per-identity totals into one claim per distinct address.
///
/// A builder and scout sharing a wallet, or one wallet registered for two
/// identities, collapse into a single summed claim.
fn merge_claims(earners: &[ResolvedEarner]) -> Vec<ClaimEntry> {
    let mut by_address: BTreeMap<Address, u64> = BTreeMap::new();
    for earner in earners {
        *by_address.entry(earner.address).or_default() += earner.points;
    }

    by_address
        .into_iter()
        .filter(|(_, amount)| *amount > 0)
        .map(|(address, amount)| ClaimEntry { address, amount })
        .collect()
}
