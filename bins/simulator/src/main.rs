//! Exotic Markets simulator
//!
//! Drives the engine through approve, create market and dispute vote
//! against an in-memory ledger.

use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

use exotic_core::SessionContext;
use exotic_core::allowance::ApprovalLocks;
use exotic_core::dispute::{DisputeInfo, DisputeVotingMachine, DisputeVotingOption};
use exotic_core::ledger::{InMemoryLedger, LedgerWriter, MarketsParameters};
use exotic_core::market::{CreateMarketAction, MarketCreationFlow, MarketDraft, Tag};
use exotic_core::notify::{RecordingNavigator, TracingNotifier};
use exotic_shared::AppConfig;
use exotic_shared::types::{Address, TokenAmount};

const CREATOR: Address = Address::from_low_byte(0x01);
const COUNCIL_MEMBER: Address = Address::from_low_byte(0xc1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;

    let fmt_layer = if config.logging.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exotic=debug".into()),
        )
        .with(fmt_layer)
        .init();

    let params = MarketsParameters::from(&config.markets);
    let decimals = config.network.currency_decimals;
    info!(
        chain_id = config.network.chain_id,
        currency = %config.network.payment_currency,
        bond = %params.fixed_bond_amount,
        "simulator configured"
    );

    let ledger = InMemoryLedger::new(params.clone(), decimals);
    ledger.set_balance(CREATOR, starting_balance(config.markets.fixed_bond_amount)?);
    ledger.add_council_member(COUNCIL_MEMBER);

    let locks = ApprovalLocks::new();
    let market = create_market(&ledger, params, locks, &config).await?;
    vote_on_dispute(&ledger, market, config.network.chain_id).await?;

    info!(
        submissions = ledger.submissions().len(),
        creator_balance = %ledger.balance_of(CREATOR),
        "simulation finished"
    );
    Ok(())
}

/// Funds the creator with ten bonds.
fn starting_balance(bond: Decimal) -> anyhow::Result<TokenAmount> {
    bond.checked_mul(Decimal::TEN)
        .map(TokenAmount::new)
        .context("configured bond is too large to fund the creator")
}

async fn create_market(
    ledger: &InMemoryLedger,
    params: MarketsParameters,
    locks: ApprovalLocks,
    config: &AppConfig,
) -> anyhow::Result<Address> {
    let session = SessionContext::connected(CREATOR, config.network.chain_id);
    let navigator = Arc::new(RecordingNavigator::new());
    let tags = vec![Tag::new(1, "Sports"), Tag::new(2, "Crypto")];
    let draft = MarketDraft::new(&params, Utc::now(), tags);

    let flow = MarketCreationFlow::new(
        params,
        ledger.bonds_spender(),
        config.network.currency_decimals,
        locks,
        Arc::new(TracingNotifier),
        navigator.clone(),
    )
    .with_draft(draft);

    flow.edit(|draft| -> anyhow::Result<()> {
        draft.set_question("Will the network process a million transactions this week?");
        draft.set_data_source("https://optimistic.etherscan.io");
        draft.set_position(0, "Yes")?;
        draft.set_position(1, "No")?;
        draft.set_ticket_price(TokenAmount::new(Decimal::new(25, 1)))?;
        draft.add_tag(2)?;
        Ok(())
    })?;

    flow.refresh(ledger, &session).await;
    let action = flow.action(&session);
    info!(action = action.label_key(), "draft complete");

    if action == (CreateMarketAction::Approve { in_progress: false }) {
        flow.request_approval();
        let allowance = flow.approve(&session, ledger).await?;
        info!(current = %allowance.current, required = %allowance.required, "bonds contract approved");
    }

    let market = flow.submit(&session, ledger).await?;
    info!(market = %market, visited = navigator.visited().len(), "market created");
    Ok(market)
}

async fn vote_on_dispute(
    ledger: &InMemoryLedger,
    market: Address,
    chain_id: u64,
) -> anyhow::Result<()> {
    let session = SessionContext::connected(COUNCIL_MEMBER, chain_id);
    let dispute = DisputeInfo {
        market,
        dispute_number: 1,
        is_in_positioning_phase: false,
    };
    let positions = vec!["Yes".to_string(), "No".to_string()];

    let machine = DisputeVotingMachine::load(
        ledger,
        &session,
        dispute,
        &positions,
        1,
        Arc::new(TracingNotifier),
    )
    .await
    .with_reconcile(true);

    if !machine.is_council_member() {
        bail!("{COUNCIL_MEMBER} is not on the oracle council");
    }

    machine.select_vote(DisputeVotingOption::AcceptResult)?;
    machine.select_position(2)?;
    let first = machine.submit(&session, ledger).await?;
    info!(vote = first.vote, position = first.position, "dispute vote recorded");

    machine.select_vote(DisputeVotingOption::AcceptReset)?;
    let changed = machine.submit(&session, ledger).await?;
    info!(vote = changed.vote, position = changed.position, "dispute vote changed");
    Ok(())
}
