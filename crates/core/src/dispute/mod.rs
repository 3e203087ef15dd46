//! Dispute voting.
//!
//! Oracle council members vote on disputes raised against a market. Each
//! dispute card owns a [`DisputeVotingMachine`] holding the member's
//! working selection and last confirmed vote, deriving which options,
//! outcome positions and submit action are available.
//!
//! # Modules
//!
//! - `types` - Voting options, dispute info, outcome candidates, vote state
//! - `machine` - The voting state machine and vote submission
//! - `error` - Dispute voting errors

mod error;
mod machine;
mod types;

#[cfg(test)]
mod machine_props;

pub use error::DisputeError;
pub use machine::DisputeVotingMachine;
pub use types::{
    CANCEL_LABEL_KEY, DisputeInfo, DisputeVoteState, DisputeVotingOption, MARKET_OPEN_OPTIONS,
    MARKET_RESOLVED_OPTIONS, NO_SELECTION, OutcomeCandidate, VoteAction, outcome_candidates,
};
