//! Market creation.
//!
//! A [`MarketDraft`] is edited field by field and validated continuously.
//! [`MarketCreationFlow`] combines the draft's validation, the bond
//! allowance and the creator's balance into a single submit action and
//! submits the market through a [`crate::transaction::TransactionWorkflow`].
//!
//! # Modules
//!
//! - `types` - Market type, tags, positions and missing-field keys
//! - `draft` - The editable draft and its limits
//! - `validation` - Field predicates and the first-missing-field ladder
//! - `flow` - Submit action resolution and market submission
//! - `error` - Draft and submission errors

mod draft;
mod error;
mod flow;
mod types;
mod validation;

#[cfg(test)]
mod flow_props;
#[cfg(test)]
mod validation_props;

pub use draft::{MarketDraft, PositioningWindow, MIN_POSITIONS};
pub use error::{CreateMarketError, DraftError};
pub use flow::{CreateMarketAction, MarketCreationFlow};
pub use types::{MarketPositions, MarketType, MissingField, Tag, TagSuggestion};
pub use validation::{FieldStatus, insufficient_balance};
