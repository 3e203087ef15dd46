//! Editable market draft.

use chrono::{DateTime, Duration, Months, Utc};
use exotic_shared::types::TokenAmount;
use tracing::debug;

use super::error::DraftError;
use super::types::{MarketType, Tag, TagSuggestion};
use crate::ledger::{CreateMarketCall, MarketsParameters};

/// Every market has at least this many positions.
pub const MIN_POSITIONS: usize = 2;

/// Allowed range for the end of positioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositioningWindow {
    /// Earliest allowed end: now plus the minimum positioning duration.
    pub min: DateTime<Utc>,
    /// Latest allowed end: one calendar month after `min`.
    pub max: DateTime<Utc>,
}

impl PositioningWindow {
    /// Computes the window for a draft started at `now`.
    #[must_use]
    pub fn starting_at(now: DateTime<Utc>, minimum_duration_secs: u64) -> Self {
        let min = after(now, minimum_duration_secs);
        let max = min.checked_add_months(Months::new(1)).unwrap_or(min);
        Self { min, max }
    }

    /// Clamps `date` into the window.
    #[must_use]
    pub fn clamp(&self, date: DateTime<Utc>) -> DateTime<Utc> {
        date.clamp(self.min, self.max)
    }

    /// Default end: noon UTC on the day `default_duration_secs` after `min`.
    #[must_use]
    pub fn default_end(&self, default_duration_secs: u64) -> DateTime<Utc> {
        let target = after(self.min, default_duration_secs);
        let noon = target
            .date_naive()
            .and_hms_opt(12, 0, 0)
            .map_or(target, |noon| noon.and_utc());
        self.clamp(noon)
    }
}

/// `date` plus `secs` seconds, saturating at the latest representable time.
fn after(date: DateTime<Utc>, secs: u64) -> DateTime<Utc> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|offset| date.checked_add_signed(offset))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// A market being composed by its creator.
///
/// Fields are private so every edit goes through the limits: text is
/// truncated, the positioning end is clamped, positions and tags stay in
/// range.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketDraft {
    question: String,
    data_source: String,
    positions: Vec<String>,
    market_type: MarketType,
    ticket_price: Option<TokenAmount>,
    positioning_end: DateTime<Utc>,
    withdrawal_allowed: bool,
    tags: Vec<Tag>,
    suggestions: Vec<TagSuggestion>,
    window: PositioningWindow,
    max_positions: usize,
    max_tags: usize,
    max_input_characters: usize,
}

impl MarketDraft {
    /// Creates an empty draft: two blank positions, ticket market,
    /// withdrawal allowed, default positioning end.
    #[must_use]
    pub fn new(params: &MarketsParameters, now: DateTime<Utc>, available_tags: Vec<Tag>) -> Self {
        let window = PositioningWindow::starting_at(now, params.minimum_positioning_duration_secs);
        Self {
            question: String::new(),
            data_source: String::new(),
            positions: vec![String::new(); MIN_POSITIONS],
            market_type: MarketType::Ticket,
            ticket_price: None,
            positioning_end: window.default_end(params.default_positioning_duration_secs),
            withdrawal_allowed: true,
            tags: Vec::new(),
            suggestions: available_tags
                .into_iter()
                .map(|tag| TagSuggestion {
                    tag,
                    disabled: false,
                })
                .collect(),
            window,
            max_positions: params.max_positions.max(MIN_POSITIONS),
            max_tags: params.max_tags,
            max_input_characters: params.max_input_characters,
        }
    }

    /// The market question.
    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Where the result will be sourced from.
    #[must_use]
    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    /// Position phrases in order.
    #[must_use]
    pub fn positions(&self) -> &[String] {
        &self.positions
    }

    /// Ticket or open bid.
    #[must_use]
    pub fn market_type(&self) -> MarketType {
        self.market_type
    }

    /// Ticket price, if one has been entered.
    #[must_use]
    pub fn ticket_price(&self) -> Option<TokenAmount> {
        self.ticket_price
    }

    /// End of positioning.
    #[must_use]
    pub fn positioning_end(&self) -> DateTime<Utc> {
        self.positioning_end
    }

    /// Allowed range for the end of positioning.
    #[must_use]
    pub fn window(&self) -> PositioningWindow {
        self.window
    }

    /// Whether participants may withdraw before maturity.
    #[must_use]
    pub fn withdrawal_allowed(&self) -> bool {
        self.withdrawal_allowed
    }

    /// Selected tags in selection order.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Tag suggestions; those already selected are disabled.
    #[must_use]
    pub fn suggestions(&self) -> &[TagSuggestion] {
        &self.suggestions
    }

    /// Sets the question, truncated to the input limit.
    pub fn set_question(&mut self, text: &str) {
        self.question = self.truncate(text);
    }

    /// Sets the data source, truncated to the input limit.
    pub fn set_data_source(&mut self, text: &str) {
        self.data_source = self.truncate(text);
    }

    fn truncate(&self, text: &str) -> String {
        text.chars().take(self.max_input_characters).collect()
    }

    /// Appends a blank position.
    pub fn add_position(&mut self) -> Result<(), DraftError> {
        if self.positions.len() >= self.max_positions {
            return Err(DraftError::TooManyPositions {
                max: self.max_positions,
            });
        }
        self.positions.push(String::new());
        Ok(())
    }

    /// Removes the position at `index`.
    pub fn remove_position(&mut self, index: usize) -> Result<String, DraftError> {
        self.check_position(index)?;
        if self.positions.len() <= MIN_POSITIONS {
            return Err(DraftError::TooFewPositions { min: MIN_POSITIONS });
        }
        Ok(self.positions.remove(index))
    }

    /// Replaces the text of the position at `index`.
    pub fn set_position(&mut self, index: usize, text: &str) -> Result<(), DraftError> {
        self.check_position(index)?;
        self.positions[index] = self.truncate(text);
        Ok(())
    }

    fn check_position(&self, index: usize) -> Result<(), DraftError> {
        if index >= self.positions.len() {
            return Err(DraftError::PositionOutOfRange {
                index,
                len: self.positions.len(),
            });
        }
        Ok(())
    }

    /// Switches between ticket and open-bid markets.
    pub fn toggle_market_type(&mut self) {
        self.market_type = self.market_type.toggled();
    }

    /// Sets the market type.
    pub fn set_market_type(&mut self, market_type: MarketType) {
        self.market_type = market_type;
    }

    /// Sets the ticket price.
    pub fn set_ticket_price(&mut self, price: TokenAmount) -> Result<(), DraftError> {
        if price.is_negative() {
            return Err(DraftError::NegativeTicketPrice(price));
        }
        self.ticket_price = Some(price);
        Ok(())
    }

    /// Clears the ticket price input.
    pub fn clear_ticket_price(&mut self) {
        self.ticket_price = None;
    }

    /// Flips whether withdrawal is allowed.
    pub fn toggle_withdrawal(&mut self) {
        self.withdrawal_allowed = !self.withdrawal_allowed;
    }

    /// Sets the end of positioning, clamped into the window. Returns the
    /// value applied.
    pub fn set_positioning_end(&mut self, date: DateTime<Utc>) -> DateTime<Utc> {
        let clamped = self.window.clamp(date);
        if clamped != date {
            debug!(requested = %date, applied = %clamped, "positioning end clamped");
        }
        self.positioning_end = clamped;
        clamped
    }

    /// Selects the suggested tag `id`.
    ///
    /// Selecting a tag twice is a no-op.
    pub fn add_tag(&mut self, id: u64) -> Result<(), DraftError> {
        if self.tags.iter().any(|t| t.id == id) {
            return Ok(());
        }
        if self.tags.len() >= self.max_tags {
            return Err(DraftError::TooManyTags { max: self.max_tags });
        }
        let suggestion = self
            .suggestions
            .iter_mut()
            .find(|s| s.tag.id == id)
            .ok_or(DraftError::UnknownTag(id))?;
        suggestion.disabled = true;
        self.tags.push(suggestion.tag.clone());
        Ok(())
    }

    /// Removes the selected tag at `index` and re-enables its suggestion.
    pub fn remove_tag(&mut self, index: usize) -> Result<Tag, DraftError> {
        if index >= self.tags.len() {
            return Err(DraftError::TagOutOfRange {
                index,
                len: self.tags.len(),
            });
        }
        let tag = self.tags.remove(index);
        if let Some(suggestion) = self.suggestions.iter_mut().find(|s| s.tag.id == tag.id) {
            suggestion.disabled = false;
        }
        Ok(tag)
    }

    /// Builds the market manager call for this draft.
    ///
    /// The ticket price is sent as 0 for open-bid markets.
    pub fn to_call(&self, decimals: u32) -> Result<CreateMarketCall, DraftError> {
        let ticket_price = match self.market_type {
            MarketType::Ticket => self
                .ticket_price
                .unwrap_or(TokenAmount::ZERO)
                .to_base_units(decimals)?,
            MarketType::OpenBid => 0,
        };
        Ok(CreateMarketCall {
            question: self.question.clone(),
            data_source: self.data_source.clone(),
            end_of_positioning: self.positioning_end.timestamp(),
            ticket_price,
            withdrawal_allowed: self.withdrawal_allowed,
            tags: self.tags.iter().map(|t| t.id).collect(),
            position_count: self.positions.len(),
            positions: self.positions.clone(),
        })
    }
}
