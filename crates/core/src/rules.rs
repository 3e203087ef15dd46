//! Ordered rule evaluation.
//!
//! Priority ladders (submit-button resolution, first missing field) are
//! expressed as tables of `(predicate, outcome)` pairs evaluated in order.
//! The first rule whose predicate holds wins.

/// A single rule: when `applies(ctx)` holds, `outcome(ctx)` is the result.
pub struct Rule<C, O> {
    /// Short name used in debug logs.
    pub name: &'static str,
    /// Predicate over the evaluation context.
    pub applies: fn(&C) -> bool,
    /// Outcome produced when the predicate holds.
    pub outcome: fn(&C) -> O,
}

impl<C, O> Rule<C, O> {
    /// Creates a rule.
    pub const fn new(name: &'static str, applies: fn(&C) -> bool, outcome: fn(&C) -> O) -> Self {
        Self {
            name,
            applies,
            outcome,
        }
    }
}

/// Evaluates `rules` in order and returns the first matching outcome.
pub fn first_match<C, O>(ctx: &C, rules: &[Rule<C, O>]) -> Option<O> {
    rules.iter().find(|rule| (rule.applies)(ctx)).map(|rule| {
        tracing::trace!(rule = rule.name, "rule matched");
        (rule.outcome)(ctx)
    })
}
