//! Trading signals service module.
//!
//! Provides technical indicator calculations, rule-based scoring
//! and the trap and entry-timing advisories.

pub mod advisory;
pub mod indicators;
pub mod presets;
pub mod rules;

pub use advisory::{detect_trap, entry_timing};
pub use indicators::{Indicator, IndicatorFrame, IndicatorSnapshot, IndicatorSpec};
pub use presets::Preset;
pub use rules::{Condition, Decision, EmaLine, Note, NoteKind, Rule, RuleSet, Scorecard};
