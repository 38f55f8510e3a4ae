//! Trap and entry-timing advisories for the advanced analysis.

use super::indicators::IndicatorSnapshot;
use crate::types::TrapKind;

/// Classify the latest bar as a possible bull trap, bear trap, or neither.
///
/// Bull trap: close breaks above the recent high on below-average volume.
/// Bear trap: close sits under the slow EMA on above-average volume.
pub fn detect_trap(snap: &IndicatorSnapshot) -> TrapKind {
    let thin_volume = snap.volume < snap.avg_volume;
    let heavy_volume = snap.volume > snap.avg_volume;

    if snap.recent_high.is_some_and(|high| snap.close > high) && thin_volume {
        TrapKind::BullTrap
    } else if snap.close < snap.ema_slow && heavy_volume {
        TrapKind::BearTrap
    } else {
        TrapKind::None
    }
}

pub fn entry_timing(snap: &IndicatorSnapshot) -> String {
    if snap.close > snap.ema_fast && snap.close > snap.ema_slow {
        format!("Buy on pullback near ₹{:.2}", snap.ema_fast)
    } else if snap.close < snap.ema_fast {
        match snap.recent_high {
            Some(high) => format!("Wait for breakout above ₹{:.2}", high),
            None => "Wait for breakout".to_string(),
        }
    } else {
        "Avoid trade for now".to_string()
    }
}
