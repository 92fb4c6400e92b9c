//! Stop-loss / take-profit geometry from structural levels

use serde::{Deserialize, Serialize};

use crate::models::indicators::IndicatorSet;
use crate::models::signal::SignalDirection;
use crate::models::structure::StructureSet;

const EMA_STOP_OFFSET: f64 = 0.005;
const POC_STOP_OFFSET: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskGeometry {
    pub stop_loss: f64,
    pub take_profit: f64,
    /// `0.0` when the stop sits on the entry and the ratio is undefined.
    pub risk_reward: f64,
}

impl RiskGeometry {
    pub fn none() -> Self {
        Self {
            stop_loss: 0.0,
            take_profit: 0.0,
            risk_reward: 0.0,
        }
    }

    /// Derive the stop from structure, then project the target by `rr_factor`.
    ///
    /// BUY takes the highest candidate floor below entry (lower band, trend EMA
    /// x0.995, POC x0.99, nearest retracement below); SELL mirrors with the
    /// lowest ceiling above entry. With no candidate the stop falls back to
    /// `atr_multiplier` ATRs, and without ATR it collapses onto the entry.
    pub fn compute(
        direction: SignalDirection,
        entry: f64,
        indicators: &IndicatorSet,
        structure: &StructureSet,
        rr_factor: f64,
        atr_multiplier: f64,
    ) -> Self {
        let atr = indicators.atr.as_ref().map(|a| a.value).filter(|v| *v > 0.0);
        let stop = match direction {
            SignalDirection::Hold => return Self::none(),
            SignalDirection::Buy => buy_stop_candidates(entry, indicators, structure)
                .into_iter()
                .filter(|c| *c < entry)
                .reduce(f64::max)
                .or_else(|| atr.map(|a| entry - a * atr_multiplier)),
            SignalDirection::Sell => sell_stop_candidates(entry, indicators, structure)
                .into_iter()
                .filter(|c| *c > entry)
                .reduce(f64::min)
                .or_else(|| atr.map(|a| entry + a * atr_multiplier)),
        };

        Self::from_stop(direction, entry, stop.unwrap_or(entry), rr_factor)
    }

    pub fn from_stop(direction: SignalDirection, entry: f64, stop_loss: f64, rr_factor: f64) -> Self {
        let take_profit = take_profit(direction, entry, stop_loss, rr_factor);
        Self {
            stop_loss,
            take_profit,
            risk_reward: risk_reward_ratio(entry, stop_loss, take_profit),
        }
    }

    pub fn is_degenerate(&self, entry: f64) -> bool {
        self.stop_loss == entry
    }
}

fn buy_stop_candidates(entry: f64, indicators: &IndicatorSet, structure: &StructureSet) -> Vec<f64> {
    [
        indicators.bollinger.as_ref().map(|b| b.lower),
        indicators.ema_trend().map(|ema| ema * (1.0 - EMA_STOP_OFFSET)),
        structure.point_of_control.map(|poc| poc * (1.0 - POC_STOP_OFFSET)),
        structure.fibonacci.as_ref().and_then(|f| f.nearest_below(entry)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn sell_stop_candidates(entry: f64, indicators: &IndicatorSet, structure: &StructureSet) -> Vec<f64> {
    [
        indicators.bollinger.as_ref().map(|b| b.upper),
        indicators.ema_trend().map(|ema| ema * (1.0 + EMA_STOP_OFFSET)),
        structure.point_of_control.map(|poc| poc * (1.0 + POC_STOP_OFFSET)),
        structure.fibonacci.as_ref().and_then(|f| f.nearest_above(entry)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// BUY: entry + risk x factor. SELL: entry - risk x factor.
pub fn take_profit(direction: SignalDirection, entry: f64, stop_loss: f64, rr_factor: f64) -> f64 {
    match direction {
        SignalDirection::Buy => entry + (entry - stop_loss) * rr_factor,
        SignalDirection::Sell => entry - (stop_loss - entry) * rr_factor,
        SignalDirection::Hold => entry,
    }
}

/// Reward over risk, or `0.0` when the stop equals the entry.
pub fn risk_reward_ratio(entry: f64, stop_loss: f64, take_profit: f64) -> f64 {
    let risk = (entry - stop_loss).abs();
    if risk == 0.0 {
        return 0.0;
    }
    (take_profit - entry).abs() / risk
}
