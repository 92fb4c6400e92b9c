//! Three-vote directional bias from RSI, MACD and the EMA pair

use crate::models::indicators::IndicatorSet;
use crate::models::signal::Bias;

/// RSI outside `[neutral_below, neutral_above]` abstains from the vote as NEUTRAL.
#[derive(Debug, Clone)]
pub struct BiasVoter {
    pub neutral_below: f64,
    pub neutral_above: f64,
}

impl Default for BiasVoter {
    fn default() -> Self {
        Self {
            neutral_below: 35.0,
            neutral_above: 65.0,
        }
    }
}

impl BiasVoter {
    /// Missing inputs leave the bias NEUTRAL.
    pub fn vote(&self, indicators: &IndicatorSet) -> Bias {
        let (Some(rsi), Some(macd), Some(ema)) = (
            indicators.rsi.as_ref(),
            indicators.macd.as_ref(),
            indicators.ema_cross.as_ref(),
        ) else {
            return Bias::Neutral;
        };

        self.vote_values(rsi.value, macd.macd, macd.signal, ema.fast.value, ema.slow.value)
    }

    pub fn vote_values(
        &self,
        rsi: f64,
        macd: f64,
        macd_signal: f64,
        ema_fast: f64,
        ema_slow: f64,
    ) -> Bias {
        let votes = [
            self.rsi_vote(rsi),
            if macd > macd_signal { Bias::Long } else { Bias::Short },
            if ema_fast > ema_slow { Bias::Long } else { Bias::Short },
        ];

        let longs = votes.iter().filter(|v| **v == Bias::Long).count();
        let shorts = votes.iter().filter(|v| **v == Bias::Short).count();

        if longs >= 2 {
            Bias::Long
        } else if shorts >= 2 {
            Bias::Short
        } else {
            Bias::Neutral
        }
    }

    fn rsi_vote(&self, rsi: f64) -> Bias {
        if rsi < self.neutral_below || rsi > self.neutral_above {
            Bias::Neutral
        } else if rsi > 50.0 {
            Bias::Long
        } else {
            Bias::Short
        }
    }
}
