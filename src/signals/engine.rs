//! Per-asset evaluation pipeline: indicators, structure, bias, score, geometry.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::indicators::{IndicatorBank, StructureDetector};
use crate::models::indicators::{Candle, IndicatorSet};
use crate::models::policy::ScoringPolicy;
use crate::models::signal::{Bias, Signal, Tier};
use crate::models::structure::StructureSet;
use crate::services::market_data::FetchError;
use crate::signals::bias::BiasVoter;
use crate::signals::decision::RiskGeometry;
use crate::signals::scoring::{ConfluenceScorer, Scorecard, Verdict};

pub const MIN_CANDLES: usize = 50;

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("insufficient data: {got} bars, need {required}")]
    InsufficientData { got: usize, required: usize },

    #[error("market data: {0}")]
    Fetch(#[from] FetchError),

    #[error("blocked: {reason}")]
    Blocked { reason: String },

    #[error("invalid series: {0}")]
    InvalidSeries(String),
}

/// Everything produced while evaluating one asset under one tier.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub signal: Signal,
    pub verdict: Verdict,
    pub scorecard: Scorecard,
    pub bias: Bias,
    pub indicators: IndicatorSet,
    pub structure: StructureSet,
}

pub struct SignalEngine {
    policy: ScoringPolicy,
    bank: IndicatorBank,
    detector: StructureDetector,
    voter: BiasVoter,
    min_candles: usize,
}

impl SignalEngine {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self {
            bank: IndicatorBank::new(policy.periods.clone()),
            detector: StructureDetector::new(policy.structure.clone()),
            voter: BiasVoter::default(),
            min_candles: MIN_CANDLES,
            policy,
        }
    }

    pub fn with_min_candles(mut self, min_candles: usize) -> Self {
        self.min_candles = min_candles;
        self
    }

    pub fn with_bias_voter(mut self, voter: BiasVoter) -> Self {
        self.voter = voter;
        self
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn min_candles(&self) -> usize {
        self.min_candles
    }

    /// Evaluate `candles` (oldest first) for `symbol` under `tier`.
    ///
    /// A sub-threshold score is not an error: it yields a HOLD signal with the
    /// scorecard attached.
    pub fn evaluate(
        &self,
        symbol: &str,
        candles: &[Candle],
        tier: Tier,
        now: DateTime<Utc>,
    ) -> Result<Evaluation, EvaluationError> {
        if candles.len() < self.min_candles {
            return Err(EvaluationError::InsufficientData {
                got: candles.len(),
                required: self.min_candles,
            });
        }
        validate_series(candles)?;

        let last = candles
            .last()
            .ok_or_else(|| EvaluationError::InvalidSeries("empty series".to_string()))?;
        let indicators = self
            .bank
            .compute(symbol, candles)
            .ok_or_else(|| EvaluationError::InvalidSeries("empty series".to_string()))?;
        let structure = self.detector.detect(candles);
        let bias = self.voter.vote(&indicators);

        let scorecard = ConfluenceScorer::new(&self.policy).score(&indicators, &structure, bias, last, tier);
        let tier_policy = self.policy.tier(tier);
        let verdict = scorecard.verdict(tier_policy);

        let signal = if verdict == Verdict::Actionable {
            let entry = indicators.price;
            let geometry = RiskGeometry::compute(
                scorecard.direction,
                entry,
                &indicators,
                &structure,
                tier_policy.risk_reward,
                self.policy.atr_stop_multiplier,
            );
            Signal {
                asset: symbol.to_string(),
                direction: scorecard.direction,
                confidence: scorecard.confidence,
                entry_price: entry,
                stop_loss: geometry.stop_loss,
                take_profit: geometry.take_profit,
                risk_reward: geometry.risk_reward,
                tier,
                reasons: scorecard.reasons.clone(),
                timestamp: now,
            }
        } else {
            Signal::hold(symbol, tier, now)
        };

        Ok(Evaluation {
            signal,
            verdict,
            scorecard,
            bias,
            indicators,
            structure,
        })
    }

    /// Like [`evaluate`](Self::evaluate) but every failure resolves to HOLD.
    pub fn evaluate_or_hold(
        &self,
        symbol: &str,
        candles: &[Candle],
        tier: Tier,
        now: DateTime<Utc>,
    ) -> Signal {
        self.evaluate(symbol, candles, tier, now)
            .map(|evaluation| evaluation.signal)
            .unwrap_or_else(|_| Signal::hold(symbol, tier, now))
    }
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::new(ScoringPolicy::default())
    }
}

fn validate_series(candles: &[Candle]) -> Result<(), EvaluationError> {
    if let Some(bad) = candles.iter().position(|c| {
        ![c.open, c.high, c.low, c.close, c.volume]
            .iter()
            .all(|v| v.is_finite())
    }) {
        return Err(EvaluationError::InvalidSeries(format!(
            "non-finite value at bar {}",
            bad
        )));
    }
    if candles.windows(2).any(|w| w[1].timestamp < w[0].timestamp) {
        return Err(EvaluationError::InvalidSeries(
            "bars are not in chronological order".to_string(),
        ));
    }
    Ok(())
}
