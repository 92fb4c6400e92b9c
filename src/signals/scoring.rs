//! Confluence scoring: candidate direction, gates and weighted evidence

use serde::{Deserialize, Serialize};

use crate::indicators::volatility::{at_lower_band, at_upper_band};
use crate::models::indicators::{Candle, Crossover, IndicatorSet};
use crate::models::policy::{EvidenceWeights, ScoringPolicy, TierPolicy};
use crate::models::signal::{Bias, SignalDirection, SignalReason, Tier};
use crate::models::structure::{near_any, MarketStructure, StructureSet};

pub const MAX_CONFIDENCE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvidenceTerm {
    HighVolume,
    NearPivot,
    NearFibonacci,
    CleanCandle,
    NearLiquidity,
    NearOrderBlock,
    MssAligned,
    NearPoc,
    WilliamsR,
    BollingerExtreme,
}

impl EvidenceTerm {
    pub const ALL: [EvidenceTerm; 10] = [
        EvidenceTerm::HighVolume,
        EvidenceTerm::NearPivot,
        EvidenceTerm::NearFibonacci,
        EvidenceTerm::CleanCandle,
        EvidenceTerm::NearLiquidity,
        EvidenceTerm::NearOrderBlock,
        EvidenceTerm::MssAligned,
        EvidenceTerm::NearPoc,
        EvidenceTerm::WilliamsR,
        EvidenceTerm::BollingerExtreme,
    ];

    pub fn weight(&self, weights: &EvidenceWeights) -> f64 {
        match self {
            EvidenceTerm::HighVolume => weights.high_volume,
            EvidenceTerm::NearPivot => weights.near_pivot,
            EvidenceTerm::NearFibonacci => weights.near_fibonacci,
            EvidenceTerm::CleanCandle => weights.clean_candle,
            EvidenceTerm::NearLiquidity => weights.near_liquidity,
            EvidenceTerm::NearOrderBlock => weights.near_order_block,
            EvidenceTerm::MssAligned => weights.mss_aligned,
            EvidenceTerm::NearPoc => weights.near_poc,
            EvidenceTerm::WilliamsR => weights.williams_r,
            EvidenceTerm::BollingerExtreme => weights.bollinger_extreme,
        }
    }

    pub fn describe(&self, direction: SignalDirection) -> &'static str {
        let buy = direction == SignalDirection::Buy;
        match self {
            EvidenceTerm::HighVolume => "High volume",
            EvidenceTerm::NearPivot if buy => "Near support",
            EvidenceTerm::NearPivot => "Near resistance",
            EvidenceTerm::NearFibonacci => "Near Fibonacci level",
            EvidenceTerm::CleanCandle => "Clean candle",
            EvidenceTerm::NearLiquidity => "Near liquidity zone",
            EvidenceTerm::NearOrderBlock if buy => "Near bullish order block",
            EvidenceTerm::NearOrderBlock => "Near bearish order block",
            EvidenceTerm::MssAligned if buy => "Bullish structure shift with EMA cross-up",
            EvidenceTerm::MssAligned => "Bearish structure shift with EMA cross-down",
            EvidenceTerm::NearPoc => "Near volume point of control",
            EvidenceTerm::WilliamsR => "Williams %R overbought",
            EvidenceTerm::BollingerExtreme if buy => "At lower Bollinger band",
            EvidenceTerm::BollingerExtreme => "At upper Bollinger band",
        }
    }
}

/// Why an asset produced no candidate direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoldReason {
    RsiUnavailable,
    RsiNotExtreme,
    /// Crossover present but RSI already beyond the opposite cutoff.
    RsiOverextended,
    BiasBlocked(Bias),
    NoCrossover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Actionable,
    /// Sub-threshold but above the tier's watch threshold. Never dispatched.
    Watch,
    Hold,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scorecard {
    pub tier: Tier,
    /// Candidate direction; HOLD when no candidate survived the gates.
    pub direction: SignalDirection,
    pub confidence: f64,
    pub evidence: Vec<(EvidenceTerm, bool)>,
    pub reasons: Vec<SignalReason>,
    pub hold_reason: Option<HoldReason>,
}

impl Scorecard {
    fn hold(tier: Tier, reason: HoldReason) -> Self {
        Self {
            tier,
            direction: SignalDirection::Hold,
            confidence: 0.0,
            evidence: Vec::new(),
            reasons: Vec::new(),
            hold_reason: Some(reason),
        }
    }

    pub fn verdict(&self, tier: &TierPolicy) -> Verdict {
        if self.direction == SignalDirection::Hold {
            return Verdict::Hold;
        }
        if self.confidence >= tier.threshold {
            Verdict::Actionable
        } else if tier.watch_threshold.is_some_and(|w| self.confidence >= w) {
            Verdict::Watch
        } else {
            Verdict::Hold
        }
    }
}

/// Sum of the weights of the terms that hit, clipped to `[0, 100]`.
pub fn accumulate_confidence(terms: &[(f64, bool)]) -> f64 {
    terms
        .iter()
        .filter(|(_, hit)| *hit)
        .map(|(weight, _)| weight.max(0.0))
        .sum::<f64>()
        .min(MAX_CONFIDENCE)
}

pub struct ConfluenceScorer<'a> {
    policy: &'a ScoringPolicy,
}

impl<'a> ConfluenceScorer<'a> {
    pub fn new(policy: &'a ScoringPolicy) -> Self {
        Self { policy }
    }

    /// Candidate direction from the RSI extreme, or from the EMA crossover when
    /// the policy requires one, then the bias gate.
    pub fn candidate_direction(
        &self,
        indicators: &IndicatorSet,
        bias: Bias,
    ) -> Result<SignalDirection, HoldReason> {
        let entry = &self.policy.entry;
        let rsi = indicators.rsi_value().ok_or(HoldReason::RsiUnavailable)?;

        let direction = if entry.require_crossover {
            match indicators.ema_crossover() {
                Crossover::Up if rsi > entry.rsi_sell_above => {
                    return Err(HoldReason::RsiOverextended)
                }
                Crossover::Down if rsi < entry.rsi_buy_below => {
                    return Err(HoldReason::RsiOverextended)
                }
                Crossover::Up => SignalDirection::Buy,
                Crossover::Down => SignalDirection::Sell,
                Crossover::None => return Err(HoldReason::NoCrossover),
            }
        } else if rsi < entry.rsi_buy_below {
            SignalDirection::Buy
        } else if rsi > entry.rsi_sell_above {
            SignalDirection::Sell
        } else {
            return Err(HoldReason::RsiNotExtreme);
        };

        if entry.bias_gate {
            match (direction, bias) {
                (SignalDirection::Buy, Bias::Short) | (SignalDirection::Sell, Bias::Long) => {
                    return Err(HoldReason::BiasBlocked(bias));
                }
                _ => {}
            }
        }

        Ok(direction)
    }

    /// Evaluate every evidence term for `direction` against the latest candle.
    pub fn evidence(
        &self,
        direction: SignalDirection,
        indicators: &IndicatorSet,
        structure: &StructureSet,
        candle: &Candle,
        tier: &TierPolicy,
    ) -> Vec<(EvidenceTerm, bool)> {
        let buy = direction == SignalDirection::Buy;
        let price = indicators.price;
        let level_tol = self.policy.structure.level_tolerance;
        let zone_tol = self.policy.structure.zone_tolerance;

        EvidenceTerm::ALL
            .iter()
            .map(|&term| {
                let hit = match term {
                    EvidenceTerm::HighVolume => indicators
                        .volume_ratio()
                        .is_some_and(|r| r > tier.high_volume_ratio),
                    EvidenceTerm::NearPivot => {
                        let pivots = if buy {
                            &structure.supports
                        } else {
                            &structure.resistances
                        };
                        near_any(pivots, price, level_tol)
                    }
                    EvidenceTerm::NearFibonacci => {
                        near_any(&structure.fib_levels(), price, level_tol)
                    }
                    EvidenceTerm::CleanCandle => candle
                        .wick_to_body()
                        .is_some_and(|ratio| ratio < tier.max_wick_ratio),
                    EvidenceTerm::NearLiquidity => structure
                        .liquidity_zones()
                        .any(|zone| zone.is_near(price, zone_tol)),
                    EvidenceTerm::NearOrderBlock => {
                        let blocks = if buy {
                            &structure.bullish_order_blocks
                        } else {
                            &structure.bearish_order_blocks
                        };
                        near_any(blocks, price, zone_tol)
                    }
                    EvidenceTerm::MssAligned => {
                        let cross = indicators.ema_crossover();
                        if buy {
                            structure.market_structure == MarketStructure::Bullish
                                && cross == Crossover::Up
                        } else {
                            structure.market_structure == MarketStructure::Bearish
                                && cross == Crossover::Down
                        }
                    }
                    EvidenceTerm::NearPoc => structure
                        .poc_level()
                        .is_some_and(|poc| poc.is_near(price, zone_tol)),
                    EvidenceTerm::WilliamsR => {
                        !buy && indicators
                            .williams_r
                            .as_ref()
                            .is_some_and(|w| w.value > tier.williams_r_trigger)
                    }
                    EvidenceTerm::BollingerExtreme => {
                        indicators.bollinger.as_ref().is_some_and(|bands| {
                            if buy {
                                at_lower_band(price, bands)
                            } else {
                                at_upper_band(price, bands)
                            }
                        })
                    }
                };
                (term, hit)
            })
            .collect()
    }

    pub fn score(
        &self,
        indicators: &IndicatorSet,
        structure: &StructureSet,
        bias: Bias,
        candle: &Candle,
        tier: Tier,
    ) -> Scorecard {
        let direction = match self.candidate_direction(indicators, bias) {
            Ok(direction) => direction,
            Err(reason) => return Scorecard::hold(tier, reason),
        };

        let tier_policy = self.policy.tier(tier);
        let evidence = self.evidence(direction, indicators, structure, candle, tier_policy);

        let weighted: Vec<(f64, bool)> = evidence
            .iter()
            .map(|(term, hit)| (term.weight(&tier_policy.weights), *hit))
            .collect();
        let confidence = accumulate_confidence(&weighted);

        let reasons = evidence
            .iter()
            .filter(|(term, hit)| *hit && term.weight(&tier_policy.weights) > 0.0)
            .map(|(term, _)| SignalReason {
                description: term.describe(direction).to_string(),
                weight: term.weight(&tier_policy.weights),
            })
            .collect();

        Scorecard {
            tier,
            direction,
            confidence,
            evidence,
            reasons,
            hold_reason: None,
        }
    }
}
