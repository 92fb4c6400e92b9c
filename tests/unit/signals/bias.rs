//! Unit tests for the bias vote

use confluence::models::indicators::IndicatorSet;
use confluence::models::signal::Bias;
use confluence::signals::bias::BiasVoter;

#[test]
fn majority_of_three_votes_wins() {
    let voter = BiasVoter::default();
    // RSI 55 long, MACD above signal long, EMA fast below slow short.
    assert_eq!(voter.vote_values(55.0, 1.0, 0.5, 99.0, 100.0), Bias::Long);
    // RSI 45 short, MACD below signal short, EMA long.
    assert_eq!(voter.vote_values(45.0, 0.5, 1.0, 101.0, 100.0), Bias::Short);
}

#[test]
fn rsi_outside_band_abstains() {
    let voter = BiasVoter::default();
    // RSI neutral, MACD long, EMA short: no majority.
    assert_eq!(voter.vote_values(20.0, 1.0, 0.5, 99.0, 100.0), Bias::Neutral);
    assert_eq!(voter.vote_values(80.0, 1.0, 0.5, 101.0, 100.0), Bias::Long);
}

#[test]
fn missing_inputs_are_neutral() {
    let set = IndicatorSet::new("BTC/USD".to_string(), 100.0);
    assert_eq!(BiasVoter::default().vote(&set), Bias::Neutral);
}
