//! Signal evaluation: bias, confluence scoring, risk geometry, selection.

pub mod bias;
pub mod decision;
pub mod engine;
pub mod scoring;
pub mod selector;

pub use bias::BiasVoter;
pub use decision::RiskGeometry;
pub use engine::{EvaluationError, Evaluation, SignalEngine, MIN_CANDLES};
pub use scoring::{ConfluenceScorer, EvidenceTerm, HoldReason, Scorecard, Verdict};
pub use selector::{AlertState, AssetOutcome, AssetStatus, CycleDeps, CycleReport, SelectorPhase, SignalSelector};
