//! Parameter optimizer - reinforcement learning from demonstrations
//!
//! The optimizer treats one analysis as one episode: the state is the signal
//! vector, the action is a full `(threshold, weights)` parameter snapshot,
//! and the reward comes from user feedback when it exists. Demonstrations
//! (heuristic actions plus replayed feedback) seed the replay buffer before
//! any environment interaction so the policy never starts from noise.

pub mod agent;
pub mod env;
pub mod net;
pub mod replay;
pub mod snapshot;

pub use agent::{seed_demonstration_actions, EvaluationSummary, RlfdAgent};
pub use env::{compute_reward, ArtworkAuthEnv, ArtworkSample, BatchAuthEnv, Environment, StepOutcome};
pub use replay::{Demonstration, ReplayBuffer};
pub use snapshot::{PolicySnapshot, SnapshotError, SNAPSHOT_VERSION};
