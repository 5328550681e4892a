//! RLfD agent - actor-critic over parameter snapshots
//!
//! A deterministic actor maps the signal state to a full action and a critic
//! scores (state, action) pairs. Episodes are terminal after one decision,
//! so the critic regresses on the immediate reward; no bootstrapping and no
//! target networks. Demonstrations are behavior-cloned into the actor before
//! any environment interaction.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::{RlConfig, SafetyConfig};
use crate::feedback::{FeedbackLabel, FeedbackStore, FeedbackStoreError, Verdict};
use crate::scoring::{ACTION_DIM, HEURISTIC_ACTION};
use super::env::Environment;
use super::net::{Mlp, OutputActivation};
use super::replay::{Demonstration, ReplayBuffer};
use super::snapshot::{PolicySnapshot, SnapshotError, SNAPSHOT_VERSION};

/// Cap on feedback records replayed as demonstrations per load
pub const FEEDBACK_DEMONSTRATION_LIMIT: usize = 100;

/// Named starting actions seeded as demonstrations before training.
/// Conservative raises the threshold and leans on texture/edge, aggressive
/// lowers it and leans on color/noise, so the seeds span the action space.
pub const SEED_ACTIONS: [(&str, [f32; ACTION_DIM]); 3] = [
    ("default", [0.7, 0.25, 0.25, 0.25, 0.25]),
    ("conservative", [0.8, 0.3, 0.3, 0.2, 0.2]),
    ("aggressive", [0.6, 0.2, 0.2, 0.3, 0.3]),
];

/// The named starting actions, by name
pub fn seed_demonstration_actions() -> &'static [(&'static str, [f32; ACTION_DIM])] {
    &SEED_ACTIONS
}

#[derive(Debug, Clone)]
pub struct EvaluationSummary {
    pub episodes: usize,
    pub mean_reward: f32,
    pub std_reward: f32,
}

pub struct RlfdAgent {
    state_dim: usize,
    config: RlConfig,
    actor: Option<Mlp>,
    critic: Option<Mlp>,
    /// Seeded demonstrations, kept for the lifetime of the session and
    /// persisted with the policy. Never evicted, unlike replay contents.
    demonstrations: Vec<Demonstration>,
    replay: ReplayBuffer,
    rng: StdRng,
}

impl RlfdAgent {
    pub fn new(state_dim: usize, config: RlConfig) -> Self {
        let replay = ReplayBuffer::new(config.replay_capacity);
        Self {
            state_dim,
            config,
            actor: None,
            critic: None,
            demonstrations: Vec::new(),
            replay,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    pub fn has_policy(&self) -> bool {
        self.actor.is_some()
    }

    pub fn demonstration_count(&self) -> usize {
        self.demonstrations.len()
    }

    /// Record a demonstration and seed it into the replay buffer
    pub fn add_demonstration(&mut self, demonstration: Demonstration) {
        self.replay.push(demonstration.clone());
        self.demonstrations.push(demonstration);
    }

    /// Run `action` through the environment once and store the transition
    /// as a demonstration. Returns the observed reward.
    pub fn demonstrate(&mut self, env: &mut dyn Environment, action: [f32; ACTION_DIM]) -> f32 {
        let state = env.reset();
        let outcome = env.step(&action);
        let reward = outcome.reward;
        self.add_demonstration(Demonstration {
            state,
            action,
            reward,
            next_state: outcome.state,
        });
        reward
    }

    pub fn seed_heuristic_demonstration(&mut self, env: &mut dyn Environment) -> f32 {
        self.demonstrate(env, HEURISTIC_ACTION)
    }

    /// Seed every named starting action as a demonstration
    pub fn seed_named_demonstrations(&mut self, env: &mut dyn Environment) {
        for (name, action) in SEED_ACTIONS {
            let reward = self.demonstrate(env, action);
            log::debug!("seeded {} action, reward {:.2}", name, reward);
        }
    }

    /// Replay labeled feedback as demonstrations. The stored record carries
    /// no signal vector, so the state is a proxy built from the anomaly
    /// score and confidence; the demonstrated action is the heuristic the
    /// record was scored under. Uncertain verdicts carry no signal and are
    /// skipped. Returns the number of demonstrations loaded.
    pub fn load_demonstrations_from_feedback(
        &mut self,
        store: &dyn FeedbackStore,
    ) -> Result<usize, FeedbackStoreError> {
        let records = store.list_demonstrable_records(FEEDBACK_DEMONSTRATION_LIMIT)?;
        let mut loaded = 0;
        for record in records {
            if record.verdict == Verdict::Uncertain {
                continue;
            }
            let reward = match record.label {
                Some(FeedbackLabel::Correct) => 1.0,
                Some(FeedbackLabel::Incorrect) => -1.0,
                _ => continue,
            };

            let mut state = vec![record.anomaly_score, record.confidence, 0.5, 0.5];
            state.resize(self.state_dim, 0.5);
            self.add_demonstration(Demonstration {
                state: state.clone(),
                action: HEURISTIC_ACTION,
                reward,
                next_state: state,
            });
            loaded += 1;
        }
        log::info!("loaded {} demonstrations from feedback history", loaded);
        Ok(loaded)
    }

    fn ensure_networks(&mut self) {
        if self.actor.is_none() {
            self.actor = Some(Mlp::new(
                self.state_dim,
                self.config.hidden_size,
                ACTION_DIM,
                OutputActivation::Sigmoid,
                &mut self.rng,
            ));
        }
        if self.critic.is_none() {
            self.critic = Some(Mlp::new(
                self.state_dim + ACTION_DIM,
                self.config.hidden_size,
                1,
                OutputActivation::Linear,
                &mut self.rng,
            ));
        }
    }

    /// Behavior-clone the demonstrations into the actor and regress the
    /// critic on their rewards. No-op when there are no demonstrations.
    pub fn pretrain(&mut self) {
        if self.demonstrations.is_empty() {
            log::warn!("pretrain skipped: no demonstrations");
            return;
        }
        self.ensure_networks();

        for _ in 0..self.config.pretrain_epochs {
            let batch: Vec<Demonstration> = self
                .demonstrations
                .choose_multiple(&mut self.rng, self.config.batch_size)
                .cloned()
                .collect();
            for demonstration in &batch {
                self.fit_sample(demonstration);
            }
        }
        log::info!(
            "pretrained on {} demonstrations for {} epochs",
            self.demonstrations.len(),
            self.config.pretrain_epochs
        );
    }

    /// One supervised step: actor toward the demonstrated action, critic
    /// toward the observed reward.
    fn fit_sample(&mut self, demonstration: &Demonstration) {
        let lr = self.config.learning_rate;
        let (Some(actor), Some(critic)) = (&mut self.actor, &mut self.critic) else {
            return;
        };

        let state = Array1::from(demonstration.state.clone());
        let predicted = actor.forward(state.view());
        let target = ArrayView1::from(&demonstration.action);
        let dl_da = &predicted - &target;
        let grads = actor.backward(state.view(), dl_da.view());
        actor.apply(&grads, lr);

        let input = critic_input(&demonstration.state, &demonstration.action);
        let q = critic.forward(input.view());
        let dl_dq = Array1::from(vec![q[0] - demonstration.reward]);
        let grads = critic.backward(input.view(), dl_dq.view());
        critic.apply(&grads, lr);
    }

    /// Off-policy training loop. Exploration perturbs the actor's action
    /// with bounded noise; every transition lands in the replay buffer next
    /// to the demonstrations. Honors the learning kill-switch and an
    /// optional cancellation flag.
    pub fn train(
        &mut self,
        env: &mut dyn Environment,
        total_timesteps: usize,
        cancel: Option<&AtomicBool>,
    ) {
        if !SafetyConfig::is_learning_enabled() {
            log::warn!("training skipped: learning is disabled");
            return;
        }
        self.ensure_networks();

        let mut state = env.reset();
        for step in 0..total_timesteps {
            if let Some(flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    log::info!("training cancelled at step {}", step);
                    break;
                }
            }

            let mut action = self.predict(&state);
            let sigma = self.config.noise_sigma;
            for component in action.iter_mut() {
                let noise = self.rng.gen_range(-sigma..sigma);
                *component = (*component + noise).clamp(0.0, 1.0);
            }

            let outcome = env.step(&action);
            self.replay.push(Demonstration {
                state: state.clone(),
                action,
                reward: outcome.reward,
                next_state: outcome.state.clone(),
            });
            state = if outcome.terminated { env.reset() } else { outcome.state };

            if self.replay.len() >= self.config.batch_size {
                self.update();
            }
        }
    }

    /// One actor-critic update over a sampled batch. The critic target is
    /// the immediate reward: every episode terminates after one decision,
    /// so there is no future value to bootstrap.
    fn update(&mut self) {
        let batch = self.replay.sample(&mut self.rng, self.config.batch_size);
        let lr = self.config.learning_rate;

        for transition in &batch {
            let (Some(actor), Some(critic)) = (&mut self.actor, &mut self.critic) else {
                return;
            };

            let input = critic_input(&transition.state, &transition.action);
            let q = critic.forward(input.view());
            let dl_dq = Array1::from(vec![q[0] - transition.reward]);
            let grads = critic.backward(input.view(), dl_dq.view());
            critic.apply(&grads, lr);

            // Deterministic policy gradient: push the actor's action uphill
            // on the critic's estimate.
            let state = Array1::from(transition.state.clone());
            let action = actor.forward(state.view());
            let input = critic_input(transition.state.as_slice(), action.as_slice().unwrap_or(&[]));
            let ascent = Array1::from(vec![-1.0f32]);
            let through_critic = critic.backward(input.view(), ascent.view());
            let dl_da = through_critic
                .input
                .slice(ndarray::s![self.state_dim..])
                .to_owned();
            let grads = actor.backward(state.view(), dl_da.view());
            actor.apply(&grads, lr);
        }
    }

    /// Action for a state. Falls back to the fixed heuristic action when no
    /// policy has been trained or the state shape does not match; never
    /// errors.
    pub fn predict(&self, state: &[f32]) -> [f32; ACTION_DIM] {
        match &self.actor {
            Some(actor) if state.len() == actor.input_dim() => {
                let out = actor.forward(ArrayView1::from(state));
                let mut action = HEURISTIC_ACTION;
                for (slot, value) in action.iter_mut().zip(out.iter()) {
                    *slot = if value.is_finite() { value.clamp(0.0, 1.0) } else { *slot };
                }
                action
            }
            _ => {
                log::debug!("no trained policy, falling back to heuristic action");
                HEURISTIC_ACTION
            }
        }
    }

    /// Best demonstrated action by observed reward; heuristic when no
    /// demonstrations are held.
    pub fn select_from_demonstrations(&self) -> [f32; ACTION_DIM] {
        self.demonstrations
            .iter()
            .max_by(|a, b| a.reward.total_cmp(&b.reward))
            .map(|d| d.action)
            .unwrap_or(HEURISTIC_ACTION)
    }

    /// Deterministic evaluation: run the current policy without exploration
    /// noise and summarize per-episode returns.
    pub fn evaluate(&self, env: &mut dyn Environment, episodes: usize) -> EvaluationSummary {
        let mut returns = Vec::with_capacity(episodes);
        for _ in 0..episodes {
            let mut state = env.reset();
            let mut total = 0.0f32;
            loop {
                let action = self.predict(&state);
                let outcome = env.step(&action);
                total += outcome.reward;
                if outcome.terminated {
                    break;
                }
                state = outcome.state;
            }
            returns.push(total);
        }

        let n = returns.len().max(1) as f32;
        let mean = returns.iter().sum::<f32>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f32>() / n;
        EvaluationSummary {
            episodes: returns.len(),
            mean_reward: mean,
            std_reward: variance.sqrt(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let snapshot = PolicySnapshot {
            version: SNAPSHOT_VERSION,
            state_dim: self.state_dim,
            actor: self.actor.clone(),
            critic: self.critic.clone(),
            demonstrations: self.demonstrations.clone(),
            saved_at: Utc::now(),
        };
        snapshot.save(path)
    }

    pub fn load(path: &Path, config: RlConfig) -> Result<Self, SnapshotError> {
        let snapshot = PolicySnapshot::load(path)?;
        let mut replay = ReplayBuffer::new(config.replay_capacity);
        for demonstration in &snapshot.demonstrations {
            replay.push(demonstration.clone());
        }
        Ok(Self {
            state_dim: snapshot.state_dim,
            config,
            actor: snapshot.actor,
            critic: snapshot.critic,
            demonstrations: snapshot.demonstrations,
            replay,
            rng: StdRng::from_entropy(),
        })
    }
}

fn critic_input(state: &[f32], action: &[f32]) -> Array1<f32> {
    let mut input = Vec::with_capacity(state.len() + action.len());
    input.extend_from_slice(state);
    input.extend_from_slice(action);
    Array1::from(input)
}
