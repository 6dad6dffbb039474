use log::{debug, info, warn};
use ndarray::{concatenate, s, Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::agent::episode::EpisodeState;
use crate::config::{DdpgConfig, DdpgHyperparameters};
use crate::debug::{check_parameters, ensure_finite_update};
use crate::environment::Environment;
use crate::error::{DdpgError, Result};
use crate::exploration::{ExplorationStrategy, OrnsteinUhlenbeckNoise, OuNoiseExploration};
use crate::loss::{actor_loss, actor_loss_gradient, Loss, MeanSquaredError};
use crate::metrics::MetricsTracker;
use crate::network::{
    copy_model_over, soft_update, FunctionApproximator, Gradients, MlpFactory, NetworkFactory, NetworkRole,
    NeuralNetwork,
};
use crate::optimizer::{GradientClipper, LearningRateScheduler, Optimizer, OptimizerWrapper, ScheduleProgress};
use crate::replay_buffer::{ReplayBuffer, TransitionBatch};

/// Outcome of one learning session
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LearningReport {
    pub critic_losses: Vec<f32>,
    pub actor_losses: Vec<f32>,
    /// Updates dropped because of a non-finite loss or gradient
    pub skipped_updates: usize,
}

impl LearningReport {
    pub fn mean_critic_loss(&self) -> Option<f32> {
        mean(&self.critic_losses)
    }

    pub fn mean_actor_loss(&self) -> Option<f32> {
        mean(&self.actor_losses)
    }
}

fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f32>() / values.len() as f32)
    }
}

/// Deep Deterministic Policy Gradient agent
///
/// Owns a local and a target copy of the actor (state → action) and of the critic
/// ((state, action) → value), one optimizer per local network (Adam by default), the replay buffer
/// and the exploration process. Target networks only ever move by soft update.
///
/// # Example
///
/// ```rust,no_run
/// use ddpg::agent::DdpgAgent;
/// use ddpg::config::DdpgConfig;
/// # use ddpg::environment::Environment;
/// # fn train<E: Environment>(env: &mut E) -> ddpg::error::Result<()> {
/// let config = DdpgConfig::default();
/// let mut agent = DdpgAgent::new(config, env.state_size(), env.action_size())?;
/// let rewards = agent.run_n_episodes(env, 100)?;
/// println!("last episode: {:?}", rewards.last());
/// # Ok(())
/// # }
/// ```
pub struct DdpgAgent<N: FunctionApproximator = NeuralNetwork> {
    hyperparameters: DdpgHyperparameters,
    seed: u64,
    state_size: usize,
    action_size: usize,
    actor_local: N,
    actor_target: N,
    critic_local: N,
    critic_target: N,
    actor_optimizer: OptimizerWrapper,
    critic_optimizer: OptimizerWrapper,
    actor_clipper: GradientClipper,
    critic_clipper: GradientClipper,
    /// Current actor learning rate, refreshed by the schedule at episode ends
    actor_learning_rate: f32,
    memory: ReplayBuffer,
    exploration: Box<dyn ExplorationStrategy + Send>,
    episode: EpisodeState,
    metrics: MetricsTracker,
}

impl DdpgAgent<NeuralNetwork> {
    /// Build an agent with dense MLPs shaped by the configured hidden layers.
    pub fn new(config: DdpgConfig, state_size: usize, action_size: usize) -> Result<Self> {
        let hp = &config.hyperparameters;
        let mut factory = MlpFactory::new(
            hp.actor.architecture(NetworkRole::Actor),
            hp.critic.architecture(NetworkRole::Critic),
            config.seed,
        );
        Self::with_factory(config, state_size, action_size, &mut factory)
    }
}

impl<N: FunctionApproximator> DdpgAgent<N> {
    /// Build an agent whose four networks come from `factory`.
    ///
    /// Each target starts as an exact copy of its local network.
    pub fn with_factory<F>(config: DdpgConfig, state_size: usize, action_size: usize, factory: &mut F) -> Result<Self>
    where
        F: NetworkFactory<Network = N>,
    {
        config.validate()?;
        if state_size == 0 || action_size == 0 {
            return Err(DdpgError::invalid_parameter(
                "state_size/action_size".to_string(),
                format!("must be positive, got {} and {}", state_size, action_size),
            ));
        }

        let critic_input = state_size + action_size;
        let critic_local = factory.create_network(critic_input, 1, NetworkRole::Critic)?;
        let mut critic_target = factory.create_network(critic_input, 1, NetworkRole::Critic)?;
        check_dimensions("critic", &critic_local, critic_input, 1)?;
        copy_model_over(&critic_local, &mut critic_target)?;

        let actor_local = factory.create_network(state_size, action_size, NetworkRole::Actor)?;
        let mut actor_target = factory.create_network(state_size, action_size, NetworkRole::Actor)?;
        check_dimensions("actor", &actor_local, state_size, action_size)?;
        copy_model_over(&actor_local, &mut actor_target)?;

        let DdpgConfig { seed, hyperparameters } = config;
        let memory = ReplayBuffer::new(hyperparameters.buffer_size()?, seed)?;
        let exploration = default_exploration(&hyperparameters, action_size, seed)?;

        info!(
            "DDPG agent: state {} action {} buffer {} batch {} seed {}",
            state_size,
            action_size,
            memory.capacity(),
            hyperparameters.batch_size,
            seed
        );

        Ok(DdpgAgent {
            actor_learning_rate: hyperparameters.actor.learning_rate,
            actor_clipper: hyperparameters.actor.clipper(),
            critic_clipper: hyperparameters.critic.clipper(),
            actor_optimizer: hyperparameters.actor.optimizer.build(),
            critic_optimizer: hyperparameters.critic.optimizer.build(),
            hyperparameters,
            seed,
            state_size,
            action_size,
            actor_local,
            actor_target,
            critic_local,
            critic_target,
            memory,
            exploration,
            episode: EpisodeState::default(),
            metrics: MetricsTracker::default(),
        })
    }

    /// Replace the exploration process used by `pick_action`.
    pub fn with_exploration(mut self, exploration: Box<dyn ExplorationStrategy + Send>) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn set_exploration(&mut self, exploration: Box<dyn ExplorationStrategy + Send>) {
        self.exploration = exploration;
    }

    /// Actor output for `state` with exploration noise added.
    pub fn pick_action(&mut self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        let action = self.actor_local.predict(state)?;
        self.exploration.perturb_action(action.view())
    }

    /// Actor output for `state`, no noise.
    pub fn act_greedy(&self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.actor_local.predict(state)
    }

    /// Start a new episode: reset the environment, the noise process and per-episode fields.
    pub fn reset_game<E: Environment>(&mut self, env: &mut E) -> Result<()> {
        let initial_state = env.reset()?;
        if initial_state.len() != self.state_size {
            return Err(DdpgError::shape_mismatch(
                format!("state of width {}", self.state_size),
                format!("state of width {}", initial_state.len()),
            ));
        }
        self.exploration.reset();
        self.episode.begin_episode(initial_state);
        Ok(())
    }

    /// Play `n` full episodes, returning the reward collected in each.
    pub fn run_n_episodes<E: Environment>(&mut self, env: &mut E, n: usize) -> Result<Vec<f32>> {
        let mut rewards = Vec::with_capacity(n);
        for _ in 0..n {
            self.reset_game(env)?;
            self.step(env)?;
            rewards.push(self.episode.total_episode_reward);
        }
        Ok(rewards)
    }

    /// Run the current episode to completion.
    pub fn step<E: Environment>(&mut self, env: &mut E) -> Result<()> {
        if self.episode.done {
            return Err(DdpgError::invalid_parameter(
                "episode",
                "the episode has finished; call reset_game first",
            ));
        }

        while !self.episode.done {
            let state = self.episode.state.clone();
            let action = self.pick_action(state.view())?;
            self.conduct_action(env, action)?;
            if self.time_for_critic_and_actor_to_learn() {
                self.learn()?;
            }
            self.save_experience();
            self.episode.advance();
        }

        self.finish_episode();
        Ok(())
    }

    /// Apply `action` in the environment and record the outcome.
    pub fn conduct_action<E: Environment>(&mut self, env: &mut E, action: Array1<f32>) -> Result<()> {
        let outcome = env.step(action.view())?;
        if outcome.next_state.len() != self.state_size {
            return Err(DdpgError::shape_mismatch(
                format!("next state of width {}", self.state_size),
                format!("next state of width {}", outcome.next_state.len()),
            ));
        }

        self.episode.total_episode_reward += outcome.reward;
        self.episode.reward = if self.hyperparameters.clip_rewards {
            outcome.reward.clamp(-1.0, 1.0)
        } else {
            outcome.reward
        };
        self.episode.action = action;
        self.episode.next_state = outcome.next_state;
        self.episode.done = outcome.done;
        Ok(())
    }

    /// Store the transition of the step just taken.
    pub fn save_experience(&mut self) {
        self.memory.add_experience(
            self.episode.state.clone(),
            self.episode.action.clone(),
            self.episode.reward,
            self.episode.next_state.clone(),
            self.episode.done,
        );
    }

    /// Enough experience is stored and this is an update step.
    pub fn time_for_critic_and_actor_to_learn(&self) -> bool {
        self.memory.len() >= self.hyperparameters.batch_size
            && self.episode.global_step_number % self.hyperparameters.update_every_n_steps == 0
    }

    pub fn sample_experiences(&mut self) -> Result<TransitionBatch> {
        self.memory.sample(self.hyperparameters.batch_size)
    }

    /// One learning session: critic then actor, on a fresh batch each time.
    ///
    /// An update that hits a non-finite loss or gradient is skipped and counted; every
    /// other error ends the session.
    pub fn learn(&mut self) -> Result<LearningReport> {
        let mut report = LearningReport::default();

        for _ in 0..self.hyperparameters.learning_updates_per_learning_session {
            let batch = self.sample_experiences()?;

            match self.critic_learn(&batch) {
                Ok(loss) => report.critic_losses.push(loss),
                Err(e) if e.is_recoverable() => self.skip_update(&mut report, &e),
                Err(e) => return Err(e),
            }

            match self.actor_learn(batch.states.view()) {
                Ok(loss) => report.actor_losses.push(loss),
                Err(e) if e.is_recoverable() => self.skip_update(&mut report, &e),
                Err(e) => return Err(e),
            }
        }

        debug!(
            "step {}: critic loss {:?} actor loss {:?} skipped {}",
            self.episode.global_step_number,
            report.mean_critic_loss(),
            report.mean_actor_loss(),
            report.skipped_updates
        );
        Ok(report)
    }

    fn skip_update(&mut self, report: &mut LearningReport, error: &DdpgError) {
        warn!("Skipping update at step {}: {}", self.episode.global_step_number, error);
        self.metrics.record_skipped_update();
        report.skipped_updates += 1;
    }

    /// Bootstrapped critic targets `r + γ·Q_target(s', μ_target(s'))·(1 − done)`.
    ///
    /// Terminal rows are exactly the reward, whatever the target critic says.
    pub fn compute_critic_targets(
        &self,
        next_states: ArrayView2<f32>,
        rewards: ArrayView2<f32>,
        dones: ArrayView2<f32>,
    ) -> Result<Array2<f32>> {
        let actions_next = self.actor_target.predict_batch(next_states)?;
        let critic_inputs = state_action_inputs(next_states, actions_next.view())?;
        let q_next = self.critic_target.predict_batch(critic_inputs.view())?;
        if q_next.dim() != rewards.dim() || dones.dim() != rewards.dim() {
            return Err(DdpgError::shape_mismatch(
                format!("rewards and dones shaped {:?}", q_next.dim()),
                format!("{:?} and {:?}", rewards.dim(), dones.dim()),
            ));
        }

        let gamma = self.hyperparameters.discount_rate;
        let mut targets = rewards.to_owned();
        Zip::from(&mut targets).and(&q_next).and(&dones).for_each(|y, &q, &done| {
            let continuation = 1.0 - done;
            if continuation != 0.0 {
                *y += gamma * q * continuation;
            }
        });
        Ok(targets)
    }

    /// One critic update on `batch`, then soft-update the critic target. Returns the loss.
    pub fn critic_learn(&mut self, batch: &TransitionBatch) -> Result<f32> {
        let critic_targets = self.compute_critic_targets(
            batch.next_states.view(),
            batch.rewards.view(),
            batch.dones.view(),
        )?;

        let critic_inputs = state_action_inputs(batch.states.view(), batch.actions.view())?;
        let critic_expected = self.critic_local.forward_batch(critic_inputs.view())?;
        let loss = MeanSquaredError.compute_batch(critic_expected.view(), critic_targets.view());
        let output_grad = MeanSquaredError.gradient_batch(critic_expected.view(), critic_targets.view());
        let (gradients, _) = self.critic_local.backward_batch(output_grad.view())?;

        let gradient_norm = take_optimisation_step(
            "critic",
            &mut self.critic_local,
            &mut self.critic_optimizer,
            &self.critic_clipper,
            gradients,
            loss,
            self.hyperparameters.critic.learning_rate,
        )?;
        soft_update(&self.critic_local, &mut self.critic_target, self.hyperparameters.critic.tau)?;

        self.metrics.record_critic_update(loss, gradient_norm);
        Ok(loss)
    }

    /// One actor update ascending the local critic, then soft-update the actor target.
    /// Returns the actor loss.
    pub fn actor_learn(&mut self, states: ArrayView2<f32>) -> Result<f32> {
        if self.episode.done {
            self.update_learning_rate();
        }

        let actions_pred = self.actor_local.forward_batch(states)?;
        let critic_inputs = state_action_inputs(states, actions_pred.view())?;
        let q_values = self.critic_local.forward_batch(critic_inputs.view())?;
        let loss = actor_loss(q_values.view());

        // the critic's parameter gradients are discarded; only dL/da flows on
        let (_, input_grad) = self.critic_local.backward_batch(actor_loss_gradient(q_values.view()).view())?;
        let action_grad = input_grad.slice(s![.., self.state_size..]);
        let (gradients, _) = self.actor_local.backward_batch(action_grad)?;

        let gradient_norm = take_optimisation_step(
            "actor",
            &mut self.actor_local,
            &mut self.actor_optimizer,
            &self.actor_clipper,
            gradients,
            loss,
            self.actor_learning_rate,
        )?;
        soft_update(&self.actor_local, &mut self.actor_target, self.hyperparameters.actor.tau)?;

        self.metrics.record_actor_update(loss, gradient_norm);
        Ok(loss)
    }

    /// Actor loss `-mean(Q(s, μ(s)))` for `states`, without touching any parameters.
    pub fn calculate_actor_loss(&self, states: ArrayView2<f32>) -> Result<f32> {
        let actions_pred = self.actor_local.predict_batch(states)?;
        let critic_inputs = state_action_inputs(states, actions_pred.view())?;
        let q_values = self.critic_local.predict_batch(critic_inputs.view())?;
        Ok(actor_loss(q_values.view()))
    }

    /// Refresh the actor learning rate from the schedule.
    pub fn update_learning_rate(&mut self) {
        let progress = ScheduleProgress {
            episode_number: self.episode.episode_number,
            rolling_score: self.metrics.rolling_score(),
        };
        let new_rate = self
            .hyperparameters
            .learning_rate_schedule
            .learning_rate(self.hyperparameters.actor.learning_rate, &progress);
        if new_rate != self.actor_learning_rate {
            debug!("Actor learning rate {} -> {}", self.actor_learning_rate, new_rate);
        }
        self.actor_learning_rate = new_rate;
        self.metrics.record_learning_rate(new_rate);
    }

    fn finish_episode(&mut self) {
        self.episode.episode_number += 1;
        self.metrics
            .end_episode(self.episode.total_episode_reward, self.episode.episode_step_number);
        info!(
            "Episode {} reward {:.3} rolling {:.3} steps {}",
            self.episode.episode_number,
            self.episode.total_episode_reward,
            self.metrics.rolling_score().unwrap_or(0.0),
            self.episode.episode_step_number
        );
    }

    pub fn hyperparameters(&self) -> &DdpgHyperparameters {
        &self.hyperparameters
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state_size(&self) -> usize {
        self.state_size
    }

    pub fn action_size(&self) -> usize {
        self.action_size
    }

    pub fn actor_local(&self) -> &N {
        &self.actor_local
    }

    pub fn actor_target(&self) -> &N {
        &self.actor_target
    }

    pub fn critic_local(&self) -> &N {
        &self.critic_local
    }

    pub fn critic_target(&self) -> &N {
        &self.critic_target
    }

    /// Mutable access to the local actor, for warm starts and tests.
    pub fn actor_local_mut(&mut self) -> &mut N {
        &mut self.actor_local
    }

    /// Mutable access to the local critic, for warm starts and tests.
    pub fn critic_local_mut(&mut self) -> &mut N {
        &mut self.critic_local
    }

    pub fn actor_learning_rate(&self) -> f32 {
        self.actor_learning_rate
    }

    pub fn memory(&self) -> &ReplayBuffer {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut ReplayBuffer {
        &mut self.memory
    }

    pub fn episode(&self) -> &EpisodeState {
        &self.episode
    }

    pub fn metrics(&self) -> &MetricsTracker {
        &self.metrics
    }
}

/// On-disk form of an agent. The replay buffer, RNGs and exploration state are rebuilt
/// fresh on load.
#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "N: Serialize", deserialize = "N: DeserializeOwned"))]
struct Checkpoint<N> {
    hyperparameters: DdpgHyperparameters,
    seed: u64,
    state_size: usize,
    action_size: usize,
    actor_local: N,
    actor_target: N,
    critic_local: N,
    critic_target: N,
    actor_optimizer: OptimizerWrapper,
    critic_optimizer: OptimizerWrapper,
    actor_learning_rate: f32,
    episode: EpisodeState,
    metrics: MetricsTracker,
}

impl<N> DdpgAgent<N>
where
    N: FunctionApproximator + Serialize + DeserializeOwned,
{
    fn checkpoint(&self) -> Checkpoint<N> {
        Checkpoint {
            hyperparameters: self.hyperparameters.clone(),
            seed: self.seed,
            state_size: self.state_size,
            action_size: self.action_size,
            actor_local: self.actor_local.clone(),
            actor_target: self.actor_target.clone(),
            critic_local: self.critic_local.clone(),
            critic_target: self.critic_target.clone(),
            actor_optimizer: self.actor_optimizer.clone(),
            critic_optimizer: self.critic_optimizer.clone(),
            actor_learning_rate: self.actor_learning_rate,
            episode: self.episode.clone(),
            metrics: self.metrics.clone(),
        }
    }

    /// Save networks, optimizer state, hyperparameters and counters to disk
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = bincode::serialize(&self.checkpoint())?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load an agent from disk. Exploration falls back to the configured OU process.
    ///
    /// Network sizes and optimizer state are checked against the stored state and
    /// action sizes; a mismatch is a `ShapeMismatch`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        let checkpoint: Checkpoint<N> = bincode::deserialize(&data)?;
        Self::from_checkpoint(checkpoint)
    }

    fn from_checkpoint(checkpoint: Checkpoint<N>) -> Result<Self> {
        checkpoint.hyperparameters.validate()?;

        let (state_size, action_size) = (checkpoint.state_size, checkpoint.action_size);
        let critic_input = state_size + action_size;
        check_dimensions("actor_local", &checkpoint.actor_local, state_size, action_size)?;
        check_dimensions("actor_target", &checkpoint.actor_target, state_size, action_size)?;
        check_dimensions("critic_local", &checkpoint.critic_local, critic_input, 1)?;
        check_dimensions("critic_target", &checkpoint.critic_target, critic_input, 1)?;
        checkpoint.actor_optimizer.check_state(&checkpoint.actor_local.parameters())?;
        checkpoint.critic_optimizer.check_state(&checkpoint.critic_local.parameters())?;

        for (name, network) in [
            ("actor_local", &checkpoint.actor_local),
            ("actor_target", &checkpoint.actor_target),
            ("critic_local", &checkpoint.critic_local),
            ("critic_target", &checkpoint.critic_target),
        ] {
            let issues = check_parameters(network);
            if !issues.is_empty() {
                warn!("Loaded {} has non-finite parameters: {:?}", name, issues);
            }
        }

        let memory = ReplayBuffer::new(checkpoint.hyperparameters.buffer_size()?, checkpoint.seed)?;
        let exploration = default_exploration(&checkpoint.hyperparameters, action_size, checkpoint.seed)?;

        Ok(DdpgAgent {
            actor_clipper: checkpoint.hyperparameters.actor.clipper(),
            critic_clipper: checkpoint.hyperparameters.critic.clipper(),
            hyperparameters: checkpoint.hyperparameters,
            seed: checkpoint.seed,
            state_size,
            action_size,
            actor_local: checkpoint.actor_local,
            actor_target: checkpoint.actor_target,
            critic_local: checkpoint.critic_local,
            critic_target: checkpoint.critic_target,
            actor_optimizer: checkpoint.actor_optimizer,
            critic_optimizer: checkpoint.critic_optimizer,
            actor_learning_rate: checkpoint.actor_learning_rate,
            memory,
            exploration,
            episode: checkpoint.episode,
            metrics: checkpoint.metrics,
        })
    }
}

fn default_exploration(
    hyperparameters: &DdpgHyperparameters,
    action_size: usize,
    seed: u64,
) -> Result<Box<dyn ExplorationStrategy + Send>> {
    let noise = OrnsteinUhlenbeckNoise::new(
        action_size,
        hyperparameters.mu,
        hyperparameters.theta,
        hyperparameters.sigma,
        seed,
    )?;
    Ok(Box::new(OuNoiseExploration::new(noise)))
}

fn check_dimensions<N: FunctionApproximator>(name: &str, network: &N, input: usize, output: usize) -> Result<()> {
    if network.input_size() != input || network.output_size() != output {
        return Err(DdpgError::shape_mismatch(
            format!("{} mapping {} -> {}", name, input, output),
            format!("{} mapping {} -> {}", name, network.input_size(), network.output_size()),
        ));
    }
    Ok(())
}

/// Critic input: states and actions side by side, one row per sample.
fn state_action_inputs(states: ArrayView2<f32>, actions: ArrayView2<f32>) -> Result<Array2<f32>> {
    concatenate(Axis(1), &[states.view(), actions.view()]).map_err(|_| {
        DdpgError::shape_mismatch(
            format!("{} action rows", states.nrows()),
            format!("{} action rows", actions.nrows()),
        )
    })
}

/// Clip, check and apply one optimizer step. Nothing is mutated when the check fails.
/// Returns the pre-clip gradient norm.
fn take_optimisation_step<N: FunctionApproximator>(
    name: &str,
    network: &mut N,
    optimizer: &mut OptimizerWrapper,
    clipper: &GradientClipper,
    mut gradients: Gradients,
    loss: f32,
    learning_rate: f32,
) -> Result<f32> {
    let gradient_norm = clipper.clip(&mut gradients);
    ensure_finite_update(name, loss, gradient_norm, &gradients)?;
    optimizer.step(network.parameters_mut(), &gradients, learning_rate)?;
    Ok(gradient_norm)
}

/// Builder for [`DdpgAgent`] over dense networks
pub struct DdpgBuilder {
    state_size: usize,
    action_size: usize,
    config: DdpgConfig,
    exploration: Option<Box<dyn ExplorationStrategy + Send>>,
}

impl DdpgBuilder {
    pub fn new(state_size: usize, action_size: usize) -> Self {
        DdpgBuilder {
            state_size,
            action_size,
            config: DdpgConfig::default(),
            exploration: None,
        }
    }

    /// Start from a complete configuration; later calls override single fields.
    pub fn config(mut self, config: DdpgConfig) -> Self {
        self.config = config;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Hidden layer sizes for both actor and critic
    pub fn hidden_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.config.hyperparameters.actor.linear_hidden_units = sizes.clone();
        self.config.hyperparameters.critic.linear_hidden_units = sizes;
        self
    }

    pub fn actor_learning_rate(mut self, learning_rate: f32) -> Self {
        self.config.hyperparameters.actor.learning_rate = learning_rate;
        self
    }

    pub fn critic_learning_rate(mut self, learning_rate: f32) -> Self {
        self.config.hyperparameters.critic.learning_rate = learning_rate;
        self
    }

    /// Soft update coefficient for both target networks
    pub fn tau(mut self, tau: f32) -> Self {
        self.config.hyperparameters.actor.tau = tau;
        self.config.hyperparameters.critic.tau = tau;
        self
    }

    pub fn gradient_clipping_norm(mut self, max_norm: f32) -> Self {
        self.config.hyperparameters.actor.gradient_clipping_norm = max_norm;
        self.config.hyperparameters.critic.gradient_clipping_norm = max_norm;
        self
    }

    pub fn discount_rate(mut self, gamma: f32) -> Self {
        self.config.hyperparameters.discount_rate = gamma;
        self
    }

    pub fn buffer_size(mut self, capacity: usize) -> Self {
        self.config.hyperparameters.critic.buffer_size = Some(capacity);
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.hyperparameters.batch_size = batch_size;
        self
    }

    pub fn update_every_n_steps(mut self, steps: usize) -> Self {
        self.config.hyperparameters.update_every_n_steps = steps;
        self
    }

    pub fn learning_updates_per_learning_session(mut self, updates: usize) -> Self {
        self.config.hyperparameters.learning_updates_per_learning_session = updates;
        self
    }

    pub fn noise_params(mut self, mu: f32, theta: f32, sigma: f32) -> Self {
        self.config.hyperparameters.mu = mu;
        self.config.hyperparameters.theta = theta;
        self.config.hyperparameters.sigma = sigma;
        self
    }

    pub fn clip_rewards(mut self, clip: bool) -> Self {
        self.config.hyperparameters.clip_rewards = clip;
        self
    }

    pub fn learning_rate_schedule(mut self, schedule: LearningRateScheduler) -> Self {
        self.config.hyperparameters.learning_rate_schedule = schedule;
        self
    }

    pub fn exploration(mut self, exploration: Box<dyn ExplorationStrategy + Send>) -> Self {
        self.exploration = Some(exploration);
        self
    }

    pub fn build(self) -> Result<DdpgAgent> {
        let agent = DdpgAgent::new(self.config, self.state_size, self.action_size)?;
        Ok(match self.exploration {
            Some(exploration) => agent.with_exploration(exploration),
            None => agent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::{ClippingMode, OptimizerKind};
    use ndarray::array;

    #[test]
    fn test_ddpg_creation() {
        let agent = DdpgAgent::new(DdpgConfig::default(), 3, 2).unwrap();
        assert_eq!(agent.actor_local().input_size(), 3);
        assert_eq!(agent.actor_local().output_size(), 2);
        assert_eq!(agent.critic_local().input_size(), 5);
        assert_eq!(agent.critic_local().output_size(), 1);
        assert_eq!(agent.memory().capacity(), 100_000);
    }

    #[test]
    fn test_targets_start_as_copies() {
        let agent = DdpgAgent::new(DdpgConfig::default(), 3, 2).unwrap();
        for ((lw, lb), (tw, tb)) in agent.actor_local().parameters().into_iter().zip(agent.actor_target().parameters()) {
            assert_eq!(lw, tw);
            assert_eq!(lb, tb);
        }
        for ((lw, lb), (tw, tb)) in agent.critic_local().parameters().into_iter().zip(agent.critic_target().parameters()) {
            assert_eq!(lw, tw);
            assert_eq!(lb, tb);
        }
    }

    #[test]
    fn test_ddpg_builder() {
        let agent = DdpgBuilder::new(4, 1)
            .hidden_sizes(vec![16, 16])
            .discount_rate(0.95)
            .buffer_size(500)
            .batch_size(8)
            .seed(3)
            .build()
            .unwrap();

        assert_eq!(agent.hyperparameters().discount_rate, 0.95);
        assert_eq!(agent.memory().capacity(), 500);
        assert_eq!(agent.seed(), 3);
        assert_eq!(agent.actor_local().parameters().len(), 3);
    }

    #[test]
    fn test_builder_rejects_batch_larger_than_buffer() {
        let result = DdpgBuilder::new(2, 1).buffer_size(4).batch_size(8).build();
        assert!(matches!(result, Err(DdpgError::InvalidParameter { .. })));
    }

    #[test]
    fn test_act_greedy_is_deterministic() {
        let agent = DdpgAgent::new(DdpgConfig::default(), 2, 1).unwrap();
        let state = array![0.3, -0.1];
        let a = agent.act_greedy(state.view()).unwrap();
        let b = agent.act_greedy(state.view()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_pick_action_rejects_wrong_state_width() {
        let mut agent = DdpgAgent::new(DdpgConfig::default(), 2, 1).unwrap();
        let err = agent.pick_action(array![1.0, 2.0, 3.0].view()).unwrap_err();
        assert!(matches!(err, DdpgError::ShapeMismatch { .. }));
    }

    fn trained_agent() -> DdpgAgent {
        let mut agent = DdpgBuilder::new(3, 2)
            .hidden_sizes(vec![8])
            .buffer_size(16)
            .batch_size(4)
            .seed(2)
            .build()
            .unwrap();
        for i in 0..8 {
            let x = i as f32 * 0.1;
            agent
                .memory_mut()
                .add_experience(array![x, -x, 0.5], array![x, 0.0], -x, array![x, x, 0.5], i == 7);
        }
        agent.learn().unwrap();
        agent
    }

    #[test]
    fn test_load_rejects_mismatched_network_sizes() {
        let agent = trained_agent();
        let mut checkpoint = agent.checkpoint();
        checkpoint.state_size = 4;
        let result = DdpgAgent::from_checkpoint(checkpoint);
        assert!(matches!(result, Err(DdpgError::ShapeMismatch { .. })));

        let mut checkpoint = agent.checkpoint();
        checkpoint.critic_target = checkpoint.actor_target.clone();
        let result = DdpgAgent::from_checkpoint(checkpoint);
        assert!(matches!(result, Err(DdpgError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_load_rejects_optimizer_state_of_other_network() {
        let agent = trained_agent();
        let mut checkpoint = agent.checkpoint();
        std::mem::swap(&mut checkpoint.actor_optimizer, &mut checkpoint.critic_optimizer);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swapped.bin");
        std::fs::write(&path, bincode::serialize(&checkpoint).unwrap()).unwrap();

        let result: Result<DdpgAgent> = DdpgAgent::load(&path);
        assert!(matches!(result, Err(DdpgError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_untouched_checkpoint_loads() {
        let agent = trained_agent();
        let loaded = DdpgAgent::from_checkpoint(agent.checkpoint()).unwrap();
        assert_eq!(loaded.episode(), agent.episode());
        assert_eq!(loaded.actor_local().parameters()[0].0, agent.actor_local().parameters()[0].0);
    }

    #[test]
    fn test_configured_optimizer_and_clipping() {
        let mut config = DdpgConfig::default();
        config.hyperparameters.actor.optimizer = OptimizerKind::SGD;
        config.hyperparameters.critic.clipping = ClippingMode::Value;
        let agent = DdpgAgent::new(config, 3, 2).unwrap();

        assert!(matches!(agent.actor_optimizer, OptimizerWrapper::SGD(_)));
        assert!(matches!(agent.critic_optimizer, OptimizerWrapper::Adam(_)));
        assert_eq!(agent.critic_clipper, GradientClipper::ClipByValue { min: -5.0, max: 5.0 });
        assert_eq!(agent.actor_clipper, GradientClipper::ClipByGlobalNorm { max_norm: 5.0 });
    }

    #[test]
    fn test_learning_report_means() {
        let report = LearningReport {
            critic_losses: vec![1.0, 3.0],
            actor_losses: vec![],
            skipped_updates: 0,
        };
        assert_eq!(report.mean_critic_loss(), Some(2.0));
        assert_eq!(report.mean_actor_loss(), None);
    }
}
