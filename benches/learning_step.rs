//! Cost of one DDPG learning session and of action selection
//!
//! Batches come from a buffer pre-filled with random transitions of a
//! pendulum-sized problem (3 state dimensions, 1 action).

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ddpg::agent::{DdpgAgent, DdpgBuilder};
use ndarray::Array1;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const STATE_SIZE: usize = 3;
const ACTION_SIZE: usize = 1;

fn filled_agent(hidden: usize, batch_size: usize) -> DdpgAgent {
    let mut agent = DdpgBuilder::new(STATE_SIZE, ACTION_SIZE)
        .hidden_sizes(vec![hidden, hidden])
        .buffer_size(10_000)
        .batch_size(batch_size)
        .seed(0)
        .build()
        .expect("valid benchmark configuration");

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for step in 0..5_000 {
        let state = Array1::from_shape_fn(STATE_SIZE, |_| rng.gen_range(-1.0..1.0));
        let next_state = Array1::from_shape_fn(STATE_SIZE, |_| rng.gen_range(-1.0..1.0));
        let action = Array1::from_shape_fn(ACTION_SIZE, |_| rng.gen_range(-2.0..2.0));
        let reward = -rng.gen_range(0.0..16.0);
        agent.memory_mut().add_experience(state, action, reward, next_state, step % 200 == 199);
    }
    agent
}

fn bench_learning_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("learning_session");
    for &(hidden, batch_size) in &[(64, 64), (256, 256)] {
        let mut agent = filled_agent(hidden, batch_size);
        group.bench_function(format!("hidden_{}_batch_{}", hidden, batch_size), |b| {
            b.iter(|| black_box(agent.learn().expect("learning session")))
        });
    }
    group.finish();
}

fn bench_critic_learn(c: &mut Criterion) {
    let mut agent = filled_agent(64, 64);
    let batches: Vec<_> = (0..32)
        .map(|_| agent.memory_mut().sample(64).expect("full buffer"))
        .collect();
    let mut next = 0;
    c.bench_function("critic_learn_64", |b| {
        b.iter(|| {
            let batch = &batches[next % batches.len()];
            next += 1;
            black_box(agent.critic_learn(batch).expect("finite update"))
        })
    });
}

fn bench_pick_action(c: &mut Criterion) {
    let mut agent = filled_agent(64, 64);
    let state = Array1::from_vec(vec![0.1, -0.4, 0.9]);
    c.bench_function("pick_action", |b| {
        b.iter(|| black_box(agent.pick_action(state.view()).expect("action")))
    });
}

criterion_group!(benches, bench_learning_session, bench_critic_learn, bench_pick_action);
criterion_main!(benches);
