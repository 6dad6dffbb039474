use std::io::Write;
use crate::activations::Activation;
use crate::config::DdpgConfig;
use crate::error::DdpgError;
use crate::layers::WeightInit;
use crate::network::NetworkRole;
use crate::optimizer::{ClippingMode, GradientClipper, LearningRateScheduler, OptimizerKind};

const PENDULUM_CONFIG: &str = r#"{
    "seed": 1,
    "hyperparameters": {
        "Actor": {
            "learning_rate": 0.003,
            "gradient_clipping_norm": 5.0,
            "tau": 0.005,
            "linear_hidden_units": [20, 20],
            "final_layer_activation": "Tanh"
        },
        "Critic": {
            "learning_rate": 0.02,
            "gradient_clipping_norm": 5.0,
            "tau": 0.005,
            "buffer_size": 1000000,
            "linear_hidden_units": [20, 20]
        },
        "batch_size": 256,
        "discount_rate": 0.9,
        "update_every_n_steps": 10,
        "learning_updates_per_learning_session": 10
    }
}"#;

#[test]
fn test_parse_json_config() {
    let config = DdpgConfig::from_json_str(PENDULUM_CONFIG).unwrap();
    let hp = &config.hyperparameters;

    assert_eq!(config.seed, 1);
    assert_eq!(hp.actor.learning_rate, 0.003);
    assert_eq!(hp.critic.learning_rate, 0.02);
    assert_eq!(hp.buffer_size().unwrap(), 1_000_000);
    assert_eq!(hp.batch_size, 256);
    assert_eq!(hp.update_every_n_steps, 10);
    assert_eq!(hp.learning_updates_per_learning_session, 10);
}

#[test]
fn test_optional_fields_take_defaults() {
    let config = DdpgConfig::from_json_str(PENDULUM_CONFIG).unwrap();
    let hp = &config.hyperparameters;

    assert_eq!(hp.mu, 0.0);
    assert_eq!(hp.theta, 0.15);
    assert_eq!(hp.sigma, 0.2);
    assert!(!hp.clip_rewards);
    assert_eq!(hp.learning_rate_schedule, LearningRateScheduler::Constant);
    assert_eq!(hp.critic.hidden_activation, Activation::Relu);

    let actor = hp.actor.architecture(NetworkRole::Actor);
    let critic = hp.critic.architecture(NetworkRole::Critic);
    assert_eq!(actor.final_activation, Activation::Tanh);
    assert_eq!(critic.final_activation, Activation::Linear);
    assert_eq!(critic.layer_sizes(3, 1), vec![3, 20, 20, 1]);
}

#[test]
fn test_buffer_size_falls_back_to_actor() {
    let mut config = DdpgConfig::default();
    config.hyperparameters.critic.buffer_size = None;
    config.hyperparameters.actor.buffer_size = Some(2048);
    assert_eq!(config.hyperparameters.buffer_size().unwrap(), 2048);
}

#[test]
fn test_missing_buffer_size_is_invalid() {
    let mut config = DdpgConfig::default();
    config.hyperparameters.critic.buffer_size = None;
    assert!(matches!(config.validate(), Err(DdpgError::InvalidParameter { .. })));
}

#[test]
fn test_out_of_range_values_are_invalid() {
    let mut config = DdpgConfig::default();
    config.hyperparameters.critic.tau = 0.0;
    assert!(config.validate().is_err());

    let mut config = DdpgConfig::default();
    config.hyperparameters.actor.tau = 1.5;
    assert!(config.validate().is_err());

    let mut config = DdpgConfig::default();
    config.hyperparameters.discount_rate = 1.01;
    assert!(config.validate().is_err());

    let mut config = DdpgConfig::default();
    config.hyperparameters.actor.learning_rate = -1e-3;
    assert!(config.validate().is_err());

    let mut config = DdpgConfig::default();
    config.hyperparameters.update_every_n_steps = 0;
    assert!(config.validate().is_err());

    let mut config = DdpgConfig::default();
    config.hyperparameters.sigma = -0.1;
    assert!(config.validate().is_err());
}

#[test]
fn test_boundary_values_are_valid() {
    let mut config = DdpgConfig::default();
    config.hyperparameters.actor.tau = 1.0;
    config.hyperparameters.discount_rate = 0.0;
    assert!(config.validate().is_ok());
    config.hyperparameters.discount_rate = 1.0;
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_parameter_names_the_network() {
    let mut config = DdpgConfig::default();
    config.hyperparameters.critic.gradient_clipping_norm = 0.0;
    match config.validate() {
        Err(DdpgError::InvalidParameter { name, .. }) => assert_eq!(name, "Critic.gradient_clipping_norm"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_malformed_json_is_serialization_error() {
    let err = DdpgConfig::from_json_str("{ \"seed\": 1 ").unwrap_err();
    assert!(matches!(err, DdpgError::Serialization(_)));
}

#[test]
fn test_json_round_trip() {
    let mut config = DdpgConfig::default();
    config.hyperparameters.learning_rate_schedule = LearningRateScheduler::rolling_score(200.0);
    let json = config.to_json_string().unwrap();
    assert_eq!(DdpgConfig::from_json_str(&json).unwrap(), config);
}

#[test]
fn test_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(PENDULUM_CONFIG.as_bytes()).unwrap();
    let config = DdpgConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.hyperparameters.discount_rate, 0.9);

    let missing = DdpgConfig::from_json_file(file.path().with_extension("missing"));
    assert!(matches!(missing, Err(DdpgError::Io(_))));
}

#[test]
fn test_optimizer_clipping_and_init_choices() {
    let defaults = DdpgConfig::from_json_str(PENDULUM_CONFIG).unwrap();
    assert_eq!(defaults.hyperparameters.actor.optimizer, OptimizerKind::Adam);
    assert_eq!(defaults.hyperparameters.actor.clipping, ClippingMode::GlobalNorm);
    assert_eq!(defaults.hyperparameters.actor.weight_init, None);

    let json = PENDULUM_CONFIG.replace(
        r#""final_layer_activation": "Tanh""#,
        r#""final_layer_activation": "Tanh", "optimizer": "SGD", "clipping": "Value", "weight_init": "HeNormal""#,
    );
    let config = DdpgConfig::from_json_str(&json).unwrap();
    let actor = &config.hyperparameters.actor;
    assert_eq!(actor.optimizer, OptimizerKind::SGD);
    assert_eq!(actor.clipper(), GradientClipper::ClipByValue { min: -5.0, max: 5.0 });
    assert_eq!(actor.architecture(NetworkRole::Actor).hidden_init, Some(WeightInit::HeNormal));
    assert_eq!(config.hyperparameters.critic.clipper(), GradientClipper::ClipByGlobalNorm { max_norm: 5.0 });
}
