use ndarray::array;

use super::fixtures::LinearEstimator;
use crate::agent::{DqnAgent, DqnAgentBuilder};
use crate::estimator::ValueEstimator;

fn all_zero(parameters: &[ndarray::Array1<f32>]) -> bool {
    parameters.iter().all(|p| p.iter().all(|&v| v == 0.0))
}

#[test]
fn test_default_configuration() {
    let agent = DqnAgent::new(LinearEstimator::zeros(4, 2));

    assert_eq!(agent.sample_size(), DqnAgentBuilder::DEFAULT_SAMPLE_SIZE);
    assert_eq!(agent.learning_rate(), DqnAgentBuilder::DEFAULT_LEARNING_RATE);
    assert_eq!(
        agent.memory().capacity(),
        DqnAgentBuilder::DEFAULT_MAX_MEMORY_LEN
    );
    assert_eq!(agent.exploration(), 0.1);
    assert!(agent.frozen_estimator().is_none());
}

#[test]
fn test_warm_up_learn_is_a_no_op() {
    let mut agent = DqnAgentBuilder::new()
        .sample_size(4)
        .exploration(0.5)
        .exploration_decay(0.5)
        .build(LinearEstimator::zeros(2, 2))
        .unwrap();

    for i in 0..3 {
        agent
            .remember(array![i as f32, 0.0].view(), 0, 1.0, true, None)
            .unwrap();
    }

    let metrics = agent.learn().unwrap();
    assert!(metrics.is_none());

    // Neither the parameters nor the exploration constant moved.
    assert!(all_zero(&agent.estimator().parameters()));
    assert_eq!(agent.exploration(), 0.5);
}

#[test]
fn test_learn_reports_metrics_and_decays_exploration() {
    let mut agent = DqnAgentBuilder::new()
        .sample_size(2)
        .learning_rate(0.1)
        .exploration(0.5)
        .exploration_decay(0.5)
        .build(LinearEstimator::zeros(2, 2))
        .unwrap();

    // Identical transitions keep the loss independent of the draw: the
    // estimator predicts 0 everywhere and every target is the reward 1.
    for _ in 0..3 {
        agent
            .remember(array![1.0, 0.0].view(), 0, 1.0, true, None)
            .unwrap();
    }

    let metrics = agent.learn().unwrap().expect("memory is warm");
    assert_eq!(metrics.loss, 1.0);
    assert_eq!(metrics.exploration, 0.25);
    assert_eq!(metrics.learning_rate, 0.1);

    // The gradient step moved the live estimator.
    assert!(!all_zero(&agent.estimator().parameters()));
}

#[test]
fn test_learn_runs_once_memory_reaches_sample_size() {
    let mut agent = DqnAgentBuilder::new()
        .sample_size(3)
        .build(LinearEstimator::zeros(1, 2))
        .unwrap();

    for i in 0..2 {
        agent
            .remember(array![1.0].view(), 0, i as f32, true, None)
            .unwrap();
        assert!(agent.learn().unwrap().is_none());
    }

    agent
        .remember(array![1.0].view(), 0, 1.0, true, None)
        .unwrap();
    assert!(agent.learn().unwrap().is_some());
}

#[test]
fn test_frozen_estimator_syncs_on_a_fixed_period() {
    let mut agent = DqnAgentBuilder::new()
        .sample_size(1)
        .learning_rate(0.25)
        .exploration(0.0)
        .freeze_interval(3)
        .build(LinearEstimator::zeros(1, 2))
        .unwrap();

    agent
        .remember(array![1.0].view(), 0, 1.0, true, None)
        .unwrap();

    assert!(all_zero(&agent.frozen_estimator().unwrap().parameters()));

    // Steps 1 and 2: the live estimator moves, the frozen copy does not.
    agent.learn().unwrap().unwrap();
    assert!(!all_zero(&agent.estimator().parameters()));
    assert!(all_zero(&agent.frozen_estimator().unwrap().parameters()));

    agent.learn().unwrap().unwrap();
    assert!(all_zero(&agent.frozen_estimator().unwrap().parameters()));

    // Step 3: countdown reaches zero and the parameters are copied.
    agent.learn().unwrap().unwrap();
    assert_eq!(
        agent.frozen_estimator().unwrap().parameters(),
        agent.estimator().parameters()
    );
    assert!(!all_zero(&agent.frozen_estimator().unwrap().parameters()));
}

#[test]
fn test_act_queries_the_frozen_estimator_when_freezing() {
    // Frozen copy is taken at build time: Q = [0, 1], arg-max action 1.
    let mut agent = DqnAgentBuilder::new()
        .exploration(0.0)
        .freeze_interval(5)
        .build(LinearEstimator::from_weights(array![[0.0, 1.0]]))
        .unwrap();

    // Push the live estimator the other way; acting must not notice.
    agent.estimator_mut().weights = array![[1.0, 0.0]];

    assert_eq!(agent.act(array![1.0].view(), true).unwrap(), 1);
    assert_eq!(agent.act(array![1.0].view(), false).unwrap(), 1);
}

#[test]
fn test_act_queries_the_live_estimator_without_freezing() {
    let mut agent = DqnAgentBuilder::new()
        .exploration(0.0)
        .build(LinearEstimator::from_weights(array![[0.0, 1.0]]))
        .unwrap();

    agent.estimator_mut().weights = array![[1.0, 0.0]];

    assert_eq!(agent.act(array![1.0].view(), true).unwrap(), 0);
}

#[test]
fn test_builder_rejects_invalid_configuration() {
    let estimator = LinearEstimator::zeros(2, 2);

    assert!(DqnAgentBuilder::new()
        .sample_size(0)
        .build(estimator.clone())
        .is_err());
    assert!(DqnAgentBuilder::new()
        .learning_rate(0.0)
        .build(estimator.clone())
        .is_err());
    assert!(DqnAgentBuilder::new()
        .learning_rate(f32::NAN)
        .build(estimator.clone())
        .is_err());
    assert!(DqnAgentBuilder::new()
        .max_memory_len(0)
        .build(estimator.clone())
        .is_err());
    assert!(DqnAgentBuilder::new()
        .exploration(1.5)
        .build(estimator.clone())
        .is_err());
    assert!(DqnAgentBuilder::new()
        .discount(0.0)
        .build(estimator)
        .is_err());
}

#[test]
fn test_parameter_copy_between_estimators() {
    let source = LinearEstimator::from_weights(array![[1.0, 2.0], [3.0, 4.0]]);
    let mut target = LinearEstimator::zeros(2, 2);

    target.copy_parameters_from(&source).unwrap();
    assert_eq!(target.parameters(), source.parameters());

    // A structurally different estimator is rejected.
    let mut narrow = LinearEstimator::zeros(1, 2);
    assert!(narrow.copy_parameters_from(&source).is_err());
}
