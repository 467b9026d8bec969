use std::collections::BTreeSet;

use ndarray::{Array1, Array2};
use omigami_selection::config::{ExecutionMode, ModelConfig, ModelType, SelectionConfig};
use omigami_selection::data_handling::InputData;
use omigami_selection::feature_selector::FeatureSelector;
use omigami_selection::splitter::SplitPlan;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Feature 0 carries the class, feature 1 carries it with heavy overlap,
/// the rest is noise.
fn dataset(n_samples: usize, n_features: usize, seed: u64) -> InputData {
    let mut rng = StdRng::seed_from_u64(seed);
    let y = Array1::from_vec((0..n_samples).map(|i| i % 2).collect());
    let x = Array2::from_shape_fn((n_samples, n_features), |(i, j)| {
        let noise: f64 = rng.gen_range(-1.0..1.0);
        match j {
            0 => 3.0 * y[i] as f64 + 0.5 * noise,
            1 => 0.8 * y[i] as f64 + noise,
            _ => noise,
        }
    });
    InputData::new(x, y).unwrap()
}

fn config() -> SelectionConfig {
    SelectionConfig {
        n_outer: 2,
        n_inner: 2,
        dropout_rate: 0.2,
        random_state: 0,
        model: ModelConfig::new(ModelType::RandomForest {
            n_trees: 20,
            max_depth: Some(4),
            min_weight_split: 2.0,
        }),
        ..Default::default()
    }
}

#[test]
fn test_twelve_features_two_by_two_folds() {
    let _ = env_logger::builder().is_test(true).try_init();

    let data = dataset(40, 12, 0);
    let selector = FeatureSelector::new(config()).unwrap();
    let results = selector.fit(&data).unwrap();

    assert_eq!(results.raw_results.len(), 1);
    let folds = &results.raw_results[0];
    assert_eq!(folds.len(), 2);

    for (i, fold) in folds.iter().enumerate() {
        assert_eq!(fold.outer_index, i);
        let sizes = fold.evals().map(|e| e.ranks.len());
        assert!(1 <= sizes.min && sizes.min <= sizes.mid);
        assert!(sizes.mid <= sizes.max && sizes.max <= 12);
        assert_eq!(fold.score_vs_feats.keys().next_back(), Some(&12));
        assert_eq!(fold.score_vs_feats.keys().next(), Some(&1));
        // MISS never exceeds the outer test size of 20
        assert!(fold.evals().iter().all(|(_, e)| (-20.0..=0.0).contains(&e.test_score)));
    }

    // the same seed rebuilds the plan the selector used
    let plan = SplitPlan::build(&data, 2, 2, 0).unwrap();
    let tests: Vec<BTreeSet<usize>> = plan
        .outer_splits()
        .iter()
        .map(|s| s.test.iter().copied().collect())
        .collect();
    assert_eq!(tests[0].len(), 20);
    assert_eq!(tests[1].len(), 20);
    assert!(tests[0].is_disjoint(&tests[1]));

    assert!(results.selected_features.min.contains(&0));
    assert!(results.avg_ranks.mid.get(0) <= 2.0);
    let names = results.feature_names(&data);
    assert_eq!(names.min.len(), results.selected_features.min.len());
}

#[test]
fn test_parallel_and_sequential_runs_agree() {
    let data = dataset(30, 6, 9);
    let sequential = FeatureSelector::new(SelectionConfig {
        n_outer: 3,
        n_repetitions: 2,
        ..config()
    })
    .unwrap();
    let parallel = FeatureSelector::new(SelectionConfig {
        n_outer: 3,
        n_repetitions: 2,
        execution: ExecutionMode::Parallel { n_threads: 3 },
        ..config()
    })
    .unwrap();

    let a = sequential.fit(&data).unwrap();
    let b = parallel.fit(&data).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.raw_results.len(), 2);
}

#[test]
fn test_results_serialize_to_json() {
    let data = dataset(40, 5, 1);
    let selector = FeatureSelector::new(SelectionConfig {
        model: ModelConfig::new("scaled_logreg".parse().unwrap()),
        ..config()
    })
    .unwrap();
    let results = selector.fit(&data).unwrap();

    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json["n_features"], 5);
    assert!(json["selected_features"]["min"].is_array());
    assert_eq!(json["raw_results"][0].as_array().unwrap().len(), 2);
}
