use canary_classifiers::clustering::{Hdbscan, KMeansClusterSearch, NOISE};
use canary_classifiers::config::KMeansSearchConfig;
use canary_classifiers::ClassifierError;
use ndarray::array;

#[test]
fn search_splits_disjoint_feature_sets() -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    // Bag-of-words style rows: two templates with disjoint vocabularies.
    let x = array![
        [3.0, 1.0, 0.0, 0.0],
        [3.0, 1.0, 0.0, 0.0],
        [2.9, 1.0, 0.0, 0.0],
        [0.0, 0.0, 5.0, 2.0],
        [0.0, 0.0, 5.0, 2.1]
    ];
    let mut search = KMeansClusterSearch::new(KMeansSearchConfig::default());
    search.fit(&x)?;
    assert_eq!(search.k()?, 2);
    assert!(search.is_homogeneous()?);

    let labels = search.labels()?.to_vec();
    assert_eq!(search.predict(&array![[0.0, 0.0, 4.0, 2.0]])?, vec![labels[3]]);
    let mut sizes = search.cluster_sizes()?;
    sizes.sort_unstable();
    assert_eq!(sizes, vec![2, 3]);
    Ok(())
}

#[test]
fn search_is_capped_for_inputs_larger_than_max_k() -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    // 105 rows with pairwise disjoint vocabularies: any cluster of two or more
    // is inhomogeneous, so the default cap of 100 clusters cannot be enough.
    let n = 105;
    let x = ndarray::Array2::from_shape_fn((n, n), |(i, j)| if i == j { 1.0 } else { 0.0 });
    let mut search = KMeansClusterSearch::default();
    search.fit(&x)?;
    assert_eq!(search.config().max_k, 100);
    assert_eq!(search.k()?, 100);
    assert!(!search.is_homogeneous()?);
    assert_eq!(search.labels()?.len(), n);
    assert_eq!(search.cluster_sizes()?.iter().sum::<usize>(), n);
    Ok(())
}

#[test]
fn search_within_cap_still_finds_homogeneous_k() -> anyhow::Result<()> {
    let x = array![
        [1.0, 1.0, 0.0, 0.0],
        [1.0, 1.1, 0.0, 0.0],
        [1.1, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 1.0],
        [0.0, 0.0, 1.1, 1.0],
        [0.0, 0.0, 1.0, 1.1]
    ];
    let mut search = KMeansClusterSearch::new(KMeansSearchConfig {
        max_k: 4,
        ..Default::default()
    });
    search.fit(&x)?;
    assert_eq!(search.k()?, 2);
    assert!(search.is_homogeneous()?);
    Ok(())
}

#[test]
fn search_rejects_bad_input() {
    let mut search = KMeansClusterSearch::default();
    assert!(matches!(
        search.fit(&ndarray::Array2::zeros((0, 3))),
        Err(ClassifierError::EmptyInput { .. })
    ));
    assert_eq!(search.labels().unwrap_err(), ClassifierError::NotFitted);
}

#[test]
fn hdbscan_marks_isolated_points_as_noise() {
    let x = array![
        [0.0, 0.0],
        [0.1, 0.0],
        [0.0, 0.1],
        [0.1, 0.1],
        [10.0, 10.0],
        [10.1, 10.0],
        [10.0, 10.1],
        [10.1, 10.1],
        [-30.0, 40.0]
    ];
    let result = Hdbscan::new(3, None).unwrap().fit(&x);
    assert_eq!(result.n_clusters, 2);
    assert_eq!(result.labels[8], NOISE);
    assert_eq!(result.probabilities[8], 0.0);
    assert_ne!(result.labels[0], result.labels[4]);
}
