use canary_classifiers::config::{
    ClassifierConfig, ClassifierType, ConnectedSetConfig, DensityConfig, KMeansSearchConfig,
};
use canary_classifiers::models::factory::build_classifier;
use canary_classifiers::models::Direction;

#[test]
fn classifier_config_round_trips_through_json() -> anyhow::Result<()> {
    let configs = vec![
        ClassifierConfig::default(),
        ClassifierConfig::new(2, ClassifierType::Density(DensityConfig::default())),
        ClassifierConfig::new(1, ClassifierType::ConnectedSet(ConnectedSetConfig::default())),
    ];
    for config in configs {
        let json = serde_json::to_string(&config)?;
        let back: ClassifierConfig = serde_json::from_str(&json)?;
        assert_eq!(back, config);
    }

    let search = KMeansSearchConfig::default();
    let back: KMeansSearchConfig = serde_json::from_str(&serde_json::to_string(&search)?)?;
    assert_eq!(back, search);
    Ok(())
}

#[test]
fn classifier_type_parses_names() {
    assert_eq!(
        "Three-Sigma".parse::<ClassifierType>().unwrap().name(),
        "three_sigma"
    );
    assert_eq!("hdbscan".parse::<ClassifierType>().unwrap().name(), "density");
    assert!("svm".parse::<ClassifierType>().is_err());
    assert_eq!(ClassifierType::default().name(), "frequency");
}

#[test]
fn factory_honours_value_column() -> anyhow::Result<()> {
    let kind: ClassifierType = "zero_deviation".parse().map_err(anyhow::Error::msg)?;
    let mut clf = build_classifier(ClassifierConfig::new(0, kind));
    // Column 0 carries the metric here; column 1 is noise.
    clf.fit("m", &ndarray::array![[10.0, 0.0], [10.0, 500.0]])?;
    let p = clf.predict("m", &ndarray::array![[10.0, 9000.0], [30.0, 0.0]], Direction::Both)?;
    assert_eq!(p.verdicts, vec![1, -1]);
    Ok(())
}
