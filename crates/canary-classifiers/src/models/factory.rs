use crate::config::{ClassifierConfig, ClassifierType};
use crate::models::classifier_trait::Classifier;
use crate::models::connected_set::ConnectedSetClassifier;
use crate::models::density::DensityClassifier;
use crate::models::frequency::FrequencyAnomalyDetector;
use crate::models::isolation_forest::IsolationForestClassifier;
use crate::models::simple_distance::SimpleDistanceClassifier;
use crate::models::three_sigma::ThreeSigmaClassifier;
use crate::models::zero_deviation::ZeroDeviationClassifier;

/// Build a boxed classifier from a `ClassifierConfig`.
/// Value-based classifiers read `config.value_column`; the others use every column.
pub fn build_classifier(config: ClassifierConfig) -> Box<dyn Classifier> {
    let column = config.value_column;
    match config.classifier_type {
        ClassifierType::ZeroDeviation(c) => {
            Box::new(ZeroDeviationClassifier::new(c).with_value_column(column))
        }
        ClassifierType::ThreeSigma(c) => {
            Box::new(ThreeSigmaClassifier::new(c).with_value_column(column))
        }
        ClassifierType::Frequency(c) => {
            Box::new(FrequencyAnomalyDetector::new(c).with_value_column(column))
        }
        ClassifierType::Density(c) => Box::new(DensityClassifier::new(c)),
        ClassifierType::IsolationForest(c) => Box::new(IsolationForestClassifier::new(c)),
        ClassifierType::SimpleDistance(c) => Box::new(SimpleDistanceClassifier::new(c)),
        ClassifierType::ConnectedSet(c) => Box::new(ConnectedSetClassifier::new(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_builds_with_its_name() {
        for name in [
            "zero_deviation",
            "three_sigma",
            "frequency",
            "density",
            "isolation_forest",
            "simple_distance",
            "connected_set",
        ] {
            let kind: ClassifierType = name.parse().unwrap();
            let clf = build_classifier(ClassifierConfig::new(1, kind));
            assert_eq!(clf.name(), name);
        }
    }
}
