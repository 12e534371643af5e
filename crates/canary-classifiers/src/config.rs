use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::data_handling::VALUE_COLUMN;

/// Central configuration for classifiers in the crate.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Column read by the value-based classifiers (zero-deviation,
    /// three-sigma, frequency). Matrix-based classifiers use every column.
    pub value_column: usize,

    #[serde(flatten)]
    pub classifier_type: ClassifierType,
}

/// Supported classifiers and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ClassifierType {
    ZeroDeviation(ZeroDeviationConfig),
    ThreeSigma(ThreeSigmaConfig),
    Frequency(FrequencyConfig),
    Density(DensityConfig),
    IsolationForest(IsolationForestConfig),
    SimpleDistance(SimpleDistanceConfig),
    ConnectedSet(ConnectedSetConfig),
}

/// Flags a value when it is off the mean by more than `tolerance` and by more
/// than `deviation_ratio * |mean|`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct ZeroDeviationConfig {
    pub tolerance: f64,
    pub deviation_ratio: f64,
}

impl Default for ZeroDeviationConfig {
    fn default() -> Self {
        ZeroDeviationConfig {
            tolerance: 1.0,
            deviation_ratio: 0.5,
        }
    }
}

/// Flags a value when it is off the mean by more than `tolerance` and by more
/// than `sigma_multiplier` standard deviations.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct ThreeSigmaConfig {
    pub tolerance: f64,
    pub sigma_multiplier: f64,
}

impl Default for ThreeSigmaConfig {
    fn default() -> Self {
        ThreeSigmaConfig {
            tolerance: 1.0,
            sigma_multiplier: 3.0,
        }
    }
}

/// Per-label choice between the zero-deviation and three-sigma rules.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct FrequencyConfig {
    /// Baselines with a standard deviation below this use the zero-deviation rule.
    pub std_cutoff: f64,
    pub zero_deviation: ZeroDeviationConfig,
    pub three_sigma: ThreeSigmaConfig,
}

impl FrequencyConfig {
    pub const DEFAULT_STD_CUTOFF: f64 = 1e-3;

    pub fn new(std_cutoff: f64) -> Self {
        FrequencyConfig {
            std_cutoff,
            zero_deviation: ZeroDeviationConfig::default(),
            three_sigma: ThreeSigmaConfig::default(),
        }
    }
}

impl Default for FrequencyConfig {
    fn default() -> Self {
        FrequencyConfig::new(Self::DEFAULT_STD_CUTOFF)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct DensityConfig {
    pub min_cluster_size: usize,
    /// Neighbourhood size for core distances; defaults to `min_cluster_size`.
    pub min_samples: Option<usize>,
    /// Membership probability below which a point is a weak member.
    pub membership_threshold: f64,
    pub allow_single_cluster: bool,
}

impl Default for DensityConfig {
    fn default() -> Self {
        DensityConfig {
            min_cluster_size: 3,
            min_samples: None,
            membership_threshold: 0.5,
            allow_single_cluster: true,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct IsolationForestConfig {
    pub n_estimators: usize,
    pub max_samples: usize,
    /// Expected share of outliers in the baseline, in `[0, 0.5]`.
    pub contamination: f64,
    pub seed: u64,
}

impl Default for IsolationForestConfig {
    fn default() -> Self {
        IsolationForestConfig {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.1,
            seed: 42,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct SimpleDistanceConfig {
    /// Largest Bray-Curtis distance at which a test row still matches.
    pub threshold: f64,
}

impl Default for SimpleDistanceConfig {
    fn default() -> Self {
        SimpleDistanceConfig { threshold: 0.1 }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ConnectedSetConfig {
    /// Largest accepted ratio of median intra-partition distance to the
    /// neighbourhood radius.
    pub threshold: f64,
    /// Classifier fitted once per partition.
    pub delegate: Box<ClassifierConfig>,
}

impl Default for ConnectedSetConfig {
    fn default() -> Self {
        ConnectedSetConfig {
            threshold: 2.0,
            delegate: Box::new(ClassifierConfig::new(
                VALUE_COLUMN,
                ClassifierType::SimpleDistance(SimpleDistanceConfig::default()),
            )),
        }
    }
}

/// Settings for the k-means cluster-count search.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct KMeansSearchConfig {
    /// Minimum pairwise cosine and Jaccard similarity inside every cluster.
    pub homogeneity_threshold: f64,
    /// Upper bound of the searched cluster counts.
    pub max_k: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub seed: u64,
}

impl Default for KMeansSearchConfig {
    fn default() -> Self {
        KMeansSearchConfig {
            homogeneity_threshold: 0.9,
            max_k: 100,
            max_iter: 300,
            tol: 1e-4,
            seed: 42,
        }
    }
}

impl Default for ClassifierType {
    fn default() -> Self {
        ClassifierType::Frequency(FrequencyConfig::default())
    }
}

impl ClassifierType {
    pub fn name(&self) -> &'static str {
        match self {
            ClassifierType::ZeroDeviation(_) => "zero_deviation",
            ClassifierType::ThreeSigma(_) => "three_sigma",
            ClassifierType::Frequency(_) => "frequency",
            ClassifierType::Density(_) => "density",
            ClassifierType::IsolationForest(_) => "isolation_forest",
            ClassifierType::SimpleDistance(_) => "simple_distance",
            ClassifierType::ConnectedSet(_) => "connected_set",
        }
    }
}

impl FromStr for ClassifierType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "zero_deviation" => Ok(ClassifierType::ZeroDeviation(Default::default())),
            "three_sigma" => Ok(ClassifierType::ThreeSigma(Default::default())),
            "frequency" => Ok(ClassifierType::default()),
            "density" | "hdbscan" => Ok(ClassifierType::Density(Default::default())),
            "isolation_forest" => Ok(ClassifierType::IsolationForest(Default::default())),
            "simple_distance" => Ok(ClassifierType::SimpleDistance(Default::default())),
            "connected_set" => Ok(ClassifierType::ConnectedSet(Default::default())),
            _ => Err(format!("Unknown classifier type: {}", s)),
        }
    }
}

impl ClassifierConfig {
    pub fn new(value_column: usize, classifier_type: ClassifierType) -> Self {
        Self {
            value_column,
            classifier_type,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            value_column: VALUE_COLUMN,
            classifier_type: ClassifierType::default(),
        }
    }
}
