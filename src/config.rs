//! Analysis configuration.
//!
//! [`AnalysisConfig`] is built once per run through [`AnalysisConfigBuilder`] and never changes
//! afterwards. Ranges are checked at construction, so the statistical routines can rely on them.

use crate::errors::{AnalysisError, AnalysisResult};
use crate::testing::correction::Correction;
use serde::{Deserialize, Serialize};

/// Measure of center used by the Levene test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Center {
    Mean,
    #[default]
    Median,
    /// Trimmed mean, cutting `trim_proportion` of each sample from both ends
    Trimmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NormalityMethod {
    #[default]
    ShapiroWilk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HomoskedasticityMethod {
    #[default]
    Levene,
}

pub const DEFAULT_ALPHA: f64 = 0.05;
pub const DEFAULT_TRIM_PROPORTION: f64 = 0.05;

/// Immutable settings of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConfigParams", into = "ConfigParams")]
pub struct AnalysisConfig {
    alpha: f64,
    center: Center,
    trim_proportion: f64,
    normality_method: NormalityMethod,
    homoskedasticity_method: HomoskedasticityMethod,
    correction: Correction,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            center: Center::default(),
            trim_proportion: DEFAULT_TRIM_PROPORTION,
            normality_method: NormalityMethod::default(),
            homoskedasticity_method: HomoskedasticityMethod::default(),
            correction: Correction::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Significance threshold, `1 - confidence level`.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn confidence_level(&self) -> f64 {
        1.0 - self.alpha
    }

    pub fn center(&self) -> Center {
        self.center
    }

    /// Only consulted when [`center`](Self::center) is [`Center::Trimmed`].
    pub fn trim_proportion(&self) -> f64 {
        self.trim_proportion
    }

    pub fn normality_method(&self) -> NormalityMethod {
        self.normality_method
    }

    pub fn homoskedasticity_method(&self) -> HomoskedasticityMethod {
        self.homoskedasticity_method
    }

    pub fn correction(&self) -> Correction {
        self.correction
    }

    /// Hashable identity of the settings, floats compared by bit pattern.
    pub(crate) fn key(&self) -> ConfigKey {
        ConfigKey {
            alpha: self.alpha.to_bits(),
            center: self.center,
            trim_proportion: self.trim_proportion.to_bits(),
            normality_method: self.normality_method,
            homoskedasticity_method: self.homoskedasticity_method,
            correction: self.correction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ConfigKey {
    alpha: u64,
    center: Center,
    trim_proportion: u64,
    normality_method: NormalityMethod,
    homoskedasticity_method: HomoskedasticityMethod,
    correction: Correction,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisConfigBuilder {
    alpha: Option<f64>,
    confidence_level: Option<f64>,
    center: Option<Center>,
    trim_proportion: Option<f64>,
    normality_method: Option<NormalityMethod>,
    homoskedasticity_method: Option<HomoskedasticityMethod>,
    correction: Option<Correction>,
}

impl AnalysisConfigBuilder {
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self.confidence_level = None;
        self
    }

    /// Sets alpha to `1 - level`.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = Some(level);
        self.alpha = None;
        self
    }

    pub fn center(mut self, center: Center) -> Self {
        self.center = Some(center);
        self
    }

    pub fn trim_proportion(mut self, proportion: f64) -> Self {
        self.trim_proportion = Some(proportion);
        self
    }

    pub fn normality_method(mut self, method: NormalityMethod) -> Self {
        self.normality_method = Some(method);
        self
    }

    pub fn homoskedasticity_method(mut self, method: HomoskedasticityMethod) -> Self {
        self.homoskedasticity_method = Some(method);
        self
    }

    pub fn correction(mut self, correction: Correction) -> Self {
        self.correction = Some(correction);
        self
    }

    pub fn build(self) -> AnalysisResult<AnalysisConfig> {
        let alpha = match (self.alpha, self.confidence_level) {
            (_, Some(level)) => {
                if !(level > 0.0 && level < 1.0) {
                    return Err(AnalysisError::InvalidConfig {
                        field: "confidence_level",
                        value: level,
                        reason: "must be in (0, 1)",
                    });
                }
                1.0 - level
            }
            (Some(alpha), None) => alpha,
            (None, None) => DEFAULT_ALPHA,
        };
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(AnalysisError::InvalidConfig {
                field: "alpha",
                value: alpha,
                reason: "must be in (0, 1)",
            });
        }

        let trim_proportion = self.trim_proportion.unwrap_or(DEFAULT_TRIM_PROPORTION);
        if !(0.0..=1.0).contains(&trim_proportion) {
            return Err(AnalysisError::InvalidConfig {
                field: "trim_proportion",
                value: trim_proportion,
                reason: "must be in [0, 1]",
            });
        }

        Ok(AnalysisConfig {
            alpha,
            center: self.center.unwrap_or_default(),
            trim_proportion,
            normality_method: self.normality_method.unwrap_or_default(),
            homoskedasticity_method: self.homoskedasticity_method.unwrap_or_default(),
            correction: self.correction.unwrap_or_default(),
        })
    }
}

/// Flat wire form of [`AnalysisConfig`]; deserialization goes through the builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct ConfigParams {
    alpha: f64,
    center: Center,
    trim_proportion: f64,
    normality_method: NormalityMethod,
    homoskedasticity_method: HomoskedasticityMethod,
    correction: Correction,
}

impl Default for ConfigParams {
    fn default() -> Self {
        AnalysisConfig::default().into()
    }
}

impl From<AnalysisConfig> for ConfigParams {
    fn from(config: AnalysisConfig) -> Self {
        ConfigParams {
            alpha: config.alpha,
            center: config.center,
            trim_proportion: config.trim_proportion,
            normality_method: config.normality_method,
            homoskedasticity_method: config.homoskedasticity_method,
            correction: config.correction,
        }
    }
}

impl TryFrom<ConfigParams> for AnalysisConfig {
    type Error = AnalysisError;

    fn try_from(params: ConfigParams) -> Result<Self, Self::Error> {
        AnalysisConfig::builder()
            .alpha(params.alpha)
            .center(params.center)
            .trim_proportion(params.trim_proportion)
            .normality_method(params.normality_method)
            .homoskedasticity_method(params.homoskedasticity_method)
            .correction(params.correction)
            .build()
    }
}
