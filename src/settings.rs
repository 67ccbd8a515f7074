//! # Settings Module
//!
//! ## Purpose
//! Balancer configuration: which algorithm runs, in which mode, and the numeric limits
//! and tolerances every algorithm obeys. The configuration is a plain serde struct and
//! can be stored as JSON next to the data it was used for.
//!
//! ## Usage Pattern
//! ```rust
//! use StoichCalc::settings::{Algorithm, BalancerConfig, Mode};
//!
//! let config = BalancerConfig::default()
//!     .with_algorithm("comb")
//!     .unwrap()
//!     .with_mode("auto")
//!     .unwrap();
//! assert_eq!(config.algorithm, Algorithm::Comb);
//! assert_eq!(config.mode, Mode::Auto);
//! ```
//!
//! ## Defaults
//! | Field | Default |
//! |-------|---------|
//! | algorithm | auto |
//! | mode | auto |
//! | max_comb | 1e8 |
//! | coef_limit | 1_000_000 |
//! | max_number_of_iterations | 1e8 |
//! | tolerance | 1e-8 |
//! | rounding_precision | 8 |
//! | max_denominator | 1000 |
//! | intify | true |
use crate::Stoichiometry::stoich_errors::ReactionError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Balancing algorithm. `Auto` tries inv, gpinv, ppinv and comb in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Auto,
    Inv,
    Gpinv,
    Ppinv,
    Comb,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Auto => "auto",
            Algorithm::Inv => "inv",
            Algorithm::Gpinv => "gpinv",
            Algorithm::Ppinv => "ppinv",
            Algorithm::Comb => "comb",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = ReactionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Algorithm::Auto),
            "inv" => Ok(Algorithm::Inv),
            "gpinv" => Ok(Algorithm::Gpinv),
            "ppinv" => Ok(Algorithm::Ppinv),
            "comb" => Ok(Algorithm::Comb),
            _ => Err(ReactionError::NoSuchAlgorithm(s.to_string())),
        }
    }
}

/// Balancing mode.
/// - `Auto`: find coefficients from scratch (`balance` is accepted as an alias)
/// - `Force`: keep the target compound's coefficient from the reaction string, solve the rest
/// - `Check`: only verify the coefficients written in the reaction string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    #[serde(alias = "balance")]
    Auto,
    Force,
    Check,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Auto => "auto",
            Mode::Force => "force",
            Mode::Check => "check",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ReactionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" | "balance" => Ok(Mode::Auto),
            "force" => Ok(Mode::Force),
            "check" => Ok(Mode::Check),
            _ => Err(ReactionError::NoSuchMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerConfig {
    pub algorithm: Algorithm,
    pub mode: Mode,
    /// upper bound on any single coefficient tried by the combinatorial search
    pub max_comb: f64,
    /// largest coefficient (after normalisation) accepted from any algorithm
    pub coef_limit: f64,
    /// total number of candidate vectors the combinatorial search may test
    pub max_number_of_iterations: f64,
    /// relative tolerance of the element conservation check
    pub tolerance: f64,
    /// decimals kept before converting coefficients to integers
    pub rounding_precision: u32,
    /// denominator bound of the rational approximation
    pub max_denominator: i64,
    /// convert coefficients to the smallest integer vector
    pub intify: bool,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Auto,
            mode: Mode::Auto,
            max_comb: 1e8,
            coef_limit: 1_000_000.0,
            max_number_of_iterations: 1e8,
            tolerance: 1e-8,
            rounding_precision: 8,
            max_denominator: 1000,
            intify: true,
        }
    }
}

impl BalancerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_algorithm(mut self, algorithm: &str) -> Result<Self, ReactionError> {
        self.algorithm = algorithm.parse()?;
        Ok(self)
    }

    pub fn with_mode(mut self, mode: &str) -> Result<Self, ReactionError> {
        self.mode = mode.parse()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ReactionError> {
        let positive = [
            ("max_comb", self.max_comb),
            ("coef_limit", self.coef_limit),
            ("max_number_of_iterations", self.max_number_of_iterations),
            ("tolerance", self.tolerance),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ReactionError::BadConfig(format!(
                    "{} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }
        if self.max_denominator < 1 {
            return Err(ReactionError::BadConfig(format!(
                "max_denominator must be at least 1, got {}",
                self.max_denominator
            )));
        }
        if self.rounding_precision > 15 {
            return Err(ReactionError::BadConfig(format!(
                "rounding_precision above 15 decimals is meaningless for f64, got {}",
                self.rounding_precision
            )));
        }
        Ok(())
    }

    /// Loads a configuration from JSON. A missing file gives the defaults; missing
    /// fields in the file take their default values.
    pub fn load(path: &str) -> Result<Self, ReactionError> {
        if !Path::new(path).exists() {
            warn!("config file {} not found, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| ReactionError::BadConfig(format!("cannot read {}: {}", path, e)))?;
        let config: BalancerConfig = serde_json::from_str(&content)
            .map_err(|e| ReactionError::BadConfig(format!("cannot parse {}: {}", path, e)))?;
        config.validate()?;
        info!("balancer config loaded from {}", path);
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<(), ReactionError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ReactionError::BadConfig(e.to_string()))?;
        fs::write(path, content)
            .map_err(|e| ReactionError::BadConfig(format!("cannot write {}: {}", path, e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = BalancerConfig::default();
        assert_eq!(config.algorithm, Algorithm::Auto);
        assert_eq!(config.mode, Mode::Auto);
        assert_eq!(config.max_denominator, 1000);
        assert_eq!(config.rounding_precision, 8);
        assert!(config.intify);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("GPINV".parse::<Algorithm>().unwrap(), Algorithm::Gpinv);
        assert_eq!("balance".parse::<Mode>().unwrap(), Mode::Auto);
        assert_eq!("check".parse::<Mode>().unwrap(), Mode::Check);
        assert!(matches!(
            "simplex".parse::<Algorithm>(),
            Err(ReactionError::NoSuchAlgorithm(_))
        ));
        assert!(matches!(
            "guess".parse::<Mode>(),
            Err(ReactionError::NoSuchMode(_))
        ));
        assert!(BalancerConfig::default().with_algorithm("nope").is_err());
    }

    #[test]
    fn test_validate() {
        let config = BalancerConfig {
            tolerance: 0.0,
            ..BalancerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ReactionError::BadConfig(_))));
        let config = BalancerConfig {
            max_denominator: 0,
            ..BalancerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let config = BalancerConfig::default()
            .with_algorithm("ppinv")
            .unwrap()
            .with_mode("force")
            .unwrap();
        config.save(&path).unwrap();
        let loaded = BalancerConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_and_missing_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"algorithm": "comb", "mode": "balance"}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let loaded = BalancerConfig::load(&path).unwrap();
        assert_eq!(loaded.algorithm, Algorithm::Comb);
        assert_eq!(loaded.mode, Mode::Auto);
        assert_eq!(loaded.max_denominator, 1000);

        let missing = BalancerConfig::load("definitely_missing_balancer_config.json").unwrap();
        assert_eq!(missing, BalancerConfig::default());
    }

    #[test]
    fn test_bad_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        assert!(matches!(
            BalancerConfig::load(&path),
            Err(ReactionError::BadConfig(_))
        ));
    }
}
