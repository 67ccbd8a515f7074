use crate::Stoichiometry::balancing_algos::{
    AlgorithmEnum, AlgorithmFailure, BalancingAlgorithm, Combinatorial, FailureKind,
    GeneralPseudoInverse, InverseAlgorithm, PINV_EPS, PartialPseudoInverse, algorithm_ladder,
    create_algorithm,
};
use crate::Stoichiometry::reaction_matrix::ReactionMatrix;
use crate::Stoichiometry::stoich_errors::ReactionError;
use crate::Utils::rational::{gcd_of, lcm_of, limit_denominator, round_to};
use crate::settings::{BalancerConfig, Mode};
use log::{info, warn};
use nalgebra::DVector;
use serde::Serialize;

/// Coefficients found for a reaction and the algorithm (or mode) that produced them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceResult {
    pub coefficients: Vec<f64>,
    pub algorithm: String,
}

/// Finds stoichiometric coefficients for one reaction matrix.
///
/// Every algorithm's raw vector goes through the same post-processing: sign fix,
/// division by the smallest entry, limit check, rounding, conversion to the smallest
/// integer vector (when `intify` is on) and a final element conservation check.
/// Nothing is returned that fails the conservation check.
pub struct Balancer {
    reaction_matrix: ReactionMatrix,
    config: BalancerConfig,
}

impl Balancer {
    pub fn new(reaction_matrix: ReactionMatrix, config: BalancerConfig) -> Result<Self, ReactionError> {
        config.validate()?;
        Ok(Self {
            reaction_matrix,
            config,
        })
    }

    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    pub fn reaction_matrix(&self) -> &ReactionMatrix {
        &self.reaction_matrix
    }

    pub fn inv(&self) -> Result<Vec<f64>, ReactionError> {
        Ok(self.run(&InverseAlgorithm.into())?)
    }

    pub fn gpinv(&self) -> Result<Vec<f64>, ReactionError> {
        Ok(self.run(&GeneralPseudoInverse.into())?)
    }

    pub fn ppinv(&self) -> Result<Vec<f64>, ReactionError> {
        Ok(self.run(&PartialPseudoInverse.into())?)
    }

    pub fn comb(&self) -> Result<Vec<f64>, ReactionError> {
        Ok(self.run(&Combinatorial.into())?)
    }

    /// Runs one algorithm and post-processes its output
    pub fn run(&self, algorithm: &AlgorithmEnum) -> Result<Vec<f64>, AlgorithmFailure> {
        let raw = algorithm.solve(&self.reaction_matrix, &self.config)?;
        self.finalize(algorithm.name(), &raw)
    }

    /// Tries inv, gpinv, ppinv and comb in turn; the first one that yields a valid
    /// balanced vector wins
    pub fn auto(&self) -> Result<BalanceResult, ReactionError> {
        let mut failures: Vec<String> = Vec::new();
        for algorithm in algorithm_ladder() {
            match self.run(&algorithm) {
                Ok(coefficients) => {
                    info!("balanced by {}: {:?}", algorithm.name(), coefficients);
                    return Ok(BalanceResult {
                        coefficients,
                        algorithm: algorithm.name().to_string(),
                    });
                }
                Err(failure) => {
                    warn!("{}", failure);
                    failures.push(failure.to_string());
                }
            }
        }
        Err(ReactionError::ReactionNotBalanced(failures.join("; ")))
    }

    /// Dispatches on the configured mode. `initial` are the coefficients written in the
    /// reaction string, `target` the column index of the target compound.
    pub fn balance(&self, initial: &[f64], target: usize) -> Result<BalanceResult, ReactionError> {
        match self.config.mode {
            Mode::Check => self.check(initial),
            Mode::Force => self.force(initial, target),
            Mode::Auto => match create_algorithm(self.config.algorithm) {
                None => self.auto(),
                Some(algorithm) => {
                    let coefficients = self.run(&algorithm)?;
                    Ok(BalanceResult {
                        coefficients,
                        algorithm: algorithm.name().to_string(),
                    })
                }
            },
        }
    }

    fn check_length(&self, coefficients: &[f64]) -> Result<(), ReactionError> {
        if coefficients.len() != self.reaction_matrix.ncols() {
            return Err(ReactionError::BadCoefficients(format!(
                "{} coefficients for {} compounds",
                coefficients.len(),
                self.reaction_matrix.ncols()
            )));
        }
        Ok(())
    }

    fn check_positive(coefficients: &[f64]) -> Result<(), ReactionError> {
        if let Some(bad) = coefficients.iter().find(|c| !c.is_finite() || **c <= 0.0) {
            return Err(ReactionError::BadCoefficients(format!(
                "coefficient {} is not a positive number",
                bad
            )));
        }
        Ok(())
    }

    /// Verifies user coefficients; returns them unchanged when they conserve every element
    pub fn check(&self, coefficients: &[f64]) -> Result<BalanceResult, ReactionError> {
        self.check_length(coefficients)?;
        Self::check_positive(coefficients)?;
        if !Self::is_reaction_balanced(&self.reaction_matrix, coefficients, self.config.tolerance) {
            return Err(ReactionError::ReactionNotBalanced(format!(
                "coefficients {:?} do not conserve every element",
                coefficients
            )));
        }
        Ok(BalanceResult {
            coefficients: coefficients.to_vec(),
            algorithm: "check".to_string(),
        })
    }

    /// Keeps the target compound's coefficient from `initial` and solves for the rest
    /// (exact inverse when the remaining system is square, least squares otherwise).
    /// The result is rounded but not converted to integers.
    pub fn force(&self, initial: &[f64], target: usize) -> Result<BalanceResult, ReactionError> {
        self.check_length(initial)?;
        let n = self.reaction_matrix.ncols();
        if target >= n {
            return Err(ReactionError::BadTarget(format!(
                "target index {} for {} compounds",
                target, n
            )));
        }
        let fixed = initial[target];
        Self::check_positive(&[fixed])?;
        let signed = self.reaction_matrix.signed();
        let rest = signed.clone().remove_column(target);
        let rhs = signed.column(target).into_owned() * (-fixed);
        let exact = if rest.is_square() {
            rest.clone().try_inverse().map(|inverse| inverse * &rhs)
        } else {
            None
        };
        let solution = match exact {
            Some(solution) => solution,
            None => {
                let pseudo = rest.pseudo_inverse(PINV_EPS).map_err(|e| {
                    ReactionError::ReactionNotBalanced(format!("least squares failed: {}", e))
                })?;
                pseudo * &rhs
            }
        };
        let mut coefficients: Vec<f64> = solution
            .iter()
            .map(|c| round_to(*c, self.config.rounding_precision))
            .collect();
        coefficients.insert(target, fixed);
        Self::check_positive(&coefficients)?;
        if !Self::is_reaction_balanced(&self.reaction_matrix, &coefficients, self.config.tolerance) {
            return Err(ReactionError::ReactionNotBalanced(format!(
                "no balanced solution with the target coefficient fixed to {}",
                fixed
            )));
        }
        Ok(BalanceResult {
            coefficients,
            algorithm: "force".to_string(),
        })
    }

    /// Post-processing shared by all algorithms
    pub fn finalize(&self, name: &'static str, raw: &DVector<f64>) -> Result<Vec<f64>, AlgorithmFailure> {
        let bad = |reason: String| AlgorithmFailure::new(name, FailureKind::BadCoefficients, reason);
        if raw.len() != self.reaction_matrix.ncols() {
            return Err(bad(format!("{} coefficients returned", raw.len())));
        }
        if raw.iter().any(|c| !c.is_finite()) {
            return Err(bad("non-finite coefficient".to_string()));
        }
        let mut coefficients: Vec<f64> = raw.iter().copied().collect();
        if coefficients.iter().sum::<f64>() < 0.0 {
            coefficients.iter_mut().for_each(|c| *c = -*c);
        }
        let largest = coefficients.iter().fold(0.0f64, |acc, c| acc.max(c.abs()));
        if coefficients
            .iter()
            .any(|c| *c <= self.config.tolerance * largest)
        {
            return Err(bad(format!("non-positive coefficient in {:?}", coefficients)));
        }
        let smallest = coefficients.iter().fold(f64::INFINITY, |acc, c| acc.min(*c));
        let mut coefficients: Vec<f64> = coefficients
            .iter()
            .map(|c| round_to(c / smallest, self.config.rounding_precision))
            .collect();
        if self.config.intify {
            coefficients = intify(&coefficients, self.config.max_denominator)
                .ok_or_else(|| bad(format!("cannot convert {:?} to integers", coefficients)))?;
        }
        if let Some(big) = coefficients.iter().find(|c| **c > self.config.coef_limit) {
            return Err(bad(format!(
                "coefficient {} exceeds the limit {}",
                big, self.config.coef_limit
            )));
        }
        if !Self::is_reaction_balanced(&self.reaction_matrix, &coefficients, self.config.tolerance) {
            return Err(AlgorithmFailure::new(
                name,
                FailureKind::NotBalanced,
                format!("{:?} does not conserve every element", coefficients),
            ));
        }
        Ok(coefficients)
    }

    /// Element conservation: for every row, reactant side equals product side within a
    /// relative tolerance
    pub fn is_reaction_balanced(
        reaction_matrix: &ReactionMatrix,
        coefficients: &[f64],
        tolerance: f64,
    ) -> bool {
        let n = reaction_matrix.ncols();
        if coefficients.len() != n {
            return false;
        }
        let sep = reaction_matrix.separator_pos;
        let m = &reaction_matrix.matrix;
        (0..m.nrows()).all(|i| {
            let left: f64 = (0..sep).map(|j| m[(i, j)] * coefficients[j]).sum();
            let right: f64 = (sep..n).map(|j| m[(i, j)] * coefficients[j]).sum();
            (left - right).abs() <= tolerance * left.abs().max(right.abs()).max(1.0)
        })
    }
}

/// Smallest integer vector proportional to `values`: every value is approximated by a
/// fraction with bounded denominator, the vector is scaled by the lcm of denominators
/// and divided by the gcd of the results
pub fn intify(values: &[f64], max_denominator: i64) -> Option<Vec<f64>> {
    let fractions = values
        .iter()
        .map(|v| limit_denominator(*v, max_denominator))
        .collect::<Option<Vec<_>>>()?;
    let denominators: Vec<i64> = fractions.iter().map(|f| *f.denom()).collect();
    let lcm = lcm_of(&denominators);
    let integers = fractions
        .iter()
        .map(|f| f.numer().checked_mul(lcm / f.denom()))
        .collect::<Option<Vec<i64>>>()?;
    let gcd = gcd_of(&integers);
    if gcd == 0 {
        return None;
    }
    Some(integers.iter().map(|i| (i / gcd) as f64).collect())
}
