//! Balancing algorithms. Each one takes the reaction matrix and returns a raw
//! (unnormalised, possibly fractional) coefficient vector; normalisation, conversion to
//! integers and the final conservation check are done by the balancer.
//!
//! - inv: matrix inverse of the row-reduced matrix augmented with a unit row (Thorne)
//! - gpinv: general solution `(I - A⁺A)·1` of `[R | -P]·x = 0` via the Moore-Penrose pseudoinverse
//! - ppinv: partial pseudoinverse solution, reactant and product blocks solved separately (Risteski)
//! - comb: exhaustive integer search in shells of growing maximal coefficient
use crate::Stoichiometry::reaction_matrix::ReactionMatrix;
use crate::Stoichiometry::stoich_errors::ReactionError;
use crate::settings::{Algorithm, BalancerConfig};
use enum_dispatch::enum_dispatch;
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use std::fmt;

/// singular values below this are treated as zero
pub const PINV_EPS: f64 = 1e-10;
pub const RANK_EPS: f64 = 1e-9;
/// the combinatorial search refuses reactions with more compounds
pub const MAX_COMB_COMPOUNDS: usize = 10;
/// hard cap on a single coefficient in the combinatorial search
pub const MAX_COMB_COEFFICIENT: usize = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// the algorithm cannot handle this matrix shape or size
    NotApplicable,
    Singular,
    /// the solution vector is (numerically) zero
    Degenerate,
    BadCoefficients,
    NotBalanced,
}

/// Why a single algorithm gave up; the auto ladder collects these
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmFailure {
    pub algorithm: &'static str,
    pub kind: FailureKind,
    pub reason: String,
}

impl AlgorithmFailure {
    pub fn new(algorithm: &'static str, kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            algorithm,
            kind,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for AlgorithmFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.algorithm, self.reason)
    }
}

impl From<AlgorithmFailure> for ReactionError {
    fn from(failure: AlgorithmFailure) -> Self {
        match failure.kind {
            FailureKind::BadCoefficients => ReactionError::BadCoefficients(failure.to_string()),
            _ => ReactionError::ReactionNotBalanced(failure.to_string()),
        }
    }
}

pub type AlgorithmResult = Result<DVector<f64>, AlgorithmFailure>;

#[enum_dispatch]
pub trait BalancingAlgorithm {
    fn name(&self) -> &'static str;
    /// raw coefficient vector, one entry per compound
    fn solve(&self, reaction_matrix: &ReactionMatrix, config: &BalancerConfig) -> AlgorithmResult;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InverseAlgorithm;
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneralPseudoInverse;
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialPseudoInverse;
#[derive(Debug, Clone, Copy, Default)]
pub struct Combinatorial;

#[enum_dispatch(BalancingAlgorithm)]
#[derive(Debug, Clone, Copy)]
pub enum AlgorithmEnum {
    Inv(InverseAlgorithm),
    Gpinv(GeneralPseudoInverse),
    Ppinv(PartialPseudoInverse),
    Comb(Combinatorial),
}

/// Concrete algorithm for a config value; `Auto` has no single algorithm
pub fn create_algorithm(algorithm: Algorithm) -> Option<AlgorithmEnum> {
    match algorithm {
        Algorithm::Auto => None,
        Algorithm::Inv => Some(InverseAlgorithm.into()),
        Algorithm::Gpinv => Some(GeneralPseudoInverse.into()),
        Algorithm::Ppinv => Some(PartialPseudoInverse.into()),
        Algorithm::Comb => Some(Combinatorial.into()),
    }
}

/// Order in which the auto mode tries the algorithms
pub fn algorithm_ladder() -> Vec<AlgorithmEnum> {
    vec![
        InverseAlgorithm.into(),
        GeneralPseudoInverse.into(),
        PartialPseudoInverse.into(),
        Combinatorial.into(),
    ]
}

fn matrix_rank(matrix: &DMatrix<f64>) -> usize {
    if matrix.nrows() == 0 || matrix.ncols() == 0 {
        return 0;
    }
    matrix.clone().svd(false, false).rank(RANK_EPS)
}

/// Indices of a maximal set of linearly independent rows, picked greedily in row order
pub fn independent_rows(matrix: &DMatrix<f64>) -> Vec<usize> {
    let mut selected: Vec<usize> = Vec::new();
    for i in 0..matrix.nrows() {
        let mut candidate = selected.clone();
        candidate.push(i);
        if matrix_rank(&matrix.select_rows(candidate.iter())) == candidate.len() {
            selected = candidate;
        }
    }
    selected
}

fn pinv(
    name: &'static str,
    matrix: &DMatrix<f64>,
) -> Result<DMatrix<f64>, AlgorithmFailure> {
    matrix
        .clone()
        .pseudo_inverse(PINV_EPS)
        .map_err(|e| AlgorithmFailure::new(name, FailureKind::Singular, e))
}

fn non_degenerate(name: &'static str, coefs: DVector<f64>) -> AlgorithmResult {
    if coefs.iter().any(|c| !c.is_finite()) {
        return Err(AlgorithmFailure::new(
            name,
            FailureKind::BadCoefficients,
            "non-finite coefficient",
        ));
    }
    if coefs.amax() < RANK_EPS {
        return Err(AlgorithmFailure::new(
            name,
            FailureKind::Degenerate,
            "solution is the zero vector",
        ));
    }
    Ok(coefs)
}

impl BalancingAlgorithm for InverseAlgorithm {
    fn name(&self) -> &'static str {
        "inv"
    }

    /// Works when the null space of `[R | -P]` is one-dimensional: the independent rows
    /// plus the unit row `e_n` form an invertible square matrix, and the last column of
    /// its inverse is the solution with the last coefficient equal to 1.
    fn solve(&self, reaction_matrix: &ReactionMatrix, _config: &BalancerConfig) -> AlgorithmResult {
        let signed = reaction_matrix.signed();
        let n = signed.ncols();
        let rows = independent_rows(&signed);
        if rows.len() + 1 != n {
            return Err(AlgorithmFailure::new(
                self.name(),
                FailureKind::NotApplicable,
                format!(
                    "null space dimension is {}, inverse method needs exactly 1",
                    n - rows.len()
                ),
            ));
        }
        let mut augmented = DMatrix::zeros(n, n);
        for (i, &row) in rows.iter().enumerate() {
            for j in 0..n {
                augmented[(i, j)] = signed[(row, j)];
            }
        }
        augmented[(n - 1, n - 1)] = 1.0;
        let inverse = augmented.try_inverse().ok_or_else(|| {
            AlgorithmFailure::new(self.name(), FailureKind::Singular, "augmented matrix is singular")
        })?;
        let coefs = inverse.column(n - 1).into_owned();
        debug!("inv raw coefficients {:?}", coefs.as_slice());
        non_degenerate(self.name(), coefs)
    }
}

impl BalancingAlgorithm for GeneralPseudoInverse {
    fn name(&self) -> &'static str {
        "gpinv"
    }

    fn solve(&self, reaction_matrix: &ReactionMatrix, _config: &BalancerConfig) -> AlgorithmResult {
        let signed = reaction_matrix.signed();
        let n = signed.ncols();
        let pseudo = pinv(self.name(), &signed)?;
        let projector = DMatrix::<f64>::identity(n, n) - &pseudo * &signed;
        let coefs = projector * DVector::from_element(n, 1.0);
        debug!("gpinv raw coefficients {:?}", coefs.as_slice());
        non_degenerate(self.name(), coefs)
    }
}

impl BalancingAlgorithm for PartialPseudoInverse {
    fn name(&self) -> &'static str {
        "ppinv"
    }

    /// Solves `R·x = P·y`: first `y` from the product block projected off the reactant
    /// column space, then `x = R⁺·P·y` plus the first null-space direction of `R`.
    fn solve(&self, reaction_matrix: &ReactionMatrix, _config: &BalancerConfig) -> AlgorithmResult {
        let reactants = reaction_matrix.reactant_matrix();
        let products = reaction_matrix.product_matrix();
        let m = reactants.nrows();
        let r = reactants.ncols();
        let p = products.ncols();
        let reactants_pinv = pinv(self.name(), &reactants)?;
        let g = (DMatrix::<f64>::identity(m, m) - &reactants * &reactants_pinv) * &products;
        let g_pinv = pinv(self.name(), &g)?;
        let y = (DMatrix::<f64>::identity(p, p) - &g_pinv * &g) * DVector::from_element(p, 1.0);
        let reactant_null = DMatrix::<f64>::identity(r, r) - &reactants_pinv * &reactants;
        let x = &reactants_pinv * &products * &y + reactant_null.column(0);
        let coefs = DVector::from_iterator(r + p, x.iter().chain(y.iter()).copied());
        debug!("ppinv raw coefficients {:?}", coefs.as_slice());
        non_degenerate(self.name(), coefs)
    }
}

fn is_null_vector(signed: &DMatrix<f64>, coefs: &[f64], tolerance: f64) -> bool {
    (0..signed.nrows()).all(|i| {
        let mut sum = 0.0;
        let mut scale = 1.0;
        for (j, c) in coefs.iter().enumerate() {
            sum += signed[(i, j)] * c;
            scale += (signed[(i, j)] * c).abs();
        }
        sum.abs() <= tolerance * scale
    })
}

/// Number of vectors with entries in `1..=k` and at least one entry equal to `k`
fn shell_size(k: usize, n: usize) -> Option<usize> {
    Some(k.checked_pow(n as u32)? - (k - 1).pow(n as u32))
}

/// Writes the `index`-th member of shell `k` into `out[..n]`. Members are grouped by the
/// position `p` of the first entry equal to `k`: entries before `p` run over `1..k`,
/// entries after it over `1..=k`, each group in lexicographic order.
fn decode_shell_member(index: usize, k: usize, n: usize, out: &mut [f64]) {
    let mut rest = index;
    for p in 0..n {
        let tail = k.pow((n - 1 - p) as u32);
        let group = (k - 1).pow(p as u32) * tail;
        if rest < group {
            let mut head = rest / tail;
            let mut low = rest % tail;
            for j in (p + 1..n).rev() {
                out[j] = (low % k + 1) as f64;
                low /= k;
            }
            out[p] = k as f64;
            for j in (0..p).rev() {
                out[j] = (head % (k - 1) + 1) as f64;
                head /= k - 1;
            }
            return;
        }
        rest -= group;
    }
}

/// Walks shells `1..=max_coefficient` and tests at most `budget` candidates in total.
/// Returns the first null vector found and the number of candidates tested.
fn shell_search(
    signed: &DMatrix<f64>,
    max_coefficient: usize,
    budget: usize,
    tolerance: f64,
) -> (Option<DVector<f64>>, usize) {
    let n = signed.ncols();
    let mut tested = 0usize;
    for k in 1..=max_coefficient {
        let Some(size) = shell_size(k, n) else {
            break;
        };
        let take = size.min(budget - tested);
        if take == 0 {
            break;
        }
        let found = (0..take).into_par_iter().find_first(|&index| {
            let mut candidate = [0.0f64; MAX_COMB_COMPOUNDS];
            decode_shell_member(index, k, n, &mut candidate);
            is_null_vector(signed, &candidate[..n], tolerance)
        });
        if let Some(index) = found {
            let mut candidate = [0.0f64; MAX_COMB_COMPOUNDS];
            decode_shell_member(index, k, n, &mut candidate);
            return (
                Some(DVector::from_column_slice(&candidate[..n])),
                tested + index + 1,
            );
        }
        tested += take;
        if take < size {
            debug!("comb: iteration budget {} spent inside shell {}", budget, k);
            break;
        }
    }
    (None, tested)
}

impl BalancingAlgorithm for Combinatorial {
    fn name(&self) -> &'static str {
        "comb"
    }

    /// Tries integer vectors shell by shell: shell `k` holds every vector with entries in
    /// `1..=k` and at least one entry equal to `k`. The first hit has the smallest possible
    /// largest coefficient. Candidates within a shell are tested in parallel and
    /// `find_first` keeps the result independent of thread scheduling. No more than
    /// `max_number_of_iterations` candidates are tested in total.
    fn solve(&self, reaction_matrix: &ReactionMatrix, config: &BalancerConfig) -> AlgorithmResult {
        let signed = reaction_matrix.signed();
        let n = signed.ncols();
        if n > MAX_COMB_COMPOUNDS {
            return Err(AlgorithmFailure::new(
                self.name(),
                FailureKind::NotApplicable,
                format!(
                    "{} compounds, combinatorial search is limited to {}",
                    n, MAX_COMB_COMPOUNDS
                ),
            ));
        }
        // float to usize casts saturate
        let budget = config.max_number_of_iterations as usize;
        let within_budget = |k: usize| k.checked_pow(n as u32).is_some_and(|t| t <= budget);
        let mut per_coefficient = config.max_number_of_iterations.powf(1.0 / n as f64) as usize;
        while within_budget(per_coefficient + 1) {
            per_coefficient += 1;
        }
        while per_coefficient > 0 && !within_budget(per_coefficient) {
            per_coefficient -= 1;
        }
        let max_coefficient = per_coefficient
            .min(MAX_COMB_COEFFICIENT as usize)
            .min(config.max_comb as usize);
        if max_coefficient < 1 {
            return Err(AlgorithmFailure::new(
                self.name(),
                FailureKind::NotApplicable,
                "iteration budget allows no candidates",
            ));
        }
        info!(
            "comb: searching {} compounds with coefficients up to {}",
            n, max_coefficient
        );
        let (found, tested) = shell_search(&signed, max_coefficient, budget, config.tolerance);
        match found {
            Some(coefs) => {
                debug!("comb: solution after {} candidates", tested);
                Ok(coefs)
            }
            None => Err(AlgorithmFailure::new(
                self.name(),
                FailureKind::NotBalanced,
                format!(
                    "no solution among {} candidates with coefficients up to {}",
                    tested, max_coefficient
                ),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stoichiometry::formula_parser::parse_formula;
    use approx::assert_relative_eq;

    fn matrix(reactants: &[&str], products: &[&str]) -> ReactionMatrix {
        let parse = |list: &[&str]| {
            list.iter()
                .map(|f| parse_formula(f).unwrap())
                .collect::<Vec<_>>()
        };
        ReactionMatrix::new(&parse(reactants), &parse(products)).unwrap()
    }

    fn assert_proportional(actual: &DVector<f64>, expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        let ratio = actual[0] / expected[0];
        for (a, e) in actual.iter().zip(expected) {
            assert_relative_eq!(*a, e * ratio, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_factory_and_ladder() {
        assert!(create_algorithm(Algorithm::Auto).is_none());
        assert_eq!(create_algorithm(Algorithm::Comb).unwrap().name(), "comb");
        let names: Vec<&str> = algorithm_ladder().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["inv", "gpinv", "ppinv", "comb"]);
    }

    #[test]
    fn test_independent_rows() {
        let m = DMatrix::from_row_slice(3, 3, &[1.0, 0.0, 1.0, 2.0, 0.0, 2.0, 0.0, 1.0, 1.0]);
        assert_eq!(independent_rows(&m), vec![0, 2]);
    }

    #[test]
    fn test_inv() {
        let rm = matrix(&["Fe", "O2"], &["Fe2O3"]);
        let coefs = InverseAlgorithm.solve(&rm, &BalancerConfig::default()).unwrap();
        assert_relative_eq!(coefs[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(coefs[1], 1.5, epsilon = 1e-9);
        assert_relative_eq!(coefs[2], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_inv_rejects_two_dimensional_null_space() {
        let rm = matrix(&["H2", "O2"], &["H2O", "H2O2"]);
        let failure = InverseAlgorithm
            .solve(&rm, &BalancerConfig::default())
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::NotApplicable);
    }

    #[test]
    fn test_gpinv() {
        let rm = matrix(&["H2", "O2"], &["H2O"]);
        let coefs = GeneralPseudoInverse
            .solve(&rm, &BalancerConfig::default())
            .unwrap();
        assert_proportional(&coefs, &[2.0, 1.0, 2.0]);
    }

    #[test]
    fn test_ppinv() {
        let rm = matrix(&["H2", "O2"], &["H2O"]);
        let coefs = PartialPseudoInverse
            .solve(&rm, &BalancerConfig::default())
            .unwrap();
        assert_proportional(&coefs, &[2.0, 1.0, 2.0]);

        let rm = matrix(&["KMnO4", "HCl"], &["KCl", "MnCl2", "H2O", "Cl2"]);
        let coefs = PartialPseudoInverse
            .solve(&rm, &BalancerConfig::default())
            .unwrap();
        assert_proportional(&coefs, &[2.0, 16.0, 2.0, 2.0, 8.0, 5.0]);
    }

    #[test]
    fn test_comb() {
        let rm = matrix(&["H2", "O2"], &["H2O"]);
        let coefs = Combinatorial.solve(&rm, &BalancerConfig::default()).unwrap();
        assert_eq!(coefs.as_slice(), &[2.0, 1.0, 2.0]);

        let rm = matrix(&["Fe", "O2"], &["Fe2O3"]);
        let coefs = Combinatorial.solve(&rm, &BalancerConfig::default()).unwrap();
        assert_eq!(coefs.as_slice(), &[4.0, 3.0, 2.0]);
    }

    #[test]
    fn test_comb_limits() {
        let rm = matrix(&["Fe", "O2"], &["Fe2O3"]);
        let config = BalancerConfig {
            max_comb: 3.0,
            ..BalancerConfig::default()
        };
        let failure = Combinatorial.solve(&rm, &config).unwrap_err();
        assert_eq!(failure.kind, FailureKind::NotBalanced);

        let rm = matrix(
            &["C", "H2", "O2", "N2", "S", "Cl2"],
            &["CO2", "H2O", "NO2", "SO2", "HCl"],
        );
        let failure = Combinatorial
            .solve(&rm, &BalancerConfig::default())
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::NotApplicable);
    }

    #[test]
    fn test_shell_members_are_distinct_and_complete() {
        for (k, n) in [(1, 3), (2, 3), (3, 2), (4, 3)] {
            let size = shell_size(k, n).unwrap();
            let mut seen = std::collections::HashSet::new();
            for index in 0..size {
                let mut out = [0.0f64; MAX_COMB_COMPOUNDS];
                decode_shell_member(index, k, n, &mut out);
                let member: Vec<usize> = out[..n].iter().map(|c| *c as usize).collect();
                assert!(member.iter().all(|c| (1..=k).contains(c)));
                assert!(member.contains(&k));
                seen.insert(member);
            }
            assert_eq!(seen.len(), size);
        }
        assert_eq!(shell_size(3, 2), Some(5));
        assert_eq!(shell_size(127, 10), None);
    }

    #[test]
    fn test_comb_respects_iteration_budget() {
        // Na: a = c, Cl: a = 2d, H: 2b = c + d, O: b = c; only the zero vector fits
        let rm = matrix(&["NaCl", "H2O"], &["NaOH", "HCl2"]);
        let (found, tested) = shell_search(&rm.signed(), 127, 10_000, 1e-8);
        assert!(found.is_none());
        assert_eq!(tested, 10_000);

        let config = BalancerConfig {
            max_number_of_iterations: 1e4,
            ..BalancerConfig::default()
        };
        let failure = Combinatorial.solve(&rm, &config).unwrap_err();
        assert_eq!(failure.kind, FailureKind::NotBalanced);
        assert!(failure.reason.contains("among 10000 candidates"));

        // a solution inside the budget is still found
        let rm = matrix(&["KI", "H2SO4"], &["I2", "H2S", "K2SO4", "H2O"]);
        let (found, tested) = shell_search(&rm.signed(), 127, 1_000_000_000, 1e-8);
        assert_eq!(found.unwrap().as_slice(), &[8.0, 5.0, 4.0, 1.0, 4.0, 4.0]);
        assert!(tested <= 8usize.pow(6));
    }

    #[test]
    fn test_failure_conversion() {
        let failure = AlgorithmFailure::new("inv", FailureKind::BadCoefficients, "negative");
        assert!(matches!(
            ReactionError::from(failure),
            ReactionError::BadCoefficients(_)
        ));
        let failure = AlgorithmFailure::new("comb", FailureKind::NotBalanced, "nothing found");
        assert!(matches!(
            ReactionError::from(failure),
            ReactionError::ReactionNotBalanced(_)
        ));
    }
}
