use crate::Stoichiometry::balancer::Balancer;
use crate::Stoichiometry::chem_output::{OutputResults, ReactionOutput};
use crate::Stoichiometry::formula_parser::{ParsedFormula, parse_formula_with_table};
use crate::Stoichiometry::molar_mass::MolarMassCalculation;
use crate::Stoichiometry::periodic_table::PeriodicTable;
use crate::Stoichiometry::reaction_decomposer::ReactionDecomposer;
use crate::Stoichiometry::reaction_matrix::{ReactionMatrix, RowOrder};
use crate::Stoichiometry::stoich_errors::ReactionError;
use crate::Utils::rational::{format_number, round_to};
use crate::settings::BalancerConfig;
use log::info;

/// A chemical reaction: decomposition, parsed formulas and reaction matrix are built
/// on construction; balancing happens in [`ChemicalReaction::balance`].
///
/// `target` selects the compound masses are computed for: 0 is the first product,
/// -1 the last reactant, so valid values run from `-reactants.len()` to
/// `products.len() - 1`. `target_mass` is the mass (g) of that compound.
/// # Examples
/// ```
/// use StoichCalc::Stoichiometry::chemical_reaction::ChemicalReaction;
/// let reaction = ChemicalReaction::new("H2+O2=H2O").unwrap();
/// let balanced = reaction.balance().unwrap();
/// assert_eq!(balanced.final_reaction(), "2H2+O2=2H2O");
/// ```
#[derive(Debug, Clone)]
pub struct ChemicalReaction {
    pub reaction: String,
    pub target: isize,
    pub target_mass: f64,
    pub precision: u32,
    pub config: BalancerConfig,
    decomposed: ReactionDecomposer,
    parsed_formulas: Vec<ParsedFormula>,
    matrix: ReactionMatrix,
}

impl ChemicalReaction {
    pub fn new(reaction: &str) -> Result<Self, ReactionError> {
        Self::with_config(reaction, BalancerConfig::default())
    }

    pub fn with_config(reaction: &str, config: BalancerConfig) -> Result<Self, ReactionError> {
        config.validate()?;
        let decomposed = ReactionDecomposer::new(reaction)?;
        let parsed_formulas = decomposed
            .compounds()
            .iter()
            .map(|f| parse_formula_with_table(f, &PeriodicTable))
            .collect::<Result<Vec<_>, _>>()?;
        let (reactants, products) = parsed_formulas.split_at(decomposed.reactants.len());
        let matrix = ReactionMatrix::new(reactants, products)?;
        Ok(Self {
            reaction: reaction.to_string(),
            target: 0,
            target_mass: 1.0,
            precision: 8,
            config,
            decomposed,
            parsed_formulas,
            matrix,
        })
    }

    pub fn with_target(mut self, target: isize) -> Result<Self, ReactionError> {
        self.target = target;
        self.calculated_target()?;
        Ok(self)
    }

    pub fn with_target_mass(mut self, target_mass: f64) -> Result<Self, ReactionError> {
        if !target_mass.is_finite() || target_mass <= 0.0 {
            return Err(ReactionError::BadTarget(format!(
                "target mass must be positive, got {}",
                target_mass
            )));
        }
        self.target_mass = target_mass;
        Ok(self)
    }

    pub fn with_precision(mut self, precision: u32) -> Result<Self, ReactionError> {
        if precision == 0 {
            return Err(ReactionError::BadConfig(
                "precision must be a positive integer".to_string(),
            ));
        }
        self.precision = precision;
        Ok(self)
    }

    /// Rebuilds the reaction matrix with another row order
    pub fn with_row_order(mut self, order: RowOrder) -> Result<Self, ReactionError> {
        let (reactants, products) = self.parsed_formulas.split_at(self.decomposed.reactants.len());
        self.matrix = ReactionMatrix::with_row_order(reactants, products, order, &PeriodicTable)?;
        Ok(self)
    }

    pub fn reactants(&self) -> &[String] {
        &self.decomposed.reactants
    }

    pub fn products(&self) -> &[String] {
        &self.decomposed.products
    }

    pub fn separator(&self) -> &str {
        &self.decomposed.separator
    }

    pub fn compounds(&self) -> Vec<String> {
        self.decomposed.compounds()
    }

    pub fn initial_coefficients(&self) -> &[f64] {
        &self.decomposed.initial_coefficients
    }

    pub fn parsed_formulas(&self) -> &[ParsedFormula] {
        &self.parsed_formulas
    }

    pub fn matrix(&self) -> &ReactionMatrix {
        &self.matrix
    }

    /// Column index of the target compound
    pub fn calculated_target(&self) -> Result<usize, ReactionError> {
        let n_reactants = self.decomposed.reactants.len() as isize;
        let n_products = self.decomposed.products.len() as isize;
        if self.target < -n_reactants || self.target >= n_products {
            return Err(ReactionError::BadTarget(format!(
                "target {} is outside [{}, {}]",
                self.target,
                -n_reactants,
                n_products - 1
            )));
        }
        Ok((n_reactants + self.target) as usize)
    }

    fn raw_molar_masses(&self) -> Result<Vec<f64>, ReactionError> {
        Ok(self
            .parsed_formulas
            .iter()
            .map(|p| MolarMassCalculation::new(p).molar_mass())
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub fn molar_masses(&self) -> Result<Vec<f64>, ReactionError> {
        Ok(self
            .raw_molar_masses()?
            .iter()
            .map(|m| round_to(*m, self.precision))
            .collect())
    }

    /// Balances according to the configured mode and algorithm
    pub fn balance(&self) -> Result<BalancedReaction<'_>, ReactionError> {
        let target = self.calculated_target()?;
        let balancer = Balancer::new(self.matrix.clone(), self.config.clone())?;
        let result = balancer.balance(self.initial_coefficients(), target)?;
        info!(
            "{} balanced in {} mode by {}: {:?}",
            self.reaction, self.config.mode, result.algorithm, result.coefficients
        );
        Ok(BalancedReaction {
            reaction: self,
            coefficients: result.coefficients,
            algorithm: result.algorithm,
        })
    }
}

/// A reaction together with the coefficients found for it
#[derive(Debug, Clone)]
pub struct BalancedReaction<'a> {
    reaction: &'a ChemicalReaction,
    pub coefficients: Vec<f64>,
    pub algorithm: String,
}

impl<'a> BalancedReaction<'a> {
    pub fn reaction(&self) -> &ChemicalReaction {
        self.reaction
    }

    fn raw_normalized(&self) -> Result<Vec<f64>, ReactionError> {
        let target = self.reaction.calculated_target()?;
        let base = self.coefficients[target];
        Ok(self.coefficients.iter().map(|c| c / base).collect())
    }

    /// Coefficients divided by the target's coefficient
    pub fn normalized_coefficients(&self) -> Result<Vec<f64>, ReactionError> {
        Ok(self
            .raw_normalized()?
            .iter()
            .map(|c| round_to(*c, self.reaction.precision))
            .collect())
    }

    pub fn is_balanced(&self) -> bool {
        Balancer::is_reaction_balanced(
            &self.reaction.matrix,
            &self.coefficients,
            self.reaction.config.tolerance,
        )
    }

    fn format_side(&self, compounds: &[String], coefficients: &[f64]) -> String {
        compounds
            .iter()
            .zip(coefficients)
            .map(|(compound, c)| {
                if (c - 1.0).abs() < 1e-12 {
                    compound.clone()
                } else {
                    format!("{}{}", format_number(*c), compound)
                }
            })
            .collect::<Vec<_>>()
            .join("+")
    }

    fn format_reaction(&self, coefficients: &[f64]) -> String {
        let sep = self.reaction.reactants().len();
        format!(
            "{}{}{}",
            self.format_side(self.reaction.reactants(), &coefficients[..sep]),
            self.reaction.separator(),
            self.format_side(self.reaction.products(), &coefficients[sep..])
        )
    }

    /// Reaction string with the found coefficients, e.g. `8KI+5H2SO4=4I2+H2S+4K2SO4+4H2O`
    pub fn final_reaction(&self) -> String {
        self.format_reaction(&self.coefficients)
    }

    pub fn final_reaction_normalized(&self) -> Result<String, ReactionError> {
        Ok(self.format_reaction(&self.normalized_coefficients()?))
    }

    /// Masses (g) of every compound when the target compound has `target_mass`:
    /// `m_i = M_i · (target_mass / M_target) · normalized_i`
    pub fn masses(&self) -> Result<Vec<f64>, ReactionError> {
        let target = self.reaction.calculated_target()?;
        let molar_masses = self.reaction.raw_molar_masses()?;
        let moles = self.reaction.target_mass / molar_masses[target];
        Ok(molar_masses
            .iter()
            .zip(self.raw_normalized()?)
            .map(|(m, c)| round_to(m * moles * c, self.reaction.precision))
            .collect())
    }

    pub fn output_results(&self) -> Result<ReactionOutput, ReactionError> {
        let target = self.reaction.calculated_target()?;
        Ok(ReactionOutput {
            initial_reaction: self.reaction.reaction.clone(),
            mode: self.reaction.config.mode.to_string(),
            algorithm: self.algorithm.clone(),
            separator: self.reaction.separator().to_string(),
            reactants: self.reaction.reactants().to_vec(),
            products: self.reaction.products().to_vec(),
            target: self.reaction.compounds()[target].clone(),
            target_mass: self.reaction.target_mass,
            molar_masses: self.reaction.molar_masses()?,
            coefficients: self.coefficients.clone(),
            normalized_coefficients: self.normalized_coefficients()?,
            is_balanced: self.is_balanced(),
            final_reaction: self.final_reaction(),
            final_reaction_normalized: self.final_reaction_normalized()?,
            masses: self.masses()?,
        })
    }

    pub fn print_results(&self, print_precision: u32) -> Result<(), ReactionError> {
        self.output_results()?.pretty_print(print_precision);
        Ok(())
    }

    pub fn as_json(&self, print_precision: u32) -> Result<String, ReactionError> {
        Ok(self.output_results()?.to_json(print_precision)?)
    }

    pub fn export_to_json(&self, path: &str, print_precision: u32) -> Result<(), ReactionError> {
        Ok(self.output_results()?.export_to_json(path, print_precision)?)
    }
}
