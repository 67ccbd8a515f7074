use crate::Stoichiometry::chem_output::{FormulaOutput, OutputResults};
use crate::Stoichiometry::formula_parser::{ParsedFormula, PercentMap, parse_formula_with_table};
use crate::Stoichiometry::molar_mass::MolarMassCalculation;
use crate::Stoichiometry::periodic_table::{ElementData, PeriodicTable};
use crate::Stoichiometry::stoich_errors::{FormulaError, OutputError};
use crate::Utils::rational::round_to;
use log::info;
use std::collections::HashMap;

/// A single chemical formula with all derived quantities.
///
/// The formula is parsed once on construction; masses and percents are computed on
/// request and rounded to `precision` decimals (the parsed formula to `precision + 3`,
/// so fractional counts survive).
/// # Examples
/// ```
/// use StoichCalc::Stoichiometry::chemical_formula::ChemicalFormula;
/// let formula = ChemicalFormula::new("K2SO4", 8).unwrap();
/// assert_eq!(formula.molar_mass().unwrap(), 174.252);
/// ```
pub struct ChemicalFormula {
    pub formula: String,
    pub precision: u32,
    pub oxides: Option<HashMap<String, String>>,
    parsed_formula: ParsedFormula,
    table: Box<dyn ElementData>,
}

impl ChemicalFormula {
    pub fn new(formula: &str, precision: u32) -> Result<Self, FormulaError> {
        Self::with_table(formula, precision, Box::new(PeriodicTable))
    }

    pub fn with_table(
        formula: &str,
        precision: u32,
        table: Box<dyn ElementData>,
    ) -> Result<Self, FormulaError> {
        if precision == 0 {
            return Err(FormulaError::BadPrecision(precision));
        }
        let parsed_formula = parse_formula_with_table(formula, table.as_ref())?;
        info!("parsed formula {}: {:?}", formula, parsed_formula);
        Ok(Self {
            formula: formula.to_string(),
            precision,
            oxides: None,
            parsed_formula,
            table,
        })
    }

    /// Replaces default oxides for the listed elements, e.g. `{"Fe": "FeO"}`
    pub fn with_oxides(mut self, oxides: HashMap<String, String>) -> Self {
        self.oxides = Some(oxides);
        self
    }

    fn calculation(&self) -> MolarMassCalculation<'_> {
        MolarMassCalculation::with_table(&self.parsed_formula, self.table.as_ref())
    }

    pub fn parsed_formula(&self) -> ParsedFormula {
        self.parsed_formula.rounded(self.precision + 3)
    }

    pub fn molar_mass(&self) -> Result<f64, FormulaError> {
        Ok(round_to(self.calculation().molar_mass()?, self.precision))
    }

    pub fn mass_percent(&self) -> Result<PercentMap, FormulaError> {
        Ok(self.calculation().mass_percent()?.rounded(self.precision))
    }

    pub fn atomic_percent(&self) -> Result<PercentMap, FormulaError> {
        Ok(self.calculation().atomic_percent()?.rounded(self.precision))
    }

    pub fn oxide_percent(&self) -> Result<PercentMap, FormulaError> {
        Ok(self
            .calculation()
            .oxide_percent(self.oxides.as_ref())?
            .rounded(self.precision))
    }

    pub fn output_results(&self) -> Result<FormulaOutput, FormulaError> {
        Ok(FormulaOutput {
            formula: self.formula.clone(),
            parsed_formula: self.parsed_formula(),
            molar_mass: self.molar_mass()?,
            mass_percent: self.mass_percent()?,
            atomic_percent: self.atomic_percent()?,
            oxide_percent: self.oxide_percent()?,
        })
    }

    pub fn print_results(&self, print_precision: u32) -> Result<(), FormulaError> {
        self.output_results()?.pretty_print(print_precision);
        Ok(())
    }

    pub fn as_json(&self, print_precision: u32) -> Result<String, OutputError> {
        self.output_results()?.to_json(print_precision)
    }

    pub fn export_to_json(&self, path: &str, print_precision: u32) -> Result<(), OutputError> {
        self.output_results()?.export_to_json(path, print_precision)
    }
}
