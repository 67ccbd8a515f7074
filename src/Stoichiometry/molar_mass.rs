use crate::Stoichiometry::formula_parser::{ParsedFormula, PercentMap, parse_formula_with_table};
use crate::Stoichiometry::periodic_table::{ElementData, PeriodicTable};
use crate::Stoichiometry::stoich_errors::FormulaError;
use log::warn;
use std::collections::HashMap;
/// Molar mass and composition of a parsed formula
///
/// All values are computed on demand from the parsed formula and the element table,
/// nothing is rounded here.
pub struct MolarMassCalculation<'a> {
    parsed_formula: &'a ParsedFormula,
    table: &'a dyn ElementData,
}

impl<'a> MolarMassCalculation<'a> {
    pub fn new(parsed_formula: &'a ParsedFormula) -> Self {
        Self {
            parsed_formula,
            table: &PeriodicTable,
        }
    }

    pub fn with_table(parsed_formula: &'a ParsedFormula, table: &'a dyn ElementData) -> Self {
        Self {
            parsed_formula,
            table,
        }
    }

    fn atomic_weight(&self, symbol: &str) -> Result<f64, FormulaError> {
        self.table
            .weight(symbol)
            .ok_or_else(|| FormulaError::NoSuchAtom(symbol.to_string()))
    }

    /// weight * amount for every element, in formula order
    fn element_masses(&self) -> Result<Vec<(&str, f64)>, FormulaError> {
        self.parsed_formula
            .iter()
            .map(|(symbol, amount)| Ok((symbol, self.atomic_weight(symbol)? * amount)))
            .collect()
    }

    /// Sum of atomic weight times amount over all elements, g/mol
    pub fn molar_mass(&self) -> Result<f64, FormulaError> {
        Ok(self.element_masses()?.iter().map(|(_, m)| m).sum())
    }

    /// Mass fraction of every element in percent; sums to 100
    pub fn mass_percent(&self) -> Result<PercentMap, FormulaError> {
        let masses = self.element_masses()?;
        let total: f64 = masses.iter().map(|(_, m)| m).sum();
        self.check_total(total)?;
        Ok(masses
            .into_iter()
            .map(|(symbol, m)| (symbol.to_string(), m / total * 100.0))
            .collect())
    }

    /// Fraction of every element among all atoms in percent; sums to 100
    pub fn atomic_percent(&self) -> Result<PercentMap, FormulaError> {
        let total = self.parsed_formula.total();
        self.check_total(total)?;
        Ok(self
            .parsed_formula
            .iter()
            .map(|(symbol, amount)| (symbol.to_string(), amount / total * 100.0))
            .collect())
    }

    fn check_total(&self, total: f64) -> Result<(), FormulaError> {
        if !total.is_finite() || total <= 0.0 {
            return Err(FormulaError::BadNumber(format!(
                "{} (percentages need a positive total, got {})",
                self.parsed_formula.to_formula_string(),
                total
            )));
        }
        Ok(())
    }

    /// Composition expressed as oxides in percent, oxygen excluded.
    ///
    /// Every element except O is converted to its oxide (taken from `oxides` when given,
    /// the element's default oxide otherwise): the element mass percent is multiplied by
    /// M(oxide) / (M(element) * n), n being the element count in the oxide. The result is
    /// renormalised to 100. A formula consisting of oxygen only gives an empty map.
    pub fn oxide_percent(
        &self,
        oxides: Option<&HashMap<String, String>>,
    ) -> Result<PercentMap, FormulaError> {
        let mass_percent = self.mass_percent()?;
        let mut oxide_percent = PercentMap::new();
        for (symbol, percent) in mass_percent.iter().filter(|(s, _)| *s != "O") {
            let oxide = match oxides.and_then(|o| o.get(symbol)) {
                Some(custom) => custom.clone(),
                None => self
                    .table
                    .default_oxide(symbol)
                    .ok_or_else(|| FormulaError::NoSuchAtom(symbol.to_string()))?
                    .to_string(),
            };
            let parsed_oxide = parse_formula_with_table(&oxide, self.table)?;
            let count = parsed_oxide.get(symbol).ok_or_else(|| FormulaError::BadOxide {
                element: symbol.to_string(),
                oxide: oxide.clone(),
            })?;
            let oxide_mass = MolarMassCalculation::with_table(&parsed_oxide, self.table).molar_mass()?;
            let factor = oxide_mass / self.atomic_weight(symbol)? / count;
            oxide_percent.add(&oxide, percent * factor);
        }
        if oxide_percent.is_empty() {
            warn!("formula contains no elements besides oxygen, oxide percent is empty");
            return Ok(oxide_percent);
        }
        let total = oxide_percent.total();
        oxide_percent.scale(100.0 / total);
        Ok(oxide_percent)
    }
}

/// Molar mass of a formula string using the built-in table
pub fn calculate_molar_mass(formula: &str) -> Result<f64, FormulaError> {
    let parsed = parse_formula_with_table(formula, &PeriodicTable)?;
    MolarMassCalculation::new(&parsed).molar_mass()
}

/// Molar masses of several formulas, in the same order
pub fn calculate_molar_mass_of_vector_of_subs(formulas: &[&str]) -> Result<Vec<f64>, FormulaError> {
    formulas.iter().map(|f| calculate_molar_mass(f)).collect()
}
