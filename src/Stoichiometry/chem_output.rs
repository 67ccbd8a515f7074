//! Result records for formulas and reactions, with JSON export and table printing.
use crate::Stoichiometry::formula_parser::{ParsedFormula, PercentMap};
use crate::Stoichiometry::stoich_errors::OutputError;
use crate::Utils::rational::{format_number, round_to};
use log::info;
use prettytable::{Table, row};
use serde::Serialize;
use std::fs;

/// Common output behaviour: every record can round itself and be written as JSON
pub trait OutputResults: Serialize + Sized {
    /// Copy of the record with every float rounded to `precision` decimals
    fn rounded(&self, precision: u32) -> Self;

    fn pretty_print(&self, precision: u32);

    fn to_json(&self, precision: u32) -> Result<String, OutputError> {
        Ok(serde_json::to_string_pretty(&self.rounded(precision))?)
    }

    fn export_to_json(&self, path: &str, precision: u32) -> Result<(), OutputError> {
        let content = self.to_json(precision)?;
        fs::write(path, content)?;
        info!("results written to {}", path);
        Ok(())
    }
}

fn round_vec(values: &[f64], precision: u32) -> Vec<f64> {
    values.iter().map(|v| round_to(*v, precision)).collect()
}

fn add_map_rows(table: &mut Table, title: &str, map: &ParsedFormula, precision: u32) {
    for (key, value) in map.iter() {
        table.add_row(row![title, key, format!("{:.*}", precision as usize, value)]);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormulaOutput {
    pub formula: String,
    pub parsed_formula: ParsedFormula,
    pub molar_mass: f64,
    pub mass_percent: PercentMap,
    pub atomic_percent: PercentMap,
    pub oxide_percent: PercentMap,
}

impl OutputResults for FormulaOutput {
    fn rounded(&self, precision: u32) -> Self {
        Self {
            formula: self.formula.clone(),
            parsed_formula: self.parsed_formula.rounded(precision),
            molar_mass: round_to(self.molar_mass, precision),
            mass_percent: self.mass_percent.rounded(precision),
            atomic_percent: self.atomic_percent.rounded(precision),
            oxide_percent: self.oxide_percent.rounded(precision),
        }
    }

    fn pretty_print(&self, precision: u32) {
        println!("\n=== FORMULA: {} ===", self.formula);
        let mut table = Table::new();
        table.add_row(row!["Property", "Key", "Value"]);
        table.add_row(row![
            "Molar mass",
            "g/mol",
            format!("{:.*}", precision as usize, self.molar_mass)
        ]);
        add_map_rows(&mut table, "Parsed formula", &self.parsed_formula, precision);
        add_map_rows(&mut table, "Mass %", &self.mass_percent, precision);
        add_map_rows(&mut table, "Atomic %", &self.atomic_percent, precision);
        add_map_rows(&mut table, "Oxide %", &self.oxide_percent, precision);
        table.printstd();
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReactionOutput {
    pub initial_reaction: String,
    pub mode: String,
    pub algorithm: String,
    pub separator: String,
    pub reactants: Vec<String>,
    pub products: Vec<String>,
    pub target: String,
    pub target_mass: f64,
    pub molar_masses: Vec<f64>,
    pub coefficients: Vec<f64>,
    pub normalized_coefficients: Vec<f64>,
    pub is_balanced: bool,
    pub final_reaction: String,
    pub final_reaction_normalized: String,
    pub masses: Vec<f64>,
}

impl OutputResults for ReactionOutput {
    fn rounded(&self, precision: u32) -> Self {
        Self {
            target_mass: round_to(self.target_mass, precision),
            molar_masses: round_vec(&self.molar_masses, precision),
            coefficients: round_vec(&self.coefficients, precision),
            normalized_coefficients: round_vec(&self.normalized_coefficients, precision),
            masses: round_vec(&self.masses, precision),
            ..self.clone()
        }
    }

    fn pretty_print(&self, precision: u32) {
        println!("\n=== REACTION: {} ===", self.initial_reaction);
        println!("Final reaction: {}", self.final_reaction);
        println!("Normalized: {}", self.final_reaction_normalized);
        println!(
            "Mode: {}, algorithm: {}, balanced: {}",
            self.mode, self.algorithm, self.is_balanced
        );
        println!("Target: {} ({} g)", self.target, format_number(self.target_mass));
        let mut table = Table::new();
        table.add_row(row![
            "Compound",
            "Molar mass, g/mol",
            "Coefficient",
            "Normalized",
            "Mass, g"
        ]);
        let compounds = self.reactants.iter().chain(self.products.iter());
        for (i, compound) in compounds.enumerate() {
            let cell = |values: &[f64]| {
                values
                    .get(i)
                    .map(|v| format!("{:.*}", precision as usize, v))
                    .unwrap_or_default()
            };
            table.add_row(row![
                compound,
                cell(&self.molar_masses),
                format_number(self.coefficients.get(i).copied().unwrap_or(0.0)),
                cell(&self.normalized_coefficients),
                cell(&self.masses)
            ]);
        }
        table.printstd();
    }
}
