use crate::Stoichiometry::formula_parser::split_leading_coefficient;
use crate::Stoichiometry::stoich_errors::{FormulaError, ReactionError};
use log::info;
use regex::Regex;
use std::sync::OnceLock;

/// Reactant/product separators, tried in this order
pub const REACTION_SEPARATORS: [&str; 8] = ["==", "=", "<->", "->", "<>", ">", "→", "⇄"];
/// Separator between compounds on one side of a reaction
pub const COMPOUND_SEPARATOR: &str = "+";

fn invalid_char_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[^A-Za-z0-9.()\[\]{}*·•=<>\-→⇄+]").expect("static regex")
    })
}

/// A reaction string split into separator, reactants, products and the coefficients
/// written in front of each compound (1 when absent).
/// # Examples
/// ```
/// use StoichCalc::Stoichiometry::reaction_decomposer::ReactionDecomposer;
/// let decomposed = ReactionDecomposer::new("2H2+O2=2H2O").unwrap();
/// assert_eq!(decomposed.reactants, vec!["H2", "O2"]);
/// assert_eq!(decomposed.initial_coefficients, vec![2.0, 1.0, 2.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionDecomposer {
    pub reaction: String,
    pub separator: String,
    pub reactants: Vec<String>,
    pub products: Vec<String>,
    pub initial_coefficients: Vec<f64>,
}

impl ReactionDecomposer {
    pub fn new(reaction: &str) -> Result<Self, ReactionError> {
        let reaction: String = reaction.chars().filter(|c| !c.is_whitespace()).collect();
        validate_reaction(&reaction)?;
        let separator = extract_separator(&reaction)
            .ok_or_else(|| ReactionError::NoSeparator(reaction.clone()))?;
        let sides: Vec<&str> = reaction.split(separator).collect();
        if sides.len() != 2 || sides.iter().any(|s| s.is_empty()) {
            return Err(ReactionError::NoSeparator(format!(
                "{} (expected exactly one '{}' with compounds on both sides)",
                reaction, separator
            )));
        }
        let (reactant_coefs, reactants) = split_side(sides[0])?;
        let (product_coefs, products) = split_side(sides[1])?;
        let initial_coefficients: Vec<f64> = reactant_coefs.into_iter().chain(product_coefs).collect();
        info!(
            "decomposed {}: reactants {:?}, products {:?}, coefficients {:?}",
            reaction, reactants, products, initial_coefficients
        );
        Ok(Self {
            reaction,
            separator: separator.to_string(),
            reactants,
            products,
            initial_coefficients,
        })
    }

    /// Reactants followed by products
    pub fn compounds(&self) -> Vec<String> {
        self.reactants.iter().chain(self.products.iter()).cloned().collect()
    }
}

fn validate_reaction(reaction: &str) -> Result<(), ReactionError> {
    if reaction.is_empty() {
        return Err(ReactionError::EmptyReaction);
    }
    let invalid: Vec<&str> = invalid_char_regex()
        .find_iter(reaction)
        .map(|m| m.as_str())
        .collect();
    if !invalid.is_empty() {
        return Err(ReactionError::InvalidCharacter(invalid.join(" ")));
    }
    Ok(())
}

/// First separator of [`REACTION_SEPARATORS`] found in the reaction
pub fn extract_separator(reaction: &str) -> Option<&'static str> {
    REACTION_SEPARATORS.iter().copied().find(|s| reaction.contains(*s))
}

fn split_side(side: &str) -> Result<(Vec<f64>, Vec<String>), ReactionError> {
    let mut coefficients = Vec::new();
    let mut formulas = Vec::new();
    for compound in side.split(COMPOUND_SEPARATOR) {
        if compound.is_empty() {
            return Err(ReactionError::Formula(FormulaError::EmptyFormula));
        }
        let (coefficient, formula) = split_leading_coefficient(compound)?;
        if formula.is_empty() {
            return Err(ReactionError::Formula(FormulaError::EmptyFormula));
        }
        if coefficient <= 0.0 {
            return Err(ReactionError::BadCoefficients(format!(
                "coefficient of {} must be positive",
                compound
            )));
        }
        coefficients.push(coefficient);
        formulas.push(formula.to_string());
    }
    Ok((coefficients, formulas))
}
