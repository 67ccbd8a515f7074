use crate::Stoichiometry::formula_parser::ParsedFormula;
use crate::Stoichiometry::periodic_table::{ElementData, PeriodicTable};
use crate::Stoichiometry::stoich_errors::ReactionError;
use log::info;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Order of the element rows in the reaction matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOrder {
    /// elements in order of first appearance, reactants then products
    #[default]
    FirstAppearance,
    /// ascending Pauling electronegativity, ties keep first appearance
    Electronegativity,
}

/// Element-by-compound composition matrix of a reaction.
///
/// Rows are elements, columns are compounds (reactants first, then products);
/// `matrix[(i, j)]` is the amount of element `i` in compound `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionMatrix {
    pub matrix: DMatrix<f64>,
    pub elements: Vec<String>,
    /// number of reactant columns
    pub separator_pos: usize,
}

impl ReactionMatrix {
    pub fn new(
        reactants: &[ParsedFormula],
        products: &[ParsedFormula],
    ) -> Result<Self, ReactionError> {
        Self::with_row_order(reactants, products, RowOrder::FirstAppearance, &PeriodicTable)
    }

    pub fn with_row_order(
        reactants: &[ParsedFormula],
        products: &[ParsedFormula],
        order: RowOrder,
        table: &dyn ElementData,
    ) -> Result<Self, ReactionError> {
        if reactants.is_empty() || products.is_empty() {
            return Err(ReactionError::ReactantProductDifference(
                "reaction needs at least one reactant and one product".to_string(),
            ));
        }
        let reactant_elements = unique_elements(reactants);
        let product_elements = unique_elements(products);
        let mut difference: Vec<String> = reactant_elements
            .iter()
            .filter(|e| !product_elements.contains(e))
            .chain(product_elements.iter().filter(|e| !reactant_elements.contains(e)))
            .cloned()
            .collect();
        if !difference.is_empty() {
            difference.sort();
            return Err(ReactionError::ReactantProductDifference(difference.join(", ")));
        }
        let mut elements = reactant_elements;
        if order == RowOrder::Electronegativity {
            // stable sort keeps first appearance among equal values
            elements.sort_by(|a, b| {
                let ea = table.electronegativity(a).unwrap_or(0.0);
                let eb = table.electronegativity(b).unwrap_or(0.0);
                ea.total_cmp(&eb)
            });
        }
        let compounds: Vec<&ParsedFormula> = reactants.iter().chain(products.iter()).collect();
        let mut matrix = DMatrix::zeros(elements.len(), compounds.len());
        for (j, compound) in compounds.iter().enumerate() {
            for (i, element) in elements.iter().enumerate() {
                if let Some(amount) = compound.get(element) {
                    matrix[(i, j)] = amount;
                }
            }
        }
        info!("reaction matrix, rows {:?}: {}", elements, matrix);
        Ok(Self {
            matrix,
            elements,
            separator_pos: reactants.len(),
        })
    }

    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    /// number of compounds
    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn reactant_matrix(&self) -> DMatrix<f64> {
        self.matrix.columns(0, self.separator_pos).into_owned()
    }

    pub fn product_matrix(&self) -> DMatrix<f64> {
        self.matrix
            .columns(self.separator_pos, self.ncols() - self.separator_pos)
            .into_owned()
    }

    /// `[R | -P]`: product columns negated, so a balanced coefficient vector is in its null space
    pub fn signed(&self) -> DMatrix<f64> {
        let mut signed = self.matrix.clone();
        for j in self.separator_pos..signed.ncols() {
            for i in 0..signed.nrows() {
                signed[(i, j)] = -signed[(i, j)];
            }
        }
        signed
    }
}

fn unique_elements(compounds: &[ParsedFormula]) -> Vec<String> {
    let mut elements: Vec<String> = Vec::new();
    for compound in compounds {
        for symbol in compound.keys() {
            if !elements.iter().any(|e| e == symbol) {
                elements.push(symbol.to_string());
            }
        }
    }
    elements
}
