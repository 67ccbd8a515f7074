/// Periodic table: atomic weights, electronegativities and default oxides of all 118
/// elements, behind the `ElementData` lookup trait.
pub mod periodic_table;
/// Error types for formulas, reactions and output.
pub mod stoich_errors;
/// eng
/// Parsing of chemical formulas: validation (characters, atoms, brackets, adducts),
/// tokenizing, a small formula tree and its flattening into an ordered
/// element -> amount mapping. Handles nested `()`, `[]`, `{}` groups, decimal counts,
/// a leading coefficient and one adduct (`CuSO4*5H2O`).
/// # Examples
/// ```
/// use StoichCalc::Stoichiometry::formula_parser::parse_formula;
/// let parsed = parse_formula("Fe2(SO4)3").unwrap();
/// assert_eq!(parsed.get("O"), Some(12.0));
/// assert_eq!(parsed.keys().collect::<Vec<_>>(), vec!["Fe", "S", "O"]);
/// ```
pub mod formula_parser;
mod formula_parser_tests;
/// Molar mass, mass percent, atomic percent and oxide percent of a parsed formula.
pub mod molar_mass;
/// Result records of formulas and reactions: rounding, JSON export, table printing.
pub mod chem_output;
/// `ChemicalFormula`: one formula with all its derived properties.
pub mod chemical_formula;
/// Splitting a reaction string into separator, reactants, products and the
/// coefficients written in front of the compounds.
pub mod reaction_decomposer;
/// Element-by-compound matrix of a reaction, with reactant/product blocks.
pub mod reaction_matrix;
/// The four balancing algorithms behind one `enum_dispatch` trait:
/// matrix inverse, general pseudoinverse, partial pseudoinverse and combinatorial search.
pub mod balancing_algos;
/// eng
/// Balancer: runs an algorithm (or the auto ladder inv -> gpinv -> ppinv -> comb),
/// turns its output into the smallest integer vector and checks element conservation.
/// Also implements the check and force modes.
pub mod balancer;
/// eng
/// `ChemicalReaction`: the whole pipeline from a reaction string to balanced
/// coefficients, normalized coefficients, final reaction strings and masses.
/// # Examples
/// ```
/// use StoichCalc::Stoichiometry::chemical_reaction::ChemicalReaction;
/// let reaction = ChemicalReaction::new("KMnO4+HCl=KCl+MnCl2+H2O+Cl2").unwrap();
/// let balanced = reaction.balance().unwrap();
/// assert_eq!(balanced.coefficients, vec![2.0, 16.0, 2.0, 2.0, 8.0, 5.0]);
/// ```
pub mod chemical_reaction;
mod chemical_reaction_tests;
