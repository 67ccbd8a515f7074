use thiserror::Error;

/// Errors raised while validating or parsing a single chemical formula.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulaError {
    #[error("formula is empty")]
    EmptyFormula,
    #[error("invalid character(s) in formula: {0}")]
    InvalidCharacter(String),
    #[error("brackets are not paired in formula: {0}")]
    BracketsNotPaired(String),
    #[error("no such atom(s) in the periodic table: {0}")]
    NoSuchAtom(String),
    #[error("more than one adduct symbol in formula: {0}")]
    MoreThanOneAdduct(String),
    #[error("empty group or adduct in formula: {0}")]
    EmptyGroup(String),
    #[error("malformed number in formula: {0}")]
    BadNumber(String),
    #[error("oxide {oxide} does not contain element {element}")]
    BadOxide { element: String, oxide: String },
    #[error("precision must be a positive integer, got {0}")]
    BadPrecision(u32),
}

/// Errors raised while writing results to JSON or to a file.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("formula error: {0}")]
    Formula(#[from] FormulaError),
}

/// Errors raised while decomposing, building or balancing a reaction.
#[derive(Debug, Error)]
pub enum ReactionError {
    #[error("reaction string is empty")]
    EmptyReaction,
    #[error("invalid character(s) in reaction: {0}")]
    InvalidCharacter(String),
    #[error("no valid reactant/product separator in reaction: {0}")]
    NoSeparator(String),
    #[error("formula error: {0}")]
    Formula(#[from] FormulaError),
    #[error("reactants and products contain different elements: {0}")]
    ReactantProductDifference(String),
    #[error("reaction cannot be balanced: {0}")]
    ReactionNotBalanced(String),
    #[error("bad coefficients: {0}")]
    BadCoefficients(String),
    #[error("no such algorithm: {0}")]
    NoSuchAlgorithm(String),
    #[error("no such mode: {0}")]
    NoSuchMode(String),
    #[error("bad target: {0}")]
    BadTarget(String),
    #[error("bad configuration: {0}")]
    BadConfig(String),
    #[error("output error: {0}")]
    Output(#[from] OutputError),
}
