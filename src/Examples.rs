/// runnable walkthroughs of formula and reaction calculations
pub mod stoichiometry_examples;
