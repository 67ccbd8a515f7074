use crate::Stoichiometry::chemical_formula::ChemicalFormula;
use crate::Stoichiometry::chemical_reaction::ChemicalReaction;
use crate::Stoichiometry::stoich_errors::ReactionError;
use crate::settings::{Algorithm, BalancerConfig, Mode};
use log::error;
use std::collections::HashMap;

pub fn stoich_examples(task: usize) {
    let result = match task {
        0 => formula_example(),
        1 => balance_example(),
        2 => algorithms_example(),
        3 => modes_example(),
        4 => config_example(),
        _ => {
            println!("no example with number {}, choose 0..=4", task);
            Ok(())
        }
    };
    if let Err(e) = result {
        error!("example {} failed: {}", task, e);
    }
}

// Composition of formulas: molar mass, mass/atomic/oxide percent
fn formula_example() -> Result<(), ReactionError> {
    for formula in ["K2SO4", "CuSO4*5H2O", "(K0.6Na0.4)2SO4(H2O)7", "[Ru(C10H8N2)3]Cl2*6H2O"] {
        let formula = ChemicalFormula::new(formula, 8)?;
        formula.print_results(4)?;
    }
    let mut oxides = HashMap::new();
    oxides.insert("Fe".to_string(), "FeO".to_string());
    let magnetite = ChemicalFormula::new("Fe3O4", 8)?.with_oxides(oxides);
    println!("Fe3O4 as FeO: {:?}", magnetite.oxide_percent()?);
    Ok(())
}

// Auto balancing with masses for 1 g of the first product
fn balance_example() -> Result<(), ReactionError> {
    let reaction = ChemicalReaction::new("KI+H2SO4=I2+H2S+K2SO4+H2O")?
        .with_target(0)?
        .with_target_mass(1.0)?;
    let balanced = reaction.balance()?;
    balanced.print_results(4)?;
    println!("{}", balanced.as_json(4)?);
    Ok(())
}

// The same reaction through every algorithm
fn algorithms_example() -> Result<(), ReactionError> {
    let reaction = "KMnO4+HCl=KCl+MnCl2+H2O+Cl2";
    for algorithm in [Algorithm::Inv, Algorithm::Gpinv, Algorithm::Ppinv, Algorithm::Comb] {
        let config = BalancerConfig {
            algorithm,
            ..BalancerConfig::default()
        };
        let balanced_reaction = ChemicalReaction::with_config(reaction, config)?;
        let balanced = balanced_reaction.balance()?;
        println!("{:>6}: {}", algorithm.as_str(), balanced.final_reaction());
    }
    Ok(())
}

// check: verify written coefficients, force: keep the target coefficient and solve the rest
fn modes_example() -> Result<(), ReactionError> {
    let check = BalancerConfig {
        mode: Mode::Check,
        ..BalancerConfig::default()
    };
    let reaction = ChemicalReaction::with_config(
        "Cr2(SO4)3+3Br2+16NaOH=6NaBr+2Na2CrO4+3Na2SO4+8H2O",
        check.clone(),
    )?;
    println!("check passed: {}", reaction.balance()?.final_reaction());
    let unbalanced = ChemicalReaction::with_config("Cr2(SO4)3+Br2+NaOH=NaBr+Na2CrO4+Na2SO4+H2O", check)?;
    match unbalanced.balance() {
        Ok(_) => println!("unexpectedly balanced"),
        Err(e) => println!("check failed as expected: {}", e),
    }

    let force = BalancerConfig {
        mode: Mode::Force,
        ..BalancerConfig::default()
    };
    let reaction = ChemicalReaction::with_config("H2+O2=3H2O", force)?;
    let balanced = reaction.balance()?;
    println!("forced: {}", balanced.final_reaction());
    Ok(())
}

// Config round trip through a JSON file
fn config_example() -> Result<(), ReactionError> {
    let path = "balancer_config.json";
    let config = BalancerConfig::default()
        .with_algorithm("gpinv")?
        .with_mode("balance")?;
    config.save(path)?;
    let loaded = BalancerConfig::load(path)?;
    println!("loaded config: {:?}", loaded);
    let reaction = ChemicalReaction::with_config("Fe+O2=Fe2O3", loaded)?;
    println!("{}", reaction.balance()?.final_reaction());
    Ok(())
}
