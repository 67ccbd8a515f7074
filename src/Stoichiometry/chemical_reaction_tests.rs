#[cfg(test)]
mod tests {
    use crate::Stoichiometry::chemical_reaction::ChemicalReaction;
    use crate::Stoichiometry::reaction_matrix::RowOrder;
    use crate::Stoichiometry::stoich_errors::{FormulaError, ReactionError};
    use crate::settings::{BalancerConfig, Mode};
    use approx::assert_relative_eq;
    use tempfile::NamedTempFile;

    const KI_REACTION: &str = "KI+H2SO4=I2+H2S+K2SO4+H2O";

    #[test]
    fn test_full_pipeline() {
        let reaction = ChemicalReaction::new(KI_REACTION).unwrap();
        assert_eq!(reaction.reactants(), &["KI", "H2SO4"]);
        assert_eq!(reaction.products(), &["I2", "H2S", "K2SO4", "H2O"]);
        assert_eq!(reaction.separator(), "=");
        assert_eq!(reaction.calculated_target().unwrap(), 2);

        let balanced = reaction.balance().unwrap();
        assert_eq!(balanced.coefficients, vec![8.0, 5.0, 4.0, 1.0, 4.0, 4.0]);
        assert_eq!(balanced.algorithm, "inv");
        assert!(balanced.is_balanced());
        assert_eq!(
            balanced.normalized_coefficients().unwrap(),
            vec![2.0, 1.25, 1.0, 0.25, 1.0, 1.0]
        );
        assert_eq!(balanced.final_reaction(), "8KI+5H2SO4=4I2+H2S+4K2SO4+4H2O");
        assert_eq!(
            balanced.final_reaction_normalized().unwrap(),
            "2KI+1.25H2SO4=I2+0.25H2S+K2SO4+H2O"
        );
    }

    #[test]
    fn test_molar_masses_and_masses() {
        let reaction = ChemicalReaction::new(KI_REACTION).unwrap();
        let molar_masses = reaction.molar_masses().unwrap();
        let expected = [166.00247, 98.072, 253.80894, 34.076, 174.252, 18.015];
        for (m, e) in molar_masses.iter().zip(expected) {
            assert_relative_eq!(*m, e, epsilon = 1e-8);
        }
        let balanced = reaction.balance().unwrap();
        let masses = balanced.masses().unwrap();
        let expected = [
            1.30809001, 0.48300111, 1.0, 0.03356462, 0.68654792, 0.07097859,
        ];
        for (m, e) in masses.iter().zip(expected) {
            assert_relative_eq!(*m, e, epsilon = 2e-8);
        }
    }

    #[test]
    fn test_target_and_target_mass() {
        let reaction = ChemicalReaction::new(KI_REACTION)
            .unwrap()
            .with_target(-1)
            .unwrap()
            .with_target_mass(2.0)
            .unwrap();
        assert_eq!(reaction.calculated_target().unwrap(), 1);
        let balanced = reaction.balance().unwrap();
        let normalized = balanced.normalized_coefficients().unwrap();
        assert_eq!(normalized, vec![1.6, 1.0, 0.8, 0.2, 0.8, 0.8]);
        let masses = balanced.masses().unwrap();
        assert_relative_eq!(masses[1], 2.0, epsilon = 1e-12);

        let reaction = ChemicalReaction::new(KI_REACTION).unwrap();
        assert!(matches!(
            reaction.clone().with_target(4),
            Err(ReactionError::BadTarget(_))
        ));
        assert!(matches!(
            reaction.clone().with_target(-3),
            Err(ReactionError::BadTarget(_))
        ));
        assert!(reaction.clone().with_target(3).is_ok());
        assert!(reaction.clone().with_target(-2).is_ok());
        assert!(matches!(
            reaction.with_target_mass(0.0),
            Err(ReactionError::BadTarget(_))
        ));
    }

    #[test]
    fn test_check_mode() {
        let config = BalancerConfig {
            mode: Mode::Check,
            ..BalancerConfig::default()
        };
        let reaction = ChemicalReaction::with_config(
            "Cr2(SO4)3+3Br2+16NaOH=6NaBr+2Na2CrO4+3Na2SO4+8H2O",
            config.clone(),
        )
        .unwrap();
        let balanced = reaction.balance().unwrap();
        assert_eq!(balanced.coefficients, vec![1.0, 3.0, 16.0, 6.0, 2.0, 3.0, 8.0]);
        assert_eq!(
            balanced.final_reaction(),
            "Cr2(SO4)3+3Br2+16NaOH=6NaBr+2Na2CrO4+3Na2SO4+8H2O"
        );

        let reaction = ChemicalReaction::with_config(
            "Cr2(SO4)3+Br2+NaOH=NaBr+Na2CrO4+Na2SO4+H2O",
            config,
        )
        .unwrap();
        assert!(matches!(
            reaction.balance(),
            Err(ReactionError::ReactionNotBalanced(_))
        ));
    }

    #[test]
    fn test_force_mode() {
        let config = BalancerConfig {
            mode: Mode::Force,
            ..BalancerConfig::default()
        };
        let reaction = ChemicalReaction::with_config("H2+O2=4H2O", config).unwrap();
        let balanced = reaction.balance().unwrap();
        assert_eq!(balanced.coefficients, vec![4.0, 2.0, 4.0]);
        assert_eq!(balanced.final_reaction(), "4H2+2O2=4H2O");
    }

    #[test]
    fn test_other_separator_is_kept() {
        let reaction = ChemicalReaction::new("Fe+O2→Fe2O3").unwrap();
        let balanced = reaction.balance().unwrap();
        assert_eq!(balanced.final_reaction(), "4Fe+3O2→2Fe2O3");
    }

    #[test]
    fn test_row_order_does_not_change_result() {
        let reaction = ChemicalReaction::new("KMnO4+HCl=KCl+MnCl2+H2O+Cl2").unwrap();
        let reordered = reaction
            .clone()
            .with_row_order(RowOrder::Electronegativity)
            .unwrap();
        assert_eq!(reordered.matrix().elements, vec!["K", "Mn", "H", "Cl", "O"]);
        assert_eq!(
            reaction.balance().unwrap().coefficients,
            reordered.balance().unwrap().coefficients
        );
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            ChemicalReaction::new("Fe+O2=Fe2O3+N2"),
            Err(ReactionError::ReactantProductDifference(_))
        ));
        assert!(matches!(
            ChemicalReaction::new("Fe+Xx=Fe2O3"),
            Err(ReactionError::Formula(FormulaError::NoSuchAtom(_)))
        ));
        assert!(matches!(
            ChemicalReaction::new("Fe+O2"),
            Err(ReactionError::NoSeparator(_))
        ));
        assert!(matches!(
            ChemicalReaction::new("H2+O2=H2O").unwrap().with_precision(0),
            Err(ReactionError::BadConfig(_))
        ));
    }

    #[test]
    fn test_output() {
        let reaction = ChemicalReaction::new("H2+O2=H2O").unwrap();
        let balanced = reaction.balance().unwrap();
        let output = balanced.output_results().unwrap();
        assert_eq!(output.target, "H2O");
        assert!(output.is_balanced);
        assert_eq!(output.mode, "auto");

        let json = balanced.as_json(4).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["final_reaction"], serde_json::json!("2H2+O2=2H2O"));
        assert_eq!(value["coefficients"], serde_json::json!([2.0, 1.0, 2.0]));

        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        balanced.export_to_json(&path, 4).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"masses\""));
        balanced.print_results(4).unwrap();
    }
}
