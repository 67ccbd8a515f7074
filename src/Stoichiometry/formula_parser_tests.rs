#[cfg(test)]
mod tests {
    use crate::Stoichiometry::formula_parser::*;
    use crate::Stoichiometry::periodic_table::{Element, ElementData};
    use crate::Stoichiometry::stoich_errors::FormulaError;
    use approx::assert_relative_eq;

    fn pf(pairs: &[(&str, f64)]) -> ParsedFormula {
        pairs.iter().map(|(s, v)| (s.to_string(), *v)).collect()
    }

    #[test]
    fn test_simple_formula() {
        let parsed = parse_formula("H2O").unwrap();
        assert_eq!(parsed, pf(&[("H", 2.0), ("O", 1.0)]));
        let parsed = parse_formula("NaCl").unwrap();
        assert_eq!(parsed, pf(&[("Na", 1.0), ("Cl", 1.0)]));
    }

    #[test]
    fn test_groups_and_order_of_first_appearance() {
        let parsed = parse_formula("Fe2(SO4)3").unwrap();
        assert_eq!(parsed, pf(&[("Fe", 2.0), ("S", 3.0), ("O", 12.0)]));
        let keys: Vec<&str> = parsed.keys().collect();
        assert_eq!(keys, vec!["Fe", "S", "O"]);

        let parsed = parse_formula("Ca3(PO4)2").unwrap();
        assert_eq!(parsed, pf(&[("Ca", 3.0), ("P", 2.0), ("O", 8.0)]));
    }

    #[test]
    fn test_repeated_elements_accumulate() {
        let parsed = parse_formula("CH3COOH").unwrap();
        assert_eq!(parsed, pf(&[("C", 2.0), ("H", 4.0), ("O", 2.0)]));
    }

    #[test]
    fn test_adduct() {
        let parsed = parse_formula("CuSO4*5H2O").unwrap();
        assert_eq!(
            parsed,
            pf(&[("Cu", 1.0), ("S", 1.0), ("O", 9.0), ("H", 10.0)])
        );
        let dot = parse_formula("CuSO4·5H2O").unwrap();
        let bullet = parse_formula("CuSO4•5H2O").unwrap();
        assert_eq!(parsed, dot);
        assert_eq!(parsed, bullet);
        // no number after the adduct symbol means one unit
        let parsed = parse_formula("NaCl*H2O").unwrap();
        assert_eq!(
            parsed,
            pf(&[("Na", 1.0), ("Cl", 1.0), ("H", 2.0), ("O", 1.0)])
        );
    }

    #[test]
    fn test_fractional_counts() {
        let parsed = parse_formula("(K0.6Na0.4)2SO4(H2O)7").unwrap();
        let keys: Vec<&str> = parsed.keys().collect();
        assert_eq!(keys, vec!["K", "Na", "S", "O", "H"]);
        assert_relative_eq!(parsed.get("K").unwrap(), 1.2, epsilon = 1e-12);
        assert_relative_eq!(parsed.get("Na").unwrap(), 0.8, epsilon = 1e-12);
        assert_relative_eq!(parsed.get("S").unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(parsed.get("O").unwrap(), 11.0, epsilon = 1e-12);
        assert_relative_eq!(parsed.get("H").unwrap(), 14.0, epsilon = 1e-12);

        let parsed = parse_formula("(H2O)0.5").unwrap();
        assert_relative_eq!(parsed.get("H").unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(parsed.get("O").unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_nested_mixed_brackets_with_adduct() {
        let parsed = parse_formula("[Ru(C10H8N2)3]Cl2*6H2O").unwrap();
        assert_eq!(
            parsed,
            pf(&[
                ("Ru", 1.0),
                ("C", 30.0),
                ("H", 36.0),
                ("N", 6.0),
                ("Cl", 2.0),
                ("O", 6.0)
            ])
        );
        let parsed = parse_formula("{[(H)2]3}2").unwrap();
        assert_eq!(parsed, pf(&[("H", 12.0)]));
    }

    #[test]
    fn test_leading_coefficient() {
        let parsed = parse_formula("2H2O").unwrap();
        assert_eq!(parsed, pf(&[("H", 4.0), ("O", 2.0)]));
        let parsed = parse_formula("0.5O2").unwrap();
        assert_eq!(parsed, pf(&[("O", 1.0)]));
    }

    #[test]
    fn test_longest_symbol_wins() {
        assert_eq!(parse_formula("Co").unwrap(), pf(&[("Co", 1.0)]));
        assert_eq!(parse_formula("CO").unwrap(), pf(&[("C", 1.0), ("O", 1.0)]));
        assert_eq!(parse_formula("Hg2Cl2").unwrap(), pf(&[("Hg", 2.0), ("Cl", 2.0)]));
    }

    #[test]
    fn test_whitespace_is_ignored() {
        assert_eq!(parse_formula(" H2 O ").unwrap(), parse_formula("H2O").unwrap());
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_formula(""), Err(FormulaError::EmptyFormula));
        assert!(matches!(
            parse_formula("H2O$"),
            Err(FormulaError::InvalidCharacter(_))
        ));
        assert!(matches!(parse_formula("Xx2O3"), Err(FormulaError::NoSuchAtom(_))));
        assert!(matches!(parse_formula("hO"), Err(FormulaError::NoSuchAtom(_))));
        assert!(matches!(
            parse_formula("Fe2(OH"),
            Err(FormulaError::BracketsNotPaired(_))
        ));
        assert!(matches!(
            parse_formula("Fe2)OH("),
            Err(FormulaError::BracketsNotPaired(_))
        ));
        assert!(matches!(
            parse_formula("(Fe]"),
            Err(FormulaError::BracketsNotPaired(_))
        ));
        assert!(matches!(
            parse_formula("H2O*H2O*H2O"),
            Err(FormulaError::MoreThanOneAdduct(_))
        ));
        assert!(matches!(parse_formula("Fe()"), Err(FormulaError::EmptyGroup(_))));
        assert!(matches!(parse_formula("CuSO4*"), Err(FormulaError::EmptyGroup(_))));
        assert!(matches!(parse_formula("*H2O"), Err(FormulaError::EmptyGroup(_))));
        assert!(matches!(parse_formula("H2.O"), Err(FormulaError::BadNumber(_))));
    }

    #[test]
    fn test_invalid_characters_checked_before_atoms() {
        // both problems present, the character check runs first
        assert!(matches!(
            parse_formula("Xx$"),
            Err(FormulaError::InvalidCharacter(_))
        ));
    }

    #[test]
    fn test_formula_string_round_trip() {
        for formula in ["Fe2(SO4)3", "CuSO4*5H2O", "(K0.6Na0.4)2SO4(H2O)7", "H2O"] {
            let parsed = parse_formula(formula).unwrap();
            let flat = parsed.to_formula_string();
            let reparsed = parse_formula(&flat).unwrap();
            assert!(parsed.approx_eq(&reparsed, 1e-9), "{} -> {}", formula, flat);
        }
        assert_eq!(parse_formula("Fe2(SO4)3").unwrap().to_formula_string(), "Fe2S3O12");
    }

    #[test]
    fn test_formula_string_keeps_full_precision() {
        for formula in ["(H2O)0.333333333", "C0.123456789012H1.000000000001", "Fe0.1(OH)3"] {
            let parsed = parse_formula(formula).unwrap();
            let flat = parsed.to_formula_string();
            let reparsed = parse_formula(&flat).unwrap();
            assert!(parsed.approx_eq(&reparsed, 0.0), "{} -> {}", formula, flat);
        }
        let parsed = parse_formula("(H2O)0.333333333").unwrap();
        assert_eq!(parsed.to_formula_string(), "H0.666666666O0.333333333");
    }

    #[test]
    fn test_tree_shape() {
        let tree = parse_to_tree("Ca(OH)2").unwrap();
        assert_eq!(tree.len(), 2);
        match &tree[1] {
            FormulaNode::Group {
                children,
                multiplier,
            } => {
                assert_eq!(*multiplier, 2.0);
                assert_eq!(children.len(), 2);
            }
            other => panic!("expected a group, got {:?}", other),
        }
    }

    struct TinyTable {
        elements: Vec<Element>,
    }

    impl ElementData for TinyTable {
        fn element(&self, symbol: &str) -> Option<&Element> {
            self.elements.iter().find(|e| e.symbol == symbol)
        }
    }

    #[test]
    fn test_custom_table() {
        let table = TinyTable {
            elements: vec![Element {
                symbol: "D",
                atomic_weight: 2.014,
                electronegativity: 2.2,
                default_oxide: "D2O",
            }],
        };
        let parsed = parse_formula_with_table("D2", &table).unwrap();
        assert_eq!(parsed, pf(&[("D", 2.0)]));
        assert!(matches!(
            parse_formula_with_table("H2", &table),
            Err(FormulaError::NoSuchAtom(_))
        ));
    }
}
