//! Parsing of chemical formulas into an ordered element -> amount mapping.
//!
//! Supported syntax: element symbols with integer or decimal counts, nested groups in
//! `()`, `[]` or `{}` with optional multipliers, a leading coefficient for the whole
//! formula and at most one adduct written with `*`, `·` or `•` (`CuSO4*5H2O`).
//! The formula is validated first, then tokenized and folded into a small tree
//! ([`FormulaNode`]) with an explicit stack, so deep nesting never recurses while parsing.
use crate::Stoichiometry::periodic_table::{ElementData, PeriodicTable};
use crate::Stoichiometry::stoich_errors::FormulaError;
use crate::Utils::rational::round_to;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::iter::Peekable;
use std::slice::Iter;
use std::sync::OnceLock;

pub const ADDUCT_SYMBOLS: [char; 3] = ['*', '·', '•'];
const OPENING_BRACKETS: [char; 3] = ['(', '[', '{'];
const CLOSING_BRACKETS: [char; 3] = [')', ']', '}'];

fn invalid_char_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9.()\[\]{}*·•]").expect("static regex"))
}

fn atom_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z][a-z]*|[a-z]+").expect("static regex"))
}

fn leading_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+(\.[0-9]+)?").expect("static regex"))
}

/// Ordered mapping label -> amount. Keys keep the order of first appearance and
/// repeated additions of the same key accumulate. Used for parsed formulas and for
/// the percent tables derived from them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFormula {
    atoms: Vec<(String, f64)>,
}

/// Percent tables share the representation of parsed formulas
pub type PercentMap = ParsedFormula;

impl ParsedFormula {
    pub fn new() -> Self {
        Self { atoms: Vec::new() }
    }

    pub fn add(&mut self, symbol: &str, amount: f64) {
        match self.atoms.iter_mut().find(|(s, _)| s == symbol) {
            Some((_, v)) => *v += amount,
            None => self.atoms.push((symbol.to_string(), amount)),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.atoms.iter().find(|(s, _)| s == symbol).map(|(_, v)| *v)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.atoms.iter().map(|(s, v)| (s.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.atoms.iter().map(|(s, _)| s.as_str())
    }

    pub fn values(&self) -> Vec<f64> {
        self.atoms.iter().map(|(_, v)| *v).collect()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn scale(&mut self, factor: f64) {
        for (_, v) in self.atoms.iter_mut() {
            *v *= factor;
        }
    }

    /// Adds every entry of `other` multiplied by `factor`
    pub fn merge(&mut self, other: &ParsedFormula, factor: f64) {
        for (s, v) in other.iter() {
            self.add(s, v * factor);
        }
    }

    pub fn total(&self) -> f64 {
        self.atoms.iter().map(|(_, v)| v).sum()
    }

    pub fn rounded(&self, precision: u32) -> ParsedFormula {
        ParsedFormula {
            atoms: self
                .atoms
                .iter()
                .map(|(s, v)| (s.clone(), round_to(*v, precision)))
                .collect(),
        }
    }

    /// Same keys (in any order) and values equal within `tolerance`
    pub fn approx_eq(&self, other: &ParsedFormula, tolerance: f64) -> bool {
        self.len() == other.len()
            && self.iter().all(|(s, v)| match other.get(s) {
                Some(w) => (v - w).abs() <= tolerance,
                None => false,
            })
    }

    /// Flat formula string, e.g. `{Fe: 2, S: 3, O: 12}` -> `Fe2S3O12`.
    /// Parsing the result gives back the same mapping.
    pub fn to_formula_string(&self) -> String {
        self.atoms
            .iter()
            .map(|(s, v)| {
                if *v == 1.0 {
                    s.clone()
                } else {
                    // shortest representation that parses back to the same f64
                    format!("{}{}", s, v)
                }
            })
            .collect()
    }
}

impl FromIterator<(String, f64)> for ParsedFormula {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut parsed = ParsedFormula::new();
        for (s, v) in iter {
            parsed.add(&s, v);
        }
        parsed
    }
}

impl Serialize for ParsedFormula {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.atoms.len()))?;
        for (s, v) in &self.atoms {
            map.serialize_entry(s, v)?;
        }
        map.end()
    }
}

/// Tree form of a formula
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaNode {
    Atom { symbol: String, count: f64 },
    Group {
        children: Vec<FormulaNode>,
        multiplier: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open(char),
    Close(char),
    Symbol(String),
    Number(f64),
}

////////////////////////////////////////////////////////////////////////////////
//                              VALIDATION
////////////////////////////////////////////////////////////////////////////////

/// Runs the checks in a fixed order: empty, invalid characters, unknown atoms,
/// bracket balance, adduct count. The first failing check wins.
pub fn validate_formula(formula: &str, table: &dyn ElementData) -> Result<(), FormulaError> {
    if formula.is_empty() {
        return Err(FormulaError::EmptyFormula);
    }
    let invalid: Vec<&str> = invalid_char_regex()
        .find_iter(formula)
        .map(|m| m.as_str())
        .collect();
    if !invalid.is_empty() {
        return Err(FormulaError::InvalidCharacter(invalid.join(" ")));
    }
    let unknown: Vec<&str> = atom_regex()
        .find_iter(formula)
        .map(|m| m.as_str())
        .filter(|s| !table.contains(s))
        .collect();
    if !unknown.is_empty() {
        return Err(FormulaError::NoSuchAtom(unknown.join(" ")));
    }
    if !brackets_balanced(formula) {
        return Err(FormulaError::BracketsNotPaired(formula.to_string()));
    }
    if formula.chars().filter(|c| ADDUCT_SYMBOLS.contains(c)).count() > 1 {
        return Err(FormulaError::MoreThanOneAdduct(formula.to_string()));
    }
    Ok(())
}

fn brackets_balanced(formula: &str) -> bool {
    let mut stack: Vec<char> = Vec::new();
    for c in formula.chars() {
        if OPENING_BRACKETS.contains(&c) {
            stack.push(c);
        } else if let Some(pos) = CLOSING_BRACKETS.iter().position(|b| *b == c) {
            match stack.pop() {
                Some(open) if open == OPENING_BRACKETS[pos] => {}
                _ => return false,
            }
        }
    }
    stack.is_empty()
}

////////////////////////////////////////////////////////////////////////////////
//                              PARSING
////////////////////////////////////////////////////////////////////////////////

/// Splits a leading numeric coefficient off a formula: `2H2O` -> `(2.0, "H2O")`.
/// Without a leading number the coefficient is 1.
pub fn split_leading_coefficient(formula: &str) -> Result<(f64, &str), FormulaError> {
    match leading_number_regex().find(formula) {
        Some(m) => {
            let coef: f64 = m
                .as_str()
                .parse()
                .map_err(|_| FormulaError::BadNumber(m.as_str().to_string()))?;
            Ok((coef, &formula[m.end()..]))
        }
        None => Ok((1.0, formula)),
    }
}

fn tokenize(formula: &str) -> Result<Vec<Token>, FormulaError> {
    let chars: Vec<char> = formula.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if OPENING_BRACKETS.contains(&c) {
            tokens.push(Token::Open(c));
            i += 1;
        } else if CLOSING_BRACKETS.contains(&c) {
            tokens.push(Token::Close(c));
            i += 1;
        } else if c.is_ascii_uppercase() {
            // greedy: the symbol runs over all following lowercase letters
            let start = i;
            i += 1;
            while i < chars.len() && chars[i].is_ascii_lowercase() {
                i += 1;
            }
            tokens.push(Token::Symbol(chars[start..i].iter().collect()));
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i < chars.len() && chars[i] == '.' {
                i += 1;
                let frac_start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                if frac_start == i {
                    let text: String = chars[start..i].iter().collect();
                    return Err(FormulaError::BadNumber(text));
                }
            }
            let text: String = chars[start..i].iter().collect();
            let value: f64 = text
                .parse()
                .map_err(|_| FormulaError::BadNumber(text.clone()))?;
            tokens.push(Token::Number(value));
        } else if c == '.' {
            return Err(FormulaError::BadNumber(formula.to_string()));
        } else if c.is_ascii_lowercase() {
            return Err(FormulaError::NoSuchAtom(c.to_string()));
        } else {
            return Err(FormulaError::InvalidCharacter(c.to_string()));
        }
    }
    Ok(tokens)
}

fn take_count(iter: &mut Peekable<Iter<'_, Token>>) -> f64 {
    match iter.peek() {
        Some(Token::Number(n)) => {
            let n = *n;
            iter.next();
            n
        }
        _ => 1.0,
    }
}

/// Builds the formula tree from tokens. Groups are kept on an explicit stack of
/// (opening bracket, children) frames.
fn build_tree(formula: &str, tokens: &[Token]) -> Result<Vec<FormulaNode>, FormulaError> {
    let mut stack: Vec<(Option<char>, Vec<FormulaNode>)> = vec![(None, Vec::new())];
    let mut iter = tokens.iter().peekable();
    while let Some(token) = iter.next() {
        match token {
            Token::Symbol(symbol) => {
                let count = take_count(&mut iter);
                let frame = stack
                    .last_mut()
                    .ok_or_else(|| FormulaError::BracketsNotPaired(formula.to_string()))?;
                frame.1.push(FormulaNode::Atom {
                    symbol: symbol.clone(),
                    count,
                });
            }
            Token::Open(c) => stack.push((Some(*c), Vec::new())),
            Token::Close(c) => {
                let (opener, children) = stack
                    .pop()
                    .ok_or_else(|| FormulaError::BracketsNotPaired(formula.to_string()))?;
                let expected = CLOSING_BRACKETS
                    .iter()
                    .position(|b| b == c)
                    .map(|pos| OPENING_BRACKETS[pos]);
                if opener.is_none() || opener != expected {
                    return Err(FormulaError::BracketsNotPaired(formula.to_string()));
                }
                if children.is_empty() {
                    return Err(FormulaError::EmptyGroup(formula.to_string()));
                }
                let multiplier = take_count(&mut iter);
                let parent = stack
                    .last_mut()
                    .ok_or_else(|| FormulaError::BracketsNotPaired(formula.to_string()))?;
                parent.1.push(FormulaNode::Group {
                    children,
                    multiplier,
                });
            }
            Token::Number(n) => {
                return Err(FormulaError::BadNumber(format!(
                    "{} (number {} does not follow an atom or a group)",
                    formula, n
                )));
            }
        }
    }
    if stack.len() != 1 {
        return Err(FormulaError::BracketsNotPaired(formula.to_string()));
    }
    let (_, root) = stack
        .pop()
        .ok_or_else(|| FormulaError::BracketsNotPaired(formula.to_string()))?;
    Ok(root)
}

/// Flattens a tree into amounts. Walks the tree with an explicit work list of
/// (node, accumulated multiplier); children are pushed in reverse so atoms come
/// out in order of first appearance.
pub fn fold_tree(nodes: &[FormulaNode], multiplier: f64, out: &mut ParsedFormula) {
    let mut work: Vec<(&FormulaNode, f64)> = nodes.iter().rev().map(|n| (n, multiplier)).collect();
    while let Some((node, factor)) = work.pop() {
        match node {
            FormulaNode::Atom { symbol, count } => out.add(symbol, count * factor),
            FormulaNode::Group {
                children,
                multiplier,
            } => {
                for child in children.iter().rev() {
                    work.push((child, factor * multiplier));
                }
            }
        }
    }
}

/// Parses a formula without adduct or leading coefficient into a tree
pub fn parse_to_tree(fragment: &str) -> Result<Vec<FormulaNode>, FormulaError> {
    let tokens = tokenize(fragment)?;
    let tree = build_tree(fragment, &tokens)?;
    if tree.is_empty() {
        return Err(FormulaError::EmptyGroup(fragment.to_string()));
    }
    Ok(tree)
}

/// Parses a formula against the built-in periodic table
pub fn parse_formula(formula: &str) -> Result<ParsedFormula, FormulaError> {
    parse_formula_with_table(formula, &PeriodicTable)
}

/// Parses a formula against any element table.
/// `X*nY` is treated as `X(Y)n`; a leading coefficient multiplies the whole result.
pub fn parse_formula_with_table(
    formula: &str,
    table: &dyn ElementData,
) -> Result<ParsedFormula, FormulaError> {
    let formula: String = formula.chars().filter(|c| !c.is_whitespace()).collect();
    validate_formula(&formula, table)?;
    let (coefficient, body) = split_leading_coefficient(&formula)?;
    if body.is_empty() {
        return Err(FormulaError::EmptyFormula);
    }
    let (base, adduct) = match body.find(|c: char| ADDUCT_SYMBOLS.contains(&c)) {
        Some(pos) => {
            let symbol_len = body[pos..].chars().next().map_or(1, |c| c.len_utf8());
            (&body[..pos], Some(&body[pos + symbol_len..]))
        }
        None => (body, None),
    };
    if base.is_empty() {
        return Err(FormulaError::EmptyGroup(formula.clone()));
    }
    let mut tree = parse_to_tree(base)?;
    if let Some(adduct) = adduct {
        let (adduct_coef, adduct_body) = split_leading_coefficient(adduct)?;
        if adduct_body.is_empty() {
            return Err(FormulaError::EmptyGroup(formula.clone()));
        }
        tree.push(FormulaNode::Group {
            children: parse_to_tree(adduct_body)?,
            multiplier: adduct_coef,
        });
    }
    let mut parsed = ParsedFormula::new();
    fold_tree(&tree, coefficient, &mut parsed);
    Ok(parsed)
}
