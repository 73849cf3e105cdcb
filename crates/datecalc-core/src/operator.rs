//! Operator symbols and their families.

use std::fmt;

use crate::error::DateCalcError;

/// Every binary operator the evaluator knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Same,
    After,
    SameOrAfter,
    Before,
    SameOrBefore,
    Diff,
}

/// Operators grouped by the operand types they accept and the result they produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// date (or duration) ± duration
    Additive,
    /// date ? date → boolean
    Comparison,
    /// date -- date → number
    Difference,
}

/// Accepted spellings, in the order they are listed to the user.
const SYMBOLS: &[(&str, Operator)] = &[
    ("+", Operator::Add),
    ("-", Operator::Subtract),
    ("=", Operator::Same),
    ("==", Operator::Same),
    (">", Operator::After),
    ("after", Operator::After),
    (">=", Operator::SameOrAfter),
    ("same-or-after", Operator::SameOrAfter),
    ("<", Operator::Before),
    ("before", Operator::Before),
    ("<=", Operator::SameOrBefore),
    ("same-or-before", Operator::SameOrBefore),
    ("--", Operator::Diff),
    ("diff", Operator::Diff),
];

impl Operator {
    /// Exact match against the known symbols.
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        SYMBOLS
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, op)| *op)
    }

    pub fn family(self) -> Family {
        match self {
            Operator::Add | Operator::Subtract => Family::Additive,
            Operator::Same
            | Operator::After
            | Operator::SameOrAfter
            | Operator::Before
            | Operator::SameOrBefore => Family::Comparison,
            Operator::Diff => Family::Difference,
        }
    }

    /// Primary spelling.
    pub fn symbol(self) -> &'static str {
        SYMBOLS
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(s, _)| *s)
            .unwrap_or("?")
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// All accepted operator spellings.
pub fn all_symbols() -> impl Iterator<Item = &'static str> {
    SYMBOLS.iter().map(|(s, _)| *s)
}

pub(crate) fn parse_operator(token: &str) -> Result<Operator, DateCalcError> {
    Operator::from_symbol(token).ok_or_else(|| DateCalcError::InvalidOperator {
        found: token.to_string(),
        allowed: all_symbols().collect::<Vec<_>>().join(", "),
    })
}
