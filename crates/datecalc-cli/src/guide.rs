//! The usage guide printed for `help`, `--help`, `-help` and `-h`.

use std::fmt;

use datecalc_core::classifier::{
    HELP_ALIASES, NOW_ALIASES, TODAY_ALIASES, TOMORROW_ALIASES, YESTERDAY_ALIASES,
};
use datecalc_core::operator::all_symbols;
use datecalc_core::{Operator, Unit};

const USAGE: &str = "\
Usage: datecalc [-v] [--tz <ZONE>] [--json] <value> <op> <value> [<op> <value> ...] [to <format>]

Evaluates strictly from left to right: `a op b op c` is `(a op b) op c`.
";

const FORMATS: &str = "\
Output format (`to <format>`):
  after + or -      a date template, e.g. `to YYYY-MM-DD`, `to \"dddd, MMMM Do\"`,
                    `to [week] W`, or a strftime string such as `to %d/%m/%Y`
  after -- or diff  the unit the difference is counted in (default: milliseconds)
  after comparisons not allowed

Options:
  --tz <ZONE>       evaluation timezone: `local` (default) or an IANA name
  --json            print the result as JSON
  -v, -vv           log evaluation steps to stderr
  -V, --version     print the version
";

/// The guide, built from the alias and operator tables.
pub struct Guide;

impl fmt::Display for Guide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(USAGE)?;

        writeln!(f, "\nValues:")?;
        writeln!(
            f,
            "  a date            2024-01-31, 2024-01-31T09:30, 2024-01-31T09:30:00+02:00, 20240131"
        )?;
        writeln!(f, "                    2024, 2024-01, 2024-032, 2024-W05-3, 2024/01/31")?;
        writeln!(f, "  {:<17} start of the current day", TODAY_ALIASES.join(", "))?;
        writeln!(f, "  {:<17} the current instant", NOW_ALIASES.join(", "))?;
        writeln!(f, "  {:<17} start of the next day", TOMORROW_ALIASES.join(", "))?;
        writeln!(f, "  {:<17} start of the previous day", YESTERDAY_ALIASES.join(", "))?;
        writeln!(f, "  a duration        <number><unit>, e.g. 10days, -3d, 1.5h")?;

        writeln!(f, "\nUnits:")?;
        for unit in Unit::ALL {
            writeln!(f, "  {:<17} {}", unit.canonical(), unit.aliases()[1..].join(", "))?;
        }

        writeln!(f, "\nOperators:")?;
        for (label, operator) in [
            ("add", Operator::Add),
            ("subtract", Operator::Subtract),
            ("same instant", Operator::Same),
            ("after", Operator::After),
            ("same or after", Operator::SameOrAfter),
            ("before", Operator::Before),
            ("same or before", Operator::SameOrBefore),
            ("difference", Operator::Diff),
        ] {
            let symbols: Vec<_> = all_symbols()
                .filter(|s| Operator::from_symbol(s) == Some(operator))
                .collect();
            writeln!(f, "  {:<17} {}", label, symbols.join(", "))?;
        }

        writeln!(f)?;
        f.write_str(FORMATS)?;
        writeln!(f, "\nHelp: {}", HELP_ALIASES.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guide_lists_every_alias_and_operator() {
        let guide = Guide.to_string();
        for unit in Unit::ALL {
            for alias in unit.aliases() {
                assert!(guide.contains(alias), "missing unit alias '{alias}'");
            }
        }
        for symbol in all_symbols() {
            assert!(guide.contains(symbol), "missing operator '{symbol}'");
        }
        assert!(guide.contains("today, td"));
    }
}
