//! Operator metadata.
//!
//! Maps X protocol operator names to the SQL form the generator emits, and
//! holds the whitelists for operands that are spliced in as keywords
//! (cast targets and interval units).

use std::collections::HashMap;
use std::sync::LazyLock;

/// How an operator is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperatorForm {
    /// `(a OP b)`
    Binary(&'static str),
    /// `(OP a)`
    Unary(&'static str),
    /// `(a [NOT ]IN (b,...))`
    In { negated: bool },
    /// `(a [NOT ]BETWEEN b AND c)`
    Between { negated: bool },
    /// `(a [NOT ]LIKE b[ ESCAPE c])`
    Like { negated: bool },
    /// `CAST(a AS type)`
    Cast,
    /// `DATE_ADD(a,INTERVAL b unit)` and friends
    DateInterval(&'static str),
    /// `DEFAULT`
    Default,
}

const OPERATOR_LIST: &[(&str, OperatorForm)] = &[
    ("==", OperatorForm::Binary("=")),
    ("!=", OperatorForm::Binary("!=")),
    ("<", OperatorForm::Binary("<")),
    ("<=", OperatorForm::Binary("<=")),
    (">", OperatorForm::Binary(">")),
    (">=", OperatorForm::Binary(">=")),
    ("&&", OperatorForm::Binary("AND")),
    ("||", OperatorForm::Binary("OR")),
    ("xor", OperatorForm::Binary("XOR")),
    ("+", OperatorForm::Binary("+")),
    ("-", OperatorForm::Binary("-")),
    ("*", OperatorForm::Binary("*")),
    ("/", OperatorForm::Binary("/")),
    ("div", OperatorForm::Binary("DIV")),
    ("%", OperatorForm::Binary("%")),
    ("&", OperatorForm::Binary("&")),
    ("|", OperatorForm::Binary("|")),
    ("^", OperatorForm::Binary("^")),
    ("<<", OperatorForm::Binary("<<")),
    (">>", OperatorForm::Binary(">>")),
    ("is", OperatorForm::Binary("IS")),
    ("is_not", OperatorForm::Binary("IS NOT")),
    ("regexp", OperatorForm::Binary("REGEXP")),
    ("not_regexp", OperatorForm::Binary("NOT REGEXP")),
    ("!", OperatorForm::Unary("NOT ")),
    ("not", OperatorForm::Unary("NOT ")),
    ("sign_plus", OperatorForm::Unary("+")),
    ("sign_minus", OperatorForm::Unary("-")),
    ("~", OperatorForm::Unary("~")),
    ("in", OperatorForm::In { negated: false }),
    ("not_in", OperatorForm::In { negated: true }),
    ("between", OperatorForm::Between { negated: false }),
    ("not_between", OperatorForm::Between { negated: true }),
    ("like", OperatorForm::Like { negated: false }),
    ("not_like", OperatorForm::Like { negated: true }),
    ("cast", OperatorForm::Cast),
    ("date_add", OperatorForm::DateInterval("DATE_ADD")),
    ("date_sub", OperatorForm::DateInterval("DATE_SUB")),
    ("default", OperatorForm::Default),
];

static OPERATORS: LazyLock<HashMap<&'static str, OperatorForm>> =
    LazyLock::new(|| OPERATOR_LIST.iter().copied().collect());

/// Look up an operator by its wire name.
pub(crate) fn lookup(name: &str) -> Option<OperatorForm> {
    OPERATORS.get(name).copied()
}

/// Units accepted after `INTERVAL`.
pub(crate) const INTERVAL_UNITS: &[&str] = &[
    "MICROSECOND",
    "SECOND",
    "MINUTE",
    "HOUR",
    "DAY",
    "WEEK",
    "MONTH",
    "QUARTER",
    "YEAR",
    "SECOND_MICROSECOND",
    "MINUTE_MICROSECOND",
    "MINUTE_SECOND",
    "HOUR_MICROSECOND",
    "HOUR_SECOND",
    "HOUR_MINUTE",
    "DAY_MICROSECOND",
    "DAY_SECOND",
    "DAY_MINUTE",
    "DAY_HOUR",
    "YEAR_MONTH",
];

/// Normalize an interval unit, or `None` if it is not one MySQL knows.
pub(crate) fn interval_unit(text: &str) -> Option<&'static str> {
    let upper = text.trim().to_ascii_uppercase();
    INTERVAL_UNITS.iter().copied().find(|unit| *unit == upper)
}

const PLAIN_CAST_TARGETS: &[&str] = &[
    "BINARY",
    "CHAR",
    "DATE",
    "DATETIME",
    "DECIMAL",
    "JSON",
    "SIGNED",
    "SIGNED INTEGER",
    "TIME",
    "UNSIGNED",
    "UNSIGNED INTEGER",
];

/// Normalize a `CAST` target type, or `None` if it is not allowed.
///
/// Accepted: `BINARY[(n)]`, `CHAR[(n)]`, `DATE`, `DATETIME`, `DECIMAL[(m[,d])]`,
/// `JSON`, `SIGNED [INTEGER]`, `TIME`, `UNSIGNED [INTEGER]`, case-insensitive
/// and with free whitespace. The result is upper case with single spaces.
pub(crate) fn cast_target(text: &str) -> Option<String> {
    let upper = text.trim().to_ascii_uppercase();

    let Some(open) = upper.find('(') else {
        let base = upper.split_whitespace().collect::<Vec<_>>().join(" ");
        return PLAIN_CAST_TARGETS
            .contains(&base.as_str())
            .then_some(base);
    };

    let base = upper[..open].trim();
    let params = upper[open + 1..].strip_suffix(')')?;
    let params: Vec<&str> = params.split(',').map(str::trim).collect();
    if params
        .iter()
        .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    match (base, params.len()) {
        ("BINARY" | "CHAR", 1) | ("DECIMAL", 1 | 2) => {
            Some(format!("{}({})", base, params.join(",")))
        }
        _ => None,
    }
}
