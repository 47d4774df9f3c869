use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

/// Result of a satisfiability check.
#[derive(Debug, Clone, PartialEq)]
pub enum SatResult {
    Sat,
    Unsat,
    Unknown(String),
}

/// Exact rational value of a `Real` model entry, kept in lowest terms with a
/// positive denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rational {
    pub num: i64,
    pub den: i64,
}

impl Rational {
    pub fn new(num: i64, den: i64) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let (num, den) = (i128::from(num), i128::from(den));
        let g = gcd(num.unsigned_abs(), den.unsigned_abs()) as i128;
        let sign = den.signum();
        Some(Self {
            num: i64::try_from(sign * num / g).ok()?,
            den: i64::try_from(sign * den / g).ok()?,
        })
    }

    pub fn integer(n: i64) -> Self {
        Self { num: n, den: 1 }
    }

    /// Parse an SMT-LIB2 real value: `2`, `1.5`, `(- 1.0)`, `(/ 1 2)`,
    /// `(/ (- 1) 2)`.
    pub fn from_smtlib(text: &str) -> Option<Self> {
        let tokens = tokenize(text);
        let mut pos = 0;
        let value = parse_real_expr(&tokens, &mut pos)?;
        (pos == tokens.len()).then_some(value)
    }

    fn checked_neg(self) -> Option<Self> {
        Some(Self {
            num: self.num.checked_neg()?,
            den: self.den,
        })
    }

    fn div(self, other: Self) -> Option<Self> {
        let num = (self.num as i128) * (other.den as i128);
        let den = (self.den as i128) * (other.num as i128);
        Rational::new(i64::try_from(num).ok()?, i64::try_from(den).ok()?)
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        ((self.num as i128) * (other.den as i128)).cmp(&((other.num as i128) * (self.den as i128)))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

fn tokenize(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = String::new();
    for ch in text.trim().chars() {
        match ch {
            '(' | ')' => {
                if !buf.is_empty() {
                    out.push(std::mem::take(&mut buf));
                }
                out.push(ch.to_string());
            }
            c if c.is_whitespace() => {
                if !buf.is_empty() {
                    out.push(std::mem::take(&mut buf));
                }
            }
            other => buf.push(other),
        }
    }
    if !buf.is_empty() {
        out.push(buf);
    }
    out
}

fn parse_real_expr(tokens: &[String], pos: &mut usize) -> Option<Rational> {
    let tok = tokens.get(*pos)?;
    *pos += 1;
    if tok != "(" {
        return parse_decimal(tok);
    }
    let op = tokens.get(*pos)?.clone();
    *pos += 1;
    let value = match op.as_str() {
        "-" => parse_real_expr(tokens, pos)?.checked_neg()?,
        "/" => {
            let lhs = parse_real_expr(tokens, pos)?;
            let rhs = parse_real_expr(tokens, pos)?;
            lhs.div(rhs)?
        }
        _ => return None,
    };
    if tokens.get(*pos).map(String::as_str) != Some(")") {
        return None;
    }
    *pos += 1;
    Some(value)
}

fn parse_decimal(tok: &str) -> Option<Rational> {
    let (negative, digits) = match tok.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, tok),
    };
    if !digits.starts_with(|c: char| c.is_ascii_digit())
        || !digits.bytes().all(|b| b.is_ascii_digit() || b == b'.')
    {
        return None;
    }
    let magnitude = match digits.split_once('.') {
        None => Rational::integer(digits.parse().ok()?),
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            let scale = 10_i64.checked_pow(u32::try_from(frac.len()).ok()?)?;
            let whole: i64 = whole.parse().ok()?;
            let frac_val: i64 = if frac.is_empty() { 0 } else { frac.parse().ok()? };
            Rational::new(whole.checked_mul(scale)?.checked_add(frac_val)?, scale)?
        }
    };
    if negative {
        magnitude.checked_neg()
    } else {
        Some(magnitude)
    }
}

/// A model (variable assignments) extracted from a SAT result.
#[derive(Debug, Clone)]
pub struct Model {
    pub values: HashMap<String, ModelValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModelValue {
    Int(i64),
    Bool(bool),
    Real(Rational),
}

impl Model {
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ModelValue::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(ModelValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_real(&self, name: &str) -> Option<Rational> {
        match self.values.get(name) {
            Some(ModelValue::Real(r)) => Some(*r),
            _ => None,
        }
    }
}

/// Abstract SMT solver interface.
pub trait SmtSolver {
    type Error: std::error::Error;

    /// Declare a new free variable.
    fn declare_var(&mut self, name: &str, sort: &SmtSort) -> Result<(), Self::Error>;

    /// Assert a constraint.
    fn assert(&mut self, term: &SmtTerm) -> Result<(), Self::Error>;

    /// Check satisfiability.
    fn check_sat(&mut self) -> Result<SatResult, Self::Error>;

    /// Check satisfiability and extract a model if SAT.
    fn check_sat_with_model(
        &mut self,
        var_names: &[(&str, &SmtSort)],
    ) -> Result<(SatResult, Option<Model>), Self::Error>;

    /// Reset the solver state.
    fn reset(&mut self) -> Result<(), Self::Error>;
}
