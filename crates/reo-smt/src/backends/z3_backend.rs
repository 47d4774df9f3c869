use std::collections::HashMap;

use thiserror::Error;
use z3::ast::{Ast, Bool, Int, Real};
use z3::SatResult as Z3SatResult;

use crate::solver::{Model, ModelValue, Rational, SatResult, SmtSolver};
use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

#[derive(Debug, Error)]
pub enum Z3Error {
    #[error("Z3 error: {0}")]
    Internal(String),
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
    #[error("Sort mismatch for variable {0}")]
    SortMismatch(String),
}

pub struct Z3Solver {
    solver: z3::Solver,
    vars: HashMap<String, Z3Term>,
    params: Option<z3::Params>,
}

impl Z3Solver {
    pub fn new() -> Self {
        Self {
            solver: z3::Solver::new(),
            vars: HashMap::new(),
            params: None,
        }
    }

    /// A solver that gives up with `unknown` after `timeout_secs`; 0 disables
    /// the limit.
    pub fn with_timeout_secs(timeout_secs: u64) -> Self {
        if timeout_secs == 0 {
            return Self::new();
        }
        let solver = z3::Solver::new();
        let mut params = z3::Params::new();
        let timeout_ms = u32::try_from(timeout_secs.saturating_mul(1000)).unwrap_or(u32::MAX);
        params.set_u32("timeout", timeout_ms);
        solver.set_params(&params);
        Self {
            solver,
            vars: HashMap::new(),
            params: Some(params),
        }
    }

    fn constant(name: &str, sort: &SmtSort) -> Z3Term {
        match sort {
            SmtSort::Int => Z3Term::Int(Int::new_const(name)),
            SmtSort::Real => Z3Term::Real(Real::new_const(name)),
            SmtSort::Bool => Z3Term::Bool(Bool::new_const(name)),
        }
    }

    fn translate_term(&self, term: &SmtTerm, bound: &HashMap<String, Z3Term>) -> Result<Z3Term, Z3Error> {
        let tr = |t: &SmtTerm| self.translate_term(t, bound);
        match term {
            SmtTerm::Var(name) => bound
                .get(name)
                .or_else(|| self.vars.get(name))
                .cloned()
                .ok_or_else(|| Z3Error::UnknownVariable(name.clone())),
            SmtTerm::IntLit(n) => Ok(Z3Term::Int(Int::from_i64(*n))),
            SmtTerm::RealLit(n) => Ok(Z3Term::Real(Int::from_i64(*n).to_real())),
            SmtTerm::BoolLit(b) => Ok(Z3Term::Bool(Bool::from_bool(*b))),
            SmtTerm::Add(lhs, rhs) => match (tr(lhs)?, tr(rhs)?) {
                (Z3Term::Int(l), Z3Term::Int(r)) => Ok(Z3Term::Int(&l + &r)),
                (Z3Term::Real(l), Z3Term::Real(r)) => Ok(Z3Term::Real(&l + &r)),
                _ => Err(Z3Error::Internal("Sort mismatch in Add".into())),
            },
            SmtTerm::Sub(lhs, rhs) => match (tr(lhs)?, tr(rhs)?) {
                (Z3Term::Int(l), Z3Term::Int(r)) => Ok(Z3Term::Int(&l - &r)),
                (Z3Term::Real(l), Z3Term::Real(r)) => Ok(Z3Term::Real(&l - &r)),
                _ => Err(Z3Error::Internal("Sort mismatch in Sub".into())),
            },
            SmtTerm::Eq(lhs, rhs) => match (tr(lhs)?, tr(rhs)?) {
                (Z3Term::Int(l), Z3Term::Int(r)) => Ok(Z3Term::Bool(l.eq(&r))),
                (Z3Term::Real(l), Z3Term::Real(r)) => Ok(Z3Term::Bool(l.eq(&r))),
                (Z3Term::Bool(l), Z3Term::Bool(r)) => Ok(Z3Term::Bool(l.eq(&r))),
                _ => Err(Z3Error::Internal("Sort mismatch in Eq".into())),
            },
            SmtTerm::Lt(lhs, rhs) => compare(tr(lhs)?, tr(rhs)?, "Lt", |l, r| l.lt(r), |l, r| l.lt(r)),
            SmtTerm::Le(lhs, rhs) => compare(tr(lhs)?, tr(rhs)?, "Le", |l, r| l.le(r), |l, r| l.le(r)),
            SmtTerm::Gt(lhs, rhs) => compare(tr(lhs)?, tr(rhs)?, "Gt", |l, r| l.gt(r), |l, r| l.gt(r)),
            SmtTerm::Ge(lhs, rhs) => compare(tr(lhs)?, tr(rhs)?, "Ge", |l, r| l.ge(r), |l, r| l.ge(r)),
            SmtTerm::And(terms) => {
                let bools = terms
                    .iter()
                    .map(|t| tr(t).and_then(Z3Term::into_bool))
                    .collect::<Result<Vec<_>, _>>()?;
                let refs: Vec<&Bool> = bools.iter().collect();
                Ok(Z3Term::Bool(Bool::and(&refs)))
            }
            SmtTerm::Or(terms) => {
                let bools = terms
                    .iter()
                    .map(|t| tr(t).and_then(Z3Term::into_bool))
                    .collect::<Result<Vec<_>, _>>()?;
                let refs: Vec<&Bool> = bools.iter().collect();
                Ok(Z3Term::Bool(Bool::or(&refs)))
            }
            SmtTerm::Not(inner) => Ok(Z3Term::Bool(tr(inner)?.into_bool()?.not())),
            SmtTerm::Implies(lhs, rhs) => {
                let l = tr(lhs)?.into_bool()?;
                let r = tr(rhs)?.into_bool()?;
                Ok(Z3Term::Bool(l.implies(&r)))
            }
            SmtTerm::ForAll(binders, body) | SmtTerm::Exists(binders, body) => {
                let mut scope = bound.clone();
                let mut consts = Vec::with_capacity(binders.len());
                for (name, sort) in binders {
                    let c = Self::constant(name, sort);
                    scope.insert(name.clone(), c.clone());
                    consts.push(c);
                }
                let body = self.translate_term(body, &scope)?.into_bool()?;
                let refs: Vec<&dyn Ast> = consts.iter().map(Z3Term::as_ast).collect();
                let quantified = if matches!(term, SmtTerm::ForAll(..)) {
                    z3::ast::forall_const(&refs, &[], &body)
                } else {
                    z3::ast::exists_const(&refs, &[], &body)
                };
                Ok(Z3Term::Bool(quantified))
            }
        }
    }

    fn unknown_reason(&self) -> String {
        self.solver
            .get_reason_unknown()
            .unwrap_or_else(|| "Z3 returned unknown".into())
    }
}

fn compare(
    lhs: Z3Term,
    rhs: Z3Term,
    op: &str,
    ints: impl Fn(&Int, &Int) -> Bool,
    reals: impl Fn(&Real, &Real) -> Bool,
) -> Result<Z3Term, Z3Error> {
    match (lhs, rhs) {
        (Z3Term::Int(l), Z3Term::Int(r)) => Ok(Z3Term::Bool(ints(&l, &r))),
        (Z3Term::Real(l), Z3Term::Real(r)) => Ok(Z3Term::Bool(reals(&l, &r))),
        _ => Err(Z3Error::Internal(format!("Sort mismatch in {op}"))),
    }
}

#[derive(Clone)]
enum Z3Term {
    Int(Int),
    Real(Real),
    Bool(Bool),
}

impl Z3Term {
    fn into_bool(self) -> Result<Bool, Z3Error> {
        match self {
            Z3Term::Bool(b) => Ok(b),
            Z3Term::Int(_) => Err(Z3Error::Internal("Expected Bool, got Int".into())),
            Z3Term::Real(_) => Err(Z3Error::Internal("Expected Bool, got Real".into())),
        }
    }

    fn as_ast(&self) -> &dyn Ast {
        match self {
            Z3Term::Int(i) => i,
            Z3Term::Real(r) => r,
            Z3Term::Bool(b) => b,
        }
    }
}

impl Default for Z3Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl SmtSolver for Z3Solver {
    type Error = Z3Error;

    fn declare_var(&mut self, name: &str, sort: &SmtSort) -> Result<(), Z3Error> {
        self.vars.insert(name.to_string(), Self::constant(name, sort));
        Ok(())
    }

    fn assert(&mut self, term: &SmtTerm) -> Result<(), Z3Error> {
        let z3_term = self.translate_term(term, &HashMap::new())?.into_bool()?;
        self.solver.assert(&z3_term);
        Ok(())
    }

    fn check_sat(&mut self) -> Result<SatResult, Z3Error> {
        match self.solver.check() {
            Z3SatResult::Sat => Ok(SatResult::Sat),
            Z3SatResult::Unsat => Ok(SatResult::Unsat),
            Z3SatResult::Unknown => Ok(SatResult::Unknown(self.unknown_reason())),
        }
    }

    fn check_sat_with_model(
        &mut self,
        var_names: &[(&str, &SmtSort)],
    ) -> Result<(SatResult, Option<Model>), Z3Error> {
        match self.solver.check() {
            Z3SatResult::Sat => {
                let z3_model = self
                    .solver
                    .get_model()
                    .ok_or_else(|| Z3Error::Internal("SAT but no model available".into()))?;
                let mut values = HashMap::new();

                for &(name, sort) in var_names {
                    let Some(var) = self.vars.get(name) else {
                        continue;
                    };
                    let value = match (sort, var) {
                        (SmtSort::Int, Z3Term::Int(v)) => z3_model
                            .eval::<Int>(v, true)
                            .and_then(|val| val.as_i64())
                            .map(ModelValue::Int),
                        (SmtSort::Bool, Z3Term::Bool(v)) => z3_model
                            .eval::<Bool>(v, true)
                            .and_then(|val| val.as_bool())
                            .map(ModelValue::Bool),
                        (SmtSort::Real, Z3Term::Real(v)) => z3_model
                            .eval::<Real>(v, true)
                            .and_then(|val| Rational::from_smtlib(&val.to_string()))
                            .map(ModelValue::Real),
                        _ => return Err(Z3Error::SortMismatch(name.to_string())),
                    };
                    if let Some(value) = value {
                        values.insert(name.to_string(), value);
                    }
                }

                Ok((SatResult::Sat, Some(Model { values })))
            }
            Z3SatResult::Unsat => Ok((SatResult::Unsat, None)),
            Z3SatResult::Unknown => Ok((SatResult::Unknown(self.unknown_reason()), None)),
        }
    }

    fn reset(&mut self) -> Result<(), Z3Error> {
        self.solver.reset();
        // Z3 may drop per-solver parameters on reset.
        if let Some(params) = &self.params {
            self.solver.set_params(params);
        }
        self.vars.clear();
        Ok(())
    }
}
