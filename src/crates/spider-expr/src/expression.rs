//! Compiled expression with a static/dynamic fast path.
//!
//! Mirrors `original_source/.../Expression.h`: a static expression (no
//! parameter references) is reduced to a single `f64` at compile time and
//! never touches the postfix evaluator again; a dynamic expression keeps its
//! postfix program and re-evaluates it against a parameter lookup each time
//! a caller asks for a fresh value.

use crate::compiler::{compile, RpnElement};
use spider_types::error::{Error, Result};

/// Resolves a named parameter to its current numeric value. Implemented by
/// whatever owns parameter state (a PiSDF graph's scope, a firing handler)
/// so this crate stays free of any dependency on the graph data model.
pub trait ParamResolver {
    fn resolve(&self, name: &str) -> Option<f64>;
}

impl<F: Fn(&str) -> Option<f64>> ParamResolver for F {
    fn resolve(&self, name: &str) -> Option<f64> {
        self(name)
    }
}

/// An empty resolver, for compiling/evaluating expressions known to be
/// static ahead of time.
pub struct NoParams;

impl ParamResolver for NoParams {
    fn resolve(&self, _name: &str) -> Option<f64> {
        None
    }
}

#[derive(Debug, Clone)]
enum Backing {
    Static(f64),
    Dynamic(Vec<RpnElement>),
}

/// A compiled arithmetic expression, as used for edge rates, delay sizes and
/// parameter definitions throughout the graph data model.
#[derive(Debug, Clone)]
pub struct Expression {
    backing: Backing,
    source: String,
}

impl Expression {
    /// Compiles `source`. If the postfix program contains no
    /// [`RpnElement::Param`] references the expression is folded to a
    /// constant immediately, matching the original's "static expression"
    /// optimization.
    pub fn compile(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let postfix = compile(&source)?;
        let is_static = !postfix.iter().any(|e| matches!(e, RpnElement::Param(_)));
        if is_static {
            let value = evaluate_postfix(&postfix, &NoParams)?;
            Ok(Self {
                backing: Backing::Static(value),
                source,
            })
        } else {
            Ok(Self {
                backing: Backing::Dynamic(postfix),
                source,
            })
        }
    }

    /// Builds a constant expression directly, bypassing the parser.
    pub fn from_value(value: i64) -> Self {
        Self {
            backing: Backing::Static(value as f64),
            source: value.to_string(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.backing, Backing::Dynamic(_))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluates as a floating-point value.
    pub fn evaluate_f64(&self, params: &dyn ParamResolver) -> Result<f64> {
        match &self.backing {
            Backing::Static(v) => Ok(*v),
            Backing::Dynamic(postfix) => evaluate_postfix(postfix, params),
        }
    }

    /// Evaluates and truncates to an integer, the representation used for
    /// rates, repetition counts and delay sizes.
    pub fn evaluate(&self, params: &dyn ParamResolver) -> Result<i64> {
        self.evaluate_f64(params).map(|v| v as i64)
    }
}

fn evaluate_postfix(postfix: &[RpnElement], params: &dyn ParamResolver) -> Result<f64> {
    let mut stack: Vec<f64> = Vec::with_capacity(postfix.len());
    for elem in postfix {
        match elem {
            RpnElement::Value(v) => stack.push(*v),
            RpnElement::Param(name) => {
                let v = params
                    .resolve(name)
                    .ok_or_else(|| Error::UnresolvedParameter {
                        parameter: name.clone(),
                        context: "expression evaluation".to_string(),
                    })?;
                stack.push(v);
            }
            RpnElement::Neg => {
                let a = pop(&mut stack)?;
                stack.push(-a);
            }
            RpnElement::Func(f) => {
                let a = pop(&mut stack)?;
                stack.push(f.apply(a)?);
            }
            RpnElement::Op(op) => {
                let b = pop(&mut stack)?;
                let a = pop(&mut stack)?;
                stack.push(op.apply(a, b));
            }
        }
    }
    if stack.len() != 1 {
        return Err(Error::Expression(format!(
            "malformed postfix program left {} values on the stack",
            stack.len()
        )));
    }
    Ok(stack[0])
}

fn pop(stack: &mut Vec<f64>) -> Result<f64> {
    stack
        .pop()
        .ok_or_else(|| Error::Expression("operator applied to an empty stack".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapResolver(HashMap<String, f64>);

    impl ParamResolver for MapResolver {
        fn resolve(&self, name: &str) -> Option<f64> {
            self.0.get(name).copied()
        }
    }

    #[test]
    fn static_expression_folds_at_compile_time() {
        let expr = Expression::compile("2 + 3 * 4").unwrap();
        assert!(!expr.is_dynamic());
        assert_eq!(expr.evaluate(&NoParams).unwrap(), 14);
    }

    #[test]
    fn dynamic_expression_resolves_parameters() {
        let expr = Expression::compile("N * 2").unwrap();
        assert!(expr.is_dynamic());
        let mut params = HashMap::new();
        params.insert("N".to_string(), 5.0);
        let resolver = MapResolver(params);
        assert_eq!(expr.evaluate(&resolver).unwrap(), 10);
    }

    #[test]
    fn unresolved_parameter_is_an_error() {
        let expr = Expression::compile("N + 1").unwrap();
        let err = expr.evaluate(&NoParams).unwrap_err();
        assert!(matches!(err, Error::UnresolvedParameter { .. }));
    }

    #[test]
    fn from_value_is_always_static() {
        let expr = Expression::from_value(42);
        assert!(!expr.is_dynamic());
        assert_eq!(expr.evaluate(&NoParams).unwrap(), 42);
    }

    #[test]
    fn closures_implement_param_resolver() {
        let resolver = |name: &str| if name == "K" { Some(3.0) } else { None };
        let expr = Expression::compile("K * K").unwrap();
        assert_eq!(expr.evaluate(&resolver).unwrap(), 9);
    }
}
