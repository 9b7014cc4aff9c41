//! Parameters and their scope resolution.
//!
//! Grounded on `original_source/libspider/graphs/pisdf/Param.h`: a parameter
//! is STATIC (a fixed value), DYNAMIC (set by a config actor at runtime),
//! DYNAMIC_DEPENDANT (computed from an expression over other parameters), or
//! INHERITED (aliases a parameter of an enclosing graph). The lower-case
//! normalization and the "pi is reserved" rule are kept as-is.

use crate::ids::ParamId;
use spider_expr::{Expression, ParamResolver};
use spider_types::error::{Error, Result};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub enum ParamKind {
    Static(i64),
    Dynamic,
    DynamicDependent(Expression),
    Inherited(ParamId),
}

#[derive(Debug, Clone)]
pub struct Param {
    id: ParamId,
    name: String,
    kind: ParamKind,
    /// Set once a DYNAMIC parameter's config actor has run, or for any
    /// already-resolved parameter. `None` means "not yet available".
    resolved: Option<i64>,
}

impl Param {
    pub fn new_static(id: ParamId, name: impl Into<String>, value: i64) -> Result<Self> {
        let name = normalize_name(name.into())?;
        Ok(Self {
            id,
            name,
            kind: ParamKind::Static(value),
            resolved: Some(value),
        })
    }

    pub fn new_dynamic(id: ParamId, name: impl Into<String>) -> Result<Self> {
        let name = normalize_name(name.into())?;
        Ok(Self {
            id,
            name,
            kind: ParamKind::Dynamic,
            resolved: None,
        })
    }

    pub fn new_dependent(id: ParamId, name: impl Into<String>, expr: Expression) -> Result<Self> {
        let name = normalize_name(name.into())?;
        let resolved = if expr.is_dynamic() { None } else { Some(expr.evaluate(&spider_expr::NoParams)?) };
        Ok(Self {
            id,
            name,
            kind: ParamKind::DynamicDependent(expr),
            resolved,
        })
    }

    pub fn new_inherited(id: ParamId, name: impl Into<String>, parent: ParamId) -> Result<Self> {
        let name = normalize_name(name.into())?;
        Ok(Self {
            id,
            name,
            kind: ParamKind::Inherited(parent),
            resolved: None,
        })
    }

    pub fn id(&self) -> ParamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, ParamKind::Dynamic | ParamKind::DynamicDependent(_) | ParamKind::Inherited(_))
    }

    pub fn value(&self) -> Option<i64> {
        self.resolved
    }

    /// Called by the config-actor runner once its value is produced.
    pub fn set_value(&mut self, value: i64) -> Result<()> {
        if !matches!(self.kind, ParamKind::Dynamic) {
            return Err(Error::Configuration(format!(
                "cannot set runtime value on parameter '{}': not a DYNAMIC parameter",
                self.name
            )));
        }
        self.resolved = Some(value);
        Ok(())
    }

    /// Forces `resolved`, bypassing the DYNAMIC-only check in [`Self::set_value`].
    /// Used only by the expander to carry an INHERITED parameter's value down
    /// from the enclosing graph's scope, since a subgraph's [`ParamId`]
    /// namespace is disjoint from its parent's (see [`ParamScope::resolve_inherited_from`]).
    pub(crate) fn force_set_resolved(&mut self, value: i64) {
        self.resolved = Some(value);
    }
}

fn normalize_name(name: String) -> Result<String> {
    let lower = name.to_lowercase();
    if lower == "pi" {
        return Err(Error::Validation("parameter name 'pi' is reserved as a math constant".to_string()));
    }
    Ok(lower)
}

/// A flat lookup of a graph's own parameters plus, transitively, whatever an
/// INHERITED parameter points to. Implements [`ParamResolver`] so a `Param`
/// scope can be handed straight to [`Expression::evaluate`].
#[derive(Debug, Default, Clone)]
pub struct ParamScope {
    by_name: HashMap<String, ParamId>,
    params: HashMap<ParamId, Param>,
}

impl ParamScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, param: Param) -> Result<()> {
        if self.by_name.contains_key(param.name()) {
            return Err(Error::DuplicateParameter {
                parameter: param.name().to_string(),
                graph: String::new(),
            });
        }
        self.by_name.insert(param.name().to_string(), param.id());
        self.params.insert(param.id(), param);
        Ok(())
    }

    pub fn get(&self, id: ParamId) -> Option<&Param> {
        self.params.get(&id)
    }

    pub fn get_mut(&mut self, id: ParamId) -> Option<&mut Param> {
        self.params.get_mut(&id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Param> {
        self.by_name.get(&name.to_lowercase()).and_then(|id| self.params.get(id))
    }

    /// Resolves `id`'s value, following INHERITED links and evaluating
    /// DYNAMIC_DEPENDANT expressions against this same scope.
    pub fn resolve(&self, id: ParamId) -> Result<i64> {
        let param = self
            .params
            .get(&id)
            .ok_or_else(|| Error::Validation(format!("unknown parameter id {id}")))?;
        match &param.kind {
            ParamKind::Static(v) => Ok(*v),
            ParamKind::Dynamic => param.resolved.ok_or_else(|| Error::UnresolvedParameter {
                parameter: param.name.clone(),
                context: "parameter scope resolution".to_string(),
            }),
            ParamKind::DynamicDependent(expr) => expr.evaluate(self),
            ParamKind::Inherited(parent) => self.resolve(*parent),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.values()
    }

    /// Carries every INHERITED parameter's value down from `parent`'s scope
    /// by name, since a subgraph's own [`ParamId`]s are allocated from a
    /// counter independent of its parent's and so the id a subgraph stored
    /// in `ParamKind::Inherited` cannot be looked up directly in `parent`.
    /// Called by the expander immediately before solving a subgraph's BRV
    /// (§4.2, "INHERITED... refers to a parameter of the enclosing graph").
    pub fn resolve_inherited_from(&mut self, parent: &ParamScope) -> Result<()> {
        let inherited: Vec<(ParamId, String)> = self
            .params
            .values()
            .filter(|p| matches!(p.kind, ParamKind::Inherited(_)))
            .map(|p| (p.id, p.name.clone()))
            .collect();
        for (id, name) in inherited {
            let parent_param = parent.get_by_name(&name).ok_or_else(|| Error::UnresolvedParameter {
                parameter: name.clone(),
                context: "enclosing graph has no parameter of this name to inherit".to_string(),
            })?;
            let value = parent.resolve(parent_param.id())?;
            self.params.get_mut(&id).expect("id collected from this same scope").force_set_resolved(value);
        }
        Ok(())
    }
}

impl ParamResolver for ParamScope {
    fn resolve(&self, name: &str) -> Option<f64> {
        self.get_by_name(name).and_then(|p| self.resolve(p.id()).ok()).map(|v| v as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pi_is_a_reserved_name() {
        assert!(Param::new_static(ParamId(0), "pi", 1).is_err());
        assert!(Param::new_static(ParamId(0), "Pi", 1).is_err());
    }

    #[test]
    fn names_are_lowercased() {
        let p = Param::new_static(ParamId(0), "WIDTH", 4).unwrap();
        assert_eq!(p.name(), "width");
    }

    #[test]
    fn dynamic_dependent_evaluates_against_scope() {
        let mut scope = ParamScope::new();
        scope.insert(Param::new_static(ParamId(0), "n", 4).unwrap()).unwrap();
        let expr = Expression::compile("n * 2").unwrap();
        scope.insert(Param::new_dependent(ParamId(1), "m", expr).unwrap()).unwrap();
        assert_eq!(scope.resolve(ParamId(1)).unwrap(), 8);
    }

    #[test]
    fn inherited_follows_parent_chain() {
        let mut scope = ParamScope::new();
        scope.insert(Param::new_static(ParamId(0), "n", 7).unwrap()).unwrap();
        scope.insert(Param::new_inherited(ParamId(1), "n_alias", ParamId(0)).unwrap()).unwrap();
        assert_eq!(scope.resolve(ParamId(1)).unwrap(), 7);
    }

    #[test]
    fn unresolved_dynamic_parameter_is_an_error() {
        let mut scope = ParamScope::new();
        scope.insert(Param::new_dynamic(ParamId(0), "k").unwrap()).unwrap();
        assert!(scope.resolve(ParamId(0)).is_err());
    }

    #[test]
    fn duplicate_name_in_scope_is_rejected() {
        let mut scope = ParamScope::new();
        scope.insert(Param::new_static(ParamId(0), "n", 1).unwrap()).unwrap();
        let err = scope.insert(Param::new_static(ParamId(1), "n", 2).unwrap()).unwrap_err();
        assert!(matches!(err, Error::DuplicateParameter { .. }));
    }
}
