//! Type representation for contracts.
//!
//! Defines the closed `Type` enum the wrap engine dispatches on, its
//! smart constructors, the canonical description rendering, and the
//! shallow compatibility check used before two types are paired up.
//!
//! Types are immutable and cheap to clone: every compound node sits
//! behind an `Rc`, so one type value can guard any number of values.

use std::fmt;
use std::rc::Rc;

use blame_common::ConfigError;
use blame_value::{SealStore, Value};

use crate::lazy::LazyType;

/// A base-type membership test.
pub type Predicate = dyn Fn(&Value) -> bool;

/// A named primitive type checked by a predicate.
///
/// Identity is the name: two base types with the same name are the same
/// type for compatibility purposes.
pub struct BaseType {
    name: String,
    predicate: Box<Predicate>,
}

impl BaseType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accepts(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }
}

/// A function contract.
#[derive(Clone)]
pub struct FunctionType {
    pub required: Vec<Type>,
    pub optional: Vec<Type>,
    /// Type of every argument past the required and optional ones.
    pub rest: Option<Type>,
    pub ret: Type,
    /// Shape of the instance when the function is used as a constructor.
    pub construct: Type,
}

impl FunctionType {
    pub fn new(required: Vec<Type>, ret: Type) -> Self {
        FunctionType {
            required,
            optional: Vec::new(),
            rest: None,
            ret,
            construct: Type::Any,
        }
    }

    pub fn with_optional(mut self, optional: Vec<Type>) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_rest(mut self, rest: Type) -> Self {
        self.rest = Some(rest);
        self
    }

    pub fn with_construct(mut self, construct: Type) -> Self {
        self.construct = construct;
        self
    }

    /// Fewest arguments a call may pass.
    pub fn min_args(&self) -> usize {
        self.required.len()
    }

    /// Most arguments a call may pass; `None` with a rest parameter.
    pub fn max_args(&self) -> Option<usize> {
        match self.rest {
            Some(_) => None,
            None => Some(self.required.len() + self.optional.len()),
        }
    }

    /// Declared type of the argument at `index`.
    pub fn param(&self, index: usize) -> Option<&Type> {
        let optional_start = self.required.len();
        let rest_start = optional_start + self.optional.len();
        if index < optional_start {
            Some(&self.required[index])
        } else if index < rest_start {
            Some(&self.optional[index - optional_start])
        } else {
            self.rest.as_ref()
        }
    }
}

/// An open object contract: listed fields are checked, others pass.
pub struct ObjectType {
    fields: Vec<(String, Type)>,
}

impl ObjectType {
    pub fn fields(&self) -> &[(String, Type)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Type> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }
}

/// `forall var. body`.
pub struct ForallType {
    pub var: String,
    pub body: Type,
}

impl ForallType {
    /// The body with `with` substituted for the bound variable.
    pub fn instantiate(&self, with: &Type) -> Type {
        self.body.substitute(&self.var, with)
    }
}

/// A type variable instantiated for one call of a polymorphic function.
///
/// Carries the sealing store of that instantiation. Two bound variables
/// are the same only if they share the store.
#[derive(Clone, Debug)]
pub struct BoundVar {
    name: Rc<str>,
    store: Rc<SealStore>,
}

impl BoundVar {
    /// A fresh instantiation of `name` with its own store. Used by the
    /// wrap engine when a forall-guarded function is invoked.
    pub fn fresh(name: &str) -> Self {
        BoundVar {
            name: Rc::from(name),
            store: Rc::new(SealStore::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &SealStore {
        &self.store
    }

    pub fn same(&self, other: &BoundVar) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }
}

/// A contract type.
#[derive(Clone)]
pub enum Type {
    /// Accepts everything; the opaque side of a sealed value.
    Any,
    Base(Rc<BaseType>),
    Function(Rc<FunctionType>),
    Object(Rc<ObjectType>),
    Array(Rc<Type>),
    /// Every key maps to the given type.
    Dict(Rc<Type>),
    /// Both sides at once, e.g. an array with extra properties.
    Hybrid(Rc<Type>, Rc<Type>),
    Union(Rc<[Type]>),
    Forall(Rc<ForallType>),
    /// A free occurrence of a forall-bound variable.
    Var(Rc<str>),
    Bound(BoundVar),
    /// Indirection handed out by a `LazyTypeCache`.
    Lazy(LazyType),
}

impl Type {
    /// A base type named `name` accepting the values `predicate` accepts.
    pub fn base(name: &str, predicate: impl Fn(&Value) -> bool + 'static) -> Type {
        Type::Base(Rc::new(BaseType {
            name: name.to_string(),
            predicate: Box::new(predicate),
        }))
    }

    pub fn num() -> Type {
        Type::base("Num", |v| matches!(v, Value::Num(_)))
    }

    pub fn bool() -> Type {
        Type::base("Bool", |v| matches!(v, Value::Bool(_)))
    }

    pub fn str() -> Type {
        Type::base("Str", |v| matches!(v, Value::Str(_)))
    }

    /// Only `undefined`.
    pub fn void() -> Type {
        Type::base("Void", |v| matches!(v, Value::Undefined))
    }

    pub fn null() -> Type {
        Type::base("Null", |v| matches!(v, Value::Null))
    }

    pub fn func(required: Vec<Type>, optional: Vec<Type>, rest: Option<Type>, ret: Type) -> Type {
        Type::Function(Rc::new(FunctionType {
            required,
            optional,
            rest,
            ret,
            construct: Type::Any,
        }))
    }

    /// `required -> ret`, no optional or rest parameters.
    pub fn fun(required: Vec<Type>, ret: Type) -> Type {
        Type::function(FunctionType::new(required, ret))
    }

    pub fn function(ft: FunctionType) -> Type {
        Type::Function(Rc::new(ft))
    }

    /// Object contract. A repeated field name keeps its last type, at the
    /// position of its first occurrence.
    pub fn obj<K: Into<String>>(fields: impl IntoIterator<Item = (K, Type)>) -> Type {
        let mut out: Vec<(String, Type)> = Vec::new();
        for (name, ty) in fields {
            let name = name.into();
            match out.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = ty,
                None => out.push((name, ty)),
            }
        }
        Type::Object(Rc::new(ObjectType { fields: out }))
    }

    pub fn arr(elem: Type) -> Type {
        Type::Array(Rc::new(elem))
    }

    pub fn dict(value: Type) -> Type {
        Type::Dict(Rc::new(value))
    }

    pub fn hybrid(left: Type, right: Type) -> Type {
        Type::Hybrid(Rc::new(left), Rc::new(right))
    }

    pub fn union(members: Vec<Type>) -> Result<Type, ConfigError> {
        if members.is_empty() {
            return Err(ConfigError::EmptyUnion);
        }
        Ok(Type::Union(Rc::from(members)))
    }

    /// `forall var. body`; `body` must be a function or another forall.
    pub fn forall(var: &str, body: Type) -> Result<Type, ConfigError> {
        let kind_ok = match body.resolved() {
            Some(resolved) => matches!(resolved, Type::Function(_) | Type::Forall(_)),
            None => false,
        };
        if !kind_ok {
            return Err(ConfigError::InvalidForallBody {
                var: var.to_string(),
                found: body.description(),
            });
        }
        Ok(Type::Forall(Rc::new(ForallType {
            var: var.to_string(),
            body,
        })))
    }

    pub fn tyvar(name: &str) -> Type {
        Type::Var(Rc::from(name))
    }

    /// Short kind name, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Any => "any",
            Type::Base(_) => "base",
            Type::Function(_) => "function",
            Type::Object(_) => "object",
            Type::Array(_) => "array",
            Type::Dict(_) => "dict",
            Type::Hybrid(..) => "hybrid",
            Type::Union(_) => "union",
            Type::Forall(_) => "forall",
            Type::Var(_) => "type variable",
            Type::Bound(_) => "bound type variable",
            Type::Lazy(_) => "lazy",
        }
    }

    /// Follow lazy indirections. `None` if one of them is still unresolved.
    pub fn resolved(&self) -> Option<Type> {
        let mut current = self.clone();
        // Bounded: a chain longer than this can only be a cycle of aliases.
        for _ in 0..64 {
            match current {
                Type::Lazy(lazy) => current = lazy.target()?.clone(),
                other => return Some(other),
            }
        }
        None
    }

    /// Like [`resolved`](Type::resolved), failing with the name of the
    /// unresolved lazy type.
    pub fn resolve(&self) -> Result<Type, ConfigError> {
        self.resolved().ok_or_else(|| ConfigError::UnresolvedLazyType(self.description()))
    }

    /// Canonical rendering, also available through `Display`.
    pub fn description(&self) -> String {
        self.to_string()
    }

    fn needs_parens(&self) -> bool {
        matches!(
            self,
            Type::Function(_) | Type::Forall(_) | Type::Union(_) | Type::Hybrid(..)
        )
    }
}

/// Shallow same-kind check between the asserted and the expected type.
///
/// Arrays, dicts, hybrids and unions are always compatible with their
/// own kind; their contents are reconciled lazily by the guards.
pub fn compatible(a: &Type, b: &Type) -> bool {
    let (a, b) = match (a.resolved(), b.resolved()) {
        (Some(a), Some(b)) => (a, b),
        _ => return false,
    };
    match (&a, &b) {
        (Type::Any, Type::Any) => true,
        (Type::Base(x), Type::Base(y)) => x.name == y.name,
        (Type::Function(x), Type::Function(y)) => {
            x.required.len() == y.required.len()
                && x.optional.len() == y.optional.len()
                && x.rest.is_some() == y.rest.is_some()
        }
        (Type::Forall(x), Type::Forall(y)) => x.var == y.var,
        (Type::Object(x), Type::Object(y)) => {
            x.fields.len() == y.fields.len()
                && x.fields.iter().all(|(name, _)| y.field(name).is_some())
        }
        (Type::Array(_), Type::Array(_))
        | (Type::Dict(_), Type::Dict(_))
        | (Type::Hybrid(..), Type::Hybrid(..))
        | (Type::Union(_), Type::Union(_)) => true,
        (Type::Var(x), Type::Var(y)) => x == y,
        (Type::Bound(x), Type::Bound(y)) => x.same(y),
        _ => false,
    }
}

struct Nested<'a>(&'a Type);

impl fmt::Display for Nested<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.needs_parens() {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => write!(f, "any"),
            Type::Base(b) => write!(f, "{}", b.name),
            Type::Function(ft) => {
                let mut params: Vec<String> =
                    ft.required.iter().map(|t| Nested(t).to_string()).collect();
                params.extend(ft.optional.iter().map(|t| format!("{}?", Nested(t))));
                if let Some(rest) = &ft.rest {
                    params.push(format!("{}*", Nested(rest)));
                }
                if params.is_empty() {
                    write!(f, "()")?;
                } else {
                    write!(f, "{}", params.join(", "))?;
                }
                write!(f, " -> {}", Nested(&ft.ret))?;
                if !matches!(ft.construct, Type::Any) {
                    write!(f, " new {}", Nested(&ft.construct))?;
                }
                Ok(())
            }
            Type::Object(obj) => {
                write!(f, "{{")?;
                for (i, (name, ty)) in obj.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                write!(f, "}}")
            }
            Type::Array(elem) => write!(f, "[{}]", elem),
            Type::Dict(value) => write!(f, "{{[string]: {}}}", value),
            Type::Hybrid(left, right) => write!(f, "{} & {}", Nested(left), Nested(right)),
            Type::Union(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", Nested(m))?;
                }
                Ok(())
            }
            Type::Forall(fa) => write!(f, "forall {}. {}", fa.var, fa.body),
            Type::Var(name) => write!(f, "{}", name),
            Type::Bound(bv) => write!(f, "{}", bv.name),
            Type::Lazy(lazy) => write!(f, "{}", lazy.name()),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
