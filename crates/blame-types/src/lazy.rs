//! Lazy type registry for recursive type definitions.
//!
//! A recursive type mentions itself before it exists. The registry hands
//! out a named indirection node for it (`get`), and later binds the name
//! (`set`); every node handed out for that name, before or after the
//! binding, resolves to the same type.
//!
//! ```text
//! let list = cache.get("List");
//! cache.set("List", Type::obj([("head", Type::num()), ("tail", union(list, null))]))?;
//! ```
//!
//! Nodes that are still unresolved when a guard needs them produce a
//! configuration error, never a contract violation.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use blame_common::ConfigError;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::ty::Type;

struct LazySlot {
    name: String,
    target: OnceCell<Type>,
}

/// An indirection node naming a (possibly not yet defined) type.
#[derive(Clone)]
pub struct LazyType(Rc<LazySlot>);

impl LazyType {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The bound type, once `set` has run.
    pub fn target(&self) -> Option<&Type> {
        self.0.target.get()
    }

    pub fn is_resolved(&self) -> bool {
        self.0.target.get().is_some()
    }
}

impl fmt::Debug for LazyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyType")
            .field("name", &self.0.name)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Registry of named lazy types.
#[derive(Default)]
pub struct LazyTypeCache {
    slots: FxHashMap<String, LazyType>,
    /// Names passed to `get`, in first-request order.
    requested: Vec<String>,
}

impl LazyTypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, name: &str) -> LazyType {
        self.slots
            .entry(name.to_string())
            .or_insert_with(|| {
                LazyType(Rc::new(LazySlot {
                    name: name.to_string(),
                    target: OnceCell::new(),
                }))
            })
            .clone()
    }

    /// An indirection node for `name`.
    pub fn get(&mut self, name: &str) -> Type {
        if !self.requested.iter().any(|n| n == name) {
            self.requested.push(name.to_string());
        }
        Type::Lazy(self.slot(name))
    }

    /// Bind `name`. Fails if it is already bound, if `ty` is an alias
    /// chain that leads back to `name` itself, or if `ty` reaches `name`
    /// through union and hybrid members only (`X = X | Null`).
    pub fn set(&mut self, name: &str, ty: Type) -> Result<(), ConfigError> {
        let slot = self.slot(name);
        if slot.is_resolved() {
            return Err(ConfigError::LazyTypeRedefined(name.to_string()));
        }
        let mut cursor = ty.clone();
        while let Type::Lazy(lazy) = cursor {
            if Rc::ptr_eq(&lazy.0, &slot.0) {
                return Err(ConfigError::UnresolvedLazyType(name.to_string()));
            }
            match lazy.target() {
                Some(next) => cursor = next.clone(),
                None => break,
            }
        }
        if reaches_unguarded(&ty, &slot, &mut FxHashSet::default()) {
            return Err(ConfigError::UnguardedRecursion(name.to_string()));
        }
        debug!(name, ty = %ty, "lazy type defined");
        slot.0
            .target
            .set(ty)
            .map_err(|_| ConfigError::LazyTypeRedefined(name.to_string()))
    }

    /// True iff every name ever requested through `get` has been bound.
    pub fn verify(&self) -> bool {
        self.pending().is_empty()
    }

    /// Requested names that are still unbound, in request order.
    pub fn pending(&self) -> Vec<&str> {
        self.requested
            .iter()
            .filter(|name| !self.slots.get(*name).is_some_and(LazyType::is_resolved))
            .map(String::as_str)
            .collect()
    }
}

/// Whether `ty` reaches `slot` without passing through a structural
/// type whose guard defers the check to a later access.
fn reaches_unguarded(ty: &Type, slot: &LazyType, seen: &mut FxHashSet<*const LazySlot>) -> bool {
    match ty {
        Type::Lazy(lazy) => {
            if Rc::ptr_eq(&lazy.0, &slot.0) {
                return true;
            }
            if !seen.insert(Rc::as_ptr(&lazy.0)) {
                return false;
            }
            lazy.target().is_some_and(|t| reaches_unguarded(t, slot, seen))
        }
        Type::Union(members) => members.iter().any(|m| reaches_unguarded(m, slot, seen)),
        Type::Hybrid(left, right) => {
            reaches_unguarded(left, slot, seen) || reaches_unguarded(right, slot, seen)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cache_verifies() {
        assert!(LazyTypeCache::new().verify());
    }

    #[test]
    fn pending_get_fails_verification() {
        let mut cache = LazyTypeCache::new();
        let _ = cache.get("X");
        assert!(!cache.verify());
        assert_eq!(cache.pending(), vec!["X"]);
    }

    #[test]
    fn set_resolves_every_node() {
        let mut cache = LazyTypeCache::new();
        let a = cache.get("X");
        let b = cache.get("X");
        cache.set("X", Type::num()).unwrap();
        let c = cache.get("X");
        assert!(cache.verify());
        for t in [a, b, c] {
            assert_eq!(t.resolve().unwrap().description(), "Num");
        }
    }

    #[test]
    fn set_without_get_is_fine() {
        let mut cache = LazyTypeCache::new();
        cache.set("Unused", Type::str()).unwrap();
        assert!(cache.verify());
    }

    #[test]
    fn redefinition_is_rejected() {
        let mut cache = LazyTypeCache::new();
        cache.set("X", Type::num()).unwrap();
        assert_eq!(
            cache.set("X", Type::str()).unwrap_err(),
            ConfigError::LazyTypeRedefined("X".into())
        );
    }

    #[test]
    fn self_alias_is_rejected() {
        let mut cache = LazyTypeCache::new();
        let x = cache.get("X");
        assert_eq!(
            cache.set("X", x).unwrap_err(),
            ConfigError::UnresolvedLazyType("X".into())
        );
        assert!(!cache.verify());
    }

    #[test]
    fn recursion_through_union_or_hybrid_is_rejected() {
        let mut cache = LazyTypeCache::new();
        let x = cache.get("X");
        let err = cache.set("X", Type::union(vec![x, Type::null()]).unwrap()).unwrap_err();
        assert_eq!(err, ConfigError::UnguardedRecursion("X".into()));

        let y = cache.get("Y");
        let err = cache.set("Y", Type::hybrid(Type::num(), y)).unwrap_err();
        assert_eq!(err, ConfigError::UnguardedRecursion("Y".into()));
        assert_eq!(cache.pending(), vec!["X", "Y"]);
    }

    #[test]
    fn recursion_closed_by_a_second_definition_is_rejected() {
        let mut cache = LazyTypeCache::new();
        let b = cache.get("B");
        cache.set("A", Type::union(vec![b, Type::null()]).unwrap()).unwrap();
        let a = cache.get("A");
        let err = cache.set("B", Type::union(vec![Type::num(), a]).unwrap()).unwrap_err();
        assert_eq!(err, ConfigError::UnguardedRecursion("B".into()));
    }

    #[test]
    fn recursion_under_a_structural_type_is_fine() {
        let mut cache = LazyTypeCache::new();
        let tree = cache.get("Tree");
        let node = Type::union(vec![Type::num(), Type::arr(tree)]).unwrap();
        cache.set("Tree", node).unwrap();
        assert!(cache.verify());
    }

    #[test]
    fn unresolved_node_fails_to_resolve() {
        let mut cache = LazyTypeCache::new();
        let x = cache.get("X");
        assert_eq!(x.resolve().unwrap_err(), ConfigError::UnresolvedLazyType("X".into()));
        assert_eq!(x.description(), "X");
    }

    #[test]
    fn recursive_type_describes_by_name() {
        let mut cache = LazyTypeCache::new();
        let list = cache.get("List");
        let ty = Type::obj([
            ("head", Type::num()),
            ("tail", Type::union(vec![list, Type::null()]).unwrap()),
        ]);
        cache.set("List", ty).unwrap();
        let list = cache.get("List");
        assert_eq!(
            list.resolve().unwrap().description(),
            "{head: Num, tail: List | Null}"
        );
    }
}
