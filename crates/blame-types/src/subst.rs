//! Capture-avoiding substitution of type variables.

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::ty::{ForallType, FunctionType, Type};

impl Type {
    /// Replace free occurrences of `var` with `replacement`.
    ///
    /// `Any`, base types, bound variables and lazy types are left alone;
    /// lazy types always name closed top-level definitions. A forall that
    /// re-binds `var` shadows it. A forall whose own variable occurs free
    /// in `replacement` is renamed before substituting under it.
    pub fn substitute(&self, var: &str, replacement: &Type) -> Type {
        match self {
            Type::Any | Type::Base(_) | Type::Bound(_) | Type::Lazy(_) => self.clone(),
            Type::Var(name) => {
                if &**name == var {
                    replacement.clone()
                } else {
                    self.clone()
                }
            }
            Type::Function(ft) => Type::Function(Rc::new(FunctionType {
                required: ft.required.iter().map(|t| t.substitute(var, replacement)).collect(),
                optional: ft.optional.iter().map(|t| t.substitute(var, replacement)).collect(),
                rest: ft.rest.as_ref().map(|t| t.substitute(var, replacement)),
                ret: ft.ret.substitute(var, replacement),
                construct: ft.construct.substitute(var, replacement),
            })),
            Type::Object(obj) => Type::obj(
                obj.fields()
                    .iter()
                    .map(|(name, t)| (name.clone(), t.substitute(var, replacement))),
            ),
            Type::Array(elem) => Type::arr(elem.substitute(var, replacement)),
            Type::Dict(value) => Type::dict(value.substitute(var, replacement)),
            Type::Hybrid(left, right) => Type::hybrid(
                left.substitute(var, replacement),
                right.substitute(var, replacement),
            ),
            Type::Union(members) => Type::Union(
                members
                    .iter()
                    .map(|t| t.substitute(var, replacement))
                    .collect::<Vec<_>>()
                    .into(),
            ),
            Type::Forall(fa) => {
                if fa.var == var {
                    return self.clone();
                }
                let body_fv = fa.body.free_vars();
                if !body_fv.contains(var) {
                    return self.clone();
                }
                let replacement_fv = replacement.free_vars();
                let (bound, body) = if replacement_fv.contains(&fa.var) {
                    let mut fresh = format!("{}'", fa.var);
                    while body_fv.contains(&fresh)
                        || replacement_fv.contains(&fresh)
                        || fresh == var
                    {
                        fresh.push('\'');
                    }
                    let renamed = fa.body.substitute(&fa.var, &Type::tyvar(&fresh));
                    (fresh, renamed)
                } else {
                    (fa.var.clone(), fa.body.clone())
                };
                Type::Forall(Rc::new(ForallType {
                    var: bound,
                    body: body.substitute(var, replacement),
                }))
            }
        }
    }

    /// Type variables occurring free in this type.
    pub fn free_vars(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_free(&mut Vec::new(), &mut out);
        out
    }

    fn collect_free(&self, bound: &mut Vec<String>, out: &mut BTreeSet<String>) {
        match self {
            Type::Any | Type::Base(_) | Type::Bound(_) | Type::Lazy(_) => {}
            Type::Var(name) => {
                if !bound.iter().any(|b| b.as_str() == &**name) {
                    out.insert(name.to_string());
                }
            }
            Type::Function(ft) => {
                for t in ft.required.iter().chain(&ft.optional).chain(&ft.rest) {
                    t.collect_free(bound, out);
                }
                ft.ret.collect_free(bound, out);
                ft.construct.collect_free(bound, out);
            }
            Type::Object(obj) => {
                for (_, t) in obj.fields() {
                    t.collect_free(bound, out);
                }
            }
            Type::Array(t) | Type::Dict(t) => t.collect_free(bound, out),
            Type::Hybrid(left, right) => {
                left.collect_free(bound, out);
                right.collect_free(bound, out);
            }
            Type::Union(members) => {
                for t in members.iter() {
                    t.collect_free(bound, out);
                }
            }
            Type::Forall(fa) => {
                bound.push(fa.var.clone());
                fa.body.collect_free(bound, out);
                bound.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::BoundVar;

    fn x() -> Type {
        Type::tyvar("X")
    }

    #[test]
    fn substitutes_through_every_container() {
        let t = Type::obj([
            ("f", Type::fun(vec![x()], Type::arr(x()))),
            ("d", Type::dict(Type::hybrid(x(), Type::num()))),
            ("u", Type::union(vec![x(), Type::str()]).unwrap()),
        ]);
        let s = t.substitute("X", &Type::bool());
        assert_eq!(
            s.description(),
            "{f: Bool -> [Bool], d: {[string]: Bool & Num}, u: Bool | Str}"
        );
        assert!(s.free_vars().is_empty());
    }

    #[test]
    fn other_variables_are_untouched() {
        let t = Type::fun(vec![x()], Type::tyvar("Y"));
        assert_eq!(t.substitute("X", &Type::num()).description(), "Num -> Y");
    }

    #[test]
    fn shadowing_forall_is_left_alone() {
        let inner = Type::forall("X", Type::fun(vec![x()], x())).unwrap();
        let t = Type::fun(vec![x()], inner);
        assert_eq!(
            t.substitute("X", &Type::num()).description(),
            "Num -> (forall X. X -> X)"
        );
    }

    #[test]
    fn capture_is_avoided_by_renaming() {
        // forall Y. X -> Y  with X := Y  must not capture the free Y.
        let t = Type::forall("Y", Type::fun(vec![x()], Type::tyvar("Y"))).unwrap();
        let s = t.substitute("X", &Type::tyvar("Y"));
        assert_eq!(s.description(), "forall Y'. Y -> Y'");
        assert_eq!(s.free_vars().into_iter().collect::<Vec<_>>(), vec!["Y".to_string()]);
    }

    #[test]
    fn bound_variables_and_bases_are_opaque() {
        let bv = Type::Bound(BoundVar::fresh("X"));
        let t = Type::fun(vec![bv.clone(), Type::num()], x());
        let s = t.substitute("X", &Type::Any);
        assert_eq!(s.description(), "X, Num -> any");
        assert!(s.free_vars().is_empty());
    }

    #[test]
    fn free_vars_respect_binders() {
        let t = Type::fun(
            vec![Type::forall("X", Type::fun(vec![x()], Type::tyvar("Z"))).unwrap()],
            x(),
        );
        let fv: Vec<String> = t.free_vars().into_iter().collect();
        assert_eq!(fv, vec!["X".to_string(), "Z".to_string()]);
    }
}
