use std::rc::Rc;

use blame_common::{BlameError, Key, Label};
use blame_types::{BoundVar, ForallType, FunctionType, Type};
use blame_value::{Class, Object, ObjectRef, Value};
use tracing::debug;

use crate::wrap::{blame, wrap};

/// Guard for `Function`/`Function` contracts.
///
/// Arguments travel from the consumer to the producer, so they are
/// checked against `b`'s parameters with the labels swapped and the
/// domain step flipping polarity. Results travel the other way.
pub struct FunctionGuard {
    target: ObjectRef,
    p: Label,
    q: Label,
    a: Rc<FunctionType>,
    b: Rc<FunctionType>,
}

impl FunctionGuard {
    pub fn new(
        target: ObjectRef,
        p: &Label,
        q: &Label,
        a: &Rc<FunctionType>,
        b: &Rc<FunctionType>,
    ) -> ObjectRef {
        Rc::new(FunctionGuard {
            target,
            p: p.clone(),
            q: q.clone(),
            a: a.clone(),
            b: b.clone(),
        })
    }

    fn check_arity(&self, count: usize) -> Result<(), BlameError> {
        let min = self.b.min_args();
        let max = self.b.max_args();
        if count < min {
            let qualifier = if max == Some(min) { "" } else { "at least " };
            return Err(blame(
                &self.q.dom(),
                format!("not enough arguments: expected {qualifier}{min}, got {count}"),
            ));
        }
        if let Some(max) = max {
            if count > max {
                let qualifier = if max == min { "" } else { "at most " };
                return Err(blame(
                    &self.q.dom(),
                    format!("too many arguments: expected {qualifier}{max}, got {count}"),
                ));
            }
        }
        Ok(())
    }

    fn wrap_args(&self, args: Vec<Value>) -> Result<Vec<Value>, BlameError> {
        self.check_arity(args.len())?;
        args.into_iter()
            .enumerate()
            .map(|(i, arg)| match (self.b.param(i), self.a.param(i)) {
                (Some(tb), Some(ta)) => wrap(arg, &self.q.dom_at(i), &self.p.dom_at(i), tb, ta),
                _ => Ok(arg),
            })
            .collect()
    }
}

impl Object for FunctionGuard {
    fn class(&self) -> Class {
        self.target.class()
    }

    fn name(&self) -> Option<String> {
        self.target.name()
    }

    fn get(&self, key: &Key) -> Result<Value, BlameError> {
        self.target.get(key)
    }

    fn set(&self, key: &Key, value: Value) -> Result<(), BlameError> {
        self.target.set(key, value)
    }

    fn has(&self, key: &Key) -> bool {
        self.target.has(key)
    }

    fn keys(&self) -> Vec<Key> {
        self.target.keys()
    }

    fn call(&self, this: Value, args: Vec<Value>) -> Result<Value, BlameError> {
        let args = self.wrap_args(args)?;
        let result = self.target.call(this, args)?;
        wrap(result, &self.p.rng(), &self.q.rng(), &self.a.ret, &self.b.ret)
    }

    fn construct_with(&self, this: Value, args: Vec<Value>) -> Result<Value, BlameError> {
        let args = self.wrap_args(args)?;
        let receiver = wrap(this, &self.q.rng(), &self.p.rng(), &self.b.construct, &self.a.construct)?;
        let produced = self.target.construct_with(receiver, args)?;
        wrap(produced, &self.p.rng(), &self.q.rng(), &self.a.construct, &self.b.construct)
    }
}

/// Guard for `Forall`/`Forall` contracts.
///
/// Holds no store of its own: every invocation instantiates the bound
/// variable afresh, sealing on the way in and unsealing on the way out,
/// so a value sealed by one call cannot be unsealed by another.
pub struct ForallGuard {
    target: ObjectRef,
    p: Label,
    q: Label,
    a: Rc<ForallType>,
    b: Rc<ForallType>,
}

impl ForallGuard {
    pub fn new(
        target: ObjectRef,
        p: &Label,
        q: &Label,
        a: &Rc<ForallType>,
        b: &Rc<ForallType>,
    ) -> ObjectRef {
        Rc::new(ForallGuard {
            target,
            p: p.clone(),
            q: q.clone(),
            a: a.clone(),
            b: b.clone(),
        })
    }

    /// The target guarded by this invocation's instantiation.
    fn instantiate(&self) -> Result<Value, BlameError> {
        let bound = BoundVar::fresh(&self.a.var);
        debug!(var = bound.name(), store = bound.store().id(), "forall instantiated");
        let a = self.a.instantiate(&Type::Bound(bound));
        let b = self.b.instantiate(&Type::Any);
        wrap(Value::Object(self.target.clone()), &self.p, &self.q, &a, &b)
    }
}

impl Object for ForallGuard {
    fn class(&self) -> Class {
        self.target.class()
    }

    fn name(&self) -> Option<String> {
        self.target.name()
    }

    fn get(&self, key: &Key) -> Result<Value, BlameError> {
        self.target.get(key)
    }

    fn set(&self, key: &Key, value: Value) -> Result<(), BlameError> {
        self.target.set(key, value)
    }

    fn has(&self, key: &Key) -> bool {
        self.target.has(key)
    }

    fn keys(&self) -> Vec<Key> {
        self.target.keys()
    }

    fn call(&self, this: Value, args: Vec<Value>) -> Result<Value, BlameError> {
        self.instantiate()?.call_with(this, args)
    }

    fn construct_with(&self, this: Value, args: Vec<Value>) -> Result<Value, BlameError> {
        self.instantiate()?.construct_with(this, args)
    }
}
