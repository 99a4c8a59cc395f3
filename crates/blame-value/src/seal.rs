//! Sealing stores.
//!
//! A `SealStore` belongs to exactly one instantiation of a polymorphic
//! contract. Sealing a value parks it in the store and hands out a
//! [`Token`] that reveals nothing about it; only the same store can turn
//! the token back into the value. Tokens from another store, or plain
//! values where a token was expected, are rejected.
//!
//! Stores are reference counted by the instantiated types that mention
//! them and go away with the activation that created them.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::value::Value;

/// Counter for store identities. Never reused within a process.
static NEXT_STORE: AtomicU64 = AtomicU64::new(0);

/// An opaque handle to a sealed value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    store: u64,
    slot: u32,
}

impl Token {
    /// Identity of the store that issued this token.
    pub fn store_id(&self) -> u64 {
        self.store
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SealError {
    #[error("token was sealed by another instantiation")]
    ForeignToken,
    #[error("expected a sealed value, got {0}")]
    NotSealed(String),
}

#[derive(Debug)]
pub struct SealStore {
    id: u64,
    sealed: RefCell<Vec<Value>>,
}

impl SealStore {
    pub fn new() -> Self {
        SealStore {
            id: NEXT_STORE.fetch_add(1, Ordering::Relaxed),
            sealed: RefCell::new(Vec::new()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn seal(&self, value: Value) -> Token {
        let mut sealed = self.sealed.borrow_mut();
        sealed.push(value);
        Token {
            store: self.id,
            slot: (sealed.len() - 1) as u32,
        }
    }

    pub fn owns(&self, token: &Token) -> bool {
        token.store == self.id
    }

    /// Recover the value behind `value`, which must be a token of this store.
    pub fn unseal(&self, value: &Value) -> Result<Value, SealError> {
        let token = value
            .as_token()
            .ok_or_else(|| SealError::NotSealed(value.preview()))?;
        if !self.owns(token) {
            return Err(SealError::ForeignToken);
        }
        self.sealed
            .borrow()
            .get(token.slot as usize)
            .cloned()
            .ok_or(SealError::ForeignToken)
    }

    /// Number of values sealed so far.
    pub fn len(&self) -> usize {
        self.sealed.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sealed.borrow().is_empty()
    }
}

impl Default for SealStore {
    fn default() -> Self {
        Self::new()
    }
}
