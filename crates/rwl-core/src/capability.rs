//! Capability manifest of a client and the per-operation bindings derived from it.
use std::fmt;

use rwl_model::Op;

/// Set of operations a client implements.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Capabilities([bool; Op::COUNT]);

impl Capabilities {
    /// Every operation.
    pub fn all() -> Self {
        Self([true; Op::COUNT])
    }

    /// No operation at all.
    pub fn none() -> Self {
        Self([false; Op::COUNT])
    }

    /// Exactly the given operations.
    pub fn only(ops: impl IntoIterator<Item = Op>) -> Self {
        let mut caps = Self::none();
        for op in ops {
            caps.0[op.index()] = true;
        }
        caps
    }

    /// Removes `ops` from the manifest.
    pub fn without(mut self, ops: impl IntoIterator<Item = Op>) -> Self {
        for op in ops {
            self.0[op.index()] = false;
        }
        self
    }

    #[inline]
    pub fn supports(&self, op: Op) -> bool {
        self.0[op.index()]
    }

    /// Operations missing from the manifest, in declaration order.
    pub fn missing(&self) -> impl Iterator<Item = Op> + '_ {
        Op::ALL.into_iter().filter(|op| !self.supports(*op))
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(Op::ALL.iter().filter(|op| self.supports(**op)))
            .finish()
    }
}

/// What a proxy method does when called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Call the client.
    Forward,
    /// Log and return an empty reply without touching the client.
    Mock,
}

/// Per-operation binding table, resolved once from a [`Capabilities`] manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bindings([Binding; Op::COUNT]);

impl Bindings {
    pub fn resolve(caps: &Capabilities) -> Self {
        let mut table = [Binding::Mock; Op::COUNT];
        for op in Op::ALL {
            if caps.supports(op) {
                table[op.index()] = Binding::Forward;
            }
        }
        Self(table)
    }

    #[inline]
    pub fn get(&self, op: Op) -> Binding {
        self.0[op.index()]
    }

    pub fn mocked(&self) -> impl Iterator<Item = Op> + '_ {
        Op::ALL
            .into_iter()
            .filter(|op| self.get(*op) == Binding::Mock)
    }
}
