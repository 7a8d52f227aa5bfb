use std::fmt;

use rwl_model::Op;

/// A call that reached the client and was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFailure {
    pub op: Op,
    pub message: String,
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.op, self.message)
    }
}

/// Outcome of a call made through the proxy.
///
/// Only [`Reply::Value`] carries data. The other two variants are the
/// "empty result" a scenario keeps going with.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    /// The call went through.
    Value(T),
    /// The client does not provide the operation; nothing was sent.
    Missing(Op),
    /// The operation exists but the call failed.
    Rejected(CallFailure),
}

impl<T> Reply<T> {
    /// Drops the failure detail, keeping the value if there is one.
    pub fn into_value(self) -> Option<T> {
        match self {
            Reply::Value(v) => Some(v),
            Reply::Missing(_) | Reply::Rejected(_) => None,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Reply::Value(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn is_value(&self) -> bool {
        matches!(self, Reply::Value(_))
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Reply::Missing(_))
    }

    #[inline]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Reply::Rejected(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Reply::Value(v) => Reply::Value(f(v)),
            Reply::Missing(op) => Reply::Missing(op),
            Reply::Rejected(failure) => Reply::Rejected(failure),
        }
    }
}
