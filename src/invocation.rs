//! Runtime invocation model.
//!
//! A call passes its positional arguments as [`CallArg`]s. Values bind through
//! the endpoint's parameter declarations; the two cancellation variants are
//! recognized at any position without a declaration. The executor returns a
//! [`CallOutput`] whose variant follows the endpoint's return shape.

use crate::cancel::{CancelController, CancelSignal};
use crate::error::Error;
use crate::transport::Exchange;
use serde::Serialize;
use serde_json::Value;

/// One positional argument of an endpoint call.
#[derive(Debug, Clone)]
pub enum CallArg {
    /// A bound value (path, query, header, body, override or attribute).
    Value(Value),
    /// An omitted optional argument. Skipped by every role.
    Absent,
    /// Cancellation signal forwarded to the transport.
    Signal(CancelSignal),
    /// Cancellation controller forwarded to the transport.
    Controller(CancelController),
}

impl CallArg {
    /// Serializes any value into a bound argument.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, Error> {
        Ok(Self::Value(serde_json::to_value(value)?))
    }

    /// The bound value, if this argument carries one. `null` counts as absent.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(Value::Null) | Self::Absent | Self::Signal(_) | Self::Controller(_) => None,
            Self::Value(value) => Some(value),
        }
    }
}

impl From<Value> for CallArg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for CallArg {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl From<String> for CallArg {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<i64> for CallArg {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<u64> for CallArg {
    fn from(value: u64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<bool> for CallArg {
    fn from(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }
}

impl<T: Into<Self>> From<Option<T>> for CallArg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

impl From<CancelSignal> for CallArg {
    fn from(signal: CancelSignal) -> Self {
        Self::Signal(signal)
    }
}

impl From<CancelController> for CallArg {
    fn from(controller: CancelController) -> Self {
        Self::Controller(controller)
    }
}

/// What a call returns, chosen by the endpoint's return shape.
#[derive(Debug)]
pub enum CallOutput {
    /// The value produced by the result extractor.
    Result(Value),
    /// The transport's exchange, unmodified.
    Exchange(Exchange),
}

impl CallOutput {
    #[must_use]
    pub fn into_result(self) -> Option<Value> {
        match self {
            Self::Result(value) => Some(value),
            Self::Exchange(_) => None,
        }
    }

    #[must_use]
    pub fn into_exchange(self) -> Option<Exchange> {
        match self {
            Self::Exchange(exchange) => Some(exchange),
            Self::Result(_) => None,
        }
    }
}
