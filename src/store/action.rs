//! Actions and typed action creators.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while building or reading an action payload.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Failed to encode payload for '{kind}': {source}")]
    Encode {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Payload of '{kind}' does not match the expected shape: {source}")]
    Decode {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Expected action '{expected}', got '{actual}'")]
    TypeMismatch { expected: String, actual: String },
}

/// A description of something that happened.
///
/// Actions are immutable once created: the type string and payload are only
/// reachable through accessors. Serialized form is `{"type": .., "payload": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    kind: Cow<'static, str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
}

impl Action {
    /// Create an action with no payload.
    pub fn new(kind: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
        }
    }

    /// Create an action carrying a serialized payload.
    pub fn with_payload<P: Serialize>(
        kind: impl Into<Cow<'static, str>>,
        payload: &P,
    ) -> Result<Self, ActionError> {
        let kind = kind.into();
        let payload = serde_json::to_value(payload).map_err(|source| ActionError::Encode {
            kind: kind.to_string(),
            source,
        })?;
        Ok(Self {
            kind,
            payload: Some(payload),
        })
    }

    /// The stable type string, e.g. `"[Auth] Login Start"`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Decode the payload into `P`. A missing payload decodes from `null`,
    /// so `()` and `Option<_>` payloads work for payload-less actions.
    pub fn decode<P: DeserializeOwned>(&self) -> Result<P, ActionError> {
        let value = self.payload.clone().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|source| ActionError::Decode {
            kind: self.kind.to_string(),
            source,
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind)
    }
}

/// Typed factory for one action type.
///
/// The payload type `P` fixes the payload's shape at compile time; decoding
/// through [`ActionCreator::payload_of`] checks it again at runtime.
pub struct ActionCreator<P> {
    kind: &'static str,
    _payload: PhantomData<fn() -> P>,
}

impl<P> ActionCreator<P> {
    pub const fn new(kind: &'static str) -> Self {
        Self {
            kind,
            _payload: PhantomData,
        }
    }

    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Whether `action` was produced by this creator.
    pub fn is(&self, action: &Action) -> bool {
        action.kind() == self.kind
    }
}

impl<P: Serialize> ActionCreator<P> {
    pub fn create(&self, payload: P) -> Result<Action, ActionError> {
        Action::with_payload(self.kind, &payload)
    }
}

impl<P: DeserializeOwned> ActionCreator<P> {
    /// Check the action's type and decode its payload.
    pub fn payload_of(&self, action: &Action) -> Result<P, ActionError> {
        if !self.is(action) {
            return Err(ActionError::TypeMismatch {
                expected: self.kind.to_string(),
                actual: action.kind().to_string(),
            });
        }
        action.decode()
    }
}

impl ActionCreator<()> {
    /// Create the payload-less action.
    pub fn empty(&self) -> Action {
        Action::new(self.kind)
    }
}

impl<P> Clone for ActionCreator<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for ActionCreator<P> {}

impl<P> fmt::Debug for ActionCreator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActionCreator").field(&self.kind).finish()
    }
}

/// Define an action creator for `kind` with payload type `P`.
pub const fn define_action<P>(kind: &'static str) -> ActionCreator<P> {
    ActionCreator::new(kind)
}
