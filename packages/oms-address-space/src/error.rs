//! Error taxonomy of the bridging layer and its mapping onto status codes.

use crate::attributes::AttributeId;
use crate::variant::StatusCode;

/// Errors surfaced by the bridging layer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("unknown node: {node}")]
    NotFound { node: String },

    #[error("attribute {attribute:?} is not valid for {node}")]
    AttributeInvalid { node: String, attribute: AttributeId },

    /// Input arguments failed the schema check; nothing was sent to the store.
    #[error("invalid arguments ({status}): {message}")]
    ArgumentInvalid { status: StatusCode, message: String },

    #[error("store rejected the operation: {message}")]
    RemoteOperationFailed { status: Option<u16>, message: String },

    #[error("store unreachable: {message}")]
    RemoteUnreachable { message: String },

    /// Every namespace index is already taken.
    #[error("no namespace index left for {uri}")]
    NamespacesExhausted { uri: String },
}

impl BridgeError {
    pub fn not_found(node: impl ToString) -> Self {
        BridgeError::NotFound {
            node: node.to_string(),
        }
    }

    pub fn argument(status: StatusCode, message: impl Into<String>) -> Self {
        BridgeError::ArgumentInvalid {
            status,
            message: message.into(),
        }
    }

    /// Status code reported to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            BridgeError::NotFound { .. } => StatusCode::BadNodeIdUnknown,
            BridgeError::AttributeInvalid { .. } => StatusCode::BadAttributeIdInvalid,
            BridgeError::ArgumentInvalid { status, .. } => *status,
            BridgeError::RemoteOperationFailed {
                status: Some(401 | 403),
                ..
            } => StatusCode::BadUserAccessDenied,
            BridgeError::RemoteOperationFailed { .. } => StatusCode::BadUnexpectedError,
            BridgeError::RemoteUnreachable { .. } => StatusCode::BadCommunicationError,
            BridgeError::NamespacesExhausted { .. } => StatusCode::BadUnexpectedError,
        }
    }
}

impl From<oms_client::Error> for BridgeError {
    fn from(error: oms_client::Error) -> Self {
        match error {
            oms_client::Error::Unreachable { message } => {
                BridgeError::RemoteUnreachable { message }
            }
            other => BridgeError::RemoteOperationFailed {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}
