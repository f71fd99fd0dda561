//! Request/Response Envelopes
//!
//! Base payload types for service-to-service message exchange. Both
//! envelopes need the request id of the currently active context at
//! construction time; when the calling thread never established one, the
//! registry's fallback policy fabricates a context instead of failing, so
//! construction is total.

use crate::context::ContextRegistry;
use serde::{Deserialize, Serialize};

/// Base fields of an outbound service request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Correlation id of the message that caused this request.
    pre_message_id: String,
}

impl RequestEnvelope {
    /// Build against the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry(ContextRegistry::global())
    }

    /// Build against an explicit registry.
    pub fn with_registry(registry: &ContextRegistry) -> Self {
        let ctx = registry.active_or_fallback();
        RequestEnvelope {
            pre_message_id: ctx.request_id().to_string(),
        }
    }

    pub fn pre_message_id(&self) -> &str {
        &self.pre_message_id
    }

    pub fn set_pre_message_id(&mut self, id: impl Into<String>) {
        self.pre_message_id = id.into();
    }
}

impl Default for RequestEnvelope {
    fn default() -> Self {
        Self::new()
    }
}

/// Base fields of a service response; reports success until told otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Correlation id of the context answering the request.
    message_id: String,

    /// Return code, `"0"` on success.
    ret_code: String,

    /// Human-readable outcome.
    ret_msg: String,
}

impl ResponseEnvelope {
    /// Build against the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry(ContextRegistry::global())
    }

    /// Build against an explicit registry.
    pub fn with_registry(registry: &ContextRegistry) -> Self {
        let ctx = registry.active_or_fallback();
        ResponseEnvelope {
            message_id: ctx.request_id().to_string(),
            ret_code: "0".to_string(),
            ret_msg: "success".to_string(),
        }
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn set_message_id(&mut self, id: impl Into<String>) {
        self.message_id = id.into();
    }

    pub fn ret_code(&self) -> &str {
        &self.ret_code
    }

    pub fn set_ret_code(&mut self, code: impl Into<String>) {
        self.ret_code = code.into();
    }

    pub fn ret_msg(&self) -> &str {
        &self.ret_msg
    }

    pub fn set_ret_msg(&mut self, msg: impl Into<String>) {
        self.ret_msg = msg.into();
    }
}

impl Default for ResponseEnvelope {
    fn default() -> Self {
        Self::new()
    }
}
