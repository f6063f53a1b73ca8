//! Method registry: maps method names to application-supplied handlers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Failure returned by a handler. The message lands verbatim in the response
/// envelope's `error` field.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HandlerError(String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type HandlerResult = Result<Value, HandlerError>;

/// Application-supplied function bound to a method name. Handlers are
/// synchronous from the dispatcher's point of view and run inside the
/// per-request task.
pub type Handler = Arc<dyn Fn(&RequestContext, Value) -> HandlerResult + Send + Sync>;

/// Per-request capability handed to handlers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Source address of the caller, as matched against the allow-list.
    pub remote_addr: String,
}

/// Name-to-handler table. Registration happens before listen in the
/// documented usage, but the read-oriented lock tolerates later additions
/// while in-flight requests look methods up concurrently.
#[derive(Default)]
pub struct MethodRegistry {
    handlers: RwLock<HashMap<String, Handler>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `method`. A later registration for the same name
    /// silently replaces the earlier one.
    pub fn register<F>(&self, method: impl Into<String>, handler: F)
    where
        F: Fn(&RequestContext, Value) -> HandlerResult + Send + Sync + 'static,
    {
        let method = method.into();
        debug!(method = %method, "register rpc method");
        self.handlers
            .write()
            .expect("registry lock poisoned")
            .insert(method, Arc::new(handler));
    }

    pub fn lookup(&self, method: &str) -> Option<Handler> {
        self.handlers
            .read()
            .expect("registry lock poisoned")
            .get(method)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ctx() -> RequestContext {
        RequestContext {
            remote_addr: "127.0.0.1".to_string(),
        }
    }

    #[test]
    fn lookup_misses_unregistered_names() {
        let registry = MethodRegistry::new();
        assert!(registry.lookup("nope").is_none());
    }

    #[test]
    fn registered_handler_is_invocable() {
        let registry = MethodRegistry::new();
        registry.register("echo", |_ctx, params| Ok(params));

        let handler = registry.lookup("echo").expect("registered");
        let result = handler(&ctx(), json!({"a": 1})).expect("handler success");
        assert_eq!(result, json!({"a": 1}));
    }

    #[test]
    fn duplicate_registration_is_last_write_wins() {
        let registry = MethodRegistry::new();
        registry.register("version", |_ctx, _params| Ok(json!(1)));
        registry.register("version", |_ctx, _params| Ok(json!(2)));

        let handler = registry.lookup("version").expect("registered");
        assert_eq!(handler(&ctx(), Value::Null).expect("success"), json!(2));
    }
}
