//! In-memory REST client for unit tests

use async_trait::async_trait;
use fmc_common::{Error, FmcVersion, Result};
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::client::RestClient;

/// A recorded request
#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

type Handler = Box<dyn Fn(&Call) -> Result<Value> + Send + Sync>;

/// Records every call and answers through a handler closure
pub struct MockClient {
    version: FmcVersion,
    calls: Mutex<Vec<Call>>,
    handler: Handler,
}

impl MockClient {
    pub fn new<F>(version: FmcVersion, handler: F) -> Self
    where
        F: Fn(&Call) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            version,
            calls: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.method == method).count()
    }

    fn record(&self, method: &'static str, path: &str, body: Option<&Value>) -> Result<Value> {
        let call = Call {
            method,
            path: path.to_string(),
            body: body.cloned(),
        };
        self.calls.lock().push(call.clone());
        (self.handler)(&call)
    }
}

#[async_trait]
impl RestClient for MockClient {
    async fn get(&self, path: &str) -> Result<Value> {
        self.record("GET", path, None)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.record("POST", path, Some(body))
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.record("PUT", path, Some(body))
    }

    async fn delete(&self, path: &str) -> Result<Value> {
        self.record("DELETE", path, None)
    }

    fn version(&self) -> &FmcVersion {
        &self.version
    }

    fn domain_uuid(&self, domain: Option<&str>) -> Result<String> {
        match domain {
            None | Some("Global") => Ok("d1".to_string()),
            Some(other) => Err(Error::DomainNotFound(other.to_string())),
        }
    }
}

/// Answers creates like FMC: echo the body with `id` set to `id-<name>`
pub fn created_echo(call: &Call) -> Result<Value> {
    let with_id = |object: &Value| {
        let mut object = object.clone();
        let name = object.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
        object["id"] = json!(format!("id-{}", name));
        object
    };

    match (call.method, &call.body) {
        ("POST", Some(Value::Array(objects))) => Ok(json!({
            "items": objects.iter().map(with_id).collect::<Vec<_>>()
        })),
        ("POST", Some(object)) => Ok(with_id(object)),
        _ => Ok(json!({})),
    }
}
