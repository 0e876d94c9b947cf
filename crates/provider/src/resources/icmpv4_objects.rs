//! ICMPv4 objects resource handler

use fmc_common::ICMPV4_OBJECTS;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::BulkResource;
use crate::bulk::BulkItem;
use crate::state::{put_attr, Attr};

const OBJECT_TYPE: &str = "ICMPV4Object";

/// One ICMPv4 object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Icmpv4Item {
    pub id: Attr<String>,
    pub r#type: Attr<String>,
    pub icmp_type: Attr<String>,
    pub code: Attr<i64>,
    pub description: Attr<String>,
    pub overridable: Attr<bool>,
}

impl BulkItem for Icmpv4Item {
    fn id(&self) -> Option<&str> {
        self.id.as_str()
    }

    fn to_body(&self, name: &str) -> Value {
        let mut body = json!({
            "name": name,
            "type": OBJECT_TYPE,
        });
        put_attr(&mut body, "id", &self.id);
        put_attr(&mut body, "icmpType", &self.icmp_type);
        put_attr(&mut body, "code", &self.code);
        put_attr(&mut body, "description", &self.description);
        put_attr(&mut body, "overridable", &self.overridable);
        body
    }

    fn from_body(&mut self, body: &Value) {
        self.id.read_full(body, "id");
        self.r#type.read_full(body, "type");
        self.icmp_type.read_full(body, "icmpType");
        self.code.read_full(body, "code");
        self.description.read_full(body, "description");
        self.overridable.read_full(body, "overridable");
    }

    fn from_body_partial(&mut self, body: &Value) {
        self.id.read_partial(body, "id");
        self.r#type.read_partial(body, "type");
        self.icmp_type.read_partial(body, "icmpType");
        self.code.read_partial(body, "code");
        self.description.read_partial(body, "description");
        self.overridable.read_partial(body, "overridable");
    }

    fn from_body_unknowns(&mut self, body: &Value) {
        self.id.read_unknown(body, "id");
        self.r#type.read_unknown(body, "type");
    }

    fn mark_computed_unknown(&mut self) {
        self.id.mark_unknown();
        self.r#type.mark_unknown();
    }

    fn adopt_computed(&mut self, prior: &Self) {
        self.id.adopt(&prior.id);
        self.r#type.adopt(&prior.r#type);
    }
}

pub struct Icmpv4Objects;

impl BulkResource for Icmpv4Objects {
    type Item = Icmpv4Item;
    const TYPE_NAME: &'static str = ICMPV4_OBJECTS;
    const PATH_SUFFIX: &'static str = "object/icmpv4objects";
}
