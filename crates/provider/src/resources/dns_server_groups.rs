//! DNS server groups resource handler

use fmc_common::DNS_SERVER_GROUPS;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::BulkResource;
use crate::bulk::BulkItem;
use crate::state::{list_at, put_attr, set_json_at, Attr};

const OBJECT_TYPE: &str = "DNSServerGroupObject";

/// One DNS server group
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsServerGroupItem {
    pub id: Attr<String>,
    pub r#type: Attr<String>,
    pub default_domain: Attr<String>,
    /// Seconds; FMC defaults it when unset
    pub timeout: Attr<i64>,
    pub retries: Attr<i64>,
    pub dns_servers: Attr<Vec<DnsServer>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsServer {
    pub ip: Attr<String>,
}

fn servers_from(body: &Value) -> Attr<Vec<DnsServer>> {
    list_at(body, "dnsservers", |server| DnsServer {
        ip: Attr::from_json_at(server, "name-server"),
    })
}

impl BulkItem for DnsServerGroupItem {
    fn id(&self) -> Option<&str> {
        self.id.as_str()
    }

    fn to_body(&self, name: &str) -> Value {
        let mut body = json!({
            "name": name,
            "type": OBJECT_TYPE,
        });
        put_attr(&mut body, "id", &self.id);
        put_attr(&mut body, "defaultdomain", &self.default_domain);
        put_attr(&mut body, "timeout", &self.timeout);
        put_attr(&mut body, "retries", &self.retries);

        if let Some(servers) = self.dns_servers.value() {
            let servers: Vec<Value> = servers
                .iter()
                .map(|server| {
                    let mut entry = json!({});
                    put_attr(&mut entry, "name-server", &server.ip);
                    entry
                })
                .collect();
            set_json_at(&mut body, "dnsservers", Value::Array(servers));
        }

        body
    }

    fn from_body(&mut self, body: &Value) {
        self.id.read_full(body, "id");
        self.r#type.read_full(body, "type");
        self.default_domain.read_full(body, "defaultdomain");
        self.timeout.read_full(body, "timeout");
        self.retries.read_full(body, "retries");
        self.dns_servers = servers_from(body);
    }

    fn from_body_partial(&mut self, body: &Value) {
        self.id.read_partial(body, "id");
        self.r#type.read_partial(body, "type");
        self.default_domain.read_partial(body, "defaultdomain");
        self.timeout.read_partial(body, "timeout");
        self.retries.read_partial(body, "retries");
        self.dns_servers.set_partial(servers_from(body));
    }

    fn from_body_unknowns(&mut self, body: &Value) {
        self.id.read_unknown(body, "id");
        self.r#type.read_unknown(body, "type");
        self.timeout.read_unknown(body, "timeout");
        self.retries.read_unknown(body, "retries");
    }

    fn mark_computed_unknown(&mut self) {
        self.id.mark_unknown();
        self.r#type.mark_unknown();
        self.timeout.mark_unknown();
        self.retries.mark_unknown();
    }

    fn adopt_computed(&mut self, prior: &Self) {
        self.id.adopt(&prior.id);
        self.r#type.adopt(&prior.r#type);
        self.timeout.adopt(&prior.timeout);
        self.retries.adopt(&prior.retries);
    }
}

pub struct DnsServerGroups;

impl BulkResource for DnsServerGroups {
    type Item = DnsServerGroupItem;
    const TYPE_NAME: &'static str = DNS_SERVER_GROUPS;
    const PATH_SUFFIX: &'static str = "object/dnsservergroups";
}
