//! SLA monitors resource handler

use fmc_common::SLA_MONITORS;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::BulkResource;
use crate::bulk::BulkItem;
use crate::state::{list_at, put_attr, set_json_at, Attr};

const OBJECT_TYPE: &str = "SLAMonitor";

/// One SLA monitor
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlaMonitorItem {
    pub id: Attr<String>,
    pub r#type: Attr<String>,
    pub description: Attr<String>,
    pub sla_monitor_id: Attr<i64>,
    pub monitor_address: Attr<String>,
    pub selected_interfaces: Attr<Vec<InterfaceRef>>,
    pub timeout: Attr<i64>,
    pub frequency: Attr<i64>,
    pub threshold: Attr<i64>,
    pub data_size: Attr<i64>,
    pub tos: Attr<i64>,
    pub number_of_packets: Attr<i64>,
}

/// Security zone or interface group the monitor runs on
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceRef {
    pub id: Attr<String>,
}

fn interfaces_from(body: &Value) -> Attr<Vec<InterfaceRef>> {
    list_at(body, "interfaceObjects", |object| InterfaceRef {
        id: Attr::from_json_at(object, "id"),
    })
}

/// Optional settings FMC fills in when left unset
macro_rules! computed_settings {
    ($self:ident, $method:ident, $($arg:expr),*) => {
        $self.timeout.$method($($arg,)* "timeout");
        $self.frequency.$method($($arg,)* "frequency");
        $self.threshold.$method($($arg,)* "threshold");
        $self.data_size.$method($($arg,)* "dataSize");
        $self.tos.$method($($arg,)* "tos");
        $self.number_of_packets.$method($($arg,)* "noOfPackets");
    };
}

impl BulkItem for SlaMonitorItem {
    fn id(&self) -> Option<&str> {
        self.id.as_str()
    }

    fn to_body(&self, name: &str) -> Value {
        let mut body = json!({
            "name": name,
            "type": OBJECT_TYPE,
        });
        put_attr(&mut body, "id", &self.id);
        put_attr(&mut body, "description", &self.description);
        put_attr(&mut body, "slaId", &self.sla_monitor_id);
        put_attr(&mut body, "monitorAddress", &self.monitor_address);
        put_attr(&mut body, "timeout", &self.timeout);
        put_attr(&mut body, "frequency", &self.frequency);
        put_attr(&mut body, "threshold", &self.threshold);
        put_attr(&mut body, "dataSize", &self.data_size);
        put_attr(&mut body, "tos", &self.tos);
        put_attr(&mut body, "noOfPackets", &self.number_of_packets);

        if let Some(interfaces) = self.selected_interfaces.value() {
            let objects: Vec<Value> = interfaces
                .iter()
                .map(|interface| {
                    let mut object = json!({});
                    put_attr(&mut object, "id", &interface.id);
                    object
                })
                .collect();
            set_json_at(&mut body, "interfaceObjects", Value::Array(objects));
        }

        body
    }

    fn from_body(&mut self, body: &Value) {
        self.id.read_full(body, "id");
        self.r#type.read_full(body, "type");
        self.description.read_full(body, "description");
        self.sla_monitor_id.read_full(body, "slaId");
        self.monitor_address.read_full(body, "monitorAddress");
        self.selected_interfaces = interfaces_from(body);
        computed_settings!(self, read_full, body);
    }

    fn from_body_partial(&mut self, body: &Value) {
        self.id.read_partial(body, "id");
        self.r#type.read_partial(body, "type");
        self.description.read_partial(body, "description");
        self.sla_monitor_id.read_partial(body, "slaId");
        self.monitor_address.read_partial(body, "monitorAddress");
        self.selected_interfaces.set_partial(interfaces_from(body));
        computed_settings!(self, read_partial, body);
    }

    fn from_body_unknowns(&mut self, body: &Value) {
        self.id.read_unknown(body, "id");
        self.r#type.read_unknown(body, "type");
        computed_settings!(self, read_unknown, body);
    }

    fn mark_computed_unknown(&mut self) {
        self.id.mark_unknown();
        self.r#type.mark_unknown();
        self.timeout.mark_unknown();
        self.frequency.mark_unknown();
        self.threshold.mark_unknown();
        self.data_size.mark_unknown();
        self.tos.mark_unknown();
        self.number_of_packets.mark_unknown();
    }

    fn adopt_computed(&mut self, prior: &Self) {
        self.id.adopt(&prior.id);
        self.r#type.adopt(&prior.r#type);
        self.timeout.adopt(&prior.timeout);
        self.frequency.adopt(&prior.frequency);
        self.threshold.adopt(&prior.threshold);
        self.data_size.adopt(&prior.data_size);
        self.tos.adopt(&prior.tos);
        self.number_of_packets.adopt(&prior.number_of_packets);
    }
}

pub struct SlaMonitors;

impl BulkResource for SlaMonitors {
    type Item = SlaMonitorItem;
    const TYPE_NAME: &'static str = SLA_MONITORS;
    const PATH_SUFFIX: &'static str = "object/slamonitors";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> SlaMonitorItem {
        SlaMonitorItem {
            sla_monitor_id: Attr::Known(10),
            monitor_address: Attr::known("192.0.2.1"),
            selected_interfaces: Attr::Known(vec![InterfaceRef {
                id: Attr::known("zone-1"),
            }]),
            frequency: Attr::Known(30),
            ..Default::default()
        }
    }

    #[test]
    fn test_body_uses_fmc_names() {
        let body = monitor().to_body("isp1");
        assert_eq!(
            body,
            json!({
                "name": "isp1",
                "type": "SLAMonitor",
                "slaId": 10,
                "monitorAddress": "192.0.2.1",
                "frequency": 30,
                "interfaceObjects": [{"id": "zone-1"}]
            })
        );
    }

    #[test]
    fn test_create_response_fills_defaults() {
        let mut item = monitor();
        item.mark_computed_unknown();
        item.from_body_unknowns(&json!({
            "id": "m1",
            "type": "SLAMonitor",
            "slaId": 10,
            "timeout": 5000,
            "frequency": 60,
            "threshold": 5000,
            "dataSize": 28,
            "tos": 0,
            "noOfPackets": 1
        }));

        assert_eq!(item.id(), Some("m1"));
        assert_eq!(item.timeout, Attr::Known(5000));
        assert_eq!(item.data_size, Attr::Known(28));
        assert_eq!(item.number_of_packets, Attr::Known(1));
        // configured values win over the response
        assert_eq!(item.frequency, Attr::Known(30));
        assert!(item.description.is_null());
    }

    #[test]
    fn test_full_read_parses_interfaces() {
        let mut item = SlaMonitorItem::default();
        item.from_body(&json!({
            "id": "m1",
            "slaId": "12",
            "monitorAddress": "198.51.100.7",
            "interfaceObjects": [{"id": "a", "type": "SecurityZone"}, {"id": "b"}]
        }));

        assert_eq!(item.sla_monitor_id, Attr::Known(12));
        let ids: Vec<Option<&str>> = item
            .selected_interfaces
            .value()
            .map(|list| list.iter().map(|i| i.id.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(ids, vec![Some("a"), Some("b")]);
        assert!(item.tos.is_null());
    }
}
