//! Fixed-schema device events
//!
//! Some events arrive with a well-known numeric key and a fixed JSON layout:
//! `{"timestamp": <ms>, "data": [row, ...]}`. Each row maps to one metric
//! point with tags and fields taken from named row attributes.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::error::TelemetryError;
use crate::domain::metrics::{FieldSet, MetricPoint, TagSet};

/// Interface statistics event
pub const IFM_DATA_KEY: u32 = 0x1002_0001;

/// Envelope shared by all fixed-schema events
#[derive(Debug, Deserialize)]
pub struct EventEnvelope<T> {
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// A row type that projects itself into tags and fields.
pub trait EventRow: DeserializeOwned {
    const MEASUREMENT: &'static str;

    fn tags(&self) -> TagSet;

    fn fields(&self) -> FieldSet;
}

/// Decoder entry in the static schema table.
#[derive(Clone, Copy)]
pub struct EventSchema {
    pub key: u32,
    pub name: &'static str,
    decode: fn(&[u8], i64) -> Result<Vec<MetricPoint>, TelemetryError>,
}

impl EventSchema {
    fn of<R: EventRow>(key: u32, name: &'static str) -> Self {
        Self {
            key,
            name,
            decode: decode_rows::<R>,
        }
    }

    /// Decode a body into one point per row, all stamped with `timestamp_ns`.
    pub fn decode(&self, body: &[u8], timestamp_ns: i64) -> Result<Vec<MetricPoint>, TelemetryError> {
        (self.decode)(body, timestamp_ns)
    }
}

impl std::fmt::Debug for EventSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSchema")
            .field("key", &format_args!("{:#010x}", self.key))
            .field("name", &self.name)
            .finish()
    }
}

static SCHEMAS: LazyLock<HashMap<u32, EventSchema>> = LazyLock::new(|| {
    [EventSchema::of::<IfmData>(IFM_DATA_KEY, "ifm_interface_stats")]
        .into_iter()
        .map(|schema| (schema.key, schema))
        .collect()
});

/// Look up the schema registered for an event key.
pub fn lookup(key: u32) -> Option<&'static EventSchema> {
    SCHEMAS.get(&key)
}

fn decode_rows<R: EventRow>(body: &[u8], timestamp_ns: i64) -> Result<Vec<MetricPoint>, TelemetryError> {
    let envelope: EventEnvelope<R> = serde_json::from_slice(body)?;
    envelope
        .data
        .iter()
        .map(|row| MetricPoint::new(R::MEASUREMENT, row.tags(), row.fields(), timestamp_ns))
        .collect()
}

/// Per-port interface counters reported by the device's IFM module.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IfmData {
    pub port_timestamp: i64,
    pub ifx: i64,
    pub port_name: String,
    pub inp_error_pkts: i64,
    pub outp_error_pkts: i64,
    pub inp_drop_pkts: i64,
    pub outp_drop_pkts: i64,
    pub inp_ucast_pkts: i64,
    pub outp_ucast_pkts: i64,
    pub if_in_octets: i64,
    pub if_out_octets: i64,
    pub total_discard_pkts: i64,
    pub rx_aver_rate: i64,
    pub rx_aver_pkt_rate: i64,
    pub tx_aver_rate: i64,
    pub tx_aver_pkt_rate: i64,
    pub if_in_octets_kb: i64,
    pub if_out_octets_kb: i64,
    pub inp_pkts: i64,
    pub outp_pkts: i64,
    pub outp_multi_pkts: i64,
    pub outp_broad_pkts: i64,
    pub inp_multi_pkts: i64,
    pub inp_broad_pkts: i64,
    pub inp_crcerror_pkts: i64,
    pub inp_nucast_pkts: i64,
    pub outp_nucast_pkts: i64,
    pub inp_nobuffer_pkts: i64,
    pub outp_nobuffer_pkts: i64,
    pub inp_discard_pkts: i64,
    pub outp_discard_pkts: i64,
    pub inp_pause_pkts: i64,
    pub outp_pause_pkts: i64,
    pub inp_oversize_pkts: i64,
    pub inp_jabber_pkts: i64,
    pub inp_fragment_pkts: i64,
    pub inp_undersize_pkts: i64,
    pub inp_jumbo_pkts: i64,
    pub outp_jumbo_pkts: i64,
    pub inp_nobuffer_pkts_delta: i64,
    pub outp_nobuffer_pkts_delta: i64,
}

impl EventRow for IfmData {
    const MEASUREMENT: &'static str = "ifm_interface";

    fn tags(&self) -> TagSet {
        TagSet::from([
            ("ifx".to_string(), self.ifx.to_string()),
            ("port_name".to_string(), self.port_name.clone()),
        ])
    }

    fn fields(&self) -> FieldSet {
        [
            ("outp_drop_pkts", self.outp_drop_pkts),
            ("inp_drop_pkts", self.inp_drop_pkts),
            ("inp_error_pkts", self.inp_error_pkts),
            ("outp_error_pkts", self.outp_error_pkts),
            ("inp_ucast_pkts", self.inp_ucast_pkts),
            ("outp_ucast_pkts", self.outp_ucast_pkts),
            ("if_in_octets", self.if_in_octets),
            ("if_out_octets", self.if_out_octets),
            ("total_discard_pkts", self.total_discard_pkts),
            ("rx_aver_rate", self.rx_aver_rate),
            ("rx_aver_pkt_rate", self.rx_aver_pkt_rate),
            ("tx_aver_rate", self.tx_aver_rate),
            ("tx_aver_pkt_rate", self.tx_aver_pkt_rate),
            ("if_in_octets_kb", self.if_in_octets_kb),
            ("if_out_octets_kb", self.if_out_octets_kb),
            ("inp_pkts", self.inp_pkts),
            ("outp_pkts", self.outp_pkts),
            ("outp_multi_pkts", self.outp_multi_pkts),
            ("outp_broad_pkts", self.outp_broad_pkts),
            ("inp_multi_pkts", self.inp_multi_pkts),
            ("inp_broad_pkts", self.inp_broad_pkts),
            ("inp_crcerror_pkts", self.inp_crcerror_pkts),
            ("inp_nucast_pkts", self.inp_nucast_pkts),
            ("outp_nucast_pkts", self.outp_nucast_pkts),
            ("inp_nobuffer_pkts", self.inp_nobuffer_pkts),
            ("outp_nobuffer_pkts", self.outp_nobuffer_pkts),
            ("inp_discard_pkts", self.inp_discard_pkts),
            ("outp_discard_pkts", self.outp_discard_pkts),
            ("inp_pause_pkts", self.inp_pause_pkts),
            ("outp_pause_pkts", self.outp_pause_pkts),
            ("inp_oversize_pkts", self.inp_oversize_pkts),
            ("inp_jabber_pkts", self.inp_jabber_pkts),
            ("inp_fragment_pkts", self.inp_fragment_pkts),
            ("inp_undersize_pkts", self.inp_undersize_pkts),
            ("inp_jumbo_pkts", self.inp_jumbo_pkts),
            ("outp_jumbo_pkts", self.outp_jumbo_pkts),
            ("inp_nobuffer_pkts_delta", self.inp_nobuffer_pkts_delta),
            ("outp_nobuffer_pkts_delta", self.outp_nobuffer_pkts_delta),
        ]
        .into_iter()
        .collect()
    }
}
