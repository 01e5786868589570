//! Line protocol encoder
//!
//! Format:
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp_ns
//! ```
//!
//! Tags are written sorted by key, fields in insertion order. Measurement,
//! tag keys, tag values and field keys share one escaping rule; string field
//! values only escape embedded double quotes.

use std::fmt::Write;

use super::point::{FieldSet, FieldValue, MetricPoint, TagSet};
use crate::domain::error::TelemetryError;

/// Literal written for values that could not be resolved to a concrete type
pub const UNRESOLVED_LITERAL: &str = "\"unknown\"";

/// Encode a single line.
pub fn encode(
    measurement: &str,
    tags: &TagSet,
    fields: &FieldSet,
    timestamp_ns: i64,
) -> Result<String, TelemetryError> {
    let mut line = String::with_capacity(64 + fields.len() * 16);
    write_line(&mut line, measurement, tags, fields, timestamp_ns)?;
    Ok(line)
}

/// Encode a point built by the adapter.
pub fn encode_point(point: &MetricPoint) -> Result<String, TelemetryError> {
    encode(
        point.measurement(),
        point.tags(),
        point.fields(),
        point.timestamp_ns(),
    )
}

/// Encode every point, one line each. Fails on the first point that cannot
/// be encoded so a batch is never sent half-built.
pub fn encode_batch(points: &[MetricPoint]) -> Result<Vec<String>, TelemetryError> {
    points.iter().map(encode_point).collect()
}

/// Join encoded lines into a sink payload.
pub fn join_lines(lines: &[String]) -> String {
    lines.join("\n")
}

/// Write one line into any `fmt::Write` surface.
pub fn write_line<W: Write>(
    out: &mut W,
    measurement: &str,
    tags: &TagSet,
    fields: &FieldSet,
    timestamp_ns: i64,
) -> Result<(), TelemetryError> {
    if fields.is_empty() {
        return Err(TelemetryError::EmptyFields {
            measurement: measurement.to_string(),
        });
    }

    write_escaped(out, measurement)?;

    // BTreeMap iterates in ascending key order
    for (key, value) in tags {
        out.write_char(',')?;
        write_escaped(out, key)?;
        out.write_char('=')?;
        write_escaped(out, value)?;
    }

    out.write_char(' ')?;

    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.write_char(',')?;
        }
        write_escaped(out, key)?;
        out.write_char('=')?;
        write_field_value(out, value)?;
    }

    write!(out, " {}", timestamp_ns)?;
    Ok(())
}

/// Escape backslash, comma, space and equals sign.
fn write_escaped<W: Write>(out: &mut W, s: &str) -> std::fmt::Result {
    for c in s.chars() {
        match c {
            '\\' => out.write_str("\\\\")?,
            ',' => out.write_str("\\,")?,
            ' ' => out.write_str("\\ ")?,
            '=' => out.write_str("\\=")?,
            _ => out.write_char(c)?,
        }
    }
    Ok(())
}

fn write_field_value<W: Write>(out: &mut W, value: &FieldValue) -> std::fmt::Result {
    match value {
        FieldValue::SignedInt64(v) => write!(out, "{}i", v),
        FieldValue::UnsignedInt64(v) => write!(out, "{}u", v),
        // Display for f64 is the shortest representation that round-trips
        FieldValue::Float64(v) if v.is_finite() => write!(out, "{}", v),
        FieldValue::Float64(_) => out.write_str(UNRESOLVED_LITERAL),
        FieldValue::Text(v) => {
            out.write_char('"')?;
            for c in v.chars() {
                if c == '"' {
                    out.write_str("\\\"")?;
                } else {
                    out.write_char(c)?;
                }
            }
            out.write_char('"')
        }
        FieldValue::Bool(v) => out.write_str(if *v { "true" } else { "false" }),
        FieldValue::Unresolved => out.write_str(UNRESOLVED_LITERAL),
    }
}
