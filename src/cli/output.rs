//! Output formatting for CLI tools.
//!
//! Supports human-readable, JSON, and raw output formats.

use crate::cli::args::OutputFormat;
use crate::cli::hints;
use crate::{Oid, Value, VarBind, Version};
use serde::Serialize;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::time::Duration;

/// Operation shown in verbose output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    GetNext,
    Walk,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::GetNext => write!(f, "GETNEXT"),
            Self::Walk => write!(f, "WALK (GETNEXT)"),
        }
    }
}

/// Request metadata for verbose output. The community is deliberately absent.
#[derive(Debug)]
pub struct RequestInfo<'a> {
    pub target: SocketAddr,
    pub version: Version,
    pub retries: u32,
    pub timeout: Duration,
    pub operation: Operation,
    pub oids: &'a [Oid],
}

/// Write verbose request header to stderr.
pub fn write_verbose_request(info: &RequestInfo<'_>) {
    let mut stderr = io::stderr().lock();
    let _ = write_request(&mut stderr, info);
}

fn write_request<W: Write>(w: &mut W, info: &RequestInfo<'_>) -> io::Result<()> {
    writeln!(w, "--- Request ---")?;
    writeln!(w, "Target:    {}", info.target)?;
    writeln!(w, "Version:   {}", info.version)?;
    writeln!(w, "Operation: {}", info.operation)?;
    writeln!(
        w,
        "Policy:    timeout {:?}, {} retries",
        info.timeout, info.retries
    )?;
    writeln!(w, "OIDs:      {} total", info.oids.len())?;
    for oid in info.oids {
        match hints::lookup(oid) {
            Some(h) => writeln!(w, "  {} ({})", oid, h)?,
            None => writeln!(w, "  {}", oid)?,
        }
    }
    writeln!(w)
}

/// Write verbose response summary to stderr.
pub fn write_verbose_response(varbinds: &[VarBind], elapsed: Duration, show_hints: bool) {
    let mut stderr = io::stderr().lock();
    let _ = write_response(&mut stderr, varbinds, elapsed, show_hints);
}

fn write_response<W: Write>(
    w: &mut W,
    varbinds: &[VarBind],
    elapsed: Duration,
    show_hints: bool,
) -> io::Result<()> {
    writeln!(w, "--- Response ---")?;
    writeln!(w, "Results:   {} varbind(s)", varbinds.len())?;
    writeln!(w, "Time:      {:.2}ms", elapsed.as_secs_f64() * 1000.0)?;
    writeln!(w)?;

    for vb in varbinds {
        match hints::lookup(&vb.oid).filter(|_| show_hints) {
            Some(h) => writeln!(w, "  {} ({})", vb.oid, h)?,
            None => writeln!(w, "  {}", vb.oid)?,
        }
        writeln!(w, "    Type:    {}", vb.value.type_tag())?;
        writeln!(w, "    Value:   {}", vb.value)?;
        if let Some(bytes) = vb.value.as_bytes() {
            writeln!(w, "    Raw:     {}", format_hex_string(bytes))?;
            writeln!(w, "    Size:    {} bytes", bytes.len())?;
        }
    }
    Ok(())
}

/// Result of a GET/WALK operation, ready for output.
#[derive(Debug, Serialize)]
pub struct OperationResult {
    pub target: String,
    pub version: String,
    pub results: Vec<VarBindResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing_ms: Option<f64>,
}

/// A single varbind result.
#[derive(Debug, Serialize)]
pub struct VarBindResult {
    pub oid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: serde_json::Value,
    /// Display text when it differs from `value`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

/// Output context for formatting.
pub struct OutputContext {
    pub format: OutputFormat,
    pub show_hints: bool,
    pub force_hex: bool,
    pub show_timing: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            show_hints: true,
            force_hex: false,
            show_timing: false,
        }
    }

    /// Write operation results to stdout.
    pub fn write_results(
        &self,
        target: SocketAddr,
        version: Version,
        varbinds: &[VarBind],
        elapsed: Option<Duration>,
    ) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        self.write_to(&mut stdout, target, version, varbinds, elapsed)
    }

    pub fn write_to<W: Write>(
        &self,
        w: &mut W,
        target: SocketAddr,
        version: Version,
        varbinds: &[VarBind],
        elapsed: Option<Duration>,
    ) -> io::Result<()> {
        let result = OperationResult {
            target: target.to_string(),
            version: version.to_string(),
            results: varbinds.iter().map(|vb| self.format_varbind(vb)).collect(),
            timing_ms: elapsed.map(|d| d.as_secs_f64() * 1000.0),
        };

        match self.format {
            OutputFormat::Human => self.write_human(w, &result),
            OutputFormat::Json => write_json(w, &result),
            OutputFormat::Raw => write_raw(w, &result),
        }
    }

    fn format_varbind(&self, vb: &VarBind) -> VarBindResult {
        let hint = if self.show_hints {
            hints::lookup(&vb.oid).map(String::from)
        } else {
            None
        };
        let (value, formatted) = format_value(&vb.value, self.force_hex);
        VarBindResult {
            oid: vb.oid.to_string(),
            hint,
            value_type: format_type(&vb.value, self.force_hex),
            value,
            formatted,
        }
    }

    fn write_human<W: Write>(&self, w: &mut W, result: &OperationResult) -> io::Result<()> {
        for vb in &result.results {
            match &vb.hint {
                Some(hint) => write!(w, "{} ({})", vb.oid, hint)?,
                None => write!(w, "{}", vb.oid)?,
            }
            write!(w, " = {}: ", vb.value_type)?;

            if let Some(formatted) = &vb.formatted {
                writeln!(w, "{}", formatted)?;
            } else {
                match &vb.value {
                    serde_json::Value::String(s) => writeln!(w, "\"{}\"", s)?,
                    serde_json::Value::Null => writeln!(w)?,
                    other => writeln!(w, "{}", other)?,
                }
            }
        }

        if self.show_timing
            && let Some(ms) = result.timing_ms
        {
            writeln!(w, "\nTiming: {:.1}ms", ms)?;
        }
        Ok(())
    }
}

fn write_json<W: Write>(w: &mut W, result: &OperationResult) -> io::Result<()> {
    let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
    writeln!(w, "{}", json)
}

fn write_raw<W: Write>(w: &mut W, result: &OperationResult) -> io::Result<()> {
    for vb in &result.results {
        let value = match &vb.value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => vb.formatted.clone().unwrap_or_default(),
            other => other.to_string(),
        };
        writeln!(w, "{}\t{}", vb.oid, value)?;
    }
    Ok(())
}

fn format_type(value: &Value, force_hex: bool) -> String {
    match value {
        Value::OctetString(bytes) if force_hex || !is_printable(bytes) => "Hex-STRING".into(),
        other => other.type_tag().name().into(),
    }
}

/// JSON value plus optional display text.
fn format_value(value: &Value, force_hex: bool) -> (serde_json::Value, Option<String>) {
    use serde_json::Value as Json;

    match value {
        Value::Integer(v) => ((*v).into(), None),
        Value::OctetString(bytes) => {
            if force_hex || !is_printable(bytes) {
                (Json::String(hex_string(bytes)), Some(format_hex_string(bytes)))
            } else {
                (Json::String(String::from_utf8_lossy(bytes).into_owned()), None)
            }
        }
        Value::BitString(bytes) | Value::Opaque(bytes) => {
            (Json::String(hex_string(bytes)), Some(format_hex_string(bytes)))
        }
        Value::Null => (Json::Null, None),
        Value::ObjectIdentifier(oid) => {
            let formatted = hints::lookup(oid).map(|h| format!("{} ({})", oid, h));
            (Json::String(oid.to_string()), formatted)
        }
        Value::IpAddress(_) => (Json::String(value.to_string()), None),
        Value::Counter32(v) | Value::Gauge32(v) | Value::Unsigned32(v) => ((*v).into(), None),
        Value::TimeTicks(v) => ((*v).into(), Some(format!("({}) {}", v, format_timeticks(*v)))),
        Value::Counter64(v) | Value::OpaqueCounter64(v) | Value::OpaqueU64(v) => {
            ((*v).into(), None)
        }
        Value::OpaqueI64(v) => ((*v).into(), None),
        Value::OpaqueFloat(v) => (Json::from(f64::from(*v)), Some(v.to_string())),
        Value::OpaqueDouble(v) => (Json::from(*v), Some(v.to_string())),
        Value::NoSuchObject => (Json::Null, Some("No Such Object available".into())),
        Value::NoSuchInstance => (Json::Null, Some("No Such Instance currently exists".into())),
        Value::EndOfMibView => (
            Json::Null,
            Some("No more variables left in this MIB View".into()),
        ),
    }
}

/// Check if bytes are printable ASCII/UTF-8.
fn is_printable(bytes: &[u8]) -> bool {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.chars().all(|c| !c.is_control() || c.is_ascii_whitespace()),
        Err(_) => false,
    }
}

fn hex_string(bytes: &[u8]) -> String {
    crate::util::hex_encode(bytes)
}

/// Format bytes as spaced hex for display.
fn format_hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format TimeTicks as human-readable duration.
fn format_timeticks(centiseconds: u32) -> String {
    let total_seconds = centiseconds / 100;
    let cs = centiseconds % 100;

    let days = total_seconds / 86400;
    let hours = (total_seconds % 86400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if days > 0 {
        format!(
            "{}d {:02}:{:02}:{:02}.{:02}",
            days, hours, minutes, seconds, cs
        )
    } else {
        format!("{:02}:{:02}:{:02}.{:02}", hours, minutes, seconds, cs)
    }
}

/// Write an error message to stderr.
pub fn write_error(err: &crate::Error) {
    eprintln!("Error: {}", err);
}
