//! Command-line arguments shared by the `snmp-*` tools.

use clap::{Parser, ValueEnum};
use std::time::Duration;

use crate::session::{DEFAULT_PORT, SessionConfig};
use crate::Version;

/// SNMP version for CLI argument parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SnmpVersion {
    /// SNMPv1
    #[value(name = "1")]
    V1,
    /// SNMPv2c (default)
    #[default]
    #[value(name = "2c")]
    V2c,
}

impl From<SnmpVersion> for Version {
    fn from(v: SnmpVersion) -> Self {
        match v {
            SnmpVersion::V1 => Version::V1,
            SnmpVersion::V2c => Version::V2c,
        }
    }
}

/// Output format for CLI tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with type information.
    #[default]
    Human,
    /// JSON output for scripting.
    Json,
    /// Tab-separated OID and value.
    Raw,
}

/// Connection arguments.
#[derive(Debug, Parser)]
pub struct CommonArgs {
    /// Agent host, optionally with :port.
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// SNMP version: 1 or 2c.
    #[arg(short = 'v', long = "snmp-version", default_value = "2c")]
    pub snmp_version: SnmpVersion,

    /// Community string.
    #[arg(short = 'c', long = "community", default_value = "public")]
    pub community: String,

    /// Agent port, used when TARGET has none.
    #[arg(short = 'p', long = "port", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Timeout per attempt in seconds.
    #[arg(short = 't', long = "timeout", default_value = "3")]
    pub timeout: f64,

    /// Retransmissions after the first attempt.
    #[arg(short = 'r', long = "retries", default_value = "0")]
    pub retries: u32,
}

impl CommonArgs {
    /// Timeout as a `Duration`; negative or non-finite input falls back to zero.
    pub fn timeout_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout).unwrap_or(Duration::ZERO)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(
            self.target.clone(),
            self.community.as_bytes(),
            self.snmp_version.into(),
        )
        .port(self.port)
        .retries(self.retries)
        .timeout(self.timeout_duration())
    }
}

/// Output and diagnostics arguments.
#[derive(Debug, Parser)]
pub struct OutputArgs {
    /// Output format.
    #[arg(short = 'O', long = "output", default_value = "human")]
    pub format: OutputFormat,

    /// Print the request and a per-variable breakdown to stderr.
    #[arg(long = "verbose")]
    pub verbose: bool,

    /// Show OCTET STRING values as hex even when printable.
    #[arg(long = "hex")]
    pub hex: bool,

    /// Print elapsed time after the results.
    #[arg(long = "timing")]
    pub timing: bool,

    /// Do not annotate well-known OIDs with names.
    #[arg(long = "no-hints")]
    pub no_hints: bool,

    /// Debug logging to stderr.
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Trace logging to stderr (includes packet sizes).
    #[arg(short = 'D', long = "trace")]
    pub trace: bool,
}

impl OutputArgs {
    pub fn init_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = if self.trace {
            "snmp_sync=trace"
        } else if self.debug {
            "snmp_sync=debug"
        } else {
            "snmp_sync=warn"
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_writer(std::io::stderr)
            .try_init();
    }
}
