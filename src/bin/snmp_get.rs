//! snmp-get: Retrieve SNMP OID values.
//!
//! Part of the snmp-sync CLI utilities.

use clap::Parser;
use snmp_sync::cli::args::{CommonArgs, OutputArgs};
use snmp_sync::cli::hints;
use snmp_sync::cli::output::{
    Operation, OutputContext, RequestInfo, write_error, write_verbose_request,
    write_verbose_response,
};
use snmp_sync::{OidList, Session};
use std::process::ExitCode;
use std::time::Instant;

/// Retrieve one or more SNMP OID values in a single GET request.
#[derive(Debug, Parser)]
#[command(name = "snmp-get", version, about)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// OIDs to retrieve (dotted notation or well-known names, comma lists allowed).
    #[arg(required = true, value_name = "OID")]
    oids: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    args.output.init_tracing();

    let request = match hints::request_string(&args.oids) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = args.common.session_config();
    let mut session = Session::default();
    if let Err(e) = session.open(config.clone()) {
        write_error(&e);
        return ExitCode::FAILURE;
    }
    let Some(target) = session.peer_addr() else {
        eprintln!("Error: session closed unexpectedly");
        return ExitCode::FAILURE;
    };

    if args.output.verbose
        && let Ok(list) = OidList::parse(&request)
    {
        write_verbose_request(&RequestInfo {
            target,
            version: config.version,
            retries: config.retries,
            timeout: config.timeout,
            operation: Operation::Get,
            oids: list.as_slice(),
        });
    }

    let start = Instant::now();
    let result = session.get(&request);
    let elapsed = start.elapsed();
    session.close();

    match result {
        Ok(varbinds) => {
            if args.output.verbose {
                write_verbose_response(&varbinds, elapsed, !args.output.no_hints);
            }

            let output_ctx = OutputContext {
                format: args.output.format,
                show_hints: !args.output.no_hints,
                force_hex: args.output.hex,
                show_timing: args.output.timing,
            };
            let timing = args.output.timing.then_some(elapsed);

            if let Err(e) = output_ctx.write_results(target, config.version, &varbinds, timing) {
                eprintln!("Error writing output: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            write_error(&e);
            ExitCode::FAILURE
        }
    }
}
