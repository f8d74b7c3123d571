//! snmp-walk: Walk SNMP subtrees.
//!
//! Part of the snmp-sync CLI utilities.

use clap::Parser;
use snmp_sync::cli::args::{CommonArgs, OutputArgs};
use snmp_sync::cli::hints::parse_oid;
use snmp_sync::cli::output::{
    Operation, OutputContext, RequestInfo, write_error, write_verbose_request,
    write_verbose_response,
};
use snmp_sync::{Session, VarBind};
use std::process::ExitCode;
use std::time::Instant;

/// Walk an SNMP subtree with repeated GETNEXT requests.
#[derive(Debug, Parser)]
#[command(name = "snmp-walk", version, about)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Stop after this many results.
    #[arg(long = "max-results", value_name = "N")]
    max_results: Option<usize>,

    /// OID subtree to walk (dotted notation or well-known name).
    #[arg(value_name = "OID")]
    oid: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    args.output.init_tracing();

    let root = match parse_oid(&args.oid) {
        Ok(oid) => oid,
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

    if args.output.verbose {
        write_verbose_request(&RequestInfo {
            target,
            version: config.version,
            retries: config.retries,
            timeout: config.timeout,
            operation: Operation::Walk,
            oids: std::slice::from_ref(&root),
        });
    }

    let limit = args.max_results.unwrap_or(usize::MAX);
    let start = Instant::now();
    let mut varbinds: Vec<VarBind> = Vec::new();
    let mut failure = None;
    for item in session.walk(root).take(limit) {
        match item {
            Ok(vb) => varbinds.push(vb),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }
    let elapsed = start.elapsed();
    session.close();

    if args.output.verbose {
        write_verbose_response(&varbinds, elapsed, !args.output.no_hints);
    }

    // Partial results are still printed before the error.
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

    match failure {
        Some(e) => {
            write_error(&e);
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}
