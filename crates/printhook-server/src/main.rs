// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printhook: webhook-to-printer gateway.
//
// Entry point. Loads configuration, initialises logging, builds a runtime
// sized to the configured worker count, and serves until signalled.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use printhook_core::GatewayConfig;
use printhook_print::CupsSpooler;

#[derive(Debug, Parser)]
#[command(name = "printhook", version, about = "Authenticated image-to-printer gateway")]
struct Args {
    /// YAML configuration file.
    #[arg(long, env = "PRINTHOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration, print a summary and exit.
    #[arg(long)]
    check: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match GatewayConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("printhook: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    if args.check {
        println!("configuration OK");
        println!("  listen:      {}", config.socket_addr());
        println!("  printer:     {}", config.printer().unwrap_or("<system default>"));
        println!("  options:     {}", config.print_options.join(" "));
        println!("  max copies:  {}", config.max_copies);
        println!("  workers:     {}", config.workers);
        return ExitCode::SUCCESS;
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "printhook starting");

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers)
        .thread_name("printhook-worker")
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "failed to build the async runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(printhook_server::serve(config, Arc::new(CupsSpooler::new()))) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "printhook exited with an error");
            ExitCode::FAILURE
        }
    }
}
