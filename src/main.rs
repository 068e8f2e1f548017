//! Taxi CLI - S3 and SFTP configuration diagnostics

use clap::Parser;
use std::sync::Arc;
use taxi::config::{CliArgs, Commands, Settings};
use taxi::core::Taxi;
use taxi::error::Result;
use taxi::output::Printer;
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    init_logging(&args);

    // Handle result
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn init_logging(args: &CliArgs) {
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(args: CliArgs) -> Result<()> {
    // Settings are read once and shared from here on
    let settings = Arc::new(Settings::from_env());

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let color = !args.no_color && console::colors_enabled();
    let mut printer = Printer::stdout(color);

    rt.block_on(async {
        let taxi = Taxi::load(settings).await;

        match &args.command {
            Commands::Config => taxi.print(&mut printer),
            Commands::Buckets => taxi.list_buckets(&mut printer).await.map(|_| ()),
            Commands::Ls { bucket } => taxi.list_objects(bucket, &mut printer).await.map(|_| ()),
        }
    })
}
