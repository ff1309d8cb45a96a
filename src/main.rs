//! # Nota CLI
//!
//! Command-line interface for laundry receipt printing.
//!
//! ## Usage
//!
//! ```bash
//! # Show the receipt as it would appear on paper
//! nota preview order.json
//!
//! # Write the ESC/POS bytes to a file (or stdout without -o)
//! nota encode order.json -o receipt.bin
//!
//! # Print to the first BLE printer found
//! nota print order.json
//!
//! # Pick a printer by name, keep the bytes if printing fails
//! nota print --name MTP-II --save-on-failure receipt.bin order.json
//!
//! # 80mm paper, store settings from a config file
//! nota --config store.json --paper 80mm print order.json
//! ```

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nota::{
    NotaError, PaperProfile, PrintConfig, PrintEvent, PrintJob,
    document, logging, preview,
    receipt::PrintRequest,
    transport::{self, BluetoothCapability, FileChannel},
};

/// Nota - Laundry receipt printer utility
#[derive(Parser, Debug)]
#[command(name = "nota")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Store configuration file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Paper width (58mm or 80mm), overrides the config
    #[arg(long, global = true)]
    paper: Option<PaperProfile>,

    /// Log level when RUST_LOG is unset, overrides the config
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a receipt to raw printer bytes
    Encode {
        /// Print request (JSON)
        request: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render a receipt as plain text
    Preview {
        /// Print request (JSON)
        request: PathBuf,
    },

    /// Print a receipt to a Bluetooth LE printer
    Print {
        /// Print request (JSON)
        request: PathBuf,

        /// Pick the first printer whose name contains this
        #[arg(long, conflicts_with = "address")]
        name: Option<String>,

        /// Pick the printer with this address
        #[arg(long)]
        address: Option<String>,

        /// Deliver to this file instead of a printer
        #[arg(long, value_name = "FILE", conflicts_with_all = ["name", "address"])]
        output: Option<PathBuf>,

        /// Save the encoded receipt here if printing fails
        #[arg(long, value_name = "FILE")]
        save_on_failure: Option<PathBuf>,

        /// Bytes per write, overrides the config
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Delay between unacknowledged writes in ms, overrides the config
        #[arg(long)]
        pacing_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), NotaError> {
    let cli = Cli::parse();

    let mut config = PrintConfig::load_or_default(cli.config.as_deref())?;
    if let Some(paper) = cli.paper {
        config.paper = paper;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    logging::init(&config.log_level);

    match cli.command {
        Commands::Encode { request, output } => {
            let request = read_request(&request)?;
            let bytes = PrintJob::new(config).prepare(&request)?;

            match output {
                Some(path) => {
                    transport::file::save(&path, &bytes).await?;
                    eprintln!("Wrote {} bytes to {}", bytes.len(), path.display());
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&bytes)?;
                    stdout.flush()?;
                }
            }
        }

        Commands::Preview { request } => {
            let request = read_request(&request)?;
            let doc = document::build_with(&request, config.paper, &config.receipt_options())?;
            let program = document::lower(&doc, config.paper, &config.encode_options());

            for line in preview::render_text(&program, config.paper) {
                println!("{}", line);
            }
        }

        Commands::Print {
            request,
            name,
            address,
            output,
            save_on_failure,
            chunk_size,
            pacing_ms,
        } => {
            if let Some(size) = chunk_size {
                config.chunk_size = size;
            }
            if let Some(ms) = pacing_ms {
                config.pacing_ms = ms;
            }
            config.validate()?;

            let request = read_request(&request)?;
            let job = PrintJob::new(config).with_observer(report_event);

            let cancel = job.cancellation_token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            });

            println!("Printing receipt {}...", request.transaction.code);

            let result = match output {
                Some(path) => {
                    let bytes = job.prepare(&request)?;
                    let mut channel = FileChannel::create(&path).await?;
                    job.run_on(&mut channel, bytes).await
                }
                None => job.run(capability(name, address), &request).await,
            };

            match result {
                Ok(report) => {
                    println!(
                        "Printed {} bytes to {} in {:.1}s",
                        report.bytes_sent,
                        report.target,
                        report.elapsed.as_secs_f32()
                    );
                }
                Err(failure) if failure.is_user_cancelled() => {
                    println!("No printer selected; nothing printed.");
                }
                Err(failure) => {
                    if let (Some(path), Some(bytes)) = (save_on_failure, &failure.encoded) {
                        transport::file::save(&path, bytes).await?;
                        eprintln!("Saved receipt to {}", path.display());
                    }
                    return Err(failure.error);
                }
            }
        }
    }

    Ok(())
}

fn read_request(path: &Path) -> Result<PrintRequest, NotaError> {
    let json = std::fs::read_to_string(path)?;
    Ok(PrintRequest::from_json(&json)?)
}

#[cfg(feature = "ble")]
fn capability(name: Option<String>, address: Option<String>) -> Arc<dyn BluetoothCapability> {
    use nota::transport::btle::{BtleCapability, DeviceSelector};

    let selector = match (name, address) {
        (Some(name), _) => DeviceSelector::Name(name),
        (None, Some(address)) => DeviceSelector::Address(address),
        (None, None) => DeviceSelector::First,
    };
    Arc::new(BtleCapability::new(selector))
}

#[cfg(not(feature = "ble"))]
fn capability(_name: Option<String>, _address: Option<String>) -> Arc<dyn BluetoothCapability> {
    Arc::new(transport::Unsupported::new(
        "built without Bluetooth support (rebuild with --features ble)",
    ))
}

/// Console progress for `nota print`
fn report_event(event: PrintEvent) {
    match event {
        PrintEvent::Negotiation(state) => eprintln!("  {}", state),
        PrintEvent::Progress { sent, total } => {
            eprint!("\r  sent {}/{} bytes", sent, total);
            if sent == total {
                eprintln!();
            }
        }
        PrintEvent::Finished { .. } | PrintEvent::Dismissed => {}
        PrintEvent::Failed { reason } => eprintln!("\n  failed: {}", reason),
    }
}
