use std::fs;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dmxbridge_core::protocols::artnet::{decode, parse_artdmx};
use dmxbridge_core::{
    ArtNetEncoder, Bridge, BridgeConfig, ChannelMessage, ConfigMessage, ControlPayload,
    DEFAULT_ARTNET_PORT, MemoryChannel, OutputSpec,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tracing::{info, warn};

mod logging;

use logging::{LogFormat, LogLevel, init_logging};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("DMXBRIDGE_BUILD_COMMIT"),
    " ",
    env!("DMXBRIDGE_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "dmxbridge")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Bridge peer data channels carrying DMX512 to Art-Net and back.",
    long_about = None,
    after_help = "Examples:\n  dmxbridge run --output lan=192.168.1.10/255.255.255.0\n  dmxbridge broadcast 10.0.0.5 255.0.0.0\n  dmxbridge encode --universe 1 --values 255,128,0"
)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level
    #[arg(long, value_enum, default_value = "info", global = true, env = "DMXBRIDGE_LOG")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bridge with a console data channel on stdin/stdout.
    ///
    /// Each stdin line is one control message
    /// (`{"universe":0,"channelValues":[...]}`); inbound Art-Net frames are
    /// printed to stdout in the same shape. The bridge stops at end of input
    /// or on Ctrl-C.
    #[command(
        after_help = "Examples:\n  dmxbridge run --output lan=192.168.1.10/255.255.255.0\n  dmxbridge run --outputs-file outputs.json --port 6454"
    )]
    Run {
        /// Local address for the Art-Net socket
        #[arg(long, default_value = "0.0.0.0")]
        bind: IpAddr,

        /// Local Art-Net port
        #[arg(long, default_value_t = DEFAULT_ARTNET_PORT, env = "DMXBRIDGE_PORT")]
        port: u16,

        /// Destination port for outgoing frames (defaults to --port)
        #[arg(long)]
        destination_port: Option<u16>,

        /// Output as NAME=ADDRESS/NETMASK (repeatable)
        #[arg(long = "output", value_name = "NAME=ADDRESS/NETMASK")]
        outputs: Vec<String>,

        /// JSON file with `{"outputs":[{name,address,mask}]}` or a bare list
        #[arg(long)]
        outputs_file: Option<PathBuf>,
    },
    /// Print the broadcast address of a subnet.
    Broadcast {
        /// Interface address (dotted decimal)
        address: String,
        /// Netmask (dotted decimal)
        netmask: String,
    },
    /// Encode one ArtDmx frame and print it as hex.
    Encode {
        /// Universe (0-32767)
        #[arg(long)]
        universe: u16,

        /// Comma-separated channel values
        #[arg(long, value_delimiter = ',')]
        values: Vec<u8>,
    },
    /// Decode a hex Art-Net frame and print it as JSON.
    Decode {
        /// Frame bytes as hex
        hex: String,

        /// Require the Art-Net identifier, the ArtDmx opcode and a valid length
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let result = match cli.command {
        Commands::Run {
            bind,
            port,
            destination_port,
            outputs,
            outputs_file,
        } => cmd_run(bind, port, destination_port, outputs, outputs_file),
        Commands::Broadcast { address, netmask } => cmd_broadcast(&address, &netmask),
        Commands::Encode { universe, values } => cmd_encode(universe, &values),
        Commands::Decode { hex, strict } => cmd_decode(&hex, strict),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_run(
    bind: IpAddr,
    port: u16,
    destination_port: Option<u16>,
    outputs: Vec<String>,
    outputs_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let mut specs = outputs
        .iter()
        .map(|arg| parse_output_arg(arg))
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(path) = outputs_file.as_ref() {
        specs.extend(load_outputs_file(path)?);
    }

    let config = BridgeConfig {
        bind_address: bind,
        port,
        destination_port,
    };
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(run_bridge(config, specs))
}

async fn run_bridge(config: BridgeConfig, specs: Vec<OutputSpec>) -> Result<(), CliError> {
    let port = config.port;
    let bridge = Bridge::bind(config).await.map_err(|err| {
        CliError::new(
            err.to_string(),
            Some(format!(
                "another Art-Net application may own port {port}; try --port"
            )),
        )
    })?;
    bridge
        .apply_config(&ConfigMessage::List(specs))
        .map_err(|err| {
            CliError::new(
                err.to_string(),
                Some("outputs use dotted-decimal NAME=ADDRESS/NETMASK".to_string()),
            )
        })?;
    if bridge.outputs().is_empty() {
        warn!("no outputs configured; frames will be discarded");
    }
    let bridge = Arc::new(bridge);
    info!(local = %bridge.local_addr().context("Failed to read local address")?, "bridge running");

    let (console, mut replies) = MemoryChannel::new("console");
    bridge.registry().register(console.clone());

    let printer = tokio::spawn(async move {
        while let Some(reply) = replies.recv().await {
            match reply {
                ChannelMessage::Text(text) => println!("{text}"),
                ChannelMessage::Binary(bytes) => println!("{}", hex::encode(&bytes)),
            }
        }
    });

    let (done_tx, done_rx) = oneshot::channel::<()>();
    let reader = {
        let console = Arc::clone(&console);
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if !line.is_empty() {
                            console.deliver(line);
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        warn!(error = %err, "stdin read failed");
                        break;
                    }
                }
            }
            console.close();
            let _ = done_tx.send(());
        })
    };

    let shutdown = async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("interrupted"),
            _ = done_rx => info!("console input closed"),
        }
    };
    let result = bridge.run(shutdown).await;
    reader.abort();
    printer.abort();
    result.context("Bridge stopped unexpectedly")?;
    Ok(())
}

fn cmd_broadcast(address: &str, netmask: &str) -> Result<(), CliError> {
    let broadcast = dmxbridge_core::net::resolve(address, netmask).map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("use dotted-decimal quads, e.g. 192.168.1.10 255.255.255.0".to_string()),
        )
    })?;
    println!("{broadcast}");
    Ok(())
}

fn cmd_encode(universe: u16, values: &[u8]) -> Result<(), CliError> {
    let frame = ArtNetEncoder::default()
        .encode_artdmx(universe, values)
        .map_err(|err| {
            CliError::new(
                err.to_string(),
                Some("universe is 0-32767 with at most 512 values".to_string()),
            )
        })?;
    println!("{}", hex::encode(&frame));
    Ok(())
}

fn cmd_decode(hex: &str, strict: bool) -> Result<(), CliError> {
    let frame = from_hex(hex)?;
    let payload = if strict {
        let parsed = parse_artdmx(&frame)
            .map_err(|err| CliError::new(err.to_string(), None))?
            .ok_or_else(|| {
                CliError::new(
                    "not an ArtDmx frame",
                    Some("drop --strict to decode without checking the header".to_string()),
                )
            })?;
        ControlPayload {
            universe: parsed.universe,
            channel_values: parsed.data,
        }
    } else {
        let decoded = decode(&frame).map_err(|err| {
            CliError::new(
                err.to_string(),
                Some("an ArtDmx header is 18 bytes (36 hex digits)".to_string()),
            )
        })?;
        ControlPayload::from(decoded)
    };
    let json = payload.to_json().context("JSON serialization failed")?;
    println!("{json}");
    Ok(())
}

fn parse_output_arg(arg: &str) -> Result<OutputSpec, CliError> {
    let invalid = || {
        CliError::new(
            format!("invalid output '{arg}'"),
            Some("expected NAME=ADDRESS/NETMASK, e.g. lan=192.168.1.10/255.255.255.0".to_string()),
        )
    };
    let (name, rest) = match arg.split_once('=') {
        Some((name, rest)) => (name.trim(), rest),
        None => ("", arg),
    };
    let (address, mask) = rest.split_once('/').ok_or_else(invalid)?;
    if address.trim().is_empty() || mask.trim().is_empty() {
        return Err(invalid());
    }
    let name = if name.is_empty() { address.trim() } else { name };
    Ok(OutputSpec::new(name, address.trim(), mask.trim()))
}

fn load_outputs_file(path: &PathBuf) -> Result<Vec<OutputSpec>, CliError> {
    let raw = fs::read(path)
        .with_context(|| format!("Failed to read outputs file: {}", path.display()))?;
    let message = ConfigMessage::parse(&raw).map_err(|err| {
        CliError::new(
            format!("invalid outputs file {}: {err}", path.display()),
            Some(r#"expected {"outputs":[{"name":..,"address":..,"mask":..}]}"#.to_string()),
        )
    })?;
    Ok(message.into_outputs())
}

/// Decode hex digits, ignoring whitespace and `:` separators.
fn from_hex(input: &str) -> Result<Vec<u8>, CliError> {
    let digits: String = input
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != ':')
        .collect();
    hex::decode(&digits).map_err(|err| {
        CliError::new(
            format!("invalid hex input: {err}"),
            Some("pass the frame as hex digits, e.g. 4172742d4e6574...".to_string()),
        )
    })
}
