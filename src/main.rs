// This is my main entry point for the node binary
// It reads the settings, binds the listener and hands control to the server
use bitshift_chain::{Config, NodeError, Opt, Server};
use clap::Parser;
use log::{error, info, LevelFilter};
use std::process;

fn main() {
    // I initialize logging at Info level; RUST_LOG can still override it
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    // Anything that reaches here is fatal (bad config or the port is taken)
    if let Err(e) = run(opt) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run(opt: Opt) -> Result<(), NodeError> {
    // Settings are layered: defaults, then the config file, then the environment,
    // and the command line wins over all of them
    let mut config = Config::load(opt.port, opt.config.as_deref())?;
    if let Some(seed) = opt.seed_peer {
        config.set_seed_peer(seed);
    }
    if let Some(bit_shift) = opt.bit_shift {
        config.set_bit_shift(bit_shift);
    }
    if let Some(payload) = opt.payload {
        config.set_payload(payload.into_bytes())?;
    }

    info!(
        "Starting node on {} with bit shift {}",
        config.get_listen_addr(),
        config.get_bit_shift()
    );

    // Binding is the one network failure I can't recover from
    let server = Server::bind(config)?;
    server.run()
}
