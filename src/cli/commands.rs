use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "bitshift-chain", about = "Run a proof-of-work chain node")]
pub struct Opt {
    #[arg(help = "TCP port to listen on")]
    pub port: u16,
    #[arg(help = "Address of a peer to dial on startup (host:port)")]
    pub seed_peer: Option<String>,
    #[arg(long = "bit-shift", help = "Difficulty: the target is (1 << 255) >> BIT_SHIFT")]
    pub bit_shift: Option<u8>,
    #[arg(long = "payload", help = "Payload carried by every mined block")]
    pub payload: Option<String>,
    #[arg(long = "config", help = "TOML file with node settings")]
    pub config: Option<PathBuf>,
}
