//! rlwe-adder: add two integers under encryption
//!
//! Encrypts both operands bit by bit, runs the homomorphic ripple-carry
//! adder and prints the decrypted sum next to the plain one.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use eyre::{eyre, Context, Result};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use rlwe_bool::{FheEngine, FheParams};

#[derive(Parser)]
#[command(name = "rlwe-adder")]
#[command(about = "Homomorphic ripple-carry addition of two integers")]
#[command(version)]
struct Args {
    /// First operand
    a: u64,

    /// Second operand
    b: u64,

    /// Operand width in bits; the sum wraps modulo 2^bits
    #[arg(long, default_value = "8")]
    bits: usize,

    /// JSON parameter file (defaults to the toy parameters)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Seed for deterministic key generation
    #[arg(long)]
    seed: Option<u64>,

    /// Log bootstrapping stages
    #[arg(short, long)]
    verbose: bool,
}

fn load_params(args: &Args) -> Result<FheParams> {
    let mut params = match &args.params {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => FheParams::toy(),
    };
    if args.seed.is_some() {
        params.seed = args.seed;
    }
    Ok(params)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if args.bits == 0 || args.bits > 64 {
        return Err(eyre!("--bits must lie in 1..=64, got {}", args.bits));
    }
    let params = load_params(&args)?;

    let start = Instant::now();
    let engine = FheEngine::new(params).map_err(|e| eyre!("engine setup failed: {}", e))?;
    info!("Key generation: {:.2?}", start.elapsed());

    let ca = engine.encrypt_integer(args.a, args.bits)?;
    let cb = engine.encrypt_integer(args.b, args.bits)?;

    let start = Instant::now();
    let sum = engine.add(&ca, &cb)?;
    info!("Homomorphic addition ({} bits): {:.2?}", args.bits, start.elapsed());

    let mask = if args.bits == 64 {
        u64::MAX
    } else {
        (1u64 << args.bits) - 1
    };
    let decrypted = engine.decrypt_integer(&sum)?;
    let expected = args.a.wrapping_add(args.b) & mask;

    println!("{} + {} = {} (mod 2^{})", args.a & mask, args.b & mask, decrypted, args.bits);
    if decrypted != expected {
        return Err(eyre!("decrypted sum {} differs from {}", decrypted, expected));
    }
    Ok(())
}
