#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! `fixmerkle` command line: commit descriptors, produce and check field proofs.
//!
//! ```text
//! fixmerkle root     <descriptor.toml>
//! fixmerkle leaves   <descriptor.toml>
//! fixmerkle prove    <descriptor.toml> <path>
//! fixmerkle verify   <root-hex> <proof.toml>
//! fixmerkle calldata <root-hex> <proof.toml>
//! fixmerkle exec     <calldata-hex>
//! fixmerkle version
//! ```
//!
//! `FIXMERKLE_CONFIG` may point at a TOML config file (limits, logging).

use anyhow::{anyhow, bail, Context, Result};
use fixmerkle::core::commitment::merkle::Commitment;
use fixmerkle::core::commitment::path::{Path, PATH_ENCODING_VERSION};
use fixmerkle::core::commitment::verify::{FieldProof, ProofWire};
use fixmerkle::core::config::FixMerkleConfig;
use fixmerkle::core::descriptor::canonical::CanonicalTree;
use fixmerkle::core::descriptor::raw::RawMap;
use fixmerkle::core::onchain::{encode_verify_call, execute_call};
use fixmerkle::core::types::{parse_hash32, Hash32};
use fixmerkle::monitoring::logging::init_logging;
use tracing::{info, warn};

const USAGE: &str = "usage: fixmerkle <root|leaves|prove|verify|calldata|exec|version> [args]";

fn load_config() -> Result<FixMerkleConfig> {
    match std::env::var("FIXMERKLE_CONFIG") {
        Ok(path) if !path.trim().is_empty() => {
            FixMerkleConfig::load(&path).with_context(|| format!("loading config {path}"))
        }
        _ => Ok(FixMerkleConfig::default()),
    }
}

fn load_commitment(file: &str, cfg: &FixMerkleConfig) -> Result<Commitment> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {file}"))?;
    let raw = RawMap::from_toml_str(&text)?;
    let tree = CanonicalTree::build(&raw, &cfg.limits).context("invalid descriptor")?;
    let c = Commitment::from_tree(&tree, &cfg.limits).context("cannot commit descriptor")?;
    info!(file, leaves = c.leaves().len(), "descriptor loaded");
    Ok(c)
}

fn load_proof(file: &str) -> Result<FieldProof> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {file}"))?;
    let wire: ProofWire = toml::from_str(&text).with_context(|| format!("parsing {file}"))?;
    Ok(FieldProof::from_wire(&wire)?)
}

fn root_arg(s: &str) -> Result<Hash32> {
    parse_hash32(s).ok_or_else(|| anyhow!("root must be 32 bytes of hex"))
}

fn arg<'a>(args: &'a [String], i: usize) -> Result<&'a str> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing argument\n{USAGE}"))
}

fn run(args: &[String], cfg: &FixMerkleConfig) -> Result<bool> {
    let cmd = arg(args, 0)?;
    match cmd {
        "root" => {
            let c = load_commitment(arg(args, 1)?, cfg)?;
            println!("0x{}", hex::encode(c.root()));
        }
        "leaves" => {
            let c = load_commitment(arg(args, 1)?, cfg)?;
            for l in c.leaves() {
                println!(
                    "{}\t{}\t{}",
                    l.path,
                    hex::encode(&l.encoded_path),
                    String::from_utf8_lossy(&l.value)
                );
            }
        }
        "prove" => {
            let c = load_commitment(arg(args, 1)?, cfg)?;
            let path: Path = arg(args, 2)?.parse()?;
            let proof = c.prove(&path)?;
            println!("# root = 0x{}", hex::encode(c.root()));
            print!("{}", toml::to_string(&proof.to_wire())?);
        }
        "verify" => {
            let root = root_arg(arg(args, 1)?)?;
            let proof = load_proof(arg(args, 2)?)?;
            let ok = proof.verify(&root)?;
            if ok {
                println!("valid: {} = {}", proof.path, String::from_utf8_lossy(&proof.value));
            } else {
                warn!(path = %proof.path, "proof does not verify");
                println!("invalid");
            }
            return Ok(ok);
        }
        "calldata" => {
            let root = root_arg(arg(args, 1)?)?;
            let proof = load_proof(arg(args, 2)?)?;
            println!("0x{}", hex::encode(encode_verify_call(&root, &proof)));
        }
        "exec" => {
            let hexed = arg(args, 1)?;
            let data = hex::decode(hexed.trim().trim_start_matches("0x"))
                .context("calldata must be hex")?;
            match execute_call(&data) {
                Ok(ret) => {
                    println!("0x{}", hex::encode(ret));
                    return Ok(ret[31] == 1);
                }
                Err(e) => {
                    warn!(error = %e, "call reverted");
                    println!("revert: {e}");
                    return Ok(false);
                }
            }
        }
        "version" => {
            println!(
                "fixmerkle {} ({}, path encoding {})",
                env!("CARGO_PKG_VERSION"),
                option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
                PATH_ENCODING_VERSION
            );
        }
        other => bail!("unknown command {other:?}\n{USAGE}"),
    }
    Ok(true)
}

fn main() {
    let cfg = match load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {e:#}");
            std::process::exit(2);
        }
    };
    init_logging(&cfg.logging);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args, &cfg) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    }
}
