//! Build a Merkle tree over a list of strings, prove one of them and check the
//! proof against the root.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;
use merkle_inclusion::{compute_root, generate_proof_for_item, verify_proof, MerkleTree};
use serde_json::json;

const LOG_TARGET: &str = "merkle::demo";

const SAMPLE_ITEMS: [&str; 9] = [
    "Hello World",
    "Where am I?",
    "I am ready to work!!",
    "I am a developer",
    "I am recently working on my portfolio.",
    "I thing this is enough!",
    "Let me add one more",
    "This is the last one",
    "This is last bss hua",
];

#[derive(Debug, Parser)]
#[command(name = "merkle-demo", about = "Merkle tree root, proof and verification demo")]
struct Cli {
    /// Items to commit to, in order. Defaults to a built-in sample list
    items: Vec<String>,
    /// Item to prove inclusion of. Defaults to the fifth sample item, or the
    /// first supplied item
    #[arg(short, long)]
    target: Option<String>,
    /// Print the results as one JSON document
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let (items, default_target) = if cli.items.is_empty() {
        let items: Vec<String> = SAMPLE_ITEMS.iter().map(|s| s.to_string()).collect();
        let target = items[4].clone();
        (items, target)
    } else {
        let target = cli.items[0].clone();
        (cli.items, target)
    };
    let target = cli.target.unwrap_or(default_target);
    info!(target: LOG_TARGET, "Committing to {} items", items.len());

    let root = compute_root(&items)?;
    let tree = MerkleTree::new(&items);
    let proof = generate_proof_for_item(target.as_bytes(), &items)
        .with_context(|| format!("cannot prove inclusion of {:?}", target))?;
    let root_from_proof = verify_proof(&proof)?;
    let tree_root = tree.root().ok_or_else(|| anyhow!("tree has no root"))?;
    let matches = root_from_proof == root && tree_root == &root;

    if cli.json {
        let report = json!({
            "merkleRoot": root,
            "merkleProof": proof,
            "merkleTree": tree,
            "merkleRootFromProof": root_from_proof,
            "verified": matches,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("merkle root: {}", root);
        println!("proof for {:?}:", target);
        for step in proof.steps() {
            println!("  {:?} {}", step.side, step.hash);
        }
        println!("merkle tree:");
        for (depth, level) in tree.to_hex_levels().iter().enumerate() {
            println!("  level {}: {:?}", depth, level);
        }
        println!("merkle root from proof: {}", root_from_proof);
        println!("root from proof == merkle root: {}", matches);
    }
    Ok(())
}
