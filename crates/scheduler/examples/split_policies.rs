//! split_policies.rs
//!
//! Prints how each remainder policy splits the same range.
//!
//! ```bash
//! cargo run --example split_policies
//! ```

use scheduler::{ChunkSplitter, RemainderPolicy};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
        .init();

    let (max, chunks) = (53, 5);
    println!("=== Splitting 1..={max} into {chunks} chunks ===");

    for policy in RemainderPolicy::ALL {
        let result = ChunkSplitter::new(policy).split(max, chunks)?;
        println!("\n--- {policy} ---");
        println!("{}", result.summary());
        for chunk in result.chunks() {
            println!(
                "  #{:<2} {:>3} ..= {:<3} ({} elements)",
                chunk.index(),
                chunk.first().unwrap_or_default(),
                chunk.last().unwrap_or_default(),
                chunk.len()
            );
        }
        if result.dropped() > 0 {
            println!("  dropped: {} trailing elements", result.dropped());
        }
    }

    println!("\n--- invalid arguments ---");
    if let Err(e) = ChunkSplitter::default().split(6, 7) {
        println!("{e}");
    }
    Ok(())
}
