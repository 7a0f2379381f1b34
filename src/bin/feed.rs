//! Feed Binary - Read-Only Collection Viewer
//!
//! Scans the configured collection and prints the post feed, newest
//! first, with reply counts per post. Useful for checking what a
//! collection actually contains without wiring up a wallet.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin feed
//! ```
//!
//! ## Environment Variables
//!
//! - SOCIAL_COLLECTION_ADDRESS - Collection/creator address (required)
//! - SOCIAL_RPC_URL - DAS-capable RPC endpoint (default: devnet)
//! - SOCIAL_SCAN_LIMIT - Max records per scan (default: 50)
//! - RUST_LOG - Logging level (optional, default: info)

use std::sync::Arc;

use solsocial::index_core::ContentType;
use solsocial::ledger::DasLedgerReader;
use solsocial::{ClientConfig, Entity, SocialClient};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            log::error!("❌ {}", error);
            std::process::exit(1);
        }
    };

    log::info!("📡 collection: {}", config.collection_address);
    log::info!("   rpc: {}", config.rpc_url);

    let reader = match DasLedgerReader::new(&config.rpc_url) {
        Ok(reader) => Arc::new(reader),
        Err(error) => {
            log::error!("❌ failed to build RPC reader: {}", error);
            std::process::exit(1);
        }
    };

    let client = SocialClient::new(config, reader);

    let posts = match client.list_content(Some(ContentType::Post)).await {
        Ok(posts) => posts,
        Err(error) => {
            log::error!("❌ {}", error);
            std::process::exit(1);
        }
    };

    if posts.is_empty() {
        println!("collection has no posts (or the scan timed out)");
        return;
    }

    println!("{} posts\n", posts.len());
    for entity in posts {
        if let Entity::Post(post) = entity {
            let replies = client
                .get_replies_for(&post.id)
                .await
                .map(|replies| replies.len())
                .unwrap_or(0);

            println!(
                "[{}] {} — {}",
                post.created_at.format("%Y-%m-%d %H:%M:%S"),
                short_address(&post.author_address),
                post.content
            );
            if !post.image_url.is_empty() {
                println!("    image: {}", post.image_url);
            }
            if replies > 0 {
                println!("    {} replies", replies);
            }
        }
    }
}

fn short_address(address: &str) -> String {
    if address.len() > 8 {
        format!("{}..{}", &address[..4], &address[address.len() - 4..])
    } else {
        address.to_string()
    }
}
