use std::env;

use catalog::{ingest, inventory_path, StorageConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut roots: Vec<String> = env::args().skip(1).collect();
    if roots.is_empty() {
        roots = match env::var("ECHOVERSE_ROOTS") {
            Ok(value) => value
                .split(';')
                .map(|root| root.trim().to_string())
                .filter(|root| !root.is_empty())
                .collect(),
            Err(_) => StorageConfig::default().allowed_roots,
        };
    }

    let catalog = ingest(&roots);
    let stats = catalog.stats();
    match inventory_path(&catalog) {
        Some(path) => println!("Inventory: {}", path.display()),
        None => println!("Inventory: none found, sample catalog in use"),
    }
    println!(
        "Catalog: {} albums, {} tracks, {} bytes",
        stats.total_albums, stats.total_tracks, stats.total_size_bytes
    );
    for album in catalog.albums().iter() {
        println!(
            "  {} ({}): {} tracks, {}s, cover {}",
            album.name,
            album.id,
            album.tracks.len(),
            album.total_duration_seconds,
            album.cover.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
