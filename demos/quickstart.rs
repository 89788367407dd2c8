//! Walk through the encrypted store against a file-backed raw store

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tempfile::TempDir;

use sealed_store::{CancellationToken, FileStore, RawStore, StoreBuilder, StoreError};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Person {
    id: u32,
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let raw = FileStore::open(temp_dir.path()).await?;
    let cancel = CancellationToken::new();

    let store = StoreBuilder::new()
        .raw_store(Arc::new(raw.clone()))
        .with_options(|options| {
            options.encryption_key = "correct horse battery staple".to_string();
            options.iterations = Some(2);
        })
        .build()?;

    println!("=== Strings ===");
    store.save_string("username", "john.doe", &cancel).await?;
    println!("username -> {:?}", store.get_string("username", &cancel).await?);
    println!("on disk  -> {:?}", raw.get("username").await?);

    println!("\n=== Objects ===");
    let person = Person { id: 1, name: "John".to_string() };
    store.save_object("person", &person, None, &cancel).await?;
    let loaded: Option<Person> = store.get_object("person", &cancel).await?;
    println!("person -> {:?}", loaded);

    println!("\n=== Enumeration ===");
    println!("len  -> {}", store.len(&cancel).await?);
    println!("keys -> {:?}", store.keys(&cancel).await?);
    println!("key_at(0) -> {}", store.key_at(0, &cancel).await?);
    match store.key_at(5, &cancel).await {
        Err(StoreError::IndexOutOfRange { index, len }) => {
            println!("key_at({}) -> out of range (len {})", index, len)
        }
        other => println!("key_at(5) -> {:?}", other),
    }

    println!("\n=== Tampering ===");
    raw.set("username", "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA").await?;
    match store.get_string("username", &cancel).await {
        Err(e) if e.is_crypto() => println!("username -> rejected: {}", e),
        other => println!("username -> {:?}", other),
    }

    println!("\n=== Clear ===");
    store.clear(&cancel).await?;
    println!("len -> {}", store.len(&cancel).await?);

    Ok(())
}
