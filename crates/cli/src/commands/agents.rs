//! `cropflow agents` — list the registered advisory agents.

use crate::advisor::default_registry;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let registry = default_registry(None, "offline");

    println!("Registered advisory agents ({}):", registry.len());
    println!();
    for descriptor in registry.descriptors() {
        println!("  {:<26} {}", descriptor.id.to_string(), descriptor.name);
        println!("  {:<26} {}", "", descriptor.description);
        if !descriptor.keywords.is_empty() {
            println!("  {:<26} keywords: {}", "", descriptor.keywords.join(", "));
        }
        println!();
    }

    Ok(())
}
