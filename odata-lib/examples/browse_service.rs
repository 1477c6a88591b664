//! Service browsing example.
//!
//! Lists the collections of an OData v2 service, its entity types, and the
//! first page of one collection.
//!
//! Run with: cargo run --example browse_service
//!
//! Requires .env file with:
//! - ODATA_SERVICE_URL
//! - ODATA_COLLECTION (optional)

use std::env;

use odata_lib::ODataService;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let url = env::var("ODATA_SERVICE_URL").expect("ODATA_SERVICE_URL not set");

    let service = ODataService::builder().url(&url).build()?;

    println!("Collections:");
    let names = service.collection_names().await?;
    for name in &names {
        println!("  {}", name);
    }

    println!("\nEntity types:");
    for entity_type in service.entity_types().await? {
        match entity_type.base_type_name() {
            Some(base) => println!("  {} : {}", entity_type.full_name(), base),
            None => println!("  {}", entity_type.full_name()),
        }
    }

    let Some(name) = env::var("ODATA_COLLECTION").ok().or_else(|| names.first().cloned()) else {
        println!("\nService exposes no collections");
        return Ok(());
    };

    println!("\nFirst page of {}:", name);
    let mut pages = service.collection(&name).inline_count().max_pages(1).pages();

    if let Some(page) = pages.next().await {
        let page = page?;
        if let Some(total) = page.total_count() {
            println!("  {} entities in total", total);
        }
        for entity in page.entities() {
            println!("  {:?}", entity.key());
            for property in entity.entity_type().properties().iter() {
                if let Some(value) = entity.get(property.name()) {
                    println!("    {} = {:?}", property.name(), value);
                }
            }
        }
        if page.has_more() {
            println!("  (more pages available)");
        }
    }

    Ok(())
}
