//! Custody ledger demonstration binary
//!
//! Plays the submission layer's part: a handful of concurrent producers
//! register lots, one lot is walked through the full custody chain, and
//! the resulting report and aggregates are printed as JSON.

use custody_ledger::{Caller, Config, Ledger, ProductId, Registration};
use rust_decimal::Decimal;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting AgriTrace custody ledger demo");

    let config = Config::from_env()?;
    let ledger = Arc::new(Ledger::open(config)?);

    // Concurrent producers registering distinct lots
    let mut handles = Vec::new();
    for farm in 0..4u32 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            let producer = Caller::producer(format!("FARM-{:02}", farm));
            for lot in 0..5u32 {
                let base = ledger
                    .price_unit()
                    .to_scaled(Decimal::from(100 + farm * 10))?;
                ledger.register(
                    Registration {
                        id: ProductId::new(format!("LOT-{}-{}", farm, lot)),
                        name: "Wheat".to_string(),
                        quantity: 100,
                        base_price: base,
                        harvest_date: "2025-01-01".to_string(),
                        quality: "A".to_string(),
                        location: format!("Farm {}", farm),
                    },
                    &producer,
                )?;
            }
            Ok::<_, custody_ledger::Error>(())
        }));
    }
    for handle in handles {
        handle.await??;
    }
    tracing::info!("concurrent registration complete");

    // One lot through the full custody chain
    let unit = *ledger.price_unit();
    let producer = Caller::producer("FARM-00");
    ledger.register(
        Registration {
            id: ProductId::new("P1"),
            name: "Wheat".to_string(),
            quantity: 100,
            base_price: unit.to_scaled(Decimal::from(500))?,
            harvest_date: "2025-01-01".to_string(),
            quality: "A".to_string(),
            location: "Farm".to_string(),
        },
        &producer,
    )?;
    ledger.advance_as_intermediary(
        "P1",
        unit.to_scaled(Decimal::from(50))?,
        "Truck #7",
        &Caller::intermediary("TRUCK-07"),
    )?;
    ledger.advance_as_seller(
        "P1",
        unit.to_scaled(Decimal::from(30))?,
        "Shop #3",
        &Caller::seller("SHOP-03"),
    )?;

    let product = ledger
        .get_product("P1")
        .ok_or_else(|| anyhow::anyhow!("product P1 missing"))?;
    tracing::info!(
        product_id = %product.id,
        status = ?product.status,
        current_price = %unit.to_human(product.current_price),
        "custody chain complete"
    );

    let report = ledger.verify("P1");
    println!("{}", serde_json::to_string_pretty(&report)?);

    let stats = ledger.stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);
    tracing::info!(
        total_products = stats.total_products,
        total_transactions = stats.total_transactions,
        "demo complete"
    );

    Ok(())
}
