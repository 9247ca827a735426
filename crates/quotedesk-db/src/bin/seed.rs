//! # Seed Data Generator
//!
//! Populates the database with development data: a parts catalog, a few
//! companies, serialized inventory, and one quotation already converted to
//! an invoice with a partial payment on it.
//!
//! ## Usage
//! ```bash
//! # Default: 500 parts into ./quotedesk_dev.db
//! cargo run -p quotedesk-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p quotedesk-db --bin seed -- --count 2000 --db ./data/quotedesk.db
//! ```
//!
//! Each part gets a unique part number `{CATEGORY}-{NAME}-{INDEX}`, a price
//! between $4.99 and $299.99, and a stock level between 0 and 40.

use std::env;

use quotedesk_core::{
    Actor, NewCompany, NewPart, NewPartItem, NewQuotation, NewQuotationItem, PartCondition,
};
use quotedesk_db::{Database, DbConfig, PartFilter};

/// Part categories with representative names.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "BRK",
        &[
            "Brake Pad Set",
            "Brake Disc",
            "Brake Caliper",
            "Brake Hose",
            "Brake Fluid Reservoir",
            "Handbrake Cable",
            "ABS Sensor",
            "Brake Drum",
        ],
    ),
    (
        "FLT",
        &[
            "Oil Filter",
            "Air Filter",
            "Cabin Filter",
            "Fuel Filter",
            "Transmission Filter",
        ],
    ),
    (
        "ELC",
        &[
            "Alternator",
            "Starter Motor",
            "Ignition Coil",
            "Spark Plug",
            "Battery 12V",
            "Headlight Assembly",
            "Tail Light",
            "Wiper Motor",
        ],
    ),
    (
        "SUS",
        &[
            "Shock Absorber",
            "Coil Spring",
            "Control Arm",
            "Ball Joint",
            "Tie Rod End",
            "Stabilizer Link",
            "Wheel Bearing",
        ],
    ),
    (
        "ENG",
        &[
            "Timing Belt Kit",
            "Water Pump",
            "Thermostat",
            "Radiator",
            "Serpentine Belt",
            "Valve Cover Gasket",
            "Engine Mount",
            "Turbocharger",
        ],
    ),
];

const SUPPLIERS: &[&str] = &["NorthParts Wholesale", "Atlas Components", "Velo Supply Co"];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Apex Auto Group", "fleet@apexauto.example.com"),
    ("Riverside Garage", "office@riversidegarage.example.com"),
    ("Hilltop Motors", "purchasing@hilltopmotors.example.com"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./quotedesk_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("QuoteDesk Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of parts to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./quotedesk_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 QuoteDesk Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Parts:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.parts().count(&PartFilter::default()).await?;
    if existing > 0 {
        println!("⚠ Database already has {} parts", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Companies first; part items reference suppliers.
    let mut supplier_ids = Vec::new();
    for name in SUPPLIERS {
        let company = db
            .companies()
            .insert(NewCompany {
                name: name.to_string(),
                is_supplier: true,
                ..Default::default()
            })
            .await?;
        supplier_ids.push(company.id);
    }

    let mut customer_ids = Vec::new();
    for (name, email) in CUSTOMERS {
        let company = db
            .companies()
            .insert(NewCompany {
                name: name.to_string(),
                email: Some(email.to_string()),
                is_customer: true,
                ..Default::default()
            })
            .await?;
        customer_ids.push(company.id);
    }
    println!("✓ Seeded {} companies", SUPPLIERS.len() + CUSTOMERS.len());

    println!();
    println!("Generating parts...");

    let start = std::time::Instant::now();
    let catalog: Vec<(&str, &str)> = CATEGORIES
        .iter()
        .flat_map(|(category, names)| names.iter().map(move |name| (*category, *name)))
        .collect();
    let mut part_ids = Vec::with_capacity(count);

    for index in 0..count {
        let (category, name) = catalog[index % catalog.len()];
        let variant = index / catalog.len();
        let serial = index as i64 + 1;

        let part = db
            .parts()
            .insert(NewPart {
                part_number: format!("{category}-{serial:05}"),
                name: if variant == 0 {
                    name.to_string()
                } else {
                    format!("{name} v{}", variant + 1)
                },
                description: None,
                barcode: Some(format!("200{serial:010}")),
                // $4.99 .. $299.99, deterministic spread
                price_cents: 499 + ((serial * 1_733) % 29_500),
                current_stock: Some((serial * 7) % 41),
                track_inventory: true,
            })
            .await?;
        part_ids.push(part.id);

        if (index + 1) % 500 == 0 {
            println!("  {} parts...", index + 1);
        }
    }

    println!("✓ Seeded {} parts in {:.1?}", part_ids.len(), start.elapsed());

    // Serialized inventory for the first few parts, via the bulk path.
    let mut item_total = 0usize;
    for (idx, part_id) in part_ids.iter().take(10).enumerate() {
        let supplier = &supplier_ids[idx % supplier_ids.len()];
        let batch: Vec<NewPartItem> = (0..5)
            .map(|unit| {
                let mut item = NewPartItem::for_part(part_id.clone());
                item.barcode = Some(format!("ITEM-{idx:03}-{unit:03}"));
                item.supplier_id = Some(supplier.clone());
                item.condition = if unit % 3 == 0 {
                    PartCondition::Refurbished
                } else {
                    PartCondition::New
                };
                item.warranty_period_days = Some(365);
                item
            })
            .collect();
        item_total += db.part_items().insert_bulk(batch).await?.len();
    }
    println!("✓ Seeded {} part items", item_total);

    // One quotation taken all the way through the lifecycle.
    if part_ids.len() < 2 {
        println!();
        println!("Done (too few parts for the demo quotation).");
        return Ok(());
    }
    let actor = Actor::new("seed", "admin");
    let (quotation, _) = db
        .quotations()
        .create(
            &actor,
            NewQuotation {
                company_id: customer_ids.first().cloned(),
                customer_name: Some(CUSTOMERS[0].0.to_string()),
                customer_email: Some(CUSTOMERS[0].1.to_string()),
                notes: Some("Seeded demo quotation".to_string()),
                ..Default::default()
            },
            vec![
                NewQuotationItem::new(&part_ids[0], 2, 4_999),
                NewQuotationItem::new(&part_ids[1], 1, 12_500),
            ],
        )
        .await?;

    let invoice = db
        .quotations()
        .convert_to_invoice(&actor, &quotation.id)
        .await?;
    db.invoices()
        .record_payment(&actor, &invoice.id, invoice.total_cents / 2)
        .await?;

    println!(
        "✓ Seeded quotation {} → invoice {} (half paid)",
        quotation.quotation_number, invoice.invoice_number
    );
    println!();
    println!("Done.");

    Ok(())
}
