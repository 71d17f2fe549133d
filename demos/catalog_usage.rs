/// Mountdex API Demo
///
/// Walks through the main operations:
/// - Installing a dataset and querying it
/// - Combined filters with an ownership collection
/// - Reconciling after a dataset change
/// - Exporting and importing the collection

use mountdex::collection::transfer::{self, DEFAULT_EXPORT_FILE_NAME};
use mountdex::core::config::DEFAULT_STORAGE_KEY;
use mountdex::search::debounce::Debouncer;
use mountdex::query::summary::{active_filter_summary, filter_suggestions};
use mountdex::storage::FileStorage;
use mountdex::{
    Catalog, CatalogQuery, CollectionStore, DatasetSnapshot, Expansion, Faction, MountCategory,
    OwnershipFilter, Record, SourceType,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("\n╔═══════════════════════════════════════════════╗");
    println!("║        Mountdex Catalog - API Demo            ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    // Step 1: Install a dataset
    println!("Step 1: Installing dataset...");
    let catalog = Catalog::default();
    catalog.install(DatasetSnapshot::new(1, sample_records()))?;
    let engine = catalog.engine()?;
    println!("  {} records indexed\n", engine.index().records().len());

    // Step 2: Search
    println!("Step 2: SEARCH");
    for text in ["drake", "drak", "KUN-LAI", "clud serpnt", "!!!"] {
        let names: Vec<&str> = engine.search(text).iter().map(|r| r.name.as_str()).collect();
        println!("  '{}': {:?}", text, names);
    }

    // Keystrokes collapse into one search after the quiescence window
    let typed = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = std::sync::Arc::clone(&typed);
    let debouncer = Debouncer::new(catalog.config().debounce_delay(), move |text: String| sink.lock().push(text));
    for prefix in ["s", "se", "ser", "serp"] {
        debouncer.schedule(prefix.to_string());
    }
    tokio::time::sleep(catalog.config().debounce_delay() * 2).await;
    let fired = typed.lock().clone();
    for text in &fired {
        println!("  debounced '{}': {} results", text, engine.search(text).len());
    }
    println!();

    // Step 3: Collection
    let dir = tempfile::tempdir()?;
    let mut store = CollectionStore::open(FileStorage::open(dir.path().join("user"))?, DEFAULT_STORAGE_KEY);
    store.toggle("red-drake");
    store.set_bulk(["black-war-kodo", "retired-mount"], true);
    println!("Step 3: COLLECTION - {} owned", store.owned_count());

    let stats = store.stats(engine.index().records());
    println!("  Global: {}/{} ({}%)", stats.global.owned, stats.global.total, stats.global.percentage);
    for (expansion, progress) in &stats.by_classification {
        println!("  {}: {}/{} ({}%)", expansion, progress.owned, progress.total, progress.percentage);
    }
    println!();

    // Step 4: Combined filters
    println!("Step 4: COMBINED QUERY");
    let query = CatalogQuery::new()
        .with_classification(Expansion::Classic)
        .with_category(MountCategory::Ground)
        .with_ownership(OwnershipFilter::NotOwned);
    let results = engine.combined(&query, &store);
    println!("  Filters: {:?}", active_filter_summary(&query));
    println!("  Results: {:?}", results.iter().map(|r| r.id.as_str()).collect::<Vec<_>>());

    let empty = query.with_faction(Faction::Horde).with_text("drake");
    if engine.combined(&empty, &store).is_empty() {
        println!("  Nothing found. {:?}", filter_suggestions(&empty));
    }
    println!();

    // Step 5: Dataset change
    println!("Step 5: RECONCILE");
    let removed = catalog.install_and_reconcile(DatasetSnapshot::new(2, sample_records()), &mut store)?;
    println!("  Removed stale ids: {:?}\n", removed);

    // Step 6: Transfer
    println!("Step 6: EXPORT / IMPORT");
    let path = dir.path().join(DEFAULT_EXPORT_FILE_NAME);
    let file = transfer::export_to_path(&store, 2, &path).await?;
    println!("  Exported {} ids to {}", file.owned.len(), path.display());

    let snapshot = catalog.snapshot().ok_or("dataset not loaded")?;
    let mut fresh = CollectionStore::open(FileStorage::open(dir.path().join("other"))?, DEFAULT_STORAGE_KEY);
    let outcome = transfer::import_from_path(&mut fresh, &path, &snapshot.valid_ids()).await?;
    println!("  Imported {} ids, dropped {}", outcome.accepted_ids.len(), outcome.dropped_ids.len());

    println!("\nDone!");
    Ok(())
}

fn sample_records() -> Vec<Record> {
    vec![
        Record::new("black-stallion", "Black Stallion", Expansion::Classic, MountCategory::Ground,
                    Faction::Alliance, SourceType::Vendor, "Stormwind City")
            .with_tags(&["horse"]),
        Record::new("black-war-kodo", "Black War Kodo", Expansion::Classic, MountCategory::Ground,
                    Faction::Horde, SourceType::Other, "Retired PvP reward")
            .with_tags(&["kodo", "retired"]),
        Record::new("red-drake", "Red Drake", Expansion::WrathOfTheLichKing, MountCategory::Flying,
                    Faction::Neutral, SourceType::Vendor, "Wyrmrest Accord, Revered")
            .with_zone("Dragonblight"),
        Record::new("heavenly-onyx-cloud-serpent", "Heavenly Onyx Cloud Serpent",
                    Expansion::MistsOfPandaria, MountCategory::Flying, Faction::Neutral,
                    SourceType::Drop, "Sha of Anger")
            .with_zone("Kun-Lai Summit"),
        Record::new("sea-turtle", "Sea Turtle", Expansion::Cataclysm, MountCategory::Aquatic,
                    Faction::Neutral, SourceType::Crafting, "Fishing")
            .with_tags(&["fishing"]),
    ]
}
