//! ChefFlow admin tool.
//!
//! Usage:
//!   chefflow normalize <name>
//!   chefflow display-name <tenant-id>
//!   chefflow register <name>
//!   chefflow tenants
//!   chefflow seed <tenant-id>
//!   chefflow migrate <name>
//!   chefflow cleanup-legacy
//!   chefflow board <tenant-id> <prep|cleaning>
//!   chefflow path <tenant-id> <segment>...
//!
//! The database is `~/.chefflow/chefflow.db` unless `databasePath` is set in
//! `~/.chefflow/config.json`. Set `RUST_LOG=debug` for more output.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;

use chefflow_lib::day_buckets::{formatted_today, DayBuckets};
use chefflow_lib::db::DocumentDb;
use chefflow_lib::paths;
use chefflow_lib::services::{cleaning, inventory, migration, prep, tenants};
use chefflow_lib::state::load_config;
use chefflow_lib::tenant;
use chefflow_lib::TenantContext;

const USAGE: &str = "usage: chefflow <normalize|display-name|register|tenants|seed|migrate|cleanup-legacy|board|path> [args...]";

fn open_db() -> Result<DocumentDb> {
    let configured = load_config()
        .ok()
        .and_then(|c| c.database_path)
        .map(PathBuf::from);
    let db = match configured {
        Some(path) => DocumentDb::open_at(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?,
        None => DocumentDb::open().context("Failed to open database")?,
    };
    Ok(db)
}

fn tenant_context(tenant_id: &str) -> Result<TenantContext> {
    TenantContext::for_tenant(tenant_id).map_err(|e| anyhow!("{e}"))
}

/// Remaining arguments joined as one name, so quoting is optional.
fn joined(args: &[String], what: &str) -> Result<String> {
    if args.is_empty() {
        bail!("missing {what}\n{USAGE}");
    }
    Ok(args.join(" "))
}

fn print_bucket<T>(title: &str, items: &[T], line: impl Fn(&T) -> String) {
    println!("{title}:");
    if items.is_empty() {
        println!("  (nothing)");
    }
    for item in items {
        println!("  {}", line(item));
    }
}

fn print_board<T>(board: &DayBuckets<T>, line: impl Fn(&T) -> String) {
    println!("{}", formatted_today(&Local::now()));
    print_bucket("Today", &board.today, &line);
    print_bucket("Yesterday", &board.yesterday, &line);
}

fn check(done: bool) -> &'static str {
    if done {
        "[x]"
    } else {
        "[ ]"
    }
}

fn run(command: &str, args: &[String]) -> Result<()> {
    match command {
        "normalize" => {
            println!("{}", tenant::normalize_tenant_name(&joined(args, "name")?));
        }
        "display-name" => {
            let id = args.first().ok_or_else(|| anyhow!("missing tenant id\n{USAGE}"))?;
            println!("{}", tenant::display_name(id));
        }
        "register" => {
            let db = open_db()?;
            let id = tenants::register_tenant(&db, &joined(args, "name")?)?;
            println!("{id}");
        }
        "tenants" => {
            let db = open_db()?;
            for t in tenants::list_tenants(&db)? {
                println!("{}\t{}", t.id, t.display_name);
            }
        }
        "seed" => {
            let id = args.first().ok_or_else(|| anyhow!("missing tenant id\n{USAGE}"))?;
            let db = open_db()?;
            let report = inventory::seed_all(&db, &tenant_context(id)?)?;
            println!(
                "Seeded {} suppliers and {} fridges for {}",
                report.suppliers, report.fridges, id
            );
        }
        "migrate" => {
            let db = open_db()?;
            let report = migration::migrate_to_tenant(&db, &joined(args, "restaurant name")?)?;
            for (name, n) in &report.collections {
                println!("{name}: {n}");
            }
            println!("recipe categories: {}", report.recipe_categories);
            println!("recipes: {}", report.recipes);
            println!("fridge readings: {}", report.fridge_readings);
            println!("downloads: {}", report.downloads);
            println!("Migrated {} documents to {}", report.total(), report.tenant_id);
        }
        "cleanup-legacy" => {
            let db = open_db()?;
            let removed = migration::cleanup_legacy_collections(&db)?;
            println!("Removed {removed} legacy documents");
        }
        "board" => {
            let (id, list) = match args {
                [id, list] => (id, list.as_str()),
                _ => bail!("usage: chefflow board <tenant-id> <prep|cleaning>"),
            };
            let db = open_db()?;
            let ctx = tenant_context(id)?;
            let now = Local::now();
            match list {
                "prep" => {
                    let board = prep::prep_board(&db, &ctx, &now)?;
                    print_board(&board, |i| {
                        let flag = if i.urgent { " (urgent)" } else { "" };
                        format!("{} {}{}", check(i.done), i.name, flag)
                    });
                }
                "cleaning" => {
                    let board = cleaning::cleaning_board(&db, &ctx, &now)?;
                    print_board(&board, |t| format!("{} {}", check(t.done), t.name));
                }
                other => bail!("unknown list {other:?}, expected prep or cleaning"),
            }
        }
        "path" => {
            let (id, segments) = args
                .split_first()
                .ok_or_else(|| anyhow!("missing tenant id\n{USAGE}"))?;
            let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
            let path = if segments.len() % 2 == 1 {
                paths::nested_collection_ref(id, &segments)?.path()
            } else {
                paths::nested_document_ref(id, &segments)?.path()
            };
            println!("{path}");
        }
        other => bail!("unknown command {other:?}\n{USAGE}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, rest) = args
        .split_first()
        .ok_or_else(|| anyhow!("{USAGE}"))?;
    run(command, rest)
}
