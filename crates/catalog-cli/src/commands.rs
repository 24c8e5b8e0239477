//! CLI command implementations.

use crate::output::{self, OutputFormat, ProductRow};
use anyhow::{Context, Result};
use catalog_core::{OrderTarget, OrderingService};
use catalog_fs::Catalog;
use chrono::{Duration, Utc};
use console::style;
use std::path::Path;

/// Events written from the command line are attributed to this actor.
const ACTOR: &str = "cli";

fn open_catalog(path: &Path) -> Result<Catalog> {
    Ok(Catalog::open(path)
        .context("Failed to open catalog")?
        .with_actor(ACTOR))
}

fn open_service(path: &Path) -> Result<OrderingService<Catalog>> {
    let catalog = open_catalog(path)?;
    let serialize = catalog.config().ordering.serialize_group_writes;
    Ok(OrderingService::with_serialization(catalog, serialize))
}

/// Initialize a new catalog.
pub fn init(path: &Path, format: OutputFormat) -> Result<()> {
    Catalog::init(path).context("Failed to initialize catalog")?;
    output::print_success(
        &format!("Initialized catalog at {}", path.display()),
        format,
    );
    Ok(())
}

/// Add a product to a category.
pub fn add(path: &Path, category: &str, name: &str, format: OutputFormat) -> Result<()> {
    let catalog = open_catalog(path)?;
    let product = catalog
        .create_product(category, name)
        .context("Failed to create product")?;

    output::print(&product, format);
    Ok(())
}

/// List a category's products in display order.
pub fn list(path: &Path, category: &str, format: OutputFormat) -> Result<()> {
    let service = open_service(path)?;
    let products = service
        .products(category)
        .context("Failed to list products")?;

    if products.is_empty() {
        output::print_success(&format!("No products in {category}"), format);
        return Ok(());
    }

    let rows: Vec<ProductRow> = products.iter().map(ProductRow::from).collect();
    output::print_product_list(&rows, format);
    Ok(())
}

/// Assign positions to products that have none.
pub fn organize(path: &Path, category: &str, format: OutputFormat) -> Result<()> {
    let service = open_service(path)?;
    let report = service
        .auto_organize(category)
        .context("Failed to organize products")?;

    output::print(&report, format);
    Ok(())
}

/// Resequence a category to 1..N.
pub fn dedupe(path: &Path, category: &str, format: OutputFormat) -> Result<()> {
    let service = open_service(path)?;
    let report = service
        .fix_duplicates(category)
        .context("Failed to fix duplicate positions")?;

    output::print(&report, format);
    Ok(())
}

/// Move a product, or clear its position.
pub fn reorder(
    path: &Path,
    category: &str,
    product: &str,
    position: &str,
    format: OutputFormat,
) -> Result<()> {
    let target: OrderTarget = position.parse().context("Invalid position")?;

    let service = open_service(path)?;
    let report = service
        .reorder(product, category, target)
        .context("Failed to reorder product")?;

    if matches!(format, OutputFormat::Human) {
        let message = match target {
            OrderTarget::Clear => format!("  {product} → (no position)"),
            OrderTarget::Position(n) => format!("  {product} → {n}"),
        };
        println!("{}", style(message).green().bold());
    }

    output::print(&report, format);
    Ok(())
}

/// Show order change history.
pub fn history(
    path: &Path,
    category: &str,
    since_days: Option<u32>,
    format: OutputFormat,
) -> Result<()> {
    let catalog = Catalog::open(path).context("Failed to open catalog")?;

    let since = since_days.map(|days| Utc::now() - Duration::days(i64::from(days)));

    let events = catalog
        .read_events(category, since)
        .context("Failed to read events")?;

    if events.is_empty() {
        output::print_success("No events found", format);
        return Ok(());
    }

    output::print_list(&events, format);
    Ok(())
}

/// Start the HTTP API server.
pub fn serve(path: &Path, host: Option<String>, port: Option<u16>) -> Result<()> {
    let catalog = Catalog::open(path).context("Failed to open catalog")?;
    let settings = &catalog.config().server;
    let host = host.unwrap_or_else(|| settings.host.clone());
    let port = port.unwrap_or(settings.port);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async { catalog_server::serve(path, &host, port).await })
}
