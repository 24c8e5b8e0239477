//! Catalog directory management and the file-backed product store.

use crate::atomic::atomic_write;
use crate::config::CatalogConfig;
use crate::error::{FsError, Result};
use catalog_core::{OrderBatch, OrderEvent, Position, Product, ProductQuery, ProductStore};
use chrono::{DateTime, Utc};
use slug::slugify;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Directory name for catalog configuration.
const CATALOG_DIR: &str = ".catalog";
/// Configuration file name.
const CONFIG_FILE: &str = "config.yml";
/// Categories directory name.
const CATEGORIES_DIR: &str = "catalog/categories";
/// Products document within a category directory.
const PRODUCTS_FILE: &str = "products.yml";
/// Events file name within a category directory.
const EVENTS_FILE: &str = "events.ndjson";

/// A catalog stores products on the filesystem, one YAML document per
/// category. A batch commit rewrites that document in a single rename.
#[derive(Debug)]
pub struct Catalog {
    /// Root path of the catalog.
    root: PathBuf,
    /// Catalog configuration.
    config: CatalogConfig,
    /// Recorded on every event this handle writes.
    actor: Option<String>,
}

impl Catalog {
    /// Initialize a new catalog at the given path.
    ///
    /// # Errors
    /// Returns error if the catalog already exists or IO fails.
    pub fn init(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let catalog_dir = root.join(CATALOG_DIR);

        if catalog_dir.exists() {
            return Err(FsError::CatalogExists(root));
        }

        fs::create_dir_all(&catalog_dir)?;
        fs::create_dir_all(root.join(CATEGORIES_DIR))?;

        let config = CatalogConfig::default();
        let config_content = serde_yaml::to_string(&config)?;
        fs::write(catalog_dir.join(CONFIG_FILE), config_content)?;

        info!(path = %root.display(), "Initialized catalog");

        Ok(Self {
            root,
            config,
            actor: None,
        })
    }

    /// Open an existing catalog at the given path.
    ///
    /// # Errors
    /// Returns error if the catalog doesn't exist or config is invalid.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let config_path = root.join(CATALOG_DIR).join(CONFIG_FILE);

        if !config_path.exists() {
            return Err(FsError::CatalogNotFound(root));
        }

        let config_content = fs::read_to_string(&config_path)?;
        let config: CatalogConfig = serde_yaml::from_str(&config_content)?;

        debug!(path = %root.display(), "Opened catalog");

        Ok(Self {
            root,
            config,
            actor: None,
        })
    }

    /// Tag events written through this handle with `actor`.
    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Get the catalog root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the catalog configuration.
    #[must_use]
    pub const fn config(&self) -> &CatalogConfig {
        &self.config
    }

    fn categories_dir(&self) -> PathBuf {
        self.root.join(CATEGORIES_DIR)
    }

    /// Path to a category's directory. The id is checked so it cannot
    /// escape the categories directory.
    fn category_dir(&self, category_id: &str) -> Result<PathBuf> {
        let safe = !category_id.is_empty()
            && category_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(FsError::InvalidCategory(category_id.to_string()));
        }
        Ok(self.categories_dir().join(category_id))
    }

    /// Add a product to a category with no position assigned.
    ///
    /// The product id is the slug of its name.
    ///
    /// # Errors
    /// Returns error if the name has no usable slug, the product already
    /// exists, or IO fails.
    pub fn create_product(&self, category_id: &str, name: impl Into<String>) -> Result<Product> {
        let name = name.into();
        let product_id = slugify(&name);
        if product_id.is_empty() {
            return Err(FsError::InvalidSlug(name));
        }

        let mut products = self.read_products(category_id)?;
        if products.iter().any(|p| p.id == product_id) {
            return Err(FsError::ProductExists(format!("{category_id}/{product_id}")));
        }

        let product = Product::new(&product_id, category_id, &name);
        products.push(product.clone());
        self.write_products(category_id, &products)?;

        let event = self.tagged(OrderEvent::product_added(category_id, &product_id));
        self.append_event(category_id, &event)?;

        info!(category = %category_id, product = %product_id, name = %name, "Created product");

        Ok(product)
    }

    /// Get a product by category and id.
    ///
    /// # Errors
    /// Returns error if the product doesn't exist or the document is invalid.
    pub fn get_product(&self, category_id: &str, product_id: &str) -> Result<Product> {
        self.read_products(category_id)?
            .into_iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| FsError::ProductNotFound(format!("{category_id}/{product_id}")))
    }

    /// List the ids of every category that holds products.
    ///
    /// # Errors
    /// Returns error if the categories directory cannot be walked.
    pub fn list_categories(&self) -> Result<Vec<String>> {
        let categories_dir = self.categories_dir();
        if !categories_dir.exists() {
            return Ok(Vec::new());
        }

        let mut categories = Vec::new();
        for entry in WalkDir::new(&categories_dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_dir() || !entry.path().join(PRODUCTS_FILE).exists() {
                continue;
            }
            categories.push(entry.file_name().to_string_lossy().to_string());
        }

        categories.sort();
        Ok(categories)
    }

    /// Append an event to a category's event log.
    ///
    /// # Errors
    /// Returns error if the log cannot be opened or written.
    pub fn append_event(&self, category_id: &str, event: &OrderEvent) -> Result<()> {
        let category_dir = self.category_dir(category_id)?;
        fs::create_dir_all(&category_dir)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(category_dir.join(EVENTS_FILE))?;

        let json_line = serde_json::to_string(event)?;
        writeln!(file, "{json_line}")?;

        debug!(category = %category_id, event_type = %event.event_type, "Appended event");

        Ok(())
    }

    /// Read events for a category, optionally filtered by time.
    ///
    /// # Errors
    /// Returns error if the log exists but cannot be read or parsed.
    pub fn read_events(
        &self,
        category_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<OrderEvent>> {
        let events_path = self.category_dir(category_id)?.join(EVENTS_FILE);

        if !events_path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&events_path)?);
        let mut events = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let event: OrderEvent = serde_json::from_str(&line)?;

            if since.is_none_or(|s| event.timestamp >= s) {
                events.push(event);
            }
        }

        Ok(events)
    }

    // Private helpers

    fn tagged(&self, event: OrderEvent) -> OrderEvent {
        match &self.actor {
            Some(actor) => event.with_actor(actor.as_str()),
            None => event,
        }
    }

    fn read_products(&self, category_id: &str) -> Result<Vec<Product>> {
        let products_path = self.category_dir(category_id)?.join(PRODUCTS_FILE);

        if !products_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&products_path)?;
        let products: Vec<Product> = serde_yaml::from_str(&content)?;
        Ok(products)
    }

    fn write_products(&self, category_id: &str, products: &[Product]) -> Result<()> {
        let category_dir = self.category_dir(category_id)?;
        fs::create_dir_all(&category_dir)?;

        let content = serde_yaml::to_string(products)?;
        atomic_write(&category_dir.join(PRODUCTS_FILE), &content)
    }

    fn commit_batch(&self, batch: &OrderBatch) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut products = self.read_products(&batch.category_id)?;
        let previous: HashMap<String, Position> =
            products.iter().map(|p| (p.id.clone(), p.order)).collect();

        batch.apply_to(&mut products)?;
        self.write_products(&batch.category_id, &products)?;

        let event = self.tagged(OrderEvent::committed(batch, |id| {
            previous.get(id).copied().unwrap_or_default()
        }));
        if let Err(e) = self.append_event(&batch.category_id, &event) {
            warn!(category = %batch.category_id, error = %e, "Batch committed but event log append failed");
        }

        debug!(category = %batch.category_id, kind = ?batch.kind, updates = batch.len(), "Committed batch");

        Ok(batch.len())
    }
}

impl ProductStore for Catalog {
    fn find(&self, query: &ProductQuery) -> catalog_core::Result<Vec<Product>> {
        let products = self.read_products(&query.category_id)?;
        Ok(query.select(products))
    }

    fn commit(&self, batch: &OrderBatch) -> catalog_core::Result<usize> {
        Ok(self.commit_batch(batch)?)
    }
}
