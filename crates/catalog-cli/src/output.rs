//! Output formatting for the CLI.

use catalog_core::{
    DedupeReport, OrderEvent, OrganizeReport, Position, Product, RepositionReport,
};
use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;
use std::fmt::Write;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Print output in the specified format.
pub fn print<T: Serialize + HumanDisplay>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Human => println!("{}", value.human_display()),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(value).expect("Failed to serialize to JSON")
            );
        }
        OutputFormat::Yaml => {
            println!(
                "{}",
                serde_yaml::to_string(value).expect("Failed to serialize to YAML")
            );
        }
    }
}

/// Print a list in the specified format.
pub fn print_list<T: Serialize + HumanDisplay>(values: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Human => {
            for value in values {
                println!("{}", value.human_display());
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(values).expect("Failed to serialize to JSON")
            );
        }
        OutputFormat::Yaml => {
            println!(
                "{}",
                serde_yaml::to_string(values).expect("Failed to serialize to YAML")
            );
        }
    }
}

/// Print a category's products with dynamic column widths.
pub fn print_product_list(rows: &[ProductRow], format: OutputFormat) {
    if !matches!(format, OutputFormat::Human) {
        print_list(rows, format);
        return;
    }

    let pos_width = rows
        .iter()
        .map(|r| r.order.to_string().len())
        .max()
        .unwrap_or(3)
        .max(3);
    let id_width = rows.iter().map(|r| r.id.len()).max().unwrap_or(2).max(2);

    println!(
        "{:>pos_w$}  {:<id_w$}  {}",
        "POS",
        "ID",
        "NAME",
        pos_w = pos_width,
        id_w = id_width
    );
    println!("{}", "-".repeat(pos_width + id_width + 20));

    for row in rows {
        println!(
            "{:>pos_w$}  {:<id_w$}  {}",
            row.order.to_string(),
            row.id,
            row.name,
            pos_w = pos_width,
            id_w = id_width
        );
    }
}

/// Print a success message.
pub fn print_success(message: &str, format: OutputFormat) {
    match format {
        OutputFormat::Human => println!("{message}"),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({ "status": "ok", "message": message })
            );
        }
        OutputFormat::Yaml => {
            println!("status: ok\nmessage: {message}");
        }
    }
}

/// Trait for human-readable display.
pub trait HumanDisplay {
    fn human_display(&self) -> String;
}

impl HumanDisplay for Product {
    fn human_display(&self) -> String {
        let mut out = String::new();

        writeln!(out, "ID:        {}", self.id).unwrap();
        writeln!(out, "Name:      {}", self.name).unwrap();
        writeln!(out, "Category:  {}", self.category_id).unwrap();
        writeln!(out, "Position:  {}", self.order).unwrap();
        writeln!(out, "Created:   {}", format_time(&self.created_at)).unwrap();
        writeln!(out, "Updated:   {}", format_time(&self.updated_at)).unwrap();

        out
    }
}

impl HumanDisplay for OrderEvent {
    fn human_display(&self) -> String {
        let actor = self.actor.as_deref().unwrap_or("system");
        let time = format_time(&self.timestamp);

        let changes = self
            .payload
            .changes
            .iter()
            .map(|c| format!("{} {} → {}", c.product_id, c.from, c.to))
            .collect::<Vec<_>>()
            .join(", ");

        format!("[{time}] {actor}: {} - {changes}", self.event_type)
    }
}

impl HumanDisplay for OrganizeReport {
    fn human_display(&self) -> String {
        match (self.start_order, self.end_order) {
            (Some(start), Some(end)) => style(format!(
                "  ✓ Organized {} product(s) into positions {start}..={end}",
                self.organized
            ))
            .green()
            .to_string(),
            _ => style("  Nothing to organize.").dim().to_string(),
        }
    }
}

impl HumanDisplay for DedupeReport {
    fn human_display(&self) -> String {
        style(format!(
            "  ✓ Updated {} of {} product(s)",
            self.updated, self.total_items
        ))
        .green()
        .to_string()
    }
}

impl HumanDisplay for RepositionReport {
    fn human_display(&self) -> String {
        format!("  {} product(s) updated", self.updated)
    }
}

fn format_time(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Row view of a product for list output.
#[derive(Debug, Serialize)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub order: Position,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            order: product.order,
        }
    }
}

impl HumanDisplay for ProductRow {
    fn human_display(&self) -> String {
        format!("{:>4}  {:<30} {}", self.order.to_string(), self.id, self.name)
    }
}
