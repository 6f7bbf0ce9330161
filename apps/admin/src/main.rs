//! # Rental Admin CLI
//!
//! Drives the admin page controllers from a terminal against a live backend.
//! The session persists between runs in the data directory, so `login` once
//! and the other commands reuse the token.
//!
//! ## Example
//! ```text
//! rental-admin login admin@example.com --password admin123
//! rental-admin categories create "Cameras" --parent <electronics-id>
//! rental-admin due-today --days-ahead 3
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use rental_admin::pages::{
    BrandsPage, CategoryListPage, CategoryNewPage, CustomersPage, DashboardPage, InventoryPage,
    LocationsPage, LoginPage, PurchasesPage, RentalsDuePage, SalesPage, SkusPage, SuppliersPage,
};
use rental_admin::{init_tracing, AdminApp, HistoryNavigator, Route};
use rental_client::ClientConfig;
use rental_core::hierarchy;
use rental_core::{CustomerTier, InventoryStatus, LocationType};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "rental-admin")]
#[command(about = "Rental and inventory administration from the command line")]
#[command(version)]
struct Cli {
    /// Config file (defaults to admin.toml in the user config dir)
    #[arg(long, env = "RENTAL_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides the configured API base URL
    #[arg(long, env = "RENTAL_API_BASE_URL")]
    base_url: Option<String>,

    /// Print raw JSON instead of tables
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and keep the session for later commands
    Login {
        email: String,
        #[arg(long, env = "RENTAL_PASSWORD")]
        password: String,
    },

    /// End the session
    Logout,

    /// Show the dashboard summary
    Dashboard,

    /// Category hierarchy
    Categories {
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// List brands
    Brands {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "1")]
        page: u64,
    },

    /// List suppliers
    Suppliers {
        #[arg(long)]
        search: Option<String>,
        /// Include the analytics card
        #[arg(long)]
        analytics: bool,
    },

    /// List locations
    Locations {
        /// WAREHOUSE, STORE or SERVICE_CENTER
        #[arg(long = "type")]
        location_type: Option<LocationType>,
    },

    /// List SKUs
    Skus {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        rentable: bool,
        #[arg(long)]
        saleable: bool,
    },

    /// List sales transactions
    Sales {
        /// Also show the daily summary for this date (YYYY-MM-DD, default today)
        #[arg(long)]
        summary: Option<Option<NaiveDate>>,
    },

    /// List purchases
    Purchases {
        #[arg(long)]
        supplier: Option<String>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Also list returns recorded against this purchase
        #[arg(long)]
        returns_for: Option<String>,
    },

    /// List inventory units
    Inventory {
        /// Repeatable: --status AVAILABLE --status RENTED
        #[arg(long = "status")]
        statuses: Vec<InventoryStatus>,
        #[arg(long = "location")]
        locations: Vec<String>,
        /// Show the per-status counts
        #[arg(long)]
        counts: bool,
    },

    /// List customers
    Customers {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        tier: Option<CustomerTier>,
    },

    /// Rentals due back today
    DueToday {
        #[arg(long, default_value = "0")]
        days_ahead: u32,
        #[arg(long)]
        location: Option<String>,
        /// Hide overdue rentals
        #[arg(long)]
        no_overdue: bool,
    },
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// One page of categories
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "1")]
        page: u64,
    },

    /// The whole hierarchy, indented
    Tree,

    /// Create a category; omit --parent for a root
    Create {
        name: String,
        #[arg(long)]
        parent: Option<String>,
        #[arg(long, default_value = "0")]
        display_order: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = ClientConfig::load(cli.config.clone()).context("loading config")?;
    if let Some(url) = cli.base_url.clone() {
        config.api.base_url = url;
    }
    debug!(base_url = %config.base_url(), "Configuration loaded");

    let navigator = HistoryNavigator::new();
    let app = AdminApp::mount_default(config, Arc::new(navigator.clone()))
        .await
        .context("starting admin session")?;

    let result = run(&app, &cli).await;
    app.unmount().await?;
    result
}

async fn run(app: &AdminApp, cli: &Cli) -> Result<()> {
    if let Commands::Login { email, password } = &cli.command {
        let mut page = LoginPage::new(app.context(), None);
        page.fill(email, password)?;
        let landed = page.submit().await?;
        let name = app.auth().user().map(|u| u.display_name()).unwrap_or_default();
        println!("Signed in as {}", name);
        info!(?landed, "Signed in");
        return Ok(());
    }
    if let Commands::Logout = cli.command {
        app.logout().await?;
        println!("Signed out");
        return Ok(());
    }

    require_session(app, &cli.command)?;
    let ctx = app.context();

    match &cli.command {
        Commands::Login { .. } | Commands::Logout => {}

        Commands::Dashboard => {
            let mut page = DashboardPage::new(ctx);
            page.load().await?;
            println!("{}", page.greeting());
            if let Some(due) = page.rentals_due() {
                println!(
                    "Due today: {}  Overdue: {}  Revenue at risk: {:.2}",
                    due.total_due_today, due.total_overdue, due.total_revenue_at_risk
                );
            }
            for (label, route) in page.shortcuts() {
                println!("  {:<12} {}", label, route);
            }
        }

        Commands::Categories { command } => match command {
            CategoryCommands::List { search, page } => {
                let mut list = CategoryListPage::new(ctx);
                if *page > 1 {
                    list.go_to_page(*page);
                }
                match search {
                    Some(term) => list.search(term).await?,
                    None => list.load().await?,
                }
                if cli.json {
                    print_json(list.listing().items())?;
                } else if let Some(empty) = list.empty_message() {
                    println!("{}", empty);
                } else {
                    for row in list.rows() {
                        let kind = if row.is_leaf { "leaf" } else { "branch" };
                        println!("{:<38} L{} {:<6} {}", row.id, row.level, kind, row.path);
                    }
                }
            }
            CategoryCommands::Tree => {
                let forest = ctx.hooks.category_tree().fetch().await?;
                if cli.json {
                    print_json(&forest)?;
                } else {
                    for (depth, node) in hierarchy::flatten_tree(&forest) {
                        println!("{}{}", "  ".repeat(depth), node.category_name);
                    }
                }
            }
            CategoryCommands::Create {
                name,
                parent,
                display_order,
            } => {
                let mut page = CategoryNewPage::new(ctx);
                page.load().await?;
                page.set_name(name)?;
                page.select_parent(parent.as_deref())?;
                page.edit()?.display_order = *display_order;
                let preview = page.preview();
                debug!(path = %preview.path, level = preview.level, "Creating category");
                let created = page.submit().await?;
                println!("{} {}", created.id, created.category_path);
            }
        },

        Commands::Brands { search, page } => {
            let mut list = BrandsPage::new(ctx);
            list.go_to_page(*page);
            match search {
                Some(term) => list.search(term).await?,
                None => list.load().await?,
            }
            if cli.json {
                print_json(list.listing().items())?;
            } else if let Some(empty) = list.empty_message() {
                println!("{}", empty);
            } else {
                for brand in list.listing().items() {
                    println!("{:<38} {}", brand.id, brand.display_name());
                }
            }
        }

        Commands::Suppliers { search, analytics } => {
            let mut list = SuppliersPage::new(ctx);
            match search {
                Some(term) => list.search(term).await?,
                None => list.load().await?,
            }
            if *analytics {
                list.load_analytics().await;
            }
            if cli.json {
                print_json(list.listing().items())?;
            } else if let Some(empty) = list.empty_message() {
                println!("{}", empty);
            } else {
                for supplier in list.listing().items() {
                    println!(
                        "{:<12} {:<32} {}",
                        supplier.supplier_code,
                        supplier.label(),
                        supplier.supplier_tier.as_str()
                    );
                }
            }
            if let Some(stats) = list.analytics() {
                println!(
                    "{} suppliers, {} active, total spend {:.2}",
                    stats.total_suppliers, stats.active_suppliers, stats.total_spend
                );
            }
        }

        Commands::Locations { location_type } => {
            let mut list = LocationsPage::new(ctx);
            list.filter_type(*location_type).await?;
            if cli.json {
                print_json(list.listing().items())?;
            } else if let Some(empty) = list.empty_message() {
                println!("{}", empty);
            } else {
                for row in list.rows() {
                    println!("{:<10} {:<14} {:<28} {}", row.code, row.kind, row.name, row.address);
                }
            }
        }

        Commands::Skus {
            search,
            rentable,
            saleable,
        } => {
            let mut list = SkusPage::new(ctx);
            list.set_search(search.as_deref());
            list.filter(rentable.then_some(true), saleable.then_some(true), None)
                .await?;
            if cli.json {
                print_json(list.listing().items())?;
            } else if let Some(empty) = list.empty_message() {
                println!("{}", empty);
            } else {
                for sku in list.listing().items() {
                    println!(
                        "{:<16} {:<32} rent:{} sell:{}",
                        sku.sku_code, sku.sku_name, sku.is_rentable, sku.is_saleable
                    );
                }
            }
        }

        Commands::Sales { summary } => {
            let mut list = SalesPage::new(ctx);
            list.load().await?;
            if let Some(date) = summary {
                list.load_daily_summary(date.unwrap_or_else(|| Utc::now().date_naive()))
                    .await;
            }
            if cli.json {
                print_json(list.listing().items())?;
            } else if let Some(empty) = list.empty_message() {
                println!("{}", empty);
            } else {
                for txn in list.listing().items() {
                    println!(
                        "{:<16} {:?} {:?} total {:.2} due {:.2}",
                        txn.transaction_number,
                        txn.status,
                        txn.payment_status,
                        txn.total_amount,
                        txn.balance_due()
                    );
                }
            }
            if let Some(daily) = list.daily_summary() {
                println!(
                    "{} transactions, revenue {:.2}",
                    daily.total_transactions, daily.total_revenue
                );
            }
        }

        Commands::Purchases {
            supplier,
            from,
            to,
            returns_for,
        } => {
            let mut list = PurchasesPage::new(ctx);
            list.filter(supplier.as_deref(), None).await?;
            if from.is_some() || to.is_some() {
                list.filter_dates(*from, *to).await?;
            }
            if cli.json {
                print_json(list.listing().items())?;
            } else if let Some(empty) = list.empty_message() {
                println!("{}", empty);
            } else {
                for purchase in list.listing().items() {
                    println!(
                        "{:<38} {:<24} {:?} items {} total {:.2}",
                        purchase.id,
                        purchase.label(),
                        purchase.status,
                        purchase.total_items,
                        purchase.total_amount
                    );
                }
            }
            if let Some(purchase_id) = returns_for {
                list.filter_returns_by_purchase(Some(purchase_id)).await?;
                if let Some(empty) = list.returns_empty_message() {
                    println!("{}", empty);
                }
                for ret in list.returns().items() {
                    println!(
                        "  return {:<38} {:?} refund {:.2}",
                        ret.id, ret.status, ret.refund_amount
                    );
                }
            }
        }

        Commands::Inventory {
            statuses,
            locations,
            counts,
        } => {
            let mut list = InventoryPage::new(ctx);
            list.filter(locations.clone(), Vec::new(), statuses.clone(), Vec::new())
                .await?;
            if *counts {
                list.load_counts().await;
            }
            if cli.json {
                print_json(list.listing().items())?;
            } else if let Some(empty) = list.empty_message() {
                println!("{}", empty);
            } else {
                for unit in list.listing().items() {
                    println!(
                        "{:<20} {:<14} {:<12} grade {}",
                        unit.label(),
                        unit.status,
                        unit.location_id,
                        unit.condition_grade.as_str()
                    );
                }
            }
            if let Some(counts) = list.status_counts() {
                println!(
                    "{} units, {:.1}% on rent",
                    counts.total(),
                    counts.utilization()
                );
            }
        }

        Commands::Customers { search, tier } => {
            let mut list = CustomersPage::new(ctx);
            list.filter(None, *tier, None, None).await?;
            if let Some(term) = search {
                list.search(term).await?;
            }
            if cli.json {
                print_json(list.listing().items())?;
            } else if let Some(empty) = list.empty_message() {
                println!("{}", empty);
            } else {
                for customer in list.listing().items() {
                    let flag = if customer.is_blacklisted() { " (blacklisted)" } else { "" };
                    println!(
                        "{:<14} {:<32} {}{}",
                        customer.customer_code,
                        customer.display_name(),
                        customer.customer_tier.as_str(),
                        flag
                    );
                }
            }
        }

        Commands::DueToday {
            days_ahead,
            location,
            no_overdue,
        } => {
            let mut list = RentalsDuePage::new(ctx);
            list.filter(!no_overdue, location.as_deref(), *days_ahead)
                .await?;
            if cli.json {
                print_json(list.listing().items())?;
            } else if let Some(empty) = list.empty_message() {
                println!("{}", empty);
            } else {
                for rental in list.listing().items() {
                    let flag = if rental.is_overdue {
                        format!("{} days overdue", rental.days_overdue)
                    } else {
                        "due".to_string()
                    };
                    println!(
                        "{:<16} {:<24} {:<16} balance {:.2}",
                        rental.transaction_number, rental.customer_name, flag, rental.balance_due
                    );
                }
            }
        }
    }
    Ok(())
}

/// Every command but login needs a session; say so instead of printing the
/// login redirect.
fn require_session(app: &AdminApp, command: &Commands) -> Result<()> {
    let wanted = match command {
        Commands::Categories { .. } => Route::Categories,
        Commands::Brands { .. } => Route::Brands,
        Commands::Suppliers { .. } => Route::Suppliers,
        Commands::Locations { .. } => Route::Locations,
        Commands::Skus { .. } => Route::Skus,
        Commands::Sales { .. } => Route::Sales,
        Commands::Purchases { .. } => Route::Purchases,
        Commands::Inventory { .. } => Route::Inventory,
        Commands::Customers { .. } => Route::Customers,
        Commands::DueToday { .. } => Route::RentalsDueToday,
        _ => Route::Dashboard,
    };
    let landed = app.open(&wanted.path())?;
    if matches!(landed, Route::Login { .. }) {
        bail!("Not signed in. Run `rental-admin login <email>` first.");
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
