//! Command-line definitions

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use shared::models::{EventType, OrderStatus, PaymentStatus, Weekday};

#[derive(Parser)]
#[command(name = "chanthana")]
#[command(version, about = "Orders, menu and event requests of the Chanthana restaurant", long_about = None)]
pub struct Cli {
    /// Directory holding the saved Airtable configuration
    #[arg(long, global = true, env = "CHANTHANA_CONFIG_DIR", default_value = ".chanthana")]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show, save, clear or test the Airtable configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Dump the raw records of a table as JSON
    Records {
        /// Table name, e.g. "Plats DB"
        table: String,

        /// Stop after this many records
        #[arg(short, long)]
        max: Option<usize>,
    },

    /// Dishes on the menu
    Menu {
        /// Only dishes available that day (lundi, mardi, ...)
        #[arg(short, long)]
        day: Option<Weekday>,
    },

    /// List clients
    Clients,

    /// Create or update a client profile
    Client {
        #[command(subcommand)]
        action: ClientAction,
    },

    /// List orders
    Orders {
        /// Only orders with this status
        #[arg(short, long)]
        status: Option<OrderStatus>,

        /// Search in the order number and client
        #[arg(short = 'q', long)]
        search: Option<String>,
    },

    /// Show, update or place an order
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },

    /// List event requests
    Events,

    /// Submit an event request
    Event {
        #[command(subcommand)]
        action: EventAction,
    },

    /// List event menu templates
    Menus,

    /// Admin dashboard counters
    Dashboard {
        /// Refresh every SECS seconds until interrupted
        #[arg(short, long, value_name = "SECS")]
        watch: Option<u64>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the active configuration (the key is shown as a fingerprint)
    Show,

    /// Test then save a configuration
    Set {
        /// Personal access token
        #[arg(long)]
        api_key: String,

        /// Base id (app...)
        #[arg(long)]
        base_id: Option<String>,

        /// Table used by the connection test
        #[arg(long)]
        table: Option<String>,

        /// Save without testing the connection
        #[arg(long)]
        no_test: bool,
    },

    /// Remove the saved configuration
    Clear,

    /// Test the active configuration
    Test,
}

#[derive(Subcommand)]
pub enum ClientAction {
    /// Create a client
    Create {
        #[arg(long)]
        last_name: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        email: String,

        #[command(flatten)]
        details: ClientDetails,
    },

    /// Update a client; only the given fields change
    Update {
        /// Client record id
        id: String,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[command(flatten)]
        details: ClientDetails,
    },
}

#[derive(Args)]
pub struct ClientDetails {
    #[arg(long)]
    pub phone: Option<String>,

    /// Street and number
    #[arg(long)]
    pub street: Option<String>,

    #[arg(long)]
    pub postal_code: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    /// Allergies, favourite dishes...
    #[arg(long)]
    pub preference: Option<String>,

    #[arg(long)]
    pub birth_date: Option<NaiveDate>,

    #[arg(long)]
    pub newsletter: Option<bool>,
}

#[derive(Subcommand)]
pub enum OrderAction {
    /// Show an order and its lines
    Show {
        /// Order record id
        id: String,
    },

    /// Change the status of an order
    Status {
        /// Order record id
        id: String,

        #[arg(short, long)]
        status: Option<OrderStatus>,

        #[arg(short, long)]
        payment: Option<PaymentStatus>,

        /// Internal notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Place an order for pickup
    Place {
        /// Client record id
        #[arg(long)]
        client: String,

        /// Dish record id, optionally with a quantity: recXXX:2
        #[arg(short, long = "item", value_name = "DISH[:QTY]", value_parser = parse_item, required = true)]
        items: Vec<(String, u32)>,

        /// Pickup date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Pickup slot, e.g. 12:30
        #[arg(long)]
        slot: String,

        /// Special request
        #[arg(long)]
        note: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum EventAction {
    /// Submit a new event request
    Request {
        /// Client record id
        #[arg(long)]
        client: String,

        /// Event name
        #[arg(long)]
        name: String,

        #[arg(long = "type")]
        event_type: Option<EventType>,

        /// Event date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Event start time (HH:MM)
        #[arg(long, requires = "date", value_parser = parse_time)]
        time: Option<NaiveTime>,

        #[arg(long)]
        guests: Option<u32>,

        /// Budget in euros
        #[arg(long)]
        budget: Option<Decimal>,

        /// Pre-selected dish record id (repeatable)
        #[arg(long = "dish")]
        dishes: Vec<String>,

        /// Special requests
        #[arg(long)]
        note: Option<String>,
    },
}

/// Parse `dish_id` or `dish_id:qty`
pub fn parse_item(s: &str) -> Result<(String, u32), String> {
    let (id, qty) = match s.rsplit_once(':') {
        Some((id, qty)) => {
            let qty = qty
                .parse::<u32>()
                .map_err(|_| format!("invalid quantity in '{s}'"))?;
            (id, qty)
        }
        None => (s, 1),
    };
    if id.trim().is_empty() {
        return Err(format!("missing dish id in '{s}'"));
    }
    if qty == 0 {
        return Err(format!("quantity must be at least 1 in '{s}'"));
    }
    Ok((id.trim().to_string(), qty))
}

/// Parse `HH:MM` or `HH:MM:SS`
pub fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| format!("invalid time '{s}', expected HH:MM"))
}
