//! Command handlers

use std::time::Duration;

use anyhow::{Context, bail};
use chanthana_client::{
    AirtableClient, AirtableConfig, ClientConfig, ConfigStore, ListOptions, Store,
};
use chrono::{Datelike, Local, NaiveTime, TimeZone, Utc};
use shared::cart::pickup_at;
use shared::dashboard::OrderFilter;
use shared::draft::{EventRequestDraft, OrderDraft};
use shared::models::{ClientCreate, ClientUpdate, OrderStatusUpdate, Weekday};
use tokio_util::sync::CancellationToken;

use crate::cli::{
    ClientAction, ClientDetails, Cli, Commands, ConfigAction, EventAction, OrderAction,
};
use crate::output;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_store = ConfigStore::new(&cli.config_dir);
    let client_config = ClientConfig::from_env();
    let connect = || {
        Store::from_resolved(&config_store, &client_config)
            .context("run `chanthana config set --api-key ...` first")
    };

    match cli.command {
        Commands::Config { action } => config(action, &config_store, &client_config).await?,
        Commands::Records { table, max } => {
            let store = connect()?;
            let records = match max {
                Some(n) => {
                    store
                        .client()
                        .list_records(&table, &ListOptions::max_records(n))
                        .await?
                }
                None => store.records(&table).await?,
            };
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Menu { day } => {
            let store = connect()?;
            let dishes = match day {
                Some(day) => store.dishes_for(day).await?,
                None => store.dishes().await?,
            };
            output::dishes(&dishes);
        }
        Commands::Clients => output::clients(&connect()?.clients().await?),
        Commands::Client { action } => client(action, &connect()?).await?,
        Commands::Orders { status, search } => {
            let orders = connect()?.orders().await?;
            let filter = OrderFilter { status, search };
            output::orders(&filter.apply(&orders));
        }
        Commands::Order { action } => order(action, &connect()?).await?,
        Commands::Events => output::events(&connect()?.events().await?),
        Commands::Event { action } => event(action, &connect()?).await?,
        Commands::Menus => output::menu_types(&connect()?.menu_types().await?),
        Commands::Dashboard { watch } => dashboard(watch, &connect()?).await?,
    }
    Ok(())
}

async fn config(
    action: ConfigAction,
    config_store: &ConfigStore,
    client_config: &ClientConfig,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            if let Some(config) = AirtableConfig::from_env() {
                output::config(&config, "environment");
            } else if let Some(config) = config_store.load() {
                output::config(&config, &config_store.path().display().to_string());
            } else {
                println!("Not configured");
            }
        }
        ConfigAction::Set {
            api_key,
            base_id,
            table,
            no_test,
        } => {
            let mut config = AirtableConfig::new(api_key.trim(), base_id.unwrap_or_default());
            if config.base_id.is_empty() {
                config.base_id = AirtableConfig::default().base_id;
            }
            if let Some(table) = table {
                config = config.with_table(table);
            }
            config.validate()?;

            if !no_test {
                AirtableClient::new(config.clone(), client_config)?
                    .test_connection()
                    .await
                    .context("connection test failed, configuration not saved")?;
            }
            config_store.save(&config)?;
            println!("Saved to {}", config_store.path().display());
        }
        ConfigAction::Clear => {
            config_store.clear()?;
            println!("Configuration cleared");
        }
        ConfigAction::Test => {
            let store = Store::from_resolved(config_store, client_config)?;
            store.test_connection().await?;
            println!("Connection OK");
        }
    }
    Ok(())
}

fn apply_details(update: &mut ClientUpdate, details: ClientDetails) {
    update.phone = details.phone;
    update.street = details.street;
    update.postal_code = details.postal_code;
    update.city = details.city;
    update.preference = details.preference;
    update.birth_date = details.birth_date;
    update.newsletter = details.newsletter;
}

async fn client(action: ClientAction, store: &Store) -> anyhow::Result<()> {
    match action {
        ClientAction::Create {
            last_name,
            first_name,
            email,
            details,
        } => {
            let create = ClientCreate {
                last_name,
                first_name,
                email,
                preference: details.preference,
                phone: details.phone,
                street: details.street,
                postal_code: details.postal_code,
                city: details.city,
                how_heard: Vec::new(),
                newsletter: details.newsletter,
                birth_date: details.birth_date,
            };
            let client = store.create_client(&create).await?;
            println!("Created client {} ({})", client.name, client.id);
        }
        ClientAction::Update {
            id,
            last_name,
            first_name,
            email,
            details,
        } => {
            let mut update = ClientUpdate {
                last_name,
                first_name,
                email,
                ..Default::default()
            };
            apply_details(&mut update, details);
            let client = store.update_client(&id, &update).await?;
            println!("Updated client {} ({})", client.name, client.id);
        }
    }
    Ok(())
}

async fn order(action: OrderAction, store: &Store) -> anyhow::Result<()> {
    match action {
        OrderAction::Show { id } => {
            let (order, lines, dishes) = tokio::try_join!(
                store.order(&id),
                store.order_lines(&id),
                store.dishes()
            )?;
            output::order_detail(&order, &lines, &dishes);
        }
        OrderAction::Status {
            id,
            status,
            payment,
            notes,
        } => {
            let update = OrderStatusUpdate {
                status,
                payment_status: payment,
                internal_notes: notes,
            };
            let order = store.update_order_status(&id, &update).await?;
            println!(
                "{}: {} / {}",
                order.display_number(),
                order.status.as_ref().map_or("-", |s| s.label()),
                order.payment_status.as_ref().map_or("-", |s| s.label())
            );
        }
        OrderAction::Place {
            client,
            items,
            date,
            slot,
            note,
        } => {
            let dishes = store.dishes().await?;
            let mut draft = OrderDraft {
                client_id: Some(client),
                special_request: note,
                ..Default::default()
            };
            for (dish_id, quantity) in items {
                let Some(dish) = dishes.iter().find(|d| d.id == dish_id) else {
                    bail!("unknown dish {dish_id}");
                };
                let day = Weekday::from(date.weekday());
                if !dish.is_available_on(day) {
                    tracing::warn!(dish = %dish.name, day = %day, "Dish not on the menu that day");
                }
                draft.cart.add_quantity(dish, quantity);
            }
            draft.pickup = Some(pickup_at(date, &slot)?);

            let placed = store.place_order(&draft).await?;
            println!(
                "Order {} placed: {} item(s), {}",
                placed.order.display_number(),
                draft.cart.item_count(),
                output::euros(draft.cart.total())
            );
        }
    }
    Ok(())
}

async fn event(action: EventAction, store: &Store) -> anyhow::Result<()> {
    match action {
        EventAction::Request {
            client,
            name,
            event_type,
            date,
            time,
            guests,
            budget,
            dishes,
            note,
        } => {
            let date = match date {
                Some(date) => {
                    let local = date.and_time(time.unwrap_or(NaiveTime::MIN));
                    let at = Local
                        .from_local_datetime(&local)
                        .earliest()
                        .context("event time does not exist in the local timezone")?;
                    Some(at.with_timezone(&Utc))
                }
                None => None,
            };
            let mut draft = EventRequestDraft {
                client_id: Some(client),
                name,
                event_type,
                date,
                guests,
                budget,
                special_requests: note,
                dishes: Vec::new(),
            };
            for dish in &dishes {
                if !draft.is_selected(dish) {
                    draft.toggle_dish(dish);
                }
            }

            let event = store.submit_event_request(&draft).await?;
            println!("Event request {} submitted ({})", event.name, event.id);
        }
    }
    Ok(())
}

async fn dashboard(watch: Option<u64>, store: &Store) -> anyhow::Result<()> {
    let Some(secs) = watch else {
        output::dashboard(&store.dashboard(&Local::now()).await?);
        return Ok(());
    };

    let interval = Duration::from_secs(secs.max(1));
    let cancel = CancellationToken::new();
    let refresher = store.spawn_refresh(interval, cancel.clone());

    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                match store.dashboard(&Local::now()).await {
                    Ok(stats) => {
                        println!("--- {} ---", Local::now().format("%H:%M:%S"));
                        output::dashboard(&stats);
                    }
                    Err(e) => tracing::warn!(error = %e, "Dashboard refresh failed"),
                }
            }
        }
    }

    cancel.cancel();
    refresher.await?;
    Ok(())
}
