//! Plain-text rendering of the views

use chanthana_client::AirtableConfig;
use rust_decimal::Decimal;
use shared::dashboard::DashboardStats;
use shared::models::{Client, Dish, EventMenuType, EventRequest, Order, OrderLine};

pub fn euros(amount: Decimal) -> String {
    format!("{:.2} €", amount.round_dp(2))
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

pub fn config(config: &AirtableConfig, source: &str) {
    println!("source:  {source}");
    println!("api key: {} (fingerprint)", config.fingerprint());
    println!("base:    {}", config.base_id);
    println!("table:   {}", config.table_name);
}

pub fn dishes(dishes: &[Dish]) {
    if dishes.is_empty() {
        println!("No dishes");
        return;
    }
    for dish in dishes {
        let days: Vec<&str> = dish.available_days().iter().map(|d| d.label()).collect();
        let stock = if dish.is_sold_out() { "  [épuisé]" } else { "" };
        println!(
            "{:<18} {:<32} {:>10}  {}{stock}",
            dish.id,
            dish.name,
            euros(dish.price),
            days.join(", ")
        );
    }
}

pub fn clients(clients: &[Client]) {
    if clients.is_empty() {
        println!("No clients");
        return;
    }
    for client in clients {
        println!(
            "{:<18} {:<28} {:<30} {}",
            client.id,
            client.name,
            client.email,
            or_dash(client.phone.as_deref())
        );
    }
}

pub fn orders(orders: &[&Order]) {
    if orders.is_empty() {
        println!("No orders");
        return;
    }
    for order in orders {
        let pickup = order
            .pickup_at
            .map(|at| at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string());
        println!(
            "{:<18} {:<12} {:<18} {:<28} {:>10}",
            order.id,
            order.display_number(),
            or_dash(pickup.as_deref()),
            or_dash(order.status.as_ref().map(|s| s.label())),
            euros(order.total)
        );
    }
}

pub fn order_detail(order: &Order, lines: &[OrderLine], dishes: &[Dish]) {
    println!("order:    {} ({})", order.display_number(), order.id);
    println!("client:   {}", or_dash(order.client.as_deref()));
    if let Some(at) = order.pickup_at {
        println!(
            "pickup:   {}",
            at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
        );
    }
    println!(
        "status:   {}",
        or_dash(order.status.as_ref().map(|s| s.label()))
    );
    println!(
        "payment:  {}",
        or_dash(order.payment_status.as_ref().map(|s| s.label()))
    );
    if let Some(request) = &order.special_request {
        println!("request:  {request}");
    }
    if let Some(notes) = &order.internal_notes {
        println!("notes:    {notes}");
    }
    println!();
    for line in lines {
        let name = line
            .dish
            .as_deref()
            .and_then(|id| dishes.iter().find(|d| d.id == id))
            .map_or_else(|| or_dash(line.dish.as_deref()), |d| d.name.as_str());
        println!(
            "  {:>3} x {:<32} {:>10}",
            line.quantity,
            name,
            euros(line.subtotal)
        );
    }
    println!("  total {:>45}", euros(order.total));
}

pub fn events(events: &[EventRequest]) {
    if events.is_empty() {
        println!("No event requests");
        return;
    }
    for event in events {
        let date = event.date.map(|d| d.format("%Y-%m-%d").to_string());
        let guests = event.guests.map(|g| format!("{g} pers."));
        println!(
            "{:<18} {:<32} {:<10} {:<10} {}",
            event.id,
            event.name,
            or_dash(date.as_deref()),
            or_dash(guests.as_deref()),
            or_dash(event.status.as_ref().map(|s| s.label()))
        );
    }
}

pub fn menu_types(menus: &[EventMenuType]) {
    if menus.is_empty() {
        println!("No menu templates");
        return;
    }
    for menu in menus {
        let price = menu.price_per_person.map(|p| format!("{} / pers.", euros(p)));
        let suited: Vec<&str> = menu.suited_for.iter().map(|t| t.label()).collect();
        println!(
            "{:<18} {:<28} {:<16} {:<12} {}",
            menu.id,
            menu.name,
            or_dash(price.as_deref()),
            or_dash(menu.guest_range.as_deref()),
            suited.join(", ")
        );
    }
}

pub fn dashboard(stats: &DashboardStats) {
    println!("Commandes en attente    {}", stats.pending_orders);
    println!("Commandes aujourd'hui   {}", stats.orders_today);
    println!("Nouvelles demandes      {}", stats.new_event_requests);
    println!("Clients                 {}", stats.total_clients);
    println!("Commandes (total)       {}", stats.total_orders);
    println!("Événements (total)      {}", stats.total_events);
    println!("Chiffre d'affaires mois {}", euros(stats.month_revenue));
}
