mod common;

use std::time::Duration;

use chanthana_client::shared::cart::pickup_at;
use chanthana_client::shared::draft::{EventRequestDraft, OrderDraft};
use chanthana_client::shared::models::{
    ClientCreate, ClientUpdate, EventStatus, EventType, OrderStatus, OrderStatusUpdate,
    PaymentStatus, Weekday, tables,
};
use chanthana_client::shared::ValidationError;
use chanthana_client::{
    AirtableConfig, ClientConfig, ClientError, ConfigStore, QueryKey, Store,
};
use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use common::MockAirtable;
use rust_decimal::Decimal;
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn seed_menu(mock: &MockAirtable) -> (String, String) {
    let pad_thai = mock.seed(
        tables::DISHES,
        json!({"Plat": "Pad Thaï", "Prix": 14.5, "Lundi dispo": "oui", "Mardi dispo": "non"}),
    );
    let curry = mock.seed(
        tables::DISHES,
        json!({"Plat": "Curry Vert", "Prix": 13.8, "Lundi dispo": "non", "Mardi dispo": "oui"}),
    );
    (pad_thai, curry)
}

#[tokio::test]
async fn test_reads_are_cached_per_table() {
    let mock = MockAirtable::start().await;
    seed_menu(&mock);
    let store = mock.store();

    let first = store.dishes().await.unwrap();
    let second = store.dishes().await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
    assert_eq!(mock.list_calls(tables::DISHES), 1);

    let monday = store.dishes_for(Weekday::Monday).await.unwrap();
    assert_eq!(monday.len(), 1);
    assert_eq!(monday[0].name, "Pad Thaï");
    assert_eq!(monday[0].price, Decimal::new(1450, 2));
    assert_eq!(mock.list_calls(tables::DISHES), 1);
}

#[tokio::test]
async fn test_concurrent_reads_share_one_request() {
    let mock = MockAirtable::start().await;
    seed_menu(&mock);
    let store = mock.store();

    let (a, b, c) = tokio::join!(store.dishes(), store.dishes(), store.dishes());
    assert_eq!(a.unwrap().len(), 2);
    assert_eq!(b.unwrap().len(), 2);
    assert_eq!(c.unwrap().len(), 2);
    assert_eq!(mock.list_calls(tables::DISHES), 1);
}

#[tokio::test]
async fn test_listing_follows_offset() {
    let mock = MockAirtable::start_with_page_size(2).await;
    for i in 0..5 {
        mock.seed(tables::CLIENTS, json!({"Nom": format!("Client {i}")}));
    }
    let store = mock.store();

    let clients = store.clients().await.unwrap();
    assert_eq!(clients.len(), 5);
    assert_eq!(mock.list_calls(tables::CLIENTS), 3);

    let offsets: Vec<_> = mock
        .requests()
        .into_iter()
        .filter_map(|r| r.query.get("offset").cloned())
        .collect();
    assert_eq!(offsets, vec!["2", "4"]);
}

#[tokio::test]
async fn test_create_client_invalidates_cache() {
    let mock = MockAirtable::start().await;
    mock.table(tables::CLIENTS);
    let store = mock.store();

    assert!(store.clients().await.unwrap().is_empty());

    let created = store
        .create_client(&ClientCreate {
            last_name: "Dupont".into(),
            first_name: "Malee".into(),
            email: "malee@example.com".into(),
            postal_code: Some("33000".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.name, "Malee Dupont");

    let sent = &mock.requests().last().unwrap().body.clone().unwrap();
    assert_eq!(sent["fields"]["Code postal"], 33000);
    assert_eq!(sent["fields"]["E-mail"], "malee@example.com");

    let clients = store.clients().await.unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(mock.list_calls(tables::CLIENTS), 2);
}

#[tokio::test]
async fn test_update_client_is_partial() {
    let mock = MockAirtable::start().await;
    let id = mock.seed(
        tables::CLIENTS,
        json!({"Nom": "Dupont", "Prénom": "Malee", "Ville": "Bordeaux"}),
    );
    let store = mock.store();

    let updated = store
        .update_client(
            &id,
            &ClientUpdate {
                phone: Some("0600000000".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("0600000000"));
    assert_eq!(updated.city.as_deref(), Some("Bordeaux"));

    let patch = mock.requests().last().unwrap().clone();
    assert_eq!(patch.method, "PATCH");
    assert_eq!(patch.body.unwrap(), json!({"fields": {"Numéro de téléphone": "0600000000"}}));

    let empty = store.update_client(&id, &ClientUpdate::default()).await;
    assert!(matches!(empty, Err(ClientError::Draft(_))));
}

#[tokio::test]
async fn test_place_order_creates_order_and_lines() {
    let mock = MockAirtable::start().await;
    let (pad_thai, curry) = seed_menu(&mock);
    mock.table(tables::ORDERS);
    mock.table(tables::ORDER_LINES);
    let client_id = mock.seed(tables::CLIENTS, json!({"Nom": "Dupont"}));
    let store = mock.store();

    let dishes = store.dishes().await.unwrap();
    let mut draft = OrderDraft {
        client_id: Some(client_id.clone()),
        special_request: Some("Sans cacahuètes".into()),
        ..Default::default()
    };
    for dish in &dishes {
        draft.cart.add(dish);
    }
    draft.cart.set_quantity(&pad_thai, 3);
    draft.pickup = Some(pickup_at(NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(), "12:30").unwrap());

    let placed = store.place_order_in(&draft, &Utc).await.unwrap();
    assert_eq!(placed.lines.len(), 2);

    let orders = mock.rows(tables::ORDERS);
    assert_eq!(orders.len(), 1);
    let fields = &orders[0]["fields"];
    assert_eq!(fields["Client R"], json!([client_id]));
    assert_eq!(fields["Statut commande"], "En attente de confirmation");
    assert_eq!(fields["Statut paiement"], "En attente sur place");
    assert_eq!(fields["Date & Heure de retrait souhaitées"], "2025-06-16T12:30:00.000Z");
    assert_eq!(fields["Demande spéciale commande"], "Sans cacahuètes");

    let lines = mock.rows(tables::ORDER_LINES);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["fields"]["Commande R"], json!([placed.order.id]));
    assert_eq!(lines[0]["fields"]["Plat R"], json!([pad_thai]));
    assert_eq!(lines[0]["fields"]["Quantité plat commandé"], 3);
    assert_eq!(lines[1]["fields"]["Plat R"], json!([curry]));

    let order_lines = store.order_lines(&placed.order.id).await.unwrap();
    assert_eq!(order_lines.len(), 2);
}

#[tokio::test]
async fn test_place_order_batches_lines_by_ten() {
    let mock = MockAirtable::start().await;
    for i in 0..12 {
        mock.seed(tables::DISHES, json!({"Plat": format!("Plat {i}"), "Prix": 10}));
    }
    mock.table(tables::ORDERS);
    mock.table(tables::ORDER_LINES);
    let store = mock.store();

    let mut draft = OrderDraft {
        client_id: Some("recClient".into()),
        ..Default::default()
    };
    for dish in store.dishes().await.unwrap() {
        draft.cart.add(&dish);
    }
    draft.pickup = Some(pickup_at(NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(), "19:00").unwrap());

    let placed = store.place_order_in(&draft, &Utc).await.unwrap();
    assert_eq!(placed.lines.len(), 12);

    let batch_sizes: Vec<usize> = mock
        .requests()
        .iter()
        .filter(|r| r.method == "POST" && r.table == tables::ORDER_LINES)
        .map(|r| r.body.as_ref().unwrap()["records"].as_array().unwrap().len())
        .collect();
    assert_eq!(batch_sizes, vec![10, 2]);
}

#[tokio::test]
async fn test_failed_line_batch_reports_order() {
    let mock = MockAirtable::start().await;
    let mut dish_ids = Vec::new();
    for i in 0..11 {
        dish_ids.push(mock.seed(tables::DISHES, json!({"Plat": format!("Plat {i}"), "Prix": 10})));
    }
    mock.table(tables::ORDERS);
    mock.table(tables::ORDER_LINES);
    mock.reject_value(&dish_ids[10]);
    let store = mock.store();

    // Warm the lines cache so a missed invalidation would show
    assert!(store.records(tables::ORDER_LINES).await.unwrap().is_empty());

    let mut draft = OrderDraft {
        client_id: Some("recClient".into()),
        ..Default::default()
    };
    for dish in store.dishes().await.unwrap() {
        draft.cart.add(&dish);
    }
    draft.pickup = Some(pickup_at(NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(), "19:00").unwrap());

    let err = store.place_order_in(&draft, &Utc).await.unwrap_err();
    let ClientError::PartialOrder { order_id, source } = &err else {
        panic!("expected a partial order, got {err:?}");
    };
    assert!(matches!(source.as_ref(), ClientError::Validation(_)));
    assert_eq!(err.status(), None);
    assert!(err.to_string().contains(order_id.as_str()));

    let orders = mock.rows(tables::ORDERS);
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], json!(order_id));

    assert_eq!(mock.rows(tables::ORDER_LINES).len(), 10);
    assert_eq!(store.records(tables::ORDER_LINES).await.unwrap().len(), 10);
}

#[tokio::test]
async fn test_invalid_draft_sends_nothing() {
    let mock = MockAirtable::start().await;
    mock.table(tables::ORDERS);
    let store = mock.store();

    let result = store.place_order(&OrderDraft::default()).await;
    assert!(matches!(
        result,
        Err(ClientError::Draft(ValidationError::EmptyCart))
    ));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_update_order_status() {
    let mock = MockAirtable::start().await;
    let id = mock.seed(
        tables::ORDERS,
        json!({"N° Commande": "CMD : 1", "Statut commande": "En attente de confirmation"}),
    );
    let store = mock.store();

    assert_eq!(
        store.orders().await.unwrap()[0].status,
        Some(OrderStatus::Pending)
    );

    let order = store
        .update_order_status(
            &id,
            &OrderStatusUpdate {
                status: Some(OrderStatus::Confirmed),
                payment_status: Some(PaymentStatus::PaidOnSite),
                internal_notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(order.status, Some(OrderStatus::Confirmed));

    let fresh = store.order(&id).await.unwrap();
    assert_eq!(fresh.payment_status, Some(PaymentStatus::PaidOnSite));
    assert_eq!(mock.list_calls(tables::ORDERS), 2);
}

#[tokio::test]
async fn test_order_falls_back_to_direct_fetch() {
    let mock = MockAirtable::start().await;
    mock.table(tables::ORDERS);
    let store = mock.store();
    assert!(store.orders().await.unwrap().is_empty());

    let id = mock.seed(tables::ORDERS, json!({"N° Commande": "CMD : 9"}));
    let order = store.order(&id).await.unwrap();
    assert_eq!(order.display_number(), "CMD : 9");

    let missing = store.order("recMissing").await;
    assert!(matches!(missing, Err(ClientError::NotFound(_))));
}

#[tokio::test]
async fn test_submit_event_request() {
    let mock = MockAirtable::start().await;
    mock.table(tables::EVENTS);
    let store = mock.store();

    let mut draft = EventRequestDraft {
        client_id: Some("recClient".into()),
        name: "Anniversaire de Malee".into(),
        event_type: Some(EventType::Birthday),
        guests: Some(20),
        ..Default::default()
    };
    draft.toggle_dish("recD1");

    let event = store.submit_event_request(&draft).await.unwrap();
    assert_eq!(event.status, Some(EventStatus::InitialRequest));
    assert_eq!(event.guests, Some(20));
    assert_eq!(event.dishes, vec!["recD1"]);
}

#[tokio::test]
async fn test_dashboard() {
    let mock = MockAirtable::start().await;
    mock.seed(
        tables::ORDERS,
        json!({
            "Statut commande": "En attente de confirmation",
            "Date & Heure de retrait souhaitées": "2025-06-14T10:30:00.000Z",
            "Total commande": 20
        }),
    );
    mock.seed(
        tables::ORDERS,
        json!({
            "Statut commande": "Annulée",
            "Date & Heure de retrait souhaitées": "2025-06-14T11:30:00.000Z",
            "Total commande": 50
        }),
    );
    mock.seed(tables::EVENTS, json!({"Statut événement": "Demande initiale"}));
    mock.seed(tables::CLIENTS, json!({"Nom": "Dupont"}));
    let store = mock.store();

    let paris = FixedOffset::east_opt(2 * 3600).unwrap();
    let now = paris.with_ymd_and_hms(2025, 6, 14, 8, 0, 0).unwrap();
    let stats = store.dashboard(&now).await.unwrap();

    assert_eq!(stats.pending_orders, 1);
    assert_eq!(stats.orders_today, 2);
    assert_eq!(stats.new_event_requests, 1);
    assert_eq!(stats.total_clients, 1);
    assert_eq!(stats.month_revenue, Decimal::new(20, 0));
}

#[tokio::test]
async fn test_errors_are_mapped() {
    let mock = MockAirtable::start().await;

    let store = mock.store();
    let missing = store.records("Nope DB").await;
    match missing {
        Err(ClientError::NotFound(message)) => assert!(message.contains("TABLE_NOT_FOUND")),
        other => panic!("unexpected: {other:?}"),
    }

    let (_, client_config) = mock.config();
    let bad_key = Store::new(AirtableConfig::new("patWRONG", common::BASE_ID), &client_config).unwrap();
    assert!(matches!(
        bad_key.test_connection().await,
        Err(ClientError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_connection_lists_one_record() {
    let mock = MockAirtable::start().await;
    seed_menu(&mock);
    let store = mock.store();

    store.test_connection().await.unwrap();
    let request = mock.requests().pop().unwrap();
    assert_eq!(request.table, "Plats DB");
    assert_eq!(request.query.get("maxRecords").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn test_from_resolved_requires_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_store = ConfigStore::new(dir.path());
    let mock = MockAirtable::start().await;
    let (config, client_config) = mock.config();

    // Only meaningful when the environment carries no key
    if std::env::var("AIRTABLE_API_KEY").is_err() {
        assert!(matches!(
            Store::from_resolved(&config_store, &client_config),
            Err(ClientError::NotConfigured)
        ));
    }

    config_store.save(&config).unwrap();
    assert!(Store::from_resolved(&config_store, &ClientConfig::new(&mock.url)).is_ok());
}

#[tokio::test]
async fn test_refresh_skips_other_credentials() {
    let mock = MockAirtable::start().await;
    seed_menu(&mock);
    mock.seed("Archives", json!({"Nom": "old"}));
    let store = mock.store();

    assert_eq!(store.dishes().await.unwrap().len(), 2);
    store
        .cache()
        .insert(QueryKey::new("Archives", "ffffffff"), Vec::new());
    mock.seed(tables::DISHES, json!({"Plat": "Som Tam", "Prix": 9}));

    store.refresh_all().await;

    assert_eq!(mock.list_calls("Archives"), 0);
    assert_eq!(mock.list_calls(tables::DISHES), 2);
    assert_eq!(
        store.cache().peek(&QueryKey::new("Archives", "ffffffff")),
        Some(Vec::new())
    );
    assert_eq!(store.dishes().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_refresh_racing_a_write_keeps_it_stale() {
    let mock = MockAirtable::start().await;
    seed_menu(&mock);
    let store = mock.store();

    assert_eq!(store.dishes().await.unwrap().len(), 2);
    let key = QueryKey::new(tables::DISHES, store.client().config().fingerprint());

    // A write invalidating the table after the refresh captured its generation
    let generation = store.cache().generation();
    store.cache().invalidate_table(tables::DISHES);
    store.cache().insert_fetched(key.clone(), Vec::new(), generation);
    assert_eq!(store.cache().get(&key), None);

    mock.seed(tables::DISHES, json!({"Plat": "Som Tam", "Prix": 9}));
    assert_eq!(store.dishes().await.unwrap().len(), 3);
    assert_eq!(mock.list_calls(tables::DISHES), 2);
}

#[tokio::test]
async fn test_background_refresh_keeps_cache_warm() {
    let mock = MockAirtable::start().await;
    seed_menu(&mock);
    let (config, client_config) = mock.config();
    let store = Store::new(config, &client_config.with_stale_time(Duration::from_secs(60))).unwrap();

    assert_eq!(store.dishes().await.unwrap().len(), 2);
    mock.seed(tables::DISHES, json!({"Plat": "Som Tam", "Prix": 9}));

    let cancel = CancellationToken::new();
    let handle = store.spawn_refresh(Duration::from_millis(50), cancel.clone());
    tokio::time::sleep(Duration::from_millis(300)).await;
    cancel.cancel();
    handle.await.unwrap();

    assert!(mock.list_calls(tables::DISHES) >= 2);
    assert_eq!(store.dishes().await.unwrap().len(), 3);
}
