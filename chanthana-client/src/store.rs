//! Cached data access per table
//!
//! Reads go through the [`QueryCache`]; writes hit the API directly and
//! invalidate the tables they touch.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use shared::dashboard::DashboardStats;
use shared::draft::{EventRequestDraft, OrderDraft};
use shared::models::{
    Client, ClientCreate, ClientUpdate, Dish, EventMenuType, EventRequest, Order, OrderLine,
    OrderStatusUpdate, Weekday, tables,
};
use shared::{AirtableRecord, ValidationError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::{QueryCache, QueryKey};
use crate::http::{AirtableClient, ListOptions};
use crate::{AirtableConfig, ClientConfig, ClientError, ClientResult, ConfigStore};

/// Order record with the lines created for it
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// Cached access to every table of the base
#[derive(Clone)]
pub struct Store {
    client: AirtableClient,
    cache: Arc<QueryCache<Vec<AirtableRecord>>>,
}

impl Store {
    /// Create a store with an empty cache
    pub fn new(config: AirtableConfig, client_config: &ClientConfig) -> ClientResult<Self> {
        let client = AirtableClient::new(config, client_config)?;
        Ok(Self {
            client,
            cache: Arc::new(QueryCache::new(client_config.stale_time)),
        })
    }

    /// Build from the environment or the saved configuration
    pub fn from_resolved(store: &ConfigStore, client_config: &ClientConfig) -> ClientResult<Self> {
        let config = store.resolve().ok_or(ClientError::NotConfigured)?;
        Self::new(config, client_config)
    }

    /// Underlying REST client, uncached
    pub fn client(&self) -> &AirtableClient {
        &self.client
    }

    /// Shared table cache
    pub fn cache(&self) -> &QueryCache<Vec<AirtableRecord>> {
        &self.cache
    }

    fn key(&self, table: &str) -> QueryKey {
        QueryKey::new(table, self.client.config().fingerprint())
    }

    // ========== Reads ==========

    /// All records of a table, cached
    pub async fn records(&self, table: &str) -> ClientResult<Vec<AirtableRecord>> {
        let key = self.key(table);
        self.cache
            .fetch(&key, || async move {
                self.client
                    .list_records(table, &ListOptions::default())
                    .await
            })
            .await
    }

    async fn mapped<T>(&self, table: &str, map: fn(&AirtableRecord) -> T) -> ClientResult<Vec<T>> {
        Ok(self.records(table).await?.iter().map(map).collect())
    }

    /// All client profiles
    pub async fn clients(&self) -> ClientResult<Vec<Client>> {
        self.mapped(tables::CLIENTS, Client::from_record).await
    }

    /// All dishes of the menu
    pub async fn dishes(&self) -> ClientResult<Vec<Dish>> {
        self.mapped(tables::DISHES, Dish::from_record).await
    }

    /// Dishes on the menu for `day`
    pub async fn dishes_for(&self, day: Weekday) -> ClientResult<Vec<Dish>> {
        Ok(self
            .dishes()
            .await?
            .into_iter()
            .filter(|dish| dish.is_available_on(day))
            .collect())
    }

    /// All orders
    pub async fn orders(&self) -> ClientResult<Vec<Order>> {
        self.mapped(tables::ORDERS, Order::from_record).await
    }

    /// One order, from the cached list or fetched directly
    pub async fn order(&self, id: &str) -> ClientResult<Order> {
        if let Some(order) = self.orders().await?.into_iter().find(|o| o.id == id) {
            return Ok(order);
        }
        let record = self.client.get_record(tables::ORDERS, id).await?;
        Ok(Order::from_record(&record))
    }

    /// Lines of one order
    pub async fn order_lines(&self, order_id: &str) -> ClientResult<Vec<OrderLine>> {
        Ok(self
            .mapped(tables::ORDER_LINES, OrderLine::from_record)
            .await?
            .into_iter()
            .filter(|line| line.order.as_deref() == Some(order_id))
            .collect())
    }

    /// All event requests
    pub async fn events(&self) -> ClientResult<Vec<EventRequest>> {
        self.mapped(tables::EVENTS, EventRequest::from_record).await
    }

    /// Event menu templates
    pub async fn menu_types(&self) -> ClientResult<Vec<EventMenuType>> {
        self.mapped(tables::EVENT_MENU_TYPES, EventMenuType::from_record)
            .await
    }

    /// Dashboard counters as of `now`
    pub async fn dashboard<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ClientResult<DashboardStats> {
        let (orders, events, clients) =
            tokio::try_join!(self.orders(), self.events(), self.clients())?;
        Ok(DashboardStats::compute(&orders, &events, &clients, now))
    }

    // ========== Writes ==========

    /// Create a client profile
    pub async fn create_client(&self, create: &ClientCreate) -> ClientResult<Client> {
        let record = self
            .client
            .create_record(tables::CLIENTS, create.to_fields())
            .await?;
        self.cache.invalidate_table(tables::CLIENTS);
        Ok(Client::from_record(&record))
    }

    /// Update the given profile fields of a client
    pub async fn update_client(&self, id: &str, update: &ClientUpdate) -> ClientResult<Client> {
        if update.is_empty() {
            return Err(ValidationError::invalid("client", "nothing to update").into());
        }
        let record = self
            .client
            .update_record(tables::CLIENTS, id, update.to_fields())
            .await?;
        self.cache.invalidate_table(tables::CLIENTS);
        Ok(Client::from_record(&record))
    }

    /// Change status, payment status or notes of an order
    pub async fn update_order_status(
        &self,
        id: &str,
        update: &OrderStatusUpdate,
    ) -> ClientResult<Order> {
        if update.is_empty() {
            return Err(ValidationError::invalid("order", "nothing to update").into());
        }
        let record = self
            .client
            .update_record(tables::ORDERS, id, update.to_fields())
            .await?;
        self.cache.invalidate_table(tables::ORDERS);
        Ok(Order::from_record(&record))
    }

    /// Place an order, pickup time in the local timezone
    pub async fn place_order(&self, draft: &OrderDraft) -> ClientResult<PlacedOrder> {
        self.place_order_in(draft, &Local).await
    }

    /// Create the order, then one line per cart entry
    ///
    /// Lines are not rolled back on failure: an order without lines stays
    /// visible to the admin, and the error is [`ClientError::PartialOrder`]
    /// carrying its id.
    pub async fn place_order_in<Tz: TimeZone>(
        &self,
        draft: &OrderDraft,
        tz: &Tz,
    ) -> ClientResult<PlacedOrder> {
        let create = draft.order_create(tz)?;
        let record = self
            .client
            .create_record(tables::ORDERS, create.to_fields())
            .await?;
        self.cache.invalidate_table(tables::ORDERS);

        let rows = draft
            .line_creates(&record.id)
            .iter()
            .map(|line| line.to_fields())
            .collect();
        let created = self.client.create_records(tables::ORDER_LINES, rows).await;
        // Earlier batches may have landed even when a later one failed
        self.cache.invalidate_table(tables::ORDER_LINES);
        let lines = match created {
            Ok(lines) => lines,
            Err(e) => {
                tracing::error!(order = %record.id, error = %e, "Order created without all its lines");
                return Err(ClientError::PartialOrder {
                    order_id: record.id,
                    source: Box::new(e),
                });
            }
        };

        let order = Order::from_record(&record);
        tracing::info!(
            order = %order.id,
            lines = lines.len(),
            total = %draft.cart.total(),
            "Order placed"
        );
        Ok(PlacedOrder {
            order,
            lines: lines.iter().map(OrderLine::from_record).collect(),
        })
    }

    /// Create an event request from a validated draft
    pub async fn submit_event_request(&self, draft: &EventRequestDraft) -> ClientResult<EventRequest> {
        let create = draft.event_create()?;
        let record = self
            .client
            .create_record(tables::EVENTS, create.to_fields())
            .await?;
        self.cache.invalidate_table(tables::EVENTS);
        Ok(EventRequest::from_record(&record))
    }

    /// List one record of the configured table
    pub async fn test_connection(&self) -> ClientResult<()> {
        self.client.test_connection().await
    }

    // ========== Background refresh ==========

    /// Refetch every cached table each `interval` until `cancel` fires
    ///
    /// Failed refetches keep the previous value.
    pub fn spawn_refresh(&self, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => store.refresh_all().await,
                }
            }
            tracing::debug!("Background refresh stopped");
        })
    }

    /// Refetch every table cached for this credential
    pub async fn refresh_all(&self) {
        let credential = self.client.config().fingerprint();
        for key in self.cache.keys() {
            if key.credential != credential {
                continue;
            }
            let generation = self.cache.generation();
            match self
                .client
                .list_records(&key.table, &ListOptions::default())
                .await
            {
                Ok(records) => {
                    tracing::debug!(table = %key.table, count = records.len(), "Refreshed");
                    self.cache.insert_fetched(key, records, generation);
                }
                Err(e) => {
                    tracing::warn!(table = %key.table, error = %e, "Background refresh failed");
                }
            }
        }
    }
}
