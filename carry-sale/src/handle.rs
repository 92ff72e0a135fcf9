//! Shared, async access to a sale.
//!
//! [`SaleHandle`] wraps a [`Crowdsale`] in `Arc<RwLock<_>>`. Mutations hold the
//! write lock for their whole check-then-mutate sequence, so concurrent
//! contributions can never jointly overshoot a cap. Events of successful
//! mutations are published on a broadcast channel.

use std::sync::Arc;

use carry_token::{TokenLedger, ValueLedger};
use tokio::sync::{broadcast, RwLock};

use crate::context::Context;
use crate::error::SaleError;
use crate::event::{Response, SaleEvent};
use crate::sale::Crowdsale;
use crate::snapshot::SaleSnapshot;

/// Default capacity of the event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

pub struct SaleHandle<T: TokenLedger, V: ValueLedger> {
    sale: Arc<RwLock<Crowdsale<T, V>>>,
    events: broadcast::Sender<SaleEvent>,
}

impl<T: TokenLedger, V: ValueLedger> Clone for SaleHandle<T, V> {
    fn clone(&self) -> Self {
        SaleHandle {
            sale: Arc::clone(&self.sale),
            events: self.events.clone(),
        }
    }
}

impl<T, V> SaleHandle<T, V>
where
    T: TokenLedger + Send + Sync,
    V: ValueLedger + Send + Sync,
{
    pub fn new(sale: Crowdsale<T, V>) -> Self {
        Self::with_capacity(sale, EVENT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(sale: Crowdsale<T, V>, capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        SaleHandle {
            sale: Arc::new(RwLock::new(sale)),
            events,
        }
    }

    /// Receive the events of every mutation that succeeds from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SaleEvent> {
        self.events.subscribe()
    }

    /// Run a mutating operation under the write lock and publish its events.
    pub async fn execute<F>(&self, op: F) -> Result<Response, SaleError>
    where
        F: FnOnce(&mut Crowdsale<T, V>) -> Result<Response, SaleError>,
    {
        let resp = {
            let mut sale = self.sale.write().await;
            op(&mut sale)?
        };
        for event in resp.events() {
            // No subscribers is fine.
            let _ = self.events.send(event.clone());
        }
        Ok(resp)
    }

    /// Run a read-only query under the read lock.
    pub async fn query<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Crowdsale<T, V>) -> R,
    {
        let sale = self.sale.read().await;
        f(&sale)
    }

    pub async fn contribute(&self, ctx: Context) -> Result<Response, SaleError> {
        self.execute(|sale| sale.contribute(&ctx)).await
    }

    pub async fn pause(&self, ctx: Context) -> Result<Response, SaleError> {
        self.execute(|sale| sale.pause(&ctx)).await
    }

    pub async fn unpause(&self, ctx: Context) -> Result<Response, SaleError> {
        self.execute(|sale| sale.unpause(&ctx)).await
    }

    pub async fn snapshot(&self) -> SaleSnapshot {
        self.query(|sale| sale.snapshot()).await
    }

    pub async fn verify_invariants(&self) -> Result<(), SaleError> {
        self.query(|sale| sale.verify_invariants()).await
    }
}
