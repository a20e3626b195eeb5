//! Scripted [`MarketDataProvider`] for gateway tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::domain::{CacheKey, OptionsChain, Quote, Symbol};
use crate::error::ProviderError;
use crate::port::MarketDataProvider;

/// A typical upstream outage: HTTP 503 with a recognizable body.
pub fn outage(provider: &'static str) -> ProviderError {
    ProviderError::Status {
        provider,
        status: 503,
        body: "service unavailable".into(),
    }
}

/// In-memory provider with canned data.
///
/// Every call sleeps for the configured delay (Tokio time, so paused-clock
/// tests stay instant), records its request, then returns the scripted
/// failure if one is set, the canned value if there is one, or
/// [`ProviderError::NoData`].
pub struct ScriptedProvider {
    name: &'static str,
    delay: Duration,
    failure: Mutex<Option<ProviderError>>,
    quotes: HashMap<Symbol, Quote>,
    expirations: HashMap<Symbol, Vec<NaiveDate>>,
    chains: HashMap<(Symbol, NaiveDate), OptionsChain>,
    requests: Mutex<Vec<CacheKey>>,
    quote_calls: AtomicUsize,
    expiration_calls: AtomicUsize,
    chain_calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            delay: Duration::ZERO,
            failure: Mutex::new(None),
            quotes: HashMap::new(),
            expirations: HashMap::new(),
            chains: HashMap::new(),
            requests: Mutex::new(Vec::new()),
            quote_calls: AtomicUsize::new(0),
            expiration_calls: AtomicUsize::new(0),
            chain_calls: AtomicUsize::new(0),
        }
    }

    /// Serve `price` for `symbol`.
    ///
    /// # Panics
    ///
    /// Panics if `symbol` is blank.
    pub fn with_quote(mut self, symbol: &str, price: f64) -> Self {
        let symbol = Symbol::parse(symbol).expect("scripted symbol must not be blank");
        self.quotes
            .insert(symbol.clone(), Quote::new(symbol, Some(price), None));
        self
    }

    /// Serve `dates` for `symbol`.
    ///
    /// # Panics
    ///
    /// Panics if `symbol` is blank.
    pub fn with_expirations(mut self, symbol: &str, dates: Vec<NaiveDate>) -> Self {
        let symbol = Symbol::parse(symbol).expect("scripted symbol must not be blank");
        self.expirations.insert(symbol, dates);
        self
    }

    /// Serve `chain` for its own symbol and expiration.
    pub fn with_chain(mut self, chain: OptionsChain) -> Self {
        self.chains
            .insert((chain.symbol.clone(), chain.expiration), chain);
        self
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail every call with `err` until [`recover`](Self::recover) is called.
    pub fn failing_with(self, err: ProviderError) -> Self {
        self.fail_with(err);
        self
    }

    pub fn fail_with(&self, err: ProviderError) {
        *self.failure.lock() = Some(err);
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    pub fn expiration_calls(&self) -> usize {
        self.expiration_calls.load(Ordering::SeqCst)
    }

    pub fn chain_calls(&self) -> usize {
        self.chain_calls.load(Ordering::SeqCst)
    }

    /// Total calls across all operations.
    pub fn calls(&self) -> usize {
        self.quote_calls() + self.expiration_calls() + self.chain_calls()
    }

    /// Every request received so far, in order, keyed like the gateway keys.
    pub fn requests(&self) -> Vec<CacheKey> {
        self.requests.lock().clone()
    }

    async fn answer<T: Clone>(
        &self,
        key: CacheKey,
        canned: Option<&T>,
    ) -> Result<T, ProviderError> {
        self.requests.lock().push(key.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(err) = self.failure.lock().clone() {
            return Err(err);
        }
        canned
            .cloned()
            .ok_or_else(|| ProviderError::no_data(self.name, key.as_str()))
    }
}

#[async_trait]
impl MarketDataProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn get_quote(&self, symbol: &Symbol) -> Result<Quote, ProviderError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(CacheKey::quote(symbol), self.quotes.get(symbol))
            .await
    }

    async fn get_expirations(&self, symbol: &Symbol) -> Result<Vec<NaiveDate>, ProviderError> {
        self.expiration_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(CacheKey::expirations(symbol), self.expirations.get(symbol))
            .await
    }

    async fn get_chain(
        &self,
        symbol: &Symbol,
        expiration: NaiveDate,
    ) -> Result<OptionsChain, ProviderError> {
        self.chain_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(
            CacheKey::chain(symbol, expiration),
            self.chains.get(&(symbol.clone(), expiration)),
        )
        .await
    }
}
