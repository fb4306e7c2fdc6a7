//! `GardenClient` builder and session-bound garden access.
//!
//! This is the entry point for applications. It ties together the
//! layers: wallet session → garden poller → slot actions, and keeps the
//! poller's lifetime tied to the session token it was started with.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chaingarden_garden::{
    GardenError, GardenPoller, GardenState, GardenStats, PestAlert,
    PollerHandle, SlotLocks, plant_and_reload, refresh_garden,
    remove_and_reload,
};
use chaingarden_protocol::{GardenApi, Plant, SessionToken};
use chaingarden_session::{
    SessionError, SessionManager, SessionState, SmartWalletFactory,
    WalletProvider,
};
use chaingarden_transport::{HttpTransport, Transport};

use crate::{ChainGardenError, ClientConfig, Notice, Notifier};

/// Builder for a [`GardenClient`].
///
/// # Example
///
/// ```rust,ignore
/// use chaingarden::prelude::*;
///
/// let mut client = GardenClientBuilder::new()
///     .config(ClientConfig::from_env())
///     .build(my_wallet, my_smart_wallet_factory)?;
/// client.connect_wallet().await?;
/// client.authenticate().await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct GardenClientBuilder {
    config: ClientConfig,
}

impl GardenClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the backend base URL.
    pub fn api_url(mut self, url: &str) -> Self {
        self.config.api_url = url.to_string();
        self
    }

    /// Sets how often the garden is reloaded while authenticated.
    pub fn polling_interval(mut self, interval: std::time::Duration) -> Self {
        self.config.polling_interval = interval;
        self
    }

    /// Builds a client talking HTTP to the configured API URL.
    pub fn build<P, F>(
        self,
        provider: P,
        factory: F,
    ) -> Result<GardenClient<P, F, HttpTransport>, ChainGardenError>
    where
        P: WalletProvider,
        F: SmartWalletFactory,
    {
        let transport =
            HttpTransport::with_timeout(&self.config.api_url, self.config.request_timeout)?;
        Ok(self.build_with_transport(provider, factory, transport))
    }

    /// Builds a client over any transport.
    pub fn build_with_transport<P, F, T>(
        self,
        provider: P,
        factory: F,
        transport: T,
    ) -> GardenClient<P, F, T>
    where
        P: WalletProvider,
        F: SmartWalletFactory,
        T: Transport,
    {
        let api = Arc::new(GardenApi::new(transport));
        let session = SessionManager::new(
            provider,
            factory,
            Arc::clone(&api),
            self.config.session_config(),
        );
        GardenClient {
            session,
            api,
            garden: Arc::new(tokio::sync::Mutex::new(GardenState::new())),
            locks: SlotLocks::new(),
            poller: None,
            notifier: Mutex::new(Notifier::new(self.config.notice_ttl)),
            config: self.config,
        }
    }
}

/// A wallet-gated garden client.
///
/// Wallet and session transitions take `&mut self`. Slot actions take
/// `&self`, so two actions can be in flight at once; the per-slot locks
/// keep them off each other's slots.
pub struct GardenClient<P, F, T = HttpTransport>
where
    P: WalletProvider,
    F: SmartWalletFactory,
    T: Transport,
{
    session: SessionManager<P, F, T>,
    api: Arc<GardenApi<T>>,
    garden: Arc<tokio::sync::Mutex<GardenState>>,
    locks: SlotLocks,
    /// Present only while authenticated.
    poller: Option<PollerHandle>,
    notifier: Mutex<Notifier>,
    config: ClientConfig,
}

impl<P, F, T> GardenClient<P, F, T>
where
    P: WalletProvider,
    F: SmartWalletFactory,
    T: Transport,
{
    // -- wallet and session ---------------------------------------------------

    /// Points the wallet at the configured chain.
    pub async fn initialize(&mut self) -> Result<(), ChainGardenError> {
        self.session.initialize_connection().await.map_err(|e| {
            self.notifier().error(e.to_string());
            e.into()
        })
    }

    /// Connects the wallet and returns its address.
    ///
    /// A successful connect replaces any running session, so polling
    /// stops until the next [`authenticate`](Self::authenticate). A
    /// failed connect leaves the current session, and its poller, alone.
    pub async fn connect_wallet(&mut self) -> Result<String, ChainGardenError> {
        self.notifier().status("Connecting wallet...");

        match self.session.connect().await {
            Ok(conn) => {
                let address = conn.address.clone();
                self.stop_polling().await;
                self.notifier().status("Wallet connected");
                Ok(address)
            }
            Err(e) => {
                self.notifier().error(format!("Failed to connect wallet: {e}"));
                Err(e.into())
            }
        }
    }

    /// Signs in with the connected wallet and starts polling the garden.
    pub async fn authenticate(&mut self) -> Result<(), ChainGardenError> {
        self.stop_polling().await;
        self.notifier().status("Authenticating...");

        let token = match self.session.authenticate().await {
            Ok(token) => token,
            Err(e) => {
                let message = match &e {
                    SessionError::AuthRejected(_) => "User rejected the request.".to_string(),
                    other => other.to_string(),
                };
                self.notifier().error(message);
                return Err(e.into());
            }
        };

        self.notifier().status("Authentication successful");
        self.start_polling(token);
        Ok(())
    }

    /// Reacts to the wallet reporting a new account list.
    pub async fn handle_accounts_changed(&mut self, accounts: &[String]) {
        self.stop_polling().await;
        self.session.handle_accounts_changed(accounts).await;
        self.garden.lock().await.clear();
    }

    /// Handles every account change the wallet has reported so far.
    /// Returns how many were handled.
    pub async fn pump_account_changes(&mut self) -> usize {
        let mut handled = 0;
        while let Some(accounts) = self.session.poll_account_change() {
            self.handle_accounts_changed(&accounts).await;
            handled += 1;
        }
        handled
    }

    /// Waits for the next account change and handles it. Returns `false`
    /// once the wallet's subscription is gone.
    pub async fn handle_next_account_change(&mut self) -> bool {
        match self.session.next_account_change().await {
            Some(accounts) => {
                self.handle_accounts_changed(&accounts).await;
                true
            }
            None => false,
        }
    }

    /// Ends the session and forgets the garden. Idempotent.
    pub async fn disconnect(&mut self) {
        self.stop_polling().await;
        self.session.disconnect().await;
        self.garden.lock().await.clear();
        self.notifier().status("Disconnected");
    }

    // -- garden ---------------------------------------------------------------

    /// Reloads the garden now, outside the polling cadence.
    pub async fn refresh(&self) -> Result<(), ChainGardenError> {
        let token = self.require_token()?;
        refresh_garden(&self.api, &token, &self.garden).await?;
        Ok(())
    }

    /// Plants a seed and waits for the garden to reload.
    pub async fn plant_seed(
        &self,
        slot: u32,
        plant_type_id: &str,
    ) -> Result<Plant, ChainGardenError> {
        self.notifier().status("Planting...");
        let result = match self.require_token() {
            Ok(token) => {
                plant_and_reload(&self.api, &token, &self.garden, &self.locks, slot, plant_type_id)
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(plant) => {
                self.notifier().status("Plant added successfully");
                Ok(plant)
            }
            Err(e) => {
                self.notifier().error(format!("Failed to plant: {e}"));
                Err(e.into())
            }
        }
    }

    /// Removes (harvests) a plant and waits for the garden to reload.
    pub async fn remove_plant(&self, plant_id: &str) -> Result<(), ChainGardenError> {
        self.notifier().status("Harvesting...");
        let result = match self.require_token() {
            Ok(token) => {
                remove_and_reload(&self.api, &token, &self.garden, &self.locks, plant_id).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.notifier().status("Plant removed successfully");
                Ok(())
            }
            Err(e) => {
                self.notifier().error(format!("Failed to remove: {e}"));
                Err(e.into())
            }
        }
    }

    /// A copy of the current garden snapshot.
    pub async fn snapshot(&self) -> GardenState {
        self.garden.lock().await.clone()
    }

    /// Derived figures for the current snapshot.
    pub async fn stats(&self) -> Option<GardenStats> {
        self.garden.lock().await.stats()
    }

    pub async fn pest_alert(&self) -> Option<PestAlert> {
        self.garden
            .lock()
            .await
            .garden()
            .and_then(PestAlert::from_garden)
    }

    // -- accessors --------------------------------------------------------------

    /// The current notice, until it expires.
    pub fn notice(&self) -> Option<Notice> {
        self.notifier().current().cloned()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &SessionManager<P, F, T> {
        &self.session
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.is_finished())
    }

    pub fn slot_locks(&self) -> &SlotLocks {
        &self.locks
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -- internals --------------------------------------------------------------

    fn start_polling(&mut self, token: SessionToken) {
        self.poller = Some(GardenPoller::spawn(
            Arc::clone(&self.api),
            token,
            Arc::clone(&self.garden),
            self.config.poll_config(),
        ));
    }

    async fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop().await;
        }
    }

    fn require_token(&self) -> Result<SessionToken, GardenError> {
        self.session
            .token()
            .cloned()
            .ok_or(GardenError::NotAuthenticated)
    }

    fn notifier(&self) -> MutexGuard<'_, Notifier> {
        self.notifier.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
