//! The session manager: owns the wallet connection and the backend token.
//!
//! Responsibilities:
//! - Binding the wallet to the configured chain (switch, or add then use)
//! - Connecting: network check, signer, smart-wallet derivation
//! - Authenticating: signing the challenge and trading it for a token
//! - Tearing the session down on disconnect or account change
//!
//! # Concurrency note
//!
//! Every state-changing method takes `&mut self`. Two authentications
//! can't overlap because the borrow checker won't hand out a second
//! mutable borrow while the first call is suspended. Callers that share
//! a manager between tasks wrap it in a `tokio::sync::Mutex`.

use std::sync::Arc;

use chaingarden_protocol::{GardenApi, SessionToken};
use chaingarden_transport::Transport;
use tokio::sync::mpsc;

use crate::{
    Session, SessionConfig, SessionError, SessionState, SmartWalletFactory,
    WalletConnection, WalletProvider, WalletSigner,
};

/// The exact text a wallet signs to prove ownership of `address`.
///
/// The address is lowercased so that the backend can rebuild the same
/// string from whatever checksum casing the wallet reported.
pub fn challenge_message(address: &str) -> String {
    format!(
        "Sign in to Chain Gardens with wallet: {}",
        address.to_lowercase()
    )
}

type Connection<P, F> = WalletConnection<
    <P as WalletProvider>::Signer,
    <F as SmartWalletFactory>::Client,
>;

/// Drives one wallet session from connection to teardown.
///
/// ## Lifecycle
///
/// ```text
/// initialize_connection() ──→ connect() ──→ authenticate() ──→ disconnect()
///                                 │               │
///                                 ▼               ▼
///                            [Connected]   [Authenticated]
///
/// handle_accounts_changed() ──→ [Disconnected] from any state
/// ```
pub struct SessionManager<P, F, T>
where
    P: WalletProvider,
    F: SmartWalletFactory,
    T: Transport,
{
    provider: P,
    factory: F,
    api: Arc<GardenApi<T>>,
    config: SessionConfig,

    /// `true` once the provider has been pointed at our chain and we are
    /// subscribed to its account events.
    bound: bool,
    connection: Option<Connection<P, F>>,
    token: Option<SessionToken>,

    /// How many accounts the wallet exposed at the last account change.
    /// Starts at 1: a freshly connected wallet exposes one account.
    tracked_accounts: usize,
    account_events: Option<mpsc::UnboundedReceiver<Vec<String>>>,
}

impl<P, F, T> SessionManager<P, F, T>
where
    P: WalletProvider,
    F: SmartWalletFactory,
    T: Transport,
{
    pub fn new(
        provider: P,
        factory: F,
        api: Arc<GardenApi<T>>,
        config: SessionConfig,
    ) -> Self {
        Self {
            provider,
            factory,
            api,
            config,
            bound: false,
            connection: None,
            token: None,
            tracked_accounts: 1,
            account_events: None,
        }
    }

    /// Points the wallet at the configured chain and subscribes to its
    /// account-change events.
    ///
    /// Tries a chain switch first. If the wallet refuses (typically
    /// because it doesn't know the chain), asks it to add the chain.
    ///
    /// # Errors
    /// - [`SessionError::WalletUnavailable`]: no wallet installed
    /// - [`SessionError::NetworkUnavailable`]: both switch and add failed
    pub async fn initialize_connection(&mut self) -> Result<(), SessionError> {
        if !self.provider.is_available() {
            return Err(SessionError::WalletUnavailable);
        }

        let chain = &self.config.chain;
        if let Err(err) = self.provider.switch_chain(chain.chain_id).await {
            tracing::debug!(chain_id = chain.chain_id, %err, "chain switch refused, adding chain");
            self.provider
                .add_chain(&chain.params())
                .await
                .map_err(|e| SessionError::NetworkUnavailable(e.message))?;
        }

        // At most one subscription: drop whatever an earlier
        // initialization left behind.
        self.provider.unsubscribe_accounts();
        self.account_events = Some(self.provider.subscribe_accounts());
        self.bound = true;

        tracing::info!(chain_id = self.config.chain.chain_id, "wallet provider bound");
        Ok(())
    }

    /// Connects the wallet's active account.
    ///
    /// Binds the provider first if [`initialize_connection`] hasn't run.
    /// A new connection replaces any previous one, token included.
    ///
    /// # Errors
    /// - [`SessionError::WrongNetwork`]: wallet is on another chain
    /// - [`SessionError::Wallet`]: signer, address, or smart-wallet
    ///   derivation failed
    ///
    /// [`initialize_connection`]: Self::initialize_connection
    pub async fn connect(&mut self) -> Result<&Connection<P, F>, SessionError> {
        if !self.bound {
            self.initialize_connection().await?;
        }

        let expected = self.config.chain.chain_id;
        let actual = self.provider.chain_id().await?;
        if actual != expected {
            return Err(SessionError::WrongNetwork { expected, actual });
        }

        let signer = self.provider.signer().await?;
        let address = signer.address().await?;
        let smart_wallet_address = self.factory.derive_address(&address).await?;
        let client = self.factory.create_client(&signer).await?;

        tracing::info!(%address, %smart_wallet_address, "wallet connected");

        self.token = None;
        Ok(&*self.connection.insert(WalletConnection {
            signer,
            address,
            smart_wallet_address,
            client,
        }))
    }

    /// Signs the challenge and exchanges it for a session token.
    ///
    /// Any previous token is dropped up front, so a failure leaves the
    /// session in `Connected`, never with a stale token.
    ///
    /// # Errors
    /// - [`SessionError::NotConnected`]: no wallet connection
    /// - [`SessionError::AuthRejected`]: the user declined to sign
    /// - [`SessionError::AuthFailed`]: anything else
    pub async fn authenticate(&mut self) -> Result<SessionToken, SessionError> {
        let (signer, address) = match &self.connection {
            Some(conn) => (conn.signer.clone(), conn.address.clone()),
            None => return Err(SessionError::NotConnected),
        };
        self.token = None;

        let message = challenge_message(&address);
        let signature = signer.sign_message(&message).await.map_err(|e| {
            if e.is_user_rejection() {
                tracing::info!(%address, "challenge signature rejected by user");
                SessionError::AuthRejected(e.message)
            } else {
                SessionError::AuthFailed(e.message)
            }
        })?;

        let token = self
            .api
            .authenticate(&address, &signature)
            .await
            .map_err(|e| {
                tracing::warn!(%address, error = %e, "backend refused authentication");
                SessionError::AuthFailed(e.message())
            })?;

        tracing::info!(%address, "session authenticated");
        self.token = Some(token.clone());
        Ok(token)
    }

    /// Reacts to the wallet reporting a new account list.
    ///
    /// Local session state is always cleared: the client must never keep
    /// acting for an identity the wallet no longer presents. The backend
    /// session is torn down too when the list is empty or when exactly
    /// one account was tracked before the change.
    pub async fn handle_accounts_changed(&mut self, accounts: &[String]) {
        let backend_teardown = accounts.is_empty() || self.tracked_accounts == 1;

        match accounts.len() {
            0 => self.tracked_accounts = 0,
            1 => self.tracked_accounts = 1,
            _ => {}
        }

        tracing::info!(
            accounts = accounts.len(),
            backend_teardown,
            "wallet accounts changed"
        );

        if backend_teardown {
            self.end_backend_session().await;
        }
        self.clear_local();
    }

    /// Ends the session. Safe to call at any time, any number of times.
    ///
    /// The backend is only notified when a token exists, and a failed
    /// notification is logged rather than returned.
    pub async fn disconnect(&mut self) {
        self.end_backend_session().await;
        self.clear_local();
        tracing::info!("session disconnected");
    }

    /// Next pending account-change event, without waiting.
    pub fn poll_account_change(&mut self) -> Option<Vec<String>> {
        self.account_events.as_mut()?.try_recv().ok()
    }

    /// Waits for the next account-change event. `None` once the provider
    /// has closed the subscription, or if the provider isn't bound.
    pub async fn next_account_change(&mut self) -> Option<Vec<String>> {
        self.account_events.as_mut()?.recv().await
    }

    // -- accessors ----------------------------------------------------------

    pub fn state(&self) -> SessionState {
        match (&self.connection, &self.token) {
            (None, _) => SessionState::Disconnected,
            (Some(_), None) => SessionState::Connected,
            (Some(_), Some(_)) => SessionState::Authenticated,
        }
    }

    /// A snapshot of the session, if a wallet is connected.
    pub fn session(&self) -> Option<Session> {
        self.connection.as_ref().map(|conn| Session {
            wallet_address: conn.address.clone(),
            smart_wallet_address: conn.smart_wallet_address.clone(),
            token: self.token.clone(),
        })
    }

    pub fn connection(&self) -> Option<&Connection<P, F>> {
        self.connection.as_ref()
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    pub fn address(&self) -> Option<&str> {
        self.connection.as_ref().map(|c| c.address.as_str())
    }

    pub fn smart_wallet_address(&self) -> Option<&str> {
        self.connection
            .as_ref()
            .map(|c| c.smart_wallet_address.as_str())
    }

    /// The `Authorization` header value, while a token exists.
    pub fn authorization_header(&self) -> Option<String> {
        self.token.as_ref().map(SessionToken::authorization_header)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn tracked_accounts(&self) -> usize {
        self.tracked_accounts
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The shared endpoint client.
    pub fn api(&self) -> &Arc<GardenApi<T>> {
        &self.api
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    // -- internals ----------------------------------------------------------

    async fn end_backend_session(&mut self) {
        let Some(token) = self.token.take() else {
            return;
        };
        if let Err(e) = self.api.disconnect(&token).await {
            tracing::warn!(error = %e, "backend disconnect failed, clearing local session anyway");
        }
    }

    fn clear_local(&mut self) {
        self.connection = None;
        self.token = None;
    }
}

/// Unsubscribes from account events when the manager goes away.
impl<P, F, T> Drop for SessionManager<P, F, T>
where
    P: WalletProvider,
    F: SmartWalletFactory,
    T: Transport,
{
    fn drop(&mut self) {
        if self.account_events.take().is_some() {
            self.provider.unsubscribe_accounts();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
