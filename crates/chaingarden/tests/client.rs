//! Integration tests for the client facade: wallet session, polling
//! lifecycle, slot actions, and notices.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chaingarden::prelude::*;
use chaingarden::transport::{MemoryTransport, Method};
use tokio::sync::mpsc;

// =========================================================================
// Mock wallet
// =========================================================================

#[derive(Default)]
struct WalletLog {
    signed: Vec<String>,
    account_senders: Vec<mpsc::UnboundedSender<Vec<String>>>,
}

#[derive(Clone)]
struct TestSigner {
    reject: bool,
    log: Arc<Mutex<WalletLog>>,
}

impl WalletSigner for TestSigner {
    async fn address(&self) -> Result<String, WalletError> {
        Ok("0xABC".into())
    }

    async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
        self.log.lock().unwrap().signed.push(message.to_string());
        if self.reject {
            Err(WalletError::new(
                WalletErrorKind::UserRejected,
                "User rejected the request.",
            ))
        } else {
            Ok("0xsig".into())
        }
    }
}

struct TestWallet {
    signer: TestSigner,
    log: Arc<Mutex<WalletLog>>,
    chain_id: Arc<AtomicU64>,
}

impl TestWallet {
    fn new() -> Self {
        let log = Arc::new(Mutex::new(WalletLog::default()));
        Self {
            signer: TestSigner {
                reject: false,
                log: Arc::clone(&log),
            },
            log,
            chain_id: Arc::new(AtomicU64::new(0x2B74)),
        }
    }

    fn rejecting() -> Self {
        let mut wallet = Self::new();
        wallet.signer.reject = true;
        wallet
    }
}

impl WalletProvider for TestWallet {
    type Signer = TestSigner;

    fn is_available(&self) -> bool {
        true
    }

    async fn switch_chain(&self, _chain_id: u64) -> Result<(), WalletError> {
        Ok(())
    }

    async fn add_chain(&self, _params: &ChainParams) -> Result<(), WalletError> {
        Ok(())
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.chain_id.load(Ordering::SeqCst))
    }

    async fn signer(&self) -> Result<TestSigner, WalletError> {
        Ok(self.signer.clone())
    }

    fn subscribe_accounts(&self) -> mpsc::UnboundedReceiver<Vec<String>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.log.lock().unwrap().account_senders.push(tx);
        rx
    }

    fn unsubscribe_accounts(&self) {
        self.log.lock().unwrap().account_senders.clear();
    }
}

struct TestFactory;

impl SmartWalletFactory for TestFactory {
    type Client = ();

    async fn derive_address(&self, owner: &str) -> Result<String, WalletError> {
        Ok(format!("{owner}-smart"))
    }

    async fn create_client<S: WalletSigner>(&self, _signer: &S) -> Result<(), WalletError> {
        Ok(())
    }
}

// =========================================================================
// Scripted backend
// =========================================================================

const GARDEN_BODY: &str = r#"{
    "success": true,
    "data": {
        "id": "g1", "level": 1, "soil_quality": 100, "plot_size": 4,
        "plants": [{
            "id": "p1", "slot_position": 0,
            "plant_type": {"id": "t1", "name": "Tomato", "growth_rate": 1.2, "required_soil_quality": 40},
            "growth_stage": "harvest", "health": 80, "growth_progress": 100
        }],
        "pest_infestation": true, "pest_type": "aphids", "pest_severity": 30,
        "total_onchain_actions": 2
    }
}"#;

const PLANTED_BODY: &str = r#"{"status": "success", "data": {"plant_data": {
    "id": "p2", "slot_position": 1,
    "plant_type": {"id": "t1", "name": "Tomato", "growth_rate": 1.2, "required_soil_quality": 40},
    "growth_stage": "seed", "health": 100
}}}"#;

fn backend() -> MemoryTransport {
    let t = MemoryTransport::new();
    t.respond(
        Method::Post,
        "/user/authenticate/",
        200,
        r#"{"status": "success", "data": {"token": "tok-1"}}"#,
    );
    t.respond(Method::Post, "/user/disconnect/", 204, "");
    t.respond(Method::Get, "/garden/", 200, GARDEN_BODY);
    t.respond(
        Method::Get,
        "/garden/status/",
        200,
        r#"{"status": "success", "data": {"weather_data": {"weather_type": "cloudy", "temperature": 15, "rainfall": 1, "sunlight": 40}}}"#,
    );
    t.respond(
        Method::Get,
        "/garden/plant-types/",
        200,
        r#"{"status": "success", "data": {"plant_types_data": [
            {"id": "t1", "name": "Tomato", "growth_rate": 1.2, "required_soil_quality": 40}
        ]}}"#,
    );
    t
}

type TestClient = GardenClient<TestWallet, TestFactory, MemoryTransport>;

fn client_with(wallet: TestWallet) -> (TestClient, MemoryTransport) {
    let transport = backend();
    let client = GardenClientBuilder::new().build_with_transport(
        wallet,
        TestFactory,
        transport.clone(),
    );
    (client, transport)
}

async fn signed_in() -> (TestClient, MemoryTransport) {
    let (mut client, transport) = client_with(TestWallet::new());
    client.connect_wallet().await.unwrap();
    client.authenticate().await.unwrap();
    // Let the poller's immediate first load land.
    tokio::time::sleep(Duration::from_millis(10)).await;
    (client, transport)
}

// =========================================================================
// Session lifecycle
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_connect_and_authenticate_starts_polling() {
    let (mut client, transport) = client_with(TestWallet::new());

    let address = client.connect_wallet().await.unwrap();
    assert_eq!(address, "0xABC");
    assert_eq!(client.state(), SessionState::Connected);
    assert_eq!(client.notice().unwrap().message, "Wallet connected");

    client.authenticate().await.unwrap();
    assert_eq!(client.state(), SessionState::Authenticated);
    assert!(client.is_polling());
    assert_eq!(client.notice().unwrap().message, "Authentication successful");

    tokio::time::sleep(Duration::from_millis(10)).await;
    let snapshot = client.snapshot().await;
    assert!(snapshot.is_loaded());
    assert_eq!(
        transport.requests()[1].authorization.as_deref(),
        Some("Token tok-1")
    );
}

#[tokio::test(start_paused = true)]
async fn test_rejected_signature_keeps_connection_and_does_not_poll() {
    let (mut client, transport) = client_with(TestWallet::rejecting());
    client.connect_wallet().await.unwrap();

    let err = client.authenticate().await.unwrap_err();

    assert!(err.is_user_rejection());
    assert_eq!(client.state(), SessionState::Connected);
    assert!(!client.is_polling());
    let notice = client.notice().unwrap();
    assert!(notice.is_error());
    assert_eq!(notice.message, "User rejected the request.");
    assert_eq!(transport.request_count(Method::Post, "/user/authenticate/"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_polling_reloads_every_interval_until_disconnect() {
    let (mut client, transport) = signed_in().await;
    assert_eq!(transport.request_count(Method::Get, "/garden/"), 1);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(transport.request_count(Method::Get, "/garden/"), 2);

    client.disconnect().await;
    tokio::time::sleep(Duration::from_secs(90)).await;

    assert_eq!(transport.request_count(Method::Get, "/garden/"), 2);
    assert!(!client.is_polling());
    assert!(!client.snapshot().await.is_loaded());
}

#[tokio::test(start_paused = true)]
async fn test_connect_wallet_failed_reconnect_keeps_polling() {
    let wallet = TestWallet::new();
    let chain_id = Arc::clone(&wallet.chain_id);
    let (mut client, transport) = client_with(wallet);
    client.connect_wallet().await.unwrap();
    client.authenticate().await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(transport.request_count(Method::Get, "/garden/"), 1);

    chain_id.store(1, Ordering::SeqCst);
    let err = client.connect_wallet().await.unwrap_err();

    assert!(matches!(
        err,
        ChainGardenError::Session(SessionError::WrongNetwork { actual: 1, .. })
    ));
    assert!(client.notice().unwrap().is_error());
    assert_eq!(client.state(), SessionState::Authenticated);
    assert!(client.is_polling());

    tokio::time::sleep(Duration::from_secs(95)).await;
    assert_eq!(transport.request_count(Method::Get, "/garden/"), 4);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_twice_notifies_backend_once() {
    let (mut client, transport) = signed_in().await;

    client.disconnect().await;
    client.disconnect().await;

    assert_eq!(transport.request_count(Method::Post, "/user/disconnect/"), 1);
    assert_eq!(client.state(), SessionState::Disconnected);
    assert!(client.session().authorization_header().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_empty_account_list_tears_everything_down() {
    let (mut client, transport) = signed_in().await;

    client.handle_accounts_changed(&[]).await;

    assert_eq!(client.state(), SessionState::Disconnected);
    assert!(client.session().token().is_none());
    assert!(client.session().address().is_none());
    assert!(!client.is_polling());
    assert!(client.stats().await.is_none());
    assert_eq!(transport.request_count(Method::Post, "/user/disconnect/"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_pump_account_changes_handles_wallet_events() {
    let wallet = TestWallet::new();
    let log = Arc::clone(&wallet.log);
    let (mut client, transport) = client_with(wallet);
    client.connect_wallet().await.unwrap();
    client.authenticate().await.unwrap();

    let sender = log.lock().unwrap().account_senders[0].clone();
    sender.send(vec!["0xDEF".into()]).unwrap();

    assert_eq!(client.pump_account_changes().await, 1);
    assert_eq!(client.state(), SessionState::Disconnected);
    assert_eq!(transport.request_count(Method::Post, "/user/disconnect/"), 1);
    assert_eq!(client.pump_account_changes().await, 0);
}

// =========================================================================
// Garden access
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_stats_and_pest_alert_follow_snapshot() {
    let (client, _) = signed_in().await;

    let stats = client.stats().await.unwrap();
    assert_eq!(stats.total_plants, 1);
    assert_eq!(stats.harvest_ready, 1);
    assert_eq!(stats.average_health, 80);
    // cloudy 0.3 * 80% health
    assert_eq!(stats.growth_efficiency, 24);

    let alert = client.pest_alert().await.unwrap();
    assert_eq!(alert.pest, "Aphids");
    assert_eq!(alert.remedy, Some("Transfer tokens to combat aphids"));
}

#[tokio::test(start_paused = true)]
async fn test_plant_seed_without_session_is_not_authenticated() {
    let (client, transport) = client_with(TestWallet::new());

    let err = client.plant_seed(1, "t1").await.unwrap_err();

    assert!(matches!(
        err,
        ChainGardenError::Garden(GardenError::NotAuthenticated)
    ));
    assert!(client.notice().unwrap().is_error());
    assert!(transport.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_plant_seed_success_publishes_status() {
    let (client, transport) = signed_in().await;
    transport.respond(Method::Post, "/garden/plants/", 201, PLANTED_BODY);

    let plant = client.plant_seed(1, "t1").await.unwrap();

    assert_eq!(plant.slot_position, 1);
    assert_eq!(client.notice().unwrap().message, "Plant added successfully");
    assert!(!client.slot_locks().is_locked(1));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_plant_on_same_slot_is_busy() {
    let (client, transport) = signed_in().await;
    transport.respond_after(
        Method::Post,
        "/garden/plants/",
        Duration::from_secs(1),
        201,
        PLANTED_BODY,
    );

    let (first, second) = tokio::join!(client.plant_seed(1, "t1"), client.plant_seed(1, "t1"));

    assert!(first.is_ok());
    assert!(matches!(
        second,
        Err(ChainGardenError::Garden(GardenError::SlotBusy(1)))
    ));
    assert_eq!(transport.request_count(Method::Post, "/garden/plants/"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_remove_plant_failure_publishes_error() {
    let (client, transport) = signed_in().await;
    transport.respond(
        Method::Delete,
        "/garden/plants/p1/",
        500,
        r#"{"error": "Plant management operation failed"}"#,
    );

    let err = client.remove_plant("p1").await.unwrap_err();

    assert!(matches!(err, ChainGardenError::Garden(GardenError::ActionFailed(_))));
    let notice = client.notice().unwrap();
    assert!(notice.message.starts_with("Failed to remove:"));
}

#[tokio::test(start_paused = true)]
async fn test_notice_expires_after_ttl() {
    let (client, _) = signed_in().await;
    assert!(client.notice().is_some());

    tokio::time::advance(Duration::from_millis(3_000)).await;

    assert!(client.notice().is_none());
}
