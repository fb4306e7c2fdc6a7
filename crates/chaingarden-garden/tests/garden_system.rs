//! Integration tests for loading, polling, and slot actions, driven
//! through the scripted in-memory transport.

use std::sync::Arc;
use std::time::Duration;

use chaingarden_garden::{
    GardenError, GardenPoller, GardenState, SlotLocks, load_garden_data,
    plant_and_reload, refresh_garden, remove_and_reload,
};
use chaingarden_poll::PollConfig;
use chaingarden_protocol::{GardenApi, SessionToken, WeatherType};
use chaingarden_transport::{MemoryTransport, Method, TransportError};
use tokio::sync::Mutex;

const GARDEN_BODY: &str = r#"{
    "success": true,
    "data": {
        "id": "g1",
        "level": 2,
        "soil_quality": 80,
        "plot_size": 4,
        "plants": [{
            "id": "p1",
            "slot_position": 0,
            "plant_type": {"id": "t1", "name": "Tomato", "growth_rate": 1.2, "required_soil_quality": 40},
            "growth_stage": "growing",
            "health": 90,
            "growth_progress": 40
        }],
        "pest_infestation": false,
        "pest_severity": 0,
        "total_onchain_actions": 5
    }
}"#;

const STATUS_BODY: &str = r#"{"status": "success", "data": {"weather_data": {
    "weather_type": "sunny", "temperature": 24.0, "rainfall": 0.0,
    "sunlight": 80.0, "timestamp": "2024-05-01T10:00:00Z"
}}}"#;

const PLANT_TYPES_BODY: &str = r#"{"status": "success", "data": {"plant_types_data": [
    {"id": "t1", "name": "Tomato", "growth_rate": 1.2, "required_soil_quality": 40},
    {"id": "t2", "name": "Basil", "growth_rate": 0.8, "required_soil_quality": 20}
]}}"#;

const PLANTED_BODY: &str = r#"{"status": "success", "data": {"plant_data": {
    "id": "p2", "slot_position": 1,
    "plant_type": {"id": "t2", "name": "Basil", "growth_rate": 0.8, "required_soil_quality": 20},
    "growth_stage": "seed", "health": 100
}}}"#;

fn token() -> SessionToken {
    SessionToken::new("tok-1")
}

/// A backend that answers all three reads successfully.
fn healthy_backend() -> (Arc<GardenApi<MemoryTransport>>, MemoryTransport) {
    let transport = MemoryTransport::new();
    transport.respond(Method::Get, "/garden/", 200, GARDEN_BODY);
    transport.respond(Method::Get, "/garden/status/", 200, STATUS_BODY);
    transport.respond(Method::Get, "/garden/plant-types/", 200, PLANT_TYPES_BODY);
    (Arc::new(GardenApi::new(transport.clone())), transport)
}

async fn loaded_state(api: &GardenApi<MemoryTransport>) -> Mutex<GardenState> {
    let state = Mutex::new(GardenState::new());
    refresh_garden(api, &token(), &state).await.unwrap();
    state
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_load_garden_data_returns_all_three() {
    let (api, _) = healthy_backend();

    let loaded = load_garden_data(&api, &token()).await.unwrap();

    assert_eq!(loaded.garden.id, "g1");
    assert_eq!(
        loaded.weather.map(|w| w.weather_type),
        Some(WeatherType::Sunny)
    );
    assert_eq!(loaded.plant_types.len(), 2);
}

#[tokio::test]
async fn test_load_garden_data_survives_weather_failure() {
    let (api, transport) = healthy_backend();
    transport.fail(Method::Get, "/garden/status/", TransportError::Timeout(10_000));

    let loaded = load_garden_data(&api, &token()).await.unwrap();

    assert!(loaded.weather.is_none());
    assert_eq!(loaded.garden.plants.len(), 1);
}

#[tokio::test]
async fn test_load_garden_data_garden_failure_fails_load() {
    let (api, transport) = healthy_backend();
    transport.respond(Method::Get, "/garden/", 500, r#"{"error": "boom"}"#);

    let err = load_garden_data(&api, &token()).await.unwrap_err();

    assert!(matches!(err, GardenError::DataFetchFailed(_)));
}

#[tokio::test]
async fn test_load_garden_data_catalog_failure_fails_load() {
    let (api, transport) = healthy_backend();
    transport.fail(
        Method::Get,
        "/garden/plant-types/",
        TransportError::ConnectFailed("refused".into()),
    );

    let err = load_garden_data(&api, &token()).await.unwrap_err();

    assert!(matches!(err, GardenError::DataFetchFailed(_)));
}

#[tokio::test(start_paused = true)]
async fn test_load_garden_data_requests_run_concurrently() {
    let transport = MemoryTransport::new();
    let delay = Duration::from_secs(1);
    transport.respond_after(Method::Get, "/garden/", delay, 200, GARDEN_BODY);
    transport.respond_after(Method::Get, "/garden/status/", delay, 200, STATUS_BODY);
    transport.respond_after(
        Method::Get,
        "/garden/plant-types/",
        delay,
        200,
        PLANT_TYPES_BODY,
    );
    let api = GardenApi::new(transport);

    let started = tokio::time::Instant::now();
    load_garden_data(&api, &token()).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_refresh_failure_keeps_garden_and_clears_weather() {
    let (api, transport) = healthy_backend();
    let state = loaded_state(&api).await;
    assert_eq!(state.lock().await.generation(), 1);
    assert!(state.lock().await.weather().is_some());

    transport.respond(Method::Get, "/garden/", 503, "");
    let result = refresh_garden(&api, &token(), &state).await;

    assert!(result.is_err());
    let state = state.lock().await;
    assert!(state.weather().is_none());
    assert_eq!(state.garden().map(|g| g.id.as_str()), Some("g1"));
    assert_eq!(state.plant_types().len(), 2);
    assert_eq!(state.generation(), 1);
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_poller_loads_immediately_then_every_interval() {
    let (api, transport) = healthy_backend();
    let state = Arc::new(Mutex::new(GardenState::new()));

    let handle = GardenPoller::spawn(
        api,
        token(),
        Arc::clone(&state),
        PollConfig::with_interval_ms(30_000),
    );

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(transport.request_count(Method::Get, "/garden/"), 1);
    assert!(state.lock().await.is_loaded());

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(transport.request_count(Method::Get, "/garden/"), 2);

    let metrics = handle.stop().await.unwrap();
    assert_eq!(metrics.total_ticks, 2);
    assert_eq!(metrics.total_failures, 0);
}

#[tokio::test(start_paused = true)]
async fn test_poller_makes_no_requests_after_stop() {
    let (api, transport) = healthy_backend();
    let state = Arc::new(Mutex::new(GardenState::new()));

    let handle = GardenPoller::spawn(api, token(), state, PollConfig::default());
    tokio::time::sleep(Duration::from_millis(10)).await;
    handle.stop().await;

    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(transport.request_count(Method::Get, "/garden/"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_poller_dropped_handle_aborts_task() {
    let (api, transport) = healthy_backend();
    let state = Arc::new(Mutex::new(GardenState::new()));

    let handle = GardenPoller::spawn(api, token(), state, PollConfig::default());
    tokio::time::sleep(Duration::from_millis(10)).await;
    drop(handle);

    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(transport.request_count(Method::Get, "/garden/"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_poller_keeps_going_after_failures() {
    let (api, transport) = healthy_backend();
    transport.fail(Method::Get, "/garden/", TransportError::Timeout(10_000));
    let state = Arc::new(Mutex::new(GardenState::new()));

    let handle = GardenPoller::spawn(
        api,
        token(),
        Arc::clone(&state),
        PollConfig::with_interval_ms(30_000),
    );
    tokio::time::sleep(Duration::from_secs(61)).await;

    assert_eq!(transport.request_count(Method::Get, "/garden/"), 3);
    assert!(!state.lock().await.is_loaded());
    let metrics = handle.stop().await.unwrap();
    assert_eq!(metrics.consecutive_failures, 3);
}

// ---------------------------------------------------------------------------
// Slot actions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_plant_and_reload_posts_then_reloads() {
    let (api, transport) = healthy_backend();
    transport.respond(Method::Post, "/garden/plants/", 201, PLANTED_BODY);
    let state = loaded_state(&api).await;
    let locks = SlotLocks::new();

    let plant = plant_and_reload(&api, &token(), &state, &locks, 1, "t2")
        .await
        .unwrap();

    assert_eq!(plant.id, "p2");
    assert_eq!(transport.request_count(Method::Post, "/garden/plants/"), 1);
    assert_eq!(transport.request_count(Method::Get, "/garden/"), 2);
    assert_eq!(state.lock().await.generation(), 2);
    assert!(!locks.is_locked(1));
}

#[tokio::test]
async fn test_plant_and_reload_occupied_slot_is_rejected_locally() {
    let (api, transport) = healthy_backend();
    let state = loaded_state(&api).await;
    let locks = SlotLocks::new();

    let err = plant_and_reload(&api, &token(), &state, &locks, 0, "t1")
        .await
        .unwrap_err();

    assert!(matches!(err, GardenError::SlotOccupied(0)));
    assert_eq!(transport.request_count(Method::Post, "/garden/plants/"), 0);
    assert!(!locks.is_locked(0));
}

#[tokio::test]
async fn test_plant_and_reload_slot_outside_plot_is_invalid() {
    let (api, _) = healthy_backend();
    let state = loaded_state(&api).await;

    let err = plant_and_reload(&api, &token(), &state, &SlotLocks::new(), 4, "t1")
        .await
        .unwrap_err();

    assert!(matches!(err, GardenError::InvalidSlot(4)));
}

#[tokio::test]
async fn test_plant_and_reload_unknown_plant_type_is_invalid() {
    let (api, _) = healthy_backend();
    let state = loaded_state(&api).await;

    let err = plant_and_reload(&api, &token(), &state, &SlotLocks::new(), 1, "t9")
        .await
        .unwrap_err();

    assert!(matches!(err, GardenError::InvalidPlantType(ref id) if id == "t9"));
}

#[tokio::test]
async fn test_plant_and_reload_busy_slot_fails_fast() {
    let (api, transport) = healthy_backend();
    let state = loaded_state(&api).await;
    let locks = SlotLocks::new();
    let _held = locks.try_lock(1).unwrap();

    let err = plant_and_reload(&api, &token(), &state, &locks, 1, "t2")
        .await
        .unwrap_err();

    assert!(matches!(err, GardenError::SlotBusy(1)));
    assert_eq!(transport.request_count(Method::Post, "/garden/plants/"), 0);
}

#[tokio::test]
async fn test_plant_and_reload_maps_backend_occupied_message() {
    let (api, transport) = healthy_backend();
    transport.respond(
        Method::Post,
        "/garden/plants/",
        400,
        r#"{"status": "error", "error": "Slot already occupied"}"#,
    );
    // Nothing loaded yet, so only the backend can catch it.
    let state = Mutex::new(GardenState::new());

    let err = plant_and_reload(&api, &token(), &state, &SlotLocks::new(), 2, "t1")
        .await
        .unwrap_err();

    assert!(matches!(err, GardenError::SlotOccupied(2)));
}

#[tokio::test(start_paused = true)]
async fn test_slot_stays_locked_until_reload_finishes() {
    let (api, transport) = healthy_backend();
    let state = Arc::new(loaded_state(&api).await);
    transport.respond_after(
        Method::Post,
        "/garden/plants/",
        Duration::from_secs(1),
        201,
        PLANTED_BODY,
    );
    transport.respond_after(
        Method::Get,
        "/garden/",
        Duration::from_secs(1),
        200,
        GARDEN_BODY,
    );
    let locks = SlotLocks::new();

    let task = {
        let (api, state, locks) = (Arc::clone(&api), Arc::clone(&state), locks.clone());
        tokio::spawn(async move {
            plant_and_reload(&api, &token(), &state, &locks, 1, "t2").await
        })
    };

    // Past the POST, still inside the reload.
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert!(locks.is_locked(1));

    task.await.unwrap().unwrap();
    assert!(!locks.is_locked(1));
}

#[tokio::test]
async fn test_remove_and_reload_deletes_then_reloads() {
    let (api, transport) = healthy_backend();
    transport.respond(Method::Delete, "/garden/plants/p1/", 204, "");
    let state = loaded_state(&api).await;

    remove_and_reload(&api, &token(), &state, &SlotLocks::new(), "p1")
        .await
        .unwrap();

    assert_eq!(transport.request_count(Method::Delete, "/garden/plants/p1/"), 1);
    assert_eq!(transport.request_count(Method::Get, "/garden/"), 2);
}

#[tokio::test]
async fn test_remove_and_reload_unknown_plant_is_not_found() {
    let (api, transport) = healthy_backend();
    let state = loaded_state(&api).await;

    let err = remove_and_reload(&api, &token(), &state, &SlotLocks::new(), "p404")
        .await
        .unwrap_err();

    assert!(matches!(err, GardenError::PlantNotFound(ref id) if id == "p404"));
    assert_eq!(transport.requests().iter().filter(|r| r.method == Method::Delete).count(), 0);
}

#[tokio::test]
async fn test_remove_and_reload_backend_failure_is_action_failed() {
    let (api, transport) = healthy_backend();
    transport.respond(
        Method::Delete,
        "/garden/plants/p1/",
        500,
        r#"{"error": "Plant management operation failed"}"#,
    );
    let state = loaded_state(&api).await;

    let err = remove_and_reload(&api, &token(), &state, &SlotLocks::new(), "p1")
        .await
        .unwrap_err();

    assert!(matches!(err, GardenError::ActionFailed(ref m) if m.contains("Plant management")));
}

#[tokio::test(start_paused = true)]
async fn test_remove_and_reload_same_plant_twice_without_garden_is_busy() {
    let (api, transport) = healthy_backend();
    transport.respond_after(
        Method::Delete,
        "/garden/plants/p1/",
        Duration::from_secs(1),
        204,
        "",
    );
    // Nothing loaded, so the slot is unknown to both calls.
    let state = Mutex::new(GardenState::new());
    let locks = SlotLocks::new();

    let (token_a, token_b) = (token(), token());
    let (first, second) = tokio::join!(
        remove_and_reload(&api, &token_a, &state, &locks, "p1"),
        remove_and_reload(&api, &token_b, &state, &locks, "p1"),
    );

    assert!(first.is_ok());
    assert!(matches!(second, Err(GardenError::PlantBusy(ref id)) if id == "p1"));
    assert_eq!(transport.request_count(Method::Delete, "/garden/plants/p1/"), 1);
    assert!(!locks.is_plant_locked("p1"));
}
