//! End-to-end tests driving the provider over loopback UDP.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crossbeam::channel::Receiver;
use il2_motion_protocol::{PACKET_ID, RawTelemetryRecord};
use il2_telemetry::{
    ConnectionStatus, Il2TelemetryProvider, ListenerConfig, ListenerError, ManualClock,
    TelemetryProvider, TelemetryUpdate,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn test_config() -> ListenerConfig {
    ListenerConfig {
        staleness_window_ms: 100,
        idle_backoff_ms: 200,
        poll_interval_ms: 5,
        ..Default::default()
    }
    .with_bind_address(IpAddr::V4(Ipv4Addr::LOCALHOST))
    .with_port(0)
}

fn frame(tick: u32, roll_rad: f32) -> [u8; 44] {
    RawTelemetryRecord {
        packet_id: PACKET_ID,
        tick,
        yaw: 1.0,
        pitch: -0.5,
        roll: roll_rad,
        acc_y: -9.81,
        ..Default::default()
    }
    .encode()
}

struct Rig {
    provider: Il2TelemetryProvider,
    updates: Receiver<TelemetryUpdate>,
    sender: UdpSocket,
    target: SocketAddr,
}

impl Rig {
    fn start(config: ListenerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        init_tracing();
        let (tx, updates) = crossbeam::channel::unbounded();
        let mut provider = Il2TelemetryProvider::new(config, tx);
        provider.start()?;
        let target = provider.local_addr().ok_or("provider has no local address")?;
        Ok(Self {
            provider,
            updates,
            sender: UdpSocket::bind("127.0.0.1:0")?,
            target,
        })
    }

    fn send(&self, payload: &[u8]) -> TestResult {
        self.sender.send_to(payload, self.target)?;
        Ok(())
    }
}

fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}

#[test]
fn valid_frame_is_decoded_normalized_and_running() -> TestResult {
    let mut rig = Rig::start(test_config())?;
    rig.send(&frame(10, 3.0 * std::f32::consts::FRAC_PI_4))?;

    let update = rig.updates.recv_timeout(RECV_TIMEOUT)?;
    let current = update.current();
    assert_eq!(current.tick(), 10);
    assert!((current.roll() - 45.0).abs() < 1e-3);
    assert!((current.yaw() - 1.0f32.to_degrees()).abs() < 1e-3);
    assert!((current.pitch() + 0.5f32.to_degrees()).abs() < 1e-3);
    assert_eq!(current.acceleration(), [0.0, -9.81, 0.0]);

    assert!(rig.provider.is_connected());
    assert!(rig.provider.is_running());
    assert_eq!(rig.provider.latest_snapshot(), Some(*current));

    rig.provider.stop();
    Ok(())
}

#[test]
fn previous_snapshot_chains_exactly() -> TestResult {
    let mut rig = Rig::start(test_config())?;
    let mut updates = Vec::new();
    for tick in 1..=5 {
        rig.send(&frame(tick, 0.2))?;
        updates.push(rig.updates.recv_timeout(RECV_TIMEOUT)?);
    }

    assert_eq!(updates.first().map(|u| u.previous().tick()), Some(0));
    for pair in updates.windows(2) {
        if let [earlier, later] = pair {
            assert_eq!(later.previous(), earlier.current());
        }
    }
    assert_eq!(rig.provider.stats().frames_emitted, 5);
    rig.provider.stop();
    Ok(())
}

#[test]
fn wrong_size_datagram_connects_without_running() -> TestResult {
    let mut rig = Rig::start(test_config())?;
    rig.send(&[0xAB; 17])?;

    assert!(wait_until(RECV_TIMEOUT, || rig.provider.stats().size_mismatches == 1));
    assert!(rig.updates.try_recv().is_err());
    assert!(!rig.provider.is_running());

    rig.provider.stop();
    Ok(())
}

#[test]
fn silence_demotes_running_then_connected() -> TestResult {
    let mut rig = Rig::start(test_config())?;
    rig.send(&frame(1, 0.0))?;
    rig.updates.recv_timeout(RECV_TIMEOUT)?;
    assert!(rig.provider.is_running());

    assert!(wait_until(RECV_TIMEOUT, || {
        rig.provider.status() == ConnectionStatus::IDLE
    }));
    assert!(wait_until(RECV_TIMEOUT, || rig.provider.stats().backoffs >= 1));

    // Idle polling is throttled by the backoff rather than spinning.
    let before = rig.provider.stats().backoffs;
    std::thread::sleep(Duration::from_millis(500));
    let taken = rig.provider.stats().backoffs.saturating_sub(before);
    assert!(taken <= 4, "{taken} backoffs in 500ms");

    rig.provider.stop();
    Ok(())
}

#[test]
fn stop_interrupts_backoff_promptly() -> TestResult {
    let config = ListenerConfig {
        staleness_window_ms: 20,
        idle_backoff_ms: 5_000,
        ..test_config()
    };
    let mut rig = Rig::start(config)?;
    assert!(wait_until(RECV_TIMEOUT, || rig.provider.stats().backoffs >= 1));

    let started = Instant::now();
    rig.provider.stop();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(!rig.provider.is_started());
    assert_eq!(rig.provider.status(), ConnectionStatus::IDLE);
    Ok(())
}

#[test]
fn stop_while_waiting_for_data_is_bounded() -> TestResult {
    let mut rig = Rig::start(test_config())?;
    rig.send(&frame(1, 0.0))?;
    rig.updates.recv_timeout(RECV_TIMEOUT)?;

    let started = Instant::now();
    rig.provider.stop();
    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(!rig.provider.is_connected());
    assert!(!rig.provider.is_running());
    Ok(())
}

#[test]
fn start_is_idempotent() -> TestResult {
    init_tracing();
    let emitted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&emitted);
    let mut provider = Il2TelemetryProvider::with_callback(test_config(), move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    provider.start()?;
    let addr = provider.local_addr().ok_or("not bound")?;
    provider.start()?;
    assert_eq!(provider.local_addr(), Some(addr));

    let sender = UdpSocket::bind("127.0.0.1:0")?;
    sender.send_to(&frame(1, 0.0), addr)?;
    assert!(wait_until(RECV_TIMEOUT, || emitted.load(Ordering::SeqCst) == 1));
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(emitted.load(Ordering::SeqCst), 1);

    provider.stop();
    Ok(())
}

#[test]
fn restart_after_stop_resets_chain() -> TestResult {
    let mut rig = Rig::start(test_config())?;
    rig.send(&frame(1, 0.0))?;
    rig.updates.recv_timeout(RECV_TIMEOUT)?;
    rig.provider.stop();
    assert_eq!(rig.provider.latest_snapshot().map(|s| s.tick()), Some(1));

    rig.provider.start()?;
    assert_eq!(rig.provider.latest_snapshot(), None);
    let target = rig.provider.local_addr().ok_or("not bound")?;
    rig.sender.send_to(&frame(2, 0.0), target)?;
    let update = rig.updates.recv_timeout(RECV_TIMEOUT)?;
    assert_eq!(update.previous().tick(), 0);
    assert_eq!(update.current().tick(), 2);
    rig.provider.stop();
    Ok(())
}

#[test]
fn foreign_identifier_keeps_running_under_frozen_clock() -> TestResult {
    init_tracing();
    let (tx, updates) = crossbeam::channel::unbounded();
    let clock = ManualClock::new();
    let mut provider =
        Il2TelemetryProvider::new(test_config(), tx).with_clock(Arc::new(clock.clone()));
    provider.start()?;
    let target = provider.local_addr().ok_or("not bound")?;
    let sender = UdpSocket::bind("127.0.0.1:0")?;

    sender.send_to(&frame(1, 0.0), target)?;
    updates.recv_timeout(RECV_TIMEOUT)?;

    let foreign = RawTelemetryRecord {
        packet_id: 0x0BAD_F00D,
        ..Default::default()
    }
    .encode();
    sender.send_to(&foreign, target)?;
    assert!(wait_until(RECV_TIMEOUT, || {
        provider.stats().unexpected_identifiers == 1
    }));
    assert!(provider.is_running());

    clock.advance(Duration::from_secs(1));
    sender.send_to(&foreign, target)?;
    assert!(wait_until(RECV_TIMEOUT, || !provider.is_running()));

    provider.stop();
    Ok(())
}

#[test]
fn shared_port_allows_second_listener() -> TestResult {
    let first = Rig::start(test_config())?;
    let port = first.target.port();

    let (tx, _rx) = crossbeam::channel::unbounded();
    let mut second = Il2TelemetryProvider::new(test_config().with_port(port), tx);
    second.start()?;
    assert_eq!(second.local_addr().map(|a| a.port()), Some(port));
    second.stop();
    Ok(())
}

#[test]
fn exclusive_port_conflict_fails_start() -> TestResult {
    let exclusive = ListenerConfig {
        reuse_address: false,
        ..test_config()
    };
    let first = Rig::start(exclusive.clone())?;

    let (tx, _rx) = crossbeam::channel::unbounded();
    let mut second = Il2TelemetryProvider::new(exclusive.with_port(first.target.port()), tx);
    assert!(matches!(second.start(), Err(ListenerError::Bind { .. })));
    assert!(!second.is_started());
    Ok(())
}

#[tokio::test]
async fn tokio_channel_consumer_receives_updates() -> TestResult {
    init_tracing();
    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    let mut provider = Il2TelemetryProvider::new(test_config(), tx);
    provider.start()?;
    let target = provider.local_addr().ok_or("not bound")?;

    let sender = UdpSocket::bind("127.0.0.1:0")?;
    sender.send_to(&frame(99, 0.0), target)?;

    let update = tokio::time::timeout(RECV_TIMEOUT, rx.recv())
        .await?
        .ok_or("channel closed")?;
    assert_eq!(update.current().tick(), 99);
    provider.stop();
    Ok(())
}
