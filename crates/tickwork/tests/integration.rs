//! Integration tests - workers driven through the controller
//!
//! Covers the produce/consume rendezvous, lifecycle commands and pause
//! behaviour with real threads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tickwork::{
    Config, Controller, FrameSignal, FrameView, NullRenderer, Priority, ProgressLog, Worker,
    WorkerKind, WorkerState,
};

const TIMEOUT: Duration = Duration::from_secs(3);

fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    cond()
}

fn fast_config() -> Config {
    let mut config = Config::default();
    config.animation.delay_ms = 1;
    config.animation.max_particles = 20;
    config.animation.seed = Some(42);
    config.computation.delay_ms = 1;
    config.computation.batch_size = 100;
    config.marquee.delay_ms = 1;
    config
}

fn controller(config: Config) -> (Controller, Arc<ProgressLog>) {
    let log = Arc::new(ProgressLog::new(100_000));
    let controller = Controller::new(config, NullRenderer, NullRenderer, log.clone());
    (controller, log)
}

fn progress_lines(log: &ProgressLog) -> usize {
    log.lines()
        .iter()
        .filter(|line| line.starts_with("Iterations: "))
        .count()
}

// ============================================================================
// RENDEZVOUS
// ============================================================================

#[test]
fn test_computation_follows_animation() {
    let (controller, log) = controller(fast_config());

    controller.animation().start();
    controller.computation().start();

    assert!(wait_until(TIMEOUT, || controller.computation().with_body(|b| b.iterations()) >= 500));
    assert!(progress_lines(&log) >= 5);

    let stats = controller.frame_stats();
    assert!(stats.consumed >= 5);
    assert!(stats.consumed <= stats.published);

    controller.shutdown();
}

#[test]
fn test_computation_idle_without_frames() {
    let (controller, log) = controller(fast_config());

    controller.computation().start();
    thread::sleep(Duration::from_millis(50));

    assert!(controller.computation().is_alive());
    assert_eq!(controller.computation().with_body(|b| b.iterations()), 0);
    assert_eq!(progress_lines(&log), 0);
}

#[test]
fn test_stop_releases_blocked_consumer() {
    let (controller, log) = controller(fast_config());

    controller.computation().start();
    thread::sleep(Duration::from_millis(30));

    let start = Instant::now();
    controller.computation().stop();
    assert!(controller.computation().wait_stopped(Duration::from_millis(500)));
    assert!(start.elapsed() < Duration::from_millis(500));

    assert_eq!(controller.computation().state(), WorkerState::Stopped);
    assert_eq!(log.lines().last().map(String::as_str), Some("Computation thread finished"));
}

#[test]
fn test_consumed_flag_stays_clear_until_next_frame() {
    let (controller, _) = controller(fast_config());
    let signal = controller.frame_signal();

    // Producer paused: nothing new gets published
    controller.animation().set_delay_ms(5);
    controller.animation().start();
    assert!(wait_until(TIMEOUT, || signal.stats().published >= 1));
    controller.animation().set_paused(true);
    thread::sleep(Duration::from_millis(20));
    let published = signal.stats().published;

    controller.computation().start();
    assert!(wait_until(TIMEOUT, || !signal.is_ready()));

    thread::sleep(Duration::from_millis(30));
    assert!(!signal.is_ready());
    assert_eq!(signal.stats().published, published);

    controller.animation().set_paused(false);
    assert!(wait_until(TIMEOUT, || signal.stats().published > published));

    controller.shutdown();
}

#[test]
fn test_fast_producer_frames_collapse() {
    let mut config = fast_config();
    config.computation.delay_ms = 40;
    let (controller, _) = controller(config);

    controller.animation().start();
    controller.computation().start();

    assert!(wait_until(TIMEOUT, || controller.frame_stats().published >= 60));
    controller.shutdown();

    let stats = controller.frame_stats();
    assert!(stats.consumed < stats.published);
    assert!(stats.dropped() > 0);
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[test]
fn test_animation_alone_respects_cap() {
    let (controller, _) = controller(fast_config());
    let animation = controller.animation();

    animation.start();
    for _ in 0..50 {
        let count = animation.with_body(|b| b.particle_count());
        assert!(count <= 20);
        thread::sleep(Duration::from_millis(1));
    }
    assert!(wait_until(TIMEOUT, || animation.with_body(|b| b.particle_count()) == 20));

    controller.shutdown();
}

#[test]
fn test_restart_resets_private_state() {
    let (controller, _) = controller(fast_config());

    controller.animation().start();
    controller.computation().start();
    assert!(wait_until(TIMEOUT, || controller.computation().with_body(|b| b.iterations()) >= 300));

    controller.animation().stop();
    controller.computation().stop();
    assert!(controller.animation().wait_stopped(TIMEOUT));
    assert!(controller.computation().wait_stopped(TIMEOUT));
    assert!(controller.animation().with_body(|b| b.particle_count()) > 0);
    // Drop a frame the producer left pending
    controller.frame_signal().try_consume();

    // Computation restarts first and blocks on the gate before any tick
    controller.computation().start();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(controller.computation().with_body(|b| b.iterations()), 0);
    assert_eq!(controller.computation().with_body(|b| b.partial_sum()), 0.0);

    controller.shutdown();
}

#[test]
fn test_first_frame_after_restart_is_fresh() {
    let frames = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&frames);
    let renderer = move |frame: &FrameView<'_>| {
        seen.lock().unwrap().push((frame.time, frame.particles.len()));
    };

    let log = Arc::new(ProgressLog::new(1000));
    let controller = Controller::new(fast_config(), renderer, NullRenderer, log);
    let animation = controller.animation();

    animation.start();
    assert!(wait_until(TIMEOUT, || frames.lock().unwrap().len() >= 10));
    animation.stop();
    assert!(animation.wait_stopped(TIMEOUT));

    frames.lock().unwrap().clear();
    animation.start();
    assert!(wait_until(TIMEOUT, || !frames.lock().unwrap().is_empty()));

    let (time, particles) = frames.lock().unwrap()[0];
    assert!((time - 0.05).abs() < 1e-9);
    assert_eq!(particles, 1);

    controller.shutdown();
}

#[test]
fn test_rapid_start_keeps_single_execution() {
    let (controller, _) = controller(fast_config());
    let animation = controller.animation();

    animation.start();
    assert!(wait_until(TIMEOUT, || animation.with_body(|b| b.time()) > 0.2));
    let time_before = animation.with_body(|b| b.time());

    for _ in 0..100 {
        animation.start();
        assert!(animation.live_executions() <= 1);
    }

    assert_eq!(animation.status().starts, 1);
    assert!(animation.with_body(|b| b.time()) >= time_before);

    controller.shutdown();
}

#[test]
fn test_concurrent_start_stop_never_duplicates() {
    let worker = Arc::new(Worker::new("churn", || {}, 1));
    let max_live = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let worker = Arc::clone(&worker);
            let max_live = Arc::clone(&max_live);
            thread::spawn(move || {
                for n in 0..200 {
                    if (n + i) % 3 == 0 {
                        worker.stop();
                    } else {
                        worker.start();
                    }
                    max_live.fetch_max(worker.live_executions(), Ordering::SeqCst);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(max_live.load(Ordering::SeqCst) <= 1);
    worker.shutdown();
    assert_eq!(worker.live_executions(), 0);
}

#[test]
fn test_pause_freezes_side_effects() {
    let (controller, log) = controller(fast_config());
    let computation = controller.computation();

    controller.animation().start();
    computation.start();
    assert!(wait_until(TIMEOUT, || computation.with_body(|b| b.iterations()) >= 200));

    computation.set_paused(true);
    assert!(computation.is_paused());
    thread::sleep(Duration::from_millis(10));

    let iterations = computation.with_body(|b| b.iterations());
    let lines = progress_lines(&log);
    let consumed = controller.frame_stats().consumed;
    thread::sleep(Duration::from_millis(60));

    assert_eq!(computation.with_body(|b| b.iterations()), iterations);
    assert_eq!(progress_lines(&log), lines);
    // Frames are still drained while paused
    assert!(controller.frame_stats().consumed > consumed);
    assert!(computation.is_alive());
    assert_eq!(computation.state(), WorkerState::Paused);

    computation.set_paused(false);
    assert!(wait_until(TIMEOUT, || computation.with_body(|b| b.iterations()) > iterations));

    controller.shutdown();
}

#[test]
fn test_paused_animation_keeps_particles() {
    let (controller, _) = controller(fast_config());
    let animation = controller.animation();

    animation.start();
    assert!(wait_until(TIMEOUT, || animation.with_body(|b| b.particle_count()) >= 3));

    animation.set_paused(true);
    thread::sleep(Duration::from_millis(10));
    let snapshot = animation.with_body(|b| b.particles().to_vec());
    thread::sleep(Duration::from_millis(40));

    assert_eq!(animation.with_body(|b| b.particles().to_vec()), snapshot);
    assert!(animation.is_alive());

    controller.shutdown();
}

#[test]
fn test_marquee_runs_independently() {
    let (controller, _) = controller(fast_config());
    let marquee = controller.marquee();

    marquee.start();
    assert!(wait_until(TIMEOUT, || marquee.with_body(|b| b.offset()) <= -30));
    assert_eq!(controller.frame_stats().published, 0);

    controller.shutdown();
}

// ============================================================================
// CONTROL SURFACE
// ============================================================================

#[test]
fn test_delay_clamps_through_control_handle() {
    let (controller, _) = controller(fast_config());

    for kind in WorkerKind::ALL {
        let worker = controller.worker(kind);
        worker.set_delay_ms(0);
        assert_eq!(worker.status().delay, Duration::from_millis(1));
        worker.set_delay_ms(-5);
        assert_eq!(worker.status().delay, Duration::from_millis(1));
    }
}

#[test]
fn test_priority_before_start_is_ignored() {
    let (controller, _) = controller(fast_config());
    let marquee = controller.worker(WorkerKind::Marquee);

    marquee.set_priority(Priority::Min);
    assert_eq!(marquee.status().priority, Priority::Normal);

    marquee.start();
    marquee.set_priority(Priority::Min);
    assert_eq!(marquee.status().priority, Priority::Min);

    controller.shutdown();
}

#[test]
fn test_standalone_signal_and_worker() {
    let signal = Arc::new(FrameSignal::new());
    let consumed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&consumed);

    let consumer = Worker::new(
        "consumer",
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
        },
        1,
    )
    .gated(Arc::clone(&signal));

    consumer.start();
    for expected in 1..=3 {
        signal.publish();
        assert!(wait_until(TIMEOUT, || consumed.load(Ordering::SeqCst) == expected));
    }

    consumer.shutdown();
    assert!(!consumer.is_running());
}
