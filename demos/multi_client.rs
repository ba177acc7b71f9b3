//! Multi-client example: several subsystems sharing one hardware watchdog
//!
//! This example demonstrates:
//! - A static WatchdogMux shared between "threads" and a timer "ISR"
//! - A thread-backed timer source invoking the sampler callback
//! - Two workers kicking their own virtual watchdogs
//! - One worker going silent and the hardware kick being withheld

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use virtual_watchdog::prelude::*;

const HW_MAX_TIMEOUT_MS: u32 = 800;

type Mux = WatchdogMux<SimulatedWatchdog, ThreadTimer, 4>;

static MUX: OnceLock<Mux> = OnceLock::new();

// Simulated "device reset" flag set by the hardware watchdog model
static RESET: AtomicBool = AtomicBool::new(false);
static WITHHELD_TICKS: AtomicU32 = AtomicU32::new(0);

/// Hardware watchdog model: remembers when it was last kicked.
struct SimulatedWatchdog {
    started_at: Option<Instant>,
    last_kick: Option<Instant>,
}

impl SimulatedWatchdog {
    fn expired(&self) -> bool {
        match self.last_kick.or(self.started_at) {
            Some(at) => at.elapsed() > Duration::from_millis(HW_MAX_TIMEOUT_MS as u64),
            None => false,
        }
    }
}

impl HardwareWatchdog for SimulatedWatchdog {
    fn max_timeout_ms(&self) -> u32 {
        HW_MAX_TIMEOUT_MS
    }

    fn start(&mut self, timeout_ms: u32) {
        println!("  [hw] watchdog started ({timeout_ms} ms)");
        self.started_at = Some(Instant::now());
        self.last_kick = None;
    }

    fn stop(&mut self) {
        println!("  [hw] watchdog stopped");
        self.started_at = None;
        self.last_kick = None;
    }

    fn kick(&mut self) {
        self.last_kick = Some(Instant::now());
    }
}

/// Timer source backed by a thread that calls the callback every period.
#[derive(Default)]
struct ThreadTimer {
    running: Option<Arc<AtomicBool>>,
}

impl TimerSource for ThreadTimer {
    fn start(&mut self, period_ms: u32, callback: fn()) {
        println!("  [timer] period {period_ms} ms");
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        thread::spawn(move || {
            while flag.load(Ordering::Acquire) {
                thread::sleep(Duration::from_millis(period_ms as u64));
                if flag.load(Ordering::Acquire) {
                    callback();
                }
            }
        });
        self.running = Some(running);
    }

    fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.store(false, Ordering::Release);
        }
    }
}

// Simulates the timer ISR
fn on_tick() {
    let Some(mux) = MUX.get() else {
        return;
    };

    if mux.process() == TickOutcome::Withheld {
        WITHHELD_TICKS.fetch_add(1, Ordering::Relaxed);
    }

    if mux.with_hardware(|hw| hw.expired()) {
        RESET.store(true, Ordering::Release);
    }
}

struct StdoutLogger;

impl log::Log for StdoutLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        println!("  [{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: StdoutLogger = StdoutLogger;

fn main() {
    println!("=== Multi-Client Virtual Watchdog Example ===\n");
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(log::LevelFilter::Trace));
    RESET.store(false, Ordering::Release);
    WITHHELD_TICKS.store(0, Ordering::Relaxed);

    let mux = MUX.get_or_init(|| {
        WatchdogMuxBuilder::new()
            .capacity::<4>()
            .hardware(SimulatedWatchdog {
                started_at: None,
                last_kick: None,
            })
            .timer(ThreadTimer::default())
            .on_tick(on_tick)
            .build()
    });

    let stop_network = Arc::new(AtomicBool::new(false));

    // Network worker: kicks every 40 ms until told to go silent
    let network = {
        let stop_network = stop_network.clone();
        thread::spawn(move || {
            let mut wdg = VirtualWatchdog::new(mux, 100, Some("network"));
            wdg.start();
            let deadline = Instant::now() + Duration::from_millis(1500);
            while Instant::now() < deadline && !RESET.load(Ordering::Acquire) {
                if !stop_network.load(Ordering::Relaxed) {
                    wdg.kick();
                }
                thread::sleep(Duration::from_millis(40));
            }
            wdg.stop();
        })
    };

    // Application loop: kicks every 100 ms for the whole run
    let app = thread::spawn(move || {
        let mut wdg = VirtualWatchdog::new(mux, 300, Some("app"));
        wdg.start();
        let deadline = Instant::now() + Duration::from_millis(1500);
        while Instant::now() < deadline && !RESET.load(Ordering::Acquire) {
            wdg.kick();
            thread::sleep(Duration::from_millis(100));
        }
        wdg.stop();
    });

    thread::sleep(Duration::from_millis(400));
    println!("Main: active clients = {}", mux.active_count());
    println!("Main: network worker goes silent");
    stop_network.store(true, Ordering::Relaxed);

    network.join().unwrap();
    app.join().unwrap();

    println!(
        "\nMain: withheld ticks = {}, device reset = {}",
        WITHHELD_TICKS.load(Ordering::Relaxed),
        RESET.load(Ordering::Acquire)
    );
    println!("Main: hardware running after all clients stopped = {}", mux.is_hardware_running());
}
