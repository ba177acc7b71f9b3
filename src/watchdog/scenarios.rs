//! End-to-end liveness scenarios across several clients.

use crate::watchdog::{
    TickOutcome, VirtualWatchdog,
    test_support::{TestClient, TestMux, run_ticks, test_mux},
};

/// Simulated millisecond clock: kicks each client at its own interval and
/// delivers a sampling tick every current sampling period. Returns the number
/// of ticks and how many of them refreshed the hardware.
fn simulate(mux: &TestMux, clients: &[(&TestClient<'_>, u32)], ms: u32) -> (u32, u32) {
    let mut ticks = 0;
    let mut refreshed = 0;
    let mut since_tick = 0;

    for t in 1..=ms {
        for (client, kick_every_ms) in clients {
            if t % kick_every_ms == 0 {
                client.kick();
            }
        }

        since_tick += 1;
        if let Some(period) = mux.sampling_period_ms() {
            if since_tick >= period {
                since_tick = 0;
                ticks += 1;
                if mux.process() == TickOutcome::Refreshed {
                    refreshed += 1;
                }
            }
        }
    }
    (ticks, refreshed)
}

#[test]
fn two_clients_kicking_in_time_keep_hardware_refreshed() {
    let mux = test_mux();
    let mut a = VirtualWatchdog::new(&mux, 300, Some("a"));
    let mut b = VirtualWatchdog::new(&mux, 100, Some("b"));
    a.start();
    b.start();
    assert_eq!(mux.sampling_period_ms(), Some(100));

    let (ticks, refreshed) = simulate(&mux, &[(&a, 90), (&b, 90)], 3000);
    assert_eq!(ticks, 30);
    assert_eq!(refreshed, ticks);

    b.stop();
    assert_eq!(mux.sampling_period_ms(), Some(300));

    let (ticks, refreshed) = simulate(&mux, &[(&a, 90)], 3000);
    assert_eq!(ticks, 10);
    assert_eq!(refreshed, ticks);
    mux.with_hardware(|hw| assert_eq!(hw.kicks, 40));
}

#[test]
fn timeout_between_periods_is_not_flagged_early() {
    let mux = test_mux();
    let mut a = VirtualWatchdog::new(&mux, 150, Some("a"));
    let mut b = VirtualWatchdog::new(&mux, 100, Some("b"));
    a.start();
    b.start();
    assert_eq!(mux.sampling_period_ms(), Some(100));

    // A's counter reads 200 at some ticks, but it never goes 150 ms unkicked
    let (ticks, refreshed) = simulate(&mux, &[(&a, 140), (&b, 90)], 3000);
    assert_eq!(ticks, 30);
    assert_eq!(refreshed, ticks);
}

#[test]
fn silent_client_withholds_kicks_until_stopped() {
    let mux = test_mux();
    let mut client = VirtualWatchdog::new(&mux, 50, Some("stuck"));
    client.start();

    // First window: still within deadline
    assert_eq!(mux.process(), TickOutcome::Refreshed);

    // Past the deadline: every tick withheld
    for _ in 0..20 {
        assert_eq!(mux.process(), TickOutcome::Withheld);
    }

    // Kick restores liveness
    client.kick();
    assert_eq!(mux.process(), TickOutcome::Refreshed);

    // Silent again, then stop: nothing left to evaluate
    run_ticks(&mux, 5);
    client.stop();
    assert_eq!(mux.process(), TickOutcome::Idle);
}

#[test]
fn one_silent_client_among_many_withholds_kicks() {
    let mux = test_mux();
    let mut alive = VirtualWatchdog::new(&mux, 100, Some("alive"));
    let mut also_alive = VirtualWatchdog::new(&mux, 400, Some("also-alive"));
    let mut silent = VirtualWatchdog::new(&mux, 200, Some("silent"));
    alive.start();
    also_alive.start();
    silent.start();

    let mut outcomes = [TickOutcome::Idle; 10];
    for outcome in outcomes.iter_mut() {
        alive.kick();
        also_alive.kick();
        *outcome = mux.process();
    }

    // Silent client reaches 200 ms after two ticks, exceeds it on the third
    assert_eq!(outcomes[0], TickOutcome::Refreshed);
    assert_eq!(outcomes[1], TickOutcome::Refreshed);
    assert!(outcomes[2..].iter().all(|o| *o == TickOutcome::Withheld));
    assert_eq!(mux.overdue().as_slice(), &[silent.id().unwrap()]);

    // Once the silent client leaves, the rest keep the hardware alive
    silent.stop();
    alive.kick();
    assert_eq!(mux.process(), TickOutcome::Refreshed);
}
