use anyhow::Context;
use balancer::{BalancerConfig, Vehicle};
use log::info;
use sitl::{Sim, SitlBoard};

enum State {
    Initializing,
    Running,
    Stopping,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let sim = Sim::new();
    // start the body leaning 4 degrees off the setpoint
    sim.set_tilt(4.0);

    let mut vehicle = Vehicle::new(SitlBoard::new(sim.clone()), BalancerConfig::default())
        .context("failed to build vehicle")?;

    let mut state = State::Initializing;
    let mut ticks_left = 500u32;
    loop {
        match state {
            State::Initializing => {
                info!("Initializing...");
                vehicle
                    .init()
                    .context("sensor bring-up failed, nothing to balance with")?;
                state = State::Running;
            }
            State::Running => {
                vehicle.tick();
                ticks_left -= 1;

                if ticks_left % 100 == 0 {
                    info!(
                        "t={}ms angle={:+.2}deg pid={:+.1} left={:?} temp={:.1}C",
                        sim.now_ms(),
                        vehicle.fused_angle(),
                        vehicle.last_output(),
                        sim.left_motor(),
                        vehicle.temperature(),
                    );
                }
                if ticks_left == 0 {
                    state = State::Stopping;
                }
            }
            State::Stopping => {
                let diag = vehicle.diagnostics();
                info!(
                    "Stopping: {} failed attempts, {} degraded reads",
                    diag.read_failures, diag.retries_exhausted
                );
                break;
            }
        }
    }
    Ok(())
}
