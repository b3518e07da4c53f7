//! # brewrigd — brewrig daemon
//!
//! Composition root that wires the adapters together and runs the status
//! recorder until interrupted.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env vars)
//! - Initialize tracing
//! - Construct the filesystem graph store and the rig adapters
//! - Start the `StatusRecorder` and, in demo mode, heat the virtual mash
//!   vessel through a one-step recipe so the run records real deltas
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use brewrig_adapter_graph_fs::FsGraphStore;
use brewrig_adapter_virtual::{InMemoryNotifier, VirtualController, VirtualProbe, VirtualRig};
use brewrig_app::recorder::StatusRecorder;
use brewrig_app::sequence_runner::SequenceRunner;
use brewrig_app::trigger_engine::TriggerEngine;
use brewrig_domain::sequence::TriggerSequence;
use brewrig_domain::temperature::TemperatureScale;
use brewrig_domain::trigger::TemperatureTrigger;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .init();

    let store = FsGraphStore::new(&config.recording.graph_dir);
    let rig = VirtualRig::new();

    let (demo_cancel, demo_signal) = watch::channel(false);
    let demo_tasks = if config.integrations.virtual_enabled {
        start_demo(&rig, config.poll_interval(), demo_signal)
    } else {
        Vec::new()
    };

    let mut recorder = StatusRecorder::new(rig, store, config.sample_interval());
    recorder.start();
    tracing::info!(
        graph_dir = %config.recording.graph_dir,
        "brewrigd recording rig status",
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("interrupt received, shutting down");

    let _ = demo_cancel.send(true);
    for task in demo_tasks {
        task.abort();
    }
    recorder.stop().await;

    Ok(())
}

/// Populate the virtual rig with a small brewery, slowly heat the mash
/// vessel, and run a one-step recipe gated on it reaching strike
/// temperature.
fn start_demo(
    rig: &VirtualRig,
    poll_interval: Duration,
    cancel: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    let mash_probe = VirtualProbe::new("Mash", TemperatureScale::Celsius, 18.0);
    let mash_pid = VirtualController::new();
    mash_pid.set_mode("auto");
    rig.add_vessel("Mash", mash_probe.clone(), Some(mash_pid.clone()));

    let fermenter = VirtualProbe::new("Fermenter", TemperatureScale::Celsius, 19.0);
    rig.add_vessel("Fermenter", fermenter, None);

    let ramp = tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            let current = mash_probe.temperature();
            if mash_pid.current_setpoint().is_some_and(|target| current < target) {
                mash_probe.set_temperature(current + 0.5);
                mash_pid.set_duty(100.0);
            } else {
                mash_pid.set_duty(0.0);
            }
        }
    });

    let recipe = tokio::spawn({
        let runner = SequenceRunner::new(
            TriggerEngine::new(rig.clone(), InMemoryNotifier::new())
                .with_poll_interval(poll_interval),
        );
        async move {
            let mut sequence = TriggerSequence::new();
            let strike = TemperatureTrigger::from_params(
                1,
                &serde_json::json!({
                    "targetTemperature": "66",
                    "exitTemperature": "65.5",
                    "method": "Mash",
                    "stepType": "Strike",
                    "tempprobe": "Mash",
                    "mode": "INCREASE",
                }),
            );
            match strike {
                Ok(trigger) => {
                    // Positions are unique in a fresh sequence.
                    let _ = sequence.insert(trigger);
                    let outcome = runner.run(&mut sequence, cancel).await;
                    tracing::info!(?outcome, "demo recipe finished");
                }
                Err(error) => tracing::warn!(%error, "demo recipe misconfigured"),
            }
        }
    });

    vec![ramp, recipe]
}
