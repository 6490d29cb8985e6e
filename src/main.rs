//! Console entry point: triggers one synchronization run and follows it to
//! completion, honoring any cool-down recovered from a previous run.

use edusync::config::SyncConfig;
use edusync::monitor::SyncStatusKind;
use edusync::session::{ControllerState, SyncController};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("edusync=info")),
        )
        .init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    println!("edusync console - server {}", config.server_url());

    let controller = SyncController::builder(config).build();
    controller.start_monitors();

    if controller.state() == ControllerState::Cooldown {
        println!(
            "recovered cool-down from a previous run ({}s remaining)",
            controller.remaining_seconds()
        );
        wait_out_cooldown(&controller).await;
    } else if let Err(e) = controller.request_sync().await {
        eprintln!("synchronization not started: {e}");
        controller.teardown();
        std::process::exit(1);
    } else {
        wait_out_cooldown(&controller).await;
    }

    let status = controller.status().fetch_now().await;
    match status.normalized {
        SyncStatusKind::Success => println!("last sync: success - {}", status.message),
        SyncStatusKind::InProgress => println!("sync still running - {}", status.message),
        SyncStatusKind::Error => println!(
            "sync reported an error - {} ({})",
            status.message,
            status.error_detail.unwrap_or_default()
        ),
        SyncStatusKind::Unknown => println!("sync outcome unknown"),
    }
    if let Some(at) = status.last_sync_at {
        println!("last completed sync: {at}");
    }

    controller.teardown();
}

fn load_config() -> Result<SyncConfig, Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("--config") => {
            let path = args.next().ok_or("--config requires a path")?;
            Ok(SyncConfig::from_file(path)?)
        }
        Some(other) => Err(format!("unknown argument: {other}").into()),
        None => Ok(SyncConfig::new()),
    }
}

/// Follow the countdown until the controller returns to idle.
async fn wait_out_cooldown(controller: &SyncController) {
    let mut state_rx = controller.watch_state();
    let mut remaining_rx = controller.watch_remaining();

    loop {
        if *state_rx.borrow() != ControllerState::Cooldown {
            break;
        }
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = remaining_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let left = *remaining_rx.borrow();
                if left > 0 && left % 10 == 0 {
                    println!("next synchronization available in {left}s");
                }
            }
        }
    }
}
