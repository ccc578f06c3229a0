use anyhow::Result;
use call_screen::{CallSession, Config, ControlAction, SimulatedPlayback};
use clap::Parser;
use std::io::BufRead;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "call-screen")]
#[command(about = "Simulated video call: connecting, active, ended")]
struct Args {
    /// Config file (without extension)
    #[arg(short, long, default_value = "config/call-screen")]
    config: String,

    /// Override the connecting delay in milliseconds
    #[arg(long)]
    connect_delay_ms: Option<u64>,

    /// Override the simulated media length in seconds
    #[arg(long)]
    playback_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;

    if let Some(delay) = args.connect_delay_ms {
        cfg.call.connect_delay_ms = delay;
    }
    if let Some(secs) = args.playback_secs {
        cfg.playback.duration_secs = secs;
    }

    info!("Call Screen v0.1.0");
    info!("Connect delay: {}ms", cfg.call.connect_delay_ms);
    info!("Media: {}", cfg.call.media_url);

    let backend = SimulatedPlayback::new(cfg.playback_duration());
    let mut session = CallSession::new(cfg.call_config(), backend);

    // Log phase changes as a presentation layer would render them
    let mut phases = session.subscribe();
    tokio::spawn(async move {
        while phases.changed().await.is_ok() {
            let phase = *phases.borrow_and_update();
            info!("Screen: {}", phase);
        }
    });

    // Ctrl+C hangs up
    let handle = session.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.end_call();
        }
    });

    // Read user intents from stdin on a plain thread so shutdown never waits on it
    let handle = session.handle();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };

            let action = match line.trim() {
                "m" | "mute" => ControlAction::ToggleMute,
                "c" | "mic" => ControlAction::ToggleMic,
                "e" | "end" => ControlAction::EndCall,
                "" => continue,
                other => {
                    warn!("Unknown command: {} (use m, c or e)", other);
                    continue;
                }
            };

            if !handle.dispatch(action) {
                break;
            }
        }
    });

    info!("Commands: m = toggle mute, c = toggle mic, e = end call");

    session.start();
    let stats = session.run().await;

    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}
