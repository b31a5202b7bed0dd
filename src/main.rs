#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use std::time::Duration;

#[cfg(feature = "std")]
use battleship_contest::{
    init_logging, run_local_match, seeded_rng, BattleHost, BattleOutcome, Coordinator, CoordinatorConfig,
    HostConfig, PlayerRegistry, Shutdown, DEFAULT_ADDRESS, DEFAULT_MAX_ROUNDS,
};
#[cfg(feature = "std")]
use clap::Parser;
#[cfg(feature = "std")]
use log::{error, info};
#[cfg(feature = "std")]
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Wait for a battle host and run matches through it.
    Coordinator {
        #[arg(long, default_value = DEFAULT_ADDRESS)]
        listen: String,
        #[arg(long, default_value = "sequential")]
        first: String,
        #[arg(long, default_value = "random")]
        second: String,
        #[arg(long, default_value_t = 1)]
        matches: usize,
        #[arg(long, default_value_t = 20 * 60, help = "Seconds to wait for each shot")]
        shot_timeout_secs: u64,
        #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
        max_rounds: usize,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Connect to a coordinator and play on its behalf.
    Host {
        #[arg(long, default_value = DEFAULT_ADDRESS)]
        connect: String,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Run coordinator and host in one process.
    Local {
        #[arg(long, default_value = "hunter")]
        first: String,
        #[arg(long, default_value = "random")]
        second: String,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// List the registered players.
    Players,
}

#[cfg(feature = "std")]
fn print_outcome(registry: PlayerRegistry, outcome: &BattleOutcome) {
    let name = registry
        .get(outcome.winner_player as usize)
        .map(|p| p.name)
        .unwrap_or("?");
    println!(
        "Game {}: {} wins after {} rounds ({} / {} shots)",
        outcome.game_id, name, outcome.rounds, outcome.shots[0], outcome.shots[1]
    );
}

#[cfg(feature = "std")]
fn stop_on_ctrl_c(shutdown: impl Fn() + Send + 'static) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received");
            shutdown();
        }
    });
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let registry = PlayerRegistry::builtin();

    match cli.command {
        Commands::Coordinator {
            listen,
            first,
            second,
            matches,
            shot_timeout_secs,
            max_rounds,
            seed,
        } => {
            let first = registry.position(&first)?;
            let second = registry.position(&second)?;
            let config = CoordinatorConfig {
                listen,
                shot_timeout: Duration::from_secs(shot_timeout_secs),
                max_rounds,
            };
            let listener = TcpListener::bind(config.listen.as_str()).await?;
            let coordinator = Coordinator::new(config, registry);
            {
                let coordinator = coordinator.clone();
                stop_on_ctrl_c(move || coordinator.shutdown());
            }
            let server = {
                let coordinator = coordinator.clone();
                tokio::spawn(async move { coordinator.serve(listener).await })
            };

            let mut rng = seeded_rng(seed);
            println!("Waiting for a battle host on {}...", coordinator.config().listen);
            let mut shutdown = coordinator.shutdown_listener();
            tokio::select! {
                _ = coordinator.connection().wait_connected() => {}
                _ = shutdown.wait() => {}
            }
            for _ in 0..matches {
                if coordinator.is_shutting_down() {
                    break;
                }
                match coordinator.start_match(first, second, &mut rng).await {
                    Ok(outcome) => print_outcome(registry, &outcome),
                    Err(e) => {
                        error!("Match failed: {}", e);
                        println!("Match failed: {}", e);
                    }
                }
            }
            coordinator.shutdown();
            server.await??;
        }
        Commands::Host { connect, seed } => {
            let shutdown = Shutdown::new();
            {
                let shutdown = shutdown.clone();
                stop_on_ctrl_c(move || shutdown.trigger());
            }
            let host = BattleHost::new(registry, seeded_rng(seed));
            host.connect(&HostConfig { connect }, shutdown.listener()).await?;
        }
        Commands::Local { first, second, seed } => {
            if let Some(s) = seed {
                println!("Using fixed seed: {} (game will be reproducible)", s);
            }
            let outcome = run_local_match(&first, &second, seed).await?;
            print_outcome(registry, &outcome);
        }
        Commands::Players => {
            for (index, player) in registry.iter().enumerate() {
                println!("{}: {}", index, player.name);
            }
        }
    }
    Ok(())
}
