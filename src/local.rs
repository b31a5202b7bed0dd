//! Coordinator and battle host in one process, linked in memory.

use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::battle::BattleOutcome;
use crate::config::CoordinatorConfig;
use crate::coordinator::Coordinator;
use crate::host::BattleHost;
use crate::lifecycle::Shutdown;
use crate::player::PlayerRegistry;
use crate::transport::in_memory::InMemoryTransport;

/// Seeded generator for reproducible runs, entropy-seeded otherwise.
pub fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_rng(&mut rand::rng()),
    }
}

/// Play one match between the builtin players named `first` and `second`.
pub async fn run_local_match(first: &str, second: &str, seed: Option<u64>) -> anyhow::Result<BattleOutcome> {
    run_local_match_with(CoordinatorConfig::default(), first, second, seed).await
}

pub async fn run_local_match_with(
    config: CoordinatorConfig,
    first: &str,
    second: &str,
    seed: Option<u64>,
) -> anyhow::Result<BattleOutcome> {
    let registry = PlayerRegistry::builtin();
    let first_index = registry.position(first)?;
    let second_index = registry.position(second)?;
    let mut rng = seeded_rng(seed);

    let coordinator = Coordinator::new(config, registry);
    let (coordinator_end, host_end) = InMemoryTransport::pair();
    let host_shutdown = Shutdown::new();
    let host = BattleHost::new(registry, SmallRng::from_rng(&mut rng));
    let host_task = tokio::spawn(host.run(host_end, host_shutdown.listener()));

    let reader = coordinator.accept_host(coordinator_end).await?;
    info!("Local match: {} vs {}", first, second);
    let outcome = coordinator.start_match(first_index, second_index, &mut rng).await;

    coordinator.shutdown();
    host_shutdown.trigger();
    reader.await?;
    host_task.await??;
    Ok(outcome?)
}
