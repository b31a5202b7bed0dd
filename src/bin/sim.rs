use battleship_contest::prelude::*;
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: {} <first> <second> <seed>", args[0]);
        std::process::exit(1);
    }
    let seed: u64 = args[3].parse()?;

    let outcome = run_local_match(&args[1], &args[2], Some(seed)).await?;
    let registry = PlayerRegistry::builtin();
    let winner = registry.get(outcome.winner_player as usize).map(|p| p.name);

    let result = json!({
        "game_id": outcome.game_id.to_string(),
        "first": {"player": args[1], "shots": outcome.shots[0]},
        "second": {"player": args[2], "shots": outcome.shots[1]},
        "rounds": outcome.rounds,
        "winner": winner,
        "winner_side": outcome.winner,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
