use std::time::Instant;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use snake_local_view::config::SimulationConfig;
use snake_local_view::game::simulation::{Simulation, TickReport};

/// Ticks between progress log lines
const PROGRESS_INTERVAL: u64 = 100;

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Snake local view demo v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = SimulationConfig::load_or_default();
    config.validate()?;
    info!(
        "Configuration loaded: field {}x{} (wrap={}), bots={}, food={}, ticks={}",
        config.field.width,
        config.field.height,
        config.field.wrap,
        config.initial_bots,
        config.target_food,
        config.ticks
    );

    let ticks = config.ticks;
    let mut simulation = Simulation::new(config)?;
    simulation.populate();

    let started = Instant::now();
    let mut totals = TickReport::default();
    for _ in 0..ticks {
        let report = simulation.step()?;
        totals.moved += report.moved;
        totals.eaten += report.eaten;
        totals.killed += report.killed;
        totals.bots_spawned += report.bots_spawned;
        totals.food_spawned += report.food_spawned;

        if report.tick % PROGRESS_INTERVAL == 0 {
            let stats = simulation.field().stats();
            info!(
                tick = report.tick,
                bots = stats.bots,
                segments = stats.segments,
                food = stats.food,
                busiest_cell = stats.segment_grid.max_per_cell,
                "progress"
            );
        }
    }
    totals.tick = simulation.current_tick();

    let elapsed = started.elapsed();
    if ticks > 0 {
        info!(
            "Ran {} ticks in {:.2?} ({:.1} us/tick)",
            ticks,
            elapsed,
            elapsed.as_secs_f64() * 1e6 / ticks as f64
        );
    } else {
        warn!("TICKS=0, nothing simulated");
    }
    info!("Totals: {}", serde_json::to_string(&totals)?);

    let mut leaders: Vec<_> = simulation.field().bots().collect();
    leaders.sort_by(|a, b| b.length().cmp(&a.length()).then(a.name.cmp(&b.name)));
    for bot in leaders.iter().take(5) {
        info!(
            "{:<10} length={:<4} eaten={:.1}",
            bot.name,
            bot.length(),
            bot.consumed_food
        );
    }

    Ok(())
}
