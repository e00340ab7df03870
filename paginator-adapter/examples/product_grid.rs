// Example: a simulated product grid that scrolls to the bottom a few times.
//
// Run with `RUST_LOG=debug cargo run -p paginator-adapter --example product_grid --features tracing`.
use paginator::PaginatorOptions;
use paginator_adapter::{
    GridController, GridSurface, MainQueue, ProductGridController, SimulatedProductSource,
    SimulatedSourceOptions,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let queue = MainQueue::new();
    let source = SimulatedProductSource::new(queue.clone(), SimulatedSourceOptions::default());
    let mut grid: ProductGridController = GridController::new(
        PaginatorOptions::new(),
        queue.clone(),
        source,
        GridSurface::default(),
    );

    grid.start();

    // A 60 fps frame loop; the "user" keeps scrolling to the last cell.
    let mut now_ms = 0u64;
    while grid.paginator().pages_loaded() < 4 {
        now_ms += 16;
        grid.tick(now_ms);

        let len = grid.surface().cells().len();
        if len > 0 && grid.on_will_display(len - 1) {
            tracing::info!(now_ms, len, "reached the last cell, loading more");
        }
    }

    // Pretend every image finished loading.
    let ids: Vec<_> = grid.surface().cells().iter().map(|c| c.id).collect();
    for id in ids {
        grid.surface_mut().image_loaded(id);
    }

    for row in grid.surface().rows() {
        let labels: Vec<&str> = row.iter().map(|c| c.title.as_str()).collect();
        println!("{}", labels.join(" | "));
    }
    tracing::info!(state = ?grid.paginator().state(), "done");
}
