use std::net::SocketAddr;
use std::path::Path;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use transit_server::planner::PlannerConfig;
use transit_server::timetable::loader;
use transit_server::web::{create_router, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let data_dir = std::env::var("TIMETABLE_DIR").unwrap_or_else(|_| "text".to_string());
    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "web".to_string());

    let timetable = match loader::load_dir(Path::new(&data_dir)) {
        Ok(timetable) => timetable,
        Err(e) => {
            error!(data_dir, "failed to load timetable: {e}");
            std::process::exit(1);
        }
    };

    let state = AppState::new(timetable, PlannerConfig::default());
    let app = create_router(state, &static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
