use std::sync::Arc;

use clap::Parser;
use poem::{Route, Server, listener::TcpListener};
use poem_openapi::OpenApiService;

use timetable_portal::AppData;
use timetable_portal::api::{AccessApi, EnrollmentApi, HealthApi, SchoolsApi};
use timetable_portal::cli::{self, Cli, Commands};
use timetable_portal::config::{
    BootstrapSettings, DatabaseConnections, SharedEnvironment, SystemEnvironment, init_logging,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    init_logging()?;

    let env: SharedEnvironment = Arc::new(SystemEnvironment);
    let bootstrap_settings = BootstrapSettings::from_env_provider(env.clone())?;

    let command = cli.command.unwrap_or(Commands::Serve);
    if command == Commands::Migrate {
        return cli::migrate::run_migrations(&bootstrap_settings).await;
    }

    let connections = DatabaseConnections::connect(&bootstrap_settings).await?;
    connections.migrate().await?;
    tracing::info!("Database migrations completed");

    let app_data = Arc::new(AppData::init(connections, env).await?);

    if command != Commands::Serve {
        return cli::execute_command(command, app_data).await;
    }

    serve(&bootstrap_settings, app_data).await?;
    Ok(())
}

async fn serve(
    bootstrap_settings: &BootstrapSettings,
    app_data: Arc<AppData>,
) -> Result<(), std::io::Error> {
    let address = bootstrap_settings.server_address();
    let server_url = format!("http://localhost:{}/api", bootstrap_settings.server_port());

    let api_service = OpenApiService::new(
        (
            HealthApi,
            SchoolsApi,
            AccessApi::new(app_data.clone()),
            EnrollmentApi::new(app_data),
        ),
        "Timetabling Portal API",
        env!("CARGO_PKG_VERSION"),
    )
    .server(server_url);

    let ui = api_service.swagger_ui();

    let app = Route::new()
        .nest("/api", api_service)
        .nest("/swagger", ui);

    tracing::info!("Starting server on http://{}", address);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger",
        bootstrap_settings.server_port()
    );

    Server::new(TcpListener::bind(address)).run(app).await
}
