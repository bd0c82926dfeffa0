use std::env;
use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use ledger_service::api::http_routes::{
    routes, AppState, CreateWalletRequest, TransferRequest, TransferSettlementRequest, WalletBalanceResponse,
    WalletEventResponse, WalletResponse,
};
use ledger_service::api::response::ApiResponse;
use ledger_service::domain::bus::{Publisher, Subscriber};
use ledger_service::infrastructure::bus::{InMemoryBus, JetStreamBus};
use ledger_service::infrastructure::persistence::{
    PgTransactionManager, PostgresOutboxRepository, PostgresWalletEventRepository, PostgresWalletProjectionRepository,
    PostgresWalletRepository,
};
use ledger_service::jobs::OutboxPoller;
use ledger_service::router::{Router as BusRouter, WalletEventCreatedHandler};
use ledger_service::use_cases::{
    CompleteTransferUseCase, CreateWalletUseCase, CreditTransferUseCase, DebitTransferUseCase, EventAppender,
    GetWalletUseCase, RebuildProjectionUseCase, RevertTransferUseCase,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        ledger_service::api::http_routes::create_wallet,
        ledger_service::api::http_routes::get_wallet,
        ledger_service::api::http_routes::debit_transfer,
        ledger_service::api::http_routes::credit_transfer,
        ledger_service::api::http_routes::complete_transfer,
        ledger_service::api::http_routes::revert_transfer,
    ),
    components(schemas(
        CreateWalletRequest,
        TransferRequest,
        TransferSettlementRequest,
        WalletResponse,
        WalletBalanceResponse,
        WalletEventResponse,
        ApiResponse<serde_json::Value>,
    ))
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting Ledger Service...");

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new().max_connections(5).connect(&database_url).await?;
    info!("Connected to Database");

    let wallet_repo = Arc::new(PostgresWalletRepository::new(pool.clone()));
    let event_repo = Arc::new(PostgresWalletEventRepository::new(pool.clone()));
    let projection_repo = Arc::new(PostgresWalletProjectionRepository::new());
    let outbox_repo = Arc::new(PostgresOutboxRepository::new());
    let tx_manager = Arc::new(PgTransactionManager::new(pool.clone()));

    let appender = EventAppender {
        event_repo: event_repo.clone(),
        outbox_repo: outbox_repo.clone(),
        tx_manager: tx_manager.clone(),
    };

    let create_wallet = Arc::new(CreateWalletUseCase::new(
        wallet_repo.clone(),
        projection_repo.clone(),
        tx_manager.clone(),
    ));
    let get_wallet = Arc::new(GetWalletUseCase::new(wallet_repo.clone(), projection_repo.clone(), tx_manager.clone()));
    let debit_transfer = Arc::new(DebitTransferUseCase::new(wallet_repo.clone(), appender.clone()));
    let credit_transfer = Arc::new(CreditTransferUseCase::new(
        wallet_repo.clone(),
        event_repo.clone(),
        appender.clone(),
    ));
    let complete_transfer = Arc::new(CompleteTransferUseCase::new(wallet_repo.clone(), appender.clone()));
    let revert_transfer = Arc::new(RevertTransferUseCase::new(wallet_repo.clone(), appender.clone()));
    let rebuild_projection = Arc::new(RebuildProjectionUseCase::new(
        event_repo.clone(),
        projection_repo.clone(),
        tx_manager.clone(),
    ));

    let app_state = AppState {
        create_wallet,
        get_wallet,
        debit_transfer,
        credit_transfer,
        complete_transfer,
        revert_transfer,
    };

    let app = routes(app_state).merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let shutdown = CancellationToken::new();
    let router_concurrency: usize = env::var("ROUTER_CONCURRENCY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);

    // The bus: JetStream when a broker is configured, otherwise a
    // process-local fake so the service still runs end to end (outbox
    // poller included) with nothing else on the box.
    let publisher: Arc<dyn Publisher> = match env::var("NATS_URL") {
        Ok(nats_url) => {
            let bus = Arc::new(JetStreamBus::connect(&nats_url).await?);
            info!(url = %nats_url, "connected to NATS JetStream");
            spawn_router(bus.clone(), rebuild_projection, router_concurrency, shutdown.clone());
            bus
        }
        Err(_) => {
            info!("NATS_URL not set, using in-memory bus");
            let bus = Arc::new(InMemoryBus::new());
            spawn_router(bus.clone(), rebuild_projection, router_concurrency, shutdown.clone());
            bus
        }
    };

    let poll_interval = Duration::from_millis(
        env::var("OUTBOX_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000),
    );
    let batch_size: i64 = env::var("OUTBOX_POLL_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    let poller = OutboxPoller::new(outbox_repo, tx_manager, publisher, poll_interval, batch_size);
    let poller_shutdown = shutdown.clone();
    tokio::spawn(async move {
        poller.run(poller_shutdown).await;
    });

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{host}:{port}");

    info!(%addr, "HTTP Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}

/// Registers the one handler this service runs against the bus, and spawns
/// its worker pool in the background until `shutdown` fires.
fn spawn_router<S>(subscriber: Arc<S>, rebuild_projection: Arc<RebuildProjectionUseCase>, concurrency: usize, shutdown: CancellationToken)
where
    S: Subscriber + 'static,
{
    let handler = Arc::new(WalletEventCreatedHandler::new(rebuild_projection));
    let router = BusRouter::new(subscriber, concurrency);
    tokio::spawn(async move {
        if let Err(err) = router.run(handler, shutdown).await {
            tracing::error!(error = %err, "router worker pool exited with an error");
        }
    });
}
