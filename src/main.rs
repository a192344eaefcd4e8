// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use ddns_operator::{
    constants::{
        CONTROLLER_NAME, DEFAULT_METRICS_BIND_ADDRESS, ERROR_REQUEUE_DURATION_SECS,
        KIND_NOTIFIER, KIND_PROVIDER, METRICS_BIND_ADDRESS_ENV, TOKIO_WORKER_THREADS,
        WATCH_NAMESPACE_ENV,
    },
    context::Context,
    crd::{Notifier, Provider},
    metrics,
    reconcilers::{notifiers_for_provider, reconcile_notifier, reconcile_provider},
};
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher::Config, Controller},
    Api, Client, Resource, ResourceExt,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name(CONTROLLER_NAME)
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Respects RUST_LOG (defaults to INFO) and RUST_LOG_FORMAT (`json` or `text`)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting DDNS Operator");

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let watch_namespace = std::env::var(WATCH_NAMESPACE_ENV)
        .ok()
        .filter(|namespace| !namespace.is_empty());
    match &watch_namespace {
        Some(namespace) => info!("Watching namespace: {}", namespace),
        None => info!("Watching all namespaces"),
    }

    let ctx = Arc::new(Context::new(client.clone(), watch_namespace.clone())?);

    info!("Starting all controllers");

    // Controllers should never exit - if one fails, we log it and exit the main process
    tokio::select! {
        result = run_provider_controller(client.clone(), watch_namespace.clone(), ctx.clone()) => {
            error!("CRITICAL: Provider controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Provider controller exited unexpectedly without error")
        }
        result = run_notifier_controller(client.clone(), watch_namespace.clone(), ctx.clone()) => {
            error!("CRITICAL: Notifier controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Notifier controller exited unexpectedly without error")
        }
        result = run_metrics_server() => {
            error!("CRITICAL: Metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Metrics server exited unexpectedly without error")
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, stopping controllers");
            Ok(())
        }
    }
}

fn scoped_api<K>(client: Client, watch_namespace: Option<&str>) -> Api<K>
where
    K: Resource<Scope = kube::core::NamespaceResourceScope, DynamicType = ()>,
{
    match watch_namespace {
        Some(namespace) => Api::namespaced(client, namespace),
        None => Api::all(client),
    }
}

/// Run the `Provider` controller
async fn run_provider_controller(
    client: Client,
    watch_namespace: Option<String>,
    ctx: Arc<Context>,
) -> Result<()> {
    info!("Starting Provider controller");

    let api = scoped_api::<Provider>(client, watch_namespace.as_deref());

    Controller::new(api, Config::default())
        .run(reconcile_provider_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Run the `Notifier` controller
///
/// Also watches `Provider` resources so that a provider IP change re-enqueues
/// every notifier the provider references.
async fn run_notifier_controller(
    client: Client,
    watch_namespace: Option<String>,
    ctx: Arc<Context>,
) -> Result<()> {
    info!("Starting Notifier controller");

    let api = scoped_api::<Notifier>(client.clone(), watch_namespace.as_deref());
    let providers = scoped_api::<Provider>(client, watch_namespace.as_deref());

    Controller::new(api, Config::default())
        .watches(providers, Config::default(), |provider| {
            notifiers_for_provider(&provider)
        })
        .run(reconcile_notifier_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Serve Prometheus metrics and health probes
async fn run_metrics_server() -> Result<()> {
    let addr = std::env::var(METRICS_BIND_ADDRESS_ENV)
        .unwrap_or_else(|_| DEFAULT_METRICS_BIND_ADDRESS.to_string());

    info!("Starting metrics server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, metrics::metrics_router()).await?;

    Ok(())
}

/// Reconcile wrapper for `Provider`
async fn reconcile_provider_wrapper(
    provider: Arc<Provider>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = Instant::now();
    let namespace = provider.namespace().unwrap_or_default();
    let name = provider.name_any();

    match reconcile_provider(ctx, &namespace, &name).await {
        Ok(action) => {
            info!("Successfully reconciled Provider: {}/{}", namespace, name);
            metrics::record_reconciliation_success(KIND_PROVIDER, start.elapsed());
            Ok(action)
        }
        Err(e) => {
            error!("Failed to reconcile Provider {}/{}: {:#}", namespace, name, e);
            metrics::record_reconciliation_error(KIND_PROVIDER, start.elapsed());
            metrics::record_error(KIND_PROVIDER, "reconcile_error");
            Err(e.into())
        }
    }
}

/// Reconcile wrapper for `Notifier`
async fn reconcile_notifier_wrapper(
    notifier: Arc<Notifier>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = Instant::now();
    let namespace = notifier.namespace().unwrap_or_default();
    let name = notifier.name_any();

    match reconcile_notifier(ctx, &namespace, &name).await {
        Ok(action) => {
            info!("Successfully reconciled Notifier: {}/{}", namespace, name);
            metrics::record_reconciliation_success(KIND_NOTIFIER, start.elapsed());
            Ok(action)
        }
        Err(e) => {
            error!("Failed to reconcile Notifier {}/{}: {:#}", namespace, name, e);
            metrics::record_reconciliation_error(KIND_NOTIFIER, start.elapsed());
            metrics::record_error(KIND_NOTIFIER, "reconcile_error");
            Err(e.into())
        }
    }
}

/// Error policy shared by both controllers
fn error_policy<K>(_resource: Arc<K>, _err: &ReconcileError, _ctx: Arc<Context>) -> Action {
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}
