//! Schema provisioning on primary endpoints.

use std::sync::Arc;

use crate::error::RouterResult;
use crate::provider::SchemaCatalog;
use crate::routing::{Endpoint, Router};
use crate::session::Session;

/// Provision every primary of `router`, one after another. Replicas are
/// never touched; the first failure stops the run.
pub(crate) async fn provision_router(catalog: &dyn SchemaCatalog, router: &Router, reset: bool) -> RouterResult<()> {
    for endpoint in router.primary_endpoints() {
        provision_endpoint(catalog, endpoint, reset).await?;
    }
    Ok(())
}

/// Provision one primary: drop (when `reset`) then create, in one transaction.
///
/// The drop completes before the create starts. A failure rolls the
/// transaction back; the session is closed on every path.
pub(crate) async fn provision_endpoint(
    catalog: &dyn SchemaCatalog,
    endpoint: Arc<Endpoint>,
    reset: bool,
) -> RouterResult<()> {
    let label = endpoint.label().to_string();
    let mut session = Session::open(endpoint).await?;

    let outcome = run_in_transaction(catalog, &mut session, reset).await;
    let closed = session.close().await;

    match outcome {
        Ok(()) => {
            tracing::info!(endpoint = %label, reset, "Schema provisioned");
            closed
        }
        Err(e) => {
            if let Err(close_err) = closed {
                tracing::warn!(endpoint = %label, error = %close_err, "Session close failed after provisioning error");
            }
            Err(e)
        }
    }
}

async fn run_in_transaction(catalog: &dyn SchemaCatalog, session: &mut Session, reset: bool) -> RouterResult<()> {
    session.begin().await?;

    let work = apply_catalog(catalog, session, reset).await;

    match work {
        Ok(()) => session.commit().await,
        Err(e) => {
            if let Err(rollback_err) = session.rollback().await {
                tracing::warn!(endpoint = %session.endpoint().label(), error = %rollback_err, "Rollback failed");
            }
            Err(e)
        }
    }
}

async fn apply_catalog(catalog: &dyn SchemaCatalog, session: &mut Session, reset: bool) -> RouterResult<()> {
    if reset {
        catalog.drop_all(session).await?;
    }
    catalog.create_all(session).await
}
