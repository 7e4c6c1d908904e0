//! Database manager: lifecycle façade over the router.
//!
//! # Data Flow
//! ```text
//! DatabaseConfig
//!     → initialize (connect primary + replicas through the provider)
//!     → Router published as the current router
//!     → acquire / scoped (select endpoint, open session, close on scope exit)
//!     → provision_schema (every primary, drop then create)
//!     → reconfigure / reload (fresh Router swapped in, old one retired
//!       and released once idle)
//!     → teardown (release every connection handle)
//! ```
//!
//! # Design Decisions
//! - No process-global router: the manager owns it and is shared by `Arc`
//! - The current router is swapped whole; in-flight sessions keep the
//!   endpoint they were opened on
//! - Retired routers are released once no session holds their endpoints;
//!   teardown releases whatever is still retired
//! - Lifecycle checks happen under a short lock that is never held across I/O

mod provision;
mod state;

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;

use crate::config::{DatabaseConfig, RouterConfig};
use crate::error::{RouterError, RouterResult};
use crate::load_balancer::BalancingMode;
use crate::observability::metrics;
use crate::provider::{ConnectionProvider, SchemaCatalog};
use crate::routing::{Endpoint, Role, Router};
use crate::session::Session;

pub use state::ManagerState;

/// Owns the current router and the lifecycle of its connections.
pub struct Manager {
    provider: Arc<dyn ConnectionProvider>,
    catalog: Arc<dyn SchemaCatalog>,
    state: Mutex<ManagerState>,
    router: ArcSwapOption<Router>,
    retired: Mutex<Vec<Arc<Router>>>,
}

impl Manager {
    /// Create an uninitialized manager.
    pub fn new(provider: Arc<dyn ConnectionProvider>, catalog: Arc<dyn SchemaCatalog>) -> Self {
        Self {
            provider,
            catalog,
            state: Mutex::new(ManagerState::Uninitialized),
            router: ArcSwapOption::empty(),
            retired: Mutex::new(Vec::new()),
        }
    }

    pub fn state(&self) -> ManagerState {
        *self.state.lock()
    }

    /// Connect every configured target and publish the router, using the
    /// configured balancing mode.
    pub async fn initialize(&self, config: &DatabaseConfig) -> RouterResult<()> {
        self.initialize_with_mode(config, config.balancing).await
    }

    /// Connect every configured target and publish the router.
    ///
    /// Only valid while uninitialized. On a connect failure the handles built
    /// so far are released and the manager stays uninitialized.
    pub async fn initialize_with_mode(&self, config: &DatabaseConfig, mode: BalancingMode) -> RouterResult<()> {
        {
            let mut state = self.state.lock();
            match *state {
                ManagerState::Uninitialized => *state = ManagerState::Initializing,
                ManagerState::Initializing | ManagerState::Ready => return Err(RouterError::AlreadyInitialized),
                ManagerState::Disposed => return Err(RouterError::Disposed),
            }
        }

        let router = match build_router(self.provider.as_ref(), config, mode).await {
            Ok(router) => Arc::new(router),
            Err(e) => {
                let mut state = self.state.lock();
                if *state == ManagerState::Initializing {
                    *state = ManagerState::Uninitialized;
                }
                return Err(e);
            }
        };

        let published = {
            let mut state = self.state.lock();
            if *state == ManagerState::Initializing {
                self.publish(router.clone());
                *state = ManagerState::Ready;
                true
            } else {
                false
            }
        };

        if !published {
            // torn down while connecting
            release_endpoints(router.endpoints()).await?;
            return Err(RouterError::Disposed);
        }

        tracing::info!(
            mode = %mode,
            primaries = router.primary_endpoints().len(),
            replicas = router.replica_endpoints().len(),
            "Database manager initialized"
        );
        Ok(())
    }

    /// Initialize and provision the schema in one step.
    ///
    /// If provisioning fails the manager is torn down before the error is
    /// returned, so no connection handle outlives a failed start.
    pub async fn start(&self, config: &DatabaseConfig, reset: bool) -> RouterResult<()> {
        self.initialize(config).await?;

        if let Err(e) = self.provision_schema(reset).await {
            tracing::error!(error = %e, "Schema provisioning failed, tearing down");
            if let Err(teardown_err) = self.teardown().await {
                tracing::warn!(error = %teardown_err, "Teardown failed after provisioning error");
            }
            return Err(e);
        }
        Ok(())
    }

    /// The current router.
    pub fn router(&self) -> RouterResult<Arc<Router>> {
        self.current("router")
    }

    /// Open a read-intent session (routed to a replica).
    ///
    /// The session closes when dropped; call [`Session::close`] to observe
    /// close errors.
    pub async fn acquire_session(&self) -> RouterResult<Session> {
        self.acquire(false).await
    }

    /// Open a session for the given intent.
    pub async fn acquire(&self, for_write: bool) -> RouterResult<Session> {
        let router = self.current("acquire_session")?;
        router.open_session(for_write).await
    }

    /// Run `work` with a session, closing it afterwards on every path.
    ///
    /// An error from `work` wins over a close error. If the returned future is
    /// dropped mid-work the session still closes, through its `Drop`.
    ///
    /// ```ignore
    /// let rows = manager
    ///     .scoped(false, |session| Box::pin(async move { session.execute("SELECT 1").await }))
    ///     .await?;
    /// ```
    pub async fn scoped<T, F>(&self, for_write: bool, work: F) -> RouterResult<T>
    where
        F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, RouterResult<T>>,
    {
        let mut session = self.acquire(for_write).await?;
        let outcome = work(&mut session).await;
        let closed = session.close().await;

        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                tracing::warn!(session = %session.id(), error = %close_err, "Session close failed after work error");
                Err(e)
            }
        }
    }

    /// Create the known schema on every primary, dropping it first when `reset`.
    ///
    /// Replicas are never touched. Primaries are provisioned one after another.
    pub async fn provision_schema(&self, reset: bool) -> RouterResult<()> {
        let router = self.current("provision_schema")?;
        provision::provision_router(self.catalog.as_ref(), &router, reset).await
    }

    /// Build a router from a new configuration and swap it in.
    ///
    /// Sessions already open keep their endpoints; only later selections see
    /// the new topology.
    pub async fn reconfigure(&self, config: &DatabaseConfig) -> RouterResult<()> {
        self.current("reconfigure")?;
        let router = Arc::new(build_router(self.provider.as_ref(), config, config.balancing).await?);

        let swapped = {
            let state = self.state.lock();
            if *state == ManagerState::Ready {
                if let Some(previous) = self.publish(router.clone()) {
                    self.retired.lock().push(previous);
                }
                true
            } else {
                false
            }
        };

        if !swapped {
            release_endpoints(router.endpoints()).await?;
            return Err(RouterError::Disposed);
        }

        metrics::record_reconfiguration();
        tracing::info!(
            mode = %router.mode(),
            primaries = router.primary_endpoints().len(),
            replicas = router.replica_endpoints().len(),
            "Router reconfigured"
        );

        self.release_idle_routers().await;
        Ok(())
    }

    /// Apply a reloaded configuration on top of `current`.
    ///
    /// Returns `Ok(true)` when the router was rebuilt and `Ok(false)` when the
    /// database section is unchanged. `current` only advances once the new
    /// topology is in effect, so a rejected reload is retried the next time
    /// the same file is loaded.
    pub async fn reload(&self, current: &mut RouterConfig, next: RouterConfig) -> RouterResult<bool> {
        if next.database == current.database {
            tracing::debug!("Database section unchanged, router kept");
            *current = next;
            return Ok(false);
        }

        self.reconfigure(&next.database).await?;
        *current = next;
        Ok(true)
    }

    /// Release retired routers that no session or caller still holds.
    ///
    /// Returns how many routers were released. Busy routers stay retired
    /// until a later call or teardown.
    pub async fn release_idle_routers(&self) -> usize {
        let idle: Vec<Arc<Router>> = {
            let mut retired = self.retired.lock();
            let (idle, busy): (Vec<_>, Vec<_>) = retired.drain(..).partition(is_idle);
            *retired = busy;
            idle
        };

        for router in &idle {
            if let Err(e) = release_endpoints(router.endpoints()).await {
                tracing::warn!(error = %e, "Failed to release retired router");
            }
        }
        if !idle.is_empty() {
            tracing::debug!(released = idle.len(), "Retired routers released");
        }
        idle.len()
    }

    /// Release every connection handle and dispose the manager.
    ///
    /// Valid from any state; a second call is a no-op. Every handle is
    /// released even if some fail; the first failure is returned.
    pub async fn teardown(&self) -> RouterResult<()> {
        let routers = {
            let mut state = self.state.lock();
            if *state == ManagerState::Disposed {
                return Ok(());
            }
            *state = ManagerState::Disposed;

            let mut routers: Vec<Arc<Router>> = self.retired.lock().drain(..).collect();
            if let Some(current) = self.router.swap(None) {
                routers.push(current);
            }
            routers
        };

        let mut first_error = None;
        for router in &routers {
            if let Err(e) = release_endpoints(router.endpoints()).await {
                first_error.get_or_insert(e);
            }
        }

        metrics::set_endpoint_count(Role::Primary, 0);
        metrics::set_endpoint_count(Role::Replica, 0);
        tracing::info!(routers = routers.len(), "Database manager disposed");

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn current(&self, operation: &'static str) -> RouterResult<Arc<Router>> {
        match *self.state.lock() {
            ManagerState::Ready => {}
            ManagerState::Disposed => return Err(RouterError::Disposed),
            ManagerState::Uninitialized | ManagerState::Initializing => {
                return Err(RouterError::NotInitialized { operation })
            }
        }
        self.router.load_full().ok_or(RouterError::NotInitialized { operation })
    }

    fn publish(&self, router: Arc<Router>) -> Option<Arc<Router>> {
        metrics::set_endpoint_count(Role::Primary, router.primary_endpoints().len());
        metrics::set_endpoint_count(Role::Replica, router.replica_endpoints().len());
        self.router.swap(Some(router))
    }
}

/// Connect the primary and every replica, in configuration order.
async fn build_router(
    provider: &dyn ConnectionProvider,
    config: &DatabaseConfig,
    mode: BalancingMode,
) -> RouterResult<Router> {
    let mut router = Router::new(mode);
    let targets = std::iter::once((Role::Primary, &config.primary))
        .chain(config.replicas.iter().map(|target| (Role::Replica, target)));

    for (role, target) in targets {
        match provider.connect(target).await {
            Ok(connection) => router.add_endpoint(Endpoint::new(role, target.redacted_url(), connection)),
            Err(e) => {
                tracing::error!(role = %role, endpoint = %target.redacted_url(), error = %e, "Failed to connect endpoint");
                if let Err(release_err) = release_endpoints(router.endpoints()).await {
                    tracing::warn!(error = %release_err, "Failed to release partially built router");
                }
                return Err(e);
            }
        }
    }

    Ok(router)
}

/// A retired router is idle once the retired list holds the only reference
/// to it and to each of its endpoints. New sessions need a router reference,
/// so an idle router stays idle.
fn is_idle(router: &Arc<Router>) -> bool {
    Arc::strong_count(router) == 1 && router.endpoints().iter().all(|endpoint| Arc::strong_count(endpoint) == 1)
}

/// Release each endpoint's connection, continuing past failures.
async fn release_endpoints(endpoints: &[Arc<Endpoint>]) -> RouterResult<()> {
    let mut first_error = None;
    for endpoint in endpoints {
        match endpoint.connection().release().await {
            Ok(()) => tracing::debug!(endpoint = %endpoint, "Connection released"),
            Err(e) => {
                tracing::error!(endpoint = %endpoint, error = %e, "Failed to release connection");
                first_error.get_or_insert(e);
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
