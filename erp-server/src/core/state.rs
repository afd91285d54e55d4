//! Server State
//!
//! Shared handle passed to every request handler and background task.

use std::path::PathBuf;
use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::notifications;
use crate::services::EmailService;

/// Shared server state
///
/// Holds the configuration, the embedded database handle and the
/// long-lived services. Cloning is cheap: the database handle and the
/// JWT service are shared references.
#[derive(Clone, Debug)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Embedded database (SurrealDB on RocksDB)
    pub db: Surreal<Db>,
    /// JWT signing and validation
    pub jwt_service: Arc<JwtService>,
    /// Outbound email delivery
    pub email: EmailService,
    /// Cancellation signal for background tasks
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// Create server state from already-built parts
    ///
    /// Usually [`ServerState::initialize()`] is used instead.
    pub fn new(
        config: Config,
        db: Surreal<Db>,
        jwt_service: Arc<JwtService>,
        email: EmailService,
    ) -> Self {
        Self {
            config,
            db,
            jwt_service,
            email,
            shutdown: CancellationToken::new(),
        }
    }

    /// Initialize the server state
    ///
    /// Order:
    /// 1. Work directory layout
    /// 2. Embedded database (work_dir/db/erp.db)
    /// 3. JWT and email services
    ///
    /// # Panics
    ///
    /// Panics when the work directory cannot be created or the database
    /// fails to open. Both are unrecoverable at startup.
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("erp.db");
        let db_service = DbService::new(&db_path)
            .await
            .expect("Failed to initialize database");

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let email = EmailService::new(config.email_gateway_url.clone());

        Self::new(config.clone(), db_service.db, jwt_service, email)
    }

    /// Start background tasks
    ///
    /// Must be called before `Server::run()`. Spawns the invoice due-date
    /// scanner that keeps `invoice_notification` rows current.
    pub async fn start_background_tasks(&self) {
        notifications::spawn_scheduler(self.clone());
    }

    /// Database handle
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// Work directory
    pub fn work_dir(&self) -> PathBuf {
        self.config.work_dir.clone()
    }

    /// JWT service
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Signal background tasks to stop
    pub fn shutdown_background_tasks(&self) {
        self.shutdown.cancel();
    }
}
