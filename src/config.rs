// src/config.rs

use std::{env, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        AccessRepository, DashboardRepository, MessagingRepository, OrderRepository, RequisitionRepository,
        SourcingRepository, SupplierRepository, UserRepository, WorkspaceRepository,
    },
    services::{
        access_service::AccessService, auth::AuthService, batch_service::BatchService,
        dashboard_service::DashboardService, document_service::DocumentService, export_service::ExportService,
        messaging_service::MessagingService, order_service::OrderService, requisition_service::RequisitionService,
        sourcing_service::SourcingService, supplier_service::SupplierService, workspace_service::WorkspaceService,
    },
};

/// Variáveis de ambiente lidas na inicialização.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub fonts_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(v) => v.parse().context("DB_MAX_CONNECTIONS deve ser um número")?,
            Err(_) => 5,
        };
        let fonts_dir = env::var("FONTS_DIR").unwrap_or_else(|_| "./fonts".to_string());

        Ok(Self { database_url, jwt_secret, bind_addr, db_max_connections, fonts_dir })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: I18nStore,
    pub auth_service: AuthService,
    pub access_service: AccessService,
    pub batch_service: BatchService,
    pub workspace_service: WorkspaceService,
    pub supplier_service: SupplierService,
    pub requisition_service: RequisitionService,
    pub order_service: OrderService,
    pub document_service: DocumentService,
    pub export_service: ExportService,
    pub sourcing_service: SourcingService,
    pub messaging_service: MessagingService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, config: &Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let access_repo = AccessRepository::new(db_pool.clone());
        let workspace_repo = WorkspaceRepository::new(db_pool.clone());
        let supplier_repo = SupplierRepository::new(db_pool.clone());
        let requisition_repo = RequisitionRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let sourcing_repo = SourcingRepository::new(db_pool.clone());
        let messaging_repo = MessagingRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), config.jwt_secret.clone(), db_pool.clone());
        let access_service =
            AccessService::new(access_repo.clone(), user_repo, workspace_repo.clone(), db_pool.clone());
        let batch_service = BatchService::new(access_repo);
        let workspace_service = WorkspaceService::new(workspace_repo, db_pool.clone());
        let supplier_service = SupplierService::new(supplier_repo.clone());
        let requisition_service = RequisitionService::new(
            requisition_repo,
            supplier_repo.clone(),
            order_repo.clone(),
            db_pool.clone(),
        );
        let order_service = OrderService::new(order_repo, supplier_repo.clone(), db_pool.clone());
        let document_service = DocumentService::new(order_service.clone(), config.fonts_dir.clone());
        let export_service =
            ExportService::new(supplier_service.clone(), requisition_service.clone(), order_service.clone());
        let sourcing_service = SourcingService::new(sourcing_repo, supplier_repo, db_pool.clone());
        let messaging_service = MessagingService::new(messaging_repo, db_pool.clone());
        let dashboard_service = DashboardService::new(dashboard_repo);

        Self {
            db_pool,
            i18n_store: I18nStore::new(),
            auth_service,
            access_service,
            batch_service,
            workspace_service,
            supplier_service,
            requisition_service,
            order_service,
            document_service,
            export_service,
            sourcing_service,
            messaging_service,
            dashboard_service,
        }
    }
}
