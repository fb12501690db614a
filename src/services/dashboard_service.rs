// src/services/dashboard_service.rs

use crate::{common::error::AppError, db::DashboardRepository, models::dashboard::DashboardSummary};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn get_summary(&self) -> Result<DashboardSummary, AppError> {
        let (fornecedores_por_status, requisicoes_pendentes, (pedidos_em_aberto, valor_pedidos_em_aberto), eventos_abertos) =
            tokio::try_join!(
                self.repo.suppliers_by_status(),
                self.repo.pending_requisitions(),
                self.repo.open_orders(),
                self.repo.open_sourcing_events(),
            )?;

        Ok(DashboardSummary {
            fornecedores_por_status,
            requisicoes_pendentes,
            pedidos_em_aberto,
            valor_pedidos_em_aberto,
            eventos_abertos,
        })
    }
}
