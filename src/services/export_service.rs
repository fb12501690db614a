// src/services/export_service.rs

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::{
        cnpj,
        csv_export::{to_csv, CsvRow},
        error::AppError,
    },
    models::{order::PurchaseOrder, requisition::Requisition, supplier::Supplier},
    services::{order_service::OrderService, requisition_service::RequisitionService, supplier_service::SupplierService},
};
use crate::models::supplier::SupplierFilter;

/// As planilhas que a tela de relatórios oferece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Suppliers,
    Requisitions,
    Orders,
}

impl ExportKind {
    /// Aceita `suppliers.csv` (ou só `suppliers`).
    pub fn from_file_name(name: &str) -> Result<Self, AppError> {
        match name.strip_suffix(".csv").unwrap_or(name) {
            "suppliers" => Ok(ExportKind::Suppliers),
            "requisitions" => Ok(ExportKind::Requisitions),
            "orders" => Ok(ExportKind::Orders),
            _ => Err(AppError::BadRequest("unknown_export")),
        }
    }

    /// Nome da entidade usado no arquivo baixado.
    pub fn entity(&self) -> &'static str {
        match self {
            ExportKind::Suppliers => "fornecedores",
            ExportKind::Requisitions => "requisicoes",
            ExportKind::Orders => "pedidos",
        }
    }

    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("{}_{}.csv", self.entity(), date.format("%Y-%m-%d"))
    }
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl CsvRow for Supplier {
    fn headers() -> &'static [&'static str] {
        &["Razão Social", "Nome Fantasia", "CNPJ", "E-mail", "Telefone", "Categoria", "Status", "Nota Média", "Cadastrado em"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.razao_social.clone(),
            opt(&self.nome_fantasia),
            cnpj::format(&self.cnpj),
            opt(&self.email),
            opt(&self.telefone),
            opt(&self.categoria),
            self.status.as_str().to_string(),
            self.nota_media.map(|n| n.to_string()).unwrap_or_default(),
            self.created_at.format("%Y-%m-%d").to_string(),
        ]
    }
}

impl CsvRow for Requisition {
    fn headers() -> &'static [&'static str] {
        &["Número", "Justificativa", "Centro de Custo", "Prioridade", "Status", "Necessário em", "Total Estimado", "Criada em"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.numero.to_string(),
            self.justificativa.clone(),
            opt(&self.centro_custo),
            self.prioridade.as_str().to_string(),
            self.status.as_str().to_string(),
            self.necessario_em.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            format!("{:.2}", self.total_estimado),
            self.created_at.format("%Y-%m-%d").to_string(),
        ]
    }
}

/// Pedido com a razão social do fornecedor já resolvida.
pub struct OrderRow<'a> {
    pub order: &'a PurchaseOrder,
    pub fornecedor: &'a str,
}

impl CsvRow for OrderRow<'_> {
    fn headers() -> &'static [&'static str] {
        &["Número", "Fornecedor", "Status", "Total", "Previsão de Entrega", "Condição de Pagamento", "Emitido em", "Recebido em"]
    }

    fn fields(&self) -> Vec<String> {
        let date = |d: Option<chrono::DateTime<chrono::Utc>>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        let order = self.order;
        vec![
            order.numero.to_string(),
            self.fornecedor.to_string(),
            order.status.as_str().to_string(),
            format!("{:.2}", order.total),
            order.previsao_entrega.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            opt(&order.condicao_pagamento),
            date(order.emitido_em),
            date(order.recebido_em),
        ]
    }
}

/// Junta cada pedido à razão social do seu fornecedor.
pub fn order_rows<'a>(orders: &'a [PurchaseOrder], suppliers: &'a [Supplier]) -> Vec<OrderRow<'a>> {
    let names: HashMap<Uuid, &str> = suppliers.iter().map(|s| (s.id, s.razao_social.as_str())).collect();
    orders
        .iter()
        .map(|order| OrderRow {
            order,
            fornecedor: names.get(&order.fornecedor_id).copied().unwrap_or_default(),
        })
        .collect()
}

#[derive(Clone)]
pub struct ExportService {
    supplier_service: SupplierService,
    requisition_service: RequisitionService,
    order_service: OrderService,
}

impl ExportService {
    pub fn new(
        supplier_service: SupplierService,
        requisition_service: RequisitionService,
        order_service: OrderService,
    ) -> Self {
        Self { supplier_service, requisition_service, order_service }
    }

    pub async fn export(&self, kind: ExportKind) -> Result<String, AppError> {
        let csv = match kind {
            ExportKind::Suppliers => {
                let filter = SupplierFilter { q: None, status: None };
                to_csv(&self.supplier_service.list(&filter).await?)
            }
            ExportKind::Requisitions => to_csv(&self.requisition_service.list_all().await?),
            ExportKind::Orders => {
                let orders = self.order_service.list_all().await?;
                let filter = SupplierFilter { q: None, status: None };
                let suppliers = self.supplier_service.list(&filter).await?;
                to_csv(&order_rows(&orders, &suppliers))
            }
        };
        Ok(csv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::supplier::SupplierStatus;
    use crate::models::order::OrderStatus;
    use chrono::Utc;

    fn supplier(razao: &str) -> Supplier {
        Supplier {
            id: Uuid::new_v4(),
            razao_social: razao.into(),
            nome_fantasia: None,
            cnpj: "11222333000181".into(),
            email: Some("contato@papelaria.com.br".into()),
            telefone: None,
            categoria: Some("escritorio".into()),
            endereco: None,
            observacoes: None,
            status: SupplierStatus::Qualificado,
            nota_media: Some("4.50".parse().unwrap()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn order(numero: i64, fornecedor_id: Uuid) -> PurchaseOrder {
        PurchaseOrder {
            id: Uuid::new_v4(),
            numero,
            fornecedor_id,
            requisicao_id: None,
            comprador_id: Uuid::new_v4(),
            status: OrderStatus::Emitido,
            total: "1500.5".parse().unwrap(),
            previsao_entrega: NaiveDate::from_ymd_opt(2025, 4, 1),
            condicao_pagamento: Some("30/60 dias".into()),
            observacoes: None,
            emitido_em: None,
            recebido_em: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn order_rows_show_supplier_name_instead_of_id() {
        let papelaria = supplier("Papelaria Central Ltda");
        let orders = [order(42, papelaria.id), order(43, Uuid::new_v4())];

        let csv = to_csv(&order_rows(&orders, std::slice::from_ref(&papelaria)));
        let lines: Vec<&str> = csv.trim_start_matches('\u{FEFF}').split("\r\n").collect();

        assert!(lines[0].starts_with("Número,Fornecedor,Status"));
        assert_eq!(lines[1], "42,Papelaria Central Ltda,emitido,1500.50,2025-04-01,30/60 dias,,");
        assert!(lines[2].starts_with("43,,emitido,"));
        assert!(!csv.contains(&papelaria.id.to_string()));
    }

    #[test]
    fn file_names_map_to_exports() {
        assert_eq!(ExportKind::from_file_name("suppliers.csv").unwrap(), ExportKind::Suppliers);
        assert_eq!(ExportKind::from_file_name("orders").unwrap(), ExportKind::Orders);
        assert!(matches!(
            ExportKind::from_file_name("salarios.csv"),
            Err(AppError::BadRequest("unknown_export"))
        ));
    }

    #[test]
    fn download_name_uses_entity_and_iso_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(ExportKind::Requisitions.file_name(date), "requisicoes_2025-03-07.csv");
    }

    #[test]
    fn supplier_rows_are_formatted_and_escaped() {
        let csv = to_csv(&[supplier("Papelaria Central, Ltda")]);
        let mut lines = csv.trim_start_matches('\u{FEFF}').split("\r\n");

        assert!(lines.next().unwrap().starts_with("Razão Social,Nome Fantasia,CNPJ"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("\"Papelaria Central, Ltda\",,11.222.333/0001-81,"));
        assert!(row.contains(",qualificado,4.50,"));
    }
}
