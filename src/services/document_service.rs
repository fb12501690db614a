// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{cnpj, error::AppError},
    models::order::PurchaseOrderDetail,
    services::order_service::OrderService,
};

const FONT_FAMILY: &str = "Roboto";

/// Número do pedido como aparece no documento e no QR code.
pub fn order_label(numero: i64) -> String {
    format!("PC-{numero:06}")
}

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

#[derive(Clone)]
pub struct DocumentService {
    order_service: OrderService,
    fonts_dir: String,
}

impl DocumentService {
    pub fn new(order_service: OrderService, fonts_dir: String) -> Self {
        Self { order_service, fonts_dir }
    }

    pub async fn generate_order_pdf<'e, E>(&self, executor: E, order_id: Uuid) -> Result<(i64, Vec<u8>), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // 1. Busca os dados
        let detail = self.order_service.get_detail(executor, order_id).await?;

        // 2. Monta o PDF
        let bytes = self.render(&detail)?;
        Ok((detail.header.numero, bytes))
    }

    fn render(&self, detail: &PurchaseOrderDetail) -> Result<Vec<u8>, AppError> {
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, FONT_FAMILY, None)
            .map_err(|_| AppError::FontNotFound(format!("Fonte {FONT_FAMILY} não encontrada em {}", self.fonts_dir)))?;

        let header = &detail.header;
        let label = order_label(header.numero);

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Pedido de Compra {label}"));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new(format!("PEDIDO DE COMPRA {label}"))
                .styled(style::Style::new().bold().with_font_size(16)),
        );
        doc.push(elements::Paragraph::new(format!("Emissão: {}", header.created_at.format("%d/%m/%Y"))));
        doc.push(elements::Paragraph::new(format!("Situação: {}", header.status.as_str())));
        if let Some(data) = header.previsao_entrega {
            doc.push(elements::Paragraph::new(format!("Previsão de entrega: {}", data.format("%d/%m/%Y"))));
        }
        if let Some(condicao) = &header.condicao_pagamento {
            doc.push(elements::Paragraph::new(format!("Condição de pagamento: {condicao}")));
        }

        doc.push(elements::Break::new(1.5));

        // --- FORNECEDOR ---
        doc.push(elements::Paragraph::new("FORNECEDOR").styled(style::Style::new().bold().with_font_size(12)));
        doc.push(elements::Paragraph::new(detail.fornecedor_nome.clone()));
        doc.push(elements::Paragraph::new(format!("CNPJ: {}", cnpj::format(&detail.fornecedor_cnpj))));

        doc.push(elements::Break::new(2));

        // --- TABELA DE ITENS ---
        // Pesos: Descrição (4), Qtd (1), Un (1), Unitário (2), Subtotal (2)
        let mut table = elements::TableLayout::new(vec![4, 1, 1, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Descrição").styled(bold))
            .element(elements::Paragraph::new("Qtd").styled(bold))
            .element(elements::Paragraph::new("Un").styled(bold))
            .element(elements::Paragraph::new("Unitário").styled(bold))
            .element(elements::Paragraph::new("Subtotal").styled(bold))
            .push()
            .map_err(pdf_error)?;

        for item in &detail.itens {
            table
                .row()
                .element(elements::Paragraph::new(item.descricao.clone()))
                .element(elements::Paragraph::new(format!("{:.2}", item.quantidade)))
                .element(elements::Paragraph::new(item.unidade.clone()))
                .element(elements::Paragraph::new(format!("R$ {:.2}", item.preco_unitario)))
                .element(elements::Paragraph::new(format!("R$ {:.2}", item.subtotal())))
                .push()
                .map_err(pdf_error)?;
        }

        doc.push(table);
        doc.push(elements::Break::new(2));

        // --- TOTAL ---
        let mut total = elements::Paragraph::new(format!("TOTAL: R$ {:.2}", header.total));
        total.set_alignment(genpdf::Alignment::Right);
        doc.push(total.styled(style::Style::new().bold().with_font_size(12)));

        if let Some(obs) = &header.observacoes {
            doc.push(elements::Break::new(1));
            doc.push(elements::Paragraph::new(format!("Observações: {obs}")).styled(style::Style::new().italic()));
        }

        doc.push(elements::Break::new(2));

        // --- QR CODE com o número do pedido ---
        let code = QrCode::new(label.as_bytes()).map_err(pdf_error)?;
        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);
        let qr = elements::Image::from_dynamic_image(dynamic_image)
            .map_err(pdf_error)?
            .with_scale(genpdf::Scale::new(0.5, 0.5));
        doc.push(qr);

        // 3. Renderiza em memória
        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_error)?;

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_pads_the_order_number() {
        assert_eq!(order_label(42), "PC-000042");
        assert_eq!(order_label(1234567), "PC-1234567");
    }

    #[test]
    fn order_label_fits_in_a_qr_code() {
        let code = QrCode::new(order_label(1024).as_bytes()).unwrap();
        let image = code.render::<Luma<u8>>().build();
        assert!(image.width() > 0);
    }
}
