// src/common/db_utils.rs

use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::AuthenticatedUser;

// ---
// Helper de auditoria: identifica o usuário para o banco
// ---
/// Adquire uma conexão da pool e define `app.user_id`, usado pelos
/// triggers que preenchem `atualizado_por` nas tabelas de negócio.
///
/// A variável é de sessão: toda escrita passa por aqui e sobrescreve o valor
/// deixado pelo uso anterior da conexão.
pub(crate) async fn get_user_connection(
    app_state: &AppState,
    user: &AuthenticatedUser,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, AppError> {
    let mut conn = app_state.db_pool.acquire().await?;

    sqlx::query("SELECT set_config('app.user_id', $1, false)")
        .bind(user.0.id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(conn)
}
