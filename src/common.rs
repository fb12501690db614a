pub mod cnpj;
pub mod csv_export;
pub mod db_utils;
pub mod error;
pub mod i18n;
