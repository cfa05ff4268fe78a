//! Concrete adapter implementations for ports.

pub mod file_config_adapter;
pub mod price_csv;
pub mod http_data_adapter;
pub mod csv_data_adapter;
pub mod csv_results_adapter;
pub mod html_report_adapter;
