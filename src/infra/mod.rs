// Adapters behind the application ports

pub mod csv_table_adapter;

pub use csv_table_adapter::CsvTablesAdapter;
