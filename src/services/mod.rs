pub mod cleanup;
pub mod ingest;
