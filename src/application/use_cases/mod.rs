pub mod header_normalizer;
pub mod import_service;
pub mod ingestion_writer;
pub mod mapping_resolver;
pub mod record_validator;
pub mod template_builder;
