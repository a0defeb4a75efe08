pub mod form_reader;
pub mod management_sheet;
pub mod record_mapper;
pub mod roster_sync;
pub mod routines;
pub mod service;
pub mod sync_error;
