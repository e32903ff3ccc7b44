pub mod error_handling;
pub mod migrate_end_to_end;
