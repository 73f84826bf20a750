//! qualimatch-report: CSV export for offline grading.

pub mod csv;

pub use csv::{
    build_csv, build_file_name, practice_csv, practice_file_name, quiz_csv, quiz_file_name,
    write_csv,
};
