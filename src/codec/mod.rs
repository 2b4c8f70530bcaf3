//! Flat-record codecs: CSV and JSON.

pub mod csv;
pub mod json;
