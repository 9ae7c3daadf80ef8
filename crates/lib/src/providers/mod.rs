//! Storage backends.

pub mod db;
