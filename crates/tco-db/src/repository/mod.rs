//! # Repository Module
//!
//! Storage repositories for Fleet TCO.
//!
//! ```text
//!   CLI command
//!       │  db.history().push(saved)
//!       ▼
//!   HistoryRepository ──► KvRepository ──► kv_store (SQLite)
//!                              │
//!                              └──► StorageEvent broadcast
//! ```
//!
//! ## Available Repositories
//!
//! - [`kv::KvRepository`] - JSON documents under fixed keys
//! - [`history::HistoryRepository`] - Bounded saved calculation history

pub mod history;
pub mod kv;
