//! Core library for the aideon-leads command line application.
//!
//! The library turns loosely structured contact exports into canonical
//! records and loads them into a relational table. Responsibilities are kept
//! narrow and composable: header aliases live in [`aideon::leads::aliases`],
//! column matching in [`aideon::leads::resolve`], the field normalisers under
//! [`aideon::leads::normalize`], row cleaning in [`aideon::leads::clean`],
//! file adapters under [`aideon::leads::io`], sinks under
//! [`aideon::leads::store`], and the run orchestration in
//! [`aideon::leads::import`].

pub mod aideon;

pub use aideon::leads::{
    IngestError, Result, aliases, clean, config, error, import, io, logging, model, normalize,
    resolve, store,
};
