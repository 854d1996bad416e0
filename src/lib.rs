//! Wardrobe Studio
//!
//! Garment lifecycle and outfit styling pipeline: ingest garment photos,
//! categorize them through a FIFO decision queue, compose a styling session
//! and request avatar or flat-lay renders from a generative image service.

pub mod config;
pub mod error;
pub mod image;
pub mod model;
pub mod service;
pub mod session;
pub mod state;
pub mod studio;
pub mod wardrobe;

pub use error::{AppError, Result};
pub use session::{Session, SessionEvent};
