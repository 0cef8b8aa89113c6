//! # snowfall
//!
//! Snowflake-style 64-bit identifiers that are unique across a fleet of
//! workers, roughly time-sortable, and minted without any coordination
//! service.
//!
//! ## Layout
//!
//! ```text
//!  Bit Index:  63           63 62            22 21       17 16        12 11             0
//!              +--------------+----------------+-------------+-------------+---------------+
//!  Field:      | reserved (1) | timestamp (41) | group (5)   | worker (5)  | sequence (12) |
//!              +--------------+----------------+-------------+-------------+---------------+
//!              |<----- MSB ---------- 64 bits ----------- LSB ------------------------->|
//! ```
//!
//! The widths are configurable through [`Layout`]; [`Layout::STANDARD`] is
//! shown above.
//!
//! ## Example
//!
//! ```
//! use snowfall::{IdGenerator, LockIdGenerator};
//!
//! let generator = LockIdGenerator::new(3, 1).unwrap();
//! let a = generator.next_id().unwrap();
//! let b = generator.next_id().unwrap();
//! assert!(a < b);
//!
//! let parts = generator.layout().decode(b);
//! assert_eq!(parts.worker_id, 3);
//! assert_eq!(parts.group_id, 1);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod error;
mod generator;
mod global;
mod id;
mod identity;
mod layout;
mod rand;
mod status;
mod time;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::global::*;
pub use crate::id::*;
pub use crate::identity::*;
pub use crate::layout::*;
pub use crate::rand::*;
pub use crate::status::*;
pub use crate::time::*;
