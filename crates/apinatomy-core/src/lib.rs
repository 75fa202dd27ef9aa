//! ApiNATOMY Core Types and Definitions
//!
//! This crate provides the foundational types for ApiNATOMY connectivity
//! models. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Basic geometric value types ([`geometry`] module)
//! - **Model**: Resource definitions for lyphs, nodes, links, chains and groups ([`model`] module)
//! - **Schema**: The closed class table with field and relationship specifications ([`schema`] module)

pub mod color;
pub mod geometry;
pub mod identifier;
pub mod model;
pub mod schema;
