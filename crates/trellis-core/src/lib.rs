//! Trellis Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Trellis staff
//! diagram crates. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Colors**: Color handling with CSS and hex color support ([`color::Color`])
//! - **Geometry**: Basic geometric types and card sides ([`geometry`] module)
//! - **Draw**: Line styles and stroke definitions ([`draw`] module)

pub mod color;
pub mod draw;
pub mod geometry;
pub mod identifier;
