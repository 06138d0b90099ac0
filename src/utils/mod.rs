// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Utility modules
//!
//! Common utilities for the deploysynth CLI.

pub mod colors;

pub use colors::*;
