// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`auth`]: Authentication endpoints
//! - [`health`]: Health check endpoints

mod auth;
mod health;

pub use auth::*;
pub use health::*;
