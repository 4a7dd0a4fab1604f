// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-tests
//!
//! Integration tests for the Warden authentication service.
//!
//! See the `tests/` directory for the test suites and [`common`] for shared
//! fixtures and mocks.

pub mod common;
