// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (session auth, page guards, security headers).

pub mod auth;
pub mod pages;
pub mod security;

pub use auth::require_auth;
pub use pages::guard_pages;
