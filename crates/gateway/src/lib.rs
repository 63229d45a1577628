// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP gateway for the crossbook matching core
//!
//! A thin actix-web shell: it decodes submissions, hands them to
//! [`crossbook_matching::OrderService`] and renders the book. All matching
//! decisions live in the core.

pub mod config;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod server;
