// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod form;
pub mod local;
pub mod models;
pub mod policy;
pub mod query;
pub mod reconcile;
pub mod remote;
pub mod source;
pub mod utils;
pub mod window;
