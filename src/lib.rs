// Library root
// -----------
// Uploads files to a Pixeldrain-style host and keeps them alive by visiting
// them before the host's inactivity window runs out. The binary
// (`main.rs`) only parses arguments and dispatches into `ui`.
//
// Module responsibilities:
// - `config`: environment-sourced settings, built once at startup.
// - `auth`: Basic credentials attached to every request.
// - `api`: blocking HTTP client (upload, keepalive visit, view links).
// - `timestamp`: parsing/formatting of stored and received instants.
// - `store`: the JSON state file mapping file id -> last visit.
// - `sweeper`: one keepalive pass over the state file.
// - `ui`: console flows for `--upload` and `--alive`.
pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod store;
pub mod sweeper;
pub mod timestamp;
pub mod ui;
