// Library root
// -----------
// This crate exposes the library surface of the `envios` CLI. The binary
// (`main.rs`) only parses arguments and delegates to `cli`.
//
// Module responsibilities:
// - `api`: single-attempt, authorized HTTP calls to the platform.
// - `geocode`: free-text address -> address line and coordinates.
// - `decode`: typed views over the platform's JSON responses.
// - `requests`: the `requests` operations, chaining calls and decodes.
// - `vocab`: vehicle categories, status codes and party specs.
// - `session` / `config`: per-invocation context and settings.
// - `cli`: argument definitions, dispatch and JSON rendering.
pub mod api;
pub mod cli;
pub mod config;
pub mod decode;
pub mod error;
pub mod geocode;
pub mod requests;
pub mod session;
pub mod vocab;
