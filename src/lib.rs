// Library root
// ------------
// This crate exposes the pieces of the `keeper` vault client. The binary
// (`main.rs`) wires them together into the interactive command loop.
//
// Module responsibilities:
// - `api`: the `Transport` seam and its blocking HTTP implementation
//   (session cookie, status handling).
// - `ui`: the `InputCollector` seam with a line-based and a terminal
//   (`dialoguer`) implementation.
// - `shell`: the command loop and the record workflows; owns the session.
// - `model`: records, drafts, kinds and the session token.
// - `config`: server address resolution (file, flag, environment).
// - `shutdown`: turns SIGINT/SIGTERM into a cancellation token.
// - `error`: the error type shared by the workflows.
//
// The shell only talks to the network and the user through the two traits,
// so it can be driven with fakes in tests.
pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod shell;
pub mod shutdown;
pub mod ui;

pub use error::{ClientError, Result};
