// Interval Server
//
// HTTP transport for suspendable actions: RPC endpoints to invoke
// transactions and answer their IO requests, plus an SSE channel that
// pushes every state snapshot.

pub mod config;
pub mod demo;
pub mod server;

pub use config::*;
