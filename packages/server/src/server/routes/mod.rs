// HTTP routes
pub mod events;
pub mod health;
pub mod rpc;

pub use events::*;
pub use health::*;
pub use rpc::*;
