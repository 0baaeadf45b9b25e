//! Background actors
//!
//! Each actor runs as an independent async task and is driven through a
//! cloneable handle holding the sending side of its command channel.
//!
//! ## Actor Types
//!
//! - **AlertActor**: Delivers alerts for failing outcomes off the scheduling path
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: Each actor has a bounded mpsc command channel
//! 2. **Request/Response**: oneshot channels where the caller waits for completion

pub mod alert;
pub mod messages;
