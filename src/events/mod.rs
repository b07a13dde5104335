//! # Events Module
//!
//! Progress and diagnostics reporting for the pipeline.
//!
//! Every stage takes an [`EventSender`] instead of writing to a global
//! logger, so the CLI can drive progress bars and tests can assert on what a
//! stage reported.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Hash(HashEvent::Progress(p)) = event {
//!             println!("{}/{}", p.completed, p.total);
//!         }
//!     }
//! });
//!
//! dataset.hash(false, false)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
