//! # Events Module
//!
//! Progress reporting for pipeline runs.
//!
//! ## Design
//! The pipeline emits events through channels, so a CLI spinner (or any
//! other front end) can follow stage progress without the core knowing
//! about it.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Pipeline(PipelineEvent::StageCompleted { stage, items_out }) = event {
//!             println!("{stage} produced {items_out} items");
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(items, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
