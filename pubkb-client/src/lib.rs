#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

mod client;
mod decode;
mod error;
mod streaming;

pub use client::KbClient;
pub use streaming::{render_stream, render_stream_with_cancel, text_chunks};
