//! Generator for song storybooks - turns lyrics into illustrated books
//!
//! Asks a text model to write a short picture-book story from a song's
//! lyrics, paints one watercolor illustration per page, uploads the images
//! to object storage, and returns the assembled book.

pub mod ai;
pub mod app;
pub mod cdn;
pub mod error;
pub mod illustrator;
pub mod models;
pub mod pipeline;
pub mod prompts;

pub use error::{Error, Result};
