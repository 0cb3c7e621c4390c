// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`invocation`] describes *what* to run: program, arguments, working
//!   directory and environment overrides.
//! - [`supervisor`] owns one spawned build process and its two pipe readers,
//!   reporting output and completion to a [`ProcessListener`].
//! - [`decode`] turns raw pipe reads into text, carrying split UTF-8
//!   sequences and `\r\n` pairs across reads.

pub mod decode;
pub mod invocation;
pub mod supervisor;

pub use decode::{ChunkDecoder, DECODE_ERROR_SENTINEL};
pub use invocation::Invocation;
pub use supervisor::{ProcessListener, ProcessSupervisor, READ_CHUNK_SIZE, SupervisorState};
