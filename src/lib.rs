//! Reversi arbiter: rule engine and turn/session controller for a game
//! played by two remote actors through tool calls.
//!
//! - [`rules`] and [`board`]: pure move generation, flipping and terminal
//!   detection over immutable boards.
//! - [`game`]: the [`Controller`] that checks turns, passes and sequence
//!   numbers and produces the next snapshot.
//! - [`host`] and [`session`]: session storage and the tool-facing calls.
//! - [`wasm`]: bindings for JavaScript tool servers.

pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod host;
pub mod rules;
pub mod session;
pub mod types;
pub mod wasm;

pub use board::Board;
pub use config::{ControllerConfig, TerminalPolicy};
pub use error::{ConfigError, GameError, ParseError};
pub use game::{Controller, Outcome, Step};
pub use host::{Actor, GameHost, ToolReply};
pub use session::{MemoryStore, Session, SessionId, SessionStore};
pub use types::{Color, ExportState, GameOutcome, Move, PlayResult, Position};
