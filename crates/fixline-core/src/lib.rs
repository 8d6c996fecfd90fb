//! FIX decoder and session controller.
//!
//! This crate holds the two stateful cores of the workspace, both built on
//! the `fixline-proto` frame codec:
//!
//! - The [`decoder`]: consumes raw FIX frames, resolves tag metadata from
//!   `fixline-dict` dictionaries, applies per-version typed decoding, and
//!   runs structural validation over members, components, and repeating
//!   groups. Decoding never fails; damage is reported, not thrown.
//!
//! - The [`session`] controller: a pure state machine for the FIX session
//!   layer. It reframes a byte stream, drives the logon/logout handshake,
//!   enforces monotonic sequence-number discipline, and answers every
//!   inbound frame with an [`session::Action`] describing disposition,
//!   outbound frames, and emitted events. It performs no I/O.
//!
//! # Architecture
//!
//! Both cores are single-owner objects; nothing here suspends or spawns.
//! Side effects go through narrow seams: time through the [`clock::Clock`]
//! trait, the network through the [`transport::Transport`] trait that only
//! driver code touches. This keeps the protocol logic deterministic and
//! directly testable.
//!
//! ```text
//!      ┌─────────────────────────────┐
//!      │ fixline-core                │
//!      │ - Decoder (typed views)     │
//!      │ - Controller (session FSM)  │
//!      └─────────────────────────────┘
//!          ↓                   ↓
//! ┌────────────────┐  ┌────────────────┐
//! │ tests          │  │ driver         │
//! │ - FixedClock   │  │ - SystemClock  │
//! │ - byte fixtures│  │ - real sockets │
//! └────────────────┘  └────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`decoder`]: dictionary-driven message decoding and validation
//! - [`session`]: session controller state machine
//! - [`clock`]: replaceable UTC time source
//! - [`generator`]: MsgType-keyed domain-object factory registry
//! - [`transport`]: transport collaborator seam (interface only)

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod clock;
pub mod decoder;
pub mod generator;
pub mod session;
pub mod transport;

pub use clock::{Clock, FixedClock, SystemClock};
pub use decoder::{
    DecodedField, DecodedMessage, DecodedObject, Decoder, DecoderKey, Lookup, Value,
    VersionResolver,
};
pub use session::{Action, Controller, Disposition, Role, SessionConfig, SessionEvent, SessionState};
