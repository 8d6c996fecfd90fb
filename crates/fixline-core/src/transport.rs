//! Transport collaborator seam.
//!
//! The session controller is transport-agnostic: it accepts byte strings in
//! [`crate::session::Controller::consume`] and emits byte strings in
//! [`crate::session::Action::outbound`]. Actual sockets live behind this
//! trait, and only driver code touches them - the core never calls a
//! [`Transport`] itself.
//!
//! A typical driver loop:
//!
//! ```text
//! loop {
//!     let n = transport.receive_bytes(&mut buf)?;     // non-blocking
//!     for frame in controller.consume(&buf[..n]) {
//!         let action = controller.on_message(&frame);
//!         for outbound in &action.outbound {
//!             transport.send_bytes(outbound)?;
//!         }
//!     }
//! }
//! ```

use std::io;

/// Connection-oriented byte transport.
///
/// Implementations wrap a connected endpoint (TCP socket, TLS stream, or an
/// in-memory pipe for tests). Listen/accept/connect bootstrap belongs to the
/// implementation's constructor, not this trait.
pub trait Transport {
    /// Send one complete outbound frame.
    ///
    /// # Errors
    ///
    /// Any `io::Error` is fatal for the connection; the driver should
    /// terminate the session.
    fn send_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Non-blocking receive into `buf`.
    ///
    /// Returns the number of bytes read; `Ok(0)` means no data is currently
    /// available (it does *not* mean end-of-stream - connection teardown is
    /// reported as an error).
    ///
    /// # Errors
    ///
    /// Any `io::Error` is fatal for the connection.
    fn receive_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}
