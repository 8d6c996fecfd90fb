//! FIX session-layer state machine.
//!
//! This module implements the session layer as a pure state machine: the
//! [`Controller`] owns identity, lifecycle state, and the two sequence
//! counters, accepts bytes, and answers with values. It never performs I/O.
//!
//! # Architecture: action-based state machine
//!
//! - [`Controller::consume`] segments a raw byte stream into complete
//!   frames (stateless with respect to session state).
//! - [`Controller::on_message`] classifies one frame and returns an
//!   [`Action`]: the disposition, outbound frames to put on the wire in
//!   order, and the events that fired.
//! - Driver code executes actions (send frames, tear down the transport).
//!
//! This keeps the protocol logic deterministic and testable without mocking
//! sockets or time; the only time dependence is the `SendingTime` stamp,
//! sampled once per built message through the injected [`Clock`].
//!
//! # State machine
//!
//! ```text
//! ┌──────────────┐ build_logon ┌──────────────┐ on Logon ┌─────────────┐
//! │ Disconnected │────────────>│ AwaitingLogon│─────────>│ Established │
//! └──────────────┘             └──────────────┘          └─────────────┘
//!         │                                                  │
//!         │ on Logon (acceptor)                 build_logout │
//!         └─────────────> Established          ┌────────────┐│
//!                                              │ LogoutSent │<┘
//!                                              └────────────┘
//!                                                    │ on Logout / hard error
//!                                                    ↓
//!                                              ┌────────────┐
//!                                              │ Terminated │  (absorbing)
//!                                              └────────────┘
//! ```
//!
//! Hard errors (CompID mismatch, sequence too low, pre-logon traffic) jump
//! to `Terminated` from any state.

use std::fmt;

use bytes::{Buf, BytesMut};
use fixline_proto::{
    FrameBuilder, ParseError, envelope, tag,
    tokenizer::{SOH, normalize_bytes, split_fields_strict},
};

use crate::clock::{Clock, SystemClock, format_sending_time};

/// Endpoint role in the FIX session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Dials out and sends the initial Logon.
    Initiator,
    /// Listens and answers an inbound Logon with its own.
    Acceptor,
}

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session activity yet.
    Disconnected,
    /// Our Logon is out; the counterpart's is pending.
    AwaitingLogon,
    /// Handshake complete; application flow allowed.
    Established,
    /// Our Logout is out; shutdown in progress.
    LogoutSent,
    /// Session over. No transition leaves this state.
    Terminated,
}

/// Classification of one processed inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Passed session checks; counters advanced.
    Accepted,
    /// Sequence discipline violated; counters unchanged.
    OutOfSync,
    /// The frame cannot be safely interpreted at the session layer.
    Garbled,
}

/// Events emitted while processing inbound frames.
///
/// The wire strings are stable and intended for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Logon accepted (handshake side completed).
    Logon,
    /// Logout received.
    Logout,
    /// Heartbeat received.
    Heartbeat,
    /// TestRequest received; a Heartbeat echo was produced.
    TestRequest,
    /// ResendRequest received (replay is a collaborator concern).
    ResendRequest,
    /// SequenceReset processed (applied or no-op).
    SequenceReset,
    /// Incoming sequence ran ahead of the expected one.
    SequenceGap,
    /// Incoming sequence fell behind the expected one.
    SequenceTooLow,
    /// Non-Logon traffic arrived before any Logon.
    LogonRequired,
    /// Sender/target CompIDs do not match this session's identity.
    CompIdMismatch,
    /// Envelope or parse failure.
    GarbledMessage,
    /// Application-level message passed through.
    ApplicationMessage,
}

impl SessionEvent {
    /// Stable string form of the event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Logon => "logon",
            Self::Logout => "logout",
            Self::Heartbeat => "heartbeat",
            Self::TestRequest => "test_request",
            Self::ResendRequest => "resend_request",
            Self::SequenceReset => "sequence_reset",
            Self::SequenceGap => "sequence_gap",
            Self::SequenceTooLow => "sequence_too_low",
            Self::LogonRequired => "logon_required",
            Self::CompIdMismatch => "comp_id_mismatch",
            Self::GarbledMessage => "garbled_message",
            Self::ApplicationMessage => "application_message",
        }
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Controller reaction to one inbound frame.
///
/// `outbound` frames were built through the normal outbound path and have
/// already advanced the outgoing sequence counter, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Final classification of the inbound frame.
    pub disposition: Disposition,
    /// Frames to send on the wire, in generation order.
    pub outbound: Vec<Vec<u8>>,
    /// Events that fired during processing.
    pub events: Vec<SessionEvent>,
}

impl Action {
    fn new(disposition: Disposition) -> Self {
        Self { disposition, outbound: Vec::new(), events: Vec::new() }
    }
}

/// A `(tag, value)` pair for caller-supplied body fields.
pub type Field = (u32, String);

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// BeginString stamped on every outbound frame.
    pub begin_string: String,
    /// Heartbeat interval in seconds, advertised in Logon (tag 108).
    pub heartbeat_interval: u32,
    /// Stream-buffer cap; exceeding it clears the buffer and terminates the
    /// session. Growth between extract cycles is otherwise unbounded by
    /// inbound traffic.
    pub max_buffer_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            begin_string: "FIX.4.4".to_string(),
            heartbeat_interval: 30,
            max_buffer_bytes: 1024 * 1024,
        }
    }
}

/// Session-level FIX controller: logon handshake, sequencing, reframing,
/// and classification of inbound traffic.
///
/// Single-owner object; one controller per transport endpoint. Sequence
/// counters live for the lifetime of the instance.
pub struct Controller {
    sender_comp_id: String,
    target_comp_id: String,
    role: Role,
    config: SessionConfig,
    state: SessionState,
    expected_incoming_seq: u32,
    next_outgoing_seq: u32,
    logon_sent: bool,
    logon_received: bool,
    stream_buffer: BytesMut,
    clock: Box<dyn Clock>,
}

impl Controller {
    /// Create a controller with default configuration and the system clock.
    #[must_use]
    pub fn new(
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
        role: Role,
    ) -> Self {
        Self::with_config(sender_comp_id, target_comp_id, role, SessionConfig::default())
    }

    /// Create a controller with explicit configuration and the system clock.
    #[must_use]
    pub fn with_config(
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
        role: Role,
        config: SessionConfig,
    ) -> Self {
        Self::with_clock(sender_comp_id, target_comp_id, role, config, SystemClock)
    }

    /// Create a controller with an injected clock (deterministic tests).
    #[must_use]
    pub fn with_clock(
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
        role: Role,
        config: SessionConfig,
        clock: impl Clock + 'static,
    ) -> Self {
        Self {
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
            role,
            config,
            state: SessionState::Disconnected,
            expected_incoming_seq: 1,
            next_outgoing_seq: 1,
            logon_sent: false,
            logon_received: false,
            stream_buffer: BytesMut::new(),
            clock: Box::new(clock),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Endpoint role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// BeginString stamped on outbound frames.
    #[must_use]
    pub fn begin_string(&self) -> &str {
        &self.config.begin_string
    }

    /// Next expected inbound MsgSeqNum (tag 34).
    #[must_use]
    pub fn expected_incoming_seq(&self) -> u32 {
        self.expected_incoming_seq
    }

    /// Next outbound MsgSeqNum that will be assigned.
    #[must_use]
    pub fn next_outgoing_seq(&self) -> u32 {
        self.next_outgoing_seq
    }

    /// Advance the outbound counter without building a message.
    ///
    /// Gap-simulation hook for tests and drills.
    pub fn skip_outbound_sequence(&mut self, delta: u32) {
        self.next_outgoing_seq += delta;
    }

    /// Apply a state transition. Termination is one-way: nothing leaves
    /// [`SessionState::Terminated`].
    fn transition(&mut self, next: SessionState) {
        if self.state != SessionState::Terminated {
            self.state = next;
        }
    }

    // Outbound builders

    /// Build a Logon (`35=A`) and transition to
    /// [`SessionState::AwaitingLogon`].
    ///
    /// With `reset_seq_num` the frame carries `141=Y` and both counters
    /// restart at 1 before the sequence number is assigned.
    pub fn build_logon(&mut self, reset_seq_num: bool) -> Vec<u8> {
        let mut fields: Vec<Field> = vec![
            (tag::ENCRYPT_METHOD, "0".to_string()),
            (tag::HEART_BT_INT, self.config.heartbeat_interval.to_string()),
        ];
        if reset_seq_num {
            fields.push((tag::RESET_SEQ_NUM_FLAG, "Y".to_string()));
            self.expected_incoming_seq = 1;
            self.next_outgoing_seq = 1;
        }

        self.logon_sent = true;
        self.transition(SessionState::AwaitingLogon);
        tracing::debug!(reset_seq_num, "logon built; awaiting counterpart logon");
        self.build_message("A", fields)
    }

    /// Build a Heartbeat (`35=0`), echoing `TestReqID` (112) when non-empty.
    pub fn build_heartbeat(&mut self, test_req_id: &str) -> Vec<u8> {
        let mut fields: Vec<Field> = Vec::new();
        if !test_req_id.is_empty() {
            fields.push((tag::TEST_REQ_ID, test_req_id.to_string()));
        }
        self.build_message("0", fields)
    }

    /// Build a TestRequest (`35=1`) with the given `TestReqID` (112).
    pub fn build_test_request(&mut self, test_req_id: &str) -> Vec<u8> {
        self.build_message("1", vec![(tag::TEST_REQ_ID, test_req_id.to_string())])
    }

    /// Build a Logout (`35=5`) and transition to
    /// [`SessionState::LogoutSent`]. `text` goes into tag 58 when non-empty.
    pub fn build_logout(&mut self, text: &str) -> Vec<u8> {
        self.transition(SessionState::LogoutSent);
        let mut fields: Vec<Field> = Vec::new();
        if !text.is_empty() {
            fields.push((tag::TEXT, text.to_string()));
        }
        self.build_message("5", fields)
    }

    /// Build a ResendRequest (`35=2`) for `[begin_seq_no, end_seq_no]`;
    /// an `end_seq_no` of 0 means "through the latest".
    pub fn build_resend_request(&mut self, begin_seq_no: u32, end_seq_no: u32) -> Vec<u8> {
        self.build_message(
            "2",
            vec![
                (tag::BEGIN_SEQ_NO, begin_seq_no.to_string()),
                (tag::END_SEQ_NO, end_seq_no.to_string()),
            ],
        )
    }

    /// Build an application message of arbitrary `msg_type` with the given
    /// body fields in order.
    pub fn build_application(&mut self, msg_type: &str, fields: Vec<Field>) -> Vec<u8> {
        self.build_message(msg_type, fields)
    }

    /// Assign the next outbound sequence number and build one frame.
    fn build_message(&mut self, msg_type: &str, fields: Vec<Field>) -> Vec<u8> {
        let seq = self.next_outgoing_seq;
        self.next_outgoing_seq += 1;
        self.build_with_seq(msg_type, fields, seq)
    }

    /// Build a frame carrying `seq`. Header order is fixed:
    /// 35, 34, 49, 56, 52, then caller fields. The clock is sampled exactly
    /// once here.
    fn build_with_seq(&self, msg_type: &str, fields: Vec<Field>, seq: u32) -> Vec<u8> {
        let sending_time = format_sending_time(self.clock.now_utc());
        let mut builder = FrameBuilder::new(&self.config.begin_string, msg_type)
            .field_u32(tag::MSG_SEQ_NUM, seq)
            .field(tag::SENDER_COMP_ID, &self.sender_comp_id)
            .field(tag::TARGET_COMP_ID, &self.target_comp_id)
            .field(tag::SENDING_TIME, sending_time);
        for (field_tag, value) in fields {
            builder = builder.field(field_tag, value);
        }
        builder.build()
    }

    // Inbound path

    /// Append normalized bytes to the stream buffer and extract every
    /// complete frame, in wire order.
    ///
    /// Extraction is stateless with respect to session state: it only
    /// segments bytes. Garbage before a frame start is dropped; a frame
    /// whose checksum trailer has not fully arrived is left in the buffer
    /// for the next call. Exceeding the configured buffer cap clears the
    /// buffer and terminates the session.
    pub fn consume(&mut self, incoming: &[u8]) -> Vec<Vec<u8>> {
        let normalized = normalize_bytes(incoming);
        self.stream_buffer.extend_from_slice(&normalized);

        if self.stream_buffer.len() > self.config.max_buffer_bytes {
            tracing::warn!(
                buffered = self.stream_buffer.len(),
                cap = self.config.max_buffer_bytes,
                "stream buffer overflow; terminating session"
            );
            self.stream_buffer.clear();
            self.state = SessionState::Terminated;
            return Vec::new();
        }

        let mut frames = Vec::new();
        loop {
            let Some(begin) = find_subsequence(&self.stream_buffer, b"8=") else {
                // No frame start in sight. A trailing '8' may become "8="
                // when the next byte arrives, so keep exactly that.
                if self.stream_buffer.last() == Some(&b'8') {
                    let garbage = self.stream_buffer.len() - 1;
                    self.stream_buffer.advance(garbage);
                } else {
                    self.stream_buffer.clear();
                }
                break;
            };
            if begin > 0 {
                self.stream_buffer.advance(begin);
            }

            let trailer_pattern = [SOH, b'1', b'0', b'='];
            let Some(trailer) = find_subsequence(&self.stream_buffer, &trailer_pattern) else {
                break;
            };
            if trailer + 8 > self.stream_buffer.len() {
                break;
            }

            let digits = &self.stream_buffer[trailer + 4..trailer + 7];
            if !digits.iter().all(u8::is_ascii_digit) || self.stream_buffer[trailer + 7] != SOH {
                // Corrupt trailer candidate: drop through it and rescan.
                self.stream_buffer.advance(trailer + 1);
                continue;
            }

            frames.push(self.stream_buffer[..trailer + 8].to_vec());
            self.stream_buffer.advance(trailer + 8);
        }

        frames
    }

    /// Process one complete inbound frame.
    ///
    /// Checks run in order: envelope, session parse, CompID identity,
    /// sequence discipline, then MsgType dispatch. All outbound frames are
    /// built through the normal outbound path and advance the outgoing
    /// counter in generation order.
    pub fn on_message(&mut self, raw_message: &[u8]) -> Action {
        let normalized = normalize_bytes(raw_message).into_owned();

        if envelope::validate_envelope(&normalized).is_err() {
            tracing::debug!("inbound frame failed envelope validation");
            return self.garbled_reject("Invalid BodyLength or CheckSum");
        }

        let text = String::from_utf8_lossy(&normalized).into_owned();
        let parsed = match parse_frame(&text) {
            Ok(parsed) => parsed,
            Err(error) => {
                tracing::debug!(%error, "inbound frame failed session parse");
                return self.garbled_reject(&error.to_string());
            },
        };

        // Identity: the peer's sender must be our target and vice versa.
        let sender = field_value(&parsed.fields, tag::SENDER_COMP_ID).unwrap_or("");
        let target = field_value(&parsed.fields, tag::TARGET_COMP_ID).unwrap_or("");
        if sender != self.target_comp_id || target != self.sender_comp_id {
            tracing::warn!(sender, target, "CompID mismatch; terminating session");
            let mut action = Action::new(Disposition::Garbled);
            action.events.push(SessionEvent::CompIdMismatch);
            action.outbound.push(self.build_logout("CompID mismatch"));
            self.state = SessionState::Terminated;
            return action;
        }

        // Sequence discipline.
        if parsed.seq > self.expected_incoming_seq {
            tracing::debug!(
                received = parsed.seq,
                expected = self.expected_incoming_seq,
                "sequence gap"
            );
            let mut action = Action::new(Disposition::OutOfSync);
            action.events.push(SessionEvent::SequenceGap);
            action.outbound.push(self.build_resend_request(self.expected_incoming_seq, 0));
            return action;
        }

        if parsed.seq < self.expected_incoming_seq {
            tracing::warn!(
                received = parsed.seq,
                expected = self.expected_incoming_seq,
                "sequence too low; terminating session"
            );
            let mut action = Action::new(Disposition::OutOfSync);
            action.events.push(SessionEvent::SequenceTooLow);
            action.outbound.push(self.build_logout("MsgSeqNum too low"));
            self.state = SessionState::Terminated;
            return action;
        }

        self.expected_incoming_seq += 1;

        if parsed.msg_type == "A" {
            self.logon_received = true;
            let mut action = Action::new(Disposition::Accepted);
            if !self.logon_sent && self.role == Role::Acceptor {
                action.outbound.push(self.build_logon(false));
            }
            self.transition(SessionState::Established);
            action.events.push(SessionEvent::Logon);
            tracing::debug!("session established");
            return action;
        }

        // Only Logout is tolerated before the counterpart has logged on.
        if !self.logon_received && parsed.msg_type != "5" {
            tracing::warn!(msg_type = %parsed.msg_type, "traffic before logon; terminating session");
            let mut action = Action::new(Disposition::OutOfSync);
            action.events.push(SessionEvent::LogonRequired);
            action.outbound.push(self.build_logout("Expected Logon"));
            self.state = SessionState::Terminated;
            return action;
        }

        match parsed.msg_type.as_str() {
            "1" => {
                let mut action = Action::new(Disposition::Accepted);
                action.events.push(SessionEvent::TestRequest);
                let test_req_id =
                    field_value(&parsed.fields, tag::TEST_REQ_ID).unwrap_or("").to_string();
                action.outbound.push(self.build_heartbeat(&test_req_id));
                action
            },
            "5" => {
                let mut action = Action::new(Disposition::Accepted);
                action.events.push(SessionEvent::Logout);
                if self.state != SessionState::LogoutSent {
                    action.outbound.push(self.build_logout("Logout Ack"));
                }
                self.state = SessionState::Terminated;
                action
            },
            "2" => {
                // Replay of the requested range is a collaborator concern.
                let mut action = Action::new(Disposition::Accepted);
                action.events.push(SessionEvent::ResendRequest);
                action
            },
            "4" => {
                let mut action = Action::new(Disposition::Accepted);
                if let Some(new_seq) =
                    field_value(&parsed.fields, tag::NEW_SEQ_NO).and_then(parse_seq)
                {
                    if new_seq >= self.expected_incoming_seq {
                        tracing::debug!(new_seq, "sequence reset applied");
                        self.expected_incoming_seq = new_seq;
                    }
                }
                action.events.push(SessionEvent::SequenceReset);
                action
            },
            "0" => {
                let mut action = Action::new(Disposition::Accepted);
                action.events.push(SessionEvent::Heartbeat);
                action
            },
            _ => {
                let mut action = Action::new(Disposition::Accepted);
                action.events.push(SessionEvent::ApplicationMessage);
                action
            },
        }
    }

    /// Garbled disposition with a Reject (`35=3`) carrying `text`.
    fn garbled_reject(&mut self, text: &str) -> Action {
        let mut action = Action::new(Disposition::Garbled);
        action.events.push(SessionEvent::GarbledMessage);
        action.outbound.push(self.build_message("3", vec![(tag::TEXT, text.to_string())]));
        action
    }
}

/// One fully parsed session frame.
struct ParsedFrame {
    /// Every `(tag, value)` pair in wire order.
    fields: Vec<Field>,
    msg_type: String,
    seq: u32,
}

/// Strict session parse: every token well formed, MsgType present, and a
/// numeric MsgSeqNum present.
fn parse_frame(text: &str) -> Result<ParsedFrame, ParseError> {
    let raw_fields = split_fields_strict(text)?;

    let mut fields = Vec::with_capacity(raw_fields.len());
    for raw in &raw_fields {
        fields.push((raw.tag, text[raw.value.clone()].to_string()));
    }

    let mut msg_type = String::new();
    let mut seq = None;
    for (field_tag, value) in &fields {
        if *field_tag == tag::MSG_TYPE {
            msg_type = value.clone();
        } else if *field_tag == tag::MSG_SEQ_NUM {
            seq = Some(parse_seq(value).ok_or(ParseError::InvalidMsgSeqNum)?);
        }
    }

    if msg_type.is_empty() {
        return Err(ParseError::MissingMsgType);
    }
    let Some(seq) = seq else {
        return Err(ParseError::MissingMsgSeqNum);
    };

    Ok(ParsedFrame { fields, msg_type, seq })
}

/// First occurrence of `wanted` among the parsed fields.
fn field_value(fields: &[Field], wanted: u32) -> Option<&str> {
    fields.iter().find(|(field_tag, _)| *field_tag == wanted).map(|(_, value)| value.as_str())
}

/// Full-consume unsigned decimal (no sign, no surrounding junk).
fn parse_seq(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}
