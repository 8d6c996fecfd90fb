//! Well-known FIX tag number constants.
//!
//! Each constant is the integer tag number as defined in the FIX
//! specification. Tags are `u32` to match the field key type used throughout
//! the workspace. Only tags the session layer and tests touch by name are
//! listed; application fields resolve through dictionaries.

// Standard header and trailer

/// Tag 8 - BeginString: FIX version label (e.g. `FIX.4.4`, `FIXT.1.1`).
pub const BEGIN_STRING: u32 = 8;

/// Tag 9 - BodyLength: byte count from the first byte after tag 9's
/// delimiter up to and including the delimiter preceding tag 10.
pub const BODY_LENGTH: u32 = 9;

/// Tag 10 - CheckSum: three-digit modulo-256 byte sum of the preceding
/// message bytes.
pub const CHECKSUM: u32 = 10;

/// Tag 34 - MsgSeqNum: per-direction message sequence number.
pub const MSG_SEQ_NUM: u32 = 34;

/// Tag 35 - MsgType: message kind code (`A` = Logon, `0` = Heartbeat, ...).
pub const MSG_TYPE: u32 = 35;

/// Tag 49 - SenderCompID: identity of the sending party.
pub const SENDER_COMP_ID: u32 = 49;

/// Tag 52 - SendingTime: UTC transmission timestamp
/// (`YYYYMMDD-HH:MM:SS.mmm`).
pub const SENDING_TIME: u32 = 52;

/// Tag 56 - TargetCompID: identity of the receiving party.
pub const TARGET_COMP_ID: u32 = 56;

// Session administration

/// Tag 7 - BeginSeqNo: first sequence number of a resend range.
pub const BEGIN_SEQ_NO: u32 = 7;

/// Tag 16 - EndSeqNo: last sequence number of a resend range (0 = open end).
pub const END_SEQ_NO: u32 = 16;

/// Tag 36 - NewSeqNo: sequence number to resume at after a SequenceReset.
pub const NEW_SEQ_NO: u32 = 36;

/// Tag 58 - Text: free-form human-readable annotation.
pub const TEXT: u32 = 58;

/// Tag 98 - EncryptMethod: logon encryption selector (always `0` here).
pub const ENCRYPT_METHOD: u32 = 98;

/// Tag 108 - HeartBtInt: negotiated heartbeat interval in seconds.
pub const HEART_BT_INT: u32 = 108;

/// Tag 112 - TestReqID: correlates a TestRequest with its Heartbeat echo.
pub const TEST_REQ_ID: u32 = 112;

/// Tag 141 - ResetSeqNumFlag: `Y` requests both counters reset to 1 at logon.
pub const RESET_SEQ_NUM_FLAG: u32 = 141;

/// Tag 1128 - ApplVerID: application FIX version when the transport is FIXT.
pub const APPL_VER_ID: u32 = 1128;

// Common application fields (used by tests and the generator registry)

/// Tag 11 - ClOrdID: client-assigned order identifier.
pub const CL_ORD_ID: u32 = 11;

/// Tag 38 - OrderQty: number of units to buy or sell.
pub const ORDER_QTY: u32 = 38;

/// Tag 44 - Price: limit price.
pub const PRICE: u32 = 44;

/// Tag 54 - Side: order direction. `1` = Buy, `2` = Sell.
pub const SIDE: u32 = 54;

/// Tag 55 - Symbol: instrument ticker symbol.
pub const SYMBOL: u32 = 55;
