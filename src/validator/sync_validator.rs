// src/validator/sync_validator.rs

//! Synchronous CCNET exchange engine.
//!
//! One exchange is: encode and write the command frame, reassemble the
//! response from however many transport reads it takes, validate it,
//! classify it, and acknowledge data frames. Protocol-level failures
//! (NACK, CRC mismatch, illegal command) are never retried here; the
//! caller decides whether to reissue the command.

use crate::common::{
    command::Command,
    error::CcnetError,
    frame::{self, FrameBuf, FrameClass, MAX_FRAME_LEN},
    hal_traits::{CcnetSerial, CcnetTrace, NullTrace},
    status::PollResponse,
    types::{ExchangeLimits, ResponseBytes, MAX_RESPONSE_PAYLOAD},
};

/// Driver for one CCNET bill validator on a half-duplex serial line.
///
/// Owns its transport exclusively for its whole lifetime. Exchanges are
/// blocking and strictly sequential; the driver does not guard against a
/// second exchange being started while one is in flight, so multi-threaded
/// callers must serialize access externally (a mutex around the driver or
/// a single-writer task).
#[derive(Debug)]
pub struct SyncValidator<IF, TR = NullTrace>
where
    IF: CcnetSerial,
    TR: CcnetTrace,
{
    interface: IF,
    trace: TR,
    limits: ExchangeLimits,
}

impl<IF> SyncValidator<IF>
where
    IF: CcnetSerial,
{
    pub fn new(interface: IF) -> Self {
        Self::with_trace(interface, NullTrace)
    }
}

impl<IF, TR> SyncValidator<IF, TR>
where
    IF: CcnetSerial,
    TR: CcnetTrace,
{
    /// Creates a driver that reports every frame to `trace`.
    pub fn with_trace(interface: IF, trace: TR) -> Self {
        SyncValidator {
            interface,
            trace,
            limits: ExchangeLimits::default(),
        }
    }

    pub fn limits(&self) -> ExchangeLimits {
        self.limits
    }

    pub fn set_limits(&mut self, limits: ExchangeLimits) {
        self.limits = limits;
    }

    /// Consumes the driver and hands the transport back.
    pub fn release(self) -> IF {
        self.interface
    }

    // --- Public Blocking Commands ---

    /// Returns the validator to its power-up state.
    pub fn reset(&mut self) -> Result<ResponseBytes, CcnetError<IF::Error>> {
        self.execute_exchange(&Command::Reset)
    }

    /// Requests the enabled bill types and security setup.
    pub fn get_status(&mut self) -> Result<ResponseBytes, CcnetError<IF::Error>> {
        self.execute_exchange(&Command::GetStatus)
    }

    /// Uploads a security configuration. The layout of `config` is
    /// device-model specific and passed through untouched.
    pub fn set_security(&mut self, config: &[u8]) -> Result<ResponseBytes, CcnetError<IF::Error>> {
        self.execute_exchange(&Command::SetSecurity { config })
    }

    /// Polls the device and decodes its status.
    ///
    /// The status byte is validated against the closed status table; an
    /// unrecognized byte fails with `UnknownStatus` rather than being
    /// passed through raw.
    pub fn poll(&mut self) -> Result<PollResponse, CcnetError<IF::Error>> {
        let payload = self.execute_exchange(&Command::Poll)?;
        PollResponse::decode::<IF::Error>(&payload)
    }

    /// Requests part number, serial number and asset data.
    pub fn identification(&mut self) -> Result<ResponseBytes, CcnetError<IF::Error>> {
        self.execute_exchange(&Command::Identification)
    }

    /// Requests the denomination table.
    pub fn get_bill_table(&mut self) -> Result<ResponseBytes, CcnetError<IF::Error>> {
        self.execute_exchange(&Command::GetBillTable)
    }

    /// Explicitly acknowledges the validator's last frame.
    ///
    /// Distinct from the engine's internal fire-and-forget ACK: this runs
    /// a full exchange and reads whatever the device answers.
    pub fn ack(&mut self) -> Result<ResponseBytes, CcnetError<IF::Error>> {
        self.execute_exchange(&Command::Ack)
    }

    /// Explicitly rejects the validator's last frame.
    pub fn nack(&mut self) -> Result<ResponseBytes, CcnetError<IF::Error>> {
        self.execute_exchange(&Command::Nack)
    }

    // --- Core Exchange Logic (Private) ---

    fn execute_exchange(
        &mut self,
        command: &Command<'_>,
    ) -> Result<ResponseBytes, CcnetError<IF::Error>> {
        self.send_frame(command.code(), command.payload())?;

        let raw = self.read_raw_response()?;
        let response = frame::decode::<IF::Error>(&raw)?;
        self.trace.frame_received(response.as_bytes());

        match response.classify() {
            FrameClass::Ack => Ok(ResponseBytes::new()),
            FrameClass::Nack => Err(CcnetError::Nack),
            FrameClass::IllegalCommand => Err(CcnetError::IllegalCommand),
            FrameClass::Data(data) => {
                let mut payload = ResponseBytes::new();
                payload
                    .try_extend_from_slice(data)
                    .map_err(|_| CcnetError::BufferOverflow {
                        needed: data.len(),
                        got: MAX_RESPONSE_PAYLOAD,
                    })?;
                // Half-duplex handshake: confirm receipt of the data frame
                // before handing the payload to the caller.
                self.send_frame(Command::Ack.code(), &[])?;
                Ok(payload)
            }
        }
    }

    // --- Low-Level I/O Helpers (Private) ---

    fn send_frame(
        &mut self,
        command_code: u8,
        payload: &[u8],
    ) -> Result<(), CcnetError<IF::Error>> {
        let outbound = frame::encode::<IF::Error>(command_code, payload)?;
        // Fire-and-forget: one write call, no write-level retry.
        self.interface.write_all(&outbound).map_err(CcnetError::Io)?;
        self.trace.frame_sent(&outbound);
        Ok(())
    }

    /// Reassembles one response frame from the line.
    ///
    /// Each loop turn is a single transport read: a timed-out attempt
    /// (`WouldBlock`) or an empty read just consumes one of the bounded
    /// attempts. The loop only ends early for a transport error or once
    /// [`frame::response_complete`] says the buffer holds a whole frame.
    fn read_raw_response(&mut self) -> Result<FrameBuf, CcnetError<IF::Error>> {
        let mut buf = FrameBuf::new();
        let mut chunk = [0u8; MAX_FRAME_LEN];

        for _attempt in 0..self.limits.max_read_attempts {
            match self.interface.read(&mut chunk) {
                Ok(n) => {
                    let needed = buf.len() + n;
                    buf.try_extend_from_slice(&chunk[..n]).map_err(|_| {
                        CcnetError::BufferOverflow {
                            needed,
                            got: MAX_FRAME_LEN,
                        }
                    })?;
                    if frame::response_complete(&buf) {
                        return Ok(buf);
                    }
                }
                Err(nb::Error::WouldBlock) => continue,
                Err(nb::Error::Other(e)) => return Err(CcnetError::Io(e)),
            }
        }

        Err(CcnetError::Timeout)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::status::{RejectReason, Status, SubCode};

    // --- Wire fixtures (CRC bytes precomputed against the reference loop) ---

    const POLL_FRAME: &[u8] = &[0x02, 0x03, 0x06, 0x33, 0xDA, 0x81];
    const ACK_FRAME: &[u8] = &[0x02, 0x03, 0x06, 0x00, 0xC2, 0x82];
    const RESET_FRAME: &[u8] = &[0x02, 0x03, 0x06, 0x30, 0x41, 0xB3];
    const SET_SECURITY_FRAME: &[u8] = &[0x02, 0x03, 0x09, 0x32, 0x01, 0x02, 0x03, 0xD1, 0x44];

    const RESP_ACCEPTING: &[u8] = &[0x02, 0x03, 0x06, 0x15, 0xEE, 0xC5];
    const RESP_BILL_TABLE: &[u8] = &[0x02, 0x03, 0x08, 0x11, 0x22, 0x33, 0x90, 0x3C];
    const RESP_UNKNOWN_STATUS: &[u8] = &[0x02, 0x03, 0x06, 0x2A, 0x9A, 0x0C];

    const CTRL_ACK: &[u8] = &[0x02, 0x03, 0x00, 0x00, 0x12, 0xD6];
    const CTRL_NACK: &[u8] = &[0x02, 0x03, 0x00, 0xFF, 0x6A, 0xD9];
    const CTRL_ILLEGAL: &[u8] = &[0x02, 0x03, 0x00, 0x30, 0x91, 0xE7];

    // --- Mock Comm Error ---
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    struct MockCommError;

    // --- Scripted Mock Interface ---

    #[derive(Debug, Copy, Clone)]
    enum ReadStep {
        /// The next read returns these bytes.
        Give(&'static [u8]),
        /// The next read times out with no data.
        Block,
        /// The next read fails at the transport level.
        Fail,
    }

    struct MockInterface {
        script: &'static [ReadStep],
        step: usize,
        read_calls: u32,
        write_log: [u8; 64],
        write_len: usize,
    }

    impl MockInterface {
        fn new(script: &'static [ReadStep]) -> Self {
            MockInterface {
                script,
                step: 0,
                read_calls: 0,
                write_log: [0; 64],
                write_len: 0,
            }
        }

        fn written(&self) -> &[u8] {
            &self.write_log[..self.write_len]
        }
    }

    impl CcnetSerial for MockInterface {
        type Error = MockCommError;

        fn read(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error> {
            self.read_calls += 1;
            // Past the script's end the device goes silent.
            let step = self
                .script
                .get(self.step)
                .copied()
                .unwrap_or(ReadStep::Block);
            self.step += 1;
            match step {
                ReadStep::Give(bytes) => {
                    buf[..bytes.len()].copy_from_slice(bytes);
                    Ok(bytes.len())
                }
                ReadStep::Block => Err(nb::Error::WouldBlock),
                ReadStep::Fail => Err(nb::Error::Other(MockCommError)),
            }
        }

        fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
            let end = self.write_len + bytes.len();
            self.write_log[self.write_len..end].copy_from_slice(bytes);
            self.write_len = end;
            Ok(())
        }
    }

    // --- Recording Trace Observer ---

    #[derive(Default)]
    struct RecordingTrace {
        sent: u32,
        received: u32,
        last_received_len: usize,
    }

    impl CcnetTrace for RecordingTrace {
        fn frame_sent(&mut self, _frame: &[u8]) {
            self.sent += 1;
        }
        fn frame_received(&mut self, frame: &[u8]) {
            self.received += 1;
            self.last_received_len = frame.len();
        }
    }

    fn concat(a: &[u8], b: &[u8]) -> FrameBuf {
        let mut buf = FrameBuf::new();
        let _ = buf.try_extend_from_slice(a);
        let _ = buf.try_extend_from_slice(b);
        buf
    }

    #[test]
    fn test_poll_single_read_acknowledges_data() {
        let mut validator =
            SyncValidator::new(MockInterface::new(&[ReadStep::Give(RESP_ACCEPTING)]));

        let response = validator.poll().unwrap();
        assert_eq!(response.status, Status::Accepting);
        assert_eq!(response.sub_code, None);

        // One poll frame out, then exactly one implicit ACK.
        let expected = concat(POLL_FRAME, ACK_FRAME);
        assert_eq!(validator.release().written(), expected.as_slice());
    }

    #[test]
    fn test_poll_response_split_across_reads() {
        // The reject frame 02 03 07 1C 61 FE F1 arrives in three pieces
        // with a timed-out read in between.
        let mut validator = SyncValidator::new(MockInterface::new(&[
            ReadStep::Give(&[0x02, 0x03]),
            ReadStep::Block,
            ReadStep::Give(&[0x07, 0x1C, 0x61]),
            ReadStep::Give(&[0xFE, 0xF1]),
        ]));

        let response = validator.poll().unwrap();
        assert_eq!(response.status, Status::Rejecting);
        assert_eq!(
            response.sub_code,
            Some(SubCode::Reject(RejectReason::DueToMagnetic))
        );
    }

    #[test]
    fn test_silent_device_times_out_after_bounded_attempts() {
        // Empty reads and blocked reads both consume attempts; the loop
        // must terminate on its own.
        let mut validator = SyncValidator::new(MockInterface::new(&[
            ReadStep::Give(&[]),
            ReadStep::Block,
        ]));
        validator.set_limits(ExchangeLimits {
            max_read_attempts: 5,
        });

        assert!(matches!(validator.poll(), Err(CcnetError::Timeout)));
        assert_eq!(validator.release().read_calls, 5);
    }

    #[test]
    fn test_partial_frame_then_silence_times_out() {
        let mut validator = SyncValidator::new(MockInterface::new(&[ReadStep::Give(&[
            0x02, 0x03, 0x07, 0x1C,
        ])]));
        validator.set_limits(ExchangeLimits {
            max_read_attempts: 4,
        });

        assert!(matches!(validator.poll(), Err(CcnetError::Timeout)));
    }

    #[test]
    fn test_nack_response() {
        let mut validator = SyncValidator::new(MockInterface::new(&[ReadStep::Give(CTRL_NACK)]));

        assert!(matches!(validator.reset(), Err(CcnetError::Nack)));

        // Protocol failures are not acknowledged: only the command frame
        // went out.
        assert_eq!(validator.release().written(), RESET_FRAME);
    }

    #[test]
    fn test_illegal_command_response() {
        let mut validator =
            SyncValidator::new(MockInterface::new(&[ReadStep::Give(CTRL_ILLEGAL)]));
        assert!(matches!(
            validator.get_bill_table(),
            Err(CcnetError::IllegalCommand)
        ));
    }

    #[test]
    fn test_ack_only_response_returns_empty_payload() {
        let mut validator = SyncValidator::new(MockInterface::new(&[ReadStep::Give(CTRL_ACK)]));

        let payload = validator.set_security(&[0x01, 0x02, 0x03]).unwrap();
        assert!(payload.is_empty());

        // The ACK-only branch performs no handshake write.
        assert_eq!(validator.release().written(), SET_SECURITY_FRAME);
    }

    #[test]
    fn test_data_response_payload_and_handshake() {
        let mut validator =
            SyncValidator::new(MockInterface::new(&[ReadStep::Give(RESP_BILL_TABLE)]));

        let payload = validator.get_bill_table().unwrap();
        assert_eq!(payload.as_slice(), &[0x11, 0x22, 0x33]);

        let written = validator.release();
        assert_eq!(&written.written()[written.write_len - 6..], ACK_FRAME);
    }

    #[test]
    fn test_transport_error_aborts_exchange() {
        let mut validator = SyncValidator::new(MockInterface::new(&[
            ReadStep::Block,
            ReadStep::Fail,
        ]));
        assert!(matches!(
            validator.poll(),
            Err(CcnetError::Io(MockCommError))
        ));
    }

    #[test]
    fn test_corrupted_response_fails_checksum() {
        let mut validator = SyncValidator::new(MockInterface::new(&[ReadStep::Give(&[
            0x02, 0x03, 0x06, 0x15, 0xEE, 0xC4,
        ])]));
        assert!(matches!(
            validator.poll(),
            Err(CcnetError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn test_bad_header_fails_framing() {
        let mut validator = SyncValidator::new(MockInterface::new(&[ReadStep::Give(&[
            0x04, 0x03, 0x06, 0x15, 0xEE, 0xC5,
        ])]));
        assert!(matches!(validator.poll(), Err(CcnetError::Framing)));
    }

    #[test]
    fn test_poll_unknown_status_byte() {
        let mut validator =
            SyncValidator::new(MockInterface::new(&[ReadStep::Give(RESP_UNKNOWN_STATUS)]));
        assert!(matches!(
            validator.poll(),
            Err(CcnetError::UnknownStatus(0x2A))
        ));
    }

    #[test]
    fn test_poll_ack_only_reply_is_unexpected() {
        let mut validator = SyncValidator::new(MockInterface::new(&[ReadStep::Give(CTRL_ACK)]));
        assert!(matches!(
            validator.poll(),
            Err(CcnetError::UnexpectedResponse)
        ));
    }

    #[test]
    fn test_explicit_ack_command() {
        let mut validator = SyncValidator::new(MockInterface::new(&[ReadStep::Give(CTRL_ACK)]));
        let payload = validator.ack().unwrap();
        assert!(payload.is_empty());
        assert_eq!(validator.release().written(), ACK_FRAME);
    }

    #[test]
    fn test_trace_observer_sees_both_directions() {
        let mut validator = SyncValidator::with_trace(
            MockInterface::new(&[ReadStep::Give(RESP_ACCEPTING)]),
            RecordingTrace::default(),
        );

        validator.poll().unwrap();

        let trace = validator.trace;
        // Poll frame plus the implicit ACK.
        assert_eq!(trace.sent, 2);
        // One validated inbound frame, checksum already stripped.
        assert_eq!(trace.received, 1);
        assert_eq!(trace.last_received_len, 4);
    }
}
