//! Integration tests with realistic diagnostic sessions
//!
//! These tests drive the handler through the transport the way a diagnostic
//! tool would: byte by byte, with the half-duplex echo in the way.

#[cfg(test)]
mod tests {
    use crate::handler::CommandHandler;
    use crate::overrides::{parse_override_args, ResponseOverrides};
    use crate::protocol::{self, HANDSHAKE_FRAMES};
    use crate::transport::mock::MockTransport;

    // ========================================================================
    // TEST SESSIONS
    // ========================================================================

    fn handshake_bytes() -> Vec<u8> {
        HANDSHAKE_FRAMES
            .iter()
            .flat_map(|frame| frame.command.iter().copied())
            .collect()
    }

    /// Poll until the tester has nothing left to say
    fn drain(handler: &mut CommandHandler<MockTransport>) -> usize {
        let mut replies = 0;
        while handler.transport().pending_input() > 0 {
            replies += handler.poll();
        }
        replies
    }

    fn simulator(args: &[&str], tester: &[u8]) -> CommandHandler<MockTransport> {
        let pairs = parse_override_args(args).unwrap();
        let overrides = ResponseOverrides::from_pairs(pairs).unwrap();
        CommandHandler::new(MockTransport::with_input(tester), overrides)
    }

    // ========================================================================
    // SESSION TESTS
    // ========================================================================

    #[test]
    fn test_full_handshake() {
        let mut handler = simulator(&[], &handshake_bytes());

        assert_eq!(drain(&mut handler), 5);

        let expected: Vec<Vec<u8>> = HANDSHAKE_FRAMES.iter().map(|f| f.response.to_vec()).collect();
        assert_eq!(handler.transport().written, expected);
        assert!(handler.input().is_empty());
        assert_eq!(handler.stats().echo_failures, 0);
    }

    #[test]
    fn test_handshake_then_live_data() {
        let mut tester = handshake_bytes();
        for sensor_id in [0x05, 0x08, 0x09, 0x08] {
            tester.extend(protocol::sensor_request(sensor_id));
        }
        tester.extend([0x02, 0x3E, 0x01, 0x41]);

        let mut handler = simulator(&["08", "0x0BB8", "5", "50"], &tester);

        assert_eq!(drain(&mut handler), 10);

        let written = &handler.transport().written;
        // 0x0BB8 >> 1 = 0x05DC -> DC, low byte B8
        assert_eq!(written[5], vec![0x03, 0x61, 0x05, 0x28, 0x50, 0xE1]);
        assert_eq!(written[6], vec![0x03, 0x61, 0x08, 0xDC, 0xB8, 0x00]);
        assert_eq!(written[7], vec![0x03, 0x61, 0x09, 0x00, 0x00, 0x6D]);
        assert_eq!(written[8], written[6]);
        assert_eq!(written[9], vec![0x01, 0x7E, 0x7F]);

        let stats = handler.stats();
        assert_eq!(stats.bytes_received, tester.len() as u64);
        assert_eq!(stats.handshake_replies, 6);
        assert_eq!(stats.sensor_replies, 4);
    }

    #[test]
    fn test_wide_sensor_read() {
        let mut handler = simulator(&[], &protocol::sensor_request(0x19));

        assert_eq!(drain(&mut handler), 1);
        assert_eq!(
            handler.transport().written[0],
            vec![0x05, 0x61, 0x19, 0x00, 0x00, 0x00, 0x00, 0x7F]
        );
    }

    #[test]
    fn test_unknown_sensor_is_never_answered() {
        let mut tester = protocol::sensor_request(0x01);
        tester.extend(protocol::sensor_request(0x08));

        let mut handler = simulator(&[], &tester);

        // The unsupported request blocks the head of the input for good
        assert_eq!(drain(&mut handler), 0);
        assert!(handler.transport().written.is_empty());
        assert_eq!(handler.input().len(), 8);
    }

    #[test]
    fn test_spurious_byte_desynchronises_link() {
        let mut tester = vec![0xFF];
        tester.extend(handshake_bytes());

        let mut handler = simulator(&[], &tester);

        assert_eq!(drain(&mut handler), 0);
        assert_eq!(handler.input().len(), tester.len());
    }

    #[test]
    fn test_idle_link() {
        let mut handler = simulator(&[], &[]);
        for _ in 0..5 {
            assert_eq!(handler.poll(), 0);
        }
        assert!(handler.input().is_empty());
        assert!(handler.transport().written.is_empty());
    }

    #[test]
    fn test_bad_config_rejected_before_dispatch() {
        assert!(parse_override_args(&["08"]).is_err());
        assert!(ResponseOverrides::from_pairs(parse_override_args(&["01", "1234"]).unwrap()).is_err());
        assert!(ResponseOverrides::from_pairs(parse_override_args(&["25", "1234"]).unwrap()).is_err());
        assert!(ResponseOverrides::from_pairs(
            parse_override_args(&["08", "1", "0x08", "2"]).unwrap()
        )
        .is_err());
    }
}
