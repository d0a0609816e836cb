//! Property-based tests for driver scheduling.
//!
//! For any interleaving of key presses, send completions, fetch completions
//! and clock ticks:
//!
//! 1. At most one send and at most one fetch are outstanding.
//! 2. Sends are never empty and, concatenated, equal the typed bytes in order.
//! 3. The poll interval stays within `[base, max]`.

use std::time::Duration;

use proptest::prelude::*;
use runterm_core::{KeyEvent, Terminal};
use runterm_session::{Command, Fetched, SessionConfig, SessionDriver};

#[derive(Debug, Clone)]
enum Op {
    Key(u8),
    SendDone,
    FetchData,
    FetchIdle,
    Tick(u16),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..26).prop_map(Op::Key),
        2 => Just(Op::SendDone),
        1 => Just(Op::FetchData),
        2 => Just(Op::FetchIdle),
        2 => (0u16..3000).prop_map(Op::Tick),
    ]
}

proptest! {
    #[test]
    fn scheduling_invariants(ops in proptest::collection::vec(op(), 0..200)) {
        let config = SessionConfig::default();
        let (base, max) = (config.poll_base, config.poll_max);
        let mut driver = SessionDriver::new(config, Terminal::new());
        let mut now = Duration::ZERO;
        driver.start(now);

        let mut typed = Vec::new();
        let mut sent = Vec::new();
        let mut sends_out = 0usize;
        let mut fetches_out = 0usize;

        for op in ops {
            match op {
                Op::Key(offset) => {
                    let event = KeyEvent::new(65 + u16::from(offset));
                    if driver.key(&event, now) {
                        typed.push(b'a' + offset);
                    }
                }
                Op::SendDone if sends_out > 0 => {
                    sends_out -= 1;
                    driver.on_send(Ok(()), now);
                }
                Op::FetchData if fetches_out > 0 => {
                    fetches_out -= 1;
                    driver.on_fetch(Ok(Fetched::Data(b".".to_vec())), now);
                }
                Op::FetchIdle if fetches_out > 0 => {
                    fetches_out -= 1;
                    driver.on_fetch(Ok(Fetched::Idle), now);
                }
                Op::Tick(ms) => {
                    now += Duration::from_millis(u64::from(ms));
                    driver.poll(now);
                }
                _ => {}
            }

            for command in driver.drain_commands() {
                match command {
                    Command::Send(bytes) => {
                        prop_assert!(!bytes.is_empty());
                        sends_out += 1;
                        sent.extend_from_slice(&bytes);
                    }
                    Command::Fetch { .. } => fetches_out += 1,
                    _ => {}
                }
            }
            prop_assert!(sends_out <= 1, "{} sends outstanding", sends_out);
            prop_assert!(fetches_out <= 1, "{} fetches outstanding", fetches_out);
            prop_assert!(driver.interval() >= base && driver.interval() <= max);
        }

        sent.extend_from_slice(driver.pending_send());
        prop_assert_eq!(sent, typed);
    }
}
