mod telegram;

use std::cell::Cell;
use std::fmt::Display;
use std::io::Write;

use log::Level;
use thiserror::Error;

use crate::config::Config;
use crate::http::Client;

use telegram::Telegram;

/// Whether a message is mirrored to the push channel, and how.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Push {
    Never,
    Loud,
    /// Delivered without a sound on the receiving side.
    Silent,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PushError {
    #[error("Cannot connect to telegram.org: {0}")]
    Transport(Box<str>),

    #[error("Cannot send message to Telegram (HTTP {0}):\n\n{1}")]
    Status(u16, Box<str>),
}

pub trait PushChannel {
    fn push(&self, message: &str, silent: bool) -> Result<(), PushError>;
}

/// Writes operational messages to the log and mirrors some of them to the
/// push channel. A failing push is logged and otherwise ignored.
pub struct Notifier {
    channel: Option<Box<dyn PushChannel>>,
    warned_missing: Cell<bool>,
}

pub fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERR",
        Level::Warn => "WRN",
        Level::Info => "INF",
        _ => "---",
    }
}

/// The `TAG - message` part of a log line.
pub fn tagged(level: Level, message: impl Display) -> String {
    format!("{} - {}", level_tag(level), message)
}

/// Installs the log backend. `RUST_LOG` overrides the default `info` filter.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {}",
                buf.timestamp_seconds(),
                tagged(record.level(), record.args())
            )
        })
        .init();
}

impl Notifier {
    pub fn new(channel: Option<Box<dyn PushChannel>>) -> Self {
        Self {
            channel,
            warned_missing: Cell::new(false),
        }
    }

    pub fn log_only() -> Self {
        Self::new(None)
    }

    pub fn from_config(config: &Config, client: Client) -> Self {
        let channel = Telegram::from_config(config, client)
            .map(|telegram| Box::new(telegram) as Box<dyn PushChannel>);
        Self::new(channel)
    }

    pub fn error(&self, message: &str, push: Push) {
        self.emit(Level::Error, message, push)
    }

    pub fn warning(&self, message: &str, push: Push) {
        self.emit(Level::Warn, message, push)
    }

    pub fn info(&self, message: &str, push: Push) {
        self.emit(Level::Info, message, push)
    }

    fn emit(&self, level: Level, message: &str, push: Push) {
        log::log!(level, "{}", message);

        let silent = match push {
            Push::Never => return,
            Push::Loud => false,
            Push::Silent => true,
        };

        let Some(channel) = &self.channel else {
            if !self.warned_missing.replace(true) {
                log::warn!("Telegram configuration is missing");
            }
            return;
        };

        if let Err(e) = channel.push(message, silent) {
            log::error!("{}", e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Once;

    use log::{LevelFilter, Log, Metadata, Record};

    use super::*;

    thread_local! {
        static LINES: RefCell<Vec<String>> = RefCell::new(Vec::new());
    }

    /// Keeps log lines per thread, so tests running in parallel each see
    /// only their own output.
    struct ThreadCapture;

    impl Log for ThreadCapture {
        fn enabled(&self, _: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            let line = tagged(record.level(), record.args());
            LINES.with(|lines| lines.borrow_mut().push(line));
        }

        fn flush(&self) {}
    }

    static CAPTURE: ThreadCapture = ThreadCapture;
    static INSTALL: Once = Once::new();

    /// Runs `f` and returns every line it logged on this thread.
    pub(crate) fn capture_logs(f: impl FnOnce()) -> Vec<String> {
        INSTALL.call_once(|| {
            if log::set_logger(&CAPTURE).is_ok() {
                log::set_max_level(LevelFilter::Trace);
            }
        });

        LINES.with(|lines| lines.borrow_mut().clear());
        f();
        LINES.with(|lines| lines.take())
    }

    /// Records every push instead of sending it.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingChannel {
        pub(crate) sent: Rc<RefCell<Vec<(String, bool)>>>,
        pub(crate) fail: bool,
    }

    impl PushChannel for RecordingChannel {
        fn push(&self, message: &str, silent: bool) -> Result<(), PushError> {
            self.sent.borrow_mut().push((message.to_owned(), silent));
            if self.fail {
                Err(PushError::Status(400, "Bad Request: chat not found".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn level_tags() {
        assert_eq!(level_tag(Level::Error), "ERR");
        assert_eq!(level_tag(Level::Warn), "WRN");
        assert_eq!(level_tag(Level::Info), "INF");
        assert_eq!(level_tag(Level::Debug), "---");
    }

    #[test]
    fn push_modes() {
        let channel = RecordingChannel::default();
        let notifier = Notifier::new(Some(Box::new(channel.clone())));

        notifier.info("log only", Push::Never);
        notifier.info("loud", Push::Loud);
        notifier.error("quiet", Push::Silent);

        assert_eq!(
            *channel.sent.borrow(),
            vec![("loud".to_owned(), false), ("quiet".to_owned(), true)]
        );
    }

    #[test]
    fn tagged_lines() {
        assert_eq!(tagged(Level::Warn, "disk full"), "WRN - disk full");
        assert_eq!(tagged(Level::Info, format_args!("Host {} new IP", "a")), "INF - Host a new IP");
    }

    #[test]
    fn every_message_is_logged_with_its_tag() {
        let channel = RecordingChannel::default();
        let notifier = Notifier::new(Some(Box::new(channel.clone())));

        let lines = capture_logs(|| {
            notifier.info("log only", Push::Never);
            notifier.warning("pushed", Push::Loud);
            notifier.error("pushed quietly", Push::Silent);
        });

        assert_eq!(lines, ["INF - log only", "WRN - pushed", "ERR - pushed quietly"]);
    }

    #[test]
    fn missing_channel_warns_once_and_keeps_logging() {
        let notifier = Notifier::log_only();

        let lines = capture_logs(|| {
            notifier.info("first", Push::Loud);
            notifier.error("second", Push::Silent);
            notifier.info("third", Push::Loud);
        });

        assert_eq!(
            lines,
            [
                "INF - first",
                "WRN - Telegram configuration is missing",
                "ERR - second",
                "INF - third",
            ]
        );
    }

    #[test]
    fn push_failure_is_logged() {
        let channel = RecordingChannel {
            fail: true,
            ..Default::default()
        };
        let notifier = Notifier::new(Some(Box::new(channel)));

        let lines = capture_logs(|| notifier.info("Host a new IP: 1.2.3.4", Push::Loud));

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "INF - Host a new IP: 1.2.3.4");
        assert!(lines[1].starts_with("ERR - Cannot send message to Telegram (HTTP 400)"));
    }

    #[test]
    fn missing_channel_is_a_no_op() {
        let notifier = Notifier::log_only();
        notifier.info("first", Push::Loud);
        assert!(notifier.warned_missing.get());
        notifier.error("second", Push::Silent);
        assert!(notifier.warned_missing.get());
    }

    #[test]
    fn log_only_messages_do_not_warn_about_missing_channel() {
        let notifier = Notifier::log_only();
        notifier.error("startup failure", Push::Never);
        assert!(!notifier.warned_missing.get());
    }

    #[test]
    fn failing_channel_does_not_escalate() {
        let channel = RecordingChannel {
            fail: true,
            ..Default::default()
        };
        let notifier = Notifier::new(Some(Box::new(channel.clone())));

        notifier.info("one", Push::Loud);
        notifier.info("two", Push::Loud);

        // No retry, and the next message is still attempted.
        assert_eq!(channel.sent.borrow().len(), 2);
    }
}
