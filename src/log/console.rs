use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::encode::Encode;
use log4rs::Config;

#[cfg(feature = "progress_bar")]
use super::clear_line::ClearLine;
use super::ActiveLog;

// ISO 8601 timestamp, highlighted level, module path
const PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";
const APPENDER: &str = "stderr";

fn encoder() -> Box<dyn Encode> {
    let pattern = PatternEncoder::new(PATTERN);
    #[cfg(feature = "progress_bar")]
    let encoder: Box<dyn Encode> = Box::new(ClearLine(pattern));
    #[cfg(not(feature = "progress_bar"))]
    let encoder: Box<dyn Encode> = Box::new(pattern);
    encoder
}

impl ActiveLog {
    /// Points `log4rs` at the current filters, installing it on first use.
    pub(super) fn install(&mut self) {
        // Stdout is kept for scenario announcements and summaries.
        let appender = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(encoder())
            .build();
        let loggers = self
            .spec
            .modules
            .iter()
            .map(|(module, level)| Logger::builder().build(module.as_str(), *level));
        let config = Config::builder()
            .appender(Appender::builder().build(APPENDER, Box::new(appender)))
            .loggers(loggers)
            .build(Root::builder().appender(APPENDER).build(self.spec.level));
        let config = match config {
            Ok(config) => config,
            Err(e) => {
                eprintln!("invalid log configuration: {e}");
                return;
            }
        };

        if let Some(handle) = &self.handle {
            handle.set_config(config);
            return;
        }
        match log4rs::init_config(config) {
            Ok(handle) => self.handle = Some(handle),
            Err(e) => eprintln!("failed to install logger: {e}"),
        }
    }
}
