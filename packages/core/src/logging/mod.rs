// Logging
//
// Leveled logging used by the host manager, hosts and the batch front end.

mod console_logger;
mod logger;

pub use console_logger::ConsoleLogger;
pub use logger::{LogLevel, Logger, NullLogger};

#[cfg(test)]
mod tests {
    use super::*;

    mod log_level_tests {
        use super::*;

        #[test]
        fn should_have_correct_ordering() {
            assert!((LogLevel::Debug as u8) < (LogLevel::Info as u8));
            assert!((LogLevel::Info as u8) < (LogLevel::Warn as u8));
            assert!((LogLevel::Warn as u8) < (LogLevel::Error as u8));
        }

        #[test]
        fn should_parse_level_names() {
            assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
            assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
            assert!("loud".parse::<LogLevel>().is_err());
        }
    }

    mod console_logger_tests {
        use super::*;

        #[test]
        fn should_create_with_level() {
            let logger = ConsoleLogger::new(LogLevel::Warn);
            assert_eq!(logger.level(), LogLevel::Warn);
        }

        #[test]
        fn should_check_level_enabled() {
            let logger = ConsoleLogger::new(LogLevel::Warn);

            assert!(!logger.is_enabled(LogLevel::Debug));
            assert!(!logger.is_enabled(LogLevel::Info));
            assert!(logger.is_enabled(LogLevel::Warn));
            assert!(logger.is_enabled(LogLevel::Error));
        }

        #[test]
        fn should_keep_level_when_tagged() {
            let logger = ConsoleLogger::with_tag(LogLevel::Debug, "razorgen");
            assert!(logger.is_enabled(LogLevel::Debug));
        }
    }

    mod null_logger_tests {
        use super::*;

        #[test]
        fn should_not_log_anything() {
            let logger = NullLogger::new();

            logger.debug("debug message");
            logger.info("info message");
            logger.warn("warn message");
            logger.error("error message");
        }
    }
}
