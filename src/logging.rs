use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup console logging on stderr.
///
/// `RUST_LOG` wins when set. Otherwise this crate logs at `debug` when
/// `verbose` is on and at `info` when it is off; other crates log warnings only.
///
/// # Returns
/// `true` if the subscriber was installed, `false` if one was already set.
pub fn setup_logging(verbose: bool) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("Logging initialized: verbose={}", verbose);
    }
    installed
}

fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_follows_verbose() {
        assert_eq!(default_directive(true), "warn,vypack=debug");
        assert_eq!(default_directive(false), "warn,vypack=info");
    }

    #[test]
    fn test_second_setup_is_a_no_op() {
        // The first call may lose to another test installing a subscriber.
        let _ = setup_logging(false);
        assert!(!setup_logging(true));
    }
}
