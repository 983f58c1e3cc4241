#[cfg(feature = "tracing")]
macro_rules! create_span {
    ($s:expr, $($field:tt)*) => {
        if $s == tracing::Level::TRACE {
            tracing::trace_span!($($field)*)
        } else if $s == tracing::Level::DEBUG {
            tracing::debug_span!($($field)*)
        } else if $s == tracing::Level::INFO {
            tracing::info_span!($($field)*)
        } else if $s == tracing::Level::WARN {
            tracing::warn_span!($($field)*)
        } else {
            tracing::error_span!($($field)*)
        }
    }
}

/// Instruments a connection future with `$span` and logs its error, if any.
#[cfg(feature = "tracing")]
macro_rules! instrument_result {
    ($fut:expr, $span:expr) => {{
        let fut = async {
            $fut.await.or_else(|e| {
                match &e {
                    $crate::error::Error::Server(server_error) => {
                        match server_error.code {
                            // Access denied for user
                            1045 => tracing::warn!(error = %e),
                            // Unknown database
                            1049 => tracing::warn!(error = %e),
                            _ => tracing::error!(error = %e),
                        }
                    }
                    $crate::error::Error::Driver(
                        $crate::error::DriverError::IncompatibleCredentials { .. },
                    ) => {
                        tracing::warn!(error = %e);
                    }
                    _ => {
                        tracing::error!(error = %e);
                    }
                }
                Err(e)
            })
        };
        <_ as tracing::Instrument>::instrument(fut, $span)
    }};
}
