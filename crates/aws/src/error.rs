use aws_sdk_elasticloadbalancingv2::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use cloudsweep_core::ResourceError;

/// Map an AWS SDK failure raised by `operation` onto a [`ResourceError`].
///
/// Only the SDK error variant decides the mapping. Request timeouts become
/// [`ResourceError::Timeout`] and dispatch failures become
/// [`ResourceError::Connection`]. Everything the service itself returned is a
/// [`ResourceError::Remote`] carrying the service's code and message verbatim.
pub fn classify_sdk_error<E, R>(operation: &str, err: &SdkError<E, R>) -> ResourceError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug + 'static,
{
    match err {
        SdkError::TimeoutError(_) => ResourceError::Timeout(context(err)),
        SdkError::DispatchFailure(failure) if failure.is_timeout() => {
            ResourceError::Timeout(context(err))
        }
        SdkError::DispatchFailure(_) => ResourceError::Connection(context(err)),
        SdkError::ServiceError(_) => ResourceError::remote(operation, service_message(err)),
        _ => ResourceError::remote(operation, context(err)),
    }
}

fn context<E, R>(err: &SdkError<E, R>) -> String
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug + 'static,
{
    DisplayErrorContext(err).to_string()
}

/// `"<code>: <message>"` as reported by the service.
fn service_message<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug + 'static,
{
    match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (Some(code), None) => code.to_owned(),
        (None, _) => context(err),
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_elasticloadbalancingv2::error::ErrorMetadata;
    use aws_sdk_elasticloadbalancingv2::operation::delete_rule::DeleteRuleError;

    use super::*;

    fn service_error(code: &str, message: &str) -> SdkError<DeleteRuleError, ()> {
        let meta = ErrorMetadata::builder().code(code).message(message).build();
        SdkError::service_error(DeleteRuleError::generic(meta), ())
    }

    #[test]
    fn service_error_keeps_code_and_message() {
        let err = classify_sdk_error(
            "DeleteRule",
            &service_error("RuleNotFound", "One or more rules not found"),
        );
        match err {
            ResourceError::Remote { operation, message } => {
                assert_eq!(operation, "DeleteRule");
                assert_eq!(message, "RuleNotFound: One or more rules not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn service_error_text_is_never_inspected() {
        let arn = "arn:aws:elasticloadbalancing:us-east-1:123456789012:\
                   listener-rule/app/dns-edge/abc/network-gw/timeout-123";
        let err = classify_sdk_error(
            "DeleteRule",
            &service_error("RuleNotFound", &format!("One or more rules not found: {arn}")),
        );
        assert!(matches!(err, ResourceError::Remote { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn throttling_from_the_service_is_passed_through() {
        let err = service_error("Throttling", "Rate exceeded");
        let err = classify_sdk_error("DescribeRules", &err);
        assert_eq!(
            err.to_string(),
            "DescribeRules failed: Throttling: Rate exceeded"
        );
    }

    #[test]
    fn operation_not_permitted_is_remote() {
        let err = classify_sdk_error(
            "DeleteRule",
            &service_error("OperationNotPermitted", "Default rules cannot be deleted"),
        );
        assert!(matches!(err, ResourceError::Remote { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn timeout_variant_maps_to_timeout() {
        let err: SdkError<DeleteRuleError, ()> = SdkError::timeout_error("request timed out");
        let err = classify_sdk_error("DeleteRule", &err);
        assert!(matches!(err, ResourceError::Timeout(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn construction_failure_is_remote_not_connection() {
        let err: SdkError<DeleteRuleError, ()> =
            SdkError::construction_failure("connection string missing");
        let err = classify_sdk_error("DeleteRule", &err);
        assert!(matches!(err, ResourceError::Remote { .. }));
    }
}
