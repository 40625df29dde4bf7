//! Internal helpers for mapping HTTP/reqwest errors to [`RenderError`].

use pubkb_types::RenderError;

/// Map a non-2xx HTTP status (received before any chunk) to a [`RenderError`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> RenderError {
    RenderError::Http {
        status: status.as_u16(),
        body: body.to_string(),
    }
}

/// Map a [`reqwest::Error`] raised while sending the request to a
/// [`RenderError`]. Errors raised after the stream opened are mapped at the
/// read loop instead.
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> RenderError {
    RenderError::Transport(Box::new(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_body_are_preserved() {
        let err = map_http_status(reqwest::StatusCode::NOT_FOUND, "no such endpoint");
        assert!(matches!(
            err,
            RenderError::Http { status: 404, ref body } if body == "no such endpoint"
        ));
    }

    #[test]
    fn server_errors_are_retryable() {
        let err = map_http_status(reqwest::StatusCode::BAD_GATEWAY, "bad gateway");
        assert!(err.is_retryable());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let err = map_http_status(reqwest::StatusCode::BAD_REQUEST, "malformed query");
        assert!(!err.is_retryable());
    }

    #[test]
    fn empty_body_preserved_in_error() {
        let err = map_http_status(reqwest::StatusCode::BAD_REQUEST, "");
        assert!(matches!(err, RenderError::Http { ref body, .. } if body.is_empty()));
    }
}
