use space_core::error::StoreError;

/// Map a client error onto the store taxonomy. HTTP 404 becomes [`StoreError::NotFound`].
pub(crate) fn store_error(e: kube::Error) -> StoreError {
    match e {
        kube::Error::Api(ae) if ae.code == 404 => StoreError::NotFound(ae.message),
        other => StoreError::Backend(other.to_string()),
    }
}

pub(crate) fn is_not_found(e: &kube::Error) -> bool {
    matches!(e, kube::Error::Api(ae) if ae.code == 404)
}

#[cfg(test)]
mod tests {
    use kube::error::ErrorResponse;

    use super::*;

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".into(),
            message: format!("status {code}"),
            reason: String::new(),
            code,
        })
    }

    #[test]
    fn not_found_is_recognized() {
        assert!(is_not_found(&api_error(404)));
        assert!(matches!(store_error(api_error(404)), StoreError::NotFound(_)));
    }

    #[test]
    fn other_statuses_are_backend_errors() {
        assert!(!is_not_found(&api_error(409)));
        assert!(matches!(store_error(api_error(500)), StoreError::Backend(ref m) if m.contains("500")));
    }
}
