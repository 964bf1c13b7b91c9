use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, error};
use serde_json::json;

use crate::blockchain::LedgerError;

impl ResponseError for LedgerError {
    fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::UnknownPlayer(_) => StatusCode::NOT_FOUND,
            LedgerError::InvalidAmount(_)
            | LedgerError::SelfTransfer
            | LedgerError::InsufficientFunds { .. } => StatusCode::BAD_REQUEST,
            LedgerError::DuplicateRegistration(_) => StatusCode::CONFLICT,
            LedgerError::InternalInvariantViolation(_) | LedgerError::LedgerHalted => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.to_string() }))
    }
}

/// Bad request bodies get the same `{"detail": ...}` shape as domain errors.
pub fn json_error_handler(err: error::JsonPayloadError, _req: &actix_web::HttpRequest) -> error::Error {
    let detail = err.to_string();
    error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(json!({ "detail": detail })),
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn maps_statuses_and_detail_body() {
        let cases = [
            (LedgerError::UnknownPlayer("x".into()), 404),
            (LedgerError::SelfTransfer, 400),
            (
                LedgerError::InsufficientFunds {
                    available: 1,
                    requested: 2,
                },
                400,
            ),
            (LedgerError::InvalidAmount("bad".into()), 400),
            (LedgerError::DuplicateRegistration("x".into()), 409),
            (LedgerError::LedgerHalted, 500),
        ];
        for (err, code) in cases {
            assert_eq!(err.status_code().as_u16(), code);
        }

        let resp = LedgerError::UnknownPlayer("abc".into()).error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["detail"], LedgerError::UnknownPlayer("abc".into()).to_string());
    }
}
