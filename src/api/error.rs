use actix_web::{
    HttpRequest, HttpResponse, ResponseError,
    error::{InternalError, JsonPayloadError, QueryPayloadError},
    http::StatusCode,
};
use serde_json::json;

use crate::leave::LeaveError;

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::NotFound(_) => StatusCode::NOT_FOUND,
            LeaveError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LeaveError::InvalidRequest(_)
            | LeaveError::InvalidRange(_)
            | LeaveError::Overlap { .. }
            | LeaveError::IllegalTransition { .. } => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            LeaveError::Persistence(e) => {
                tracing::error!(error = %e, "Leave store failure");
                json!({ "message": "Internal Server Error" })
            }
            LeaveError::Overlap { conflicting } => json!({
                "message": self.to_string(),
                "conflicts": conflicting,
            }),
            other => json!({ "message": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

fn bad_request<E>(err: E) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let response = HttpResponse::BadRequest().json(json!({ "message": err.to_string() }));
    InternalError::from_response(err, response).into()
}

/// Turns body deserialization failures into `400 {"message": ...}`.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    bad_request(err)
}

/// Same shape for malformed query strings, e.g. an unparseable search date.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    bad_request(err)
}
