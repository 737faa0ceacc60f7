use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use bastion_core::{Locale, errors::AppException};

/// JSON body that has passed its `Validate` rules.
///
/// Both a malformed body and a rule violation reject with `InvalidParam`;
/// the details list one entry per problem, in the language named by the
/// `locale` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

fn rejection_detail(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "missing 'Content-Type: application/json' header".to_string()
        }
        other => other.body_text(),
    }
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppException;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let locale = Locale::from_headers(req.headers());

        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppException::invalid_param([rejection_detail(&rejection)]))?;

        value
            .validate()
            .map_err(|errors| AppException::from_validation(&errors, locale))?;

        Ok(ValidatedJson(value))
    }
}
