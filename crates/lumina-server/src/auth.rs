//! Bearer-token identity provider.
//!
//! Every `/api` request must carry `Authorization: Bearer <token>`. The token
//! is hashed and looked up; on success the resident's [`Requester`] is
//! attached to the request for the API handlers.

use axum::{
  extract::{Request, State},
  http::{HeaderMap, header},
  middleware::Next,
  response::Response,
};
use lumina_core::{BookingService, resident::Requester, store::BookingStore};

use crate::{AppState, error::Error};

/// Pull the raw token out of an `Authorization: Bearer …` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let (scheme, token) = value.split_once(' ').ok_or(Error::Unauthorized)?;
  if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
    return Err(Error::Unauthorized);
  }
  Ok(token.trim())
}

/// Resolve the presented credential to a requester.
pub async fn verify_bearer<S: BookingStore>(
  headers: &HeaderMap,
  bookings: &BookingService<S>,
) -> Result<Requester, Error> {
  let token = bearer_token(headers)?;
  let resident = bookings.authenticate(token).await?.ok_or(Error::Unauthorized)?;
  Ok(Requester::from(&resident))
}

/// Middleware guarding the API: rejects with 401 or injects the requester.
pub async fn require_bearer<S: BookingStore + 'static>(
  State(state): State<AppState<S>>,
  mut req: Request,
  next: Next,
) -> Result<Response, Error> {
  let requester = verify_bearer(req.headers(), &state.bookings).await?;
  tracing::debug!(resident_id = %requester.resident_id, "authenticated");
  req.extensions_mut().insert(requester);
  Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn extracts_bearer_token() {
    assert_eq!(bearer_token(&headers("Bearer abc123")).unwrap(), "abc123");
    assert_eq!(bearer_token(&headers("bearer  abc123 ")).unwrap(), "abc123");
  }

  #[test]
  fn missing_header() {
    assert!(matches!(bearer_token(&HeaderMap::new()), Err(Error::Unauthorized)));
  }

  #[test]
  fn wrong_scheme() {
    assert!(matches!(
      bearer_token(&headers("Basic dXNlcjpwYXNz")),
      Err(Error::Unauthorized)
    ));
    assert!(matches!(bearer_token(&headers("Bearer ")), Err(Error::Unauthorized)));
  }
}
