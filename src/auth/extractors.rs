use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;

/// The caller as seen by `AuthMiddleware`: the verified token claims, or nobody.
///
/// Extraction never fails. Turning an anonymous identity into a 401 is the job of
/// [`Access::evaluate`](crate::access::Access::evaluate), which knows whether the action
/// allows anonymous callers.
#[derive(Debug, Clone, Default)]
pub struct Identity(Option<Claims>);

impl Identity {
    pub fn anonymous() -> Self {
        Identity(None)
    }

    pub fn from_claims(claims: Claims) -> Self {
        Identity(Some(claims))
    }

    pub fn user_id(&self) -> Option<i32> {
        self.0.as_ref().map(|claims| claims.sub)
    }
}

impl FromRequest for Identity {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Identity(req.extensions().get::<Claims>().cloned())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    #[actix_rt::test]
    async fn test_identity_from_claims_in_extensions() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(Claims { sub: 123, exp: 0 });

        let mut payload = Payload::None;
        let identity = Identity::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(identity.user_id(), Some(123));
    }

    #[actix_rt::test]
    async fn test_identity_without_claims_is_anonymous() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let identity = Identity::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(identity.user_id(), None);
    }
}
