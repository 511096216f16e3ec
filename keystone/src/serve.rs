use anonymous_user::{AnonymousUserLayer, Principal};
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use shared::http::{full_body, make_boxed_error_response, run_http_service};
use std::future::Future;
use std::pin::Pin;
use tower::Layer;

use crate::config::AnonymousUserServerConfig;
use crate::errors::KeystoneError;

/// Reports the anonymous identifier attached to the request.
///
/// `/` answers with the identifier, or 204 when the request carries none
/// (authenticated or evicted visitors). `/health` answers `ok`.
pub struct VisitorService {
    claim_type: String,
}

impl VisitorService {
    pub fn new(claim_type: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
        }
    }
}

impl<B> Service<Request<B>> for VisitorService
where
    B: Send + 'static,
{
    type Response = Response<BoxBody<Bytes, KeystoneError>>;
    type Error = KeystoneError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let visitor_id = req
            .extensions()
            .get::<Principal>()
            .and_then(|principal| principal.find_first(&self.claim_type))
            .map(|claim| claim.value.clone());
        let path = req.uri().path().to_string();

        Box::pin(async move {
            let res = match (path.as_str(), visitor_id) {
                ("/health", _) => Response::new(full_body("ok\n")),
                ("/", Some(visitor_id)) => Response::new(full_body(format!("{visitor_id}\n"))),
                ("/", None) => {
                    let mut res = Response::new(full_body(Bytes::new()));
                    *res.status_mut() = StatusCode::NO_CONTENT;
                    res
                }
                _ => make_boxed_error_response(StatusCode::NOT_FOUND),
            };
            Ok(res)
        })
    }
}

pub async fn serve(config: &AnonymousUserServerConfig) -> Result<(), KeystoneError> {
    let options = config.options()?;
    tracing::info!(
        cookie = %options.cookie_name,
        claim_type = %options.claim_type,
        secure = options.secure,
        "Starting anonymous user server"
    );

    let service = VisitorService::new(options.claim_type.clone());
    let service = AnonymousUserLayer::new(options)?.layer(service);

    run_http_service(&config.listener.host, config.listener.port, service).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use anonymous_user::{AnonymousUserOptions, Claim, ClaimsIdentity, Identity};
    use http::header::{COOKIE, SET_COOKIE};
    use http_body_util::BodyExt;

    const CLAIM_TYPE: &str = "urn:visitor:id";

    async fn body_string(res: Response<BoxBody<Bytes, KeystoneError>>) -> String {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_reports_claim() {
        let service = VisitorService::new(CLAIM_TYPE);
        let mut req = Request::builder().uri("/").body(()).unwrap();
        req.extensions_mut()
            .insert(Principal::new(Identity::Claims(ClaimsIdentity::new(vec![
                Claim::new(CLAIM_TYPE, "visitor-1"),
            ]))));

        let res = service.call(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_string(res).await, "visitor-1\n");
    }

    #[tokio::test]
    async fn test_no_claim_and_unknown_paths() {
        let service = VisitorService::new(CLAIM_TYPE);

        let res = service
            .call(Request::builder().uri("/").body(()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = service
            .call(Request::builder().uri("/health").body(()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_string(res).await, "ok\n");

        let res = service
            .call(Request::builder().uri("/missing").body(()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_behind_middleware() {
        let options = AnonymousUserOptions::new(CLAIM_TYPE)
            .with_identifier_factory(|_| "minted-id".to_string());
        let service = AnonymousUserLayer::new(options)
            .unwrap()
            .layer(VisitorService::new(CLAIM_TYPE));

        let res = service
            .call(Request::builder().uri("/").body(()).unwrap())
            .await
            .unwrap();
        let set_cookie = res.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with("tid=bWludGVkLWlk;"));
        assert_eq!(body_string(res).await, "minted-id\n");

        // base64("RANDOM")
        let req = Request::builder()
            .uri("/")
            .header(COOKIE, "tid=UkFORE9N")
            .body(())
            .unwrap();
        let res = service.call(req).await.unwrap();
        assert!(res.headers().get(SET_COOKIE).is_none());
        assert_eq!(body_string(res).await, "RANDOM\n");

        let req = Request::builder()
            .uri("/")
            .header(COOKIE, "tid=%%%")
            .body(())
            .unwrap();
        assert!(matches!(
            service.call(req).await,
            Err(KeystoneError::AnonymousUser(_))
        ));
    }
}
