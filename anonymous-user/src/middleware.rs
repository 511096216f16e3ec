use http::{Request, Response};
use hyper::service::Service;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::assigner::IdentityAssigner;
use crate::config::AnonymousUserOptions;
use crate::errors::{AnonymousUserError, ValidationError};

/// Runs the [`IdentityAssigner`] in front of `inner` and adds the resulting
/// cookies to its response.
///
/// Errors are reported through the inner service's error type, so it must be
/// able to absorb an [`AnonymousUserError`].
pub struct AnonymousUserService<S> {
    inner: Arc<S>,
    assigner: IdentityAssigner,
}

impl<S> AnonymousUserService<S> {
    pub fn new(inner: S, assigner: IdentityAssigner) -> Self {
        Self {
            inner: Arc::new(inner),
            assigner,
        }
    }
}

impl<S> Clone for AnonymousUserService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            assigner: self.assigner.clone(),
        }
    }
}

impl<S, B, ResBody> Service<Request<B>> for AnonymousUserService<S>
where
    S: Service<Request<B>, Response = Response<ResBody>> + Send + Sync + 'static,
    S::Future: Send + 'static,
    S::Error: From<AnonymousUserError> + Send + 'static,
    B: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, mut req: Request<B>) -> Self::Future {
        let inner = self.inner.clone();
        let assigner = self.assigner.clone();

        Box::pin(async move {
            let cookies = assigner.process(&mut req).await?;
            let mut response = inner.call(req).await?;
            cookies.write_to(response.headers_mut())?;
            Ok(response)
        })
    }
}

/// Tower layer wrapping services in an [`AnonymousUserService`].
#[derive(Clone, Debug)]
pub struct AnonymousUserLayer {
    assigner: IdentityAssigner,
}

impl AnonymousUserLayer {
    pub fn new(options: AnonymousUserOptions) -> Result<Self, ValidationError> {
        Ok(Self {
            assigner: IdentityAssigner::new(options)?,
        })
    }
}

impl<S> tower::Layer<S> for AnonymousUserLayer {
    type Service = AnonymousUserService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AnonymousUserService::new(inner, self.assigner.clone())
    }
}
