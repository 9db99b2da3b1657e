use axum::http::Request;
use axum::response::{IntoResponse, Response};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};
use tokio::time::Sleep;
use tower::{Layer, Service};

use crate::utils::error::AppError;

/// Bounds the whole request, including every store, directory and encoder
/// call made on its behalf. An elapsed request answers with a transient
/// `DEPENDENT_SERVICE_ERROR` and the handler future is dropped.
#[derive(Clone)]
pub struct RequestTimeoutLayer {
    timeout: Duration,
}

impl RequestTimeoutLayer {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl<S> Layer<S> for RequestTimeoutLayer {
    type Service = RequestTimeoutService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestTimeoutService {
            inner,
            timeout: self.timeout,
        }
    }
}

#[derive(Clone)]
pub struct RequestTimeoutService<S> {
    inner: S,
    timeout: Duration,
}

impl<S, ReqBody> Service<Request<ReqBody>> for RequestTimeoutService<S>
where
    S: Service<Request<ReqBody>, Response = Response>,
{
    type Response = Response;
    type Error = S::Error;
    type Future = RequestTimeoutFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        RequestTimeoutFuture {
            future: self.inner.call(request),
            sleep: tokio::time::sleep(self.timeout),
            timeout: self.timeout,
        }
    }
}

#[pin_project::pin_project]
pub struct RequestTimeoutFuture<F> {
    #[pin]
    future: F,
    #[pin]
    sleep: Sleep,
    timeout: Duration,
}

impl<F, E> Future for RequestTimeoutFuture<F>
where
    F: Future<Output = Result<Response, E>>,
{
    type Output = Result<Response, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        if let Poll::Ready(result) = this.future.poll(cx) {
            return Poll::Ready(result);
        }

        match this.sleep.poll(cx) {
            Poll::Ready(()) => {
                tracing::warn!(timeout_ms = this.timeout.as_millis() as u64, "Request timed out");
                let err = AppError::DependentServiceError(format!(
                    "request exceeded {}ms",
                    this.timeout.as_millis()
                ));
                Poll::Ready(Ok(err.into_response()))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
