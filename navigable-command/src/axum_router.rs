//! axum 适配器（AxumRouter）
//!
//! 将命令绑定为 axum 路由，并承担进入命令层之前的上游步骤：
//! - 读取请求体（受 `body_limit` 限制）；
//! - `application/json` 请求体预解析为结构化请求体；
//! - `application/x-www-form-urlencoded` 请求体作为表单通道；
//! - 路径参数写入请求上下文。
//!
//! 命令层向上传播的 `CommandError` 在这里收口为 HTTP 响应并记录日志。
//!
use crate::{
    command::Route,
    dispatch::Endpoint,
    error::{CommandError, RegistrationError},
    params::Params,
    registrar::{CommandRouter, RouteBinding},
    request::RequestContext,
};
use axum::body::{Body, to_bytes};
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Request};
use axum::http::{StatusCode, header::CONTENT_LENGTH, header::CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodFilter, on};
use std::collections::HashMap;

/// 请求体读取上限缺省值（2 MiB）
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

pub struct AxumRouter {
    name: String,
    router: axum::Router,
    bound: Vec<(&'static str, Route)>,
    body_limit: usize,
}

impl Default for AxumRouter {
    fn default() -> Self {
        Self::new("axum")
    }
}

impl AxumRouter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            router: axum::Router::new(),
            bound: Vec::new(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    pub fn into_router(self) -> axum::Router {
        self.router
    }
}

impl CommandRouter for AxumRouter {
    fn name(&self) -> &str {
        &self.name
    }

    fn bind(&mut self, binding: RouteBinding) -> Result<(), RegistrationError> {
        let RouteBinding {
            command,
            route,
            endpoint,
        } = binding;

        // axum 同一路径的各方法共用一张路由表：形状相同而参数名不同的路径
        // 即便方法不同也会直接 panic，这里提前拒绝；同一路径换方法仍允许
        let shape = route.shape();
        if let Some(&(existing, _)) = self.bound.iter().find(|(_, bound)| {
            bound.shape() == shape && (bound.path != route.path || bound.method == route.method)
        }) {
            return Err(RegistrationError::RouteConflict {
                command,
                method: route.method,
                path: route.path,
                existing,
            });
        }

        let filter = MethodFilter::try_from(route.method.clone()).map_err(|err| {
            RegistrationError::InvalidRoute {
                command,
                path: route.path,
                reason: err.to_string(),
            }
        })?;

        let body_limit = self.body_limit;
        let handler =
            move |path: Result<Path<HashMap<String, String>>, PathRejection>, request: Request| {
                handle(endpoint, body_limit, path, request)
            };

        self.router = std::mem::take(&mut self.router).route(route.path, on(filter, handler));
        self.bound.push((command, route));
        Ok(())
    }
}

async fn handle(
    endpoint: Endpoint,
    body_limit: usize,
    path: Result<Path<HashMap<String, String>>, PathRejection>,
    request: Request,
) -> Response {
    // 路径参数无法解码时拒绝请求，不能让同名的请求体参数顶替
    let url_params = match path {
        Ok(Path(params)) => Some(params.into_iter().collect::<Params>()),
        Err(PathRejection::MissingPathParams(_)) => None,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected path params");
            return rejection.into_response();
        }
    };

    let ctx = match into_context(body_limit, url_params, request).await {
        Ok(ctx) => ctx,
        Err(rejection) => return rejection,
    };

    match endpoint(ctx).await {
        Ok(wire) => wire.map(Body::from).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn into_context(
    body_limit: usize,
    url_params: Option<Params>,
    request: Request,
) -> Result<RequestContext, Response> {
    let (parts, body) = request.into_parts();

    let declared_length = parts
        .headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if declared_length.is_some_and(|length| length > body_limit) {
        return Err(StatusCode::PAYLOAD_TOO_LARGE.into_response());
    }

    let bytes = to_bytes(body, body_limit).await.map_err(|err| {
        tracing::debug!(error = %err, "failed to read request body");
        StatusCode::BAD_REQUEST.into_response()
    })?;

    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let mut parsed_body = None;
    let mut form_body = None;
    if !bytes.is_empty() {
        if content_type.starts_with("application/json") {
            let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|err| {
                tracing::debug!(error = %err, "malformed json body");
                (StatusCode::BAD_REQUEST, "malformed json body").into_response()
            })?;
            parsed_body = Some(value);
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            form_body = Some(String::from_utf8_lossy(&bytes).into_owned());
        }
    }

    Ok(RequestContext::builder()
        .method(parts.method)
        .path(parts.uri.path())
        .maybe_query(parts.uri.query())
        .maybe_form_body(form_body)
        .maybe_parsed_body(parsed_body)
        .maybe_url_params(url_params)
        .build())
}

impl IntoResponse for CommandError {
    fn into_response(self) -> Response {
        match &self {
            CommandError::InvalidParams(_) => {
                tracing::warn!(error = %self, "rejected request params");
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            _ => {
                tracing::error!(error = %self, "command dispatch failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        command::Command, registry::CommandRegistry, response::Response as CommandResponse,
    };
    use async_trait::async_trait;
    use axum::http::Request as HttpRequest;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct Echo {
        params: Params,
    }

    #[async_trait]
    impl Command for Echo {
        const NAME: &'static str = "Echo";
        const ROUTE: Route = Route::post("/echo/:id");

        fn new(params: Params) -> Self {
            Self { params }
        }

        fn params(&self) -> &Params {
            &self.params
        }

        async fn execute(&self) -> Result<CommandResponse, CommandError> {
            Ok(self.render([("json", Value::Object(self.params.clone().into_inner()))]))
        }
    }

    struct Unfinished {
        params: Params,
    }

    impl Command for Unfinished {
        const NAME: &'static str = "Unfinished";
        const ROUTE: Route = Route::get("/unfinished");

        fn new(params: Params) -> Self {
            Self { params }
        }

        fn params(&self) -> &Params {
            &self.params
        }
    }

    struct EchoAgain {
        params: Params,
    }

    impl Command for EchoAgain {
        const NAME: &'static str = "EchoAgain";
        const ROUTE: Route = Route::post("/echo/:echo_id");

        fn new(params: Params) -> Self {
            Self { params }
        }

        fn params(&self) -> &Params {
            &self.params
        }
    }

    struct ShowEcho {
        params: Params,
    }

    impl Command for ShowEcho {
        const NAME: &'static str = "ShowEcho";
        const ROUTE: Route = Route::get("/echo/:id");

        fn new(params: Params) -> Self {
            Self { params }
        }

        fn params(&self) -> &Params {
            &self.params
        }
    }

    struct PatchEcho {
        params: Params,
    }

    impl Command for PatchEcho {
        const NAME: &'static str = "PatchEcho";
        const ROUTE: Route = Route::patch("/echo/:echo_id");

        fn new(params: Params) -> Self {
            Self { params }
        }

        fn params(&self) -> &Params {
            &self.params
        }
    }

    fn app() -> axum::Router {
        let registry = CommandRegistry::new();
        let mut router = AxumRouter::default().with_body_limit(1024);
        registry.register::<Echo, _>(&mut router).unwrap();
        registry.register::<Unfinished, _>(&mut router).unwrap();
        router.into_router()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn json_request_merges_all_sources() {
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/echo/123?search=toast&title=query")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"title":"t","id":"body"}"#))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "search": "toast", "title": "t", "id": "123" })
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn form_request_is_parsed_as_form_params() {
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/echo/7")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("title=hello+world"))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(
            body_json(response).await,
            json!({ "title": "hello world", "id": "7" })
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn malformed_json_is_bad_request() {
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/echo/7")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn oversized_body_is_rejected() {
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/echo/7")
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, "4096")
            .body(Body::from(vec![b' '; 4096]))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn not_implemented_surfaces_as_server_error() {
        let request = HttpRequest::builder()
            .uri("/unfinished")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn unknown_route_is_not_found() {
        let request = HttpRequest::builder()
            .uri("/missing")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn overlapping_route_is_a_conflict() {
        let registry = CommandRegistry::new();
        let mut router = AxumRouter::default();
        registry.register::<Echo, _>(&mut router).unwrap();

        let err = registry.register::<EchoAgain, _>(&mut router).unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::RouteConflict {
                command: "EchoAgain",
                existing: "Echo",
                ..
            }
        ));
    }

    #[test]
    fn same_shape_under_another_method_is_a_conflict() {
        let registry = CommandRegistry::new();
        let mut router = AxumRouter::default();
        registry.register::<Echo, _>(&mut router).unwrap();

        let err = registry.register::<PatchEcho, _>(&mut router).unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::RouteConflict {
                command: "PatchEcho",
                existing: "Echo",
                ..
            }
        ));
        assert!(!registry.is_registered::<PatchEcho>());
    }

    #[test]
    fn same_path_under_another_method_is_allowed() {
        let registry = CommandRegistry::new();
        let mut router = AxumRouter::default();
        registry.register::<Echo, _>(&mut router).unwrap();
        registry.register::<ShowEcho, _>(&mut router).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn path_params_are_percent_decoded() {
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/echo/a%20b")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "id": "a b" }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn undecodable_path_param_is_bad_request() {
        // 非 UTF-8 的路径段不能被请求体中的同名参数顶替
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/echo/%FF")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"id":"other"}"#))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
