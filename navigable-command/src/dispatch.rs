//! 分发入口（Dispatch Entry Point）
//!
//! Router 对每个匹配的请求调用一次：解析参数 → 构造命令 → 执行动作 →
//! 校验并转换响应。所有失败原样向 Router 传播，本层不做恢复或重试。
//!
use crate::{
    command::Command,
    error::CommandError,
    params::ParamsResolver,
    request::RequestContext,
    response::WireResponse,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type EndpointFuture = Pin<Box<dyn Future<Output = Result<WireResponse, CommandError>> + Send>>;

/// 类型擦除后的命令入口，由 Router 按路由保存
pub type Endpoint = Arc<dyn Fn(RequestContext) -> EndpointFuture + Send + Sync>;

/// 以请求上下文分发命令 `C`
#[tracing::instrument(level = "debug", skip_all, fields(command = C::NAME))]
pub async fn call<C: Command>(ctx: RequestContext) -> Result<WireResponse, CommandError> {
    let params = ParamsResolver::new(&ctx).into_params();
    tracing::debug!(params = params.len(), "dispatching command");

    let command = C::new(params);
    let response = command.execute().await?;

    response
        .into_wire()
        .map_err(|source| CommandError::InvalidResponse {
            command: C::NAME,
            source,
        })
}

/// 构造命令 `C` 的入口
pub fn endpoint<C: Command>() -> Endpoint {
    Arc::new(|ctx: RequestContext| -> EndpointFuture { Box::pin(call::<C>(ctx)) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{command::Route, params::Params, response::Response};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    static SEEN: Mutex<Vec<Params>> = Mutex::new(Vec::new());

    struct Recorder {
        params: Params,
    }

    #[async_trait]
    impl Command for Recorder {
        const NAME: &'static str = "Recorder";
        const ROUTE: Route = Route::get("/recorder/:id");

        fn new(params: Params) -> Self {
            SEEN.lock().unwrap().push(params.clone());
            Self { params }
        }

        fn params(&self) -> &Params {
            &self.params
        }

        async fn execute(&self) -> Result<Response, CommandError> {
            Ok(self.render([("json", Value::Object(self.params.clone().into_inner()))]))
        }
    }

    struct Silent {
        params: Params,
    }

    impl Command for Silent {
        const NAME: &'static str = "Silent";
        const ROUTE: Route = Route::get("/silent");

        fn new(params: Params) -> Self {
            Self { params }
        }

        fn params(&self) -> &Params {
            &self.params
        }
    }

    struct BadStatus {
        params: Params,
    }

    #[async_trait]
    impl Command for BadStatus {
        const NAME: &'static str = "BadStatus";
        const ROUTE: Route = Route::get("/bad-status");

        fn new(params: Params) -> Self {
            Self { params }
        }

        fn params(&self) -> &Params {
            &self.params
        }

        async fn execute(&self) -> Result<Response, CommandError> {
            Ok(self.render([("status", "teapot")]))
        }
    }

    #[tokio::test]
    async fn constructs_command_with_merged_params() {
        let ctx = RequestContext::builder()
            .query("search=toast")
            .parsed_body(json!({ "title": "title", "description": "description" }))
            .url_params(Params::from([("id", "123")]))
            .build();

        let wire = call::<Recorder>(ctx).await.unwrap();

        let expected = Params::from([
            ("search", "toast"),
            ("title", "title"),
            ("description", "description"),
            ("id", "123"),
        ]);
        assert!(SEEN.lock().unwrap().contains(&expected));
        let body: Params = serde_json::from_slice(wire.body()).unwrap();
        assert_eq!(body, expected);
    }

    #[tokio::test]
    async fn unoverridden_execute_fails_with_not_implemented() {
        let err = call::<Silent>(RequestContext::default()).await.unwrap_err();
        assert!(matches!(err, CommandError::NotImplemented { command: "Silent" }));
    }

    #[tokio::test]
    async fn malformed_response_fails_with_invalid_response() {
        let err = call::<BadStatus>(RequestContext::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::InvalidResponse {
                command: "BadStatus",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn endpoint_is_type_erased_call() {
        let endpoint = endpoint::<Recorder>();
        let wire = endpoint(RequestContext::default()).await.unwrap();
        assert_eq!(wire.status(), http::StatusCode::OK);
        assert_eq!(wire.body().as_ref(), b"{}");
    }
}
