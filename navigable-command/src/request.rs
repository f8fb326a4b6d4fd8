use crate::params::Params;
use bon::Builder;
use http::Method;
use serde_json::Value;

/// 请求上下文（Request Context）
///
/// 一次请求在传输层之上的原始视图，参数解析器从这里读取三个通道：
/// - 表单通道：`query`（查询串）与 `form_body`（`application/x-www-form-urlencoded` 请求体）；
/// - 请求体通道：`parsed_body`，由上游解析步骤放置的结构化请求体；
/// - 路径通道：`url_params`，由 Router 在路由匹配后放置的路径参数。
///
/// 典型用法：
/// ```rust
/// use navigable_command::request::RequestContext;
/// use serde_json::json;
///
/// let ctx = RequestContext::builder()
///     .method(http::Method::POST)
///     .path("/notes")
///     .query("search=toast")
///     .parsed_body(json!({ "title": "t" }))
///     .build();
/// assert_eq!(ctx.query(), Some("search=toast"));
/// ```
#[derive(Builder, Default, Debug, Clone)]
pub struct RequestContext {
    #[builder(default)]
    method: Method,
    #[builder(into, default)]
    path: String,
    #[builder(into)]
    query: Option<String>,
    #[builder(into)]
    form_body: Option<String>,
    parsed_body: Option<Value>,
    url_params: Option<Params>,
}

impl RequestContext {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn form_body(&self) -> Option<&str> {
        self.form_body.as_deref()
    }

    pub fn parsed_body(&self) -> Option<&Value> {
        self.parsed_body.as_ref()
    }

    pub fn url_params(&self) -> Option<&Params> {
        self.url_params.as_ref()
    }

    /// 上游解析步骤放置结构化请求体
    pub fn set_parsed_body(&mut self, body: Value) {
        self.parsed_body = Some(body);
    }

    /// Router 放置路由匹配得到的路径参数
    pub fn set_url_params(&mut self, params: Params) {
        self.url_params = Some(params);
    }
}
