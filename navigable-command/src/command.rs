use crate::{error::CommandError, params::Params, response::Response};
use async_trait::async_trait;
use http::Method;

/// 路由绑定元数据：HTTP 方法 + 路径模式
///
/// 路径以 `/` 开头，`:name` 段匹配单个路径片段并作为路径参数提供给命令。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    pub path: &'static str,
}

impl Route {
    pub const fn new(method: Method, path: &'static str) -> Self {
        Self { method, path }
    }

    pub const fn get(path: &'static str) -> Self {
        Self::new(Method::GET, path)
    }

    pub const fn post(path: &'static str) -> Self {
        Self::new(Method::POST, path)
    }

    pub const fn put(path: &'static str) -> Self {
        Self::new(Method::PUT, path)
    }

    pub const fn patch(path: &'static str) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub const fn delete(path: &'static str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// 参数段名称被抹去后的路径形状，`/notes/:id` 与 `/notes/:note_id` 形状相同
    pub fn shape(&self) -> String {
        self.path
            .split('/')
            .map(|segment| match segment.chars().next() {
                Some(':') => ":",
                Some('*') => "*",
                _ => segment,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// 命令（Command）
///
/// 一个可路由的动作：持有单次请求的参数，暴露唯一的动作方法 `execute`。
/// - 每次请求由分发入口以合并后的参数构造，不跨请求复用；
/// - `NAME`：稳定名称，用于日志与注册表，避免依赖 `type_name::<T>()`；
/// - `ROUTE`：由类型决定的路由绑定元数据。
///
/// 实现方只需覆盖 `execute`；未覆盖时分发会以 [`CommandError::NotImplemented`] 失败。
#[async_trait]
pub trait Command: Send + Sync + Sized + 'static {
    const NAME: &'static str;

    const ROUTE: Route;

    /// 以参数映射构造命令，参数需原样保存
    fn new(params: Params) -> Self;

    fn params(&self) -> &Params;

    /// 产出响应的唯一途径，响应参数原样传入 [`Response`]
    fn render(&self, response_params: impl Into<Params>) -> Response {
        Response::new(response_params.into())
    }

    async fn execute(&self) -> Result<Response, CommandError> {
        Err(CommandError::NotImplemented { command: Self::NAME })
    }
}
