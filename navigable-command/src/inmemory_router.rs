//! 内存路由表（InMemoryRouter）
//!
//! 进程内的 `CommandRouter` 实现：按（方法，路径模式）保存入口，
//! 请求到达时逐段匹配，`:name` 段写入路径参数后调用入口。
//! 典型用途：测试、示例与无需 HTTP 框架的嵌入场景。
//!
use crate::{
    command::Route,
    dispatch::Endpoint,
    error::{CommandError, RegistrationError},
    params::Params,
    registrar::{CommandRouter, RouteBinding},
    request::RequestContext,
    response::WireResponse,
};
use bytes::Bytes;
use http::StatusCode;
use percent_encoding::percent_decode_str;

struct RouteEntry {
    command: &'static str,
    route: Route,
    endpoint: Endpoint,
}

pub struct InMemoryRouter {
    name: String,
    routes: Vec<RouteEntry>,
}

impl Default for InMemoryRouter {
    fn default() -> Self {
        Self::new("inmemory")
    }
}

impl InMemoryRouter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routes: Vec::new(),
        }
    }

    /// 已绑定的路由（命令名，路由）
    pub fn routes(&self) -> impl Iterator<Item = (&'static str, &Route)> {
        self.routes.iter().map(|entry| (entry.command, &entry.route))
    }

    /// 路由并分发一次请求；没有匹配的路由时返回 404
    pub async fn call(&self, mut ctx: RequestContext) -> Result<WireResponse, CommandError> {
        let matched = self.routes.iter().find_map(|entry| {
            if entry.route.method != *ctx.method() {
                return None;
            }
            match_path(entry.route.path, ctx.path()).map(|params| (entry, params))
        });

        let Some((entry, url_params)) = matched else {
            tracing::debug!(method = %ctx.method(), path = ctx.path(), "no route matched");
            return Ok(not_found());
        };

        ctx.set_url_params(url_params);
        (entry.endpoint)(ctx).await
    }
}

impl CommandRouter for InMemoryRouter {
    fn name(&self) -> &str {
        &self.name
    }

    fn bind(&mut self, binding: RouteBinding) -> Result<(), RegistrationError> {
        let shape = binding.route.shape();
        if let Some(existing) = self
            .routes
            .iter()
            .find(|entry| entry.route.method == binding.route.method && entry.route.shape() == shape)
        {
            return Err(RegistrationError::RouteConflict {
                command: binding.command,
                method: binding.route.method,
                path: binding.route.path,
                existing: existing.command,
            });
        }

        self.routes.push(RouteEntry {
            command: binding.command,
            route: binding.route,
            endpoint: binding.endpoint,
        });
        Ok(())
    }
}

/// 逐段匹配路径，成功时返回 `:name` 段捕获的参数
///
/// 捕获值按百分号编码解码；解码结果不是合法 UTF-8 的段不匹配。
fn match_path(pattern: &str, path: &str) -> Option<Params> {
    let path = if path.is_empty() { "/" } else { path };
    let mut pattern_segments = pattern.trim_end_matches('/').split('/');
    let mut path_segments = path.trim_end_matches('/').split('/');
    let mut params = Vec::new();

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return Some(params.into_iter().collect()),
            (Some(expected), Some(actual)) => match expected.strip_prefix(':') {
                Some(name) if !actual.is_empty() => {
                    let value = percent_decode_str(actual).decode_utf8().ok()?;
                    params.push((name, value.into_owned()));
                }
                Some(_) => return None,
                None if expected == actual => {}
                None => return None,
            },
            _ => return None,
        }
    }
}

fn not_found() -> WireResponse {
    let mut response = http::Response::new(Bytes::from_static(b"Not Found"));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}
