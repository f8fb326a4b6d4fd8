//! 基于 HTTP Router 的命令分发层（navigable-command）
//!
//! 每个可路由的动作表达为一个 [`Command`] 类型：
//! - 启动时经 [`CommandRegistry`] / [`App`] 显式注册到 Router；
//! - 每次请求由分发入口（[`dispatch::call`]）解析 form / body / url 三个来源的参数并合并，
//!   以合并结果构造命令并调用 `execute`；
//! - `execute` 通过 `render` 产出规范化的 [`Response`]，再转换为线路层响应交还 Router。
//!
//! Router 是外部协作方，只通过 [`CommandRouter`] 这一窄接口接入：
//! 内置 [`InMemoryRouter`]，启用 `axum` 特性后提供 `AxumRouter`。
//!
pub mod app;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod inmemory_router;
pub mod params;
pub mod registrar;
pub mod registry;
pub mod request;
pub mod response;

#[cfg(feature = "axum")]
pub mod axum_router;

pub use app::App;
pub use command::{Command, Route};
pub use error::{CommandError, RegistrationError, ResponseError};
pub use inmemory_router::InMemoryRouter;
pub use params::{Params, ParamsResolver};
pub use registrar::{CommandRouter, Registrar, RouteBinding};
pub use registry::CommandRegistry;
pub use request::RequestContext;
pub use response::{Response, WireResponse};

#[cfg(feature = "axum")]
pub use axum_router::AxumRouter;
