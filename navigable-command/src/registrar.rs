use crate::{
    command::{Command, Route},
    dispatch::{self, Endpoint},
    error::RegistrationError,
};
use std::fmt;
use std::marker::PhantomData;

/// 一条待绑定的路由：命令名、路由元数据与入口
#[derive(Clone)]
pub struct RouteBinding {
    pub command: &'static str,
    pub route: Route,
    pub endpoint: Endpoint,
}

impl RouteBinding {
    pub fn of<C: Command>() -> Self {
        Self {
            command: C::NAME,
            route: C::ROUTE,
            endpoint: dispatch::endpoint::<C>(),
        }
    }
}

impl fmt::Debug for RouteBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteBinding")
            .field("command", &self.command)
            .field("route", &self.route)
            .finish_non_exhaustive()
    }
}

/// Router 协作方
///
/// - 负责将路由绑定写入自身的路由表，并在请求匹配时调用入口；
/// - 具体实现可以是进程内路由表，也可以是 HTTP 框架的适配器。
pub trait CommandRouter {
    /// Router 的名称，用于注册表记录与日志
    fn name(&self) -> &str;

    fn bind(&mut self, binding: RouteBinding) -> Result<(), RegistrationError>;
}

/// 注册器（Registrar）
///
/// 绑定到（命令类型 `C`，Router）这一对，`register` 将 `C` 的路由写入 Router。
pub struct Registrar<'r, C, R: ?Sized> {
    router: &'r mut R,
    _command: PhantomData<fn() -> C>,
}

impl<'r, C, R> Registrar<'r, C, R>
where
    C: Command,
    R: CommandRouter + ?Sized,
{
    pub fn new(router: &'r mut R) -> Self {
        Self {
            router,
            _command: PhantomData,
        }
    }

    pub fn register(self) -> Result<(), RegistrationError> {
        let route = C::ROUTE;
        if !route.path.starts_with('/') {
            return Err(RegistrationError::InvalidRoute {
                command: C::NAME,
                path: route.path,
                reason: "path must start with '/'".to_string(),
            });
        }

        self.router.bind(RouteBinding::of::<C>())?;

        tracing::info!(
            command = C::NAME,
            method = %route.method,
            path = route.path,
            router = self.router.name(),
            "command registered"
        );
        Ok(())
    }
}
