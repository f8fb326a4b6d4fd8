use crate::{
    command::Command,
    error::RegistrationError,
    registrar::CommandRouter,
    registry::CommandRegistry,
};

/// 应用（App）
///
/// 持有当前活动的 Router 与命令注册表，由启动代码显式构造并拥有其生命周期，
/// 命令通过 `command::<C>()` 显式注册，取代“声明即注册”的隐式钩子。
///
/// ```rust
/// use navigable_command::{App, InMemoryRouter};
///
/// let app = App::new(InMemoryRouter::default());
/// assert!(app.registry().is_empty());
/// ```
pub struct App<R> {
    router: R,
    registry: CommandRegistry,
}

impl<R: CommandRouter> App<R> {
    pub fn new(router: R) -> Self {
        Self {
            router,
            registry: CommandRegistry::new(),
        }
    }

    /// 注册命令 `C`，可链式调用
    pub fn command<C: Command>(mut self) -> Result<Self, RegistrationError> {
        self.register::<C>()?;
        Ok(self)
    }

    pub fn register<C: Command>(&mut self) -> Result<(), RegistrationError> {
        self.registry.register::<C, R>(&mut self.router)
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn into_router(self) -> R {
        self.router
    }
}
