use crate::{
    command::{Command, Route},
    error::RegistrationError,
    registrar::{CommandRouter, Registrar},
};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::any::TypeId;

/// 已注册命令的记录
#[derive(Debug, Clone)]
pub struct RegisteredCommand {
    pub name: &'static str,
    pub route: Route,
    pub router: String,
}

/// 命令注册表
/// - 以命令的 TypeId 为键，保证每个命令类型只注册一次、只绑定到一个 Router
/// - 注册失败时不留下记录，错误原样返回给调用方（启动期致命）
#[derive(Default)]
pub struct CommandRegistry {
    entries: DashMap<TypeId, RegisteredCommand>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册命令：以（`C`，`router`）构造 [`Registrar`] 并调用其 `register`
    pub fn register<C, R>(&self, router: &mut R) -> Result<(), RegistrationError>
    where
        C: Command,
        R: CommandRouter + ?Sized,
    {
        match self.entries.entry(TypeId::of::<C>()) {
            Entry::Occupied(_) => Err(RegistrationError::AlreadyRegistered { command: C::NAME }),
            Entry::Vacant(slot) => {
                Registrar::<C, R>::new(router).register()?;
                slot.insert(RegisteredCommand {
                    name: C::NAME,
                    route: C::ROUTE,
                    router: router.name().to_string(),
                });
                Ok(())
            }
        }
    }

    pub fn is_registered<C: Command>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<C>())
    }

    pub fn get<C: Command>(&self) -> Option<RegisteredCommand> {
        self.entries
            .get(&TypeId::of::<C>())
            .map(|entry| entry.value().clone())
    }

    /// 获取已注册的命令名列表（只读视图）
    pub fn registered_commands(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.value().name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
