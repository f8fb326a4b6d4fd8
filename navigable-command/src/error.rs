//! 命令层统一错误定义
//!
//! - `CommandError`：请求期（dispatch）失败，全部向 Router 传播，不在本层恢复；
//! - `RegistrationError`：加载期（注册）失败，视为启动致命错误；
//! - `ResponseError`：响应参数无法转换为线路层响应的具体原因。
//!
use thiserror::Error;

/// `execute` 未被覆盖时的固定错误信息
pub const EXECUTE_NOT_IMPLEMENTED_MESSAGE: &str = "Class must implement an execute method.";

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{}", EXECUTE_NOT_IMPLEMENTED_MESSAGE)]
    NotImplemented { command: &'static str },

    #[error("invalid response: command={command}, reason={source}")]
    InvalidResponse {
        command: &'static str,
        #[source]
        source: ResponseError,
    },

    #[error("invalid params: {0}")]
    InvalidParams(#[from] serde_json::Error),

    #[error("command failed: command={command}, reason={reason}")]
    Failed {
        command: &'static str,
        reason: String,
    },
}

impl CommandError {
    /// 命令自身业务失败的便捷构造
    pub fn failed(command: &'static str, reason: impl Into<String>) -> Self {
        Self::Failed {
            command,
            reason: reason.into(),
        }
    }
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("command already registered: command={command}")]
    AlreadyRegistered { command: &'static str },

    #[error(
        "route conflict: command={command}, method={method}, path={path}, existing={existing}"
    )]
    RouteConflict {
        command: &'static str,
        method: http::Method,
        path: &'static str,
        existing: &'static str,
    },

    #[error("invalid route: command={command}, path={path}, reason={reason}")]
    InvalidRoute {
        command: &'static str,
        path: &'static str,
        reason: String,
    },
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("invalid status: {0}")]
    InvalidStatus(serde_json::Value),

    #[error("invalid header: {name}")]
    InvalidHeader { name: String },

    #[error("invalid body: key={key}, expected a string")]
    InvalidBody { key: &'static str },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
