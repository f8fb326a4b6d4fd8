//! 请求参数（Params）与参数解析器（ParamsResolver）
//!
//! 解析器从 [`RequestContext`] 的三个来源提取参数并合并为单一映射：
//! - `form`：查询串与表单编码请求体；
//! - `body`：上游预解析的结构化请求体；
//! - `url`：Router 匹配得到的路径参数。
//!
//! 合并优先级（低 → 高）：form → body → url，后者覆盖前者的同名键。
//! 任一来源缺失都退化为空映射，解析过程不会失败。
//!
use crate::error::CommandError;
use crate::request::RequestContext;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::OnceCell;

/// 参数映射：键为规范化后的字符串键，值为 JSON 值
///
/// 表单与路径参数的值总是字符串；请求体参数保留其 JSON 类型。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// 读取字符串值；键不存在或值不是字符串时返回 `None`
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// 将参数反序列化为强类型结构
    ///
    /// 注意表单/路径参数均为字符串，目标字段需与之匹配。
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, CommandError> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// 以 `other` 覆盖同名键
    fn merge(&mut self, other: &Params) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Params
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// 参数解析器
///
/// 作用域为单次请求：每个来源与合并结果各自只计算一次，
/// 重复读取返回同一映射（同一地址），不会重新计算。
pub struct ParamsResolver<'a> {
    ctx: &'a RequestContext,
    form: OnceCell<Params>,
    body: OnceCell<Params>,
    url: OnceCell<Params>,
    merged: OnceCell<Params>,
}

impl<'a> ParamsResolver<'a> {
    pub fn new(ctx: &'a RequestContext) -> Self {
        Self {
            ctx,
            form: OnceCell::new(),
            body: OnceCell::new(),
            url: OnceCell::new(),
            merged: OnceCell::new(),
        }
    }

    /// 查询串 + 表单编码请求体，请求体字段覆盖查询串字段
    pub fn form_params(&self) -> &Params {
        self.form.get_or_init(|| {
            let mut params = Params::new();
            let sources = [self.ctx.query(), self.ctx.form_body()];
            for source in sources.into_iter().flatten() {
                for (key, value) in url::form_urlencoded::parse(source.as_bytes()) {
                    if key.is_empty() {
                        continue;
                    }
                    params.insert(key.into_owned(), value.into_owned());
                }
            }
            params
        })
    }

    pub fn body_params(&self) -> &Params {
        self.body.get_or_init(|| match self.ctx.parsed_body() {
            Some(Value::Object(map)) => Params::from(map.clone()),
            Some(Value::Null) | None => Params::new(),
            Some(other) => {
                tracing::debug!(kind = value_kind(other), "ignoring non-object request body");
                Params::new()
            }
        })
    }

    pub fn url_params(&self) -> &Params {
        self.url
            .get_or_init(|| self.ctx.url_params().cloned().unwrap_or_default())
    }

    /// 合并后的参数映射（form → body → url）
    pub fn to_params(&self) -> &Params {
        self.merged.get_or_init(|| {
            let mut merged = Params::new();
            for source in [self.form_params(), self.body_params(), self.url_params()] {
                merged.merge(source);
            }
            merged
        })
    }

    pub fn into_params(self) -> Params {
        self.to_params();
        self.merged.into_inner().unwrap_or_default()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
