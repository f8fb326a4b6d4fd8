//! 响应（Response）
//!
//! 命令通过 `render` 产出的规范化响应对象。响应参数原样保存，
//! 仅在转换为线路层响应（[`WireResponse`]）时解释：
//! - `status`：HTTP 状态码，缺省 200；
//! - `headers`：字符串值构成的对象；
//! - 响应体取第一个出现的 `json` / `html` / `text` / `body`。
//!
use crate::error::ResponseError;
use crate::params::Params;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::StatusCode;
use serde_json::Value;

/// 线路层响应，交还给 Router
pub type WireResponse = http::Response<Bytes>;

const JSON_CONTENT_TYPE: &str = "application/json";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    params: Params,
}

impl Response {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn status(&self) -> Result<StatusCode, ResponseError> {
        match self.params.get("status") {
            None => Ok(StatusCode::OK),
            Some(value) => value
                .as_u64()
                .and_then(|code| u16::try_from(code).ok())
                .and_then(|code| StatusCode::from_u16(code).ok())
                .ok_or_else(|| ResponseError::InvalidStatus(value.clone())),
        }
    }

    /// 转换为线路层响应；响应参数不合法时返回 [`ResponseError`]
    pub fn into_wire(self) -> Result<WireResponse, ResponseError> {
        let status = self.status()?;
        let (content_type, body) = self.body()?;

        let mut response = http::Response::new(body);
        *response.status_mut() = status;

        let headers = response.headers_mut();
        if let Some(content_type) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }

        match self.params.get("headers") {
            None | Some(Value::Null) => {}
            Some(Value::Object(map)) => {
                for (name, value) in map {
                    let invalid = || ResponseError::InvalidHeader { name: name.clone() };
                    let header_name =
                        HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
                    let header_value = value
                        .as_str()
                        .and_then(|v| HeaderValue::from_str(v).ok())
                        .ok_or_else(invalid)?;
                    headers.insert(header_name, header_value);
                }
            }
            Some(_) => {
                return Err(ResponseError::InvalidHeader {
                    name: "headers".to_string(),
                });
            }
        }

        Ok(response)
    }

    fn body(&self) -> Result<(Option<&'static str>, Bytes), ResponseError> {
        if let Some(json) = self.params.get("json") {
            let bytes = serde_json::to_vec(json)?;
            return Ok((Some(JSON_CONTENT_TYPE), Bytes::from(bytes)));
        }

        let text_keys = [
            ("html", Some(HTML_CONTENT_TYPE)),
            ("text", Some(TEXT_CONTENT_TYPE)),
            ("body", None),
        ];
        for (key, content_type) in text_keys {
            if let Some(value) = self.params.get(key) {
                let text = value.as_str().ok_or(ResponseError::InvalidBody { key })?;
                return Ok((content_type, Bytes::from(text.to_owned())));
            }
        }

        Ok((None, Bytes::new()))
    }
}
