use std::io::Cursor;

use curl::easy::{Easy, List};
use serde::Serialize;

use super::{Error, Response};

/// Refuses to run against a libcurl that is too old or lacks TLS.
pub fn check_version() -> Result<(), String> {
    let version = curl::Version::get();
    let num = version.version_num();
    let major = (num >> 16) & 0xFF;
    let minor = (num >> 8) & 0xFF;

    // As of writing, this is the oldest supported curl in Debian 10.
    if !(major > 7 || (major == 7 && minor >= 64)) {
        return Err("System libcurl is too old! Minimum required: 7.64.0".into());
    }

    if version.ssl_version().is_none() {
        return Err("libcurl doesn't seem to have SSL support".into());
    }

    Ok(())
}

#[derive(Clone)]
pub struct Client {
    user_agent: Box<str>,
}

enum Method {
    Get,
    Post,
    Patch,
}

pub struct Request {
    method: Method,
    user_agent: Box<str>,
    header_list: List,
    url: Box<str>,
    body: Option<Vec<u8>>,
}

impl Client {
    pub fn new(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }

    fn request(&self, method: Method, url: &str) -> Request {
        Request {
            method,
            user_agent: self.user_agent.clone(),
            header_list: List::new(),
            url: url.into(),
            body: None,
        }
    }

    pub fn get(&self, url: &str) -> Request {
        self.request(Method::Get, url)
    }

    pub fn post(&self, url: &str) -> Request {
        self.request(Method::Post, url)
    }

    pub fn patch(&self, url: &str) -> Request {
        self.request(Method::Patch, url)
    }
}

fn transport(err: curl::Error) -> Error {
    Error::Transport(err.description().into())
}

impl Request {
    pub fn set(mut self, header: &str, value: &str) -> Self {
        let header = String::from(header) + ": " + value;
        self.header_list.append(&header).expect("out of memory");
        self
    }

    pub fn send_json(mut self, data: impl Serialize) -> Result<Response, Error> {
        let body = serde_json::to_vec(&data)
            .map_err(|e| Error::Transport(format!("unable to serialize request: {}", e).into()))?;

        self.body = Some(body);
        self.set("Content-Type", "application/json").call()
    }

    pub fn call(self) -> Result<Response, Error> {
        let mut curl = Easy::new();

        match self.method {
            Method::Get => curl.get(true).map_err(transport)?,
            Method::Post => curl.post(true).map_err(transport)?,
            Method::Patch => curl.custom_request("PATCH").map_err(transport)?,
        }

        if let Some(body) = &self.body {
            curl.post_fields_copy(body).map_err(transport)?;
        }

        curl.useragent(&self.user_agent).map_err(transport)?;
        curl.url(&self.url).map_err(transport)?;
        curl.follow_location(true).map_err(transport)?;
        curl.max_redirections(10).map_err(transport)?;
        curl.http_headers(self.header_list).map_err(transport)?;

        let mut response = Vec::with_capacity(8192);
        {
            let mut transfer = curl.transfer();

            transfer
                .write_function(|src| {
                    response.extend_from_slice(src);
                    Ok(src.len())
                })
                .map_err(transport)?;

            transfer.perform().map_err(transport)?;
        }

        let response_code = curl.response_code().map_err(transport)?;

        let response = Response {
            reader: Box::new(Cursor::new(response)),
        };

        if response_code >= 400 {
            return Err(Error::Status(response_code as u16, response));
        };

        Ok(response)
    }
}
