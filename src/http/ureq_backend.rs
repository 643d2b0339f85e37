use serde::Serialize;
use ureq;

use super::{Error, Response};

pub fn check_version() -> Result<(), String> {
    Ok(())
}

#[derive(Clone)]
pub struct Client {
    agent: ureq::Agent,
}

pub struct Request {
    inner: ureq::Request,
}

impl Client {
    pub fn new(user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new().user_agent(user_agent).build();
        Self { agent }
    }

    pub fn get(&self, url: &str) -> Request {
        Request {
            inner: self.agent.get(url),
        }
    }

    pub fn post(&self, url: &str) -> Request {
        Request {
            inner: self.agent.post(url),
        }
    }

    pub fn patch(&self, url: &str) -> Request {
        Request {
            inner: self.agent.request("PATCH", url),
        }
    }
}

fn convert(result: Result<ureq::Response, ureq::Error>) -> Result<Response, Error> {
    result
        .map_err(|e| match e {
            ureq::Error::Status(code, resp) => Error::Status(
                code,
                Response {
                    reader: resp.into_reader(),
                },
            ),
            ureq::Error::Transport(tp) => Error::Transport(tp.to_string().into()),
        })
        .map(|resp| Response {
            reader: resp.into_reader(),
        })
}

impl Request {
    pub fn set(mut self, header: &str, value: &str) -> Self {
        self.inner = self.inner.set(header, value);
        self
    }

    pub fn send_json(self, data: impl Serialize) -> Result<Response, Error> {
        convert(self.inner.send_json(data))
    }

    pub fn call(self) -> Result<Response, Error> {
        convert(self.inner.call())
    }
}
