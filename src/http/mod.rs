#[cfg(all(feature = "curl", feature = "ureq"))]
compile_error!("The features `curl` and `ureq` must not be enabled together!");

#[cfg(feature = "curl")]
mod curl_backend;

#[cfg(feature = "ureq")]
mod ureq_backend;

use std::io::{self, Read};

use serde::de::DeserializeOwned;

#[cfg(feature = "curl")]
pub use curl_backend::{check_version, Client};

#[cfg(feature = "ureq")]
pub use ureq_backend::{check_version, Client};

/// Upper bound on how much of a response body is ever read into memory.
const MAX_BODY: u64 = 2 * 1024 * 1024;

pub struct Response {
    pub(self) reader: Box<dyn Read>,
}

pub enum Error {
    Status(u16, Response),
    Transport(Box<str>),
}

impl Response {
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, io::Error> {
        serde_json::from_reader(self.reader.take(MAX_BODY))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn into_string(self) -> Result<String, io::Error> {
        let mut vec = Vec::with_capacity(1024);
        self.reader.take(MAX_BODY).read_to_end(&mut vec)?;
        String::from_utf8(vec).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
impl Response {
    pub fn from_bytes(bytes: &'static [u8]) -> Self {
        Self {
            reader: Box::new(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_decoded_as_json() {
        let response = Response::from_bytes(br#"{"ip": "1.2.3.4"}"#);
        let value = response.into_json::<serde_json::Value>().unwrap();
        assert_eq!(value["ip"], "1.2.3.4");
    }

    #[test]
    fn garbage_body_is_invalid_data() {
        let response = Response::from_bytes(b"<html>");
        let err = response.into_json::<serde_json::Value>().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
