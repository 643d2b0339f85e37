use chrono::{Local, NaiveDateTime};
use serde_json::Value;

use crate::config::{ChatId, Config};
use crate::http::{Client, Error};

use super::{PushChannel, PushError};

pub struct Telegram {
    client: Client,
    token: Box<str>,
    chat_id: ChatId,
}

impl Telegram {
    /// Both the token and the chat id are needed, otherwise there is no
    /// channel at all.
    pub fn from_config(config: &Config, client: Client) -> Option<Self> {
        let token = config.telegram_token.clone()?;
        let chat_id = config.telegram_chat_id.clone()?;

        Some(Self {
            client,
            token,
            chat_id,
        })
    }

    // The token is part of the URL, so it can show up in transport errors.
    fn redact(&self, text: &str) -> Box<str> {
        if self.token.is_empty() {
            return text.into();
        }
        text.replace(&*self.token, "<REDACTED>").into()
    }
}

fn message_text(now: NaiveDateTime, message: &str) -> String {
    format!("{}\n\n{}", now.format("%Y-%m-%d %H:%M:%S"), message)
}

fn send_message_body(chat_id: &ChatId, silent: bool, text: &str) -> Value {
    serde_json::json!({
        "chat_id": chat_id,
        "disable_notification": silent,
        "text": text,
    })
}

impl PushChannel for Telegram {
    fn push(&self, message: &str, silent: bool) -> Result<(), PushError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);

        let text = message_text(Local::now().naive_local(), message);
        let response = self
            .client
            .post(&url)
            .send_json(send_message_body(&self.chat_id, silent, &text));

        match response {
            Ok(_) => Ok(()),
            Err(Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(PushError::Status(code, self.redact(&body)))
            }
            Err(Error::Transport(reason)) => Err(PushError::Transport(self.redact(&reason))),
        }
    }
}
