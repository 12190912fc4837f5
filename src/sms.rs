use serde::{Deserialize, Serialize};

use crate::adapter::{Client, RestRequest, RestResult};

pub const DEFAULT_URL: &str = "http://localhost:8003/notifications/send-sms/";
pub const DEFAULT_PHONE: &str = "+251930376854";
pub const DEFAULT_MESSAGE: &str = "Hello! This is a test SMS from the SMS Service.";

/// Body accepted by the SMS service's send endpoint. Fields serialize in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsRequest {
    pub phone: String,
    pub message: String,
}

impl SmsRequest {
    pub fn new(phone: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> RestResult<Vec<u8>> {
        Ok(sonic_rs::to_vec(self)?)
    }

    pub fn to_rest_request(&self, url: impl Into<String>) -> RestResult<RestRequest> {
        Client::json_request(url, self)
    }
}

impl Default for SmsRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PHONE, DEFAULT_MESSAGE)
    }
}
