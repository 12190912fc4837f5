//! Smoke test for an SMS service's send endpoint, built on a thin reqwest wrapper
//! with an in-memory mock transport for deterministic tests.

pub mod adapter;
pub mod cli;
pub mod error;
pub mod invoker;
pub mod logger;
pub mod mock;
pub mod sms;

pub use reqwest::Method;

pub use adapter::{
    Client, JSON_CONTENT_TYPE, ReqwestTransport, RestBytes, RestError, RestErrorKind, RestFuture,
    RestRequest, RestResponse, RestResult, RestTransport,
};
pub use cli::{AppArgs, Command, SendArgs};
pub use error::SmokeError;
pub use invoker::{DONE_LINE, Invoker, InvokerConfig, Outcome};
pub use mock::{MockBehavior, MockBehaviorPlan, MockResponse, MockRestAdapter, MockRestStateSnapshot};
pub use sms::{DEFAULT_MESSAGE, DEFAULT_PHONE, DEFAULT_URL, SmsRequest};
