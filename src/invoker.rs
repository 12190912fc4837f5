use std::io::Write;
use std::time::Duration;

use log::{info, warn};

use crate::adapter::{Client, RestErrorKind, RestRequest, RestResponse, RestResult};
use crate::error::SmokeError;
use crate::sms::{DEFAULT_URL, SmsRequest};

pub const DONE_LINE: &str = "Done.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvokerConfig {
    pub url: String,
    pub sms: SmsRequest,
    pub timeout: Option<Duration>,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            sms: SmsRequest::default(),
            timeout: None,
        }
    }
}

/// What happened to the single request of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Any HTTP status counts, including 4xx and 5xx.
    Responded { status: u16 },
    Failed { kind: RestErrorKind },
}

impl Outcome {
    /// Process exit code, following curl's numbering for transport failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Responded { .. } => 0,
            Self::Failed { kind } => match kind {
                RestErrorKind::Connect => 7,
                RestErrorKind::Timeout => 28,
                RestErrorKind::Send => 55,
                RestErrorKind::Receive => 56,
                RestErrorKind::Parse | RestErrorKind::Internal => 1,
            },
        }
    }

    pub fn is_responded(&self) -> bool {
        matches!(self, Self::Responded { .. })
    }
}

pub struct Invoker {
    client: Client,
}

impl Invoker {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Posts `config.sms` to `config.url` and writes the transcript to `out`.
    ///
    /// The transcript always ends with [`DONE_LINE`], whatever the endpoint did.
    pub async fn send_sms<W: Write>(
        &self,
        config: &InvokerConfig,
        out: &mut W,
    ) -> Result<Outcome, SmokeError> {
        writeln!(out, "Target: {}", config.url)?;

        let outcome = match config.sms.to_rest_request(config.url.as_str()) {
            Ok(request) => {
                let request = request.with_optional_timeout(config.timeout);
                writeln!(out, "Payload: {}", body_text(&request))?;
                info!("sending SMS request to {}", config.url);
                report(self.client.execute(request).await, out)?
            }
            Err(err) => {
                writeln!(out, "error: {err}")?;
                Outcome::Failed { kind: err.kind() }
            }
        };

        writeln!(out, "{DONE_LINE}")?;
        out.flush()?;
        Ok(outcome)
    }

    /// Issues a GET to `url` and reports whether anything answered.
    pub async fn probe<W: Write>(
        &self,
        url: &str,
        timeout: Option<Duration>,
        out: &mut W,
    ) -> Result<Outcome, SmokeError> {
        writeln!(out, "Testing connection to {url}...")?;

        let request = RestRequest::get(url).with_optional_timeout(timeout);
        let outcome = match self.client.execute(request).await {
            Ok(response) => {
                writeln!(out, "Success! Status: {}", response.status())?;
                Outcome::Responded {
                    status: response.status(),
                }
            }
            Err(err) => {
                warn!("connection test failed: {err}");
                writeln!(out, "Failed to connect.")?;
                Outcome::Failed { kind: err.kind() }
            }
        };

        writeln!(out, "{DONE_LINE}")?;
        out.flush()?;
        Ok(outcome)
    }
}

fn body_text(request: &RestRequest) -> String {
    request
        .body
        .as_ref()
        .map(|body| String::from_utf8_lossy(body).into_owned())
        .unwrap_or_default()
}

fn report<W: Write>(
    result: RestResult<RestResponse>,
    out: &mut W,
) -> Result<Outcome, SmokeError> {
    match result {
        Ok(response) => {
            if !response.is_success() {
                info!("endpoint answered with status {}", response.status());
            }
            writeln!(out, "{}", response.text())?;
            Ok(Outcome::Responded {
                status: response.status(),
            })
        }
        Err(err) => {
            warn!("SMS request failed: {err}");
            writeln!(out, "error: {err}")?;
            Ok(Outcome::Failed { kind: err.kind() })
        }
    }
}
