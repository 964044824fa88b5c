//! Delivery of a finished invoice to the print endpoint.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::InvoicePayload;

const PRINT_PATH: &str = "print_invoice";

#[derive(Debug, Error)]
pub enum SubmitError {
    /// The server answered with a non-2xx status.
    #[error("API request failed")]
    Status(reqwest::StatusCode),
    /// The request never produced a response.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// The worker running the request went away before reporting.
    #[error("submission was interrupted")]
    Interrupted,
}

/// Something that can take a payload off our hands.
pub trait Submitter {
    fn submit(&self, payload: &InvoicePayload) -> Result<(), SubmitError>;
}

/// Posts the payload as JSON. No retries and no timeout; only the status
/// code is inspected.
pub struct HttpSubmitter {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpSubmitter {
    pub fn new(endpoint: &str) -> Result<Self, SubmitError> {
        // The blocking client times out after 30s unless told otherwise.
        let client = reqwest::blocking::Client::builder().timeout(None).build()?;
        Ok(Self {
            client,
            url: print_url(endpoint),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Submitter for HttpSubmitter {
    fn submit(&self, payload: &InvoicePayload) -> Result<(), SubmitError> {
        debug!(url = %self.url, "posting invoice");
        // `.json()` sets Content-Type: application/json.
        let response = self.client.post(&self.url).json(payload).send()?;

        let status = response.status();
        if status.is_success() {
            info!(%status, "invoice accepted");
            Ok(())
        } else {
            warn!(%status, "invoice rejected");
            Err(SubmitError::Status(status))
        }
    }
}

fn print_url(endpoint: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), PRINT_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InvoiceDraft;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::{Duration, Instant};

    fn one_shot_server(status_line: &'static str) -> (String, thread::JoinHandle<String>) {
        slow_one_shot_server(status_line, Duration::ZERO)
    }

    /// Accepts one connection, captures the request and replies with
    /// `status_line` after `delay`.
    fn slow_one_shot_server(
        status_line: &'static str,
        delay: Duration,
    ) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut head = String::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap();
                }
                head.push_str(&line);
            }
            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).unwrap();
            thread::sleep(delay);

            let response =
                format!("{status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
            reader.get_mut().write_all(response.as_bytes()).unwrap();

            format!("{head}\r\n{}", String::from_utf8(body).unwrap())
        });

        (endpoint, handle)
    }

    fn payload() -> InvoicePayload {
        InvoiceDraft {
            quantity: "10".into(),
            price_after_tax: "5".into(),
            ..InvoiceDraft::default()
        }
        .to_payload()
    }

    #[test]
    fn url_joins_path() {
        assert_eq!(print_url("https://host"), "https://host/print_invoice");
        assert_eq!(print_url("https://host/"), "https://host/print_invoice");
    }

    #[test]
    fn posts_json_and_accepts_2xx() {
        let (endpoint, server) = one_shot_server("HTTP/1.1 201 Created");
        let submitter = HttpSubmitter::new(&endpoint).unwrap();

        submitter.submit(&payload()).unwrap();

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /print_invoice HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(request.contains("\"quantity\":10,"));
        assert!(request.contains("\"price_after_tax\":5,"));
    }

    #[test]
    fn slow_server_is_waited_for() {
        let delay = Duration::from_secs(31);
        let (endpoint, server) = slow_one_shot_server("HTTP/1.1 200 OK", delay);
        let submitter = HttpSubmitter::new(&endpoint).unwrap();

        let started = Instant::now();
        submitter.submit(&payload()).unwrap();
        assert!(started.elapsed() >= delay);
        server.join().unwrap();
    }

    #[test]
    fn non_2xx_is_an_error() {
        let (endpoint, server) = one_shot_server("HTTP/1.1 500 Internal Server Error");
        let submitter = HttpSubmitter::new(&endpoint).unwrap();

        let err = submitter.submit(&payload()).unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, SubmitError::Status(s) if s.as_u16() == 500));
        assert_eq!(err.to_string(), "API request failed");
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let submitter = HttpSubmitter::new(&format!("http://127.0.0.1:{port}")).unwrap();

        let err = submitter.submit(&payload()).unwrap_err();
        assert!(matches!(err, SubmitError::Transport(_)));
    }
}
