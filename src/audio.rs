//! HTTP client for the local text-to-speech service.
//!
//! `POST {api_url}/generate-audio` synthesizes one unit's text and returns
//! the raw clip bytes; `GET {api_url}/health` is the cheap connectivity
//! probe used by the settings surface.

use crate::config::Settings;
use crate::error::ReadError;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    voice: &'a str,
    speed: f32,
    speed_boost: f32,
}

pub struct AudioClient {
    http: Client,
}

impl AudioClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("Building HTTP client")?;
        Ok(Self { http })
    }

    /// Synthesize `text` with the current voice and speed settings. Any
    /// non-success status is a hard failure for the unit.
    pub fn generate(&self, settings: &Settings, text: &str) -> Result<Vec<u8>, ReadError> {
        let url = format!("{}/generate-audio", settings.api_url.trim_end_matches('/'));
        let request = SpeechRequest {
            text,
            voice: &settings.voice,
            speed: settings.speed,
            speed_boost: settings.speed_boost,
        };
        let body = serde_json::to_string(&request)
            .map_err(|err| ReadError::Network(err.to_string()))?;

        debug!(chars = text.len(), voice = %settings.voice, "Requesting audio");
        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|err| ReadError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReadError::Http {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .map_err(|err| ReadError::Network(err.to_string()))?;
        debug!(bytes = bytes.len(), "Received audio clip");
        Ok(bytes.to_vec())
    }

    /// True when the service answers the health probe with a success status.
    pub fn health(&self, api_url: &str) -> bool {
        let url = format!("{}/health", api_url.trim_end_matches('/'));
        match self.http.get(&url).send() {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!("Health probe failed: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn read_request(stream: &mut std::net::TcpStream) -> String {
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read header line");
            if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap_or(0);
            }
            if line == "\r\n" {
                break;
            }
        }
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).expect("read body");
        String::from_utf8_lossy(&body).to_string()
    }

    fn respond(stream: &mut std::net::TcpStream, status: &str, body: &[u8]) {
        let header = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(header.as_bytes()).expect("write header");
        stream.write_all(body).expect("write body");
    }

    #[test]
    fn generate_posts_json_and_returns_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let body = read_request(&mut stream);
            respond(&mut stream, "200 OK", b"clip-bytes");
            body
        });

        let mut settings = Settings::default();
        settings.api_url = base;
        let client = AudioClient::new().expect("client");
        let clip = client
            .generate(&settings, "Hello world.")
            .expect("generation should succeed");
        assert_eq!(clip, b"clip-bytes");

        let body = server.join().expect("server thread");
        let request: serde_json::Value = serde_json::from_str(&body).expect("json body");
        assert_eq!(request["text"], "Hello world.");
        assert_eq!(request["voice"], "af_heart");
        assert_eq!(request["speed_boost"], 1.5);
    }

    #[test]
    fn non_success_status_is_a_hard_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let _ = read_request(&mut stream);
            respond(&mut stream, "500 Internal Server Error", b"boom");
        });

        let mut settings = Settings::default();
        settings.api_url = base;
        let client = AudioClient::new().expect("client");
        let err = client
            .generate(&settings, "text")
            .expect_err("500 should fail");
        assert!(matches!(err, ReadError::Http { status: 500 }));
        server.join().expect("server thread");
    }

    #[test]
    fn health_reports_success_status_only() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut line = String::new();
            loop {
                line.clear();
                reader.read_line(&mut line).expect("read header line");
                if line == "\r\n" {
                    break;
                }
            }
            respond(&mut stream, "200 OK", b"{\"status\":\"ok\"}");
        });

        let client = AudioClient::new().expect("client");
        assert!(client.health(&base));
        server.join().expect("server thread");

        // Nothing listening any more: the probe reports disconnected.
        assert!(!client.health("http://127.0.0.1:1"));
    }
}
