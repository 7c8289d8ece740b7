//! One-shot HTTP responder for integration tests.

use std::io::{self, BufRead as _, BufReader, Read as _, Write as _};
use std::net::{TcpListener, TcpStream};
use std::thread;

use anyhow::Context as _;
use reqwest::Url;

use crate::Result;

/// A request as it arrived: the head lines and the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    pub head: String,
    pub body: String,
}

/// Serves the canned `responses` in order, one per connection.
///
/// Joining the handle yields every received request once all responses are sent.
pub fn serve<S>(responses: Vec<S>) -> Result<(Url, thread::JoinHandle<io::Result<Vec<Received>>>)>
where
    S: AsRef<str> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").context("Could not bind test server")?;
    let base_url = Url::parse(&format!("http://{}/", listener.local_addr()?))?;
    let handle = thread::spawn(move || {
        responses
            .iter()
            .map(|response| {
                let (stream, _) = listener.accept()?;
                respond(stream, response.as_ref())
            })
            .collect()
    });
    Ok((base_url, handle))
}

fn respond(stream: TcpStream, response: &str) -> io::Result<Received> {
    let mut reader = BufReader::new(stream);
    let mut head = String::new();
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        if line == "\r\n" || line.is_empty() {
            break;
        }
        if let Some(len) = line.to_lowercase().strip_prefix("content-length:") {
            content_length = len.trim().parse().unwrap_or(0);
        }
        head.push_str(&line);
    }
    // the body is drained before replying so the client never sees a reset
    let mut body = vec![0; content_length];
    reader.read_exact(&mut body)?;
    reader.get_mut().write_all(response.as_bytes())?;
    Ok(Received {
        head,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
