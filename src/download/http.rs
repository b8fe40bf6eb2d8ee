//! Blocking HTTP [`Transport`] on `ureq`.

use super::Transport;
use crate::error::{OptimizeError, Result};
use crate::utils::url::{join, normalize};
use std::io::Read;
use std::time::Duration;

const REDIRECT_STATUS: [u16; 5] = [301, 302, 303, 307, 308];
const MAX_REDIRECTS: usize = 10;
const USER_AGENT: &str = "Mozilla";

pub struct HttpTransport {
    agent: ureq::Agent,
    /// Redirects disabled: used to observe each `Location` hop.
    no_redirects: ureq::Agent,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(3))
            .timeout_read(Duration::from_secs(3))
            .user_agent(USER_AGENT)
            .build();
        let no_redirects = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(3))
            .timeout_read(Duration::from_secs(1))
            .redirects(0)
            .user_agent(USER_AGENT)
            .build();
        Self { agent, no_redirects }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .agent
            .get(&normalize(url))
            .call()
            .map_err(|e| OptimizeError::download(url, e))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| OptimizeError::download(url, e))?;
        Ok(bytes)
    }

    fn follow_redirects(&self, url: &str) -> Result<String> {
        let mut current = url.to_string();
        for _ in 0..MAX_REDIRECTS {
            let response = match self.no_redirects.get(&normalize(&current)).call() {
                Ok(response) | Err(ureq::Error::Status(_, response)) => response,
                Err(e) => return Err(OptimizeError::download(&current, e)),
            };
            if !REDIRECT_STATUS.contains(&response.status()) {
                return Ok(current);
            }

            let location = response
                .header("Location")
                .ok_or_else(|| OptimizeError::download(&current, "redirect without location"))?;
            current = join(&current, location);
        }
        Err(OptimizeError::download(url, "too many redirects"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tiny_http::{Header, Response, Server};

    /// Serve a fixed set of paths; every other path answers 404.
    fn serve(routes: Vec<(&'static str, u16, Option<&'static str>, &'static str)>) -> String {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        thread::spawn(move || {
            for request in server.incoming_requests() {
                let route = routes.iter().find(|(path, ..)| *path == request.url());
                let response = match route {
                    Some((_, status, location, body)) => {
                        let mut response = Response::from_string(*body).with_status_code(*status);
                        if let Some(location) = location {
                            response = response
                                .with_header(Header::from_bytes("Location", *location).unwrap());
                        }
                        response
                    }
                    None => Response::from_string("not found").with_status_code(404),
                };
                let _ = request.respond(response);
            }
        });
        format!("http://127.0.0.1:{port}")
    }

    #[test]
    fn test_get_body() {
        let root = serve(vec![("/lib.js", 200, None, "var lib;")]);
        let transport = HttpTransport::new();
        assert_eq!(transport.get(&format!("{root}/lib.js")).unwrap(), b"var lib;");
    }

    #[test]
    fn test_get_missing_is_download_failure() {
        let root = serve(vec![]);
        let err = HttpTransport::new().get(&format!("{root}/gone.js")).unwrap_err();
        assert!(matches!(err, OptimizeError::DownloadFailure { .. }));
    }

    #[test]
    fn test_follow_relative_redirects() {
        let root = serve(vec![
            ("/vue@2", 302, Some("/vue@2.7.14"), ""),
            ("/vue@2.7.14", 301, Some("/vue@2.7.14/dist/vue.js"), ""),
            ("/vue@2.7.14/dist/vue.js", 200, None, "var Vue;"),
        ]);
        let resolved = HttpTransport::new()
            .follow_redirects(&format!("{root}/vue@2"))
            .unwrap();
        assert_eq!(resolved, format!("{root}/vue@2.7.14/dist/vue.js"));
    }

    #[test]
    fn test_no_redirect_returns_same_url() {
        let root = serve(vec![("/lib", 200, None, "x")]);
        let url = format!("{root}/lib");
        assert_eq!(HttpTransport::new().follow_redirects(&url).unwrap(), url);
    }
}
