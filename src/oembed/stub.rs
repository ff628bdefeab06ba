//! In-process oEmbed endpoint for tests.

use std::{
    sync::{Arc, Mutex, mpsc::Sender},
    thread::JoinHandle,
};

use rouille::{Response, Server};

pub struct StubEndpoint {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
    stop: Option<(JoinHandle<()>, Sender<()>)>,
}

impl StubEndpoint {
    /// Serves `body` with `status` for every request on an ephemeral port.
    pub fn start(status: u16, body: &str) -> Self {
        let body = body.to_string();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        let server = Server::new("127.0.0.1:0", move |request| {
            seen.lock().unwrap().push(request.raw_url().to_string());
            Response::text(body.clone()).with_status_code(status)
        })
        .unwrap();
        let url = format!("http://{}/oembed", server.server_addr());

        Self {
            url,
            requests,
            stop: Some(server.stoppable()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubEndpoint {
    fn drop(&mut self) {
        if let Some((handle, stop)) = self.stop.take() {
            let _ = stop.send(());
            let _ = handle.join();
        }
    }
}
