use std::{
    io::Write,
    net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::anyhow;
use tracing::{error, info, span, Level, Span};

use crate::{
    request::{EndOfFile, Request, RequestReader},
    response_writer::ResponseWriter,
    status::ReasonPhrase,
};

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

pub trait Handler {
    fn handle(&self, w: &mut ResponseWriter, r: &mut Request);
}

impl<T> Handler for T
where
    T: Fn(&mut ResponseWriter, &mut Request),
{
    fn handle(&self, w: &mut ResponseWriter, r: &mut Request) {
        self(w, r)
    }
}

/// A bound listener. Each accepted connection is served on its own thread.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    read_timeout: Option<Duration>,
    stopped: Arc<AtomicBool>,
}

impl Server {
    pub fn bind(addr: impl ToSocketAddrs) -> anyhow::Result<Self> {
        Ok(Self {
            listener: TcpListener::bind(addr)?,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            stopped: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until a [`ServerHandle`] stops the server.
    ///
    /// Returns once every connection thread has finished.
    pub fn serve(&self, handler: &(impl Handler + Sync)) {
        let read_timeout = self.read_timeout;
        let stopped = &*self.stopped;
        thread::scope(|s| {
            for stream in self.listener.incoming() {
                if stopped.load(Ordering::SeqCst) {
                    break;
                }
                let stream = match stream {
                    Ok(stream) => stream,
                    Err(err) => {
                        error!(?err);
                        continue;
                    }
                };

                s.spawn(move || {
                    let span = create_conn_span(&stream);
                    let _guard = span.enter();
                    info!("new conn");

                    if let Err(err) = handle_connection(stream, read_timeout, stopped, handler) {
                        error!(?err);
                    }

                    info!("conn end");
                });
            }
        });
        info!("server stopped");
    }

    /// Serves on a background thread.
    pub fn start<H>(self, handler: H) -> anyhow::Result<ServerHandle>
    where
        H: Handler + Send + Sync + 'static,
    {
        let addr = self.local_addr()?;
        let stopped = Arc::clone(&self.stopped);
        let thread = thread::Builder::new()
            .name("server".to_owned())
            .spawn(move || self.serve(&handler))?;
        info!(%addr, "server started");
        Ok(ServerHandle {
            addr,
            stopped,
            thread,
        })
    }
}

/// Owns a server started with [`Server::start`].
///
/// Stopping from a connection thread of the same server deadlocks: the serve
/// loop waits for that very thread.
#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    stopped: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting, then waits for open connections to finish.
    pub fn stop(self) -> anyhow::Result<()> {
        self.stopped.store(true, Ordering::SeqCst);
        // wake the accept loop
        if let Err(err) = TcpStream::connect(self.addr) {
            error!(?err);
        }
        self.thread
            .join()
            .map_err(|_| anyhow!("server thread panicked"))
    }
}

#[derive(Debug)]
enum ConnCtrl {
    KeepAlive,
    Close,
}

fn handle_connection(
    stream: TcpStream,
    read_timeout: Option<Duration>,
    stopped: &AtomicBool,
    handler: &impl Handler,
) -> anyhow::Result<()> {
    let (reader, writer) = (&stream, &stream);
    reader.set_read_timeout(read_timeout)?;
    let mut request_reader = RequestReader::new(reader);

    while !stopped.load(Ordering::SeqCst) {
        match handle_request(&mut request_reader, writer, handler)? {
            ConnCtrl::KeepAlive => continue,
            ConnCtrl::Close => return Ok(()),
        }
    }
    Ok(())
}

fn handle_request(
    request_reader: &mut RequestReader<&TcpStream>,
    mut writer: &TcpStream,
    handler: &impl Handler,
) -> anyhow::Result<ConnCtrl> {
    let mut r = match request_reader.read() {
        Ok(r) => r,
        Err(err) => {
            if err.downcast_ref::<EndOfFile>().is_some() {
                return Ok(ConnCtrl::Close);
            }

            error!(?err);
            let mut w = ResponseWriter::new_empty();
            w.set_reason_phrase(ReasonPhrase::BadRequest);
            writer.write_all(&w.write())?;
            return Ok(ConnCtrl::Close);
        }
    };

    let span = create_req_span(&r);
    let _guard = span.enter();

    let conn_ctrl = if r.wants_close() {
        ConnCtrl::Close
    } else {
        ConnCtrl::KeepAlive
    };

    let mut w = ResponseWriter::new_empty();
    handler.handle(&mut w, &mut r);
    info!(status = ?w.get_status_code());
    writer.write_all(&w.write())?;
    Ok(conn_ctrl)
}

fn create_conn_span(stream: &TcpStream) -> Span {
    let peer_addr = match stream.peer_addr() {
        Ok(addr) => addr.to_string(),
        Err(err) => {
            error!(?err);
            "unknown".to_owned()
        }
    };

    span!(Level::INFO, "conn", peer_addr = peer_addr.as_str())
}

fn create_req_span(r: &Request) -> Span {
    span!(
        Level::INFO,
        "req",
        method = r.get_http_method(),
        target = r.get_request_target()
    )
}

#[cfg(test)]
pub fn noop_handler() -> impl Handler {
    |_: &mut ResponseWriter, _: &mut Request| {}
}
