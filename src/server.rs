use std::{future::Future, io, net::SocketAddr, sync::Arc};

use tokio::{
    io::{AsyncRead, AsyncWrite, BufReader},
    net::{TcpListener, ToSocketAddrs},
};
use tracing::{debug, info, warn};

use crate::{
    bank::local::SharedLedger,
    dispatch::dispatch,
    framing::{read_frame, write_frame},
};

/// Serves one shared ledger to any number of clients, one task per
/// connection.
pub struct BankServer {
    listener: TcpListener,
    ledger: SharedLedger,
}

impl BankServer {
    pub async fn bind<A: ToSocketAddrs>(addr: A, ledger: SharedLedger) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, ledger })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until accepting fails.
    pub async fn run(self) -> io::Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Accepts connections until `shutdown` completes. Connections already
    /// being served keep their tasks.
    pub async fn run_until<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        info!(addr = %self.local_addr()?, "listening");
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, peer) = accepted?;
                    info!(%peer, "new connection");
                    if let Err(err) = stream.set_nodelay(true) {
                        warn!(%peer, %err, "failed to disable Nagle's algorithm");
                    }
                    let ledger = Arc::clone(&self.ledger);
                    tokio::spawn(async move {
                        match handle_connection(stream, ledger).await {
                            Ok(()) => info!(%peer, "connection closed"),
                            Err(err) => warn!(%peer, %err, "connection failed"),
                        }
                    });
                }
                () = &mut shutdown => {
                    info!("shutting down");
                    return Ok(());
                }
            }
        }
    }
}

/// Serves requests on one connection until the peer disconnects or I/O
/// fails.
///
/// The ledger lock is taken per request, only around dispatching; reading
/// the request and writing the reply happen without it.
pub async fn handle_connection<S>(stream: S, ledger: SharedLedger) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);

    while let Some(request) = read_frame(&mut reader).await? {
        let response = {
            let mut ledger = ledger.lock().await;
            dispatch(&mut ledger, &request)
        };
        write_frame(&mut writer, &response).await?;
    }
    debug!("peer closed the connection");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tokio::{io::DuplexStream, sync::Mutex};

    use crate::ledger::Ledger;

    use super::*;

    async fn call(client: &mut DuplexStream, request: &str) -> String {
        write_frame(client, request).await.unwrap();
        read_frame(client).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn serves_requests_in_order() {
        let ledger: SharedLedger = Arc::new(Mutex::new(Ledger::new("X-")));
        let (mut client, server) = tokio::io::duplex(1024);
        let handler = tokio::spawn(handle_connection(server, Arc::clone(&ledger)));

        assert_eq!(call(&mut client, "createAccount|Alice").await, "X-0000");
        assert_eq!(call(&mut client, "deposit|X-0000|12.5").await, "0");
        assert_eq!(call(&mut client, "getBalance|X-0000").await, "12.5");
        assert_eq!(call(&mut client, "nonsense").await, "err");
        assert_eq!(call(&mut client, "isActive|X-0000").await, "true");

        drop(client);
        handler.await.unwrap().unwrap();
        assert_eq!(
            ledger.lock().await.account("X-0000").unwrap().owner(),
            "Alice"
        );
    }

    #[tokio::test]
    async fn broken_frame_ends_connection() {
        use tokio::io::AsyncWriteExt;

        let ledger = SharedLedger::default();
        let (mut client, server) = tokio::io::duplex(64);
        let handler = tokio::spawn(handle_connection(server, ledger));

        client.write_all(b"\x00\x02\xff\xfe").await.unwrap();
        let err = handler.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
