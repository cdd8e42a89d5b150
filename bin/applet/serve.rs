use crate::{hub::Hub, io::Pipe, session::Session};
use anyhow::Error as Anyhow;
use clap::Parser;
use lib::arbiter::Config;
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;
use tracing::{info, info_span, instrument, warn, Instrument};

/// Referee a match between two clients connected over TCP.
#[derive(Debug, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Serve {
    /// The address to listen on.
    #[clap(short, long, default_value_t = Serve::ADDRESS)]
    address: SocketAddr,

    /// Server configuration in RON, e.g. `(max_disagreements: 5, proposal_timeout: Some("2m"))`.
    #[clap(short, long, default_value_t)]
    config: Config,
}

impl Default for Serve {
    fn default() -> Self {
        Serve {
            address: Serve::ADDRESS,
            config: Config::default(),
        }
    }
}

impl Serve {
    const ADDRESS: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::LOCALHOST), 3000);

    #[instrument(level = "trace", skip(self), err)]
    pub async fn execute(self) -> Result<(), Anyhow> {
        let listener = TcpListener::bind(self.address).await?;
        info!(address = %listener.local_addr()?, config = %self.config, "listening");

        let hub = Hub::spawn(self.config);

        loop {
            let (stream, peer) = listener.accept().await?;
            info!(%peer, "client connected");

            let (reader, writer) = stream.into_split();
            let session = Session::new(Pipe::new(writer, reader), hub.clone());

            let span = info_span!("session", %peer);
            tokio::spawn(
                async move {
                    if let Err(e) = session.run().await {
                        warn!("{e:#}");
                    }
                }
                .instrument(span),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib::protocol::{Event, Intent};
    use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::runtime;

    #[test]
    fn default_address_is_local() {
        assert_eq!(Serve::default().address.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn two_clients_play_over_json_lines() -> Result<(), Anyhow> {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;

        rt.block_on(async {
            let hub = Hub::spawn(Config::default());
            let mut clients = Vec::new();

            for name in ["alice", "bob"] {
                let (client, server) = duplex(1 << 16);
                let (server_rx, server_tx) = tokio::io::split(server);
                tokio::spawn(Session::new(Pipe::new(server_tx, server_rx), hub.clone()).run());

                let (client_rx, mut client_tx) = tokio::io::split(client);
                let join = Intent::Join { name: name.into() };
                client_tx
                    .write_all(format!("{}\n", serde_json::to_string(&join)?).as_bytes())
                    .await?;

                let mut lines = BufReader::new(client_rx).lines();
                let first: Event = lines.next_line().await?.unwrap_or_default().parse()?;
                assert!(matches!(first, Event::JoinSuccess { .. }));
                clients.push((client_tx, lines));
            }

            let (_, alice) = &mut clients[0];
            loop {
                let line = alice.next_line().await?.unwrap_or_default();
                if let Event::State(state) = line.parse::<Event>()? {
                    assert_eq!(state.disagreement_count(), 0);
                    break;
                }
            }

            Ok::<_, Anyhow>(())
        })
    }
}
