use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use hickory_client::client::{Client, ClientHandle};
use hickory_client::proto::rr::{DNSClass, Name, RData, RecordType};
use hickory_client::proto::runtime::TokioRuntimeProvider;
use hickory_client::proto::udp::UdpClientStream;
use tracing::debug;

/// Answers "does this name exist". Failures of any kind come back as `None`.
pub trait Resolve {
    fn resolve(&self, name: &str) -> impl Future<Output = Option<IpAddr>> + Send;
}

/// Outcome of resolving one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub name: String,
    pub address: Option<IpAddr>,
}

/// A-record lookups over UDP, one query per call, spread round-robin
/// across the configured nameservers.
pub struct DnsResolver {
    nameservers: Vec<SocketAddr>,
    timeout: Duration,
    next: AtomicUsize,
}

impl DnsResolver {
    pub fn new(nameservers: Vec<SocketAddr>, timeout: Duration) -> Self {
        Self {
            nameservers,
            timeout,
            next: AtomicUsize::new(0),
        }
    }

    pub fn nameservers(&self) -> &[SocketAddr] {
        &self.nameservers
    }

    fn pick_nameserver(&self) -> Option<SocketAddr> {
        if self.nameservers.is_empty() {
            return None;
        }
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.nameservers.len();
        Some(self.nameservers[idx])
    }

    async fn query_a(nameserver: SocketAddr, timeout: Duration, name: Name) -> Option<IpAddr> {
        let conn = UdpClientStream::builder(nameserver, TokioRuntimeProvider::default())
            .with_timeout(Some(timeout))
            .build();
        let (mut client, bg) = Client::connect(conn).await.ok()?;
        tokio::spawn(bg);

        let resp = client.query(name, DNSClass::IN, RecordType::A).await.ok()?;
        resp.answers().iter().find_map(|record| match record.data() {
            RData::A(a) => Some(IpAddr::V4(a.0)),
            _ => None,
        })
    }
}

impl Resolve for DnsResolver {
    async fn resolve(&self, name: &str) -> Option<IpAddr> {
        let nameserver = self.pick_nameserver()?;
        let fqdn = Name::from_str(&format!("{}.", name)).ok()?;

        let address = Self::query_a(nameserver, self.timeout, fqdn).await;
        if address.is_none() {
            debug!("{} did not resolve via {}", name, nameserver);
        }
        address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::UdpSocket;

    const TYPE_A: u16 = 1;
    const TYPE_CNAME: u16 = 5;
    const NXDOMAIN: u8 = 3;

    /// Builds a wire-format reply echoing the question of `query`, with every
    /// answer owned by the queried name.
    fn dns_reply(query: &[u8], answers: &[(u16, Vec<u8>)], rcode: u8) -> Vec<u8> {
        let mut end = 12;
        while query[end] != 0 {
            end += query[end] as usize + 1;
        }
        // root label, QTYPE, QCLASS
        end += 5;

        let mut reply = Vec::new();
        reply.extend_from_slice(&query[..2]);
        reply.extend_from_slice(&[0x81, 0x80 | rcode]);
        reply.extend_from_slice(&1u16.to_be_bytes());
        reply.extend_from_slice(&(answers.len() as u16).to_be_bytes());
        reply.extend_from_slice(&[0, 0, 0, 0]);
        reply.extend_from_slice(&query[12..end]);
        for (rtype, rdata) in answers {
            reply.extend_from_slice(&[0xc0, 0x0c]);
            reply.extend_from_slice(&rtype.to_be_bytes());
            reply.extend_from_slice(&[0, 1, 0, 0, 0, 60]);
            reply.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
            reply.extend_from_slice(rdata);
        }
        reply
    }

    async fn nameserver(answers: Vec<(u16, Vec<u8>)>, rcode: u8) -> SocketAddr {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            while let Ok((n, peer)) = socket.recv_from(&mut buf).await {
                let reply = dns_reply(&buf[..n], &answers, rcode);
                let _ = socket.send_to(&reply, peer).await;
            }
        });
        addr
    }

    fn server(last: u8) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, last)), 53)
    }

    #[test]
    fn test_round_robin_nameservers() {
        let resolver = DnsResolver::new(vec![server(1), server(2)], Duration::from_secs(1));
        assert_eq!(resolver.pick_nameserver(), Some(server(1)));
        assert_eq!(resolver.pick_nameserver(), Some(server(2)));
        assert_eq!(resolver.pick_nameserver(), Some(server(1)));
    }

    #[tokio::test]
    async fn test_no_nameservers_resolves_nothing() {
        let resolver = DnsResolver::new(Vec::new(), Duration::from_secs(1));
        assert_eq!(resolver.resolve("www.example.com").await, None);
    }

    #[tokio::test]
    async fn test_malformed_name_resolves_nothing() {
        let resolver = DnsResolver::new(vec![server(1)], Duration::from_millis(10));
        let label = "x".repeat(70);
        assert_eq!(resolver.resolve(&format!("{}.example.com", label)).await, None);
    }

    #[tokio::test]
    async fn test_first_a_record_wins() {
        let edge = vec![4, b'e', b'd', b'g', b'e', 0xc0, 0x0c];
        let addr = nameserver(
            vec![
                (TYPE_CNAME, edge),
                (TYPE_A, vec![93, 184, 216, 34]),
                (TYPE_A, vec![198, 51, 100, 7]),
            ],
            0,
        )
        .await;

        let resolver = DnsResolver::new(vec![addr], Duration::from_secs(2));
        assert_eq!(
            resolver.resolve("www.example.com").await,
            Some(IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)))
        );
    }

    #[tokio::test]
    async fn test_nxdomain_resolves_nothing() {
        let addr = nameserver(Vec::new(), NXDOMAIN).await;
        let resolver = DnsResolver::new(vec![addr], Duration::from_secs(2));
        assert_eq!(resolver.resolve("api.example.com").await, None);
    }
}
