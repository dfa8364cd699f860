//! Host name resolution for `node` tier comparison.
//!
//! Resolution is best-effort: callers treat any error, including a timeout,
//! as "could not resolve" and fall back to comparing raw strings.

use std::collections::HashMap;
use std::fmt::Debug;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, RecvTimeoutError};
use dashmap::DashMap;
use tracing::{debug, trace};

use crate::error::ResolveError;

/// Default upper bound on a single host lookup.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_millis(1000);

/// How long a successful lookup is reused.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// How long a failed or timed-out lookup is reused.
pub const DEFAULT_NEGATIVE_TTL: Duration = Duration::from_secs(10);

/// Upper bound on cached hosts, successes and failures together.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Resolves a host name or IP string to a canonical address.
///
/// Implementations must be thread-safe; one resolver is shared by every
/// clone of a [`MatchContext`](crate::context::MatchContext).
pub trait AddressResolver: Send + Sync + Debug {
    fn resolve(&self, host: &str) -> Result<IpAddr, ResolveError>;
}

type LookupFn = fn(&str) -> Result<IpAddr, ResolveError>;

#[derive(Debug)]
struct CachedLookup {
    result: Result<IpAddr, ResolveError>,
    expires_at: Instant,
}

/// Resolver backed by the operating system's name service.
///
/// IP literals are parsed without a lookup. Each lookup runs on a helper
/// thread and is abandoned after `timeout`. Results are cached per host:
/// successes for `cache_ttl`, failures (timeouts included) for
/// `negative_ttl`, so a dead host costs at most one lookup per window. The
/// cache holds at most `capacity` hosts; when full, expired entries are
/// dropped and new hosts are looked up without being cached.
#[derive(Debug)]
pub struct SystemResolver {
    timeout: Duration,
    cache_ttl: Duration,
    negative_ttl: Duration,
    capacity: usize,
    cache: DashMap<String, CachedLookup>,
    lookup: LookupFn,
}

impl SystemResolver {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            cache_ttl: DEFAULT_CACHE_TTL,
            negative_ttl: DEFAULT_NEGATIVE_TTL,
            capacity: DEFAULT_CACHE_CAPACITY,
            cache: DashMap::new(),
            lookup: lookup_blocking,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// A zero TTL disables negative caching.
    pub fn with_negative_ttl(mut self, ttl: Duration) -> Self {
        self.negative_ttl = ttl;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_lookup(mut self, lookup: LookupFn) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of cached host entries, failures included.
    pub fn cached_hosts(&self) -> usize {
        self.cache.len()
    }

    fn cached(&self, host: &str) -> Option<Result<IpAddr, ResolveError>> {
        let now = Instant::now();
        self.cache
            .get(host)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.result.clone())
    }

    fn remember(&self, host: &str, result: &Result<IpAddr, ResolveError>) {
        let ttl = if result.is_ok() {
            self.cache_ttl
        } else {
            self.negative_ttl
        };
        if ttl.is_zero() {
            return;
        }
        let now = Instant::now();
        if self.cache.len() >= self.capacity && !self.cache.contains_key(host) {
            self.cache.retain(|_, entry| entry.expires_at > now);
            if self.cache.len() >= self.capacity {
                debug!(host, capacity = self.capacity, "resolver cache full, not caching");
                return;
            }
        }
        self.cache.insert(
            host.to_owned(),
            CachedLookup {
                result: result.clone(),
                expires_at: now + ttl,
            },
        );
    }

    fn lookup(&self, host: &str) -> Result<IpAddr, ResolveError> {
        let (tx, rx) = channel::bounded(1);
        let owned = host.to_owned();
        let lookup = self.lookup;
        thread::Builder::new()
            .name("locality-resolve".into())
            .spawn(move || {
                // Receiver may already have given up.
                let _ = tx.send(lookup(&owned));
            })
            .map_err(|err| ResolveError::Lookup {
                host: host.to_owned(),
                reason: err.to_string(),
            })?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(ResolveError::Timeout {
                host: host.to_owned(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(ResolveError::Lookup {
                host: host.to_owned(),
                reason: "resolver thread exited".into(),
            }),
        }
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLVE_TIMEOUT)
    }
}

impl AddressResolver for SystemResolver {
    fn resolve(&self, host: &str) -> Result<IpAddr, ResolveError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ip);
        }
        if let Some(result) = self.cached(host) {
            return result;
        }
        let result = self.lookup(host);
        match &result {
            Ok(ip) => trace!(host, %ip, "resolved host"),
            Err(err) => debug!(host, error = %err, "host lookup failed"),
        }
        self.remember(host, &result);
        result
    }
}

/// Prefers the first IPv4 address, otherwise the first address returned.
fn lookup_blocking(host: &str) -> Result<IpAddr, ResolveError> {
    let addrs: Vec<SocketAddr> = (host, 0u16)
        .to_socket_addrs()
        .map_err(|err| ResolveError::Lookup {
            host: host.to_owned(),
            reason: err.to_string(),
        })?
        .collect();
    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .map(SocketAddr::ip)
        .ok_or_else(|| ResolveError::UnknownHost(host.to_owned()))
}

/// Resolver over a fixed host table, e.g. one shipped in cluster config.
///
/// IP literals resolve to themselves; any other unknown name is an error.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    hosts: HashMap<String, IpAddr>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>, ip: IpAddr) -> Self {
        self.hosts.insert(host.into(), ip);
        self
    }
}

impl<S: Into<String>> FromIterator<(S, IpAddr)> for StaticResolver {
    fn from_iter<I: IntoIterator<Item = (S, IpAddr)>>(iter: I) -> Self {
        Self {
            hosts: iter.into_iter().map(|(host, ip)| (host.into(), ip)).collect(),
        }
    }
}

impl AddressResolver for StaticResolver {
    fn resolve(&self, host: &str) -> Result<IpAddr, ResolveError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ip);
        }
        self.hosts
            .get(host)
            .copied()
            .ok_or_else(|| ResolveError::UnknownHost(host.to_owned()))
    }
}
