//! Which end of the connection a session represents.

/// Side of the authenticated connection.
///
/// Selects which key and keystream a session uses for its own messages and
/// which for its peer's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Initiated the handshake.
    Client,
    /// Accepted the handshake.
    Server,
}

impl Side {
    /// The opposite side.
    pub const fn peer(self) -> Self {
        match self {
            Self::Client => Self::Server,
            Self::Server => Self::Client,
        }
    }

    /// Orders a client/server pair as `(own, peer)` for this side.
    ///
    /// This is the only place that maps a side to its direction state.
    pub fn own_and_peer<T>(self, client: T, server: T) -> (T, T) {
        match self {
            Self::Client => (client, server),
            Self::Server => (server, client),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Server => write!(f, "server"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_owns_client_direction() {
        assert_eq!(Side::Client.own_and_peer("c", "s"), ("c", "s"));
    }

    #[test]
    fn server_owns_server_direction() {
        assert_eq!(Side::Server.own_and_peer("c", "s"), ("s", "c"));
    }

    #[test]
    fn peer_is_involution() {
        assert_eq!(Side::Client.peer(), Side::Server);
        assert_eq!(Side::Client.peer().peer(), Side::Client);
    }
}
