//! Connectivity manager (C4) types.

/// Fused reachability state: browser/host network presence crossed with the
/// transport session's own connect/connecting/connected signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectivityState {
	Offline,
	Connecting,
	Online,
}

impl ConnectivityState {
	/// `browser_online` gates everything; when the browser is reachable,
	/// the transport's own connected/connecting flags decide the rest.
	pub fn derive(browser_online: bool, server_connected: bool, server_connecting: bool) -> Self {
		if !browser_online {
			return ConnectivityState::Offline;
		}
		if server_connected {
			return ConnectivityState::Online;
		}
		if server_connecting {
			return ConnectivityState::Connecting;
		}
		ConnectivityState::Offline
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			ConnectivityState::Offline => "offline",
			ConnectivityState::Connecting => "connecting",
			ConnectivityState::Online => "online",
		}
	}
}

impl std::fmt::Display for ConnectivityState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ConnectivityState::*;

	#[test]
	fn truth_table_matches_spec() {
		assert_eq!(ConnectivityState::derive(false, false, false), Offline);
		assert_eq!(ConnectivityState::derive(false, true, true), Offline);
		assert_eq!(ConnectivityState::derive(true, true, false), Online);
		assert_eq!(ConnectivityState::derive(true, true, true), Online);
		assert_eq!(ConnectivityState::derive(true, false, true), Connecting);
		assert_eq!(ConnectivityState::derive(true, false, false), Offline);
	}
}

// vim: ts=4
