//! Board geometry, fleet definition and runtime settings.

/// Number of columns (and rows) on a board.
pub const BOARD_SIDE: usize = 10;

/// Number of squares on a board.
pub const BOARD_CELLS: usize = BOARD_SIDE * BOARD_SIDE;

/// Ship lengths placed on every truth board, in placement order.
pub const FLEET: [usize; 5] = [5, 4, 3, 3, 2];

/// Total number of ship squares used in the standard fleet.
pub const TOTAL_SHIP_CELLS: usize = 5 + 4 + 3 + 3 + 2;

/// Randomized placement attempts per ship before the board counts as too occupied.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 1000;

/// Version exchanged in the handshake; peers with a different version are rejected.
pub const PROTOCOL_VERSION: u32 = 1;

/// Default address the coordinator listens on and hosts connect to.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:5001";

/// Hard limit on rounds before a match is aborted.
pub const DEFAULT_MAX_ROUNDS: usize = 200;

#[cfg(feature = "std")]
pub use runtime::*;

#[cfg(feature = "std")]
mod runtime {
    use std::string::{String, ToString};
    use std::time::Duration;

    use super::{DEFAULT_ADDRESS, DEFAULT_MAX_ROUNDS};

    /// How long the coordinator waits for a host to answer a shot request.
    pub const DEFAULT_SHOT_TIMEOUT: Duration = Duration::from_secs(20 * 60);

    /// Settings of the coordinator process.
    #[derive(Debug, Clone)]
    pub struct CoordinatorConfig {
        pub listen: String,
        pub shot_timeout: Duration,
        pub max_rounds: usize,
    }

    impl Default for CoordinatorConfig {
        fn default() -> Self {
            Self {
                listen: DEFAULT_ADDRESS.to_string(),
                shot_timeout: DEFAULT_SHOT_TIMEOUT,
                max_rounds: DEFAULT_MAX_ROUNDS,
            }
        }
    }

    /// Settings of the battle host process.
    #[derive(Debug, Clone)]
    pub struct HostConfig {
        pub connect: String,
    }

    impl Default for HostConfig {
        fn default() -> Self {
            Self {
                connect: DEFAULT_ADDRESS.to_string(),
            }
        }
    }
}
