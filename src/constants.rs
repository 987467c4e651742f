//! Application constants

// EIP-1193 provider error codes. 4902 is the MetaMask "chain not added"
// code; some providers signal the same condition with -32603 or a bare
// "Unrecognized chain" message instead.
pub const ERR_USER_REJECTED: i64 = 4001;
pub const ERR_REQUEST_PENDING: i64 = -32002;
pub const ERR_UNRECOGNIZED_CHAIN: i64 = 4902;
pub const ERR_INTERNAL_UNRECOGNIZED: i64 = -32603;

// Cross-chain transfer
// Fee amounts per source chain live in the registry; this default covers
// any source chain without an entry.
pub const DEFAULT_TRANSFER_FEE: &str = "0.005";
pub const TRANSFER_GAS_LIMIT: u64 = 6_000_000;
pub const SETTLEMENT_ESTIMATE: &str = "2-5 minutes";

// Status reporting
pub const STATUS_DISPLAY_SECS: u64 = 5;

// RPC connector
pub const RPC_PROBE_TIMEOUT_SECS: u64 = 5;
pub const METADATA_FETCH_TIMEOUT_SECS: u64 = 10;

// Minting
pub const DEFAULT_MINT_DESCRIPTION: &str = "AI Generated NFT";
pub const DEFAULT_MINT_CHAIN: &str = "7001";

// Offered when connect() finds no injected provider
pub const WALLET_INSTALL_URL: &str = "https://metamask.io/download/";
